//! Reordering ids against a reference ordering
//!
//! Building-block factories generate box ids and want them enumerated in a
//! fixed order. [`order_ids`] sorts a list of ids by a reference list and
//! reports anything that does not line up.

use std::collections::HashSet;

use serde_json::json;

use crate::diagnostics::{Diagnostic, Diagnostics, IssueCode, Origin};

/// Order `ids` by their position in `reference`.
///
/// Ids missing from the reference keep their relative order after the
/// referenced ones. Repeated ids keep their first occurrence. `context`
/// names the owner of the list in diagnostics (e.g. a section id).
pub fn order_ids<A, B>(
    ids: &[A],
    reference: &[B],
    context: &str,
    diagnostics: &mut Diagnostics,
) -> Vec<String>
where
    A: AsRef<str>,
    B: AsRef<str>,
{
    let mut present: Vec<&str> = Vec::with_capacity(ids.len());
    let mut seen = HashSet::new();
    for id in ids {
        let id = id.as_ref();
        if seen.insert(id) {
            present.push(id);
        } else {
            diagnostics.push(duplicate(id, "ids", context));
        }
    }

    let mut ordered = Vec::with_capacity(present.len());
    let mut placed = HashSet::new();
    for id in reference {
        let id = id.as_ref();
        if !placed.insert(id) {
            diagnostics.push(duplicate(id, "reference", context));
            continue;
        }
        if seen.contains(id) {
            ordered.push(id.to_string());
        } else {
            diagnostics.push(
                Diagnostic::warning(
                    Origin::Ordering,
                    IssueCode::NodeOrderMismatch,
                    format!("'{}' is in the reference order of {} but has no box", id, context),
                )
                .with_details(json!({ "id": id, "context": context, "missing": "ids" })),
            );
        }
    }

    for id in present {
        if !placed.contains(id) {
            diagnostics.push(
                Diagnostic::warning(
                    Origin::Ordering,
                    IssueCode::NodeOrderMismatch,
                    format!(
                        "'{}' is not in the reference order of {}; appending it",
                        id, context
                    ),
                )
                .with_details(json!({ "id": id, "context": context, "missing": "reference" })),
            );
            ordered.push(id.to_string());
        }
    }

    ordered
}

fn duplicate(id: &str, list: &str, context: &str) -> Diagnostic {
    Diagnostic::warning(
        Origin::Ordering,
        IssueCode::DuplicateKind,
        format!("'{}' appears more than once in the {} of {}", id, list, context),
    )
    .with_details(json!({ "id": id, "context": context, "list": list }))
}
