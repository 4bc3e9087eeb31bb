//! Section bounding boxes

use serde_json::json;

use crate::breakpoint::Bps;
use crate::diagnostics::{Diagnostic, Diagnostics, IssueCode, Origin};
use crate::geometry::GridBox;
use crate::idmap::IdMap;

use super::local::LocalBoxes;

/// Bounding box of every section at every breakpoint
pub fn compute_bounds(
    local: &IdMap<LocalBoxes>,
    diagnostics: &mut Diagnostics,
) -> IdMap<Bps<GridBox>> {
    local
        .iter()
        .map(|(id, boxes)| (id, section_bounds(id, boxes, diagnostics)))
        .collect()
}

/// Smallest box enclosing a section's local boxes.
///
/// A section with no boxes at a breakpoint gets an empty box at the origin.
pub fn section_bounds(
    section_id: &str,
    boxes: &LocalBoxes,
    diagnostics: &mut Diagnostics,
) -> Bps<GridBox> {
    Bps::from_fn(|bp| match enclosing(&boxes[bp]) {
        Some(bounds) => bounds,
        None => {
            diagnostics.push(
                Diagnostic::warning(
                    Origin::SectionBounds,
                    IssueCode::SectionEmpty,
                    format!("no boxes found for section '{}' at breakpoint {}", section_id, bp),
                )
                .with_details(json!({ "section": section_id, "bp": bp })),
            );
            GridBox::empty()
        }
    })
}

fn enclosing(boxes: &IdMap<GridBox>) -> Option<GridBox> {
    boxes.values().copied().reduce(|acc, b| acc.union(&b))
}
