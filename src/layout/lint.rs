//! Overlap audit for finished layouts.
//!
//! Advisory only: overlapping boxes are reported, never moved. Boxes that
//! merely share an edge do not overlap.

use serde_json::json;

use crate::breakpoint::Breakpoint;
use crate::diagnostics::{Diagnostic, Diagnostics, IssueCode, Origin, Severity};

use super::absolute::{AbsoluteLayout, GridArea};
use super::config::OverlapPolicy;

/// Report every overlapping pair of boxes at the requested breakpoints.
///
/// Pairs span sections. `OverlapPolicy::Allow` skips the check.
pub fn check_overlaps(
    layout: &AbsoluteLayout,
    breakpoints: &[Breakpoint],
    policy: OverlapPolicy,
    diagnostics: &mut Diagnostics,
) {
    let severity = match policy {
        OverlapPolicy::Allow => return,
        OverlapPolicy::Warn => Severity::Warning,
        OverlapPolicy::Error => Severity::Error,
    };

    let mut checked = Vec::with_capacity(breakpoints.len());
    for &bp in breakpoints {
        if checked.contains(&bp) {
            continue;
        }
        checked.push(bp);

        let areas: Vec<(String, &GridArea)> = layout
            .areas_at(bp)
            .map(|(section, box_id, area)| (format!("{}/{}", section, box_id), area))
            .collect();

        for i in 0..areas.len() {
            for j in (i + 1)..areas.len() {
                let (name_a, a) = &areas[i];
                let (name_b, b) = &areas[j];
                if a.intersects(b) {
                    diagnostics.push(overlap(severity, bp, name_a, a, name_b, b));
                }
            }
        }
    }
}

fn overlap(
    severity: Severity,
    bp: Breakpoint,
    name_a: &str,
    a: &GridArea,
    name_b: &str,
    b: &GridArea,
) -> Diagnostic {
    let (first, second) = if name_a <= name_b {
        (name_a, name_b)
    } else {
        (name_b, name_a)
    };
    let pair_key = format!("{}|{}|{}", bp, first, second);

    Diagnostic::new(
        severity,
        Origin::Overlap,
        IssueCode::OverlapNotAllowed,
        format!(
            "boxes {} ({}) and {} ({}) overlap at breakpoint {}",
            name_a,
            a.css_grid_area(),
            name_b,
            b.css_grid_area(),
            bp
        ),
    )
    .with_details(json!({
        "bp": bp,
        "pairKey": pair_key,
        "a": { "box": name_a, "area": a },
        "b": { "box": name_b, "area": b },
    }))
}
