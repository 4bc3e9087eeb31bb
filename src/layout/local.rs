//! Section-local layout
//!
//! Every member box starts at the origin with its resolved size, then the
//! section's own transformation list arranges the members. Each breakpoint
//! is built separately.

use serde_json::json;

use crate::breakpoint::Bps;
use crate::diagnostics::{Diagnostic, Diagnostics, IssueCode, Origin};
use crate::geometry::{Coordinate, GridBox};
use crate::idmap::IdMap;
use crate::ordering::order_ids;

use super::config::SolverConfig;
use super::shape::{resolve_shape, ShapeCatalog, ShapeContext};
use super::spec::{transformations_at, LayoutSpec, SectionSpec};
use super::transform::{evaluate_all, Scope};

/// Member boxes of one section in section-local coordinates
pub type LocalBoxes = Bps<IdMap<GridBox>>;

/// Build the local boxes of every section, in section order
pub fn build_local_layout(
    layout: &LayoutSpec,
    catalog: &dyn ShapeCatalog,
    config: &SolverConfig,
    diagnostics: &mut Diagnostics,
) -> IdMap<LocalBoxes> {
    if !config.has_usable_default_size() {
        let (w, h) = config.default_box_size;
        let fallback = config.fallback_box_size();
        diagnostics.push(
            Diagnostic::warning(
                Origin::BoxShape,
                IssueCode::BoxShapeInvalid,
                format!(
                    "default box size {}x{} is not strictly positive; using {}x{}",
                    w, h, fallback.x, fallback.y
                ),
            )
            .with_details(json!({ "defaultBoxSize": [w, h] })),
        );
    }

    layout
        .sections
        .iter()
        .map(|(id, section)| {
            let boxes = build_section(id, section, catalog, config, diagnostics);
            (id, boxes)
        })
        .collect()
}

/// Build one section's boxes at every breakpoint.
///
/// A box with a dimension spec always gets a size (possibly the default).
/// A box with no dimension spec at all is left out.
pub fn build_section(
    section_id: &str,
    section: &SectionSpec,
    catalog: &dyn ShapeCatalog,
    config: &SolverConfig,
    diagnostics: &mut Diagnostics,
) -> LocalBoxes {
    let member_ids: Vec<String> = match &section.order {
        Some(reference) => {
            let ids: Vec<&str> = section.boxes.keys().collect();
            let context = format!("section '{}'", section_id);
            order_ids(ids.as_slice(), reference.as_slice(), &context, diagnostics)
        }
        None => section.boxes.keys().map(str::to_string).collect(),
    };

    let mut sized: Vec<(String, Bps<Coordinate>)> = Vec::with_capacity(member_ids.len());
    for box_id in member_ids {
        let Some(spec) = section.boxes.get(&box_id) else {
            continue;
        };
        let Some(dimension) = &spec.dimension else {
            diagnostics.push(
                Diagnostic::warning(
                    Origin::LocalLayout,
                    IssueCode::NoBoxesProcessed,
                    format!(
                        "box '{}' in section '{}' has no dimension; skipping it",
                        box_id, section_id
                    ),
                )
                .with_details(json!({ "section": section_id, "box": box_id })),
            );
            continue;
        };

        let ctx = ShapeContext {
            section: section_id,
            box_id: &box_id,
        };
        let diagonals = resolve_shape(dimension, ctx, catalog, config, diagnostics);
        sized.push((box_id, diagonals));
    }

    tracing::debug!(
        section = section_id,
        boxes = sized.len(),
        "built section-local boxes"
    );

    Bps::from_fn(|bp| {
        let mut boxes: IdMap<GridBox> = sized
            .iter()
            .map(|(id, diagonals)| (id.as_str(), GridBox::at_origin(diagonals[bp])))
            .collect();

        let ops = transformations_at(section.transformations.as_ref(), bp);
        evaluate_all(ops, &mut boxes, Scope::section(section_id, bp), diagnostics);
        boxes
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breakpoint::Breakpoint;
    use crate::breakpoint::Responsive;
    use crate::layout::shape::BoxShapeCatalog;
    use crate::layout::spec::BoxSpec;
    use crate::layout::transform::Transformation;

    fn catalog() -> BoxShapeCatalog {
        BoxShapeCatalog::new()
            .with_shape("unit", 1.0, 1.0)
            .with_shape("wide", 3.0, 1.0)
    }

    #[test]
    fn test_boxes_start_at_origin_without_transformations() {
        let section = SectionSpec::new()
            .with_box("a", BoxSpec::new("wide"))
            .with_box("b", BoxSpec::new("unit"));
        let mut diags = Diagnostics::new();
        let local = build_section("s", &section, &catalog(), &SolverConfig::default(), &mut diags);

        for (_, boxes) in local.iter() {
            assert_eq!(boxes.len(), 2);
            assert!(boxes.values().all(|b| b.origin == Coordinate::ZERO));
        }
        assert_eq!(
            local[Breakpoint::Sm].get("a").unwrap().diagonal(),
            Coordinate::new(3.0, 1.0)
        );
        assert!(diags.is_empty());
    }

    #[test]
    fn test_box_without_dimension_is_skipped() {
        let section = SectionSpec::new()
            .with_box("a", BoxSpec::new("unit"))
            .with_box("ghost", BoxSpec::default());
        let mut diags = Diagnostics::new();
        let local = build_section("s", &section, &catalog(), &SolverConfig::default(), &mut diags);

        assert!(!local[Breakpoint::Md].contains_key("ghost"));
        assert_eq!(diags.with_code(IssueCode::NoBoxesProcessed).count(), 1);
    }

    #[test]
    fn test_transformations_run_per_breakpoint() {
        let mut per_bp = std::collections::BTreeMap::new();
        per_bp.insert(
            Breakpoint::Lg,
            vec![Transformation::stack_horizontally(0.0)],
        );
        let section = SectionSpec::new()
            .with_box("a", BoxSpec::new("unit"))
            .with_box("b", BoxSpec::new("unit"))
            .with_transformations(Responsive::PerBreakpoint(per_bp));
        let mut diags = Diagnostics::new();
        let local = build_section("s", &section, &catalog(), &SolverConfig::default(), &mut diags);

        assert_eq!(local[Breakpoint::Lg].get("b").unwrap().origin.x, 1.0);
        assert_eq!(local[Breakpoint::Xs].get("b").unwrap().origin.x, 0.0);
    }

    #[test]
    fn test_zero_default_size_is_reported_once() {
        let layout = LayoutSpec::new().with_section(
            "s",
            SectionSpec::new()
                .with_box("a", BoxSpec::new("nope"))
                .with_box("b", BoxSpec::new("nope")),
        );
        let config = SolverConfig::default().with_default_box_size(0.0, 0.0);
        let mut diags = Diagnostics::new();
        let local = build_local_layout(&layout, &catalog(), &config, &mut diags);

        let a = local.get("s").unwrap()[Breakpoint::Md].get("a").unwrap();
        assert_eq!(a.diagonal(), Coordinate::new(1.0, 1.0));
        assert_eq!(diags.with_code(IssueCode::BoxShapeInvalid).count(), 1);
        assert_eq!(diags.with_code(IssueCode::BoxShapeUnknown).count(), 2);
    }

    #[test]
    fn test_reference_order_drives_stacking() {
        let section = SectionSpec::new()
            .with_box("a", BoxSpec::new("unit"))
            .with_box("b", BoxSpec::new("unit"))
            .with_order(["b", "a"])
            .with_transformations(vec![Transformation::stack_vertically(0.0)]);
        let mut diags = Diagnostics::new();
        let local = build_section("s", &section, &catalog(), &SolverConfig::default(), &mut diags);

        let ids: Vec<_> = local[Breakpoint::Xs].keys().collect();
        assert_eq!(ids, ["b", "a"]);
        assert_eq!(local[Breakpoint::Xs].get("a").unwrap().origin.y, 1.0);
        assert!(diags.is_empty());
    }
}
