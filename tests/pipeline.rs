//! End-to-end properties of the layout pipeline

use boxgrid::layout::bounds::compute_bounds;
use boxgrid::layout::local::LocalBoxes;
use boxgrid::layout::shape::{resolve_shape, ShapeContext};
use boxgrid::layout::transform::{evaluate, Scope};
use boxgrid::layout::{AnchorRef, BoxRef, Offset};
use boxgrid::{
    solve, solve_toml, Anchor, Bps, BoxShapeCatalog, BoxSpec, Breakpoint, Coordinate,
    DimensionSpec, Diagnostics, GridArea, GridBox, IdMap, IssueCode, LayoutSpec, OverlapPolicy,
    SectionSpec, Severity, SolverConfig, Transformation,
};
use pretty_assertions::assert_eq;

fn catalog() -> BoxShapeCatalog {
    BoxShapeCatalog::new()
        .with_shape("unit", 1.0, 1.0)
        .with_shape("wide", 4.0, 1.0)
        .with_shape("tall", 2.0, 3.0)
}

fn unit_boxes(ids: &[&str]) -> IdMap<GridBox> {
    ids.iter()
        .map(|id| (*id, GridBox::new(Coordinate::ZERO, Coordinate::new(1.0, 1.0))))
        .collect()
}

fn all_areas(layout: &boxgrid::AbsoluteLayout) -> Vec<(Breakpoint, String, GridArea)> {
    Breakpoint::ALL
        .into_iter()
        .flat_map(|bp| {
            layout
                .areas_at(bp)
                .map(move |(s, b, a)| (bp, format!("{}/{}", s, b), *a))
                .collect::<Vec<_>>()
        })
        .collect()
}

#[test]
fn test_grid_lines_are_positive_after_any_moves() {
    let layout = LayoutSpec::new()
        .with_section(
            "left",
            SectionSpec::new()
                .with_box("a", BoxSpec::new("wide"))
                .with_box("b", BoxSpec::new("tall"))
                .with_transformations(vec![
                    Transformation::stack_vertically(2.0),
                    Transformation::MoveBy {
                        from: BoxRef::new("a").into(),
                        by: Offset::Vector(Coordinate::new(-7.0, -2.5)),
                        gap: None,
                    },
                ]),
        )
        .with_section(
            "right",
            SectionSpec::new().with_box("c", BoxSpec::new("unit")),
        )
        .with_transformations(vec![Transformation::MoveBy {
            from: BoxRef::new("right").into(),
            by: Offset::Uniform(-10.0),
            gap: None,
        }]);

    let solution = solve(&layout, &catalog(), &SolverConfig::default());

    let areas = all_areas(&solution.layout);
    assert_eq!(areas.len(), 15);
    for (bp, name, area) in areas {
        assert!(area.col_start >= 1.0, "{} at {}: {:?}", name, bp, area);
        assert!(area.row_start >= 1.0, "{} at {}: {:?}", name, bp, area);
        assert!(area.col_end > area.col_start, "{} at {}", name, bp);
        assert!(area.row_end > area.row_start, "{} at {}", name, bp);
    }
    assert_eq!(
        solution
            .diagnostics
            .with_code(IssueCode::GridNormalizedToPositiveLines)
            .count(),
        5
    );
}

#[test]
fn test_single_shape_is_the_same_everywhere() {
    let mut diags = Diagnostics::new();
    let diagonals = resolve_shape(
        &DimensionSpec::from("tall"),
        ShapeContext {
            section: "s",
            box_id: "b",
        },
        &catalog(),
        &SolverConfig::default(),
        &mut diags,
    );

    for (_, d) in diagonals.iter() {
        assert_eq!(*d, Coordinate::new(2.0, 3.0));
    }
    assert!(diags.is_empty());
}

#[test]
fn test_anchor_positions() {
    let b = GridBox::new(Coordinate::ZERO, Coordinate::new(2.0, 1.0));
    assert_eq!(b.anchor(Anchor::TopRight), Coordinate::new(2.0, 1.0));
    assert_eq!(b.anchor(Anchor::Center), Coordinate::new(1.0, 0.5));
}

#[test]
fn test_move_to_another_box_anchor() {
    let mut boxes = unit_boxes(&["A", "B"]);
    let op = Transformation::MoveTo {
        from: AnchorRef::new("B", Anchor::BottomLeft).into(),
        to: AnchorRef::new("A", Anchor::TopRight).into(),
        gap: None,
    };
    let mut diags = Diagnostics::new();
    evaluate(&op, &mut boxes, Scope::section("s", Breakpoint::Xs), &mut diags);

    assert!(diags.is_empty());
    assert_eq!(boxes.get("B").unwrap().origin, Coordinate::new(1.0, 1.0));
    assert_eq!(boxes.get("A").unwrap().origin, Coordinate::ZERO);
}

#[test]
fn test_stack_horizontally_follows_insertion_order() {
    let ids = ["e", "b", "d", "a", "c"];
    let mut boxes = unit_boxes(&ids);
    let mut diags = Diagnostics::new();
    evaluate(
        &Transformation::stack_horizontally(1.0),
        &mut boxes,
        Scope::section("s", Breakpoint::Lg),
        &mut diags,
    );

    let xs: Vec<(&str, f64)> = boxes.iter().map(|(id, b)| (id, b.origin.x)).collect();
    assert_eq!(
        xs,
        vec![("e", 0.0), ("b", 2.0), ("d", 4.0), ("a", 6.0), ("c", 8.0)]
    );
    assert!(boxes.values().all(|b| b.origin.y == 0.0));
}

#[test]
fn test_touching_sections_do_not_overlap() {
    let layout = LayoutSpec::new()
        .with_section("a", SectionSpec::new().with_box("x", BoxSpec::new("tall")))
        .with_section("b", SectionSpec::new().with_box("y", BoxSpec::new("tall")))
        .with_transformations(vec![Transformation::MoveTo {
            from: AnchorRef::new("b", Anchor::BottomLeft).into(),
            to: AnchorRef::new("a", Anchor::BottomRight).into(),
            gap: None,
        }]);

    for policy in [OverlapPolicy::Warn, OverlapPolicy::Error] {
        let config = SolverConfig::new().with_overlap_policy(policy);
        let solution = solve(&layout, &catalog(), &config);
        assert_eq!(
            solution.layout.area("a", Breakpoint::Xs, "x"),
            Some(&GridArea::new(1.0, 3.0, 1.0, 4.0))
        );
        assert_eq!(
            solution.layout.area("b", Breakpoint::Xs, "y"),
            Some(&GridArea::new(3.0, 5.0, 1.0, 4.0))
        );
        assert!(solution.diagnostics.is_empty(), "{:?}", solution.diagnostics);
    }
}

#[test]
fn test_overlap_document() {
    let doc = boxgrid::LayoutDocument::from_json_str(include_str!("fixtures/overlap.json")).unwrap();
    let solution = boxgrid::solve_document(&doc);

    assert_eq!(
        solution.layout.area("a", Breakpoint::Md, "one"),
        Some(&GridArea::new(1.0, 4.0, 1.0, 3.0))
    );
    assert_eq!(
        solution.layout.area("b", Breakpoint::Md, "two"),
        Some(&GridArea::new(3.0, 6.0, 2.0, 5.0))
    );

    let overlaps: Vec<_> = solution.diagnostics.iter().collect();
    assert_eq!(overlaps.len(), 1);
    assert_eq!(overlaps[0].code(), IssueCode::OverlapNotAllowed);
    assert_eq!(overlaps[0].severity, Severity::Error);
    assert_eq!(overlaps[0].breakpoint(), Some(Breakpoint::Md));
    assert_eq!(overlaps[0].details().unwrap()["pairKey"], "md|a/one|b/two");
}

#[test]
fn test_section_without_boxes_at_one_breakpoint() {
    let mut per_bp: LocalBoxes = Bps::splat(unit_boxes(&["x"]));
    per_bp[Breakpoint::Md] = IdMap::new();
    let local: IdMap<LocalBoxes> = [("s", per_bp)].into_iter().collect();

    let mut diags = Diagnostics::new();
    let bounds = compute_bounds(&local, &mut diags);

    let md = bounds.get("s").unwrap()[Breakpoint::Md];
    assert_eq!(md.origin, Coordinate::ZERO);
    assert_eq!(md.diagonal(), Coordinate::ZERO);
    assert_eq!(bounds.get("s").unwrap()[Breakpoint::Xs].diagonal(), Coordinate::new(1.0, 1.0));

    let empty: Vec<_> = diags.with_code(IssueCode::SectionEmpty).collect();
    assert_eq!(empty.len(), 1);
    assert_eq!(empty[0].breakpoint(), Some(Breakpoint::Md));
}

#[test]
fn test_missing_breakpoint_shape_defaults_to_unit() {
    let layout = LayoutSpec::new().with_section(
        "s",
        SectionSpec::new().with_box(
            "b",
            BoxSpec::new(DimensionSpec::per_breakpoint([
                (Breakpoint::Xs, "wide"),
                (Breakpoint::Sm, "wide"),
                (Breakpoint::Lg, "wide"),
                (Breakpoint::Xl, "wide"),
            ])),
        ),
    );
    let solution = solve(&layout, &catalog(), &SolverConfig::default());

    assert_eq!(
        solution.layout.area("s", Breakpoint::Md, "b"),
        Some(&GridArea::new(1.0, 2.0, 1.0, 2.0))
    );
    assert_eq!(
        solution.layout.area("s", Breakpoint::Lg, "b"),
        Some(&GridArea::new(1.0, 5.0, 1.0, 2.0))
    );

    let missing: Vec<_> = solution
        .diagnostics
        .with_code(IssueCode::BoxShapeMissingBp)
        .collect();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].breakpoint(), Some(Breakpoint::Md));
}

#[test]
fn test_normalization_shift_round_trips() {
    let solution = solve_toml(include_str!("fixtures/negative.toml")).unwrap();
    let layout = &solution.layout;

    for bp in Breakpoint::ALL {
        assert_eq!(layout.normalization[bp], Coordinate::new(3.0, 0.0));
        assert_eq!(layout.dimensions[bp].columns, 5.0);
        assert_eq!(layout.dimensions[bp].rows, 2.0);

        let mut y = *layout.area("b", bp, "y").unwrap();
        assert_eq!(y, GridArea::new(1.0, 2.0, 1.0, 2.0));
        y.translate(-layout.normalization[bp].x, -layout.normalization[bp].y);
        assert_eq!(y, GridArea::new(-2.0, -1.0, 1.0, 2.0));

        let mut x = *layout.area("a", bp, "x").unwrap();
        x.translate(-3.0, 0.0);
        assert_eq!(x, GridArea::new(1.0, 2.0, 1.0, 2.0));
    }

    let shifts: Vec<_> = solution
        .diagnostics
        .with_code(IssueCode::GridNormalizedToPositiveLines)
        .collect();
    assert_eq!(shifts.len(), 5);
    assert_eq!(shifts[0].details().unwrap()["dx"], 3.0);
    assert_eq!(shifts[0].details().unwrap()["minColStart"], -2.0);
}

#[test]
fn test_degraded_input_still_produces_layout() {
    let solution = solve_toml(include_str!("fixtures/degraded.toml")).unwrap();
    let diags = &solution.diagnostics;

    let count = |code| diags.with_code(code).count();
    assert_eq!(count(IssueCode::BoxShapeMissingBp), 6);
    assert_eq!(count(IssueCode::BoxShapeUnknown), 1);
    assert_eq!(count(IssueCode::BoxShapeInvalid), 1);
    assert_eq!(count(IssueCode::NoBoxesProcessed), 1);
    assert_eq!(count(IssueCode::UnknownNodeId), 5);
    assert_eq!(count(IssueCode::UnknownAnchor), 5);
    assert_eq!(count(IssueCode::InvalidTransformationParams), 5);
    assert_eq!(diags.with_severity(Severity::Error).count(), 15);

    let xs: Vec<(&str, f64)> = solution
        .layout
        .areas_at(Breakpoint::Xs)
        .map(|(_, b, a)| (b, a.col_start))
        .collect();
    assert_eq!(
        xs,
        vec![("partial", 1.0), ("unknown", 2.0), ("invalid", 3.0), ("bad", 4.0)]
    );
    assert!(solution.layout.area("s", Breakpoint::Xs, "nodim").is_none());
}

#[test]
fn test_breakpoints_are_independent() {
    let layout = LayoutSpec::new().with_section(
        "s",
        SectionSpec::new()
            .with_box("a", BoxSpec::new("unit"))
            .with_box("b", BoxSpec::new("unit"))
            .with_transformations(boxgrid::Responsive::PerBreakpoint(
                [(
                    Breakpoint::Xl,
                    vec![Transformation::stack_horizontally(0.0)],
                )]
                .into_iter()
                .collect(),
            )),
    );
    let config = SolverConfig::new().with_overlap_policy(OverlapPolicy::Warn);
    let solution = solve(&layout, &catalog(), &config);

    let overlapping: Vec<Breakpoint> = solution
        .diagnostics
        .with_code(IssueCode::OverlapNotAllowed)
        .filter_map(|d| d.breakpoint())
        .collect();
    assert_eq!(
        overlapping,
        vec![Breakpoint::Xs, Breakpoint::Sm, Breakpoint::Md, Breakpoint::Lg]
    );
    assert_eq!(
        solution.layout.area("s", Breakpoint::Xl, "b"),
        Some(&GridArea::new(2.0, 3.0, 1.0, 2.0))
    );
}
