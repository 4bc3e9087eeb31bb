//! boxgrid - responsive box layouts on a CSS grid
//!
//! Sections of named boxes are laid out independently at five breakpoints
//! (`xs` to `xl`), positioned relative to each other by declarative
//! transformations, and converted to absolute CSS grid lines.
//!
//! Nothing in the pipeline fails hard on degraded input: every problem is
//! recorded as a [`Diagnostic`] and a best-effort layout is still produced.
//!
//! # Example
//!
//! ```rust
//! use boxgrid::{solve_toml, Breakpoint};
//!
//! let solution = solve_toml(r#"
//!     [shapes]
//!     unit = [1, 1]
//!
//!     [layout.sections.hero]
//!     transformations = [{ stackHorizontally = { gap = 0 } }]
//!
//!     [layout.sections.hero.boxes]
//!     a = { dimension = "unit" }
//!     b = { dimension = "unit" }
//! "#).unwrap();
//!
//! let b = solution.layout.area("hero", Breakpoint::Md, "b").unwrap();
//! assert_eq!(b.css_grid_area(), "1 / 2 / 2 / 3");
//! assert!(solution.diagnostics.is_empty());
//! ```

pub mod breakpoint;
pub mod diagnostics;
pub mod document;
pub mod error;
pub mod geometry;
pub mod idmap;
pub mod layout;
pub mod ordering;

pub use breakpoint::{Breakpoint, Bps, Responsive};
pub use diagnostics::{Diagnostic, Diagnostics, DiagnosticsError, IssueCode, Origin, Severity};
pub use document::LayoutDocument;
pub use error::DocumentError;
pub use geometry::{Anchor, Coordinate, GridBox};
pub use idmap::IdMap;
pub use layout::{
    AbsoluteLayout, BoxShapeCatalog, BoxSpec, DimensionSpec, GridArea, GridDimensions,
    LayoutSpec, OverlapPolicy, SectionSpec, ShapeCatalog, SolverConfig, Transformation,
};
pub use ordering::order_ids;

use serde::Serialize;

/// A computed layout together with everything the pipeline reported
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Solution {
    pub layout: AbsoluteLayout,
    pub diagnostics: Diagnostics,
}

impl Solution {
    /// Fail if any error-severity diagnostic was recorded
    pub fn strict(self) -> Result<Self, DiagnosticsError> {
        let Solution {
            layout,
            diagnostics,
        } = self;
        let diagnostics = diagnostics.into_result()?;
        Ok(Solution {
            layout,
            diagnostics,
        })
    }
}

/// Solve a layout against a shape catalog
///
/// # Example
///
/// ```rust
/// use boxgrid::{solve, BoxShapeCatalog, BoxSpec, IssueCode, LayoutSpec, SectionSpec, SolverConfig};
///
/// let layout = LayoutSpec::default()
///     .with_section("hero", SectionSpec::default().with_box("title", BoxSpec::new("missing")));
///
/// let solution = solve(&layout, &BoxShapeCatalog::new(), &SolverConfig::default());
///
/// // Unknown shapes fall back to the default box size
/// assert!(solution.diagnostics.with_code(IssueCode::BoxShapeUnknown).count() > 0);
/// assert_eq!(solution.layout.dimensions[boxgrid::Breakpoint::Xs].columns, 2.0);
/// ```
pub fn solve(spec: &LayoutSpec, catalog: &dyn ShapeCatalog, config: &SolverConfig) -> Solution {
    let mut diagnostics = Diagnostics::new();
    let layout = layout::compute(spec, catalog, config, &mut diagnostics);

    tracing::debug!(
        diagnostics = diagnostics.len(),
        errors = diagnostics.has_errors(),
        "layout solved"
    );

    Solution {
        layout,
        diagnostics,
    }
}

/// Solve a loaded document with its own solver options
pub fn solve_document(document: &LayoutDocument) -> Solution {
    solve(&document.layout, &document.shapes, &document.solver)
}

/// Load a TOML document and solve it
pub fn solve_toml(source: &str) -> Result<Solution, DocumentError> {
    let document = LayoutDocument::from_toml_str(source)?;
    Ok(solve_document(&document))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solve_empty_layout() {
        let solution = solve(
            &LayoutSpec::default(),
            &BoxShapeCatalog::new(),
            &SolverConfig::default(),
        );
        assert_eq!(solution.diagnostics.with_code(IssueCode::EmptyGrid).count(), 5);
        for (_, dims) in solution.layout.dimensions.iter() {
            assert_eq!(*dims, GridDimensions { columns: 1.0, rows: 1.0 });
        }
    }

    #[test]
    fn test_solve_toml_rejects_bad_syntax() {
        assert!(matches!(
            solve_toml("[layout"),
            Err(DocumentError::Toml(_))
        ));
    }

    #[test]
    fn test_document_solver_options_apply() {
        let solution = solve_toml(
            r#"
            [solver]
            overlap_policy = "error"
            overlap_breakpoints = ["xs"]

            [shapes]
            unit = [1, 1]

            [layout.sections.s.boxes]
            a = { dimension = "unit" }
            b = { dimension = "unit" }
            "#,
        )
        .unwrap();

        let overlaps: Vec<_> = solution
            .diagnostics
            .with_code(IssueCode::OverlapNotAllowed)
            .collect();
        assert_eq!(overlaps.len(), 1);
        assert_eq!(overlaps[0].breakpoint(), Some(Breakpoint::Xs));
        assert!(solution.strict().is_err());
    }

    #[test]
    fn test_strict_keeps_warnings() {
        let solution = solve_toml(
            r#"
            [layout.sections.s.boxes]
            a = { dimension = "nope" }
            "#,
        )
        .unwrap();
        let strict = solution.strict().unwrap();
        assert!(!strict.diagnostics.is_empty());
    }
}
