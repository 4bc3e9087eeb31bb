//! Layout pipeline
//!
//! Section specs become section-local boxes, then bounding boxes, then one
//! absolute grid per breakpoint. Every stage appends to the same
//! [`Diagnostics`] and always produces a best-effort result.

pub mod absolute;
pub mod bounds;
pub mod config;
pub mod lint;
pub mod local;
pub mod shape;
pub mod spec;
pub mod transform;

pub use absolute::{AbsoluteLayout, GridArea, GridDimensions};
pub use config::{OverlapPolicy, SolverConfig};
pub use lint::check_overlaps;
pub use shape::{BoxShapeCatalog, ShapeCatalog};
pub use spec::{BoxSpec, DimensionSpec, LayoutSpec, SectionSpec, TransformationSet};
pub use transform::{AnchorRef, BoxRef, Offset, Param, Target, Transformation};

use crate::diagnostics::Diagnostics;

/// Run the whole pipeline, including the overlap audit configured in `config`
pub fn compute(
    layout: &LayoutSpec,
    catalog: &dyn ShapeCatalog,
    config: &SolverConfig,
    diagnostics: &mut Diagnostics,
) -> AbsoluteLayout {
    let result = compute_absolute_layout(layout, catalog, config, diagnostics);
    check_overlaps(
        &result,
        &config.overlap_breakpoints,
        config.overlap_policy,
        diagnostics,
    );
    result
}

/// Build the absolute layout without auditing overlaps
pub fn compute_absolute_layout(
    layout: &LayoutSpec,
    catalog: &dyn ShapeCatalog,
    config: &SolverConfig,
    diagnostics: &mut Diagnostics,
) -> AbsoluteLayout {
    tracing::debug!(sections = layout.sections.len(), "computing layout");

    let local = local::build_local_layout(layout, catalog, config, diagnostics);
    let bounds = bounds::compute_bounds(&local, diagnostics);
    absolute::assemble(local, &bounds, layout.transformations.as_ref(), diagnostics)
}
