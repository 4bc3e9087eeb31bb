//! Absolute layout assembly
//!
//! Turns section-local boxes into CSS grid-line coordinates shared by the
//! whole layout. Per breakpoint:
//!
//! 1. **Re-base**: member origins become offsets from their section's
//!    bounding-box corner.
//! 2. **Position sections**: bounding boxes are reset to the grid baseline
//!    `(1, 1)` and moved by the section-level transformation list. Sections
//!    are addressed by id exactly like boxes.
//! 3. **Re-offset**: positioned bounding-box origins are added back onto the
//!    member offsets.
//! 4. **Derive**: grid dimensions come from the far corners of the bounding
//!    boxes; every box becomes a [`GridArea`].
//!
//! A final pass shifts everything so no grid line is below 1.

use std::fmt;

use serde::Serialize;
use serde_json::json;

use crate::breakpoint::{Breakpoint, Bps};
use crate::diagnostics::{Diagnostic, Diagnostics, IssueCode, Origin};
use crate::geometry::{Coordinate, GridBox};
use crate::idmap::IdMap;

use super::local::LocalBoxes;
use super::spec::{transformations_at, TransformationSet};
use super::transform::{evaluate_all, Scope};

/// First line of a CSS grid
pub const GRID_BASELINE: Coordinate = Coordinate { x: 1.0, y: 1.0 };

/// A box in CSS grid-line form; end lines are exclusive
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridArea {
    pub col_start: f64,
    pub col_end: f64,
    pub row_start: f64,
    pub row_end: f64,
}

impl GridArea {
    pub fn new(col_start: f64, col_end: f64, row_start: f64, row_end: f64) -> Self {
        Self {
            col_start,
            col_end,
            row_start,
            row_end,
        }
    }

    pub fn from_box(b: &GridBox) -> Self {
        let col_start = b.origin.x;
        let row_start = b.origin.y;
        Self::new(
            col_start,
            col_start + b.width(),
            row_start,
            row_start + b.height(),
        )
    }

    /// Shift all four lines
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.col_start += dx;
        self.col_end += dx;
        self.row_start += dy;
        self.row_end += dy;
    }

    /// Strict intersection; areas that only share an edge do not intersect
    pub fn intersects(&self, other: &GridArea) -> bool {
        self.col_start < other.col_end
            && other.col_start < self.col_end
            && self.row_start < other.row_end
            && other.row_start < self.row_end
    }

    /// CSS `grid-area` shorthand: `row-start / column-start / row-end / column-end`
    pub fn css_grid_area(&self) -> String {
        format!(
            "{} / {} / {} / {}",
            self.row_start, self.col_start, self.row_end, self.col_end
        )
    }
}

/// Row and column counts of the grid at one breakpoint
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct GridDimensions {
    pub columns: f64,
    pub rows: f64,
}

/// Final coordinates of every box, per section and breakpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbsoluteLayout {
    /// section id → breakpoint → box id → area
    pub sections: IdMap<Bps<IdMap<GridArea>>>,
    pub dimensions: Bps<GridDimensions>,
    /// Shift applied by normalization at each breakpoint
    pub normalization: Bps<Coordinate>,
}

impl AbsoluteLayout {
    /// Area of one box
    pub fn area(&self, section: &str, bp: Breakpoint, box_id: &str) -> Option<&GridArea> {
        self.sections.get(section)?[bp].get(box_id)
    }

    /// Every `(section, box, area)` at a breakpoint, in layout order
    pub fn areas_at(&self, bp: Breakpoint) -> impl Iterator<Item = (&str, &str, &GridArea)> {
        self.sections.iter().flat_map(move |(section, per_bp)| {
            per_bp[bp]
                .iter()
                .map(move |(box_id, area)| (section, box_id, area))
        })
    }
}

impl fmt::Display for AbsoluteLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (bp, dims) in self.dimensions.iter() {
            writeln!(f, "{}: {} columns x {} rows", bp, dims.columns, dims.rows)?;
            for (section, box_id, area) in self.areas_at(bp) {
                writeln!(f, "  {}/{}: {}", section, box_id, area.css_grid_area())?;
            }
        }
        Ok(())
    }
}

/// Place every section and convert all boxes to grid lines
pub fn assemble(
    mut local: IdMap<LocalBoxes>,
    bounds: &IdMap<Bps<GridBox>>,
    section_transformations: Option<&TransformationSet>,
    diagnostics: &mut Diagnostics,
) -> AbsoluteLayout {
    let mut sections: IdMap<Bps<IdMap<GridArea>>> = local
        .keys()
        .map(|id| (id, Bps::default()))
        .collect();
    let mut dimensions = Bps::default();
    let mut normalization = Bps::splat(Coordinate::ZERO);

    for bp in Breakpoint::ALL {
        let mut section_boxes: IdMap<GridBox> = bounds
            .iter()
            .map(|(id, per_bp)| (id, per_bp[bp]))
            .collect();

        for (id, per_bp) in local.iter_mut() {
            let Some(corner) = section_boxes.get(id).map(|b| b.origin) else {
                continue;
            };
            for b in per_bp[bp].values_mut() {
                b.origin -= corner;
            }
        }

        for b in section_boxes.values_mut() {
            b.origin = GRID_BASELINE;
        }
        let ops = transformations_at(section_transformations, bp);
        evaluate_all(ops, &mut section_boxes, Scope::layout(bp), diagnostics);

        for (id, per_bp) in local.iter_mut() {
            let Some(corner) = section_boxes.get(id).map(|b| b.origin) else {
                continue;
            };
            for b in per_bp[bp].values_mut() {
                b.origin += corner;
            }
        }

        let far = section_boxes
            .values()
            .map(GridBox::far_corner)
            .fold(Coordinate::ZERO, Coordinate::max);
        dimensions[bp] = GridDimensions {
            columns: far.x,
            rows: far.y,
        };

        for (id, per_bp) in local.iter() {
            if let Some(out) = sections.get_mut(id) {
                out[bp] = per_bp[bp]
                    .iter()
                    .map(|(box_id, b)| (box_id, GridArea::from_box(b)))
                    .collect();
            }
        }

        normalization[bp] = normalize(&mut sections, &mut dimensions[bp], bp, diagnostics);
    }

    AbsoluteLayout {
        sections,
        dimensions,
        normalization,
    }
}

/// Shift every area at `bp` so the smallest start line is at least 1.
///
/// Returns the shift that was applied.
pub fn normalize(
    sections: &mut IdMap<Bps<IdMap<GridArea>>>,
    dims: &mut GridDimensions,
    bp: Breakpoint,
    diagnostics: &mut Diagnostics,
) -> Coordinate {
    let min = sections
        .values()
        .flat_map(|per_bp| per_bp[bp].values())
        .map(|a| Coordinate::new(a.col_start, a.row_start))
        .reduce(Coordinate::min);

    let Some(min) = min else {
        diagnostics.push(
            Diagnostic::warning(
                Origin::AbsoluteLayout,
                IssueCode::EmptyGrid,
                format!("no boxes to place at breakpoint {}; grid is 1x1", bp),
            )
            .with_details(json!({ "bp": bp })),
        );
        *dims = GridDimensions {
            columns: 1.0,
            rows: 1.0,
        };
        return Coordinate::ZERO;
    };

    if min.x >= 1.0 && min.y >= 1.0 {
        return Coordinate::ZERO;
    }

    let dx = (1.0 - min.x).max(0.0);
    let dy = (1.0 - min.y).max(0.0);
    for per_bp in sections.values_mut() {
        for area in per_bp[bp].values_mut() {
            area.translate(dx, dy);
        }
    }
    dims.columns += dx;
    dims.rows += dy;

    tracing::debug!(bp = %bp, dx, dy, "normalized grid lines");
    diagnostics.push(
        Diagnostic::warning(
            Origin::AbsoluteLayout,
            IssueCode::GridNormalizedToPositiveLines,
            format!(
                "boxes started at column {} / row {} at breakpoint {}; shifted by ({}, {})",
                min.x, min.y, bp, dx, dy
            ),
        )
        .with_details(json!({
            "bp": bp,
            "dx": dx,
            "dy": dy,
            "minColStart": min.x,
            "minRowStart": min.y,
        })),
    );

    Coordinate::new(dx, dy)
}
