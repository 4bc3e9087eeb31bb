//! Box-shape resolution
//!
//! Maps a [`DimensionSpec`] to a concrete diagonal at every breakpoint using
//! a [`ShapeCatalog`]. Missing, unknown or invalid entries degrade to the
//! configured default size and leave a diagnostic behind.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::breakpoint::{Breakpoint, Bps};
use crate::diagnostics::{Diagnostic, Diagnostics, IssueCode, Origin};
use crate::geometry::Coordinate;

use super::config::{is_usable_size, SolverConfig};
use super::spec::DimensionSpec;

/// Lookup of named box sizes
pub trait ShapeCatalog {
    /// `(width, height)` for a shape name
    fn get(&self, name: &str) -> Option<(f64, f64)>;
}

/// In-memory shape catalog, deserialized from a `name = [width, height]` table
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct BoxShapeCatalog {
    shapes: HashMap<String, [f64; 2]>,
}

impl BoxShapeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, width: f64, height: f64) {
        self.shapes.insert(name.into(), [width, height]);
    }

    pub fn with_shape(mut self, name: impl Into<String>, width: f64, height: f64) -> Self {
        self.insert(name, width, height);
        self
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

impl ShapeCatalog for BoxShapeCatalog {
    fn get(&self, name: &str) -> Option<(f64, f64)> {
        self.shapes.get(name).map(|&[w, h]| (w, h))
    }
}

impl ShapeCatalog for HashMap<String, (f64, f64)> {
    fn get(&self, name: &str) -> Option<(f64, f64)> {
        HashMap::get(self, name).copied()
    }
}

/// Section and box a shape is being resolved for
#[derive(Debug, Clone, Copy)]
pub struct ShapeContext<'a> {
    pub section: &'a str,
    pub box_id: &'a str,
}

/// Resolve a dimension spec to a diagonal at every breakpoint
pub fn resolve_shape(
    spec: &DimensionSpec,
    ctx: ShapeContext<'_>,
    catalog: &dyn ShapeCatalog,
    config: &SolverConfig,
    diagnostics: &mut Diagnostics,
) -> Bps<Coordinate> {
    let fallback = config.fallback_box_size();

    match spec {
        DimensionSpec::Uniform(name) => {
            let size = lookup(name, None, ctx, catalog, fallback, diagnostics);
            Bps::splat(size)
        }
        DimensionSpec::PerBreakpoint(map) => {
            let unknown: Vec<&str> = map
                .keys()
                .map(String::as_str)
                .filter(|key| key.parse::<Breakpoint>().is_err())
                .collect();
            if !unknown.is_empty() {
                tracing::debug!(
                    section = ctx.section,
                    box_id = ctx.box_id,
                    keys = ?unknown,
                    "ignoring non-breakpoint keys in shape spec"
                );
            }

            Bps::from_fn(|bp| match map.get(bp.as_str()) {
                Some(Value::String(name)) => {
                    lookup(name, Some(bp), ctx, catalog, fallback, diagnostics)
                }
                entry => {
                    let message = match entry {
                        None | Some(Value::Null) => format!(
                            "box '{}' in section '{}' has no shape at breakpoint {}; using {}x{}",
                            ctx.box_id, ctx.section, bp, fallback.x, fallback.y
                        ),
                        Some(_) => format!(
                            "box '{}' in section '{}' has a non-string shape at breakpoint {}; using {}x{}",
                            ctx.box_id, ctx.section, bp, fallback.x, fallback.y
                        ),
                    };
                    diagnostics.push(
                        Diagnostic::warning(Origin::BoxShape, IssueCode::BoxShapeMissingBp, message)
                            .with_details(json!({
                                "section": ctx.section,
                                "box": ctx.box_id,
                                "bp": bp,
                                "spec": entry,
                            })),
                    );
                    fallback
                }
            })
        }
        DimensionSpec::Malformed(value) => Bps::from_fn(|bp| {
            diagnostics.push(
                Diagnostic::warning(
                    Origin::BoxShape,
                    IssueCode::BoxShapeMissingBp,
                    format!(
                        "box '{}' in section '{}' has an unusable shape spec; using {}x{} at {}",
                        ctx.box_id, ctx.section, fallback.x, fallback.y, bp
                    ),
                )
                .with_details(json!({
                    "section": ctx.section,
                    "box": ctx.box_id,
                    "bp": bp,
                    "spec": value,
                })),
            );
            fallback
        }),
    }
}

fn lookup(
    name: &str,
    bp: Option<Breakpoint>,
    ctx: ShapeContext<'_>,
    catalog: &dyn ShapeCatalog,
    fallback: Coordinate,
    diagnostics: &mut Diagnostics,
) -> Coordinate {
    let details = json!({
        "section": ctx.section,
        "box": ctx.box_id,
        "shape": name,
        "bp": bp,
    });

    match catalog.get(name) {
        Some((w, h)) if is_usable_size(w, h) => Coordinate::new(w, h),
        Some((w, h)) => {
            diagnostics.push(
                Diagnostic::warning(
                    Origin::BoxShape,
                    IssueCode::BoxShapeInvalid,
                    format!(
                        "shape '{}' has non-positive size {}x{}; box '{}' uses {}x{}",
                        name, w, h, ctx.box_id, fallback.x, fallback.y
                    ),
                )
                .with_details(details),
            );
            fallback
        }
        None => {
            diagnostics.push(
                Diagnostic::warning(
                    Origin::BoxShape,
                    IssueCode::BoxShapeUnknown,
                    format!(
                        "unknown shape '{}' for box '{}' in section '{}'; using {}x{}",
                        name, ctx.box_id, ctx.section, fallback.x, fallback.y
                    ),
                )
                .with_details(details),
            );
            fallback
        }
    }
}
