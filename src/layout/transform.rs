//! Transformation operations and their evaluator
//!
//! A transformation repositions one box, or every box, in a map of named
//! [`GridBox`]es. Lists of transformations are applied strictly in order:
//! later operations read the positions left by earlier ones.
//!
//! The same evaluator runs at two levels. Inside a section it moves member
//! boxes; one level up it moves section bounding boxes, addressed by
//! section id.
//!
//! ## Failure handling
//!
//! An operation that references an unknown box, names an unknown anchor or
//! carries a malformed target is skipped. A diagnostic records why, and the
//! remaining operations still run.

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::breakpoint::Breakpoint;
use crate::diagnostics::{Diagnostic, Diagnostics, IssueCode, Origin};
use crate::geometry::{Anchor, Axis, Coordinate, GridBox};
use crate::idmap::IdMap;

/// A box and one of its anchors
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorRef {
    pub box_id: String,
    /// Anchor name, resolved when the operation runs
    pub anchor: String,
}

impl AnchorRef {
    pub fn new(box_id: impl Into<String>, anchor: Anchor) -> Self {
        Self {
            box_id: box_id.into(),
            anchor: anchor.as_str().to_string(),
        }
    }
}

/// A box without an anchor
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxRef {
    pub box_id: String,
}

impl BoxRef {
    pub fn new(box_id: impl Into<String>) -> Self {
        Self {
            box_id: box_id.into(),
        }
    }
}

/// An operation argument as written in the document.
///
/// Input of the wrong shape (or a missing argument) is kept as raw JSON so
/// that the operation still loads and is reported when it runs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Param<T> {
    Valid(T),
    Malformed(Value),
}

impl<T> Default for Param<T> {
    fn default() -> Self {
        Param::Malformed(Value::Null)
    }
}

impl<T> From<T> for Param<T> {
    fn from(value: T) -> Self {
        Param::Valid(value)
    }
}

/// Destination of a move or an alignment.
///
/// Axis operations read the matching component; `moveTo` with a single
/// number uses it on both axes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Target {
    Point(Coordinate),
    Value(f64),
    Anchor(AnchorRef),
    Malformed(Value),
}

impl Default for Target {
    fn default() -> Self {
        Target::Malformed(Value::Null)
    }
}

impl From<Coordinate> for Target {
    fn from(point: Coordinate) -> Self {
        Target::Point(point)
    }
}

impl From<f64> for Target {
    fn from(value: f64) -> Self {
        Target::Value(value)
    }
}

impl From<AnchorRef> for Target {
    fn from(anchor: AnchorRef) -> Self {
        Target::Anchor(anchor)
    }
}

/// A displacement, either a vector or one amount for both axes
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Offset {
    Vector(Coordinate),
    Uniform(f64),
    Malformed(Value),
}

impl Default for Offset {
    fn default() -> Self {
        Offset::Malformed(Value::Null)
    }
}

impl From<Coordinate> for Offset {
    fn from(vector: Coordinate) -> Self {
        Offset::Vector(vector)
    }
}

impl From<f64> for Offset {
    fn from(amount: f64) -> Self {
        Offset::Uniform(amount)
    }
}

/// One positioning operation
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Transformation {
    /// Translate a box so that its anchor lands on the target (plus gap)
    MoveTo {
        #[serde(default)]
        from: Param<AnchorRef>,
        #[serde(default)]
        to: Target,
        #[serde(default)]
        gap: Option<Offset>,
    },
    /// Translate a box by a fixed displacement (plus gap)
    MoveBy {
        #[serde(default)]
        from: Param<BoxRef>,
        #[serde(default)]
        by: Offset,
        #[serde(default)]
        gap: Option<Offset>,
    },
    /// Like `MoveTo`, on the x axis only
    AlignToX {
        #[serde(default)]
        from: Param<AnchorRef>,
        #[serde(default)]
        to: Target,
        #[serde(default)]
        gap: Option<Param<f64>>,
    },
    /// Like `MoveTo`, on the y axis only
    AlignToY {
        #[serde(default)]
        from: Param<AnchorRef>,
        #[serde(default)]
        to: Target,
        #[serde(default)]
        gap: Option<Param<f64>>,
    },
    /// `AlignToX` applied to every box in the map
    AlignAllToX {
        #[serde(default)]
        to: Target,
        #[serde(default)]
        anchor: Param<String>,
        #[serde(default)]
        gap: Option<Param<f64>>,
    },
    /// `AlignToY` applied to every box in the map
    AlignAllToY {
        #[serde(default)]
        to: Target,
        #[serde(default)]
        anchor: Param<String>,
        #[serde(default)]
        gap: Option<Param<f64>>,
    },
    /// Lay boxes out left to right in map order
    StackHorizontally {
        #[serde(default)]
        gap: Option<Param<f64>>,
    },
    /// Lay boxes out bottom to top in map order
    StackVertically {
        #[serde(default)]
        gap: Option<Param<f64>>,
    },
}

impl Transformation {
    pub fn stack_horizontally(gap: f64) -> Self {
        Transformation::StackHorizontally {
            gap: Some(gap.into()),
        }
    }

    pub fn stack_vertically(gap: f64) -> Self {
        Transformation::StackVertically {
            gap: Some(gap.into()),
        }
    }

    /// Operation name as written in layout documents
    pub fn verb(&self) -> &'static str {
        match self {
            Transformation::MoveTo { .. } => "moveTo",
            Transformation::MoveBy { .. } => "moveBy",
            Transformation::AlignToX { .. } => "alignToX",
            Transformation::AlignToY { .. } => "alignToY",
            Transformation::AlignAllToX { .. } => "alignAllToX",
            Transformation::AlignAllToY { .. } => "alignAllToY",
            Transformation::StackHorizontally { .. } => "stackHorizontally",
            Transformation::StackVertically { .. } => "stackVertically",
        }
    }
}

/// Where a transformation runs, used to give diagnostics context
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    pub breakpoint: Breakpoint,
    /// Section whose members are being moved; `None` for section-level lists
    pub section: Option<&'a str>,
}

impl<'a> Scope<'a> {
    pub fn section(section: &'a str, breakpoint: Breakpoint) -> Self {
        Self {
            breakpoint,
            section: Some(section),
        }
    }

    pub fn layout(breakpoint: Breakpoint) -> Self {
        Self {
            breakpoint,
            section: None,
        }
    }
}

/// Apply a list of transformations in order
pub fn evaluate_all(
    ops: &[Transformation],
    boxes: &mut IdMap<GridBox>,
    scope: Scope<'_>,
    diagnostics: &mut Diagnostics,
) {
    for op in ops {
        evaluate(op, boxes, scope, diagnostics);
    }
}

/// Apply one transformation to `boxes` in place.
///
/// On failure the boxes are left as they were and a diagnostic is recorded.
pub fn evaluate(
    op: &Transformation,
    boxes: &mut IdMap<GridBox>,
    scope: Scope<'_>,
    diagnostics: &mut Diagnostics,
) {
    tracing::trace!(
        verb = op.verb(),
        bp = %scope.breakpoint,
        section = scope.section.unwrap_or("<layout>"),
        "applying transformation"
    );

    let mut eval = Evaluation {
        scope,
        verb: op.verb(),
        diagnostics,
    };

    match op {
        Transformation::MoveTo { from, to, gap } => {
            eval.move_to(boxes, from, to, gap.as_ref());
        }
        Transformation::MoveBy { from, by, gap } => {
            eval.move_by(boxes, from, by, gap.as_ref());
        }
        Transformation::AlignToX { from, to, gap } => {
            eval.align(boxes, from, to, gap.as_ref(), Axis::X);
        }
        Transformation::AlignToY { from, to, gap } => {
            eval.align(boxes, from, to, gap.as_ref(), Axis::Y);
        }
        Transformation::AlignAllToX { to, anchor, gap } => {
            eval.align_all(boxes, to, anchor, gap.as_ref(), Axis::X);
        }
        Transformation::AlignAllToY { to, anchor, gap } => {
            eval.align_all(boxes, to, anchor, gap.as_ref(), Axis::Y);
        }
        Transformation::StackHorizontally { gap } => {
            eval.stack(boxes, gap.as_ref(), Axis::X);
        }
        Transformation::StackVertically { gap } => {
            eval.stack(boxes, gap.as_ref(), Axis::Y);
        }
    }
}

/// Running cursor along `axis`; each box's leading edge is placed on it
fn stack(boxes: &mut IdMap<GridBox>, gap: f64, axis: Axis) {
    let mut cursor = 0.0;
    for b in boxes.values_mut() {
        let lead = b.origin.along(axis);
        b.translate(axis.vector(cursor - lead));
        cursor += b.extent(axis) + gap;
    }
}

struct Evaluation<'s, 'd> {
    scope: Scope<'s>,
    verb: &'static str,
    diagnostics: &'d mut Diagnostics,
}

const ANCHOR_REF: &str = "{boxId, anchor}";
const BOX_REF: &str = "{boxId}";

impl Evaluation<'_, '_> {
    fn move_to(
        &mut self,
        boxes: &mut IdMap<GridBox>,
        from: &Param<AnchorRef>,
        to: &Target,
        gap: Option<&Offset>,
    ) -> Option<()> {
        let from = self.param(from, "from", ANCHOR_REF)?;
        let (source, anchor) = self.anchored_box(boxes, from)?;
        let target = self.target(boxes, to)?;
        let gap = match gap {
            Some(gap) => self.offset(gap, "gap")?,
            None => Coordinate::ZERO,
        };

        let delta = target + gap - source.anchor(anchor);
        translate(boxes, &from.box_id, delta)
    }

    fn move_by(
        &mut self,
        boxes: &mut IdMap<GridBox>,
        from: &Param<BoxRef>,
        by: &Offset,
        gap: Option<&Offset>,
    ) -> Option<()> {
        let from = self.param(from, "from", BOX_REF)?;
        self.lookup(boxes, &from.box_id)?;
        let by = self.offset(by, "by")?;
        let gap = match gap {
            Some(gap) => self.offset(gap, "gap")?,
            None => Coordinate::ZERO,
        };

        translate(boxes, &from.box_id, by + gap)
    }

    fn align(
        &mut self,
        boxes: &mut IdMap<GridBox>,
        from: &Param<AnchorRef>,
        to: &Target,
        gap: Option<&Param<f64>>,
        axis: Axis,
    ) -> Option<()> {
        let from = self.param(from, "from", ANCHOR_REF)?;
        let (source, anchor) = self.anchored_box(boxes, from)?;
        let target = self.target(boxes, to)?.along(axis);
        let gap = self.gap(gap)?;

        let current = source.anchor(anchor).along(axis);
        translate(boxes, &from.box_id, axis.vector(target + gap - current))
    }

    /// The target is resolved once, before any box moves
    fn align_all(
        &mut self,
        boxes: &mut IdMap<GridBox>,
        to: &Target,
        anchor: &Param<String>,
        gap: Option<&Param<f64>>,
        axis: Axis,
    ) -> Option<()> {
        let anchor = self.param(anchor, "anchor", "an anchor name")?;
        let anchor = self.anchor(anchor, None)?;
        let target = self.target(boxes, to)?.along(axis);
        let gap = self.gap(gap)?;

        for b in boxes.values_mut() {
            let current = b.anchor(anchor).along(axis);
            b.translate(axis.vector(target + gap - current));
        }
        Some(())
    }

    fn stack(
        &mut self,
        boxes: &mut IdMap<GridBox>,
        gap: Option<&Param<f64>>,
        axis: Axis,
    ) -> Option<()> {
        let gap = self.gap(gap)?;
        stack(boxes, gap, axis);
        Some(())
    }

    // ── Reference resolution ──────────────────────────────────────

    fn lookup(&mut self, boxes: &IdMap<GridBox>, box_id: &str) -> Option<GridBox> {
        if let Some(b) = boxes.get(box_id) {
            return Some(*b);
        }

        let suggestions = find_similar(boxes.keys(), box_id, 2);
        let mut message = format!(
            "{}: unknown box '{}'{}",
            self.verb,
            box_id,
            self.location()
        );
        if let Some(first) = suggestions.first() {
            message.push_str(&format!(" (did you mean '{}'?)", first));
        }
        self.fail(
            IssueCode::UnknownNodeId,
            message,
            json!({ "boxId": box_id, "suggestions": suggestions }),
        );
        None
    }

    fn anchor(&mut self, name: &str, box_id: Option<&str>) -> Option<Anchor> {
        match name.parse::<Anchor>() {
            Ok(anchor) => Some(anchor),
            Err(_) => {
                let message = format!(
                    "{}: unknown anchor '{}'{} (valid anchors: {})",
                    self.verb,
                    name,
                    self.location(),
                    Anchor::valid_names()
                );
                self.fail(
                    IssueCode::UnknownAnchor,
                    message,
                    json!({ "anchor": name, "boxId": box_id }),
                );
                None
            }
        }
    }

    fn anchored_box(&mut self, boxes: &IdMap<GridBox>, r: &AnchorRef) -> Option<(GridBox, Anchor)> {
        let b = self.lookup(boxes, &r.box_id)?;
        let anchor = self.anchor(&r.anchor, Some(r.box_id.as_str()))?;
        Some((b, anchor))
    }

    fn anchor_point(&mut self, boxes: &IdMap<GridBox>, r: &AnchorRef) -> Option<Coordinate> {
        let (b, anchor) = self.anchored_box(boxes, r)?;
        Some(b.anchor(anchor))
    }

    /// Shared by every operation with a `to`; a bare number covers both axes
    fn target(&mut self, boxes: &IdMap<GridBox>, to: &Target) -> Option<Coordinate> {
        match to {
            Target::Point(point) => self.finite(*point, "to"),
            Target::Value(v) => self.finite(Coordinate::splat(*v), "to"),
            Target::Anchor(r) => self.anchor_point(boxes, r),
            Target::Malformed(raw) => {
                self.invalid_params("to", "a number, a coordinate {x, y} or {boxId, anchor}", raw);
                None
            }
        }
    }

    fn offset(&mut self, offset: &Offset, field: &str) -> Option<Coordinate> {
        match offset {
            Offset::Vector(v) => self.finite(*v, field),
            Offset::Uniform(amount) => self.finite(Coordinate::splat(*amount), field),
            Offset::Malformed(raw) => {
                self.invalid_params(field, "a number or a coordinate {x, y}", raw);
                None
            }
        }
    }

    /// A scalar gap; absent means zero
    fn gap(&mut self, gap: Option<&Param<f64>>) -> Option<f64> {
        match gap {
            None => Some(0.0),
            Some(Param::Valid(v)) => self.finite(Coordinate::splat(*v), "gap").map(|c| c.x),
            Some(Param::Malformed(raw)) => {
                self.invalid_params("gap", "a number", raw);
                None
            }
        }
    }

    fn param<'p, T>(&mut self, param: &'p Param<T>, field: &str, expected: &str) -> Option<&'p T> {
        match param {
            Param::Valid(value) => Some(value),
            Param::Malformed(raw) => {
                self.invalid_params(field, expected, raw);
                None
            }
        }
    }

    fn finite(&mut self, value: Coordinate, field: &str) -> Option<Coordinate> {
        if value.is_finite() {
            return Some(value);
        }
        let shown = if value.x.to_bits() == value.y.to_bits() {
            value.x.to_string()
        } else {
            format!("{{x: {}, y: {}}}", value.x, value.y)
        };
        let message = format!(
            "{}: '{}' must be finite{}, got {}",
            self.verb,
            field,
            self.location(),
            shown
        );
        self.fail(
            IssueCode::InvalidTransformationParams,
            message,
            json!({ "field": field, "value": shown }),
        );
        None
    }

    // ── Diagnostics ───────────────────────────────────────────────

    fn invalid_params(&mut self, field: &str, expected: &str, raw: &Value) {
        let message = format!(
            "{}: '{}' must be {}{}, got {}",
            self.verb,
            field,
            expected,
            self.location(),
            raw
        );
        self.fail(
            IssueCode::InvalidTransformationParams,
            message,
            json!({ "field": field, "value": raw }),
        );
    }

    fn location(&self) -> String {
        match self.scope.section {
            Some(section) => format!(" in section '{}' at {}", section, self.scope.breakpoint),
            None => format!(" among sections at {}", self.scope.breakpoint),
        }
    }

    fn fail(&mut self, code: IssueCode, message: String, mut details: Value) {
        if let Value::Object(map) = &mut details {
            map.insert("bp".into(), json!(self.scope.breakpoint));
            map.insert("section".into(), json!(self.scope.section));
            map.insert("operation".into(), json!(self.verb));
        }
        self.diagnostics
            .push(Diagnostic::error(Origin::Transformation, code, message).with_details(details));
    }
}

fn translate(boxes: &mut IdMap<GridBox>, box_id: &str, delta: Coordinate) -> Option<()> {
    boxes.get_mut(box_id)?.translate(delta);
    Some(())
}

/// Compute Levenshtein edit distance between two strings
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Known ids within `max_distance` edits of `target`, closest first
fn find_similar<'a>(
    known: impl Iterator<Item = &'a str>,
    target: &str,
    max_distance: usize,
) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut candidates: Vec<(&str, usize)> = known
        .filter(|id| seen.insert(*id))
        .filter_map(|id| {
            let dist = levenshtein_distance(id, target);
            (dist > 0 && dist <= max_distance).then_some((id, dist))
        })
        .collect();

    candidates.sort_by_key(|(_, d)| *d);
    candidates
        .into_iter()
        .take(3)
        .map(|(id, _)| id.to_string())
        .collect()
}
