//! Authoring-time layout description
//!
//! Plain data as it arrives from a document or a building-block catalog.
//! Nothing here is validated on construction; the pipeline degrades and
//! reports instead.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::breakpoint::{Breakpoint, Responsive};
use crate::idmap::IdMap;

use super::transform::Transformation;

/// Which catalog shape a box uses
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DimensionSpec {
    /// One shape identifier for every breakpoint
    Uniform(String),
    /// Entries keyed by breakpoint name, each resolved on its own. A missing
    /// or non-string entry falls back to the default size at that breakpoint
    /// only; keys that are not breakpoints are ignored.
    PerBreakpoint(BTreeMap<String, Value>),
    /// Anything else; every breakpoint falls back to the default size
    Malformed(Value),
}

impl From<&str> for DimensionSpec {
    fn from(name: &str) -> Self {
        DimensionSpec::Uniform(name.to_string())
    }
}

impl DimensionSpec {
    /// Per-breakpoint spec from `(breakpoint, shape)` pairs
    pub fn per_breakpoint<'a>(entries: impl IntoIterator<Item = (Breakpoint, &'a str)>) -> Self {
        DimensionSpec::PerBreakpoint(
            entries
                .into_iter()
                .map(|(bp, name)| (bp.as_str().to_string(), Value::from(name)))
                .collect(),
        )
    }

    /// Raw entry at `bp` of a per-breakpoint spec
    pub fn entry(&self, bp: Breakpoint) -> Option<&Value> {
        match self {
            DimensionSpec::PerBreakpoint(map) => map.get(bp.as_str()),
            _ => None,
        }
    }
}

/// A member box of a section
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BoxSpec {
    /// Shape reference. A box without one is skipped by the pipeline.
    pub dimension: Option<DimensionSpec>,
}

impl BoxSpec {
    pub fn new(dimension: impl Into<DimensionSpec>) -> Self {
        Self {
            dimension: Some(dimension.into()),
        }
    }
}

/// Transformation lists, either shared by all breakpoints or given per breakpoint
pub type TransformationSet = Responsive<Vec<Transformation>>;

/// Operations scheduled at `bp`; missing entries mean no operations
pub fn transformations_at(set: Option<&TransformationSet>, bp: Breakpoint) -> &[Transformation] {
    set.and_then(|s| s.at(bp)).map(Vec::as_slice).unwrap_or(&[])
}

/// A named group of boxes laid out together
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionSpec {
    #[serde(default)]
    pub boxes: IdMap<BoxSpec>,
    /// Box-level operations applied to this section's members
    pub transformations: Option<TransformationSet>,
    /// Reference ordering for the member boxes
    pub order: Option<Vec<String>>,
}

impl SectionSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_box(mut self, id: impl Into<String>, spec: BoxSpec) -> Self {
        self.boxes.insert(id, spec);
        self
    }

    pub fn with_transformations(mut self, set: impl Into<TransformationSet>) -> Self {
        self.transformations = Some(set.into());
        self
    }

    pub fn with_order<S: Into<String>>(mut self, order: impl IntoIterator<Item = S>) -> Self {
        self.order = Some(order.into_iter().map(Into::into).collect());
        self
    }
}

/// The full authoring-time layout
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LayoutSpec {
    #[serde(default)]
    pub sections: IdMap<SectionSpec>,
    /// Section-level operations; each section is addressed by its id
    pub transformations: Option<TransformationSet>,
}

impl LayoutSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_section(mut self, id: impl Into<String>, section: SectionSpec) -> Self {
        self.sections.insert(id, section);
        self
    }

    pub fn with_transformations(mut self, set: impl Into<TransformationSet>) -> Self {
        self.transformations = Some(set.into());
        self
    }
}
