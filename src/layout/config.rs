//! Configuration for the layout solver

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::breakpoint::Breakpoint;
use crate::geometry::Coordinate;

/// Whether `(width, height)` can size a box: both finite and strictly positive
pub fn is_usable_size(width: f64, height: f64) -> bool {
    width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0
}

/// What to do when two boxes overlap in the final layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlapPolicy {
    /// Skip the overlap check entirely
    #[default]
    Allow,
    /// Report each overlap as a warning
    Warn,
    /// Report each overlap as an error
    Error,
}

impl fmt::Display for OverlapPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlapPolicy::Allow => write!(f, "allow"),
            OverlapPolicy::Warn => write!(f, "warn"),
            OverlapPolicy::Error => write!(f, "error"),
        }
    }
}

/// Error returned when parsing an overlap policy name
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown overlap policy '{0}' (expected allow, warn or error)")]
pub struct UnknownOverlapPolicy(pub String);

impl FromStr for OverlapPolicy {
    type Err = UnknownOverlapPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "allow" => Ok(OverlapPolicy::Allow),
            "warn" => Ok(OverlapPolicy::Warn),
            "error" => Ok(OverlapPolicy::Error),
            other => Err(UnknownOverlapPolicy(other.to_string())),
        }
    }
}

/// Configuration options for layout solving
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Overlap audit policy
    pub overlap_policy: OverlapPolicy,

    /// Breakpoints the overlap audit runs at
    pub overlap_breakpoints: Vec<Breakpoint>,

    /// Size (width, height) used whenever a box shape cannot be resolved
    pub default_box_size: (f64, f64),
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            overlap_policy: OverlapPolicy::Allow,
            overlap_breakpoints: Breakpoint::ALL.to_vec(),
            default_box_size: (1.0, 1.0),
        }
    }
}

impl SolverConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the overlap policy
    pub fn with_overlap_policy(mut self, policy: OverlapPolicy) -> Self {
        self.overlap_policy = policy;
        self
    }

    /// Restrict the overlap audit to the given breakpoints
    pub fn with_overlap_breakpoints(mut self, breakpoints: impl Into<Vec<Breakpoint>>) -> Self {
        self.overlap_breakpoints = breakpoints.into();
        self
    }

    /// Set the fallback box size
    pub fn with_default_box_size(mut self, width: f64, height: f64) -> Self {
        self.default_box_size = (width, height);
        self
    }

    /// Whether the configured default box size is usable as is
    pub fn has_usable_default_size(&self) -> bool {
        let (w, h) = self.default_box_size;
        is_usable_size(w, h)
    }

    /// Size given to boxes whose shape cannot be resolved. An unusable
    /// `default_box_size` is replaced by 1x1.
    pub fn fallback_box_size(&self) -> Coordinate {
        if self.has_usable_default_size() {
            Coordinate::from(self.default_box_size)
        } else {
            Coordinate::new(1.0, 1.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SolverConfig::default();
        assert_eq!(config.overlap_policy, OverlapPolicy::Allow);
        assert_eq!(config.overlap_breakpoints, Breakpoint::ALL.to_vec());
        assert_eq!(config.default_box_size, (1.0, 1.0));
    }

    #[test]
    fn test_builder_pattern() {
        let config = SolverConfig::new()
            .with_overlap_policy(OverlapPolicy::Warn)
            .with_overlap_breakpoints([Breakpoint::Xs])
            .with_default_box_size(2.0, 1.0);

        assert_eq!(config.overlap_policy, OverlapPolicy::Warn);
        assert_eq!(config.overlap_breakpoints, vec![Breakpoint::Xs]);
        assert_eq!(config.default_box_size, (2.0, 1.0));
    }

    #[test]
    fn test_unusable_default_size_falls_back_to_unit() {
        for (w, h) in [(0.0, 0.0), (-2.0, 1.0), (f64::NAN, 1.0), (2.0, f64::INFINITY)] {
            let config = SolverConfig::new().with_default_box_size(w, h);
            assert!(!config.has_usable_default_size());
            assert_eq!(config.fallback_box_size(), Coordinate::new(1.0, 1.0));
        }

        let config = SolverConfig::new().with_default_box_size(3.0, 2.0);
        assert_eq!(config.fallback_box_size(), Coordinate::new(3.0, 2.0));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: SolverConfig = toml::from_str(r#"overlap_policy = "error""#).unwrap();
        assert_eq!(config.overlap_policy, OverlapPolicy::Error);
        assert_eq!(config.overlap_breakpoints.len(), 5);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("warn".parse(), Ok(OverlapPolicy::Warn));
        assert!("loud".parse::<OverlapPolicy>().is_err());
    }
}
