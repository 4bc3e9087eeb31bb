//! Layout documents
//!
//! A document bundles everything one solve needs: solver options, the box
//! shape catalog and the layout itself. Documents are TOML by default; files
//! ending in `.json` are read as JSON.
//!
//! ```toml
//! [solver]
//! overlap_policy = "warn"
//!
//! [shapes]
//! unit = [1, 1]
//! wide = [4, 1]
//!
//! [layout.sections.hero.boxes]
//! title = { dimension = "wide" }
//! cta = { dimension = "unit" }
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::DocumentError;
use crate::layout::{BoxShapeCatalog, LayoutSpec, SolverConfig};

/// Solver options, shape catalog and layout loaded together
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutDocument {
    pub solver: SolverConfig,
    pub shapes: BoxShapeCatalog,
    pub layout: LayoutSpec,
}

impl LayoutDocument {
    /// Load a document, choosing the format from the file extension
    pub fn from_file(path: &Path) -> Result<Self, DocumentError> {
        let content = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if is_json(path) {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    /// Load a document from TOML source
    pub fn from_toml_str(content: &str) -> Result<Self, DocumentError> {
        Ok(toml::from_str(content)?)
    }

    /// Load a document from JSON source
    pub fn from_json_str(content: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(content)?)
    }
}

/// Whether a path names a JSON document
pub fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
