//! Errors raised while loading layout documents

use std::path::PathBuf;

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("failed to read layout document {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse layout TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to parse layout JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl DocumentError {
    /// Location of the error in the document source, if known
    pub fn span(&self, source: &str) -> Option<Span> {
        match self {
            DocumentError::Io { .. } => None,
            DocumentError::Toml(e) => e.span(),
            DocumentError::Json(e) => {
                let offset = line_column_offset(source, e.line(), e.column())?;
                Some(offset..(offset + 1).min(source.len()))
            }
        }
    }

    fn detail(&self) -> String {
        match self {
            DocumentError::Toml(e) => e.message().to_string(),
            other => other.to_string(),
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let Some(span) = self.span(source) else {
            return self.to_string();
        };

        let mut buf = Vec::new();
        let message = self.detail();
        let written = Report::build(ReportKind::Error, filename, span.start)
            .with_message("invalid layout document")
            .with_label(
                Label::new((filename, span))
                    .with_message(message)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);

        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => self.to_string(),
        }
    }
}

/// Byte offset of a 1-based line and column
fn line_column_offset(source: &str, line: usize, column: usize) -> Option<usize> {
    if line == 0 {
        return None;
    }
    let line_start: usize = source
        .split_inclusive('\n')
        .take(line - 1)
        .map(str::len)
        .sum();
    Some((line_start + column.saturating_sub(1)).min(source.len()))
}
