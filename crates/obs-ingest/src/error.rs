//! Error types for attendance data ingestion.

use std::fmt::Display;

use thiserror::Error;

/// Errors that can occur while loading sources.
#[derive(Debug, Error)]
pub enum IngestError {
    /// A source could not be fetched, opened or listed.
    #[error("source unavailable: {name}: {reason}")]
    SourceUnavailable { name: String, reason: String },

    /// All sources together produced no data rows.
    #[error("no data rows found in {documents} document(s)")]
    EmptyResult { documents: usize },

    /// Encoding label is not known to `encoding_rs`.
    #[error("unsupported encoding '{label}'")]
    UnsupportedEncoding { label: String },

    /// Delimiter is not a single ASCII character.
    #[error("invalid delimiter '{value}': expected a single ASCII character")]
    InvalidDelimiter { value: char },
}

impl IngestError {
    pub fn unavailable(name: impl Display, reason: impl Display) -> Self {
        Self::SourceUnavailable {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }

    /// True for the "no data" condition callers render as an empty state.
    pub fn is_empty_result(&self) -> bool {
        matches!(self, Self::EmptyResult { .. })
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::unavailable("dados.csv", "file not found");
        assert_eq!(
            err.to_string(),
            "source unavailable: dados.csv: file not found"
        );
    }

    #[test]
    fn test_is_empty_result() {
        assert!(IngestError::EmptyResult { documents: 2 }.is_empty_result());
        assert!(!IngestError::unavailable("x", "y").is_empty_result());
    }
}
