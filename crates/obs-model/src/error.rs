//! Error types for the attendance data model.

use thiserror::Error;

/// Errors raised by model lookups and parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Field name does not resolve, or the field is absent from the schema.
    #[error("unknown field '{field}'")]
    UnknownField { field: String },

    /// Top-N limit could not be parsed.
    #[error("invalid limit '{value}': expected a number or 'all'")]
    InvalidLimit { value: String },

    /// Age band label is not part of the taxonomy.
    #[error("invalid age band '{value}'")]
    InvalidAgeBand { value: String },
}

impl ModelError {
    pub fn unknown_field(field: impl Into<String>) -> Self {
        Self::UnknownField {
            field: field.into(),
        }
    }
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ModelError::unknown_field("unidade");
        assert_eq!(err.to_string(), "unknown field 'unidade'");
    }
}
