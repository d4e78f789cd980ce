//! Schema definition errors
//!
//! These are raised while a schema is being built or loaded, never while a
//! table is being validated.

use thiserror::Error;

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Schema construction errors
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Duplicate column in schema: {0}")]
    DuplicateColumn(String),

    #[error("Column '{column}': invalid pattern {pattern:?}: {reason}")]
    InvalidPattern {
        column: String,
        pattern: String,
        reason: String,
    },

    #[error("Column '{column}': range minimum {min} exceeds maximum {max}")]
    InvalidRange { column: String, min: f64, max: f64 },

    #[error("Malformed schema '{source_name}': {reason}")]
    Malformed { source_name: String, reason: String },

    #[error("Failed to read schema file: {0}")]
    Io(#[from] std::io::Error),
}

impl SchemaError {
    pub fn malformed(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaError::Malformed {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }
}
