//! Fixture errors

use arrow::error::ArrowError;
use thiserror::Error;

use crate::table::ColumnError;
use crate::validate::ValidationError;

/// Result type for fixture operations
pub type FixtureResult<T> = Result<T, FixtureError>;

/// Fixture construction errors
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("data must not be empty. Use make_empty() to create an empty table.")]
    EmptyData,

    #[error("Unknown columns in data: [{}]. Schema only defines: [{}]", quote(.unknown), quote(.declared))]
    UnknownColumns {
        unknown: Vec<String>,
        declared: Vec<String>,
    },

    #[error("Column '{column}' has {actual} rows, expected {expected}")]
    RaggedInput {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    #[error(transparent)]
    Column(#[from] ColumnError),

    /// A supplied column breaks its declaration.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

fn quote(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("'{}'", n))
        .collect::<Vec<_>>()
        .join(", ")
}
