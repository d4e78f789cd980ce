//! Validation error types
//!
//! Error codes:
//! - FRAME_MISSING_COLUMN (REJECT)
//! - FRAME_UNEXPECTED_COLUMNS (REJECT)
//! - FRAME_UNSUPPORTED_TYPE (REJECT)
//! - FRAME_WRONG_TYPE (REJECT)
//! - FRAME_CONSTRAINT_VIOLATION (REJECT)
//! - FRAME_UNKNOWN_VALIDATOR (INTERNAL)
//! - FRAME_CONSTRAINT_NOT_APPLICABLE (INTERNAL)

use arrow::datatypes::DataType;
use std::fmt;

use crate::scalar::Scalar;
use crate::table::ColumnError;

/// Severity levels for validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The table does not conform to the schema
    Reject,
    /// The schema itself cannot be evaluated against this table
    Internal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// Validation error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorCode {
    /// Required column absent from the table
    MissingColumn,
    /// Strict mode: table carries undeclared columns
    UnexpectedColumns,
    /// Schema type has no dtype family
    UnsupportedType,
    /// Column dtype outside the declared family
    WrongType,
    /// Column values fail a constraint
    ConstraintViolation,
    /// Annotation metadata that is not a known constraint
    UnknownValidator,
    /// Constraint cannot be evaluated on the column dtype
    ConstraintNotApplicable,
}

impl ValidationErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationErrorCode::MissingColumn => "FRAME_MISSING_COLUMN",
            ValidationErrorCode::UnexpectedColumns => "FRAME_UNEXPECTED_COLUMNS",
            ValidationErrorCode::UnsupportedType => "FRAME_UNSUPPORTED_TYPE",
            ValidationErrorCode::WrongType => "FRAME_WRONG_TYPE",
            ValidationErrorCode::ConstraintViolation => "FRAME_CONSTRAINT_VIOLATION",
            ValidationErrorCode::UnknownValidator => "FRAME_UNKNOWN_VALIDATOR",
            ValidationErrorCode::ConstraintNotApplicable => "FRAME_CONSTRAINT_NOT_APPLICABLE",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            ValidationErrorCode::UnknownValidator
            | ValidationErrorCode::ConstraintNotApplicable => Severity::Internal,
            _ => Severity::Reject,
        }
    }
}

impl fmt::Display for ValidationErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Validation error with full context
#[derive(Debug, Clone)]
pub struct ValidationError {
    code: ValidationErrorCode,
    message: String,
    /// Offending column, absent for table-level errors
    column: Option<String>,
    /// Bounded (row label, value) samples in row order
    samples: Vec<(usize, Scalar)>,
    /// Number of violating rows
    total: usize,
}

impl ValidationError {
    fn new(code: ValidationErrorCode, column: Option<String>, message: String) -> Self {
        Self {
            code,
            message,
            column,
            samples: Vec::new(),
            total: 0,
        }
    }

    /// Create a missing column error
    pub fn missing_column(column: impl Into<String>) -> Self {
        let column = column.into();
        let message = format!("Missing column: {}", column);
        Self::new(ValidationErrorCode::MissingColumn, Some(column), message)
    }

    /// Create an unexpected columns error. Both lists are reported sorted.
    pub fn unexpected_columns(mut extra: Vec<String>, mut declared: Vec<String>) -> Self {
        extra.sort();
        declared.sort();
        let message = format!(
            "Unexpected columns in data: [{}]. Schema only defines: [{}]",
            quote_list(&extra),
            quote_list(&declared)
        );
        Self::new(ValidationErrorCode::UnexpectedColumns, None, message)
    }

    /// Create an unsupported type error
    pub fn unsupported_type(column: impl Into<String>, type_name: impl Into<String>) -> Self {
        let message = format!("Unsupported type: {}", type_name.into());
        Self::new(ValidationErrorCode::UnsupportedType, Some(column.into()), message)
    }

    /// Create a wrong type error
    pub fn wrong_type(column: impl Into<String>, expected: impl Into<String>, actual: &DataType) -> Self {
        let column = column.into();
        let message = format!(
            "Column '{}' expected {}, got {}",
            column,
            expected.into(),
            actual
        );
        Self::new(ValidationErrorCode::WrongType, Some(column), message)
    }

    /// Create a constraint violation error
    pub fn constraint_violation(
        column: impl Into<String>,
        message: impl Into<String>,
        samples: Vec<(usize, Scalar)>,
        total: usize,
    ) -> Self {
        Self {
            code: ValidationErrorCode::ConstraintViolation,
            message: message.into(),
            column: Some(column.into()),
            samples,
            total,
        }
    }

    /// Create an unknown validator error
    pub fn unknown_validator(column: impl Into<String>, meta: impl fmt::Display) -> Self {
        let message = format!("Unknown validator type: {}", meta);
        Self::new(ValidationErrorCode::UnknownValidator, Some(column.into()), message)
    }

    /// Create a constraint not applicable error
    pub fn constraint_not_applicable(
        column: impl Into<String>,
        constraint: impl fmt::Display,
        source: &ColumnError,
    ) -> Self {
        let column = column.into();
        let message = format!(
            "Constraint {} cannot be applied to column '{}': {}",
            constraint, column, source
        );
        Self::new(ValidationErrorCode::ConstraintNotApplicable, Some(column), message)
    }

    pub fn code(&self) -> ValidationErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }

    pub fn samples(&self) -> &[(usize, Scalar)] {
        &self.samples
    }

    /// Number of violating rows; zero for errors that are not about values
    pub fn total(&self) -> usize {
        self.total
    }

    /// Returns whether the schema, not the table, is at fault
    pub fn is_internal(&self) -> bool {
        self.severity() == Severity::Internal
    }
}

fn quote_list(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("'{}'", n))
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;
