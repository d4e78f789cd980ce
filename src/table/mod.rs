//! Columnar table capability interface
//!
//! Validation and fixture logic never touch a storage library directly.
//! They go through two traits:
//!
//! - [`Table`]: column lookup by name, column listing, row count
//! - [`Column`]: dtype, length and the bulk predicates constraints need,
//!   each returning a boolean mask over the whole column
//!
//! Masks are Arrow `BooleanArray`s. A null mask slot means "no answer" (the
//! element itself was null) and is settled to `false` before counting.
//!
//! Two bindings are provided: [`batch`] for Arrow `RecordBatch` and
//! [`memory`] for the owned [`MemTable`].

pub mod batch;
pub mod mask;
pub mod memory;

use arrow::array::{BooleanArray, Int64Array};
use arrow::datatypes::DataType;
use arrow::error::ArrowError;
use regex::Regex;
use thiserror::Error;

use crate::scalar::Scalar;

pub use self::batch::BatchColumn;
pub use self::memory::{MemColumn, MemColumnRef, MemTable};

/// Result type for column operations
pub type ColumnResult<T> = Result<T, ColumnError>;

/// Errors raised by a backend while evaluating a column operation
#[derive(Debug, Error)]
pub enum ColumnError {
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    #[error("{op} is not supported for dtype {dtype}")]
    Unsupported { op: &'static str, dtype: DataType },

    #[error("Column '{column}' mixes {first} and {second} values")]
    MixedTypes {
        column: String,
        first: &'static str,
        second: &'static str,
    },

    #[error("Column '{column}' has {actual} values, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// One column of a table, viewed through bulk operations.
pub trait Column {
    fn name(&self) -> &str;

    fn dtype(&self) -> &DataType;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `value < bound`, element-wise. Numeric columns only.
    fn lt(&self, bound: f64) -> ColumnResult<BooleanArray>;

    /// `value > bound`, element-wise. Numeric columns only.
    fn gt(&self, bound: f64) -> ColumnResult<BooleanArray>;

    /// Marks every row whose value occurs more than once. Repeated nulls are
    /// one group, and in float columns numbers compare by value.
    fn is_duplicated(&self) -> ColumnResult<BooleanArray>;

    /// Marks rows whose value is one of `allowed`. Values of a type the
    /// column cannot hold never match.
    fn is_in(&self, allowed: &[Scalar]) -> ColumnResult<BooleanArray>;

    /// Marks rows whose text matches `pattern`. Text columns only.
    fn full_match(&self, pattern: &Regex) -> ColumnResult<BooleanArray>;

    /// Length of each text value in characters. Text columns only.
    fn char_lengths(&self) -> ColumnResult<Int64Array>;

    /// Value at a position, for diagnostics.
    fn value(&self, position: usize) -> Scalar;

    /// Row index label of a position. Defaults to the position itself.
    fn row_label(&self, position: usize) -> usize {
        position
    }
}

/// A table: named columns of equal length.
pub trait Table {
    type Column<'a>: Column
    where
        Self: 'a;

    /// Column names in table order.
    fn column_names(&self) -> Vec<String>;

    fn column(&self, name: &str) -> Option<Self::Column<'_>>;

    fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    fn num_rows(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_display() {
        let err = ColumnError::Unsupported {
            op: "range comparison",
            dtype: DataType::Utf8,
        };
        assert_eq!(err.to_string(), "range comparison is not supported for dtype Utf8");
    }
}
