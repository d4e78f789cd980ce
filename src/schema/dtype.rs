//! Logical type to Arrow dtype mapping
//!
//! Two tables live here:
//! - `dtype_for`: the concrete dtype used when a column must be built
//!   (empty tables, fixtures). Unmapped types fall back to `Utf8`.
//! - `DtypeFamily`: the set of dtypes validation accepts for a logical
//!   type. Unmapped types have no family and are rejected.

use arrow::datatypes::{DataType, TimeUnit};
use tracing::debug;

use super::types::LogicalType;

/// Dtype a column of `base_type` is built with.
///
/// `Native` dtypes are returned unchanged. Types without a mapping degrade
/// to `Utf8` instead of failing.
pub fn dtype_for(base_type: &LogicalType) -> DataType {
    match base_type {
        LogicalType::Int => DataType::Int64,
        LogicalType::Float => DataType::Float64,
        LogicalType::Str => DataType::Utf8,
        LogicalType::Bool => DataType::Boolean,
        LogicalType::Datetime => DataType::Timestamp(TimeUnit::Microsecond, None),
        LogicalType::Date => DataType::Date32,
        LogicalType::Duration => DataType::Duration(TimeUnit::Microsecond),
        LogicalType::Native(dt) => dt.clone(),
        other @ (LogicalType::Literal(_) | LogicalType::Other(_)) => {
            debug!(base_type = %other, "no dtype mapping, falling back to Utf8");
            DataType::Utf8
        }
    }
}

/// Group of dtypes that satisfy one logical type.
#[derive(Debug, Clone, PartialEq)]
pub enum DtypeFamily {
    Integer,
    Float,
    Text,
    Boolean,
    Timestamp,
    Date,
    Duration,
    /// Exactly this dtype
    Exact(DataType),
}

impl DtypeFamily {
    /// Family checked for `base_type`, or `None` when the type is unsupported.
    pub fn for_type(base_type: &LogicalType) -> Option<Self> {
        match base_type {
            LogicalType::Int => Some(DtypeFamily::Integer),
            LogicalType::Float => Some(DtypeFamily::Float),
            LogicalType::Str => Some(DtypeFamily::Text),
            LogicalType::Bool => Some(DtypeFamily::Boolean),
            LogicalType::Datetime => Some(DtypeFamily::Timestamp),
            LogicalType::Date => Some(DtypeFamily::Date),
            LogicalType::Duration => Some(DtypeFamily::Duration),
            LogicalType::Native(dt) => Some(DtypeFamily::Exact(dt.clone())),
            LogicalType::Literal(_) | LogicalType::Other(_) => None,
        }
    }

    /// Tests an actual column dtype against the family.
    pub fn accepts(&self, dtype: &DataType) -> bool {
        match self {
            DtypeFamily::Integer => is_integer(dtype),
            DtypeFamily::Float => matches!(
                dtype,
                DataType::Float16 | DataType::Float32 | DataType::Float64
            ),
            DtypeFamily::Text => is_text(dtype),
            DtypeFamily::Boolean => matches!(dtype, DataType::Boolean),
            DtypeFamily::Timestamp => matches!(dtype, DataType::Timestamp(_, _)),
            DtypeFamily::Date => matches!(dtype, DataType::Date32 | DataType::Date64),
            DtypeFamily::Duration => matches!(dtype, DataType::Duration(_)),
            DtypeFamily::Exact(expected) => expected == dtype,
        }
    }
}

pub(crate) fn is_integer(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

pub(crate) fn is_numeric(dtype: &DataType) -> bool {
    is_integer(dtype)
        || matches!(
            dtype,
            DataType::Float16 | DataType::Float32 | DataType::Float64
        )
}

pub(crate) fn is_text(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View
    )
}
