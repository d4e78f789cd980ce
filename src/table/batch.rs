//! Arrow `RecordBatch` binding
//!
//! Comparisons go through Arrow compute kernels. Numeric columns are cast to
//! `Float64` (or `Int64` for integer equality) first, text columns to `Utf8`,
//! so every integer width and string layout shares one code path.

use arrow::array::{
    Array, ArrayRef, AsArray, BooleanArray, Date32Array, DurationMicrosecondArray,
    Float64Array, Int64Array, RecordBatch, StringArray, TimestampMicrosecondArray,
};
use arrow::compute::kernels::cmp;
use arrow::compute::{cast, or};
use arrow::datatypes::{
    DataType, Date32Type, DurationMicrosecondType, Float64Type, Int64Type, TimeUnit,
    TimestampMicrosecondType,
};
use arrow::row::{RowConverter, SortField};
use arrow::temporal_conversions::date32_to_datetime;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;

use super::{Column, ColumnError, ColumnResult, Table};
use crate::scalar::Scalar;
use crate::schema::dtype::{is_integer, is_numeric, is_text};

const TIMESTAMP_US: DataType = DataType::Timestamp(TimeUnit::Microsecond, None);
const DURATION_US: DataType = DataType::Duration(TimeUnit::Microsecond);

/// Borrowed view of one `RecordBatch` column.
#[derive(Debug, Clone, Copy)]
pub struct BatchColumn<'a> {
    name: &'a str,
    array: &'a ArrayRef,
}

impl<'a> BatchColumn<'a> {
    pub fn new(name: &'a str, array: &'a ArrayRef) -> Self {
        Self { name, array }
    }

    pub fn array(&self) -> &ArrayRef {
        self.array
    }

    fn unsupported(&self, op: &'static str) -> ColumnError {
        ColumnError::Unsupported {
            op,
            dtype: self.array.data_type().clone(),
        }
    }

    fn as_float(&self, op: &'static str) -> ColumnResult<ArrayRef> {
        if !is_numeric(self.array.data_type()) {
            return Err(self.unsupported(op));
        }
        Ok(cast(self.array.as_ref(), &DataType::Float64)?)
    }

    fn as_utf8(&self, op: &'static str) -> ColumnResult<ArrayRef> {
        if !is_text(self.array.data_type()) {
            return Err(self.unsupported(op));
        }
        Ok(cast(self.array.as_ref(), &DataType::Utf8)?)
    }

    /// Equality mask against one value, or `None` when the value's type
    /// cannot occur in this column.
    fn eq_mask(&self, value: &Scalar) -> ColumnResult<Option<BooleanArray>> {
        let dtype = self.array.data_type();
        let mask = match value {
            Scalar::Int(v) if is_integer(dtype) => {
                let ints = cast(self.array.as_ref(), &DataType::Int64)?;
                cmp::eq(&ints, &Int64Array::new_scalar(*v))?
            }
            Scalar::Int(_) | Scalar::Float(_) if is_numeric(dtype) => {
                let floats = cast(self.array.as_ref(), &DataType::Float64)?;
                let v = value.as_f64().unwrap_or(f64::NAN);
                cmp::eq(&floats, &Float64Array::new_scalar(v))?
            }
            Scalar::Str(s) if is_text(dtype) => {
                let text = cast(self.array.as_ref(), &DataType::Utf8)?;
                cmp::eq(&text, &StringArray::new_scalar(s))?
            }
            Scalar::Bool(b) if matches!(dtype, DataType::Boolean) => {
                cmp::eq(self.array, &BooleanArray::new_scalar(*b))?
            }
            Scalar::Datetime(v) if matches!(dtype, DataType::Timestamp(_, _)) => {
                let ts = cast(self.array.as_ref(), &TIMESTAMP_US)?;
                let micros = v.and_utc().timestamp_micros();
                cmp::eq(&ts, &TimestampMicrosecondArray::new_scalar(micros))?
            }
            Scalar::Date(v) if matches!(dtype, DataType::Date32 | DataType::Date64) => {
                let dates = cast(self.array.as_ref(), &DataType::Date32)?;
                let days = v.signed_duration_since(unix_epoch()).num_days() as i32;
                cmp::eq(&dates, &Date32Array::new_scalar(days))?
            }
            Scalar::Duration(v) if matches!(dtype, DataType::Duration(_)) => {
                let durations = cast(self.array.as_ref(), &DURATION_US)?;
                let micros = v.num_microseconds().unwrap_or(i64::MAX);
                cmp::eq(&durations, &DurationMicrosecondArray::new_scalar(micros))?
            }
            _ => return Ok(None),
        };
        Ok(Some(mask))
    }

    /// All-false mask that keeps the column's nulls.
    fn no_match(&self) -> BooleanArray {
        (0..self.array.len())
            .map(|i| self.array.is_valid(i).then_some(false))
            .collect()
    }
}

impl Column for BatchColumn<'_> {
    fn name(&self) -> &str {
        self.name
    }

    fn dtype(&self) -> &DataType {
        self.array.data_type()
    }

    fn len(&self) -> usize {
        self.array.len()
    }

    fn lt(&self, bound: f64) -> ColumnResult<BooleanArray> {
        let floats = self.as_float("range comparison")?;
        Ok(cmp::lt(&floats, &Float64Array::new_scalar(bound))?)
    }

    fn gt(&self, bound: f64) -> ColumnResult<BooleanArray> {
        let floats = self.as_float("range comparison")?;
        Ok(cmp::gt(&floats, &Float64Array::new_scalar(bound))?)
    }

    fn is_duplicated(&self) -> ColumnResult<BooleanArray> {
        let converter = RowConverter::new(vec![SortField::new(self.array.data_type().clone())])?;
        let rows = converter.convert_columns(&[Arc::clone(self.array)])?;

        // Nulls encode to one row value, so they group like any other value.
        let mut counts = HashMap::new();
        for i in 0..rows.num_rows() {
            *counts.entry(rows.row(i)).or_insert(0usize) += 1;
        }

        Ok((0..rows.num_rows())
            .map(|i| Some(counts.get(&rows.row(i)).copied().unwrap_or(0) > 1))
            .collect())
    }

    fn is_in(&self, allowed: &[Scalar]) -> ColumnResult<BooleanArray> {
        let mut hits: Option<BooleanArray> = None;
        for value in allowed {
            if let Some(mask) = self.eq_mask(value)? {
                hits = Some(match hits {
                    Some(acc) => or(&acc, &mask)?,
                    None => mask,
                });
            }
        }
        Ok(hits.unwrap_or_else(|| self.no_match()))
    }

    fn full_match(&self, pattern: &Regex) -> ColumnResult<BooleanArray> {
        let text = self.as_utf8("pattern match")?;
        Ok(text
            .as_string::<i32>()
            .iter()
            .map(|v| v.map(|s| pattern.is_match(s)))
            .collect())
    }

    fn char_lengths(&self) -> ColumnResult<Int64Array> {
        let text = self.as_utf8("length check")?;
        Ok(text
            .as_string::<i32>()
            .iter()
            .map(|v| v.map(|s| s.chars().count() as i64))
            .collect())
    }

    fn value(&self, position: usize) -> Scalar {
        scalar_at(self.array, position)
    }
}

impl Table for RecordBatch {
    type Column<'a> = BatchColumn<'a>;

    fn column_names(&self) -> Vec<String> {
        self.schema_ref()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    fn column(&self, name: &str) -> Option<BatchColumn<'_>> {
        let idx = self.schema_ref().index_of(name).ok()?;
        let field_name = self.schema_ref().field(idx).name();
        Some(BatchColumn::new(field_name, RecordBatch::column(self, idx)))
    }

    fn num_rows(&self) -> usize {
        RecordBatch::num_rows(self)
    }
}

fn unix_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

/// Converts one array element to a `Scalar`.
///
/// Dtypes without a scalar counterpart are rendered with Arrow's display
/// formatter and returned as text.
pub(crate) fn scalar_at(array: &ArrayRef, position: usize) -> Scalar {
    if array.is_null(position) {
        return Scalar::Null;
    }
    let single = array.slice(position, 1);
    let dtype = array.data_type();

    let converted = if is_integer(dtype) {
        cast(&single, &DataType::Int64)
            .ok()
            .and_then(|a| first_valid(&a).then(|| Scalar::Int(a.as_primitive::<Int64Type>().value(0))))
    } else if is_numeric(dtype) {
        cast(&single, &DataType::Float64)
            .ok()
            .map(|a| Scalar::Float(a.as_primitive::<Float64Type>().value(0)))
    } else if is_text(dtype) {
        cast(&single, &DataType::Utf8)
            .ok()
            .map(|a| Scalar::Str(a.as_string::<i32>().value(0).to_string()))
    } else {
        match dtype {
            DataType::Boolean => Some(Scalar::Bool(single.as_boolean().value(0))),
            DataType::Timestamp(_, _) => cast(&single, &TIMESTAMP_US).ok().and_then(|a| {
                let micros = a.as_primitive::<TimestampMicrosecondType>().value(0);
                DateTime::<Utc>::from_timestamp_micros(micros).map(|d| Scalar::Datetime(d.naive_utc()))
            }),
            DataType::Date32 | DataType::Date64 => {
                cast(&single, &DataType::Date32).ok().and_then(|a| {
                    date32_to_datetime(a.as_primitive::<Date32Type>().value(0))
                        .map(|d| Scalar::Date(d.date()))
                })
            }
            DataType::Duration(_) => cast(&single, &DURATION_US).ok().map(|a| {
                let micros = a.as_primitive::<DurationMicrosecondType>().value(0);
                Scalar::Duration(Duration::microseconds(micros))
            }),
            _ => None,
        }
    };

    converted.unwrap_or_else(|| Scalar::Str(display_value(array, position)))
}

fn first_valid(array: &ArrayRef) -> bool {
    !array.is_empty() && array.is_valid(0)
}

fn display_value(array: &ArrayRef, position: usize) -> String {
    ArrayFormatter::try_new(array.as_ref(), &FormatOptions::default())
        .map(|f| f.value(position).to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::mask::positions;
    use arrow::array::{Int32Array, LargeStringArray, UInt8Array};
    use arrow::datatypes::{Field, Schema};

    fn batch(columns: Vec<(&str, ArrayRef)>) -> RecordBatch {
        RecordBatch::try_from_iter(columns).unwrap()
    }

    fn true_positions(mask: BooleanArray) -> Vec<usize> {
        positions(&crate::table::mask::settle(mask))
    }

    #[test]
    fn test_table_lookup() {
        let b = batch(vec![
            ("a", Arc::new(Int64Array::from(vec![1, 2])) as ArrayRef),
            ("b", Arc::new(StringArray::from(vec!["x", "y"])) as ArrayRef),
        ]);
        assert_eq!(b.column_names(), vec!["a", "b"]);
        assert!(b.has_column("a"));
        assert!(!b.has_column("c"));
        assert_eq!(Table::num_rows(&b), 2);

        let col = Table::column(&b, "b").unwrap();
        assert_eq!(col.name(), "b");
        assert_eq!(col.dtype(), &DataType::Utf8);
        assert_eq!(col.len(), 2);
    }

    #[test]
    fn test_range_masks_on_narrow_ints() {
        let b = batch(vec![("v", Arc::new(Int32Array::from(vec![5, -1, 20])) as ArrayRef)]);
        let col = Table::column(&b, "v").unwrap();
        assert_eq!(true_positions(col.lt(0.0).unwrap()), vec![1]);
        assert_eq!(true_positions(col.gt(10.0).unwrap()), vec![2]);
    }

    #[test]
    fn test_range_on_text_is_unsupported() {
        let b = batch(vec![("v", Arc::new(StringArray::from(vec!["a"])) as ArrayRef)]);
        let col = Table::column(&b, "v").unwrap();
        assert!(matches!(col.lt(0.0), Err(ColumnError::Unsupported { .. })));
    }

    #[test]
    fn test_duplicates_keep_all_occurrences() {
        let b = batch(vec![("v", Arc::new(Int64Array::from(vec![1, 2, 2, 3])) as ArrayRef)]);
        let col = Table::column(&b, "v").unwrap();
        assert_eq!(true_positions(col.is_duplicated().unwrap()), vec![1, 2]);
    }

    #[test]
    fn test_repeated_nulls_are_duplicates() {
        let b = batch(vec![
            (
                "v",
                Arc::new(StringArray::from(vec![None, Some("a"), None])) as ArrayRef,
            ),
            (
                "w",
                Arc::new(StringArray::from(vec![None, Some("a"), Some("b")])) as ArrayRef,
            ),
        ]);
        let v = Table::column(&b, "v").unwrap();
        assert_eq!(true_positions(v.is_duplicated().unwrap()), vec![0, 2]);
        let w = Table::column(&b, "w").unwrap();
        assert!(true_positions(w.is_duplicated().unwrap()).is_empty());
    }

    #[test]
    fn test_is_in_text_and_numbers() {
        let b = batch(vec![
            ("s", Arc::new(LargeStringArray::from(vec!["a", "b", "c"])) as ArrayRef),
            ("n", Arc::new(UInt8Array::from(vec![1, 2, 3])) as ArrayRef),
        ]);
        let s = Table::column(&b, "s").unwrap();
        let hits = s.is_in(&[Scalar::from("a"), Scalar::from("c")]).unwrap();
        assert_eq!(true_positions(hits), vec![0, 2]);

        let n = Table::column(&b, "n").unwrap();
        let hits = n.is_in(&[Scalar::Int(2), Scalar::Float(3.0)]).unwrap();
        assert_eq!(true_positions(hits), vec![1, 2]);
    }

    #[test]
    fn test_is_in_with_incomparable_values() {
        let b = batch(vec![("n", Arc::new(Int64Array::from(vec![1, 2])) as ArrayRef)]);
        let n = Table::column(&b, "n").unwrap();
        let hits = n.is_in(&[Scalar::from("1")]).unwrap();
        assert!(true_positions(hits).is_empty());
    }

    #[test]
    fn test_full_match_and_lengths() {
        let b = batch(vec![(
            "s",
            Arc::new(StringArray::from(vec![Some("héllo"), None, Some("ab")])) as ArrayRef,
        )]);
        let col = Table::column(&b, "s").unwrap();
        let re = Regex::new("^(?:[a-z]+)$").unwrap();
        let matched = col.full_match(&re).unwrap();
        assert_eq!(matched.value(2), true);
        assert!(matched.is_null(1));

        let lengths = col.char_lengths().unwrap();
        assert_eq!(lengths.value(0), 5);
        assert!(lengths.is_null(1));
        assert_eq!(lengths.value(2), 2);
    }

    #[test]
    fn test_scalar_at() {
        let b = batch(vec![
            ("i", Arc::new(Int32Array::from(vec![Some(7), None])) as ArrayRef),
            ("f", Arc::new(Float64Array::from(vec![1.5, 2.0])) as ArrayRef),
            ("s", Arc::new(StringArray::from(vec!["x", "y"])) as ArrayRef),
            ("b", Arc::new(BooleanArray::from(vec![true, false])) as ArrayRef),
            ("d", Arc::new(Date32Array::from(vec![0, 1])) as ArrayRef),
        ]);
        assert_eq!(Table::column(&b, "i").unwrap().value(0), Scalar::Int(7));
        assert_eq!(Table::column(&b, "i").unwrap().value(1), Scalar::Null);
        assert_eq!(Table::column(&b, "f").unwrap().value(0), Scalar::Float(1.5));
        assert_eq!(Table::column(&b, "s").unwrap().value(1), Scalar::from("y"));
        assert_eq!(Table::column(&b, "b").unwrap().value(0), Scalar::Bool(true));
        assert_eq!(
            Table::column(&b, "d").unwrap().value(1),
            Scalar::Date(NaiveDate::from_ymd_opt(1970, 1, 2).unwrap())
        );
    }

    #[test]
    fn test_empty_batch_has_no_rows() {
        let schema = Arc::new(Schema::new(vec![Field::new("a", DataType::Int64, false)]));
        let b = RecordBatch::new_empty(schema);
        assert_eq!(Table::num_rows(&b), 0);
        assert!(Table::column(&b, "a").unwrap().is_empty());
    }
}
