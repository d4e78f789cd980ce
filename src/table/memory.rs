//! Owned in-memory table binding
//!
//! `MemTable` holds columns as `Scalar` vectors with an Arrow dtype per
//! column, either declared or inferred from the values. An explicit row
//! index may replace positional row labels in diagnostics.

use arrow::array::{BooleanArray, Int64Array};
use arrow::datatypes::{DataType, TimeUnit};
use regex::Regex;
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use super::{Column, ColumnError, ColumnResult, Table};
use crate::scalar::Scalar;
use crate::schema::dtype::{is_integer, is_numeric, is_text};

/// A named column of scalar values.
#[derive(Debug, Clone, PartialEq)]
pub struct MemColumn {
    name: String,
    dtype: DataType,
    values: Vec<Scalar>,
}

impl MemColumn {
    /// Column with a dtype inferred from its values.
    pub fn new(name: impl Into<String>, values: Vec<Scalar>) -> ColumnResult<Self> {
        let name = name.into();
        let dtype = infer_dtype(&name, &values)?;
        Ok(Self {
            name,
            dtype,
            values,
        })
    }

    /// Column with an explicitly declared dtype. Values are taken as given.
    pub fn typed(name: impl Into<String>, dtype: DataType, values: Vec<Scalar>) -> Self {
        Self {
            name: name.into(),
            dtype,
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dtype(&self) -> &DataType {
        &self.dtype
    }

    pub fn values(&self) -> &[Scalar] {
        &self.values
    }
}

/// Dtype of a value list.
///
/// All-null columns are `Null`; integers mixed with floats widen to
/// `Float64`; any other mix of kinds is an error.
pub fn infer_dtype(column: &str, values: &[Scalar]) -> ColumnResult<DataType> {
    let mut seen: Option<&Scalar> = None;
    let mut has_float = false;

    for value in values.iter().filter(|v| !v.is_null()) {
        if matches!(value, Scalar::Float(_)) {
            has_float = true;
        }
        match seen {
            None => seen = Some(value),
            Some(first) if same_kind(first, value) => {}
            Some(first) => {
                return Err(ColumnError::MixedTypes {
                    column: column.to_string(),
                    first: first.type_name(),
                    second: value.type_name(),
                })
            }
        }
    }

    Ok(match seen {
        None => DataType::Null,
        Some(Scalar::Int(_)) | Some(Scalar::Float(_)) if has_float => DataType::Float64,
        Some(Scalar::Int(_)) => DataType::Int64,
        Some(Scalar::Bool(_)) => DataType::Boolean,
        Some(Scalar::Str(_)) => DataType::Utf8,
        Some(Scalar::Datetime(_)) => DataType::Timestamp(TimeUnit::Microsecond, None),
        Some(Scalar::Date(_)) => DataType::Date32,
        Some(Scalar::Duration(_)) => DataType::Duration(TimeUnit::Microsecond),
        Some(_) => DataType::Float64,
    })
}

fn same_kind(a: &Scalar, b: &Scalar) -> bool {
    let numeric = |s: &Scalar| matches!(s, Scalar::Int(_) | Scalar::Float(_));
    std::mem::discriminant(a) == std::mem::discriminant(b) || (numeric(a) && numeric(b))
}

/// Equality used by membership tests: numbers compare by value across
/// int and float, everything else by variant.
fn scalar_eq(a: &Scalar, b: &Scalar) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

/// Owned table of equal-length columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MemTable {
    columns: Vec<MemColumn>,
    index: Option<Vec<usize>>,
    num_rows: usize,
}

impl MemTable {
    /// Builds a table from prepared columns.
    pub fn new(columns: Vec<MemColumn>) -> ColumnResult<Self> {
        let num_rows = columns.first().map_or(0, |c| c.values.len());
        let mut names = HashSet::new();
        for col in &columns {
            if !names.insert(col.name.as_str()) {
                return Err(ColumnError::DuplicateColumn(col.name.clone()));
            }
            if col.values.len() != num_rows {
                return Err(ColumnError::LengthMismatch {
                    column: col.name.clone(),
                    expected: num_rows,
                    actual: col.values.len(),
                });
            }
        }
        Ok(Self {
            columns,
            index: None,
            num_rows,
        })
    }

    /// Builds a table from (name, values) pairs, inferring every dtype.
    pub fn from_columns<N, I>(columns: I) -> ColumnResult<Self>
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, Vec<Scalar>)>,
    {
        let columns = columns
            .into_iter()
            .map(|(name, values)| MemColumn::new(name, values))
            .collect::<ColumnResult<Vec<_>>>()?;
        Self::new(columns)
    }

    /// Replaces positional row labels with an explicit index.
    pub fn with_index(mut self, index: Vec<usize>) -> ColumnResult<Self> {
        if index.len() != self.num_rows {
            return Err(ColumnError::LengthMismatch {
                column: "<index>".to_string(),
                expected: self.num_rows,
                actual: index.len(),
            });
        }
        self.index = Some(index);
        Ok(self)
    }

    pub fn columns(&self) -> &[MemColumn] {
        &self.columns
    }

    pub fn index(&self) -> Option<&[usize]> {
        self.index.as_deref()
    }
}

impl Table for MemTable {
    type Column<'a> = MemColumnRef<'a>;

    fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    fn column(&self, name: &str) -> Option<MemColumnRef<'_>> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|column| MemColumnRef {
                column,
                index: self.index.as_deref(),
            })
    }

    fn num_rows(&self) -> usize {
        self.num_rows
    }
}

/// Borrowed view of a `MemTable` column together with the table index.
#[derive(Debug, Clone, Copy)]
pub struct MemColumnRef<'a> {
    column: &'a MemColumn,
    index: Option<&'a [usize]>,
}

impl MemColumnRef<'_> {
    /// All-null columns have no dtype and pass every typed operation as nulls.
    fn is_untyped(&self) -> bool {
        self.column.dtype == DataType::Null
    }

    fn unsupported(&self, op: &'static str) -> ColumnError {
        ColumnError::Unsupported {
            op,
            dtype: self.column.dtype.clone(),
        }
    }

    fn numeric_mask(
        &self,
        op: &'static str,
        pred: impl Fn(f64) -> bool,
    ) -> ColumnResult<BooleanArray> {
        if !is_numeric(&self.column.dtype) && !self.is_untyped() {
            return Err(self.unsupported(op));
        }
        Ok(self
            .column
            .values
            .iter()
            .map(|v| v.as_f64().map(&pred))
            .collect())
    }

    fn text_values(&self, op: &'static str) -> ColumnResult<impl Iterator<Item = Option<&str>>> {
        if !is_text(&self.column.dtype) && !self.is_untyped() {
            return Err(self.unsupported(op));
        }
        Ok(self.column.values.iter().map(Scalar::as_str))
    }
}

impl Column for MemColumnRef<'_> {
    fn name(&self) -> &str {
        &self.column.name
    }

    fn dtype(&self) -> &DataType {
        &self.column.dtype
    }

    fn len(&self) -> usize {
        self.column.values.len()
    }

    fn lt(&self, bound: f64) -> ColumnResult<BooleanArray> {
        self.numeric_mask("range comparison", |v| v < bound)
    }

    fn gt(&self, bound: f64) -> ColumnResult<BooleanArray> {
        self.numeric_mask("range comparison", |v| v > bound)
    }

    fn is_duplicated(&self) -> ColumnResult<BooleanArray> {
        // Integers in a float column are widened so `1` and `1.0` are one value.
        let widen = is_numeric(&self.column.dtype) && !is_integer(&self.column.dtype);
        let keyed: Vec<Cow<'_, Scalar>> = self
            .column
            .values
            .iter()
            .map(|v| match v {
                Scalar::Int(i) if widen => Cow::Owned(Scalar::Float(*i as f64)),
                other => Cow::Borrowed(other),
            })
            .collect();

        let mut counts: HashMap<_, usize> = HashMap::new();
        for value in &keyed {
            *counts.entry(value.key()).or_insert(0) += 1;
        }
        Ok(keyed
            .iter()
            .map(|v| Some(counts.get(&v.key()).copied().unwrap_or(0) > 1))
            .collect())
    }

    fn is_in(&self, allowed: &[Scalar]) -> ColumnResult<BooleanArray> {
        Ok(self
            .column
            .values
            .iter()
            .map(|v| (!v.is_null()).then(|| allowed.iter().any(|a| scalar_eq(v, a))))
            .collect())
    }

    fn full_match(&self, pattern: &Regex) -> ColumnResult<BooleanArray> {
        Ok(self
            .text_values("pattern match")?
            .map(|v| v.map(|s| pattern.is_match(s)))
            .collect())
    }

    fn char_lengths(&self) -> ColumnResult<Int64Array> {
        Ok(self
            .text_values("length check")?
            .map(|v| v.map(|s| s.chars().count() as i64))
            .collect())
    }

    fn value(&self, position: usize) -> Scalar {
        self.column
            .values
            .get(position)
            .cloned()
            .unwrap_or(Scalar::Null)
    }

    fn row_label(&self, position: usize) -> usize {
        self.index
            .and_then(|ix| ix.get(position).copied())
            .unwrap_or(position)
    }
}
