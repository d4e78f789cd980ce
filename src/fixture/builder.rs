//! Test fixture construction
//!
//! A fixture starts from partial column data. Every schema column the data
//! does not supply is filled with [`ANY`](super::ANY) cells, so assertions
//! only constrain the columns a test cares about.

use arrow::array::Array;
use arrow::datatypes::{DataType, Field, Schema as ArrowSchema};
use arrow::record_batch::RecordBatch;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use super::any::Cell;
use super::errors::{FixtureError, FixtureResult};
use crate::scalar::Scalar;
use crate::schema::{column_specs, Schema, TableSchema};
use crate::table::batch::scalar_at;
use crate::table::memory::infer_dtype;
use crate::table::{MemColumn, MemTable};
use crate::validate::validate;

/// Named columns extracted from some tabular input.
pub type ColumnData = Vec<(String, Vec<Scalar>)>;

/// Sources that can be read as ordered named columns.
pub trait TabularInput {
    fn into_columns(self) -> FixtureResult<ColumnData>;
}

impl<N, V> TabularInput for Vec<(N, Vec<V>)>
where
    N: Into<String>,
    V: Into<Scalar>,
{
    fn into_columns(self) -> FixtureResult<ColumnData> {
        Ok(self
            .into_iter()
            .map(|(name, values)| (name.into(), values.into_iter().map(Into::into).collect()))
            .collect())
    }
}

impl<N, V, const K: usize> TabularInput for [(N, Vec<V>); K]
where
    N: Into<String>,
    V: Into<Scalar>,
{
    fn into_columns(self) -> FixtureResult<ColumnData> {
        Vec::from(self).into_columns()
    }
}

/// Either a column object (`{"a": [1, 2]}`) or a list of row records
/// (`[{"a": 1}, {"a": 2}]`). Keys missing from a record read as null.
impl TabularInput for &Value {
    fn into_columns(self) -> FixtureResult<ColumnData> {
        match self {
            Value::Object(map) => map
                .iter()
                .map(|(name, values)| match values {
                    Value::Array(items) => Ok((name.clone(), items.iter().map(Scalar::from).collect())),
                    other => Err(FixtureError::InvalidInput(format!(
                        "column '{}' must be an array, got {}",
                        name, other
                    ))),
                })
                .collect(),
            Value::Array(rows) => records_to_columns(rows),
            other => Err(FixtureError::InvalidInput(format!(
                "expected a column object or a list of records, got {}",
                other
            ))),
        }
    }
}

impl TabularInput for Value {
    fn into_columns(self) -> FixtureResult<ColumnData> {
        (&self).into_columns()
    }
}

impl TabularInput for &RecordBatch {
    fn into_columns(self) -> FixtureResult<ColumnData> {
        Ok(self
            .schema_ref()
            .fields()
            .iter()
            .zip(self.columns())
            .map(|(field, array)| {
                let values = (0..array.len()).map(|i| scalar_at(array, i)).collect();
                (field.name().clone(), values)
            })
            .collect())
    }
}

impl TabularInput for &MemTable {
    fn into_columns(self) -> FixtureResult<ColumnData> {
        Ok(self
            .columns()
            .iter()
            .map(|c| (c.name().to_string(), c.values().to_vec()))
            .collect())
    }
}

fn records_to_columns(rows: &[Value]) -> FixtureResult<ColumnData> {
    let mut names: Vec<String> = Vec::new();
    for row in rows {
        let Value::Object(record) = row else {
            return Err(FixtureError::InvalidInput(format!(
                "expected a record object, got {}",
                row
            )));
        };
        for key in record.keys() {
            if !names.contains(key) {
                names.push(key.clone());
            }
        }
    }

    Ok(names
        .into_iter()
        .map(|name| {
            let values = rows
                .iter()
                .map(|row| row.get(&name).map_or(Scalar::Null, Scalar::from))
                .collect();
            (name, values)
        })
        .collect())
}

/// Reads `data` as columns and checks it against `schema`.
///
/// Returns the columns and the row count. Fails on empty input, columns of
/// different lengths, or columns the schema does not declare.
pub fn convert_input(
    data: impl TabularInput,
    schema: &Schema,
) -> FixtureResult<(ColumnData, usize)> {
    let columns = data.into_columns()?;

    let mut seen = HashSet::new();
    for (name, _) in &columns {
        if !seen.insert(name.as_str()) {
            return Err(FixtureError::InvalidInput(format!(
                "column '{}' given more than once",
                name
            )));
        }
    }

    let n_rows = columns.first().map_or(0, |(_, values)| values.len());
    for (name, values) in &columns {
        if values.len() != n_rows {
            return Err(FixtureError::RaggedInput {
                column: name.clone(),
                expected: n_rows,
                actual: values.len(),
            });
        }
    }
    if n_rows == 0 {
        return Err(FixtureError::EmptyData);
    }

    let mut unknown: Vec<String> = columns
        .iter()
        .filter(|(name, _)| !schema.contains(name))
        .map(|(name, _)| name.clone())
        .collect();
    if !unknown.is_empty() {
        unknown.sort();
        let mut declared: Vec<String> = schema.names().into_iter().map(String::from).collect();
        declared.sort();
        return Err(FixtureError::UnknownColumns { unknown, declared });
    }

    Ok((columns, n_rows))
}

/// One fixture column.
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureColumn {
    name: String,
    /// `None` for wildcard-filled columns
    dtype: Option<DataType>,
    cells: Vec<Cell>,
}

impl FixtureColumn {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dtype(&self) -> Option<&DataType> {
        self.dtype.as_ref()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// True if every cell is the wildcard.
    pub fn is_wildcard(&self) -> bool {
        self.cells.iter().all(Cell::is_any)
    }
}

/// Schema-shaped table of fixture cells.
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureFrame {
    columns: Vec<FixtureColumn>,
    num_rows: usize,
}

impl FixtureFrame {
    pub fn columns(&self) -> &[FixtureColumn] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&FixtureColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Converts to a `MemTable`. Fails if any column holds a wildcard.
    pub fn to_mem_table(&self) -> FixtureResult<MemTable> {
        let columns = self
            .columns
            .iter()
            .map(|col| -> FixtureResult<MemColumn> {
                let values = col
                    .cells
                    .iter()
                    .map(|cell| cell.value().cloned())
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(|| {
                        FixtureError::InvalidInput(format!(
                            "column '{}' contains ANY cells",
                            col.name
                        ))
                    })?;
                Ok(match &col.dtype {
                    Some(dtype) => MemColumn::typed(col.name.clone(), dtype.clone(), values),
                    None => MemColumn::new(col.name.clone(), values)?,
                })
            })
            .collect::<FixtureResult<Vec<_>>>()?;
        Ok(MemTable::new(columns)?)
    }
}

/// Lays supplied columns out in schema order, filling the rest with `ANY`.
///
/// Requiredness flags are not consulted: every absent column is filled.
pub fn build_fixture(
    schema: &Schema,
    mut columns: ColumnData,
    n_rows: usize,
) -> FixtureResult<FixtureFrame> {
    let mut out = Vec::with_capacity(schema.len());
    for spec in column_specs(schema) {
        let supplied = columns
            .iter()
            .position(|(name, _)| *name == spec.name)
            .map(|idx| columns.swap_remove(idx).1);

        let column = match supplied {
            Some(values) => FixtureColumn {
                dtype: Some(infer_dtype(&spec.name, &values)?),
                cells: values.into_iter().map(Cell::Value).collect(),
                name: spec.name,
            },
            None => {
                debug!(column = %spec.name, rows = n_rows, "filling column with ANY");
                FixtureColumn {
                    name: spec.name,
                    dtype: None,
                    cells: vec![Cell::Any; n_rows],
                }
            }
        };
        out.push(column);
    }
    Ok(FixtureFrame {
        columns: out,
        num_rows: n_rows,
    })
}

/// Validates supplied columns against their own declarations.
///
/// Only the columns present in `columns` are checked, so wildcard-filled
/// columns never fail. Type, nullability and constraints all apply.
pub fn validate_supplied(schema: &Schema, columns: &ColumnData) -> FixtureResult<()> {
    let supplied = schema.select(columns.iter().map(|(name, _)| name.as_str()));
    let table = MemTable::from_columns(columns.iter().cloned())?;
    validate(&table, &supplied)?;
    Ok(())
}

/// Builds a fixture for `S` from partial data.
///
/// Supplied columns are validated before the absent ones are filled.
pub fn for_test<S: TableSchema>(data: impl TabularInput) -> FixtureResult<FixtureFrame> {
    let schema = S::schema();
    let (columns, n_rows) = convert_input(data, &schema)?;
    validate_supplied(&schema, &columns)?;
    build_fixture(&schema, columns, n_rows)
}

/// Zero-row batch with every schema column at its mapped dtype.
///
/// Optional columns are nullable; all others are not.
pub fn make_empty(schema: &Schema) -> RecordBatch {
    let fields: Vec<Field> = column_specs(schema)
        .into_iter()
        .map(|spec| Field::new(spec.name, spec.dtype, spec.is_optional))
        .collect();
    RecordBatch::new_empty(Arc::new(ArrowSchema::new(fields)))
}
