//! Schema-typed table wrapper
//!
//! `Validated<S, T>` can only be obtained by validating `T` against the
//! schema of `S`, so holding one is proof the table conformed when it was
//! built. The wrapper is read-only; take the table back with `into_inner`.

use arrow::record_batch::RecordBatch;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;

use super::errors::ValidationResult;
use super::validator::Validator;
use crate::config::ValidatorConfig;
use crate::fixture::make_empty;
use crate::schema::TableSchema;
use crate::table::Table;

/// A table validated against schema `S`.
pub struct Validated<S, T> {
    table: T,
    schema: PhantomData<fn() -> S>,
}

impl<S: TableSchema, T: Table> Validated<S, T> {
    /// Validates `table` against `S`. Extra columns are allowed.
    pub fn new(table: T) -> ValidationResult<Self> {
        Self::with_config(table, ValidatorConfig::default())
    }

    /// Validates `table` against `S`, rejecting extra columns.
    pub fn new_strict(table: T) -> ValidationResult<Self> {
        Self::with_config(table, ValidatorConfig::strict())
    }

    pub fn with_config(table: T, config: ValidatorConfig) -> ValidationResult<Self> {
        Validator::with_config(config).validate(&table, &S::schema())?;
        Ok(Self {
            table,
            schema: PhantomData,
        })
    }

    /// Re-checks the table against another schema `P` and rebinds it.
    ///
    /// A table valid for a schema that extends `P` with more columns is
    /// always valid for `P`.
    pub fn revalidate<P: TableSchema>(self) -> ValidationResult<Validated<P, T>> {
        Validated::new(self.table)
    }

    pub fn into_inner(self) -> T {
        self.table
    }
}

impl<S: TableSchema> Validated<S, RecordBatch> {
    /// Zero-row batch typed by `S`.
    pub fn empty() -> ValidationResult<Self> {
        Self::new(make_empty(&S::schema()))
    }
}

impl<S, T> Deref for Validated<S, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.table
    }
}

impl<S, T: Clone> Clone for Validated<S, T> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            schema: PhantomData,
        }
    }
}

impl<S, T: fmt::Debug> fmt::Debug for Validated<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validated")
            .field("schema", &std::any::type_name::<S>())
            .field("table", &self.table)
            .finish()
    }
}
