//! Schema declarations
//!
//! A schema is a declarative column-type registry kept apart from validation
//! logic. It is built once, in code or from JSON, and read-only afterwards.
//!
//! # Layers
//!
//! - `types`: logical types, annotations and the schema itself
//! - `extract`: annotation decomposition and column specs
//! - `dtype`: logical type to Arrow dtype mapping

pub mod dtype;
mod errors;
pub mod extract;
mod loader;
mod types;

pub use dtype::{dtype_for, DtypeFamily};
pub use errors::{SchemaError, SchemaResult};
pub use extract::{column_specs, decompose, ColumnSpec, Decomposed};
pub use types::{
    Annotation, ColumnDef, LogicalType, Meta, Schema, SchemaBuilder, TableSchema,
};
