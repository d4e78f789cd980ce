//! framecheck - declarative runtime schema validation for columnar tables
//!
//! A schema is an ordered set of typed columns with optional constraints.
//! Tables are checked against it at construction time, and partial data can
//! be expanded into schema-shaped test fixtures.

pub mod config;
pub mod constraint;
pub mod fixture;
pub mod scalar;
pub mod schema;
pub mod table;
pub mod validate;

pub use config::ValidatorConfig;
pub use constraint::Constraint;
pub use fixture::{for_test, make_empty, FixtureError, FixtureFrame, ANY};
pub use scalar::Scalar;
pub use schema::{Annotation, LogicalType, Schema, SchemaError, TableSchema};
pub use table::{Column, MemTable, Table};
pub use validate::{validate, Validated, ValidationError, ValidationErrorCode, Validator};
