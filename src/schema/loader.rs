//! JSON schema loading
//!
//! A schema can be written down as JSON instead of built in code:
//!
//! ```json
//! {
//!   "columns": [
//!     { "name": "user_id", "type": "int", "constraints": [{ "kind": "unique" }] },
//!     { "name": "email", "type": "str", "optional": true },
//!     { "name": "status", "type": "literal", "values": ["pending", "approved"] },
//!     { "name": "age", "type": "int", "required": false }
//!   ]
//! }
//! ```
//!
//! Unknown type names are kept as unmapped types, not rejected.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use super::errors::{SchemaError, SchemaResult};
use super::types::{Annotation, LogicalType, Meta, Schema};
use crate::constraint::Constraint;
use crate::scalar::Scalar;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaFile {
    columns: Vec<ColumnEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ColumnEntry {
    name: String,
    #[serde(rename = "type")]
    type_name: String,
    /// Constants of a `literal` type
    #[serde(default)]
    values: Vec<Scalar>,
    #[serde(default)]
    constraints: Vec<Constraint>,
    #[serde(default)]
    optional: bool,
    #[serde(default = "default_required")]
    required: bool,
}

fn default_required() -> bool {
    true
}

impl ColumnEntry {
    fn into_annotation(self) -> Annotation {
        let base = match self.type_name.as_str() {
            "literal" => LogicalType::Literal(self.values),
            other => LogicalType::from_name(other),
        };

        let mut annotation = Annotation::of(base);
        if !self.constraints.is_empty() {
            annotation = Annotation::Annotated(
                Box::new(annotation),
                self.constraints.into_iter().map(Meta::Constraint).collect(),
            );
        }
        if self.optional {
            annotation = annotation.optional();
        }
        if !self.required {
            annotation = annotation.not_required();
        }
        annotation
    }
}

impl Schema {
    /// Parses a schema from its JSON form.
    pub fn from_json(json: &str) -> SchemaResult<Schema> {
        Self::parse(json, "<in-memory>")
    }

    /// Reads and parses a schema file.
    pub fn load(path: &Path) -> SchemaResult<Schema> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content, &path.display().to_string())
    }

    fn parse(json: &str, source_name: &str) -> SchemaResult<Schema> {
        let file: SchemaFile = serde_json::from_str(json)
            .map_err(|e| SchemaError::malformed(source_name, format!("Invalid JSON: {}", e)))?;

        file.columns
            .into_iter()
            .fold(Schema::builder(), |builder, entry| {
                let name = entry.name.clone();
                builder.column(name, entry.into_annotation())
            })
            .build()
    }
}
