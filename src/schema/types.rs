//! Schema type definitions
//!
//! A schema is an ordered list of column declarations. Each declaration pairs
//! a column name with an [`Annotation`]: a logical type optionally wrapped to
//! attach constraints, allow nulls, or allow the column to be absent.
//!
//! Supported logical types:
//! - int, float, str, bool
//! - datetime, date, duration
//! - literal: a fixed set of constants, typed by its first constant
//! - native: an Arrow `DataType` used as-is
//! - other: a named type with no mapping

use arrow::datatypes::DataType;
use std::collections::HashSet;
use std::fmt;

use super::errors::{SchemaError, SchemaResult};
use crate::constraint::Constraint;
use crate::scalar::Scalar;

/// Abstract column element type.
#[derive(Debug, Clone, PartialEq)]
pub enum LogicalType {
    Int,
    Float,
    Str,
    Bool,
    Datetime,
    Date,
    Duration,
    /// Enumeration of fixed constants
    Literal(Vec<Scalar>),
    /// Backend-native dtype, passed through without mapping
    Native(DataType),
    /// Named type the crate has no mapping for
    Other(String),
}

impl LogicalType {
    /// Parses the type names used by the JSON schema form.
    ///
    /// Unknown names become `Other` rather than failing.
    pub fn from_name(name: &str) -> Self {
        match name {
            "int" | "integer" => LogicalType::Int,
            "float" => LogicalType::Float,
            "str" | "string" => LogicalType::Str,
            "bool" | "boolean" => LogicalType::Bool,
            "datetime" => LogicalType::Datetime,
            "date" => LogicalType::Date,
            "duration" | "timedelta" => LogicalType::Duration,
            other => LogicalType::Other(other.to_string()),
        }
    }

    /// Returns the type name for error messages
    pub fn type_name(&self) -> String {
        match self {
            LogicalType::Int => "int".into(),
            LogicalType::Float => "float".into(),
            LogicalType::Str => "str".into(),
            LogicalType::Bool => "bool".into(),
            LogicalType::Datetime => "datetime".into(),
            LogicalType::Date => "date".into(),
            LogicalType::Duration => "duration".into(),
            LogicalType::Literal(values) => {
                let items: Vec<String> = values.iter().map(Scalar::repr).collect();
                format!("Literal[{}]", items.join(", "))
            }
            LogicalType::Native(dt) => dt.to_string(),
            LogicalType::Other(name) => name.clone(),
        }
    }

    /// Logical type of a scalar constant, used to resolve literals.
    pub fn of_scalar(value: &Scalar) -> Option<Self> {
        match value {
            Scalar::Null => None,
            Scalar::Bool(_) => Some(LogicalType::Bool),
            Scalar::Int(_) => Some(LogicalType::Int),
            Scalar::Float(_) => Some(LogicalType::Float),
            Scalar::Str(_) => Some(LogicalType::Str),
            Scalar::Datetime(_) => Some(LogicalType::Datetime),
            Scalar::Date(_) => Some(LogicalType::Date),
            Scalar::Duration(_) => Some(LogicalType::Duration),
        }
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// Item attached to an annotated type.
#[derive(Debug, Clone, PartialEq)]
pub enum Meta {
    Constraint(Constraint),
    /// Annotation the validator has no rule for
    Other(String),
}

impl From<Constraint> for Meta {
    fn from(c: Constraint) -> Self {
        Meta::Constraint(c)
    }
}

impl fmt::Display for Meta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Meta::Constraint(c) => write!(f, "{}", c),
            Meta::Other(desc) => write!(f, "{}", desc),
        }
    }
}

/// Type descriptor of one schema column.
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    Type(LogicalType),
    Annotated(Box<Annotation>, Vec<Meta>),
    /// Column present, values may be null
    Optional(Box<Annotation>),
    /// Column may be absent altogether
    NotRequired(Box<Annotation>),
}

impl Annotation {
    pub fn of(ty: LogicalType) -> Self {
        Annotation::Type(ty)
    }

    pub fn int() -> Self {
        Self::of(LogicalType::Int)
    }

    pub fn float() -> Self {
        Self::of(LogicalType::Float)
    }

    pub fn str() -> Self {
        Self::of(LogicalType::Str)
    }

    pub fn bool() -> Self {
        Self::of(LogicalType::Bool)
    }

    pub fn datetime() -> Self {
        Self::of(LogicalType::Datetime)
    }

    pub fn date() -> Self {
        Self::of(LogicalType::Date)
    }

    pub fn duration() -> Self {
        Self::of(LogicalType::Duration)
    }

    pub fn literal<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Scalar>,
    {
        Self::of(LogicalType::Literal(values.into_iter().map(Into::into).collect()))
    }

    pub fn native(dtype: DataType) -> Self {
        Self::of(LogicalType::Native(dtype))
    }

    /// Attaches a constraint. Repeated calls append to the same wrapper.
    pub fn with(self, constraint: Constraint) -> Self {
        self.with_meta(Meta::Constraint(constraint))
    }

    /// Attaches an arbitrary metadata item.
    pub fn with_meta(self, meta: Meta) -> Self {
        match self {
            Annotation::Annotated(inner, mut metas) => {
                metas.push(meta);
                Annotation::Annotated(inner, metas)
            }
            other => Annotation::Annotated(Box::new(other), vec![meta]),
        }
    }

    pub fn optional(self) -> Self {
        Annotation::Optional(Box::new(self))
    }

    pub fn not_required(self) -> Self {
        Annotation::NotRequired(Box::new(self))
    }
}

impl From<LogicalType> for Annotation {
    fn from(ty: LogicalType) -> Self {
        Annotation::Type(ty)
    }
}

/// One declared column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub annotation: Annotation,
}

/// Ordered, immutable set of column declarations.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    columns: Vec<ColumnDef>,
}

impl Schema {
    /// Starts building a schema.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Schema with no columns.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Column names in declaration order.
    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Declarations of the named columns, kept in schema order. Names the
    /// schema does not declare are ignored.
    pub fn select<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Schema {
        let wanted: HashSet<&str> = names.into_iter().collect();
        Schema {
            columns: self
                .columns
                .iter()
                .filter(|c| wanted.contains(c.name.as_str()))
                .cloned()
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Builder that enforces unique column names and well-formed constraints.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    columns: Vec<ColumnDef>,
}

impl SchemaBuilder {
    pub fn column(mut self, name: impl Into<String>, annotation: impl Into<Annotation>) -> Self {
        self.columns.push(ColumnDef {
            name: name.into(),
            annotation: annotation.into(),
        });
        self
    }

    pub fn build(self) -> SchemaResult<Schema> {
        let mut seen = HashSet::new();
        for col in &self.columns {
            if !seen.insert(col.name.as_str()) {
                return Err(SchemaError::DuplicateColumn(col.name.clone()));
            }
            check_annotation(&col.name, &col.annotation)?;
        }
        Ok(Schema {
            columns: self.columns,
        })
    }
}

/// Rejects constraints that can never be evaluated.
fn check_annotation(column: &str, annotation: &Annotation) -> SchemaResult<()> {
    match annotation {
        Annotation::Type(_) => Ok(()),
        Annotation::Optional(inner) | Annotation::NotRequired(inner) => {
            check_annotation(column, inner)
        }
        Annotation::Annotated(inner, metas) => {
            for meta in metas {
                if let Meta::Constraint(constraint) = meta {
                    check_constraint(column, constraint)?;
                }
            }
            check_annotation(column, inner)
        }
    }
}

fn check_constraint(column: &str, constraint: &Constraint) -> SchemaResult<()> {
    match constraint {
        Constraint::Range { min, max } if min > max || min.is_nan() || max.is_nan() => {
            Err(SchemaError::InvalidRange {
                column: column.to_string(),
                min: *min,
                max: *max,
            })
        }
        Constraint::Regex { pattern } => regex::Regex::new(pattern)
            .map(|_| ())
            .map_err(|e| SchemaError::InvalidPattern {
                column: column.to_string(),
                pattern: pattern.clone(),
                reason: e.to_string(),
            }),
        _ => Ok(()),
    }
}

/// A type that names its schema, so tables can be typed by it.
///
/// ```ignore
/// struct Users;
///
/// impl TableSchema for Users {
///     fn schema() -> Schema {
///         Schema::builder()
///             .column("user_id", Annotation::int().with(Constraint::unique()))
///             .column("email", Annotation::str().optional())
///             .build()
///             .expect("static schema")
///     }
/// }
/// ```
pub trait TableSchema {
    fn schema() -> Schema;
}
