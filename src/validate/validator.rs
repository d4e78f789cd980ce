//! Table validation against a schema
//!
//! Validation is fail-fast: columns are checked in schema order and the
//! first failure is returned. For each column:
//! 1. Presence (absent not-required columns are skipped)
//! 2. Dtype family of the base type
//! 3. Every attached constraint, in declaration order

use arrow::datatypes::DataType;
use tracing::debug;

use super::errors::{ValidationError, ValidationResult};
use crate::config::ValidatorConfig;
use crate::constraint::apply;
use crate::schema::{column_specs, ColumnSpec, DtypeFamily, Schema};
use crate::table::{Column, Table};

/// Validates tables against schemas.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidatorConfig,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Checks `table` against `schema`, returning the first failure.
    pub fn validate<T: Table + ?Sized>(&self, table: &T, schema: &Schema) -> ValidationResult<()> {
        if self.config.strict {
            self.check_unexpected(table, schema)?;
        }

        for spec in column_specs(schema) {
            self.validate_column(table, &spec)?;
        }

        debug!(
            columns = schema.len(),
            rows = table.num_rows(),
            "table validated"
        );
        Ok(())
    }

    fn check_unexpected<T: Table + ?Sized>(&self, table: &T, schema: &Schema) -> ValidationResult<()> {
        let extra: Vec<String> = table
            .column_names()
            .into_iter()
            .filter(|name| !schema.contains(name))
            .collect();
        if extra.is_empty() {
            return Ok(());
        }
        let declared = schema.names().into_iter().map(String::from).collect();
        Err(ValidationError::unexpected_columns(extra, declared))
    }

    fn validate_column<T: Table + ?Sized>(&self, table: &T, spec: &ColumnSpec) -> ValidationResult<()> {
        let Some(column) = table.column(&spec.name) else {
            if spec.is_not_required {
                debug!(column = %spec.name, "optional column absent, skipped");
                return Ok(());
            }
            return Err(ValidationError::missing_column(&spec.name));
        };

        let family = DtypeFamily::for_type(&spec.base)
            .ok_or_else(|| ValidationError::unsupported_type(&spec.name, spec.base.type_name()))?;

        let dtype = column.dtype();
        // A column with no typed values is consistent with any nullable type
        let untyped_nullable = spec.is_optional && *dtype == DataType::Null;
        if !untyped_nullable && !family.accepts(dtype) {
            return Err(ValidationError::wrong_type(
                &spec.name,
                spec.base.type_name(),
                dtype,
            ));
        }

        for meta in &spec.constraints {
            apply(&spec.name, &column, meta, self.config.max_samples)?;
        }

        debug!(
            column = %spec.name,
            dtype = %dtype,
            constraints = spec.constraints.len(),
            "column validated"
        );
        Ok(())
    }
}

/// Validates with the default configuration.
pub fn validate<T: Table + ?Sized>(table: &T, schema: &Schema) -> ValidationResult<()> {
    Validator::new().validate(table, schema)
}

/// Validates and additionally rejects undeclared columns.
pub fn validate_strict<T: Table + ?Sized>(table: &T, schema: &Schema) -> ValidationResult<()> {
    Validator::with_config(ValidatorConfig::strict()).validate(table, schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::Constraint;
    use crate::scalar::Scalar;
    use crate::schema::{Annotation, LogicalType};
    use crate::table::MemTable;
    use crate::validate::ValidationErrorCode;

    fn people() -> MemTable {
        MemTable::from_columns(vec![
            ("id", vec![Scalar::Int(1), Scalar::Int(2)]),
            ("name", vec![Scalar::from("a"), Scalar::from("b")]),
        ])
        .unwrap()
    }

    #[test]
    fn test_valid_table() {
        let schema = Schema::builder()
            .column("id", Annotation::int().with(Constraint::unique()))
            .column("name", Annotation::str())
            .build()
            .unwrap();
        assert!(validate(&people(), &schema).is_ok());
    }

    #[test]
    fn test_missing_column() {
        let schema = Schema::builder()
            .column("email", Annotation::str())
            .build()
            .unwrap();
        let err = validate(&people(), &schema).unwrap_err();
        assert_eq!(err.code(), ValidationErrorCode::MissingColumn);
        assert_eq!(err.message(), "Missing column: email");
    }

    #[test]
    fn test_not_required_absent_skipped() {
        let schema = Schema::builder()
            .column("id", Annotation::int())
            .column("email", Annotation::str().with(Constraint::min_len(3)).not_required())
            .build()
            .unwrap();
        assert!(validate(&people(), &schema).is_ok());
    }

    #[test]
    fn test_wrong_type() {
        let schema = Schema::builder()
            .column("name", Annotation::int())
            .build()
            .unwrap();
        let err = validate(&people(), &schema).unwrap_err();
        assert_eq!(err.code(), ValidationErrorCode::WrongType);
        assert_eq!(err.message(), "Column 'name' expected int, got Utf8");
    }

    #[test]
    fn test_unsupported_type() {
        let schema = Schema::builder()
            .column("id", Annotation::of(LogicalType::Other("Decimal".into())))
            .build()
            .unwrap();
        let err = validate(&people(), &schema).unwrap_err();
        assert_eq!(err.code(), ValidationErrorCode::UnsupportedType);
        assert_eq!(err.message(), "Unsupported type: Decimal");
    }

    #[test]
    fn test_strict_rejects_extra_columns() {
        let schema = Schema::builder()
            .column("id", Annotation::int())
            .build()
            .unwrap();
        assert!(validate(&people(), &schema).is_ok());

        let err = validate_strict(&people(), &schema).unwrap_err();
        assert_eq!(err.code(), ValidationErrorCode::UnexpectedColumns);
        assert!(err.message().contains("'name'"));
    }

    #[test]
    fn test_all_null_optional_column() {
        let table = MemTable::from_columns(vec![("score", vec![Scalar::Null, Scalar::Null])]).unwrap();
        let optional = Schema::builder()
            .column("score", Annotation::float().optional())
            .build()
            .unwrap();
        assert!(validate(&table, &optional).is_ok());

        let required = Schema::builder()
            .column("score", Annotation::float())
            .build()
            .unwrap();
        assert!(validate(&table, &required).is_err());
    }

    #[test]
    fn test_custom_sample_cap() {
        let table = MemTable::from_columns(vec![(
            "n",
            vec![Scalar::Int(-1), Scalar::Int(-2), Scalar::Int(-3)],
        )])
        .unwrap();
        let schema = Schema::builder()
            .column("n", Annotation::int().with(Constraint::range(0, 10)))
            .build()
            .unwrap();
        let validator = Validator::with_config(ValidatorConfig::default().with_max_samples(2));
        let err = validator.validate(&table, &schema).unwrap_err();
        assert_eq!(err.samples().len(), 2);
        assert_eq!(err.total(), 3);
    }
}
