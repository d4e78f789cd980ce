//! Column spec extraction
//!
//! Decomposes annotations into (base type, constraints, flags) and derives
//! per-column specs. Specs are recomputed on every call; nothing is cached.

use arrow::datatypes::DataType;

use super::dtype::dtype_for;
use super::types::{Annotation, LogicalType, Meta, Schema};

/// An annotation split into its parts.
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposed {
    pub base: LogicalType,
    /// Attached metadata in declaration order
    pub constraints: Vec<Meta>,
    pub is_optional: bool,
    pub is_not_required: bool,
}

/// Derived description of one schema column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub name: String,
    /// Concrete dtype the column is built with
    pub dtype: DataType,
    /// Resolved logical type
    pub base: LogicalType,
    pub constraints: Vec<Meta>,
    pub is_optional: bool,
    pub is_not_required: bool,
}

/// Splits an annotation into base type, metadata and flags.
///
/// Wrappers are peeled outermost first: not-required, then optional, then
/// attached metadata. Wrappers nested in any other order are peeled the same
/// way, so the result always carries a plain logical type. A literal base
/// resolves to the type of its first constant.
pub fn decompose(annotation: &Annotation) -> Decomposed {
    let mut constraints = Vec::new();
    let mut is_optional = false;
    let mut is_not_required = false;

    let mut current = annotation;
    let base = loop {
        match current {
            Annotation::NotRequired(inner) => {
                is_not_required = true;
                current = inner.as_ref();
            }
            Annotation::Optional(inner) => {
                is_optional = true;
                current = inner.as_ref();
            }
            Annotation::Annotated(inner, metas) => {
                constraints.extend(metas.iter().cloned());
                current = inner.as_ref();
            }
            Annotation::Type(ty) => break ty.clone(),
        }
    };

    Decomposed {
        base: resolve_literal(base),
        constraints,
        is_optional,
        is_not_required,
    }
}

fn resolve_literal(base: LogicalType) -> LogicalType {
    match base {
        LogicalType::Literal(values) => match values.first().and_then(LogicalType::of_scalar) {
            Some(resolved) => resolved,
            None => LogicalType::Literal(values),
        },
        other => other,
    }
}

/// Column specs for every schema column, in schema order.
pub fn column_specs(schema: &Schema) -> Vec<ColumnSpec> {
    schema
        .columns()
        .iter()
        .map(|col| {
            let parts = decompose(&col.annotation);
            ColumnSpec {
                name: col.name.clone(),
                dtype: dtype_for(&parts.base),
                base: parts.base,
                constraints: parts.constraints,
                is_optional: parts.is_optional,
                is_not_required: parts.is_not_required,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::Constraint;
    use crate::scalar::Scalar;

    #[test]
    fn test_bare_type() {
        let parts = decompose(&Annotation::int());
        assert_eq!(parts.base, LogicalType::Int);
        assert!(parts.constraints.is_empty());
        assert!(!parts.is_optional);
        assert!(!parts.is_not_required);
    }

    #[test]
    fn test_all_wrappers() {
        let ann = Annotation::str()
            .with(Constraint::min_len(2))
            .with(Constraint::max_len(8))
            .optional()
            .not_required();
        let parts = decompose(&ann);
        assert_eq!(parts.base, LogicalType::Str);
        assert!(parts.is_optional);
        assert!(parts.is_not_required);
        assert_eq!(
            parts.constraints,
            vec![
                Meta::Constraint(Constraint::min_len(2)),
                Meta::Constraint(Constraint::max_len(8)),
            ]
        );
    }

    #[test]
    fn test_unusual_nesting_still_peeled() {
        let ann = Annotation::Annotated(
            Box::new(Annotation::int().optional()),
            vec![Meta::Constraint(Constraint::unique())],
        );
        let parts = decompose(&ann);
        assert_eq!(parts.base, LogicalType::Int);
        assert!(parts.is_optional);
        assert_eq!(parts.constraints.len(), 1);
    }

    #[test]
    fn test_literal_resolves_to_first_constant_type() {
        let parts = decompose(&Annotation::literal(["pending", "approved"]));
        assert_eq!(parts.base, LogicalType::Str);

        let parts = decompose(&Annotation::literal([1, 2, 3]));
        assert_eq!(parts.base, LogicalType::Int);
    }

    #[test]
    fn test_empty_literal_stays_literal() {
        let parts = decompose(&Annotation::of(LogicalType::Literal(Vec::<Scalar>::new())));
        assert_eq!(parts.base, LogicalType::Literal(vec![]));
    }

    #[test]
    fn test_column_specs_order_and_dtype() {
        let schema = Schema::builder()
            .column("user_id", Annotation::int())
            .column("email", Annotation::str().optional())
            .column("age", Annotation::int().not_required())
            .build()
            .unwrap();

        let specs = column_specs(&schema);
        let names: Vec<&str> = specs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["user_id", "email", "age"]);
        assert_eq!(specs[0].dtype, DataType::Int64);
        assert_eq!(specs[1].dtype, DataType::Utf8);
        assert!(specs[1].is_optional);
        assert!(specs[2].is_not_required);
    }

    #[test]
    fn test_column_specs_of_empty_schema() {
        assert!(column_specs(&Schema::empty()).is_empty());
    }
}
