//! Vectorized constraint evaluation
//!
//! Each constraint becomes one boolean "violates" mask over the whole column,
//! computed by the backend's bulk operations. A null slot in that mask means
//! the element was null and never counts as a violation. Uniqueness is the
//! exception: repeated nulls form one duplicate group.

use arrow::array::{BooleanArray, Int64Array};
use arrow::compute::kernels::cmp;
use arrow::compute::{not, or};
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};
use tracing::{trace, warn};

use super::Constraint;
use crate::scalar::Scalar;
use crate::schema::Meta;
use crate::table::mask::{filter_head, positions, settle, sum};
use crate::table::{Column, ColumnError, ColumnResult};
use crate::validate::{ValidationError, ValidationResult};

/// Default cap on sampled offending rows per error.
pub const MAX_SAMPLE_SIZE: usize = 5;

/// Applies one metadata item to a column.
pub fn apply<C: Column + ?Sized>(
    column_name: &str,
    column: &C,
    meta: &Meta,
    max_samples: usize,
) -> ValidationResult<()> {
    match meta {
        Meta::Constraint(constraint) => apply_constraint(column_name, column, constraint, max_samples),
        Meta::Other(desc) => Err(ValidationError::unknown_validator(column_name, desc)),
    }
}

/// Evaluates a constraint and raises a sample-bearing error on violation.
pub fn apply_constraint<C: Column + ?Sized>(
    column_name: &str,
    column: &C,
    constraint: &Constraint,
    max_samples: usize,
) -> ValidationResult<()> {
    let not_applicable =
        |e: ColumnError| ValidationError::constraint_not_applicable(column_name, constraint, &e);

    let violations = settle(violation_mask(column, constraint).map_err(not_applicable)?);
    let total = sum(&violations);
    trace!(
        column = %column_name,
        constraint = %constraint,
        rows = violations.len(),
        violations = total,
        "evaluated constraint"
    );
    if total == 0 {
        return Ok(());
    }

    let samples = filter_head(column, &violations, max_samples);
    let message = match constraint {
        Constraint::Unique => unique_message(column_name, column, &violations, max_samples),
        Constraint::Range { .. } => sample_message(column_name, constraint, &samples, total, |v| {
            v.to_string()
        }),
        Constraint::MinLen { .. } | Constraint::MaxLen { .. } => {
            sample_message(column_name, constraint, &samples, total, |v| match v.as_str() {
                Some(s) => format!("{} (length: {})", v.repr(), s.chars().count()),
                None => v.repr(),
            })
        }
        _ => sample_message(column_name, constraint, &samples, total, Scalar::repr),
    };

    warn!(
        column = %column_name,
        constraint = %constraint,
        violations = total,
        "constraint violated"
    );
    Err(ValidationError::constraint_violation(
        column_name,
        message,
        samples,
        total,
    ))
}

/// Mask of rows violating the constraint.
fn violation_mask<C: Column + ?Sized>(
    column: &C,
    constraint: &Constraint,
) -> ColumnResult<BooleanArray> {
    match constraint {
        Constraint::Range { min, max } => {
            let below = column.lt(*min)?;
            let above = column.gt(*max)?;
            Ok(or(&below, &above)?)
        }
        Constraint::Unique => column.is_duplicated(),
        Constraint::In { allowed } => Ok(not(&column.is_in(allowed)?)?),
        Constraint::Regex { pattern } => {
            let anchored = anchored_regex(pattern)?;
            Ok(not(&column.full_match(&anchored)?)?)
        }
        Constraint::MinLen { min } => {
            let lengths = column.char_lengths()?;
            Ok(cmp::lt(&lengths, &Int64Array::new_scalar(length_bound(*min)))?)
        }
        Constraint::MaxLen { max } => {
            let lengths = column.char_lengths()?;
            Ok(cmp::gt(&lengths, &Int64Array::new_scalar(length_bound(*max)))?)
        }
    }
}

/// Length bounds past `i64::MAX` saturate; no string is that long.
fn length_bound(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Compiled `^(?:pattern)$`, shared across validations of the same pattern.
fn anchored_regex(pattern: &str) -> Result<Regex, regex::Error> {
    static CACHE: OnceLock<Mutex<HashMap<String, Regex>>> = OnceLock::new();
    let cache = CACHE.get_or_init(|| Mutex::new(HashMap::new()));

    if let Ok(compiled) = cache.lock() {
        if let Some(re) = compiled.get(pattern) {
            return Ok(re.clone());
        }
    }
    let re = Regex::new(&format!("^(?:{})$", pattern))?;
    if let Ok(mut compiled) = cache.lock() {
        compiled.insert(pattern.to_string(), re.clone());
    }
    Ok(re)
}

fn sample_message(
    column_name: &str,
    constraint: &Constraint,
    samples: &[(usize, Scalar)],
    total: usize,
    render: impl Fn(&Scalar) -> String,
) -> String {
    let mut message = format!(
        "Column '{}': {}\n\nSample invalid values (showing first {} of {}):",
        column_name,
        constraint.describe(),
        samples.len(),
        total
    );
    for (row, value) in samples {
        message.push_str(&format!("\n  Row {}: {}", row, render(value)));
    }
    message
}

/// Lists each distinct duplicated value with the first two rows holding it.
///
/// Every occurrence of a duplicated value is in the mask, so rows are looked
/// up there by value identity. This also finds null and NaN groups.
fn unique_message<C: Column + ?Sized>(
    column_name: &str,
    column: &C,
    duplicated: &BooleanArray,
    max_samples: usize,
) -> String {
    let marked: Vec<(usize, Scalar)> = positions(duplicated)
        .into_iter()
        .map(|pos| (pos, column.value(pos)))
        .collect();

    let mut distinct: Vec<&Scalar> = Vec::new();
    for (_, value) in &marked {
        if distinct.len() == max_samples {
            break;
        }
        if !distinct.iter().any(|seen| seen.same_value(value)) {
            distinct.push(value);
        }
    }

    let mut message = format!(
        "Column '{}': {}\n\nSample duplicate values (showing first {}):",
        column_name,
        Constraint::Unique.describe(),
        distinct.len()
    );
    for value in distinct {
        let rows: Vec<String> = marked
            .iter()
            .filter(|(_, other)| other.same_value(value))
            .take(2)
            .map(|(pos, _)| column.row_label(*pos).to_string())
            .collect();
        message.push_str(&format!(
            "\n  Value {} at rows: [{}]",
            value.repr(),
            rows.join(", ")
        ));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{MemTable, Table};
    use crate::validate::ValidationErrorCode;

    fn table(name: &str, values: Vec<Scalar>) -> MemTable {
        MemTable::from_columns(vec![(name, values)]).unwrap()
    }

    fn ints(values: &[i64]) -> Vec<Scalar> {
        values.iter().copied().map(Scalar::Int).collect()
    }

    fn strs(values: &[&str]) -> Vec<Scalar> {
        values.iter().map(|s| Scalar::from(*s)).collect()
    }

    fn check(t: &MemTable, name: &str, constraint: Constraint) -> ValidationResult<()> {
        let column = t.column(name).unwrap();
        apply_constraint(name, &column, &constraint, MAX_SAMPLE_SIZE)
    }

    #[test]
    fn test_range_inclusive_bounds() {
        let t = table("age", ints(&[0, 150, 75]));
        assert!(check(&t, "age", Constraint::range(0, 150)).is_ok());
    }

    #[test]
    fn test_range_violation_message() {
        let t = table("age", ints(&[25, -5, 30]));
        let err = check(&t, "age", Constraint::range(0, 150)).unwrap_err();
        assert_eq!(err.code(), ValidationErrorCode::ConstraintViolation);
        assert_eq!(err.samples(), &[(1, Scalar::Int(-5))]);
        assert_eq!(err.total(), 1);
        assert_eq!(
            err.message(),
            "Column 'age': values must be in range [0, 150]\n\n\
             Sample invalid values (showing first 1 of 1):\n  Row 1: -5"
        );
    }

    #[test]
    fn test_unique_flags_every_occurrence() {
        let t = table("user_id", ints(&[1, 2, 2, 3]));
        let err = check(&t, "user_id", Constraint::unique()).unwrap_err();
        assert_eq!(err.total(), 2);
        assert_eq!(err.samples(), &[(1, Scalar::Int(2)), (2, Scalar::Int(2))]);
        assert!(err.message().contains("duplicate"));
        assert!(err.message().contains("Value 2 at rows: [1, 2]"));
    }

    #[test]
    fn test_unique_counts_repeated_nulls() {
        let t = table("id", vec![Scalar::Int(1), Scalar::Null, Scalar::Null]);
        let err = check(&t, "id", Constraint::unique()).unwrap_err();
        assert_eq!(err.total(), 2);
        assert_eq!(err.samples(), &[(1, Scalar::Null), (2, Scalar::Null)]);
        assert!(err.message().contains("Value null at rows: [1, 2]"));

        let single = table("id", vec![Scalar::Int(1), Scalar::Null, Scalar::Int(2)]);
        assert!(check(&single, "id", Constraint::unique()).is_ok());
    }

    #[test]
    fn test_unique_message_finds_nan_rows() {
        let t = table("x", vec![Scalar::Float(f64::NAN), Scalar::Float(1.0), Scalar::Float(f64::NAN)]);
        let err = check(&t, "x", Constraint::unique()).unwrap_err();
        assert_eq!(err.total(), 2);
        assert!(err.message().contains("Value NaN at rows: [0, 2]"));
    }

    #[test]
    fn test_unique_message_uses_row_labels() {
        let t = table("n", ints(&[5, 7, 5]))
            .with_index(vec![100, 200, 300])
            .unwrap();
        let err = check(&t, "n", Constraint::unique()).unwrap_err();
        assert!(err.message().contains("Value 5 at rows: [100, 300]"));
    }

    #[test]
    fn test_length_bounds_saturate() {
        let t = table("name", strs(&["ab"]));
        assert!(check(&t, "name", Constraint::max_len(usize::MAX)).is_ok());
        let err = check(&t, "name", Constraint::min_len(usize::MAX)).unwrap_err();
        assert_eq!(err.total(), 1);
    }

    #[test]
    fn test_anchored_regex_reused() {
        let first = anchored_regex("[a-z]+").unwrap();
        let second = anchored_regex("[a-z]+").unwrap();
        assert_eq!(first.as_str(), "^(?:[a-z]+)$");
        assert_eq!(first.as_str(), second.as_str());
        assert!(!first.is_match("abc1"));
        assert!(anchored_regex("(").is_err());
    }

    #[test]
    fn test_in_reports_quoted_values() {
        let t = table("status", strs(&["pending", "invalid"]));
        let err = check(
            &t,
            "status",
            Constraint::one_of(["pending", "approved", "rejected"]),
        )
        .unwrap_err();
        assert!(err.message().contains("allowed values"));
        assert!(err.message().contains("Row 1: 'invalid'"));
    }

    #[test]
    fn test_regex_requires_full_match() {
        let t = table("code", strs(&["ab12", "ab12x"]));
        let err = check(&t, "code", Constraint::regex("[a-z]+[0-9]+")).unwrap_err();
        assert_eq!(err.samples(), &[(1, Scalar::from("ab12x"))]);
        assert!(err.message().contains("pattern"));
    }

    #[test]
    fn test_length_rows_show_length() {
        let t = table("name", strs(&["a", "abcd"]));
        let err = check(&t, "name", Constraint::min_len(2)).unwrap_err();
        assert!(err.message().contains("Row 0: 'a' (length: 1)"));

        let err = check(&t, "name", Constraint::max_len(3)).unwrap_err();
        assert!(err.message().contains("Row 1: 'abcd' (length: 4)"));
        assert!(err.message().contains("length"));
    }

    #[test]
    fn test_sample_cap() {
        let t = table("n", ints(&[-1, -2, -3, -4, -5, -6, -7]));
        let err = check(&t, "n", Constraint::range(0, 10)).unwrap_err();
        assert_eq!(err.samples().len(), MAX_SAMPLE_SIZE);
        assert_eq!(err.total(), 7);
        assert!(err.message().contains("showing first 5 of 7"));
    }

    #[test]
    fn test_nulls_never_violate() {
        let t = table("n", vec![Scalar::Null, Scalar::Int(5)]);
        assert!(check(&t, "n", Constraint::range(0, 10)).is_ok());
        assert!(check(&t, "n", Constraint::one_of([5i64])).is_ok());
    }

    #[test]
    fn test_range_on_text_not_applicable() {
        let t = table("s", strs(&["a"]));
        let err = check(&t, "s", Constraint::range(0, 1)).unwrap_err();
        assert_eq!(err.code(), ValidationErrorCode::ConstraintNotApplicable);
        assert!(err.is_internal());
    }

    #[test]
    fn test_unknown_meta_rejected() {
        let t = table("n", ints(&[1]));
        let column = t.column("n").unwrap();
        let err = apply("n", &column, &Meta::Other("Positive".into()), MAX_SAMPLE_SIZE).unwrap_err();
        assert_eq!(err.code(), ValidationErrorCode::UnknownValidator);
        assert_eq!(err.message(), "Unknown validator type: Positive");
    }
}
