//! Scalar cell values
//!
//! A `Scalar` is one element of a column as seen from outside the storage
//! backend: sample values in errors, allowed-value sets, literal constants and
//! fixture input all use it.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A single dynamically typed cell value.
///
/// Deserialization is untagged: JSON `null`, booleans, integers, floats and
/// strings map onto the obvious variants. Temporal variants are produced by
/// backends, never by JSON input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Datetime(NaiveDateTime),
    Date(NaiveDate),
    #[serde(skip)]
    Duration(Duration),
}

impl Scalar {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::Null => "null",
            Scalar::Bool(_) => "bool",
            Scalar::Int(_) => "int",
            Scalar::Float(_) => "float",
            Scalar::Str(_) => "str",
            Scalar::Datetime(_) => "datetime",
            Scalar::Date(_) => "date",
            Scalar::Duration(_) => "duration",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    /// Numeric view used by range checks. Booleans are not numbers here.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(v) => Some(*v as f64),
            Scalar::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Quoted rendering used in diagnostics: strings get single quotes so an
    /// empty string or trailing whitespace stays visible.
    pub fn repr(&self) -> String {
        match self {
            Scalar::Str(s) => format!("'{}'", s.replace('\'', "\\'")),
            other => other.to_string(),
        }
    }

    /// Hashable, totally comparable view of the value.
    pub fn key(&self) -> ScalarKey<'_> {
        ScalarKey(self)
    }

    /// Duplicate-group identity: key equality, except that an integer and a
    /// float holding the same number are one value.
    pub fn same_value(&self, other: &Scalar) -> bool {
        match (self, other) {
            (Scalar::Int(i), Scalar::Float(f)) | (Scalar::Float(f), Scalar::Int(i)) => {
                *i as f64 == *f
            }
            _ => self.key() == other.key(),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => write!(f, "null"),
            Scalar::Bool(v) => write!(f, "{}", v),
            Scalar::Int(v) => write!(f, "{}", v),
            Scalar::Float(v) => write!(f, "{}", v),
            Scalar::Str(v) => write!(f, "{}", v),
            Scalar::Datetime(v) => write!(f, "{}", v),
            Scalar::Date(v) => write!(f, "{}", v),
            Scalar::Duration(v) => write!(f, "{}", v),
        }
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Int(v as i64)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Str(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Str(v)
    }
}

impl From<NaiveDateTime> for Scalar {
    fn from(v: NaiveDateTime) -> Self {
        Scalar::Datetime(v)
    }
}

impl From<NaiveDate> for Scalar {
    fn from(v: NaiveDate) -> Self {
        Scalar::Date(v)
    }
}

impl From<Duration> for Scalar {
    fn from(v: Duration) -> Self {
        Scalar::Duration(v)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(v: Option<T>) -> Self {
        v.map_or(Scalar::Null, Into::into)
    }
}

impl From<&serde_json::Value> for Scalar {
    fn from(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Scalar::Null,
            Value::Bool(b) => Scalar::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Scalar::Int(i),
                None => Scalar::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Scalar::Str(s.clone()),
            // Nested values are kept as their JSON text
            other => Scalar::Str(other.to_string()),
        }
    }
}

/// Borrowed key with `Eq + Hash` semantics for a `Scalar`.
///
/// Floats compare by bit pattern after folding `-0.0` into `0.0` and every
/// NaN into one canonical NaN.
#[derive(Debug, Clone, Copy)]
pub struct ScalarKey<'a>(&'a Scalar);

fn canonical_bits(v: f64) -> u64 {
    if v.is_nan() {
        f64::NAN.to_bits()
    } else if v == 0.0 {
        0.0f64.to_bits()
    } else {
        v.to_bits()
    }
}

impl PartialEq for ScalarKey<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self.0, other.0) {
            (Scalar::Float(a), Scalar::Float(b)) => canonical_bits(*a) == canonical_bits(*b),
            (a, b) => a == b,
        }
    }
}

impl Eq for ScalarKey<'_> {}

impl Hash for ScalarKey<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self.0).hash(state);
        match self.0 {
            Scalar::Null => {}
            Scalar::Bool(v) => v.hash(state),
            Scalar::Int(v) => v.hash(state),
            Scalar::Float(v) => canonical_bits(*v).hash(state),
            Scalar::Str(v) => v.hash(state),
            Scalar::Datetime(v) => v.hash(state),
            Scalar::Date(v) => v.hash(state),
            Scalar::Duration(v) => v.hash(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn test_repr_quotes_strings_only() {
        assert_eq!(Scalar::from("abc").repr(), "'abc'");
        assert_eq!(Scalar::Int(5).repr(), "5");
        assert_eq!(Scalar::Null.repr(), "null");
    }

    #[test]
    fn test_from_json_value() {
        assert_eq!(Scalar::from(&json!(3)), Scalar::Int(3));
        assert_eq!(Scalar::from(&json!(2.5)), Scalar::Float(2.5));
        assert_eq!(Scalar::from(&json!("x")), Scalar::Str("x".into()));
        assert_eq!(Scalar::from(&json!(null)), Scalar::Null);
        assert_eq!(Scalar::from(&json!(true)), Scalar::Bool(true));
    }

    #[test]
    fn test_same_value_across_numeric_kinds() {
        assert!(Scalar::Int(1).same_value(&Scalar::Float(1.0)));
        assert!(Scalar::Float(1.0).same_value(&Scalar::Int(1)));
        assert!(!Scalar::Int(1).same_value(&Scalar::Float(1.5)));
        assert!(Scalar::Null.same_value(&Scalar::Null));
        assert!(Scalar::Float(f64::NAN).same_value(&Scalar::Float(f64::NAN)));
        assert!(!Scalar::Null.same_value(&Scalar::Int(0)));
    }

    #[test]
    fn test_key_folds_signed_zero() {
        let a = Scalar::Float(0.0);
        let b = Scalar::Float(-0.0);
        let mut set = HashSet::new();
        set.insert(a.key());
        assert!(set.contains(&b.key()));
    }

    #[test]
    fn test_key_distinguishes_int_and_float() {
        let a = Scalar::Int(1);
        let b = Scalar::Float(1.0);
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn test_untagged_deserialize() {
        let values: Vec<Scalar> = serde_json::from_value(json!([null, 1, 1.5, "a", false])).unwrap();
        assert_eq!(
            values,
            vec![
                Scalar::Null,
                Scalar::Int(1),
                Scalar::Float(1.5),
                Scalar::Str("a".into()),
                Scalar::Bool(false),
            ]
        );
    }
}
