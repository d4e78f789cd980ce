//! Wildcard value for test fixtures

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::scalar::Scalar;

/// Wildcard that compares equal to every value, itself included.
#[derive(Clone, Copy, Default)]
pub struct Any;

/// The process-wide wildcard instance.
pub static ANY: Any = Any;

impl fmt::Debug for Any {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ANY")
    }
}

impl fmt::Display for Any {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ANY")
    }
}

impl Hash for Any {
    fn hash<H: Hasher>(&self, state: &mut H) {
        "ANY".hash(state);
    }
}

impl PartialEq for Any {
    fn eq(&self, _: &Any) -> bool {
        true
    }
}

impl Eq for Any {}

macro_rules! any_eq {
    ($($t:ty),*) => {
        $(
            impl PartialEq<$t> for Any {
                fn eq(&self, _: &$t) -> bool {
                    true
                }
            }

            impl PartialEq<Any> for $t {
                fn eq(&self, _: &Any) -> bool {
                    true
                }
            }
        )*
    };
}

any_eq!(Scalar, Cell, bool, i32, i64, f64, str, &str, String);

/// Element of a fixture column: a concrete value or the wildcard.
#[derive(Debug, Clone)]
pub enum Cell {
    Any,
    Value(Scalar),
}

impl Cell {
    pub fn is_any(&self) -> bool {
        matches!(self, Cell::Any)
    }

    /// The concrete value, if this is not a wildcard.
    pub fn value(&self) -> Option<&Scalar> {
        match self {
            Cell::Any => None,
            Cell::Value(v) => Some(v),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Any => write!(f, "{}", ANY),
            Cell::Value(v) => write!(f, "{}", v),
        }
    }
}

/// Wildcard cells equal everything; value cells compare their values.
impl PartialEq for Cell {
    fn eq(&self, other: &Cell) -> bool {
        match (self, other) {
            (Cell::Value(a), Cell::Value(b)) => a == b,
            _ => true,
        }
    }
}

impl PartialEq<Scalar> for Cell {
    fn eq(&self, other: &Scalar) -> bool {
        match self {
            Cell::Any => true,
            Cell::Value(v) => v == other,
        }
    }
}

impl PartialEq<Cell> for Scalar {
    fn eq(&self, other: &Cell) -> bool {
        other == self
    }
}

impl From<Scalar> for Cell {
    fn from(v: Scalar) -> Self {
        Cell::Value(v)
    }
}

impl From<Any> for Cell {
    fn from(_: Any) -> Self {
        Cell::Any
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    #[test]
    fn test_any_equals_everything() {
        assert_eq!(ANY, 1i64);
        assert_eq!(ANY, "anything");
        assert_eq!(ANY, Scalar::Null);
        assert_eq!(Scalar::Float(2.5), ANY);
        assert_eq!(ANY, ANY);
        assert!(!(ANY != 0i64));
    }

    #[test]
    fn test_any_display_and_hash() {
        assert_eq!(ANY.to_string(), "ANY");
        assert_eq!(format!("{:?}", ANY), "ANY");

        let mut a = DefaultHasher::new();
        let mut b = DefaultHasher::new();
        ANY.hash(&mut a);
        Any.hash(&mut b);
        assert_eq!(a.finish(), b.finish());
    }

    #[test]
    fn test_cell_equality() {
        assert_eq!(Cell::Any, Cell::Value(Scalar::Int(3)));
        assert_eq!(Cell::Value(Scalar::Int(3)), Scalar::Int(3));
        assert_ne!(Cell::Value(Scalar::Int(3)), Cell::Value(Scalar::Int(4)));
        assert_eq!(Scalar::from("x"), Cell::Any);
    }
}
