//! Column constraints
//!
//! A constraint is a named, parameterized rule that every value of a column
//! must satisfy. Constraints carry only their parameters; evaluation against
//! column data lives in [`evaluator`].
//!
//! # Kinds
//!
//! - `Range`: numeric values within `[min, max]`
//! - `Unique`: no value occurs twice
//! - `In`: values drawn from an allowed set
//! - `Regex`: text values fully match a pattern
//! - `MinLen` / `MaxLen`: text length bounds, in characters

pub mod evaluator;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::scalar::Scalar;

pub use evaluator::{apply, apply_constraint, MAX_SAMPLE_SIZE};

/// Constraint descriptor attached to a column annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Constraint {
    /// Inclusive numeric range
    Range { min: f64, max: f64 },
    /// No duplicated values
    Unique,
    /// Membership in an allowed set
    In { allowed: Vec<Scalar> },
    /// Full-string pattern match
    Regex { pattern: String },
    /// Minimum length in characters
    MinLen { min: usize },
    /// Maximum length in characters
    MaxLen { max: usize },
}

impl Constraint {
    pub fn range(min: impl Into<f64>, max: impl Into<f64>) -> Self {
        Constraint::Range {
            min: min.into(),
            max: max.into(),
        }
    }

    pub fn unique() -> Self {
        Constraint::Unique
    }

    pub fn one_of<I, V>(allowed: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Scalar>,
    {
        Constraint::In {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    pub fn regex(pattern: impl Into<String>) -> Self {
        Constraint::Regex {
            pattern: pattern.into(),
        }
    }

    pub fn min_len(min: usize) -> Self {
        Constraint::MinLen { min }
    }

    pub fn max_len(max: usize) -> Self {
        Constraint::MaxLen { max }
    }

    /// Short kind name, as used in the JSON form.
    pub fn kind(&self) -> &'static str {
        match self {
            Constraint::Range { .. } => "range",
            Constraint::Unique => "unique",
            Constraint::In { .. } => "in",
            Constraint::Regex { .. } => "regex",
            Constraint::MinLen { .. } => "min_len",
            Constraint::MaxLen { .. } => "max_len",
        }
    }

    /// Human-readable description embedded in violation messages.
    pub fn describe(&self) -> String {
        match self {
            Constraint::Range { min, max } => format!("values must be in range [{}, {}]", min, max),
            Constraint::Unique => "contains duplicate values".to_string(),
            Constraint::In { .. } => "contains values not in allowed values".to_string(),
            Constraint::Regex { .. } => "contains values that don't match the pattern".to_string(),
            Constraint::MinLen { .. } => {
                "contains strings shorter than minimum length".to_string()
            }
            Constraint::MaxLen { .. } => "contains strings longer than maximum length".to_string(),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Range { min, max } => write!(f, "Range({}, {})", min, max),
            Constraint::Unique => write!(f, "Unique()"),
            Constraint::In { allowed } => {
                let items: Vec<String> = allowed.iter().map(Scalar::repr).collect();
                write!(f, "In([{}])", items.join(", "))
            }
            Constraint::Regex { pattern } => write!(f, "Regex({:?})", pattern),
            Constraint::MinLen { min } => write!(f, "MinLen({})", min),
            Constraint::MaxLen { max } => write!(f, "MaxLen({})", max),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_describe_keywords() {
        assert!(Constraint::range(0, 150).describe().contains("range"));
        assert!(Constraint::unique().describe().contains("duplicate"));
        assert!(Constraint::one_of(["a"]).describe().contains("allowed values"));
        assert!(Constraint::regex("a+").describe().contains("pattern"));
        assert!(Constraint::min_len(1).describe().contains("length"));
        assert!(Constraint::max_len(1).describe().contains("length"));
    }

    #[test]
    fn test_range_bounds_render_without_fraction() {
        assert_eq!(
            Constraint::range(0, 150).describe(),
            "values must be in range [0, 150]"
        );
    }

    #[test]
    fn test_json_form() {
        let c: Constraint =
            serde_json::from_value(json!({"kind": "range", "min": 0, "max": 10.5})).unwrap();
        assert_eq!(c, Constraint::range(0, 10.5));

        let c: Constraint = serde_json::from_value(json!({"kind": "unique"})).unwrap();
        assert_eq!(c, Constraint::Unique);

        let c: Constraint =
            serde_json::from_value(json!({"kind": "in", "allowed": ["a", 1]})).unwrap();
        assert_eq!(
            c,
            Constraint::In {
                allowed: vec![Scalar::Str("a".into()), Scalar::Int(1)]
            }
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Constraint::one_of(["x", "y"]).to_string(), "In(['x', 'y'])");
        assert_eq!(Constraint::max_len(3).to_string(), "MaxLen(3)");
    }
}
