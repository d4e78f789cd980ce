//! Table validation
//!
//! Checks a table against a schema: column presence, dtype family, then
//! column constraints. The first failure is reported as a [`ValidationError`]
//! carrying the offending column and a bounded sample of bad rows.

mod errors;
mod typed;
mod validator;

pub use errors::{Severity, ValidationError, ValidationErrorCode, ValidationResult};
pub use typed::Validated;
pub use validator::{validate, validate_strict, Validator};
