//! Test fixtures
//!
//! `for_test` turns partial column data into a schema-shaped frame whose
//! unsupplied columns hold the [`ANY`] wildcard. The supplied columns are
//! validated against their declarations first. `make_empty` builds the
//! typed zero-row batch for a schema.

mod any;
mod builder;
mod errors;

pub use any::{Any, Cell, ANY};
pub use builder::{
    build_fixture, convert_input, for_test, make_empty, validate_supplied, ColumnData,
    FixtureColumn, FixtureFrame, TabularInput,
};
pub use errors::{FixtureError, FixtureResult};
