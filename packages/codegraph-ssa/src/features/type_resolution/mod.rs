//! Type resolution feature
//!
//! Maps syntactic annotations to semantic `Type`s and merges inferred with
//! annotated types.
//!
//! - domain/         - `Type` model
//! - infrastructure/ - Elaborator, annotation merge, builtin member table
//! - ports/          - `TypeLookup` (named types defined by the unit)

pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use domain::*;
pub use infrastructure::*;
pub use ports::TypeLookup;
