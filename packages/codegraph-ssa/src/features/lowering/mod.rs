//! Lowering feature
//!
//! Syntax tree → SSA for one compilation unit.
//!
//! - domain/         - Export tables, FastFail errors
//! - infrastructure/ - `UnitBuilder` and the statement, expression, pattern,
//!                     call and class visitors
//! - application/    - `SsaUnit` and the build entry points

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{build_from_ast, build_from_source, SsaUnit};
#[cfg(feature = "parallel")]
pub use application::build_units;
pub use domain::{ExportBinding, ExportTable, LoweringError, DEFAULT_EXPORT};
pub use infrastructure::{LoweredUnit, UnitBuilder};
