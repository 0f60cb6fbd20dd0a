//! Lowering domain

pub mod errors;
pub mod exports;

pub use errors::{LoweringError, LoweringResult};
pub use exports::{ExportBinding, ExportTable, UnitContext, DEFAULT_EXPORT};
