//! Lowering application layer
pub mod build_unit;

pub use build_unit::{
    build_from_ast, build_from_source, build_named, build_named_source, SsaUnit, DEFAULT_UNIT_NAME,
};
#[cfg(feature = "parallel")]
pub use build_unit::build_units;
