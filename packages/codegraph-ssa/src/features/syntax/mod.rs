//! Syntax feature
//!
//! - domain/         - Immutable syntax tree consumed by the SSA front-end
//! - infrastructure/ - tree-sitter based TypeScript lowering into that tree

pub mod domain;
pub mod infrastructure;

pub use domain::*;
pub use infrastructure::{parse_typescript, ParsedSource};
