//! Syntax infrastructure
//!
//! This is where the tree-sitter dependency lives. Nothing outside this module
//! sees tree-sitter types.

pub mod node_kinds;
pub mod typescript_lowering;

pub use typescript_lowering::{parse_typescript, ParsedSource, TypeScriptLowering};
