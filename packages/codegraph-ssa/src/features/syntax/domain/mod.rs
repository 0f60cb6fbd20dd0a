//! Syntax tree domain

pub mod ast;
pub mod operators;

pub use ast::*;
pub use operators::{AssignOperator, BinaryOperator, UnaryOperator, UpdateOperator};
