//! Lowering infrastructure
//!
//! `UnitBuilder` and its visitors. Each file adds one `impl UnitBuilder`
//! block; only the builder itself is public.

pub mod builder;

mod calls;
mod classes;
mod declarations;
mod expressions;
mod operators;
mod patterns;
mod statements;

pub use builder::{LoweredUnit, UnitBuilder, UnitTypes};
