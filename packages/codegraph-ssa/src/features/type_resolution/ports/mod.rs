//! Type resolution ports

pub mod type_lookup;

pub use type_lookup::{NoTypes, TypeLookup};
