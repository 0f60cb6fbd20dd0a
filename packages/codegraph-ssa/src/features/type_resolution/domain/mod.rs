//! Type domain

pub mod ts_type;

pub use ts_type::{BlueprintView, Type, TypeKind, PROMISE};
