//! Type resolution infrastructure

pub mod builtins;
pub mod elaborator;

pub use builtins::{builtin_member_type, is_builtin_object};
pub use elaborator::{create_type_by_name, elaborate, merge_type_with_annotation, TypeMerge};
