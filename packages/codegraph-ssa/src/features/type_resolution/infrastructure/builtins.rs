//! Builtin object names and member types

use ahash::{AHashMap as HashMap, AHashSet as HashSet};
use lazy_static::lazy_static;

use crate::features::type_resolution::domain::{Type, TypeKind};

lazy_static! {
    /// Global constructors recognised as named objects
    static ref BUILTIN_OBJECTS: HashSet<&'static str> =
        ["Date", "RegExp", "Error", "Function", "Symbol", "Object"]
            .into_iter()
            .collect();

    /// `(receiver category, member)` → member type
    static ref BUILTIN_MEMBERS: HashMap<(&'static str, &'static str), Type> = {
        let mut m = HashMap::new();
        m.insert(("string", "length"), Type::number());
        m.insert(("slice", "length"), Type::number());
        m
    };
}

pub fn is_builtin_object(name: &str) -> bool {
    BUILTIN_OBJECTS.contains(name)
}

/// Type of a builtin member such as `"abc".length`
pub fn builtin_member_type(receiver: &Type, member: &str) -> Option<Type> {
    let category = match &receiver.kind {
        TypeKind::String => "string",
        TypeKind::Slice(_) => "slice",
        _ => return None,
    };
    BUILTIN_MEMBERS.get(&(category, member)).cloned()
}
