//! Named type lookup
//!
//! The elaborator resolves a type reference through this port before falling
//! back to builtins. The unit builder implements it over its blueprint table
//! and type alias table.

use crate::features::type_resolution::domain::Type;

pub trait TypeLookup {
    /// Type bound to `name` by a class, interface, enum or type alias
    fn lookup_type(&self, name: &str) -> Option<Type>;
}

/// Lookup with no user-defined types
pub struct NoTypes;

impl TypeLookup for NoTypes {
    fn lookup_type(&self, _name: &str) -> Option<Type> {
        None
    }
}
