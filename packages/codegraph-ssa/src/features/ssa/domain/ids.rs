//! Arena identifiers
//!
//! Every SSA entity lives in an arena owned by `Program`; everything else
//! refers to it through one of these copyable indices.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! arena_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(pub u32);

        impl $name {
            pub fn from_index(index: usize) -> Self {
                Self(index as u32)
            }

            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

arena_id!(
    /// Index into the value graph
    ValueId,
    "v"
);
arena_id!(
    /// Index into the block arena
    BlockId,
    "b"
);
arena_id!(FunctionId, "f");
arena_id!(VariableId, "var");
arena_id!(ScopeId, "s");
arena_id!(
    /// Index into the blueprint table
    BlueprintId,
    "bp"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrip_and_display() {
        let id = ValueId::from_index(7);
        assert_eq!(id.index(), 7);
        assert_eq!(id.to_string(), "v7");
        assert_eq!(BlockId(3).to_string(), "b3");
        assert!(ValueId(1) < ValueId(2));
    }
}
