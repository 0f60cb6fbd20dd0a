//! Blueprint link errors

use thiserror::Error;

/// Why a parent or interface link was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlueprintError {
    #[error("circular inheritance: `{child}` cannot extend `{parent}`, which already derives from it")]
    CircularInheritance { child: String, parent: String },

    #[error("inheritance chain of `{name}` exceeds the maximum depth of {max_depth}")]
    InheritanceTooDeep { name: String, max_depth: usize },

    #[error("unknown blueprint id {0}")]
    Unknown(u32),
}

impl BlueprintError {
    pub fn tag(&self) -> crate::shared::models::DiagnosticTag {
        use crate::shared::models::DiagnosticTag;
        match self {
            Self::CircularInheritance { .. } | Self::Unknown(_) => DiagnosticTag::CircularInheritance,
            Self::InheritanceTooDeep { .. } => DiagnosticTag::InheritanceTooDeep,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_both_sides() {
        let err = BlueprintError::CircularInheritance {
            child: "A".into(),
            parent: "B".into(),
        };
        let text = err.to_string();
        assert!(text.contains("`A`"));
        assert!(text.contains("`B`"));
    }
}
