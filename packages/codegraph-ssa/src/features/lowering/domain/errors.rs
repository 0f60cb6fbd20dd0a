//! Fast-fail lowering errors
//!
//! A declaration that cannot be lowered at all stops with one of these. The
//! statement visitor turns it into an error diagnostic and moves on to the
//! next statement.

use thiserror::Error;

use crate::shared::models::DiagnosticTag;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoweringError {
    #[error("declaration has no name")]
    NoDeclarationName,

    #[error("unexpected variable declaration modifier `{0}`")]
    UnexpectedModifier(String),

    #[error("const declaration `{0}` has no initializer")]
    ConstWithoutInitializer(String),

    #[error("binding pattern declaration has no initializer")]
    BindingPatternWithoutInitializer,
}

impl LoweringError {
    pub fn tag(&self) -> DiagnosticTag {
        match self {
            Self::NoDeclarationName => DiagnosticTag::NoDeclarationName,
            Self::UnexpectedModifier(_) => DiagnosticTag::UnexpectedVariableDeclarationModifier,
            Self::ConstWithoutInitializer(_) => DiagnosticTag::ConstDeclarationWithoutInitializer,
            Self::BindingPatternWithoutInitializer => {
                DiagnosticTag::BindingPatternWithoutInitializer
            }
        }
    }
}

pub type LoweringResult<T> = std::result::Result<T, LoweringError>;
