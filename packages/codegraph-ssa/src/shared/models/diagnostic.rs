//! Diagnostic records
//!
//! Problems found while lowering a unit are recorded, never thrown. Each record
//! carries a severity, a stable tag, a message and the offending source range.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warn,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
        }
    }
}

/// Stable diagnostic tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticTag {
    // Declarations (fast-fail)
    NoDeclarationName,
    UnexpectedVariableDeclarationModifier,
    ConstDeclarationWithoutInitializer,
    BindingPatternWithoutInitializer,

    // Recoverable gaps
    UnhandledStatement,
    UnhandledExpression,
    UnhandledTypeNode,
    NotFullyImplemented,
    InvalidPropertyName,
    InvalidPropertyBinding,
    RestElementRequiresIdentifier,
    InvalidParameter,
    UnexpectedBreak,
    UnexpectedContinue,
    EmptyLabel,
    PromiseMethodWithoutCallback,
    SyntaxError,

    // Types
    TypeMismatch,

    // Blueprint graph
    CircularInheritance,
    InheritanceTooDeep,
    RedundantParent,

    // Unit
    StopRequested,
}

impl DiagnosticTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticTag::NoDeclarationName => "NoDeclarationName",
            DiagnosticTag::UnexpectedVariableDeclarationModifier => {
                "UnexpectedVariableDeclarationModifier"
            }
            DiagnosticTag::ConstDeclarationWithoutInitializer => {
                "ConstDeclarationWithoutInitializer"
            }
            DiagnosticTag::BindingPatternWithoutInitializer => "BindingPatternWithoutInitializer",
            DiagnosticTag::UnhandledStatement => "UnhandledStatement",
            DiagnosticTag::UnhandledExpression => "UnhandledExpression",
            DiagnosticTag::UnhandledTypeNode => "UnhandledTypeNode",
            DiagnosticTag::NotFullyImplemented => "NotFullyImplemented",
            DiagnosticTag::InvalidPropertyName => "InvalidPropertyName",
            DiagnosticTag::InvalidPropertyBinding => "InvalidPropertyBinding",
            DiagnosticTag::RestElementRequiresIdentifier => "RestElementRequiresIdentifier",
            DiagnosticTag::InvalidParameter => "InvalidParameter",
            DiagnosticTag::UnexpectedBreak => "UnexpectedBreak",
            DiagnosticTag::UnexpectedContinue => "UnexpectedContinue",
            DiagnosticTag::EmptyLabel => "EmptyLabel",
            DiagnosticTag::PromiseMethodWithoutCallback => "PromiseMethodWithoutCallback",
            DiagnosticTag::SyntaxError => "SyntaxError",
            DiagnosticTag::TypeMismatch => "TypeMismatch",
            DiagnosticTag::CircularInheritance => "CircularInheritance",
            DiagnosticTag::InheritanceTooDeep => "InheritanceTooDeep",
            DiagnosticTag::RedundantParent => "RedundantParent",
            DiagnosticTag::StopRequested => "StopRequested",
        }
    }
}

/// One diagnostic record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub tag: DiagnosticTag,
    pub message: String,
    pub range: Span,
}

impl Diagnostic {
    pub fn new(severity: Severity, tag: DiagnosticTag, message: impl Into<String>, range: Span) -> Self {
        Self {
            severity,
            tag,
            message: message.into(),
            range,
        }
    }

    pub fn error(tag: DiagnosticTag, message: impl Into<String>, range: Span) -> Self {
        Self::new(Severity::Error, tag, message, range)
    }

    pub fn warn(tag: DiagnosticTag, message: impl Into<String>, range: Span) -> Self {
        Self::new(Severity::Warn, tag, message, range)
    }

    pub fn info(tag: DiagnosticTag, message: impl Into<String>, range: Span) -> Self {
        Self::new(Severity::Info, tag, message, range)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {} at {}",
            self.severity.as_str(),
            self.tag.as_str(),
            self.message,
            self.range
        )
    }
}
