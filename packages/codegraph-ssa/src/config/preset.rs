//! Preset configurations
//!
//! Presets provide complete default build options for common use cases.

use serde::{Deserialize, Serialize};

use super::build_config::BuildOptions;
use super::error::ConfigError;

/// Configuration preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Scripts and partial sources: never stop, deep inheritance allowed
    ///
    /// - max_inheritance_depth=128, max_errors=0 (unlimited)
    Lenient,

    /// Default analysis front-end
    ///
    /// - max_inheritance_depth=64, max_errors=0 (unlimited)
    Balanced,

    /// Module code: strict-mode scoping, stop on first error
    ///
    /// - max_inheritance_depth=32, max_errors=1, strict_mode=true
    Strict,

    /// Custom: balanced defaults, meant to be overridden via YAML or builder API
    Custom,
}

impl Preset {
    /// Default options for this preset
    pub fn options(&self) -> BuildOptions {
        match self {
            Self::Lenient => BuildOptions {
                max_inheritance_depth: 128,
                max_errors: 0,
                strict_mode: false,
                fold_constants: true,
                drain_at_end: true,
            },
            Self::Balanced | Self::Custom => BuildOptions::default(),
            Self::Strict => BuildOptions {
                max_inheritance_depth: 32,
                max_errors: 1,
                strict_mode: true,
                fold_constants: true,
                drain_at_end: true,
            },
        }
    }

    /// Parse preset from string
    pub fn from_str(s: &str) -> Result<Self, ConfigError> {
        match s.to_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "balanced" => Ok(Self::Balanced),
            "strict" => Ok(Self::Strict),
            "custom" => Ok(Self::Custom),
            _ => Err(ConfigError::UnknownPreset(s.to_string())),
        }
    }

    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lenient => "lenient",
            Self::Balanced => "balanced",
            Self::Strict => "strict",
            Self::Custom => "custom",
        }
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::Balanced
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
