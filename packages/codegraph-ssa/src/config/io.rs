//! Configuration I/O (YAML)
//!
//! Defines the YAML schema types. Loading lives in build_config.rs.

use serde::{Deserialize, Serialize};

use super::build_config::BuildOptions;

pub const SUPPORTED_VERSIONS: &[u32] = &[1];

/// YAML Schema v1
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigExportV1 {
    /// Schema version (always 1 for v1)
    #[serde(default)]
    pub version: Option<u32>,

    /// Base preset
    pub preset: String,

    /// Fine-grained overrides
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<BuildOverrides>,
}

/// Build option overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_inheritance_depth: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_errors: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict_mode: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fold_constants: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drain_at_end: Option<bool>,
}

impl BuildOverrides {
    pub fn from_options(options: &BuildOptions) -> Self {
        Self {
            max_inheritance_depth: Some(options.max_inheritance_depth),
            max_errors: Some(options.max_errors),
            strict_mode: Some(options.strict_mode),
            fold_constants: Some(options.fold_constants),
            drain_at_end: Some(options.drain_at_end),
        }
    }
}
