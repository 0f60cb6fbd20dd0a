//! Build configuration
//!
//! `BuildConfig::preset(..)` followed by fluent overrides, or a YAML v1 file.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::{ConfigError, ConfigResult};
use super::io::{BuildOverrides, ConfigExportV1, SUPPORTED_VERSIONS};
use super::preset::Preset;

pub const MIN_INHERITANCE_DEPTH: usize = 1;
pub const MAX_INHERITANCE_DEPTH: usize = 1024;

/// Options consumed by the unit builder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildOptions {
    /// Depth fuse for the blueprint inheritance walk
    pub max_inheritance_depth: usize,
    /// Error diagnostics tolerated before the unit stops (0 = unlimited)
    pub max_errors: usize,
    /// Treat every unit as if it started with "use strict"
    pub strict_mode: bool,
    /// Fold binary/unary operations over constants
    pub fold_constants: bool,
    /// Drain pending deferred builders when the unit ends
    pub drain_at_end: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            max_inheritance_depth: 64,
            max_errors: 0,
            strict_mode: false,
            fold_constants: true,
            drain_at_end: true,
        }
    }
}

/// Full build configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    preset: Preset,
    options: BuildOptions,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self::preset(Preset::Balanced)
    }
}

impl BuildConfig {
    pub fn preset(preset: Preset) -> Self {
        Self {
            preset,
            options: preset.options(),
        }
    }

    pub fn max_inheritance_depth(mut self, depth: usize) -> Self {
        self.options.max_inheritance_depth = depth;
        self
    }

    pub fn max_errors(mut self, max_errors: usize) -> Self {
        self.options.max_errors = max_errors;
        self
    }

    pub fn strict_mode(mut self, strict: bool) -> Self {
        self.options.strict_mode = strict;
        self
    }

    pub fn fold_constants(mut self, fold: bool) -> Self {
        self.options.fold_constants = fold;
        self
    }

    pub fn drain_at_end(mut self, drain: bool) -> Self {
        self.options.drain_at_end = drain;
        self
    }

    /// Validate and finish the builder chain
    pub fn build(self) -> ConfigResult<Self> {
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let depth = self.options.max_inheritance_depth;
        if !(MIN_INHERITANCE_DEPTH..=MAX_INHERITANCE_DEPTH).contains(&depth) {
            return Err(ConfigError::DepthOutOfRange { value: depth });
        }
        Ok(())
    }

    pub fn preset_kind(&self) -> Preset {
        self.preset
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Load from a YAML v1 file
    pub fn from_yaml(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let export: ConfigExportV1 = serde_yaml::from_str(content)?;

        let version = export.version.ok_or(ConfigError::MissingVersion)?;
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(ConfigError::UnsupportedVersion { found: version });
        }

        let preset = Preset::from_str(&export.preset)?;

        let mut config = Self::preset(preset);
        if let Some(overrides) = export.overrides {
            config.apply(overrides);
        }
        config.build()
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        let export = ConfigExportV1 {
            version: Some(1),
            preset: self.preset.as_str().to_string(),
            overrides: Some(BuildOverrides::from_options(&self.options)),
        };
        Ok(serde_yaml::to_string(&export)?)
    }

    fn apply(&mut self, overrides: BuildOverrides) {
        if let Some(v) = overrides.max_inheritance_depth {
            self.options.max_inheritance_depth = v;
        }
        if let Some(v) = overrides.max_errors {
            self.options.max_errors = v;
        }
        if let Some(v) = overrides.strict_mode {
            self.options.strict_mode = v;
        }
        if let Some(v) = overrides.fold_constants {
            self.options.fold_constants = v;
        }
        if let Some(v) = overrides.drain_at_end {
            self.options.drain_at_end = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides() {
        let config = BuildConfig::preset(Preset::Lenient)
            .max_inheritance_depth(8)
            .fold_constants(false)
            .build()
            .unwrap();

        assert_eq!(config.options().max_inheritance_depth, 8);
        assert!(!config.options().fold_constants);
        assert_eq!(config.preset_kind(), Preset::Lenient);
    }

    #[test]
    fn test_depth_range_rejected() {
        let err = BuildConfig::default()
            .max_inheritance_depth(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::DepthOutOfRange { value: 0 }));

        assert!(BuildConfig::default()
            .max_inheritance_depth(MAX_INHERITANCE_DEPTH + 1)
            .build()
            .is_err());
    }

    #[test]
    fn test_default_is_balanced() {
        let config = BuildConfig::default();
        assert_eq!(config.preset_kind(), Preset::Balanced);
        assert_eq!(config.options(), &BuildOptions::default());
    }
}
