//! Configuration errors

use thiserror::Error;

use super::build_config::{MAX_INHERITANCE_DEPTH, MIN_INHERITANCE_DEPTH};
use super::io::SUPPORTED_VERSIONS;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Inheritance depth fuse outside the accepted window
    #[error(
        "max_inheritance_depth {value} is outside {}..={}",
        MIN_INHERITANCE_DEPTH,
        MAX_INHERITANCE_DEPTH
    )]
    DepthOutOfRange { value: usize },

    #[error("configuration file has no `version` field; start it with `version: 1`")]
    MissingVersion,

    #[error("configuration version {found} is not supported (known: {:?})", SUPPORTED_VERSIONS)]
    UnsupportedVersion { found: u32 },

    #[error("unknown preset `{0}` (lenient, balanced, strict, custom)")]
    UnknownPreset(String),

    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
