//! Configuration System
//!
//! Two levels:
//! - Preset: `BuildConfig::preset(Preset::Strict)`
//! - Overrides: fluent setters or a versioned YAML file
//!
//! # Examples
//!
//! ```rust,ignore
//! use codegraph_ssa::config::{BuildConfig, Preset};
//!
//! let config = BuildConfig::preset(Preset::Balanced)
//!     .max_inheritance_depth(16)
//!     .build()?;
//!
//! let config = BuildConfig::from_yaml("ssa.yaml")?;
//! ```

pub mod build_config;
pub mod error;
pub mod io;
pub mod preset;

// Re-exports
pub use build_config::{BuildConfig, BuildOptions};
pub use error::{ConfigError, ConfigResult};
pub use io::{BuildOverrides, ConfigExportV1};
pub use preset::Preset;
