//! Shared module - Common types and utilities
//!
//! Types shared by every feature: source spans, diagnostics and the crate error.

pub mod models;

// Re-exports for convenience
pub use models::*;
