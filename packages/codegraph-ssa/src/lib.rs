/*
 * Codegraph SSA - Scope-aware SSA front-end for JavaScript/TypeScript
 *
 * Feature-First Hexagonal Architecture:
 * - shared/      : Common models (Span, Diagnostic, CodegraphError)
 * - config/      : Presets, overrides and YAML files for a build
 * - features/    : Vertical slices (syntax → type_resolution → ssa → blueprint → lowering)
 *
 * A unit is lowered on one thread; independent units are built in parallel
 * with Rayon (`build_units`, feature `parallel`).
 */

// Crate-level lint configuration
#![allow(clippy::too_many_arguments)] // Visitor helpers thread spans and modifiers
#![allow(clippy::type_complexity)] // Boxed deferred builders
#![allow(clippy::new_without_default)] // Default impl not always needed
#![allow(clippy::upper_case_acronyms)] // SSA, CJS naming
#![allow(clippy::module_inception)] // Module naming intentional
#![allow(clippy::collapsible_if)] // Readability over brevity
#![allow(clippy::single_match)] // Single match for readability
#![allow(clippy::unnecessary_map_or)] // map_or style for compatibility

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports - Feature-First Architecture
// ═══════════════════════════════════════════════════════════════════════════

/// Shared models and utilities
pub mod shared;

/// Feature modules
pub mod features;

/// Configuration system
pub mod config;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports for Public API
// ═══════════════════════════════════════════════════════════════════════════

pub use config::{BuildConfig, BuildOptions, Preset};
pub use features::blueprint::{Blueprint, BlueprintKind};
pub use features::lowering::{build_from_ast, build_from_source, SsaUnit};
#[cfg(feature = "parallel")]
pub use features::lowering::build_units;
pub use features::ssa::domain::{ValueId, ValueKind};
pub use features::type_resolution::Type;
pub use shared::models::{CodegraphError, Diagnostic, DiagnosticTag, ErrorKind, Result, Severity, Span};
