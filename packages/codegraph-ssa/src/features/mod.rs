//! Feature modules - Each feature follows Hexagonal Architecture
//!
//! Each feature contains:
//! - domain/     - Pure data model (no external dependencies)
//! - ports/      - Interface definitions (traits)
//! - application/ - Use cases
//! - infrastructure/ - Algorithms and external dependency implementations

// Syntax tree consumed by the front-end, plus the tree-sitter adapter
pub mod syntax;

// Annotation elaboration and inferred/annotated type merging
pub mod type_resolution;

// Value graph, phi resolution and structured control-flow builders
pub mod ssa;

// Classes, interfaces and enums: member tables, cycle-safe linking
pub mod blueprint;

// Per-unit driver: statements, expressions, patterns, calls, classes
pub mod lowering;
