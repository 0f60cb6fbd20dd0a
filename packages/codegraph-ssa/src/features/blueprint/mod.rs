//! Blueprint feature
//!
//! Classes, interfaces and enums as "blueprints": a skeleton created eagerly
//! when the declaration is visited, member tables filled as placeholders at
//! once, bodies materialized lazily from a deferred queue.
//!
//! - domain/         - `Blueprint`, kinds, build states, member tables
//! - infrastructure/ - Blueprint table (cycle-safe linking), deferred queue
//! - errors          - Link rejections

pub mod domain;
pub mod errors;
pub mod infrastructure;

pub use domain::{Blueprint, BlueprintKind, BlueprintState, MemberTable, CONSTRUCTOR};
pub use errors::BlueprintError;
pub use infrastructure::{BlueprintTable, DeferredQueue, DeferredTask, LinkOutcome, Owner};
