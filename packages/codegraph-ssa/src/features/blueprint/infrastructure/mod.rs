//! Blueprint infrastructure

pub mod blueprint_table;
pub mod deferred;

pub use blueprint_table::{BlueprintTable, LinkOutcome};
pub use deferred::{DeferredQueue, DeferredTask, Owner};
