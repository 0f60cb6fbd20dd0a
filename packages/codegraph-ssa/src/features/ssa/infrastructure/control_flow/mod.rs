//! Structured control-flow builders
//!
//! Each builder creates its blocks and terminator, runs caller-supplied
//! callbacks at the right insertion points and seals every block once its
//! predecessors are final. Merge-point phis come from the resolver on the
//! next read.
//!
//! Callbacks receive the emitter back, so statement and expression visitors
//! can recurse through the same driver.

mod if_builder;
mod label_builder;
mod loop_builder;
mod short_circuit;
mod switch_builder;
mod try_builder;

pub use if_builder::IfBuilder;
pub use label_builder::LabelBuilder;
pub use loop_builder::LoopBuilder;
pub use short_circuit::ShortCircuitBuilder;
pub use switch_builder::SwitchBuilder;
pub use try_builder::TryBuilder;

use crate::features::ssa::domain::ValueId;

/// Callback producing a value (conditions, case tests, branch results)
pub type ValueFn<'f, E> = Box<dyn FnOnce(&mut E) -> ValueId + 'f>;

/// Callback emitting statements
pub type BodyFn<'f, E> = Box<dyn FnOnce(&mut E) + 'f>;
