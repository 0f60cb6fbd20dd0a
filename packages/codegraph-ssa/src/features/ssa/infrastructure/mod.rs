//! SSA infrastructure
//!
//! `Program` owns the arenas; the Braun resolver, the cursor and the
//! control-flow builders extend it.

pub mod control_flow;
pub mod cursor;
pub mod phi_resolver;
pub mod program;
pub mod render;
pub mod scope;
pub mod value_graph;

pub use control_flow::{
    BodyFn, IfBuilder, LabelBuilder, LoopBuilder, ShortCircuitBuilder, SwitchBuilder, TryBuilder,
    ValueFn,
};
pub use cursor::{FunctionBuildContext, JumpKind, JumpTarget, SsaCursor};
pub use program::Program;
pub use render::{binary_name, render_const, render_value, unary_name};
pub use scope::ScopeArena;
pub use value_graph::ValueGraph;
