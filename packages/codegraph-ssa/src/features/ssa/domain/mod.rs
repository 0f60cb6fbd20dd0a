//! SSA domain models

pub mod block;
pub mod function;
pub mod ids;
pub mod value;
pub mod variable;

pub use block::{BasicBlock, Terminator};
pub use function::{Function, SideEffectRecord};
pub use ids::{BlockId, BlueprintId, FunctionId, ScopeId, ValueId, VariableId};
pub use value::{ConstValue, ContainerKind, ExtractField, Phi, UndefinedKind, Value, ValueKind};
pub use variable::{Scope, ScopeKind, Variable};
