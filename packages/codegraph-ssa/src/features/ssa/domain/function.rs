//! SSA functions

use serde::{Deserialize, Serialize};

use crate::features::type_resolution::domain::Type;
use crate::shared::models::Span;

use super::ids::{BlockId, BlueprintId, FunctionId, ScopeId, ValueId, VariableId};

/// A captured variable the function writes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideEffectRecord {
    pub variable: VariableId,
    pub name: String,
    /// Last value the function assigned
    pub value: ValueId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub id: FunctionId,
    pub name: String,
    pub parent: Option<FunctionId>,
    /// `Function-<name>` value referring to this function
    pub value: ValueId,
    pub entry: BlockId,
    pub blocks: Vec<BlockId>,
    pub params: Vec<ValueId>,
    pub param_names: Vec<String>,
    pub returns: Vec<ValueId>,
    /// Lexical scope the function was declared in
    pub decl_scope: ScopeId,
    /// Scope holding parameters and hoisted bindings
    pub root_scope: ScopeId,
    pub free_values: Vec<ValueId>,
    pub side_effects: Vec<SideEffectRecord>,
    /// First parameter is the receiver
    pub has_this: bool,
    pub this_blueprint: Option<BlueprintId>,
    pub is_async: bool,
    pub return_type: Option<Type>,
    /// Body has been constructed
    pub built: bool,
    pub range: Span,
}

impl Function {
    pub fn is_module(&self) -> bool {
        self.parent.is_none()
    }

    /// Number of arguments a call should supply, receiver included
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn record_side_effect(&mut self, variable: VariableId, name: &str, value: ValueId) {
        match self
            .side_effects
            .iter_mut()
            .find(|record| record.variable == variable)
        {
            Some(record) => record.value = value,
            None => self.side_effects.push(SideEffectRecord {
                variable,
                name: name.to_string(),
                value,
            }),
        }
    }
}
