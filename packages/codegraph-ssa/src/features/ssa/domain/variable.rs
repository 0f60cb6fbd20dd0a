//! Lexical scopes and variables

use ahash::AHashMap as HashMap;
use serde::{Deserialize, Serialize};

use super::ids::{FunctionId, ScopeId, ValueId, VariableId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScopeKind {
    Module,
    Function,
    Block,
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub id: ScopeId,
    pub parent: Option<ScopeId>,
    pub function: FunctionId,
    pub kind: ScopeKind,
    pub names: HashMap<String, VariableId>,
}

impl Scope {
    /// Function and module scopes receive hoisted bindings
    pub fn is_function_level(&self) -> bool {
        matches!(self.kind, ScopeKind::Module | ScopeKind::Function)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub id: VariableId,
    pub name: String,
    pub scope: ScopeId,
    /// Function whose blocks define this variable
    pub function: FunctionId,
    /// `(object, key)` for member variables
    pub member: Option<(ValueId, String)>,
}

impl Variable {
    pub fn is_member(&self) -> bool {
        self.member.is_some()
    }
}
