//! Scope arena
//!
//! Lexical scopes form a parent chain; each maps names to variables. A popped
//! scope stays in the arena (closures built later still resolve through it)
//! but is no longer on any lookup path of the code that popped it.

use ahash::AHashMap as HashMap;

use crate::features::ssa::domain::{
    FunctionId, Scope, ScopeId, ScopeKind, ValueId, Variable, VariableId,
};

#[derive(Debug, Default, Clone)]
pub struct ScopeArena {
    scopes: Vec<Scope>,
    variables: Vec<Variable>,
}

impl ScopeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_scope(
        &mut self,
        parent: Option<ScopeId>,
        function: FunctionId,
        kind: ScopeKind,
    ) -> ScopeId {
        let id = ScopeId::from_index(self.scopes.len());
        self.scopes.push(Scope {
            id,
            parent,
            function,
            kind,
            names: HashMap::new(),
        });
        id
    }

    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.index())
    }

    pub fn variable(&self, id: VariableId) -> Option<&Variable> {
        self.variables.get(id.index())
    }

    pub fn variable_name(&self, id: VariableId) -> &str {
        self.variable(id).map(|v| v.name.as_str()).unwrap_or("?")
    }

    /// Bind a fresh variable in `scope`, shadowing any earlier binding there
    pub fn declare(&mut self, scope: ScopeId, name: &str) -> VariableId {
        let function = self
            .scope(scope)
            .map(|s| s.function)
            .unwrap_or(FunctionId(0));
        let id = self.push_variable(name, scope, function, None);
        if let Some(s) = self.scopes.get_mut(scope.index()) {
            s.names.insert(name.to_string(), id);
        }
        id
    }

    /// Existing binding in `scope` itself, else a fresh one
    pub fn declare_or_reuse(&mut self, scope: ScopeId, name: &str) -> VariableId {
        match self.lookup_local(scope, name) {
            Some(id) => id,
            None => self.declare(scope, name),
        }
    }

    /// Unnamed variable standing for `object.key`
    pub fn member_variable(
        &mut self,
        scope: ScopeId,
        function: FunctionId,
        object: ValueId,
        key: &str,
        display: String,
    ) -> VariableId {
        self.push_variable(&display, scope, function, Some((object, key.to_string())))
    }

    fn push_variable(
        &mut self,
        name: &str,
        scope: ScopeId,
        function: FunctionId,
        member: Option<(ValueId, String)>,
    ) -> VariableId {
        let id = VariableId::from_index(self.variables.len());
        self.variables.push(Variable {
            id,
            name: name.to_string(),
            scope,
            function,
            member,
        });
        id
    }

    pub fn lookup_local(&self, scope: ScopeId, name: &str) -> Option<VariableId> {
        self.scope(scope).and_then(|s| s.names.get(name).copied())
    }

    /// Walk the parent chain from `scope`
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<VariableId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let s = self.scope(id)?;
            if let Some(&var) = s.names.get(name) {
                return Some(var);
            }
            current = s.parent;
        }
        None
    }

    /// Nearest enclosing function or module scope
    pub fn function_scope(&self, scope: ScopeId) -> ScopeId {
        let mut current = scope;
        while let Some(s) = self.scope(current) {
            if s.is_function_level() {
                return current;
            }
            match s.parent {
                Some(parent) => current = parent,
                None => return current,
            }
        }
        current
    }

    /// Outermost scope of the chain
    pub fn root_scope(&self, scope: ScopeId) -> ScopeId {
        let mut current = scope;
        while let Some(parent) = self.scope(current).and_then(|s| s.parent) {
            current = parent;
        }
        current
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shadowing_and_parent_lookup() {
        let mut arena = ScopeArena::new();
        let module = arena.new_scope(None, FunctionId(0), ScopeKind::Module);
        let block = arena.new_scope(Some(module), FunctionId(0), ScopeKind::Block);

        let outer = arena.declare(module, "a");
        assert_eq!(arena.lookup(block, "a"), Some(outer));

        let inner = arena.declare(block, "a");
        assert_ne!(inner, outer);
        assert_eq!(arena.lookup(block, "a"), Some(inner));
        assert_eq!(arena.lookup(module, "a"), Some(outer));
        assert_eq!(arena.lookup(module, "missing"), None);
    }

    #[test]
    fn test_function_scope_skips_blocks() {
        let mut arena = ScopeArena::new();
        let module = arena.new_scope(None, FunctionId(0), ScopeKind::Module);
        let func = arena.new_scope(Some(module), FunctionId(1), ScopeKind::Function);
        let block = arena.new_scope(Some(func), FunctionId(1), ScopeKind::Block);
        let nested = arena.new_scope(Some(block), FunctionId(1), ScopeKind::Block);

        assert_eq!(arena.function_scope(nested), func);
        assert_eq!(arena.root_scope(nested), module);
        assert_eq!(arena.scope(nested).map(|s| s.function), Some(FunctionId(1)));
    }

    #[test]
    fn test_declare_or_reuse() {
        let mut arena = ScopeArena::new();
        let module = arena.new_scope(None, FunctionId(0), ScopeKind::Module);
        let first = arena.declare_or_reuse(module, "x");
        assert_eq!(arena.declare_or_reuse(module, "x"), first);
    }
}
