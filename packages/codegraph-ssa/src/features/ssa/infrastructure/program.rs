/*
 * Program
 *
 * Arena owner for one compilation unit:
 * - value graph
 * - blocks and functions
 * - scopes and variables
 * - the per-(variable, block) definition table used by the phi resolver
 *
 * The SSA algorithms live in sibling files as further `impl Program` blocks.
 */

use ahash::{AHashMap as HashMap, AHashSet as HashSet};
use rustc_hash::FxHashMap;

use crate::features::ssa::domain::{
    BasicBlock, BlockId, Function, FunctionId, ScopeId, ScopeKind, Terminator, UndefinedKind,
    Value, ValueId, ValueKind, VariableId,
};
use crate::shared::models::Span;

use super::render::render_const;
use super::scope::ScopeArena;
use super::value_graph::ValueGraph;

#[derive(Debug, Default, Clone)]
pub struct Program {
    pub graph: ValueGraph,
    pub blocks: Vec<BasicBlock>,
    pub functions: Vec<Function>,
    pub scopes: ScopeArena,

    /// Reaching definition of a variable at the end of a block
    pub(super) current_def: FxHashMap<(VariableId, BlockId), ValueId>,
    /// Phis created in unsealed blocks, completed by `seal_block`
    pub(super) incomplete_phis: FxHashMap<BlockId, Vec<(VariableId, ValueId)>>,
    /// Phis that use a given phi as operand
    pub(super) phi_users: FxHashMap<ValueId, Vec<ValueId>>,
    /// Phis whose operands are still being collected
    pub(super) filling: HashSet<ValueId>,

    member_vars: HashMap<(ValueId, String), VariableId>,
    pub(super) free_values: FxHashMap<(FunctionId, VariableId), ValueId>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    // ═══════════════════════════════════════════════════════════════════
    // Functions
    // ═══════════════════════════════════════════════════════════════════

    /// Create a function with a sealed entry block and its root scope
    ///
    /// `decl_scope` is `None` for the module function.
    pub fn create_function(
        &mut self,
        name: &str,
        parent: Option<FunctionId>,
        decl_scope: Option<ScopeId>,
        range: Span,
    ) -> FunctionId {
        let id = FunctionId::from_index(self.functions.len());
        let kind = if decl_scope.is_some() {
            ScopeKind::Function
        } else {
            ScopeKind::Module
        };
        let root_scope = self.scopes.new_scope(decl_scope, id, kind);

        let entry = BlockId::from_index(self.blocks.len());
        let mut entry_block = BasicBlock::new(entry, id, "entry");
        entry_block.sealed = true;
        self.blocks.push(entry_block);

        let value = self.graph.add(
            Value::new(ValueKind::Function(id), range).with_name(name.to_string()),
        );

        self.functions.push(Function {
            id,
            name: name.to_string(),
            parent,
            value,
            entry,
            blocks: vec![entry],
            params: Vec::new(),
            param_names: Vec::new(),
            returns: Vec::new(),
            decl_scope: decl_scope.unwrap_or(root_scope),
            root_scope,
            free_values: Vec::new(),
            side_effects: Vec::new(),
            has_this: false,
            this_blueprint: None,
            is_async: false,
            return_type: None,
            built: false,
            range,
        });
        id
    }

    pub fn function(&self, id: FunctionId) -> Option<&Function> {
        self.functions.get(id.index())
    }

    pub fn function_mut(&mut self, id: FunctionId) -> Option<&mut Function> {
        self.functions.get_mut(id.index())
    }

    /// Function a `Function` value refers to
    pub fn function_of_value(&self, value: ValueId) -> Option<FunctionId> {
        self.graph.get(value).and_then(Value::as_function)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Blocks
    // ═══════════════════════════════════════════════════════════════════

    pub fn new_block(&mut self, function: FunctionId, name: &str) -> BlockId {
        let id = BlockId::from_index(self.blocks.len());
        self.blocks.push(BasicBlock::new(id, function, name));
        if let Some(f) = self.functions.get_mut(function.index()) {
            f.blocks.push(id);
        }
        id
    }

    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.get(id.index())
    }

    pub fn block_mut(&mut self, id: BlockId) -> Option<&mut BasicBlock> {
        self.blocks.get_mut(id.index())
    }

    pub fn predecessors(&self, id: BlockId) -> &[BlockId] {
        self.block(id).map(|b| b.preds.as_slice()).unwrap_or(&[])
    }

    pub fn add_edge(&mut self, from: BlockId, to: BlockId) {
        if let Some(block) = self.blocks.get_mut(from.index()) {
            block.succs.push(to);
        }
        if let Some(block) = self.blocks.get_mut(to.index()) {
            block.preds.push(from);
        }
    }

    pub fn is_finished(&self, block: BlockId) -> bool {
        self.block(block).map(BasicBlock::is_finished).unwrap_or(true)
    }

    /// Add an instruction to a block and attach the block to the value
    pub fn append_instruction(&mut self, block: BlockId, value: ValueId) {
        if let Some(v) = self.graph.get_mut(value) {
            v.block = Some(block);
        }
        if let Some(b) = self.blocks.get_mut(block.index()) {
            b.instructions.push(value);
        }
    }

    /// First terminator wins; later ones are ignored
    pub fn set_terminator(&mut self, block: BlockId, terminator: Terminator) -> bool {
        match self.blocks.get_mut(block.index()) {
            Some(b) if b.terminator.is_none() => {
                b.terminator = Some(terminator);
                true
            }
            _ => false,
        }
    }

    /// Live phis of a block
    pub fn block_phis(&self, block: BlockId) -> Vec<ValueId> {
        self.block(block)
            .map(|b| {
                b.phis
                    .iter()
                    .copied()
                    .filter(|&phi| self.graph.resolve(phi) == phi)
                    .collect()
            })
            .unwrap_or_default()
    }

    // ═══════════════════════════════════════════════════════════════════
    // Variables
    // ═══════════════════════════════════════════════════════════════════

    /// Variable standing for `object.key`, one per (object, key)
    pub fn member_variable(
        &mut self,
        object: ValueId,
        key: &str,
        scope: ScopeId,
        function: FunctionId,
    ) -> VariableId {
        let object = self.graph.resolve(object);
        if let Some(&var) = self.member_vars.get(&(object, key.to_string())) {
            return var;
        }
        let display = format!("{}.{}", self.display_name(object), key);
        let var = self
            .scopes
            .member_variable(scope, function, object, key, display);
        self.member_vars.insert((object, key.to_string()), var);
        var
    }

    /// Name used when a value appears as an object prefix
    pub fn display_name(&self, value: ValueId) -> String {
        match self.graph.get(value) {
            Some(v) => match (&v.name, &v.kind) {
                (Some(name), _) => name.clone(),
                (None, ValueKind::Const(c)) => render_const(c),
                (None, _) => value.to_string(),
            },
            None => value.to_string(),
        }
    }

    /// Value read when a variable has no definition on any path
    pub(super) fn entry_value(&mut self, var: VariableId, block: BlockId) -> ValueId {
        let Some(variable) = self.scopes.variable(var).cloned() else {
            return self.undefined(UndefinedKind::Default, "?", Span::zero());
        };
        let block_function = self.block(block).map(|b| b.function);

        if let Some((object, key)) = variable.member {
            return self.undefined(
                UndefinedKind::Member { object, key },
                &variable.name,
                Span::zero(),
            );
        }

        match block_function {
            Some(function) if function != variable.function => {
                self.free_value(function, var, &variable.name)
            }
            _ => self.undefined(UndefinedKind::Default, &variable.name, Span::zero()),
        }
    }

    /// Memoized capture of an outer variable inside `function`
    pub fn free_value(&mut self, function: FunctionId, var: VariableId, name: &str) -> ValueId {
        if let Some(&value) = self.free_values.get(&(function, var)) {
            return value;
        }
        let value = self.graph.add(
            Value::new(ValueKind::FreeValue { variable: var }, Span::zero()).with_name(name),
        );
        self.free_values.insert((function, var), value);
        if let Some(f) = self.functions.get_mut(function.index()) {
            f.free_values.push(value);
        }
        value
    }

    pub fn undefined(&mut self, kind: UndefinedKind, name: &str, range: Span) -> ValueId {
        self.graph
            .add(Value::new(ValueKind::Undefined(kind), range).with_name(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_function_has_sealed_entry() {
        let mut program = Program::new();
        let main = program.create_function("main", None, None, Span::zero());
        let f = program.function(main).unwrap();
        assert!(f.is_module());
        assert_eq!(f.blocks, vec![f.entry]);
        assert!(program.block(f.entry).unwrap().sealed);
        assert_eq!(program.function_of_value(f.value), Some(main));
    }

    #[test]
    fn test_edges_record_both_directions() {
        let mut program = Program::new();
        let main = program.create_function("main", None, None, Span::zero());
        let entry = program.function(main).unwrap().entry;
        let next = program.new_block(main, "next");
        program.add_edge(entry, next);
        assert_eq!(program.predecessors(next), &[entry]);
        assert_eq!(program.block(entry).unwrap().succs, vec![next]);
    }

    #[test]
    fn test_first_terminator_wins() {
        let mut program = Program::new();
        let main = program.create_function("main", None, None, Span::zero());
        let entry = program.function(main).unwrap().entry;
        let other = program.new_block(main, "other");
        assert!(program.set_terminator(entry, Terminator::Jump(other)));
        assert!(!program.set_terminator(entry, Terminator::Jump(entry)));
        assert!(program.is_finished(entry));
    }

    #[test]
    fn test_member_variable_is_memoized_per_key() {
        let mut program = Program::new();
        let main = program.create_function("main", None, None, Span::zero());
        let scope = program.function(main).unwrap().root_scope;
        let object = program.undefined(UndefinedKind::Default, "obj", Span::zero());
        let a = program.member_variable(object, "a", scope, main);
        let again = program.member_variable(object, "a", scope, main);
        let b = program.member_variable(object, "b", scope, main);
        assert_eq!(a, again);
        assert_ne!(a, b);
        assert_eq!(program.scopes.variable_name(a), "obj.a");
    }
}
