/*
 * SSA Cursor
 *
 * Insertion point for the lowering: owns the `Program` and the build context
 * of the function being filled. Nested functions, methods and deferred
 * builders push a fresh `FunctionBuildContext` and pop it when done; the
 * saved stack restores the caller exactly where it stopped.
 */

use crate::features::ssa::domain::{
    BlockId, BlueprintId, ConstValue, FunctionId, ScopeId, ScopeKind, Terminator, UndefinedKind,
    Value, ValueId, ValueKind, VariableId,
};
use crate::features::type_resolution::domain::Type;
use crate::shared::models::Span;

use super::program::Program;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpKind {
    Loop,
    Switch,
    Label,
}

/// Active `break`/`continue` destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JumpTarget {
    pub label: Option<String>,
    pub break_to: BlockId,
    pub continue_to: Option<BlockId>,
    pub kind: JumpKind,
}

#[derive(Debug, Clone)]
pub struct FunctionBuildContext {
    pub function: FunctionId,
    pub block: BlockId,
    pub scope: ScopeId,
    pub jump_targets: Vec<JumpTarget>,
    /// Blueprint whose instance `this` refers to
    pub this_blueprint: Option<BlueprintId>,
    pub this_value: Option<ValueId>,
    /// Writes through `this` add members to its blueprint
    pub registers_members: bool,
    /// Label waiting for the loop or switch it names
    pub pending_label: Option<String>,
}

impl FunctionBuildContext {
    pub fn new(function: FunctionId, block: BlockId, scope: ScopeId) -> Self {
        Self {
            function,
            block,
            scope,
            jump_targets: Vec::new(),
            this_blueprint: None,
            this_value: None,
            registers_members: false,
            pending_label: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SsaCursor {
    pub program: Program,
    pub current: FunctionBuildContext,
    saved: Vec<FunctionBuildContext>,
    /// Undeclared assignments bind in the current block instead of the function
    pub strict: bool,
}

impl SsaCursor {
    /// Cursor positioned at the entry of a fresh module function
    pub fn new(module_name: &str) -> Self {
        let mut program = Program::new();
        let main = program.create_function(module_name, None, None, Span::zero());
        let (entry, scope) = program
            .function(main)
            .map(|f| (f.entry, f.root_scope))
            .unwrap_or((BlockId(0), ScopeId(0)));
        if let Some(f) = program.function_mut(main) {
            f.built = true;
        }
        Self {
            program,
            current: FunctionBuildContext::new(main, entry, scope),
            saved: Vec::new(),
            strict: false,
        }
    }

    pub fn into_program(self) -> Program {
        self.program
    }

    // ═══════════════════════════════════════════════════════════════════
    // Function contexts
    // ═══════════════════════════════════════════════════════════════════

    pub fn function(&self) -> FunctionId {
        self.current.function
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// Start filling `function` at its entry block
    pub fn push_function(&mut self, function: FunctionId) {
        let (entry, scope) = self
            .program
            .function(function)
            .map(|f| (f.entry, f.root_scope))
            .unwrap_or((self.current.block, self.current.scope));
        let context = FunctionBuildContext::new(function, entry, scope);
        let previous = std::mem::replace(&mut self.current, context);
        self.saved.push(previous);
    }

    /// Return to the caller's context; the module context is never popped
    pub fn pop_function(&mut self) {
        if let Some(previous) = self.saved.pop() {
            self.current = previous;
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Blocks
    // ═══════════════════════════════════════════════════════════════════

    pub fn current_block(&self) -> BlockId {
        self.current.block
    }

    pub fn set_block(&mut self, block: BlockId) {
        self.current.block = block;
    }

    pub fn new_block(&mut self, name: &str) -> BlockId {
        self.program.new_block(self.current.function, name)
    }

    pub fn add_edge(&mut self, from: BlockId, to: BlockId) {
        self.program.add_edge(from, to);
    }

    pub fn seal(&mut self, block: BlockId) {
        self.program.seal_block(block);
    }

    pub fn is_block_finished(&self) -> bool {
        self.program.is_finished(self.current.block)
    }

    /// Jump from the current block unless it already ended
    pub fn jump(&mut self, target: BlockId) {
        let from = self.current.block;
        if self.program.set_terminator(from, Terminator::Jump(target)) {
            self.program.add_edge(from, target);
        }
    }

    /// End the current block; successor edges are the caller's business
    pub fn terminate(&mut self, terminator: Terminator) -> bool {
        self.program.set_terminator(self.current.block, terminator)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Values
    // ═══════════════════════════════════════════════════════════════════

    /// Append an instruction to the current block
    pub fn emit(&mut self, kind: ValueKind, range: Span) -> ValueId {
        let value = self.program.graph.add(Value::new(kind, range));
        self.program.append_instruction(self.current.block, value);
        value
    }

    pub fn emit_typed(&mut self, kind: ValueKind, ty: Option<Type>, range: Span) -> ValueId {
        let value = self.emit(kind, range);
        self.program.graph.set_type(value, ty);
        value
    }

    pub fn constant(&mut self, value: ConstValue, range: Span) -> ValueId {
        self.program.graph.constant(value, range)
    }

    pub fn undefined(&mut self, name: &str, range: Span) -> ValueId {
        self.program.undefined(UndefinedKind::Default, name, range)
    }

    pub fn undefined_typed(&mut self, kind: UndefinedKind, name: &str, ty: Option<Type>, range: Span) -> ValueId {
        let value = self.program.undefined(kind, name, range);
        self.program.graph.set_type(value, ty);
        value
    }

    pub fn ty(&self, value: ValueId) -> Option<&Type> {
        self.program.graph.ty(value)
    }

    pub fn set_type(&mut self, value: ValueId, ty: Option<Type>) {
        self.program.graph.set_type(value, ty);
    }

    // ═══════════════════════════════════════════════════════════════════
    // Scopes and variables
    // ═══════════════════════════════════════════════════════════════════

    pub fn scope(&self) -> ScopeId {
        self.current.scope
    }

    pub fn push_scope(&mut self) -> ScopeId {
        let scope = self.program.scopes.new_scope(
            Some(self.current.scope),
            self.current.function,
            ScopeKind::Block,
        );
        self.current.scope = scope;
        scope
    }

    pub fn pop_scope(&mut self) {
        let parent = self
            .program
            .scopes
            .scope(self.current.scope)
            .filter(|s| s.kind == ScopeKind::Block)
            .and_then(|s| s.parent);
        if let Some(parent) = parent {
            self.current.scope = parent;
        }
    }

    /// `let`/`const`/parameter binding in the current block scope
    pub fn declare_local(&mut self, name: &str) -> VariableId {
        self.program.scopes.declare(self.current.scope, name)
    }

    /// `var`/function binding in the enclosing function scope
    pub fn declare_hoisted(&mut self, name: &str) -> VariableId {
        let scope = self.program.scopes.function_scope(self.current.scope);
        self.program.scopes.declare_or_reuse(scope, name)
    }

    /// Implicit global, bound once in the outermost scope
    pub fn declare_global(&mut self, name: &str) -> VariableId {
        let root = self.program.scopes.root_scope(self.current.scope);
        self.program.scopes.declare_or_reuse(root, name)
    }

    pub fn lookup(&self, name: &str) -> Option<VariableId> {
        self.program.scopes.lookup(self.current.scope, name)
    }

    /// Target for an assignment; undeclared names bind per strictness
    pub fn lookup_or_bind(&mut self, name: &str) -> VariableId {
        if let Some(var) = self.lookup(name) {
            return var;
        }
        if self.strict {
            self.declare_local(name)
        } else {
            self.declare_hoisted(name)
        }
    }

    /// Define `var` at the current block
    ///
    /// Writing a variable owned by an enclosing function also records a
    /// side effect on the current function.
    pub fn assign(&mut self, var: VariableId, value: ValueId) {
        let block = self.current.block;
        let value = self.program.graph.resolve(value);
        self.program.write_variable(var, block, value);

        let Some(variable) = self.program.scopes.variable(var).cloned() else {
            return;
        };
        if !variable.is_member() {
            self.program.graph.name_if_unnamed(value, &variable.name);
        }
        if variable.function != self.current.function && !variable.is_member() {
            if let Some(f) = self.program.function_mut(self.current.function) {
                f.record_side_effect(var, &variable.name, value);
            }
        }
    }

    pub fn read_var(&mut self, var: VariableId) -> ValueId {
        let block = self.current.block;
        self.program.read_variable(var, block)
    }

    /// Value of `name`; an undeclared name reads as an implicit global
    pub fn read(&mut self, name: &str) -> ValueId {
        let var = match self.lookup(name) {
            Some(var) => var,
            None => self.declare_global(name),
        };
        self.read_var(var)
    }

    /// Member variable for `object.key` in the current function
    pub fn member_variable(&mut self, object: ValueId, key: &str) -> VariableId {
        let scope = self.current.scope;
        let function = self.current.function;
        self.program.member_variable(object, key, scope, function)
    }

    /// Define `var` at the function entry unless the entry already has a
    /// definition; later writes on any path still take precedence
    pub fn seed_at_entry(&mut self, var: VariableId, value: ValueId) {
        let Some(entry) = self.program.function(self.current.function).map(|f| f.entry) else {
            return;
        };
        if !self.program.has_local_definition(var, entry) {
            let value = self.program.graph.resolve(value);
            self.program.write_variable(var, entry, value);
        }
    }

    pub fn is_member_placeholder(&self, value: ValueId) -> bool {
        matches!(
            self.program.graph.get(value).map(|v| &v.kind),
            Some(ValueKind::Undefined(UndefinedKind::Member { .. }))
        )
    }

    // ═══════════════════════════════════════════════════════════════════
    // Jump targets
    // ═══════════════════════════════════════════════════════════════════

    pub fn push_target(&mut self, target: JumpTarget) {
        self.current.jump_targets.push(target);
    }

    pub fn pop_target(&mut self) {
        self.current.jump_targets.pop();
    }

    /// Innermost loop or switch, or the first target carrying `label`
    pub fn break_target(&self, label: Option<&str>) -> Option<BlockId> {
        self.current
            .jump_targets
            .iter()
            .rev()
            .find(|t| match label {
                Some(label) => t.label.as_deref() == Some(label),
                None => matches!(t.kind, JumpKind::Loop | JumpKind::Switch),
            })
            .map(|t| t.break_to)
    }

    /// Innermost loop, matching `label` when given
    pub fn continue_target(&self, label: Option<&str>) -> Option<BlockId> {
        self.current
            .jump_targets
            .iter()
            .rev()
            .filter(|t| t.kind == JumpKind::Loop)
            .find(|t| label.map_or(true, |l| t.label.as_deref() == Some(l)))
            .and_then(|t| t.continue_to)
    }

    pub fn take_pending_label(&mut self) -> Option<String> {
        self.current.pending_label.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_restores_insertion_point() {
        let mut cursor = SsaCursor::new("main");
        let main = cursor.function();
        let block = cursor.new_block("next");
        cursor.set_block(block);

        let inner = cursor.program.create_function("f", Some(main), Some(cursor.scope()), Span::zero());
        cursor.push_function(inner);
        assert_eq!(cursor.function(), inner);
        assert_eq!(cursor.depth(), 1);

        cursor.pop_function();
        assert_eq!(cursor.function(), main);
        assert_eq!(cursor.current_block(), block);
        cursor.pop_function();
        assert_eq!(cursor.function(), main);
    }

    #[test]
    fn test_block_scope_hides_local_after_pop() {
        let mut cursor = SsaCursor::new("main");
        cursor.push_scope();
        let inner = cursor.declare_local("t");
        assert_eq!(cursor.lookup("t"), Some(inner));
        cursor.pop_scope();
        assert_eq!(cursor.lookup("t"), None);
    }

    #[test]
    fn test_hoisted_declaration_escapes_block() {
        let mut cursor = SsaCursor::new("main");
        cursor.push_scope();
        let var = cursor.declare_hoisted("v");
        cursor.pop_scope();
        assert_eq!(cursor.lookup("v"), Some(var));
    }

    #[test]
    fn test_undeclared_read_is_implicit_global() {
        let mut cursor = SsaCursor::new("main");
        let value = cursor.read("console");
        let v = cursor.program.graph.get(value).unwrap();
        assert!(v.is_undefined());
        assert_eq!(v.name.as_deref(), Some("console"));
        assert_eq!(cursor.read("console"), value);
    }

    #[test]
    fn test_captured_write_records_side_effect() {
        let mut cursor = SsaCursor::new("main");
        let main = cursor.function();
        let x = cursor.declare_local("x");
        let inner = cursor.program.create_function("f", Some(main), Some(cursor.scope()), Span::zero());
        cursor.push_function(inner);
        let two = cursor.constant(ConstValue::Number(2.0), Span::zero());
        cursor.assign(x, two);
        cursor.pop_function();

        let effects = &cursor.program.function(inner).unwrap().side_effects;
        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].variable, x);
        assert_eq!(effects[0].value, two);
    }

    #[test]
    fn test_break_and_continue_resolution() {
        let mut cursor = SsaCursor::new("main");
        let (exit, latch, sw_exit, label_exit) = (
            cursor.new_block("exit"),
            cursor.new_block("latch"),
            cursor.new_block("sw"),
            cursor.new_block("label"),
        );
        cursor.push_target(JumpTarget {
            label: Some("outer".into()),
            break_to: exit,
            continue_to: Some(latch),
            kind: JumpKind::Loop,
        });
        cursor.push_target(JumpTarget {
            label: Some("blk".into()),
            break_to: label_exit,
            continue_to: None,
            kind: JumpKind::Label,
        });
        cursor.push_target(JumpTarget {
            label: None,
            break_to: sw_exit,
            continue_to: None,
            kind: JumpKind::Switch,
        });

        assert_eq!(cursor.break_target(None), Some(sw_exit));
        assert_eq!(cursor.break_target(Some("blk")), Some(label_exit));
        assert_eq!(cursor.break_target(Some("outer")), Some(exit));
        assert_eq!(cursor.continue_target(None), Some(latch));
        assert_eq!(cursor.continue_target(Some("blk")), None);
    }
}
