/*
 * Unit Builder
 *
 * Driver for one compilation unit. Owns:
 * - the SSA cursor (program + function build contexts)
 * - the blueprint table and the deferred builder queue
 * - export bookkeeping, type aliases, diagnostics and the stop flag
 *
 * The statement, declaration, pattern, expression, call and class visitors
 * are further `impl UnitBuilder` blocks in sibling files.
 *
 * Lazy bodies:
 * - functions and methods file their body under `Owner::Function`
 * - blueprint members file initializers, static blocks and parent links
 *   under `Owner::Blueprint` and run inside a per-blueprint initializer
 *   function
 * Both are forced on first use and drained at end-of-unit.
 */

use ahash::AHashMap as HashMap;
use rustc_hash::FxHashMap;

use crate::config::BuildOptions;
use crate::features::blueprint::{
    BlueprintState, BlueprintTable, DeferredQueue, DeferredTask, Owner,
};
use crate::features::lowering::domain::{ExportTable, UnitContext};
use crate::features::ssa::domain::{BlockId, BlueprintId, FunctionId, Terminator, ValueId, ValueKind};
use crate::features::ssa::infrastructure::{Program, SsaCursor};
use crate::features::ssa::ports::CfgEmitter;
use crate::features::syntax::domain::ast::{self, ExprKind, StmtKind, TypeNode};
use crate::features::type_resolution::{
    create_type_by_name, elaborate, merge_type_with_annotation, Type, TypeLookup,
};
use crate::shared::models::{Diagnostic, DiagnosticTag, Severity, Span};

/// Named types visible to the elaborator: aliases first, then blueprints
pub struct UnitTypes<'t> {
    blueprints: &'t BlueprintTable,
    aliases: &'t HashMap<String, Type>,
}

impl TypeLookup for UnitTypes<'_> {
    fn lookup_type(&self, name: &str) -> Option<Type> {
        self.aliases
            .get(name)
            .cloned()
            .or_else(|| self.blueprints.lookup_type(name))
    }
}

/// Everything a finished unit hands to its caller
pub struct LoweredUnit {
    pub program: Program,
    pub blueprints: BlueprintTable,
    pub exports: ExportTable,
    pub diagnostics: Vec<Diagnostic>,
    pub stopped: bool,
}

pub struct UnitBuilder<'a> {
    pub(crate) cursor: SsaCursor,
    pub(crate) blueprints: BlueprintTable,
    pub(crate) deferred: DeferredQueue<'a, UnitBuilder<'a>>,
    pub(crate) exports: UnitContext,
    pub(crate) type_aliases: HashMap<String, Type>,
    pub(crate) options: BuildOptions,
    /// Argument types handed to a callback before its body is built
    pub(crate) param_hints: FxHashMap<FunctionId, Vec<Type>>,
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    stopped: bool,
    /// Block where each blueprint initializer function left off
    init_blocks: FxHashMap<FunctionId, BlockId>,
}

impl CfgEmitter for UnitBuilder<'_> {
    fn cursor(&mut self) -> &mut SsaCursor {
        &mut self.cursor
    }
}

impl<'a> UnitBuilder<'a> {
    pub fn new(module_name: &str, options: BuildOptions) -> Self {
        let mut cursor = SsaCursor::new(module_name);
        cursor.strict = options.strict_mode;
        Self {
            cursor,
            blueprints: BlueprintTable::new(options.max_inheritance_depth),
            deferred: DeferredQueue::new(),
            exports: UnitContext::new(),
            type_aliases: HashMap::new(),
            options,
            param_hints: FxHashMap::default(),
            diagnostics: Vec::new(),
            error_count: 0,
            stopped: false,
            init_blocks: FxHashMap::default(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Unit driver
    // ═══════════════════════════════════════════════════════════════════

    /// Lower a whole module body
    pub fn lower_program(&mut self, program: &'a ast::Program) {
        tracing::info!(
            statements = program.body.len(),
            strict = self.cursor.strict,
            "Lowering unit"
        );

        if starts_with_use_strict(&program.body) {
            self.cursor.strict = true;
        }
        self.visit_statements(&program.body);

        if !self.cursor.is_block_finished() {
            self.emit_return(Vec::new(), program.range);
        }
        if self.options.drain_at_end {
            self.drain_deferred();
        }
        self.close_initializers();

        tracing::info!(
            values = self.cursor.program.graph.len(),
            functions = self.cursor.program.functions.len(),
            blueprints = self.blueprints.len(),
            diagnostics = self.diagnostics.len(),
            "Lowered unit"
        );
    }

    /// Resolve exports against the module's final block and hand out the parts
    pub fn finish(self) -> LoweredUnit {
        let Self {
            mut cursor,
            blueprints,
            exports,
            diagnostics,
            stopped,
            ..
        } = self;
        let block = cursor.current_block();
        let program = &mut cursor.program;
        let exports = exports.resolve(|var| program.read_variable(var, block));
        LoweredUnit {
            program: cursor.into_program(),
            blueprints,
            exports,
            diagnostics,
            stopped,
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Diagnostics
    // ═══════════════════════════════════════════════════════════════════

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub(crate) fn report(&mut self, diagnostic: Diagnostic) {
        let is_error = diagnostic.is_error();
        self.diagnostics.push(diagnostic);
        if !is_error {
            return;
        }
        self.error_count += 1;
        let limit = self.options.max_errors;
        if limit > 0 && self.error_count >= limit && !self.stopped {
            self.stopped = true;
            tracing::warn!(errors = self.error_count, limit, "Error limit reached, stopping unit");
            self.diagnostics.push(Diagnostic::info(
                DiagnosticTag::StopRequested,
                format!("stopped after {} errors", self.error_count),
                Span::zero(),
            ));
        }
    }

    pub(crate) fn error(&mut self, tag: DiagnosticTag, message: impl Into<String>, range: Span) {
        self.report(Diagnostic::new(Severity::Error, tag, message, range));
    }

    pub(crate) fn warn(&mut self, tag: DiagnosticTag, message: impl Into<String>, range: Span) {
        self.report(Diagnostic::new(Severity::Warn, tag, message, range));
    }

    // ═══════════════════════════════════════════════════════════════════
    // Types
    // ═══════════════════════════════════════════════════════════════════

    pub(crate) fn types(&self) -> UnitTypes<'_> {
        UnitTypes {
            blueprints: &self.blueprints,
            aliases: &self.type_aliases,
        }
    }

    pub(crate) fn elaborate(&self, node: &TypeNode) -> Type {
        elaborate(node, &self.types())
    }

    pub(crate) fn type_by_name(&self, name: &str) -> Type {
        create_type_by_name(name, &self.types())
    }

    /// Merge an annotation into an inferred type, warning on disagreement
    pub(crate) fn merge_annotation(
        &mut self,
        inferred: Option<&Type>,
        explicit: Option<&Type>,
        range: Span,
    ) -> Option<Type> {
        let merged = merge_type_with_annotation(inferred, explicit);
        if let Some((explicit, inferred)) = merged.mismatch {
            self.warn(
                DiagnosticTag::TypeMismatch,
                format!("declared type `{}` does not match inferred `{}`", explicit, inferred),
                range,
            );
        }
        merged.ty
    }

    /// Refine the type of `value`; interned constants keep theirs
    pub(crate) fn refine_type(&mut self, value: ValueId, ty: Option<Type>) {
        let is_const = matches!(
            self.cursor.program.graph.get(value).map(|v| &v.kind),
            Some(ValueKind::Const(_))
        );
        if !is_const && ty.is_some() {
            self.cursor.set_type(value, ty);
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Emission helpers
    // ═══════════════════════════════════════════════════════════════════

    /// End the current block with a return
    pub(crate) fn emit_return(&mut self, results: Vec<ValueId>, range: Span) {
        if self.cursor.is_block_finished() {
            return;
        }
        let ty = results.first().and_then(|&v| self.cursor.ty(v).cloned());
        let ret = self
            .cursor
            .emit_typed(ValueKind::Return { results }, ty, range);
        let function = self.cursor.function();
        if let Some(f) = self.cursor.program.function_mut(function) {
            f.returns.push(ret);
        }
        self.cursor.terminate(Terminator::Return(ret));
    }

    // ═══════════════════════════════════════════════════════════════════
    // Deferred builders
    // ═══════════════════════════════════════════════════════════════════

    pub(crate) fn defer_function(&mut self, function: FunctionId, task: DeferredTask<'a, UnitBuilder<'a>>) {
        self.deferred.push(Owner::Function(function), task);
    }

    pub(crate) fn defer_blueprint(&mut self, blueprint: BlueprintId, task: DeferredTask<'a, UnitBuilder<'a>>) {
        self.deferred.push(Owner::Blueprint(blueprint), task);
    }

    /// Build a function body now if it is still pending
    pub(crate) fn ensure_function_built(&mut self, function: FunctionId) {
        let tasks = self.deferred.take(Owner::Function(function));
        for task in tasks {
            task(self);
        }
    }

    /// Run a blueprint's pending member builders
    pub(crate) fn ensure_blueprint_built(&mut self, blueprint: BlueprintId) {
        let tasks = self.deferred.take(Owner::Blueprint(blueprint));
        self.run_blueprint_tasks(blueprint, tasks);
    }

    fn run_blueprint_tasks(&mut self, blueprint: BlueprintId, tasks: Vec<DeferredTask<'a, UnitBuilder<'a>>>) {
        if !tasks.is_empty() {
            #[cfg(feature = "trace")]
            tracing::trace!(blueprint = %blueprint, tasks = tasks.len(), "Building blueprint members");

            let init = self.blueprint_init_function(blueprint);
            self.cursor.push_function(init);
            if let Some(&block) = self.init_blocks.get(&init) {
                self.cursor.set_block(block);
            }
            self.cursor.current.this_blueprint = Some(blueprint);
            for task in tasks {
                task(self);
            }
            self.init_blocks.insert(init, self.cursor.current_block());
            self.cursor.pop_function();
        }

        if let Some(bp) = self.blueprints.get_mut(blueprint) {
            if bp.state >= BlueprintState::MembersRegistering {
                bp.advance(BlueprintState::FullyBuilt);
            }
        }
    }

    /// Function context blueprint-owned builders run in, created on demand
    fn blueprint_init_function(&mut self, blueprint: BlueprintId) -> FunctionId {
        if let Some(init) = self.blueprints.get(blueprint).and_then(|bp| bp.init_function) {
            return init;
        }
        let name = self
            .blueprints
            .get(blueprint)
            .map(|bp| format!("{}_init", bp.name))
            .unwrap_or_else(|| format!("{}_init", blueprint));
        let main = self
            .cursor
            .program
            .functions
            .first()
            .map(|f| (f.id, f.root_scope));
        let (parent, scope) = match main {
            Some((id, scope)) => (Some(id), Some(scope)),
            None => (None, None),
        };
        let init = self
            .cursor
            .program
            .create_function(&name, parent, scope, Span::zero());
        if let Some(f) = self.cursor.program.function_mut(init) {
            f.built = true;
            f.this_blueprint = Some(blueprint);
        }
        if let Some(bp) = self.blueprints.get_mut(blueprint) {
            bp.init_function = Some(init);
        }
        init
    }

    /// Run every pending builder: blueprints first, until the queue is empty
    pub fn drain_deferred(&mut self) {
        let pending = self.deferred.len();
        let mut owners = 0usize;
        while let Some((owner, tasks)) = self.deferred.pop_next() {
            owners += 1;
            match owner {
                Owner::Blueprint(blueprint) => self.run_blueprint_tasks(blueprint, tasks),
                Owner::Function(_) => {
                    for task in tasks {
                        task(self);
                    }
                }
            }
        }

        let registered: Vec<BlueprintId> = self
            .blueprints
            .iter()
            .filter(|bp| bp.state >= BlueprintState::MembersRegistering)
            .map(|bp| bp.id)
            .collect();
        for id in registered {
            if let Some(bp) = self.blueprints.get_mut(id) {
                bp.advance(BlueprintState::FullyBuilt);
            }
        }
        tracing::debug!(pending, owners, "Drained deferred builders");
    }

    /// Give every blueprint initializer a final return
    fn close_initializers(&mut self) {
        let mut open: Vec<(FunctionId, BlockId)> =
            self.init_blocks.iter().map(|(&f, &b)| (f, b)).collect();
        open.sort();
        for (init, block) in open {
            self.cursor.push_function(init);
            self.cursor.set_block(block);
            self.emit_return(Vec::new(), Span::zero());
            self.cursor.pop_function();
        }
        self.init_blocks.clear();
    }
}

/// Random tag for synthesized function names
pub(crate) fn unique_suffix() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Leading `"use strict"` directive
fn starts_with_use_strict(body: &[ast::Stmt]) -> bool {
    body.iter()
        .take_while(|stmt| {
            matches!(&stmt.kind, StmtKind::Expression(expr) if matches!(expr.kind, ExprKind::String(_)))
        })
        .any(|stmt| {
            matches!(&stmt.kind, StmtKind::Expression(expr) if matches!(&expr.kind, ExprKind::String(s) if s == "use strict"))
        })
}
