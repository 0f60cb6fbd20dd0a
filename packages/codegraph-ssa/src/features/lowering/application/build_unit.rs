/*
 * Build Unit Use Case
 *
 * Entry points of the crate:
 * - build_from_source: parse TypeScript/JavaScript, then lower
 * - build_from_ast:    lower an already-built syntax tree
 * - build_units:       independent units in parallel (rayon)
 *
 * The result is an `SsaUnit`: value graph, blueprint table, resolved exports
 * and diagnostics, queried by name or by value id.
 */

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::BuildConfig;
use crate::features::blueprint::{Blueprint, BlueprintTable};
use crate::features::lowering::domain::ExportTable;
use crate::features::lowering::infrastructure::{LoweredUnit, UnitBuilder};
use crate::features::ssa::domain::{BlockId, Function, Value, ValueId, ValueKind};
use crate::features::ssa::infrastructure::{render_value, Program};
use crate::features::syntax::domain::ast::Program as SyntaxTree;
use crate::features::syntax::parse_typescript;
use crate::features::type_resolution::Type;
use crate::shared::models::{Diagnostic, Result, Span};

/// Module name given to units built without one
pub const DEFAULT_UNIT_NAME: &str = "main";

/// A lowered compilation unit
#[derive(Debug)]
pub struct SsaUnit {
    name: String,
    program: Program,
    blueprints: BlueprintTable,
    exports: ExportTable,
    diagnostics: Vec<Diagnostic>,
    stopped: bool,
}

impl SsaUnit {
    fn from_lowered(name: &str, lowered: LoweredUnit) -> Self {
        Self {
            name: name.to_string(),
            program: lowered.program,
            blueprints: lowered.blueprints,
            exports: lowered.exports,
            diagnostics: lowered.diagnostics,
            stopped: lowered.stopped,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn blueprints(&self) -> &BlueprintTable {
        &self.blueprints
    }

    pub fn exports(&self) -> &ExportTable {
        &self.exports
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    /// Lowering hit the error limit and skipped the rest of the unit
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    // ═══════════════════════════════════════════════════════════════════
    // Exports and blueprints
    // ═══════════════════════════════════════════════════════════════════

    /// Exported value by name; `default` also answers a CommonJS export
    pub fn read_exported_value(&self, name: &str) -> Option<ValueId> {
        self.exports
            .value(name)
            .map(|value| self.program.graph.resolve(value))
    }

    pub fn read_exported_type(&self, name: &str) -> Option<&Type> {
        self.exports.ty(name)
    }

    pub fn get_blueprint(&self, name: &str) -> Option<&Blueprint> {
        self.blueprints.by_name(name)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Values
    // ═══════════════════════════════════════════════════════════════════

    /// Value behind `id`, following collapsed phis
    pub fn value(&self, id: ValueId) -> Option<&Value> {
        self.program.graph.get(id)
    }

    pub fn ty(&self, id: ValueId) -> Option<&Type> {
        self.program.graph.ty(id)
    }

    pub fn range(&self, id: ValueId) -> Option<Span> {
        self.value(id).map(Value::range)
    }

    pub fn operands(&self, id: ValueId) -> Vec<ValueId> {
        self.program.graph.operands(id)
    }

    pub fn predecessors(&self, block: BlockId) -> &[BlockId] {
        self.program.predecessors(block)
    }

    /// Stable text form: `phi(a)[1,2]`, `add(a, 1)`, `Undefined-a`
    pub fn render(&self, id: ValueId) -> String {
        render_value(&self.program, id)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Functions
    // ═══════════════════════════════════════════════════════════════════

    pub fn main_function(&self) -> Option<&Function> {
        self.program.functions.first()
    }

    pub fn functions(&self) -> &[Function] {
        &self.program.functions
    }

    /// First function whose name is `name` or starts with `name_`
    ///
    /// Synthesized names carry a uuid suffix (`A_m_9f1c2e7a40b34d6e8a5b1c0d2e3f4a5b`).
    pub fn find_function(&self, name: &str) -> Option<&Function> {
        let prefix = format!("{}_", name);
        self.program
            .functions
            .iter()
            .find(|f| f.name == name)
            .or_else(|| self.program.functions.iter().find(|f| f.name.starts_with(&prefix)))
    }

    /// Argument lists of every call whose callee displays as `callee`
    pub fn calls_to(&self, callee: &str) -> Vec<Vec<ValueId>> {
        self.program
            .graph
            .iter()
            .filter_map(|(_, value)| match &value.kind {
                ValueKind::Call { callee: target, args }
                    if self.program.display_name(self.program.graph.resolve(*target)) == callee =>
                {
                    Some(
                        args.iter()
                            .map(|&arg| self.program.graph.resolve(arg))
                            .collect(),
                    )
                }
                _ => None,
            })
            .collect()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Entry points
// ═══════════════════════════════════════════════════════════════════════════

/// Parse and lower TypeScript or JavaScript source
///
/// Only a parser failure is an `Err`; syntax errors inside the tree are
/// diagnostics on the returned unit.
pub fn build_from_source(source: &str, config: &BuildConfig) -> Result<SsaUnit> {
    build_named_source(DEFAULT_UNIT_NAME, source, config)
}

pub fn build_named_source(name: &str, source: &str, config: &BuildConfig) -> Result<SsaUnit> {
    let parsed = parse_typescript(source).map_err(|e| e.with_file(name))?;
    let mut unit = build_named(name, &parsed.program, config);
    if !parsed.syntax_errors.is_empty() {
        tracing::debug!(unit = name, errors = parsed.syntax_errors.len(), "Source has syntax errors");
        let lowering = std::mem::take(&mut unit.diagnostics);
        unit.diagnostics = parsed.syntax_errors;
        unit.diagnostics.extend(lowering);
    }
    Ok(unit)
}

/// Lower an already-built syntax tree
pub fn build_from_ast(program: &SyntaxTree, config: &BuildConfig) -> SsaUnit {
    build_named(DEFAULT_UNIT_NAME, program, config)
}

pub fn build_named(name: &str, program: &SyntaxTree, config: &BuildConfig) -> SsaUnit {
    let mut builder = UnitBuilder::new(name, config.options().clone());
    builder.lower_program(program);
    let unit = SsaUnit::from_lowered(name, builder.finish());

    tracing::info!(
        unit = name,
        values = unit.program.graph.len(),
        blueprints = unit.blueprints.len(),
        errors = unit.errors().count(),
        stopped = unit.stopped,
        "Built SSA unit"
    );
    unit
}

/// Build independent `(name, source)` units in parallel
///
/// Each unit owns its graph; results keep the input order.
#[cfg(feature = "parallel")]
pub fn build_units(sources: &[(String, String)], config: &BuildConfig) -> Vec<Result<SsaUnit>> {
    tracing::info!(units = sources.len(), "Building units in parallel");
    sources
        .par_iter()
        .map(|(name, source)| build_named_source(name, source, config))
        .collect()
}
