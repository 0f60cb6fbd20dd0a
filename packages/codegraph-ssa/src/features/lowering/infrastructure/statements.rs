//! Statement visitor
//!
//! Every statement list is hoisted first (functions, classes, interfaces,
//! enums, `var` names, imports, type aliases), then visited in order until
//! the unit stops or the current block is terminated.

use std::cell::Cell;
use std::rc::Rc;

use crate::features::lowering::domain::{ExportBinding, DEFAULT_EXPORT};
use crate::features::ssa::domain::{ExtractField, UndefinedKind, ValueId, ValueKind};
use crate::features::ssa::infrastructure::{
    IfBuilder, LabelBuilder, LoopBuilder, SwitchBuilder, TryBuilder, ValueFn,
};
use crate::features::syntax::domain::ast::{
    DeclarationKind, ExportDecl, Expr, ForInLeft, ForInStmt, ForInit, ForStmt, IfStmt, ImportDecl,
    IterationKind, Modifiers, Stmt, StmtKind, SwitchStmt, TryStmt, TypeAliasDecl,
};
use crate::features::syntax::domain::operators::UnaryOperator;
use crate::features::type_resolution::{Type, TypeLookup};
use crate::shared::models::{DiagnosticTag, Span};

use super::builder::UnitBuilder;
use super::declarations::BindKind;
use super::patterns::binding_names;

impl<'a> UnitBuilder<'a> {
    pub(crate) fn visit_statements(&mut self, stmts: &'a [Stmt]) {
        self.hoist_declarations(stmts);
        for stmt in stmts {
            if self.is_stopped() || self.cursor.is_block_finished() {
                break;
            }
            self.visit_statement(stmt);
        }
    }

    /// Body of a compound statement; blocks get their own scope
    pub(crate) fn visit_body(&mut self, stmt: &'a Stmt) {
        match &stmt.kind {
            StmtKind::Block(stmts) => self.visit_block(stmts),
            _ => self.visit_statements(std::slice::from_ref(stmt)),
        }
    }

    fn visit_block(&mut self, stmts: &'a [Stmt]) {
        self.cursor.push_scope();
        self.visit_statements(stmts);
        self.cursor.pop_scope();
    }

    pub(crate) fn visit_statement(&mut self, stmt: &'a Stmt) {
        if self.is_stopped() {
            return;
        }
        let range = stmt.range;
        match &stmt.kind {
            StmtKind::Expression(expr) => {
                self.visit_expr(expr);
            }
            StmtKind::Variable(decl) => self.visit_variable_declaration(decl),
            // bound while hoisting
            StmtKind::Function(_) | StmtKind::Import(_) | StmtKind::TypeAlias(_) => {}
            StmtKind::Class(decl) => self.visit_class_declaration(decl),
            StmtKind::Interface(decl) => self.visit_interface(decl),
            StmtKind::Enum(decl) => self.visit_enum(decl),
            StmtKind::Export(decl) => self.visit_export(decl, range),
            StmtKind::Block(stmts) => self.visit_block(stmts),
            StmtKind::If(stmt) => self.visit_if(stmt),
            StmtKind::For(stmt) => self.visit_for(stmt, range),
            StmtKind::ForIn(stmt) => self.visit_for_in(stmt, range),
            StmtKind::While { cond, body } => {
                LoopBuilder::new(range)
                    .set_condition(Box::new(move |b: &mut Self| b.visit_expr(cond)))
                    .set_body(Box::new(move |b: &mut Self| b.visit_body(body)))
                    .build(self);
            }
            StmtKind::DoWhile { body, cond } => self.visit_do_while(body, cond, range),
            StmtKind::Return(arg) => {
                let results = match arg {
                    Some(expr) => vec![self.visit_expr(expr)],
                    None => Vec::new(),
                };
                self.emit_return(results, range);
            }
            StmtKind::Break(label) => self.emit_break(label.as_deref(), range),
            StmtKind::Continue(label) => self.emit_continue(label.as_deref(), range),
            StmtKind::Labeled { label, body } => self.visit_labeled(label, body, range),
            StmtKind::Switch(stmt) => self.visit_switch(stmt, range),
            StmtKind::Try(stmt) => self.visit_try(stmt),
            // the thrown value leaves the function like a returned one
            StmtKind::Throw(expr) => {
                let thrown = self.visit_expr(expr);
                self.emit_return(vec![thrown], range);
            }
            StmtKind::Empty | StmtKind::Debugger => {}
            StmtKind::With { object, body } => {
                self.warn(
                    DiagnosticTag::NotFullyImplemented,
                    "`with` scopes are not modelled",
                    range,
                );
                self.visit_expr(object);
                self.visit_body(body);
            }
            StmtKind::Unsupported(kind) => {
                self.error(
                    DiagnosticTag::UnhandledStatement,
                    format!("unhandled statement `{}`", kind),
                    range,
                );
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Hoisting
    // ═══════════════════════════════════════════════════════════════════

    fn hoist_declarations(&mut self, stmts: &'a [Stmt]) {
        for stmt in stmts {
            match &stmt.kind {
                StmtKind::Function(decl) => self.hoist_function(decl),
                StmtKind::Class(decl) => self.hoist_class(decl),
                StmtKind::Interface(decl) => self.hoist_interface(decl),
                StmtKind::Enum(decl) => self.hoist_enum(decl),
                StmtKind::Variable(decl) if decl.kind == DeclarationKind::Var => {
                    for declarator in &decl.declarators {
                        let mut names = Vec::new();
                        if let Some(target) = &declarator.target {
                            binding_names(target, &mut names);
                        }
                        for name in names {
                            self.cursor.declare_hoisted(name);
                        }
                    }
                }
                StmtKind::Import(decl) => self.visit_import(decl),
                StmtKind::TypeAlias(alias) => self.register_type_alias(alias),
                _ => {}
            }
        }
    }

    fn register_type_alias(&mut self, alias: &'a TypeAliasDecl) {
        let ty = self.elaborate(&alias.ty).with_name(alias.name.clone());
        if alias.modifiers.export {
            self.exports.export_type(alias.name.clone(), ty.clone());
        }
        if alias.modifiers.default_export {
            self.exports.export_type(DEFAULT_EXPORT, ty.clone());
        }
        self.type_aliases.insert(alias.name.clone(), ty);
    }

    // ═══════════════════════════════════════════════════════════════════
    // Imports and exports
    // ═══════════════════════════════════════════════════════════════════

    fn visit_import(&mut self, decl: &'a ImportDecl) {
        if decl.type_only {
            return;
        }
        let locals = decl
            .default
            .iter()
            .chain(decl.namespace.iter())
            .chain(decl.named.iter().filter(|s| !s.type_only).map(|s| &s.local));
        for local in locals {
            let placeholder = self.cursor.undefined_typed(
                UndefinedKind::Import {
                    module: decl.source.clone(),
                },
                local,
                None,
                decl.range,
            );
            let var = self.cursor.declare_hoisted(local);
            self.cursor.assign(var, placeholder);
        }
    }

    fn visit_export(&mut self, decl: &'a ExportDecl, range: Span) {
        match decl {
            ExportDecl::Named {
                specifiers,
                source,
                type_only,
            } => {
                for spec in specifiers {
                    if let Some(ty) = self.types().lookup_type(&spec.local) {
                        self.exports.export_type(spec.exported.clone(), ty);
                    }
                    if *type_only {
                        continue;
                    }
                    let binding = match source {
                        Some(module) => ExportBinding::Value(self.cursor.undefined_typed(
                            UndefinedKind::Import {
                                module: module.clone(),
                            },
                            &spec.local,
                            None,
                            range,
                        )),
                        None => match self.cursor.lookup(&spec.local) {
                            Some(var) => ExportBinding::Variable(var),
                            None => ExportBinding::Value(self.cursor.read(&spec.local)),
                        },
                    };
                    self.exports.export_value(spec.exported.clone(), binding);
                }
            }
            ExportDecl::Default(expr) => {
                let value = self.visit_expr(expr);
                if let Some(ty) = self
                    .cursor
                    .ty(value)
                    .and_then(Type::blueprint_ref)
                    .and_then(|(id, _)| self.blueprints.get(id))
                    .map(|bp| bp.instance_type())
                {
                    self.exports.export_type(DEFAULT_EXPORT, ty);
                }
                self.exports
                    .export_value(DEFAULT_EXPORT, ExportBinding::Value(value));
            }
            ExportDecl::Assignment(expr) => {
                let value = self.visit_expr(expr);
                self.exports.cjs_export = Some(value);
            }
            ExportDecl::All { source, alias } => {
                if let Some(alias) = alias {
                    let namespace = self.cursor.undefined_typed(
                        UndefinedKind::Import {
                            module: source.clone(),
                        },
                        alias,
                        None,
                        range,
                    );
                    self.exports
                        .export_value(alias.clone(), ExportBinding::Value(namespace));
                }
            }
        }
    }

    /// Record `name` under the export names its modifiers ask for
    pub(crate) fn export_binding(&mut self, name: &str, binding: ExportBinding, modifiers: Modifiers) {
        if modifiers.export && !modifiers.default_export {
            self.exports.export_value(name, binding);
        }
        if modifiers.default_export {
            self.exports.export_value(DEFAULT_EXPORT, binding);
        }
    }

    pub(crate) fn export_type_binding(&mut self, name: &str, ty: Type, modifiers: Modifiers) {
        if modifiers.export && !modifiers.default_export {
            self.exports.export_type(name, ty.clone());
        }
        if modifiers.default_export {
            self.exports.export_type(DEFAULT_EXPORT, ty);
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Control flow
    // ═══════════════════════════════════════════════════════════════════

    /// `if / else if / else` chains become one builder
    fn visit_if(&mut self, stmt: &'a IfStmt) {
        let mut builder = IfBuilder::new();
        let mut current = stmt;
        loop {
            let cond = &current.cond;
            let consequent: &'a Stmt = &current.consequent;
            builder = builder.append_item(
                Box::new(move |b: &mut Self| b.visit_expr(cond)),
                Box::new(move |b: &mut Self| b.visit_body(consequent)),
            );
            match current.alternate.as_deref() {
                Some(Stmt {
                    kind: StmtKind::If(next),
                    ..
                }) => current = next,
                Some(alternate) => {
                    builder = builder.set_else(Box::new(move |b: &mut Self| b.visit_body(alternate)));
                    break;
                }
                None => break,
            }
        }
        builder.build(self);
    }

    fn visit_for(&mut self, stmt: &'a ForStmt, range: Span) {
        let mut builder = LoopBuilder::new(range);
        if let Some(init) = &stmt.init {
            builder = builder.set_first(Box::new(move |b: &mut Self| match init {
                ForInit::Declaration(decl) => b.visit_variable_declaration(decl),
                ForInit::Expression(expr) => {
                    b.visit_expr(expr);
                }
            }));
        }
        if let Some(cond) = &stmt.cond {
            builder = builder.set_condition(Box::new(move |b: &mut Self| b.visit_expr(cond)));
        }
        if let Some(update) = &stmt.update {
            builder = builder.set_third(Box::new(move |b: &mut Self| {
                b.visit_expr(update);
            }));
        }
        let body: &'a Stmt = &stmt.body;
        builder
            .set_body(Box::new(move |b: &mut Self| b.visit_body(body)))
            .build(self);
    }

    /// Header runs one `Next` step; its `ok` extract is the condition
    fn visit_for_in(&mut self, stmt: &'a ForInStmt, range: Span) {
        let iterable = self.visit_expr(&stmt.right);
        let in_keys = stmt.iteration == IterationKind::In;
        let step: Rc<Cell<Option<ValueId>>> = Rc::new(Cell::new(None));
        let header_step = Rc::clone(&step);

        LoopBuilder::new(range)
            .set_condition(Box::new(move |b: &mut Self| {
                let next = b.cursor.emit(ValueKind::Next { iterable, in_keys }, range);
                header_step.set(Some(next));
                b.cursor.emit_typed(
                    ValueKind::Extract {
                        tuple: next,
                        field: ExtractField::Ok,
                    },
                    Some(Type::boolean()),
                    range,
                )
            }))
            .set_body(Box::new(move |b: &mut Self| {
                if let Some(next) = step.get() {
                    let (field, ty) = if in_keys {
                        (ExtractField::Key, Some(Type::string()))
                    } else {
                        (ExtractField::Value, b.cursor.ty(iterable).map(Type::element))
                    };
                    let item = b.cursor.emit_typed(
                        ValueKind::Extract { tuple: next, field },
                        ty,
                        range,
                    );
                    match &stmt.left {
                        ForInLeft::Declaration { kind, target } => {
                            b.bind_target(target, item, BindKind::from_declaration(kind), Modifiers::default());
                        }
                        ForInLeft::Expression(expr) => {
                            let target = b.visit_lvalue(expr);
                            b.write_lvalue(target, item, range);
                        }
                    }
                }
                b.visit_body(&stmt.body);
            }))
            .build(self);
    }

    /// Loop with a `true` header whose body ends in `if (!cond) break`
    fn visit_do_while(&mut self, body: &'a Stmt, cond: &'a Expr, range: Span) {
        LoopBuilder::new(range)
            .set_body(Box::new(move |b: &mut Self| {
                b.visit_body(body);
                if b.is_stopped() || b.cursor.is_block_finished() {
                    return;
                }
                IfBuilder::new()
                    .append_item(
                        Box::new(move |b: &mut Self| {
                            let value = b.visit_expr(cond);
                            b.emit_unary(UnaryOperator::Not, value, cond.range)
                        }),
                        Box::new(move |b: &mut Self| b.emit_break(None, range)),
                    )
                    .build(b);
            }))
            .build(self);
    }

    pub(crate) fn emit_break(&mut self, label: Option<&str>, range: Span) {
        match self.cursor.break_target(label) {
            Some(target) => self.cursor.jump(target),
            None => {
                let message = match label {
                    Some(label) => format!("`break {}` has no enclosing label", label),
                    None => "`break` outside of a loop or switch".to_string(),
                };
                self.error(DiagnosticTag::UnexpectedBreak, message, range);
            }
        }
    }

    fn emit_continue(&mut self, label: Option<&str>, range: Span) {
        match self.cursor.continue_target(label) {
            Some(target) => self.cursor.jump(target),
            None => {
                let message = match label {
                    Some(label) => format!("`continue {}` does not name a loop", label),
                    None => "`continue` outside of a loop".to_string(),
                };
                self.error(DiagnosticTag::UnexpectedContinue, message, range);
            }
        }
    }

    fn visit_labeled(&mut self, label: &str, body: &'a Stmt, range: Span) {
        if label.is_empty() {
            self.error(DiagnosticTag::EmptyLabel, "label has no name", range);
            self.visit_body(body);
            return;
        }
        let names_iteration = matches!(
            body.kind,
            StmtKind::For(_)
                | StmtKind::ForIn(_)
                | StmtKind::While { .. }
                | StmtKind::DoWhile { .. }
                | StmtKind::Switch(_)
        );
        LabelBuilder::new(label, Box::new(move |b: &mut Self| b.visit_body(body)))
            .names_iteration(names_iteration)
            .build(self);
    }

    fn visit_switch(&mut self, stmt: &'a SwitchStmt, range: Span) {
        let discriminant = &stmt.discriminant;
        let mut builder = SwitchBuilder::new(
            Box::new(move |b: &mut Self| b.visit_expr(discriminant)),
            range,
        );
        for case in &stmt.cases {
            let test = case
                .test
                .as_ref()
                .map(|test| Box::new(move |b: &mut Self| b.visit_expr(test)) as ValueFn<'a, Self>);
            let body: &'a [Stmt] = &case.body;
            builder = builder.add_case(test, Box::new(move |b: &mut Self| b.visit_statements(body)));
        }
        self.cursor.push_scope();
        builder.build(self);
        self.cursor.pop_scope();
    }

    fn visit_try(&mut self, stmt: &'a TryStmt) {
        let block: &'a [Stmt] = &stmt.block;
        let mut builder = TryBuilder::new(Box::new(move |b: &mut Self| b.visit_statements(block)));
        if let Some(handler) = &stmt.handler {
            builder = builder.set_catch(Box::new(move |b: &mut Self| {
                if let Some(param) = &handler.param {
                    let name = param.as_identifier().unwrap_or("error");
                    let error = b.cursor.undefined_typed(
                        UndefinedKind::CaughtError,
                        name,
                        None,
                        handler.range,
                    );
                    b.bind_target(param, error, BindKind::Local, Modifiers::default());
                }
                b.visit_statements(&handler.body);
            }));
        }
        if let Some(finalizer) = &stmt.finalizer {
            let finalizer: &'a [Stmt] = finalizer;
            builder = builder.set_finally(Box::new(move |b: &mut Self| b.visit_statements(finalizer)));
        }
        builder.build(self);
    }
}

#[cfg(test)]
mod tests {
    use crate::config::BuildOptions;
    use crate::features::lowering::infrastructure::builder::UnitBuilder;
    use crate::features::ssa::infrastructure::render_value;
    use crate::features::syntax::domain::ast::*;
    use crate::features::syntax::domain::operators::BinaryOperator;
    use crate::shared::models::{DiagnosticTag, Span};

    fn lower(body: Vec<Stmt>) -> crate::features::lowering::infrastructure::builder::LoweredUnit {
        let program: &'static Program = Box::leak(Box::new(Program {
            body,
            range: Span::zero(),
        }));
        let mut builder = UnitBuilder::new("main", BuildOptions::default());
        builder.lower_program(program);
        builder.finish()
    }

    fn let_(name: &str, init: Expr) -> Stmt {
        Stmt::declare(DeclarationKind::Let, name, Some(init))
    }

    #[test]
    fn test_break_outside_loop_is_reported() {
        let unit = lower(vec![Stmt::new(StmtKind::Break(None), Span::zero())]);
        assert!(unit
            .diagnostics
            .iter()
            .any(|d| d.tag == DiagnosticTag::UnexpectedBreak));
    }

    #[test]
    fn test_statements_after_return_are_skipped() {
        let unit = lower(vec![
            Stmt::new(StmtKind::Return(None), Span::zero()),
            Stmt::expr(Expr::call(Expr::ident("late"), vec![])),
        ]);
        let late_calls = unit
            .program
            .graph
            .iter()
            .filter(|(_, v)| v.name.as_deref() == Some("late"))
            .count();
        assert_eq!(late_calls, 0);
    }

    #[test]
    fn test_throwing_branch_does_not_reach_join() {
        // let x = 1; if (c) { x = 2; throw fail(); late(); } export { x }
        let body = vec![
            let_("x", Expr::number("1")),
            Stmt::new(
                StmtKind::If(IfStmt {
                    cond: Expr::ident("c"),
                    consequent: Box::new(Stmt::new(
                        StmtKind::Block(vec![
                            Stmt::expr(Expr::assign(Expr::ident("x"), Expr::number("2"))),
                            Stmt::new(
                                StmtKind::Throw(Expr::call(Expr::ident("fail"), vec![])),
                                Span::zero(),
                            ),
                            Stmt::expr(Expr::call(Expr::ident("late"), vec![])),
                        ]),
                        Span::zero(),
                    )),
                    alternate: None,
                }),
                Span::zero(),
            ),
            Stmt::new(
                StmtKind::Export(ExportDecl::Named {
                    specifiers: vec![ExportSpecifier {
                        local: "x".into(),
                        exported: "x".into(),
                    }],
                    source: None,
                    type_only: false,
                }),
                Span::zero(),
            ),
        ];
        let unit = lower(body);
        let x = unit.exports.value("x").unwrap();
        assert_eq!(render_value(&unit.program, x), "1");
        let late_calls = unit
            .program
            .graph
            .iter()
            .filter(|(_, v)| v.name.as_deref() == Some("late"))
            .count();
        assert_eq!(late_calls, 0);
    }

    #[test]
    fn test_while_loop_variable_becomes_header_phi() {
        // let i = 0; while (i < 3) { i = i + 1; } export { i }
        let body = vec![
            let_("i", Expr::number("0")),
            Stmt::new(
                StmtKind::While {
                    cond: Expr::binary(BinaryOperator::Lt, Expr::ident("i"), Expr::number("3")),
                    body: Box::new(Stmt::new(
                        StmtKind::Block(vec![Stmt::expr(Expr::assign(
                            Expr::ident("i"),
                            Expr::binary(BinaryOperator::Add, Expr::ident("i"), Expr::number("1")),
                        ))]),
                        Span::zero(),
                    )),
                },
                Span::zero(),
            ),
            Stmt::new(
                StmtKind::Export(ExportDecl::Named {
                    specifiers: vec![ExportSpecifier {
                        local: "i".into(),
                        exported: "i".into(),
                    }],
                    source: None,
                    type_only: false,
                }),
                Span::zero(),
            ),
        ];
        let unit = lower(body);
        let i = unit.exports.value("i").unwrap();
        assert_eq!(render_value(&unit.program, i), "phi(i)[0,add(i, 1)]");
    }

    #[test]
    fn test_unsupported_statement_is_an_error() {
        let unit = lower(vec![Stmt::new(
            StmtKind::Unsupported("using_declaration".into()),
            Span::zero(),
        )]);
        assert_eq!(unit.diagnostics.len(), 1);
        assert_eq!(unit.diagnostics[0].tag, DiagnosticTag::UnhandledStatement);
    }
}
