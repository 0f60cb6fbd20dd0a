//! Calls, promise chaining and `new`
//!
//! A call forces the callee's lazy body first so its parameter count,
//! return type and captured writes are known at the call site.

use crate::features::blueprint::BlueprintKind;
use crate::features::ssa::domain::{FunctionId, UndefinedKind, ValueId, ValueKind};
use crate::features::syntax::domain::ast::{Argument, Expr, ExprKind};
use crate::features::type_resolution::{is_builtin_object, Type};
use crate::shared::models::{DiagnosticTag, Span};

use super::builder::UnitBuilder;

/// Globals whose `new` yields a builtin-typed object rather than a blueprint
const BUILTIN_CONSTRUCTORS: &[&str] = &["Array", "Map", "Set", "WeakMap", "WeakSet", "Promise"];

impl<'a> UnitBuilder<'a> {
    pub(crate) fn visit_call(&mut self, callee: &'a Expr, args: &'a [Argument], range: Span) -> ValueId {
        let callee = callee.unwrap_transparent();
        match &callee.kind {
            ExprKind::Member {
                object, property, ..
            } => {
                let receiver = self.visit_expr(object);
                if self.is_promise_value(receiver)
                    && matches!(property.as_str(), "then" | "catch" | "finally")
                {
                    return self.visit_promise_method(receiver, property, args, range);
                }
                let method = self.read_member(receiver, property, callee.range);
                let args = self.visit_arguments(args);
                self.emit_call(method, Some(receiver), args, range)
            }
            ExprKind::Index { object, index, .. } => {
                let receiver = self.visit_expr(object);
                let key = self.member_key(index);
                let method = self.read_member(receiver, &key, callee.range);
                let args = self.visit_arguments(args);
                self.emit_call(method, Some(receiver), args, range)
            }
            ExprKind::Super => self.visit_super_call(args, range),
            _ => {
                let function = self.visit_expr(callee);
                let args = self.visit_arguments(args);
                self.emit_call(function, None, args, range)
            }
        }
    }

    fn visit_arguments(&mut self, args: &'a [Argument]) -> Vec<ValueId> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            let value = self.visit_expr(&arg.expr);
            if arg.spread {
                self.warn(
                    DiagnosticTag::NotFullyImplemented,
                    "spread argument passed as a single value",
                    arg.expr.range,
                );
            }
            values.push(value);
        }
        values
    }

    /// Emit `callee(args)`
    ///
    /// Known functions get the receiver prepended when they take `this`,
    /// missing arguments padded with `undefined`, and their captured writes
    /// replayed as side effects.
    pub(crate) fn emit_call(
        &mut self,
        callee: ValueId,
        receiver: Option<ValueId>,
        args: Vec<ValueId>,
        range: Span,
    ) -> ValueId {
        let function = self.cursor.program.function_of_value(callee);
        if let Some(fid) = function {
            self.ensure_function_built(fid);
        }
        let signature = function
            .and_then(|fid| self.cursor.program.function(fid))
            .map(|f| (f.has_this, f.arity(), f.return_type.clone()));

        let (args, return_type) = match signature {
            Some((has_this, arity, return_type)) => {
                let mut full = Vec::with_capacity(arity.max(args.len() + 1));
                if has_this {
                    let this = match receiver {
                        Some(receiver) => receiver,
                        None => self.cursor.undefined("this", range),
                    };
                    full.push(this);
                }
                full.extend(args);
                while full.len() < arity {
                    let padding = self.cursor.undefined_typed(
                        UndefinedKind::Default,
                        "undefined",
                        Some(Type::undefined()),
                        range,
                    );
                    full.push(padding);
                }
                (full, return_type)
            }
            None => (args, None),
        };
        let ty = return_type.or_else(|| self.cursor.ty(callee).and_then(Type::return_type).cloned());
        let call = self
            .cursor
            .emit_typed(ValueKind::Call { callee, args }, ty, range);

        if let Some(fid) = function {
            self.apply_side_effects(fid, call, range);
        }
        call
    }

    /// Replay the callee's writes to captured variables after `call`
    fn apply_side_effects(&mut self, function: FunctionId, call: ValueId, range: Span) {
        let effects = self
            .cursor
            .program
            .function(function)
            .map(|f| f.side_effects.clone())
            .unwrap_or_default();
        for record in effects {
            let ty = self.cursor.ty(record.value).cloned();
            let effect = self.cursor.emit_typed(
                ValueKind::SideEffect {
                    call,
                    value: record.value,
                    variable: record.variable,
                },
                ty,
                range,
            );
            self.cursor.assign(record.variable, effect);
        }
    }

    /// `super(...)` inside a constructor runs the parent constructor on `this`
    fn visit_super_call(&mut self, args: &'a [Argument], range: Span) -> ValueId {
        let parent = self
            .cursor
            .current
            .this_blueprint
            .and_then(|id| self.blueprints.get(id))
            .and_then(|bp| bp.parents.first().copied());
        let constructor = parent.and_then(|parent| {
            self.ensure_blueprint_built(parent);
            self.blueprints.lookup_constructor(parent)
        });
        let this = self.cursor.lookup("this").map(|var| self.cursor.read_var(var));
        let args = self.visit_arguments(args);
        match constructor {
            Some(constructor) => self.emit_call(constructor, this, args, range),
            None => self.cursor.undefined("super", range),
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Promises
    // ═══════════════════════════════════════════════════════════════════

    fn is_promise_value(&self, value: ValueId) -> bool {
        self.cursor.ty(value).map_or(false, Type::is_promise)
    }

    fn visit_promise_method(
        &mut self,
        receiver: ValueId,
        method: &str,
        args: &'a [Argument],
        range: Span,
    ) -> ValueId {
        let Some(first) = args.first() else {
            self.error(
                DiagnosticTag::PromiseMethodWithoutCallback,
                format!("`{}` called without a callback", method),
                range,
            );
            return receiver;
        };
        let resolved = self
            .cursor
            .ty(receiver)
            .and_then(Type::promise_inner)
            .unwrap_or_else(Type::any);

        match method {
            "finally" => {
                let callback = self.visit_callback(&first.expr, Vec::new());
                self.emit_call(callback, None, Vec::new(), range);
                receiver
            }
            "catch" => {
                let callback = self.visit_callback(&first.expr, vec![Type::any()]);
                let error = self.cursor.undefined("error", range);
                let result = self.emit_call(callback, None, vec![error], range);
                self.wrap_promise(result)
            }
            _ => {
                let callback = self.visit_callback(&first.expr, vec![resolved.clone()]);
                let value = self.cursor.undefined_typed(
                    UndefinedKind::Default,
                    "value",
                    Some(resolved),
                    range,
                );
                let result = self.emit_call(callback, None, vec![value], range);
                if let Some(on_rejected) = args.get(1) {
                    let callback = self.visit_callback(&on_rejected.expr, vec![Type::any()]);
                    let error = self.cursor.undefined("error", range);
                    self.emit_call(callback, None, vec![error], range);
                }
                self.wrap_promise(result)
            }
        }
    }

    /// Visit a callback and hand its parameters their types before it is built
    fn visit_callback(&mut self, expr: &'a Expr, hints: Vec<Type>) -> ValueId {
        let callback = self.visit_expr(expr);
        if let Some(fid) = self.cursor.program.function_of_value(callback) {
            let pending = self
                .cursor
                .program
                .function(fid)
                .map_or(false, |f| !f.built);
            if pending {
                self.param_hints.insert(fid, hints);
            }
        }
        callback
    }

    /// Type a chained result as `Promise<U>` unless it already is one
    fn wrap_promise(&mut self, result: ValueId) -> ValueId {
        let wrapped = match self.cursor.ty(result) {
            Some(ty) if ty.is_promise() => ty.clone(),
            Some(ty) => Type::promise(ty.clone()),
            None => Type::promise(Type::any()),
        };
        self.refine_type(result, Some(wrapped));
        result
    }

    // ═══════════════════════════════════════════════════════════════════
    // Construction
    // ═══════════════════════════════════════════════════════════════════

    pub(crate) fn visit_new(&mut self, callee: &'a Expr, args: &'a [Argument], range: Span) -> ValueId {
        let callee = callee.unwrap_transparent();
        let name = match &callee.kind {
            ExprKind::Identifier(name) => Some(name.as_str()),
            _ => None,
        };

        if let Some(name) = name.filter(|n| is_builtin_object(n) || BUILTIN_CONSTRUCTORS.contains(n)) {
            if self.cursor.lookup(name).is_none() {
                let target = self.cursor.read(name);
                let args = self.visit_arguments(args);
                let ty = self.type_by_name(name);
                return self
                    .cursor
                    .emit_typed(ValueKind::Call { callee: target, args }, Some(ty), range);
            }
        }

        let target = self.visit_expr(callee);
        let blueprint = match self.cursor.ty(target).and_then(Type::blueprint_ref) {
            Some((id, _)) => Some(id),
            None if self.cursor.program.function_of_value(target).is_some() => None,
            None => name.map(|name| match self.blueprints.id_of(name) {
                Some(id) => id,
                None => {
                    tracing::debug!(blueprint = name, "Creating blueprint for undeclared constructor");
                    self.blueprints.create(name, BlueprintKind::Class)
                }
            }),
        };

        let Some(id) = blueprint else {
            let receiver = self.cursor.undefined("this", range);
            let args = self.visit_arguments(args);
            return self.emit_call(target, Some(receiver), args, range);
        };

        self.ensure_blueprint_built(id);
        let constructor = match self.blueprints.lookup_constructor(id) {
            Some(constructor) => Some(constructor),
            None => self.default_constructor(id, range),
        };
        let instance = self.blueprints.get(id).map(|bp| bp.instance_type());
        let receiver = self
            .cursor
            .undefined_typed(UndefinedKind::Default, "this", instance.clone(), range);
        let args = self.visit_arguments(args);
        let value = match constructor {
            Some(constructor) => self.emit_call(constructor, Some(receiver), args, range),
            None => receiver,
        };
        self.refine_type(value, instance);
        value
    }
}
