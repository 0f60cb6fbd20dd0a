/*
 * Expression visitor
 *
 * Every expression is either read (r-value → `ValueId`) or written
 * (l-value → `LValue`). Members are modelled as member variables keyed by
 * (object, key), so `o.a = 1; o.a` reads back `1` through the ordinary
 * on-demand phi machinery.
 *
 * A member with no reaching definition falls back to:
 * 1. the blueprint tables when the object is typed by a class/interface/enum
 * 2. an `Undefined` member placeholder, typed from the builtin member table
 */

use crate::features::ssa::domain::{
    ConstValue, ContainerKind, UndefinedKind, ValueId, ValueKind, VariableId,
};
use crate::features::ssa::infrastructure::ShortCircuitBuilder;
use crate::features::syntax::domain::ast::{
    ArrayElement, Expr, ExprKind, ObjectProperty, TemplateLiteral,
};
use crate::features::syntax::domain::operators::{
    AssignOperator, BinaryOperator, UpdateOperator,
};
use crate::features::type_resolution::{builtin_member_type, BlueprintView, Type, TypeKind};
use crate::shared::models::{DiagnosticTag, Span};

use super::builder::UnitBuilder;
use super::declarations::FunctionRole;
use super::patterns::parse_number;

/// Writable target of an assignment
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum LValue<'a> {
    Variable(VariableId),
    Member { object: ValueId, key: String },
    /// Array or object literal on the left of `=`
    Pattern(&'a Expr),
    Invalid,
}

impl<'a> UnitBuilder<'a> {
    pub(crate) fn visit_expr(&mut self, expr: &'a Expr) -> ValueId {
        let range = expr.range;
        if self.is_stopped() {
            return self.cursor.undefined("stopped", range);
        }
        match &expr.kind {
            ExprKind::Identifier(name) if name == "undefined" && self.cursor.lookup(name).is_none() => {
                self.undefined_literal(range)
            }
            ExprKind::Identifier(name) => self.cursor.read(name),
            ExprKind::This => self.visit_this(range),
            ExprKind::Super => {
                let parent = self
                    .cursor
                    .current
                    .this_blueprint
                    .and_then(|id| self.blueprints.get(id))
                    .and_then(|bp| bp.parents.first().copied())
                    .and_then(|parent| self.blueprints.get(parent))
                    .map(|bp| bp.instance_type());
                self.cursor
                    .undefined_typed(UndefinedKind::Default, "super", parent, range)
            }
            ExprKind::Number(text) | ExprKind::BigInt(text) => {
                let n = parse_number(text).unwrap_or(f64::NAN);
                self.cursor.constant(ConstValue::Number(n), range)
            }
            ExprKind::String(s) | ExprKind::Regex(s) => {
                self.cursor.constant(ConstValue::String(s.clone()), range)
            }
            ExprKind::Boolean(b) => self.cursor.constant(ConstValue::Boolean(*b), range),
            ExprKind::Null => self.cursor.constant(ConstValue::Null, range),
            ExprKind::Undefined => self.undefined_literal(range),
            ExprKind::Template(template) => self.visit_template(template, range),
            ExprKind::TaggedTemplate { tag, template } => {
                let callee = self.visit_expr(tag);
                let strings = self.cursor.emit_typed(
                    ValueKind::Make {
                        container: ContainerKind::Array,
                    },
                    Some(Type::slice(Type::string())),
                    range,
                );
                for (index, quasi) in template.quasis.iter().enumerate() {
                    let chunk = self.cursor.constant(ConstValue::String(quasi.clone()), range);
                    self.write_member(strings, &index.to_string(), chunk);
                }
                let mut args = vec![strings];
                for expr in &template.exprs {
                    args.push(self.visit_expr(expr));
                }
                self.emit_call(callee, None, args, range)
            }
            ExprKind::Array(elements) => self.visit_array_literal(elements, range),
            ExprKind::Object(properties) => self.visit_object_literal(properties, range),
            ExprKind::Function(decl) => self.function_expression(decl),
            ExprKind::Class(decl) => self.class_expression(decl),
            ExprKind::Unary { op, arg } => {
                let value = self.visit_expr(arg);
                self.emit_unary(*op, value, range)
            }
            ExprKind::Update { op, prefix, arg } => {
                let target = self.visit_lvalue(arg);
                let old = self.read_lvalue(&target, range);
                let one = self.cursor.constant(ConstValue::Number(1.0), range);
                let op = match op {
                    UpdateOperator::Increment => BinaryOperator::Add,
                    UpdateOperator::Decrement => BinaryOperator::Sub,
                };
                let new = self.emit_binary(op, old, one, range);
                self.write_lvalue(target, new, range);
                if *prefix {
                    new
                } else {
                    old
                }
            }
            ExprKind::Binary { op, left, right } if op.is_short_circuit() => {
                let left = self.visit_expr(left);
                self.short_circuit(*op, left, right, range)
            }
            ExprKind::Binary { op, left, right } => {
                let lhs = self.visit_expr(left);
                let rhs = self.visit_expr(right);
                self.emit_binary(*op, lhs, rhs, range)
            }
            ExprKind::Assign { op, left, right } => self.visit_assign(*op, left, right, range),
            ExprKind::Conditional {
                test,
                consequent,
                alternate,
            } => {
                let test: &'a Expr = test;
                let consequent: &'a Expr = consequent;
                let alternate: &'a Expr = alternate;
                ShortCircuitBuilder::new(
                    "ternary_expr",
                    Box::new(move |b: &mut Self| b.visit_expr(test)),
                    Box::new(move |b: &mut Self| b.visit_expr(consequent)),
                    Box::new(move |b: &mut Self| b.visit_expr(alternate)),
                )
                .build(self)
            }
            ExprKind::Call { callee, args, .. } => self.visit_call(callee, args, range),
            ExprKind::New { callee, args } => self.visit_new(callee, args, range),
            ExprKind::Member {
                object, property, ..
            } => {
                let object = self.visit_expr(object);
                self.read_member(object, property, range)
            }
            ExprKind::Index { object, index, .. } => {
                let object = self.visit_expr(object);
                let key = self.member_key(index);
                self.read_member(object, &key, range)
            }
            ExprKind::Paren(inner) | ExprKind::NonNull(inner) => self.visit_expr(inner),
            ExprKind::Await(inner) => {
                let value = self.visit_expr(inner);
                match self.cursor.ty(value).and_then(Type::promise_inner) {
                    Some(resolved) => self.cursor.undefined_typed(
                        UndefinedKind::Default,
                        "await",
                        Some(resolved),
                        range,
                    ),
                    None => value,
                }
            }
            ExprKind::TypeAssertion { expr, ty } => {
                let value = self.visit_expr(expr);
                match ty {
                    Some(node) => {
                        let ty = self.elaborate(node);
                        self.cursor
                            .emit_typed(ValueKind::TypeCast { value }, Some(ty), range)
                    }
                    None => value,
                }
            }
            ExprKind::Unsupported(kind) => {
                self.error(
                    DiagnosticTag::UnhandledExpression,
                    format!("unhandled expression `{}`", kind),
                    range,
                );
                self.cursor.undefined(kind, range)
            }
        }
    }

    fn undefined_literal(&mut self, range: Span) -> ValueId {
        self.cursor.undefined_typed(
            UndefinedKind::Default,
            "undefined",
            Some(Type::undefined()),
            range,
        )
    }

    /// `this`: the bound receiver, else a placeholder typed by the blueprint
    fn visit_this(&mut self, range: Span) -> ValueId {
        if let Some(var) = self.cursor.lookup("this") {
            return self.cursor.read_var(var);
        }
        let instance = self
            .cursor
            .current
            .this_blueprint
            .and_then(|id| self.blueprints.get(id))
            .map(|bp| bp.instance_type());
        self.cursor
            .undefined_typed(UndefinedKind::Default, "this", instance, range)
    }

    /// `` `a${x}b` `` → `add(add("a", castType(string, x)), "b")`
    fn visit_template(&mut self, template: &'a TemplateLiteral, range: Span) -> ValueId {
        let mut acc: Option<ValueId> = None;
        let push = |b: &mut Self, acc: &mut Option<ValueId>, part: ValueId| {
            *acc = Some(match *acc {
                Some(prev) => b.emit_binary(BinaryOperator::Add, prev, part, range),
                None => part,
            });
        };
        for (index, quasi) in template.quasis.iter().enumerate() {
            if !quasi.is_empty() || (index == 0 && template.exprs.is_empty()) {
                let chunk = self.cursor.constant(ConstValue::String(quasi.clone()), range);
                push(self, &mut acc, chunk);
            }
            if let Some(expr) = template.exprs.get(index) {
                let value = self.visit_expr(expr);
                let part = self.to_string_value(value, range);
                push(self, &mut acc, part);
            }
        }
        match acc {
            Some(value) => value,
            None => self.cursor.constant(ConstValue::String(String::new()), range),
        }
    }

    /// Constants and strings as-is, everything else cast to string
    fn to_string_value(&mut self, value: ValueId, range: Span) -> ValueId {
        let is_string = matches!(self.cursor.ty(value).map(|t| &t.kind), Some(TypeKind::String));
        if is_string || self.const_of(value).is_some() {
            return value;
        }
        self.cursor
            .emit_typed(ValueKind::TypeCast { value }, Some(Type::string()), range)
    }

    fn visit_array_literal(&mut self, elements: &'a [Option<ArrayElement>], range: Span) -> ValueId {
        let array = self.cursor.emit(
            ValueKind::Make {
                container: ContainerKind::Array,
            },
            range,
        );
        let mut element_types = Vec::new();
        for (index, element) in elements.iter().enumerate() {
            let Some(element) = element else {
                continue;
            };
            let value = self.visit_expr(&element.expr);
            if element.spread {
                self.warn(
                    DiagnosticTag::NotFullyImplemented,
                    "spread elements are not expanded",
                    element.expr.range,
                );
                continue;
            }
            element_types.push(self.cursor.ty(value).cloned().unwrap_or_else(Type::any));
            self.write_member(array, &index.to_string(), value);
        }
        self.cursor
            .set_type(array, Some(Type::slice(Type::union(element_types))));
        array
    }

    fn visit_object_literal(&mut self, properties: &'a [ObjectProperty], range: Span) -> ValueId {
        let object = self.cursor.emit(
            ValueKind::Make {
                container: ContainerKind::Object,
            },
            range,
        );
        for property in properties {
            match property {
                ObjectProperty::KeyValue { key, value, range } => {
                    let Some(key) = self.property_key(key) else {
                        self.error(DiagnosticTag::InvalidPropertyName, "invalid property name", *range);
                        continue;
                    };
                    let value = self.visit_expr(value);
                    self.write_member(object, &key, value);
                }
                ObjectProperty::Shorthand { name, .. } => {
                    let value = self.cursor.read(name);
                    self.write_member(object, name, value);
                }
                ObjectProperty::Method {
                    key, function, range, ..
                } => {
                    let Some(key) = self.property_key(key) else {
                        self.error(DiagnosticTag::InvalidPropertyName, "invalid method name", *range);
                        continue;
                    };
                    let value = self.declare_function(function, &key, FunctionRole::Plain);
                    self.write_member(object, &key, value);
                }
                ObjectProperty::Spread { expr, range } => {
                    self.visit_expr(expr);
                    self.warn(
                        DiagnosticTag::NotFullyImplemented,
                        "object spread is not expanded",
                        *range,
                    );
                }
            }
        }
        object
    }

    // ═══════════════════════════════════════════════════════════════════
    // Members
    // ═══════════════════════════════════════════════════════════════════

    /// Member key of an index expression
    pub(crate) fn member_key(&mut self, index: &'a Expr) -> String {
        let value = self.visit_expr(index);
        self.key_of(value)
    }

    pub(crate) fn read_member(&mut self, object: ValueId, key: &str, range: Span) -> ValueId {
        let var = self.cursor.member_variable(object, key);
        let object_ty = self.cursor.ty(object).cloned();
        if let Some((id, view)) = object_ty.as_ref().and_then(Type::blueprint_ref) {
            self.ensure_blueprint_built(id);
            if let Some(member) = self.blueprints.lookup_member(id, key, view) {
                self.cursor.seed_at_entry(var, member);
            }
        }

        let placeholder = self.cursor.read_var(var);
        if !self.cursor.is_member_placeholder(placeholder) {
            return placeholder;
        }
        let ty = object_ty.and_then(|ty| {
            builtin_member_type(&ty, key).or_else(|| match &ty.kind {
                TypeKind::Slice(element) if key.parse::<usize>().is_ok() => Some(element.as_ref().clone()),
                _ => None,
            })
        });
        self.refine_type(placeholder, ty);
        if let Some(value) = self.cursor.program.graph.get_mut(placeholder) {
            if value.range.is_zero() {
                value.range = range;
            }
        }
        placeholder
    }

    /// Define `object.key`; `this.key = ...` in a constructor or static
    /// block also registers the member on its blueprint
    pub(crate) fn write_member(&mut self, object: ValueId, key: &str, value: ValueId) {
        let var = self.cursor.member_variable(object, key);
        self.cursor.assign(var, value);

        let current = &self.cursor.current;
        if !current.registers_members || current.this_value != Some(object) {
            return;
        }
        let Some((id, view)) = self.cursor.ty(object).and_then(Type::blueprint_ref) else {
            return;
        };
        if let Some(bp) = self.blueprints.get_mut(id) {
            match view {
                BlueprintView::Instance => bp.register_normal_member(key, value),
                BlueprintView::Static => bp.register_static_member(key, value),
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Assignment
    // ═══════════════════════════════════════════════════════════════════

    pub(crate) fn visit_lvalue(&mut self, expr: &'a Expr) -> LValue<'a> {
        match &expr.kind {
            ExprKind::Identifier(name) => LValue::Variable(self.cursor.lookup_or_bind(name)),
            ExprKind::Member {
                object, property, ..
            } => {
                let object = self.visit_expr(object);
                LValue::Member {
                    object,
                    key: property.clone(),
                }
            }
            ExprKind::Index { object, index, .. } => {
                let object = self.visit_expr(object);
                let key = self.member_key(index);
                LValue::Member { object, key }
            }
            ExprKind::Paren(inner) | ExprKind::NonNull(inner) => self.visit_lvalue(inner),
            ExprKind::TypeAssertion { expr, .. } => self.visit_lvalue(expr),
            ExprKind::Array(_) | ExprKind::Object(_) => LValue::Pattern(expr),
            _ => LValue::Invalid,
        }
    }

    fn read_lvalue(&mut self, target: &LValue<'a>, range: Span) -> ValueId {
        match target {
            LValue::Variable(var) => self.cursor.read_var(*var),
            LValue::Member { object, key } => self.read_member(*object, key, range),
            LValue::Pattern(expr) => self.visit_expr(expr),
            LValue::Invalid => self.cursor.undefined("invalid", range),
        }
    }

    pub(crate) fn write_lvalue(&mut self, target: LValue<'a>, value: ValueId, range: Span) {
        match target {
            LValue::Variable(var) => self.cursor.assign(var, value),
            LValue::Member { object, key } => self.write_member(object, &key, value),
            LValue::Pattern(expr) => self.write_pattern(expr, value, range),
            LValue::Invalid => self.error(
                DiagnosticTag::InvalidPropertyBinding,
                "invalid assignment target",
                range,
            ),
        }
    }

    /// `[a, b = 1] = v` and `({ a, b: c } = v)`
    fn write_pattern(&mut self, pattern: &'a Expr, source: ValueId, range: Span) {
        match &pattern.kind {
            ExprKind::Array(elements) => {
                for (index, element) in elements.iter().enumerate() {
                    let Some(element) = element else {
                        continue;
                    };
                    if element.spread {
                        let target = self.visit_lvalue(&element.expr);
                        self.write_lvalue(target, source, range);
                        continue;
                    }
                    let read = self.read_member(source, &index.to_string(), range);
                    self.write_with_default(&element.expr, read, range);
                }
            }
            ExprKind::Object(properties) => {
                for property in properties {
                    match property {
                        ObjectProperty::KeyValue { key, value, range } => {
                            let Some(key) = self.property_key(key) else {
                                self.error(
                                    DiagnosticTag::InvalidPropertyBinding,
                                    "unsupported property key in assignment pattern",
                                    *range,
                                );
                                continue;
                            };
                            let read = self.read_member(source, &key, *range);
                            self.write_with_default(value, read, *range);
                        }
                        ObjectProperty::Shorthand { name, range } => {
                            let read = self.read_member(source, name, *range);
                            let var = self.cursor.lookup_or_bind(name);
                            self.cursor.assign(var, read);
                        }
                        ObjectProperty::Spread { expr, range } => {
                            let target = self.visit_lvalue(expr);
                            self.write_lvalue(target, source, *range);
                        }
                        ObjectProperty::Method { range, .. } => self.error(
                            DiagnosticTag::InvalidPropertyBinding,
                            "method in assignment pattern",
                            *range,
                        ),
                    }
                }
            }
            _ => self.error(
                DiagnosticTag::InvalidPropertyBinding,
                "invalid assignment pattern",
                range,
            ),
        }
    }

    /// `target = default` inside an assignment pattern
    fn write_with_default(&mut self, target: &'a Expr, value: ValueId, range: Span) {
        match &target.kind {
            ExprKind::Assign {
                op: AssignOperator::Assign,
                left,
                right,
            } => {
                let value = if self.is_undefined_value(value) {
                    self.visit_expr(right)
                } else {
                    value
                };
                let lvalue = self.visit_lvalue(left);
                self.write_lvalue(lvalue, value, range);
            }
            _ => {
                let lvalue = self.visit_lvalue(target);
                self.write_lvalue(lvalue, value, range);
            }
        }
    }

    fn visit_assign(
        &mut self,
        op: AssignOperator,
        left: &'a Expr,
        right: &'a Expr,
        range: Span,
    ) -> ValueId {
        let target = self.visit_lvalue(left);
        let value = match op {
            AssignOperator::Assign => self.visit_expr(right),
            AssignOperator::Compound(op) if op.is_short_circuit() => {
                let current = self.read_lvalue(&target, range);
                self.short_circuit(op, current, right, range)
            }
            AssignOperator::Compound(op) => {
                let current = self.read_lvalue(&target, range);
                let rhs = self.visit_expr(right);
                self.emit_binary(op, current, rhs, range)
            }
        };
        self.write_lvalue(target, value, range);
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildOptions;
    use crate::features::ssa::infrastructure::render_value;
    use crate::features::syntax::domain::ast::{
        DeclarationKind, Program, PropertyName, Stmt, StmtKind,
    };

    fn lower(body: Vec<Stmt>) -> UnitBuilder<'static> {
        let program: &'static Program = Box::leak(Box::new(Program {
            body,
            range: Span::zero(),
        }));
        let mut b = UnitBuilder::new("main", BuildOptions::default());
        b.lower_program(program);
        b
    }

    fn read(b: &mut UnitBuilder<'_>, name: &str) -> String {
        let value = b.cursor.read(name);
        render_value(&b.cursor.program, value)
    }

    fn let_(name: &str, init: Expr) -> Stmt {
        Stmt::declare(DeclarationKind::Let, name, Some(init))
    }

    fn object(entries: Vec<(&str, Expr)>) -> Expr {
        Expr::new(
            ExprKind::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| ObjectProperty::KeyValue {
                        key: PropertyName::Identifier(key.into()),
                        value,
                        range: Span::zero(),
                    })
                    .collect(),
            ),
            Span::zero(),
        )
    }

    #[test]
    fn test_member_write_then_read() {
        let mut b = lower(vec![
            let_("o", object(vec![])),
            Stmt::expr(Expr::assign(Expr::member(Expr::ident("o"), "a"), Expr::number("1"))),
            let_("v", Expr::member(Expr::ident("o"), "a")),
        ]);
        assert_eq!(read(&mut b, "v"), "1");
    }

    #[test]
    fn test_missing_member_is_member_placeholder() {
        let mut b = lower(vec![
            let_("o", object(vec![("a", Expr::number("1"))])),
            let_("v", Expr::member(Expr::ident("o"), "b")),
        ]);
        let v = b.cursor.read("v");
        assert!(matches!(
            b.cursor.program.graph.get(v).map(|v| &v.kind),
            Some(ValueKind::Undefined(UndefinedKind::Member { key, .. })) if key == "b"
        ));
    }

    #[test]
    fn test_postfix_update_returns_old_value() {
        let mut b = lower(vec![
            let_("i", Expr::number("1")),
            let_(
                "old",
                Expr::new(
                    ExprKind::Update {
                        op: UpdateOperator::Increment,
                        prefix: false,
                        arg: Box::new(Expr::ident("i")),
                    },
                    Span::zero(),
                ),
            ),
        ]);
        assert_eq!(read(&mut b, "old"), "1");
        assert_eq!(read(&mut b, "i"), "2");
    }

    #[test]
    fn test_template_literal_casts_non_strings() {
        let template = Expr::new(
            ExprKind::Template(TemplateLiteral {
                quasis: vec!["n=".into(), String::new()],
                exprs: vec![Expr::ident("n")],
            }),
            Span::zero(),
        );
        let mut b = lower(vec![let_("s", template)]);
        assert_eq!(read(&mut b, "s"), "add(\"n=\", castType(string, Undefined-n))");
        let s = b.cursor.read("s");
        assert_eq!(b.cursor.ty(s), Some(&Type::string()));
    }

    #[test]
    fn test_string_length_is_number() {
        let mut b = lower(vec![
            let_("s", Expr::string("abc")),
            let_("n", Expr::member(Expr::ident("s"), "length")),
        ]);
        let n = b.cursor.read("n");
        assert_eq!(b.cursor.ty(n), Some(&Type::number()));
    }

    #[test]
    fn test_array_destructuring_assignment_with_default() {
        let pattern = Expr::new(
            ExprKind::Array(vec![
                Some(ArrayElement {
                    expr: Expr::ident("a"),
                    spread: false,
                }),
                Some(ArrayElement {
                    expr: Expr::assign(Expr::ident("b"), Expr::number("5")),
                    spread: false,
                }),
            ]),
            Span::zero(),
        );
        let source = Expr::new(
            ExprKind::Array(vec![Some(ArrayElement {
                expr: Expr::number("1"),
                spread: false,
            })]),
            Span::zero(),
        );
        let mut b = lower(vec![Stmt::expr(Expr::assign(pattern, source))]);
        assert_eq!(read(&mut b, "a"), "1");
        assert_eq!(read(&mut b, "b"), "5");
    }

    #[test]
    fn test_unsupported_expression_recovers_with_undefined() {
        let b = lower(vec![Stmt::new(
            StmtKind::Expression(Expr::new(
                ExprKind::Unsupported("yield_expression".into()),
                Span::zero(),
            )),
            Span::zero(),
        )]);
        assert_eq!(b.diagnostics()[0].tag, DiagnosticTag::UnhandledExpression);
    }
}
