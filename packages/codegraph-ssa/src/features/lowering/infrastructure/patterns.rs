//! Binding patterns
//!
//! Recursive descent over object and array patterns against one source
//! value. Members are read through member variables, so a key the source
//! never defined reads as an `Undefined` member placeholder and picks up the
//! default initializer.

use crate::features::lowering::domain::ExportBinding;
use crate::features::ssa::domain::{ConstValue, Value, ValueId, ValueKind};
use crate::features::ssa::infrastructure::render_const;
use crate::features::syntax::domain::ast::{
    ArrayPattern, ArrayPatternElement, BindingTarget, Expr, Modifiers, ObjectPattern,
    ObjectPatternProperty, PropertyName,
};
use crate::shared::models::{DiagnosticTag, Span};

use super::builder::UnitBuilder;
use super::declarations::BindKind;
use super::operators::{is_decimal_literal, prefixed_integer};

/// Every identifier a target binds, in source order
pub(crate) fn binding_names<'t>(target: &'t BindingTarget, out: &mut Vec<&'t str>) {
    match target {
        BindingTarget::Identifier(name) => out.push(name),
        BindingTarget::Object(pattern) => {
            for property in &pattern.properties {
                match property {
                    ObjectPatternProperty::KeyValue { value, .. } => binding_names(value, out),
                    ObjectPatternProperty::Shorthand { name, .. } => out.push(name),
                    ObjectPatternProperty::Rest { target, .. } => binding_names(target, out),
                }
            }
        }
        BindingTarget::Array(pattern) => {
            for element in pattern.elements.iter().flatten() {
                match element {
                    ArrayPatternElement::Single { target, .. }
                    | ArrayPatternElement::Rest { target, .. } => binding_names(target, out),
                }
            }
        }
        BindingTarget::Invalid(_) => {}
    }
}

impl<'a> UnitBuilder<'a> {
    pub(crate) fn bind_target(
        &mut self,
        target: &'a BindingTarget,
        value: ValueId,
        kind: BindKind,
        modifiers: Modifiers,
    ) {
        match target {
            BindingTarget::Identifier(name) => {
                self.bind_name(name, value, kind, modifiers);
            }
            BindingTarget::Object(pattern) => self.bind_object_pattern(pattern, value, kind, modifiers),
            BindingTarget::Array(pattern) => self.bind_array_pattern(pattern, value, kind, modifiers),
            BindingTarget::Invalid(raw) => {
                let range = self
                    .cursor
                    .program
                    .graph
                    .get(value)
                    .map(Value::range)
                    .unwrap_or_default();
                self.error(
                    DiagnosticTag::InvalidPropertyBinding,
                    format!("cannot bind to `{}`", raw),
                    range,
                );
            }
        }
    }

    pub(crate) fn bind_name(
        &mut self,
        name: &str,
        value: ValueId,
        kind: BindKind,
        modifiers: Modifiers,
    ) {
        let var = match kind {
            BindKind::Local => self.cursor.declare_local(name),
            BindKind::Hoisted => self.cursor.declare_hoisted(name),
            BindKind::Assign => self.cursor.lookup_or_bind(name),
        };
        self.cursor.assign(var, value);
        self.export_binding(name, ExportBinding::Variable(var), modifiers);
    }

    fn bind_object_pattern(
        &mut self,
        pattern: &'a ObjectPattern,
        source: ValueId,
        kind: BindKind,
        modifiers: Modifiers,
    ) {
        for property in &pattern.properties {
            match property {
                ObjectPatternProperty::KeyValue {
                    key,
                    value,
                    default,
                    range,
                } => {
                    let Some(key) = self.property_key(key) else {
                        self.error(
                            DiagnosticTag::InvalidPropertyBinding,
                            "unsupported property key in binding pattern",
                            *range,
                        );
                        continue;
                    };
                    let read = self.read_member(source, &key, *range);
                    let read = self.apply_default(read, default.as_ref());
                    self.bind_target(value, read, kind, modifiers);
                }
                ObjectPatternProperty::Shorthand {
                    name,
                    default,
                    range,
                } => {
                    let read = self.read_member(source, name, *range);
                    let read = self.apply_default(read, default.as_ref());
                    self.bind_name(name, read, kind, modifiers);
                }
                ObjectPatternProperty::Rest { target, range } => {
                    self.bind_rest(target, source, kind, modifiers, *range)
                }
            }
        }
    }

    fn bind_array_pattern(
        &mut self,
        pattern: &'a ArrayPattern,
        source: ValueId,
        kind: BindKind,
        modifiers: Modifiers,
    ) {
        for (index, element) in pattern.elements.iter().enumerate() {
            match element {
                None => {}
                Some(ArrayPatternElement::Single {
                    target,
                    default,
                    range,
                }) => {
                    let read = self.read_member(source, &index.to_string(), *range);
                    let read = self.apply_default(read, default.as_ref());
                    self.bind_target(target, read, kind, modifiers);
                }
                Some(ArrayPatternElement::Rest { target, range }) => {
                    self.bind_rest(target, source, kind, modifiers, *range)
                }
            }
        }
    }

    /// `...rest` binds the whole source value
    fn bind_rest(
        &mut self,
        target: &'a BindingTarget,
        source: ValueId,
        kind: BindKind,
        modifiers: Modifiers,
        range: Span,
    ) {
        match target {
            BindingTarget::Identifier(name) => {
                self.bind_name(name, source, kind, modifiers);
            }
            _ => self.error(
                DiagnosticTag::RestElementRequiresIdentifier,
                "rest element must bind an identifier",
                range,
            ),
        }
    }

    /// Default applies only when the read value is of the Undefined kind
    fn apply_default(&mut self, value: ValueId, default: Option<&'a Expr>) -> ValueId {
        match default {
            Some(expr) if self.is_undefined_value(value) => self.visit_expr(expr),
            _ => value,
        }
    }

    pub(crate) fn is_undefined_value(&self, value: ValueId) -> bool {
        self.cursor
            .program
            .graph
            .get(value)
            .map(Value::is_undefined)
            .unwrap_or(false)
    }

    /// Member key a property name stands for; `None` when it has none
    pub(crate) fn property_key(&mut self, name: &'a PropertyName) -> Option<String> {
        match name {
            PropertyName::Identifier(name) | PropertyName::String(name) => Some(name.clone()),
            PropertyName::Private(name) => Some(format!("#{}", name.trim_start_matches('#'))),
            PropertyName::Number(text) | PropertyName::BigInt(text) => {
                Some(match parse_number(text) {
                    Some(n) => render_const(&ConstValue::Number(n)),
                    None => text.clone(),
                })
            }
            PropertyName::Computed(expr) => {
                let value = self.visit_expr(expr);
                Some(self.key_of(value))
            }
            PropertyName::Invalid(_) => None,
        }
    }

    /// Member key for a computed value: constants by value, others by name
    pub(crate) fn key_of(&self, value: ValueId) -> String {
        match self.cursor.program.graph.get(value).map(|v| &v.kind) {
            Some(ValueKind::Const(ConstValue::String(s))) => s.clone(),
            Some(ValueKind::Const(c)) => render_const(c),
            _ => self.cursor.program.display_name(value),
        }
    }
}

/// Numeric literal text: decimal, hex/octal/binary prefixes, `_` separators,
/// bigint suffix
pub(crate) fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    let cleaned: String = text
        .strip_suffix('n')
        .unwrap_or(text)
        .chars()
        .filter(|&c| c != '_')
        .collect();
    if let Some(n) = prefixed_integer(&cleaned) {
        return (!n.is_nan()).then_some(n);
    }
    if !is_decimal_literal(&cleaned) {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildOptions;
    use crate::features::ssa::infrastructure::render_value;
    use crate::features::syntax::domain::ast::{
        DeclarationKind, ExprKind, ObjectProperty, Program, Stmt, StmtKind, VariableDeclaration,
        VariableDeclarator,
    };

    fn declare_pattern(target: BindingTarget, init: Expr) -> Stmt {
        Stmt::new(
            StmtKind::Variable(VariableDeclaration {
                kind: DeclarationKind::Let,
                declarators: vec![VariableDeclarator {
                    target: Some(target),
                    type_annotation: None,
                    init: Some(init),
                    range: Span::zero(),
                }],
                modifiers: Modifiers::default(),
                range: Span::zero(),
            }),
            Span::zero(),
        )
    }

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

    #[test]
    fn test_binding_names_walks_nested_patterns() {
        let target = BindingTarget::Array(ArrayPattern {
            elements: vec![
                Some(ArrayPatternElement::Single {
                    target: BindingTarget::Identifier("a".into()),
                    default: None,
                    range: Span::zero(),
                }),
                None,
                Some(ArrayPatternElement::Rest {
                    target: BindingTarget::Object(ObjectPattern {
                        properties: vec![ObjectPatternProperty::Shorthand {
                            name: "b".into(),
                            default: None,
                            range: Span::zero(),
                        }],
                        range: Span::zero(),
                    }),
                    range: Span::zero(),
                }),
            ],
            range: Span::zero(),
        });
        let mut names = Vec::new();
        binding_names(&target, &mut names);
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_array_pattern_skips_holes() {
        let array = Expr::new(
            ExprKind::Array(vec![
                Some(crate::features::syntax::domain::ast::ArrayElement {
                    expr: Expr::number("1"),
                    spread: false,
                }),
                Some(crate::features::syntax::domain::ast::ArrayElement {
                    expr: Expr::number("2"),
                    spread: false,
                }),
            ]),
            Span::zero(),
        );
        let target = BindingTarget::Array(ArrayPattern {
            elements: vec![
                None,
                Some(ArrayPatternElement::Single {
                    target: BindingTarget::Identifier("second".into()),
                    default: None,
                    range: Span::zero(),
                }),
            ],
            range: Span::zero(),
        });
        let mut b = lower(vec![declare_pattern(target, array)]);
        assert_eq!(read(&mut b, "second"), "2");
    }

    #[test]
    fn test_rest_rebinds_whole_source() {
        let object = Expr::new(
            ExprKind::Object(vec![ObjectProperty::KeyValue {
                key: PropertyName::Identifier("a".into()),
                value: Expr::number("1"),
                range: Span::zero(),
            }]),
            Span::zero(),
        );
        let target = BindingTarget::Object(ObjectPattern {
            properties: vec![ObjectPatternProperty::Rest {
                target: BindingTarget::Identifier("rest".into()),
                range: Span::zero(),
            }],
            range: Span::zero(),
        });
        let mut b = lower(vec![declare_pattern(target, object)]);
        assert_eq!(read(&mut b, "rest"), "make(object)");
    }

    #[test]
    fn test_rest_requires_identifier() {
        let target = BindingTarget::Object(ObjectPattern {
            properties: vec![ObjectPatternProperty::Rest {
                target: BindingTarget::Array(ArrayPattern {
                    elements: vec![],
                    range: Span::zero(),
                }),
                range: Span::zero(),
            }],
            range: Span::zero(),
        });
        let b = lower(vec![declare_pattern(target, Expr::ident("src"))]);
        assert_eq!(
            b.diagnostics()[0].tag,
            DiagnosticTag::RestElementRequiresIdentifier
        );
    }

    #[test]
    fn test_parse_number_forms() {
        assert_eq!(parse_number("42"), Some(42.0));
        assert_eq!(parse_number("1_000"), Some(1000.0));
        assert_eq!(parse_number("0xff"), Some(255.0));
        assert_eq!(parse_number("0b101"), Some(5.0));
        assert_eq!(parse_number("10n"), Some(10.0));
        assert_eq!(parse_number("1.5e3"), Some(1500.0));
        assert_eq!(parse_number("0X1F"), Some(31.0));
        assert_eq!(parse_number("0o17"), Some(15.0));
        assert_eq!(parse_number(".5"), Some(0.5));
        assert_eq!(parse_number("0x1_0000_0000_0000_0000"), Some(18_446_744_073_709_551_616.0));
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("0xg"), None);
    }
}
