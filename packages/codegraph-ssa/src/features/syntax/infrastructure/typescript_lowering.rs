/*
 * TypeScript tree-sitter → syntax tree lowering
 *
 * Walks the concrete syntax tree produced by tree-sitter-typescript and
 * produces the closed `ast` enums consumed by the SSA builder.
 *
 * Recovery policy:
 * - Unknown statements / expressions / types become `Unsupported(kind)`
 * - `ERROR` and `MISSING` nodes are reported as syntax diagnostics but the
 *   surrounding tree is still lowered
 * - Comments are skipped everywhere
 */

use tree_sitter::{Node, Parser};

use crate::features::syntax::domain::ast::*;
use crate::features::syntax::domain::operators::{
    AssignOperator, BinaryOperator, UnaryOperator, UpdateOperator,
};
use crate::shared::models::{CodegraphError, Diagnostic, DiagnosticTag, Result, Span};

use super::node_kinds as kinds;

/// Parsed program plus the syntax errors tree-sitter recovered from
#[derive(Debug, Clone)]
pub struct ParsedSource {
    pub program: Program,
    pub syntax_errors: Vec<Diagnostic>,
}

/// Parse TypeScript (or plain JavaScript) source into a syntax tree
pub fn parse_typescript(source: &str) -> Result<ParsedSource> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_typescript::language_typescript())
        .map_err(|e| CodegraphError::parse(format!("Failed to set TypeScript language: {}", e)))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| CodegraphError::parse("tree-sitter returned no tree"))?;

    let root = tree.root_node();
    let lowering = TypeScriptLowering::new(source);
    let program = lowering.lower_program(root);

    let mut syntax_errors = Vec::new();
    if root.has_error() {
        lowering.collect_syntax_errors(root, &mut syntax_errors);
    }

    #[cfg(feature = "trace")]
    tracing::debug!(
        statements = program.body.len(),
        syntax_errors = syntax_errors.len(),
        "Parsed TypeScript source"
    );

    Ok(ParsedSource {
        program,
        syntax_errors,
    })
}

/// Stateless visitor over one source text
pub struct TypeScriptLowering<'s> {
    source: &'s str,
}

impl<'s> TypeScriptLowering<'s> {
    pub fn new(source: &'s str) -> Self {
        Self { source }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Node helpers
    // ═══════════════════════════════════════════════════════════════════

    fn text(&self, node: Node<'_>) -> &'s str {
        self.source
            .get(node.start_byte()..node.end_byte())
            .unwrap_or("")
    }

    fn span(node: Node<'_>) -> Span {
        let start = node.start_position();
        let end = node.end_position();
        Span::new(
            start.row as u32 + 1,
            start.column as u32,
            end.row as u32 + 1,
            end.column as u32,
        )
    }

    fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
        let mut cursor = node.walk();
        node.named_children(&mut cursor)
            .filter(|child| child.kind() != kinds::COMMENT)
            .collect()
    }

    fn all_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
        let mut cursor = node.walk();
        node.children(&mut cursor).collect()
    }

    /// Anonymous keyword/punctuation child such as `async`, `static`, `get`
    fn has_token(node: Node<'_>, token: &str) -> bool {
        Self::all_children(node)
            .iter()
            .any(|child| !child.is_named() && child.kind() == token)
    }

    fn has_child_kind(node: Node<'_>, kind: &str) -> bool {
        Self::all_children(node).iter().any(|c| c.kind() == kind)
    }

    fn first_named<'t>(node: Node<'t>) -> Option<Node<'t>> {
        Self::named_children(node).into_iter().next()
    }

    fn unsupported_expr(&self, node: Node<'_>) -> Expr {
        Expr::new(ExprKind::Unsupported(node.kind().to_string()), Self::span(node))
    }

    fn collect_syntax_errors(&self, node: Node<'_>, out: &mut Vec<Diagnostic>) {
        if node.is_error() || node.is_missing() {
            let snippet: String = self.text(node).chars().take(40).collect();
            let message = if node.is_missing() {
                format!("missing `{}`", node.kind())
            } else {
                format!("unexpected syntax near `{}`", snippet)
            };
            out.push(Diagnostic::warn(
                DiagnosticTag::SyntaxError,
                message,
                Self::span(node),
            ));
            return;
        }
        for child in Self::all_children(node) {
            if child.has_error() || child.is_missing() {
                self.collect_syntax_errors(child, out);
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Statements
    // ═══════════════════════════════════════════════════════════════════

    pub fn lower_program(&self, root: Node<'_>) -> Program {
        Program {
            body: self.lower_statements(root),
            range: Self::span(root),
        }
    }

    fn lower_statements(&self, node: Node<'_>) -> Vec<Stmt> {
        Self::named_children(node)
            .into_iter()
            .map(|child| self.lower_statement(child))
            .collect()
    }

    fn lower_block(&self, node: Node<'_>) -> Vec<Stmt> {
        if node.kind() == kinds::STATEMENT_BLOCK {
            self.lower_statements(node)
        } else {
            vec![self.lower_statement(node)]
        }
    }

    fn lower_statement(&self, node: Node<'_>) -> Stmt {
        let range = Self::span(node);
        let kind = match node.kind() {
            kinds::EXPRESSION_STATEMENT => match Self::first_named(node) {
                Some(expr) => StmtKind::Expression(self.lower_expr(expr)),
                None => StmtKind::Empty,
            },
            kinds::LEXICAL_DECLARATION | kinds::VARIABLE_DECLARATION => {
                StmtKind::Variable(self.lower_variable_declaration(node))
            }
            kinds::FUNCTION_DECLARATION | kinds::GENERATOR_FUNCTION_DECLARATION => {
                StmtKind::Function(self.lower_function(node))
            }
            // overload signatures carry no runtime behavior
            kinds::FUNCTION_SIGNATURE | kinds::AMBIENT_DECLARATION => StmtKind::Empty,
            kinds::CLASS_DECLARATION | kinds::ABSTRACT_CLASS_DECLARATION => {
                StmtKind::Class(self.lower_class(node))
            }
            kinds::INTERFACE_DECLARATION => StmtKind::Interface(self.lower_interface(node)),
            kinds::ENUM_DECLARATION => StmtKind::Enum(self.lower_enum(node)),
            kinds::TYPE_ALIAS_DECLARATION => match self.lower_type_alias(node) {
                Some(alias) => StmtKind::TypeAlias(alias),
                None => StmtKind::Unsupported(node.kind().to_string()),
            },
            kinds::IMPORT_STATEMENT => StmtKind::Import(self.lower_import(node)),
            kinds::EXPORT_STATEMENT => return self.lower_export(node),
            kinds::STATEMENT_BLOCK => StmtKind::Block(self.lower_statements(node)),
            kinds::IF_STATEMENT => self.lower_if(node),
            kinds::FOR_STATEMENT => self.lower_for(node),
            kinds::FOR_IN_STATEMENT => self.lower_for_in(node),
            kinds::WHILE_STATEMENT => StmtKind::While {
                cond: self.field_expr(node, "condition"),
                body: Box::new(self.field_stmt(node, "body")),
            },
            kinds::DO_STATEMENT => StmtKind::DoWhile {
                body: Box::new(self.field_stmt(node, "body")),
                cond: self.field_expr(node, "condition"),
            },
            kinds::RETURN_STATEMENT => {
                StmtKind::Return(Self::first_named(node).map(|e| self.lower_expr(e)))
            }
            kinds::BREAK_STATEMENT => StmtKind::Break(self.statement_label(node)),
            kinds::CONTINUE_STATEMENT => StmtKind::Continue(self.statement_label(node)),
            kinds::LABELED_STATEMENT => self.lower_labeled(node),
            kinds::SWITCH_STATEMENT => self.lower_switch(node),
            kinds::TRY_STATEMENT => self.lower_try(node),
            kinds::THROW_STATEMENT => match Self::first_named(node) {
                Some(expr) => StmtKind::Throw(self.lower_expr(expr)),
                None => StmtKind::Unsupported(node.kind().to_string()),
            },
            kinds::EMPTY_STATEMENT => StmtKind::Empty,
            kinds::DEBUGGER_STATEMENT => StmtKind::Debugger,
            kinds::WITH_STATEMENT => StmtKind::With {
                object: self.field_expr(node, "object"),
                body: Box::new(self.field_stmt(node, "body")),
            },
            other => StmtKind::Unsupported(other.to_string()),
        };
        Stmt::new(kind, range)
    }

    fn field_expr(&self, node: Node<'_>, field: &str) -> Expr {
        match node.child_by_field_name(field) {
            Some(child) => self.lower_expr(child),
            None => Expr::new(
                ExprKind::Unsupported(format!("missing {}", field)),
                Self::span(node),
            ),
        }
    }

    fn field_stmt(&self, node: Node<'_>, field: &str) -> Stmt {
        match node.child_by_field_name(field) {
            Some(child) => self.lower_statement(child),
            None => Stmt::new(StmtKind::Empty, Self::span(node)),
        }
    }

    fn statement_label(&self, node: Node<'_>) -> Option<String> {
        node.child_by_field_name("label")
            .or_else(|| {
                Self::named_children(node)
                    .into_iter()
                    .find(|c| c.kind() == kinds::STATEMENT_IDENTIFIER)
            })
            .map(|label| self.text(label).to_string())
    }

    fn lower_if(&self, node: Node<'_>) -> StmtKind {
        let alternate = node.child_by_field_name("alternative").map(|alt| {
            let inner = if alt.kind() == kinds::ELSE_CLAUSE {
                Self::first_named(alt)
            } else {
                Some(alt)
            };
            Box::new(match inner {
                Some(stmt) => self.lower_statement(stmt),
                None => Stmt::new(StmtKind::Empty, Self::span(alt)),
            })
        });
        StmtKind::If(IfStmt {
            cond: self.field_expr(node, "condition"),
            consequent: Box::new(self.field_stmt(node, "consequence")),
            alternate,
        })
    }

    fn lower_for(&self, node: Node<'_>) -> StmtKind {
        let init = node
            .child_by_field_name("initializer")
            .and_then(|init| match init.kind() {
                kinds::LEXICAL_DECLARATION | kinds::VARIABLE_DECLARATION => Some(
                    ForInit::Declaration(self.lower_variable_declaration(init)),
                ),
                kinds::EMPTY_STATEMENT => None,
                kinds::EXPRESSION_STATEMENT => {
                    Self::first_named(init).map(|e| ForInit::Expression(self.lower_expr(e)))
                }
                _ => Some(ForInit::Expression(self.lower_expr(init))),
            });
        let cond = node
            .child_by_field_name("condition")
            .and_then(|cond| match cond.kind() {
                kinds::EMPTY_STATEMENT => None,
                kinds::EXPRESSION_STATEMENT => Self::first_named(cond).map(|e| self.lower_expr(e)),
                _ => Some(self.lower_expr(cond)),
            });
        let update = node
            .child_by_field_name("increment")
            .map(|update| self.lower_expr(update));

        StmtKind::For(ForStmt {
            init,
            cond,
            update,
            body: Box::new(self.field_stmt(node, "body")),
        })
    }

    fn lower_for_in(&self, node: Node<'_>) -> StmtKind {
        let iteration = match node.child_by_field_name("operator") {
            Some(op) if self.text(op) == "of" => IterationKind::Of,
            Some(_) => IterationKind::In,
            None if Self::has_token(node, "of") => IterationKind::Of,
            None => IterationKind::In,
        };
        let left = match (node.child_by_field_name("kind"), node.child_by_field_name("left")) {
            (Some(kind), Some(left)) => ForInLeft::Declaration {
                kind: DeclarationKind::from_keyword(self.text(kind)),
                target: self.lower_binding_target(left),
            },
            (None, Some(left)) => ForInLeft::Expression(self.lower_expr(left)),
            (_, None) => ForInLeft::Expression(self.unsupported_expr(node)),
        };
        StmtKind::ForIn(ForInStmt {
            left,
            right: self.field_expr(node, "right"),
            body: Box::new(self.field_stmt(node, "body")),
            iteration,
        })
    }

    fn lower_labeled(&self, node: Node<'_>) -> StmtKind {
        let label = self.statement_label(node).unwrap_or_default();
        let body = node
            .child_by_field_name("body")
            .or_else(|| {
                Self::named_children(node)
                    .into_iter()
                    .find(|c| c.kind() != kinds::STATEMENT_IDENTIFIER)
            })
            .map(|b| self.lower_statement(b))
            .unwrap_or_else(|| Stmt::new(StmtKind::Empty, Self::span(node)));
        StmtKind::Labeled {
            label,
            body: Box::new(body),
        }
    }

    fn lower_switch(&self, node: Node<'_>) -> StmtKind {
        let discriminant = self.field_expr(node, "value");
        let mut cases = Vec::new();
        if let Some(body) = node.child_by_field_name("body") {
            for case in Self::named_children(body) {
                let test = match case.kind() {
                    kinds::SWITCH_CASE => case.child_by_field_name("value"),
                    kinds::SWITCH_DEFAULT => None,
                    _ => continue,
                };
                let test_id = test.map(|t| t.id());
                let statements = Self::named_children(case)
                    .into_iter()
                    .filter(|child| Some(child.id()) != test_id)
                    .map(|child| self.lower_statement(child))
                    .collect();
                cases.push(SwitchCase {
                    test: test.map(|t| self.lower_expr(t)),
                    body: statements,
                    range: Self::span(case),
                });
            }
        }
        StmtKind::Switch(SwitchStmt {
            discriminant,
            cases,
        })
    }

    fn lower_try(&self, node: Node<'_>) -> StmtKind {
        let block = node
            .child_by_field_name("body")
            .map(|b| self.lower_block(b))
            .unwrap_or_default();
        let handler = node.child_by_field_name("handler").map(|h| CatchClause {
            param: h
                .child_by_field_name("parameter")
                .map(|p| self.lower_binding_target(p)),
            body: h
                .child_by_field_name("body")
                .map(|b| self.lower_block(b))
                .unwrap_or_default(),
            range: Self::span(h),
        });
        let finalizer = node.child_by_field_name("finalizer").map(|f| {
            f.child_by_field_name("body")
                .map(|b| self.lower_block(b))
                .unwrap_or_default()
        });
        StmtKind::Try(TryStmt {
            block,
            handler,
            finalizer,
        })
    }

    // ═══════════════════════════════════════════════════════════════════
    // Declarations
    // ═══════════════════════════════════════════════════════════════════

    fn lower_variable_declaration(&self, node: Node<'_>) -> VariableDeclaration {
        let kind = if node.kind() == kinds::VARIABLE_DECLARATION {
            DeclarationKind::Var
        } else {
            node.child_by_field_name("kind")
                .map(|k| DeclarationKind::from_keyword(self.text(k)))
                .unwrap_or(DeclarationKind::Let)
        };
        let declarators = Self::named_children(node)
            .into_iter()
            .filter(|c| c.kind() == kinds::VARIABLE_DECLARATOR)
            .map(|d| VariableDeclarator {
                target: d
                    .child_by_field_name("name")
                    .map(|n| self.lower_binding_target(n)),
                type_annotation: d
                    .child_by_field_name("type")
                    .and_then(|t| self.lower_type_annotation(t)),
                init: d.child_by_field_name("value").map(|v| self.lower_expr(v)),
                range: Self::span(d),
            })
            .collect();
        VariableDeclaration {
            kind,
            declarators,
            modifiers: Modifiers::default(),
            range: Self::span(node),
        }
    }

    fn lower_binding_target(&self, node: Node<'_>) -> BindingTarget {
        match node.kind() {
            kinds::IDENTIFIER | kinds::SHORTHAND_PROPERTY_IDENTIFIER_PATTERN => {
                BindingTarget::Identifier(self.text(node).to_string())
            }
            kinds::OBJECT_PATTERN => BindingTarget::Object(self.lower_object_pattern(node)),
            kinds::ARRAY_PATTERN => BindingTarget::Array(self.lower_array_pattern(node)),
            other => BindingTarget::Invalid(other.to_string()),
        }
    }

    /// Split `target = default` pattern nodes
    fn split_default<'t>(&self, node: Node<'t>) -> (Node<'t>, Option<Expr>) {
        match node.kind() {
            kinds::ASSIGNMENT_PATTERN | kinds::OBJECT_ASSIGNMENT_PATTERN => {
                match node.child_by_field_name("left") {
                    Some(left) => (
                        left,
                        node.child_by_field_name("right").map(|r| self.lower_expr(r)),
                    ),
                    None => (node, None),
                }
            }
            _ => (node, None),
        }
    }

    fn lower_object_pattern(&self, node: Node<'_>) -> ObjectPattern {
        let mut properties = Vec::new();
        for child in Self::named_children(node) {
            let range = Self::span(child);
            let property = match child.kind() {
                kinds::SHORTHAND_PROPERTY_IDENTIFIER_PATTERN => ObjectPatternProperty::Shorthand {
                    name: self.text(child).to_string(),
                    default: None,
                    range,
                },
                kinds::OBJECT_ASSIGNMENT_PATTERN => {
                    let (left, default) = self.split_default(child);
                    if left.kind() == kinds::SHORTHAND_PROPERTY_IDENTIFIER_PATTERN {
                        ObjectPatternProperty::Shorthand {
                            name: self.text(left).to_string(),
                            default,
                            range,
                        }
                    } else {
                        ObjectPatternProperty::KeyValue {
                            key: PropertyName::Invalid(left.kind().to_string()),
                            value: self.lower_binding_target(left),
                            default,
                            range,
                        }
                    }
                }
                kinds::PAIR_PATTERN => {
                    let key = child
                        .child_by_field_name("key")
                        .map(|k| self.lower_property_name(k))
                        .unwrap_or_else(|| PropertyName::Invalid("missing key".to_string()));
                    let (value, default) = match child.child_by_field_name("value") {
                        Some(v) => {
                            let (target, default) = self.split_default(v);
                            (self.lower_binding_target(target), default)
                        }
                        None => (BindingTarget::Invalid("missing value".to_string()), None),
                    };
                    ObjectPatternProperty::KeyValue {
                        key,
                        value,
                        default,
                        range,
                    }
                }
                kinds::REST_PATTERN => ObjectPatternProperty::Rest {
                    target: Self::first_named(child)
                        .map(|t| self.lower_binding_target(t))
                        .unwrap_or_else(|| BindingTarget::Invalid(kinds::REST_PATTERN.to_string())),
                    range,
                },
                other => ObjectPatternProperty::KeyValue {
                    key: PropertyName::Invalid(other.to_string()),
                    value: BindingTarget::Invalid(other.to_string()),
                    default: None,
                    range,
                },
            };
            properties.push(property);
        }
        ObjectPattern {
            properties,
            range: Self::span(node),
        }
    }

    fn lower_array_pattern(&self, node: Node<'_>) -> ArrayPattern {
        let mut elements = Vec::new();
        let mut expecting = true;
        for child in Self::all_children(node) {
            match child.kind() {
                "[" | kinds::COMMENT => {}
                "]" => break,
                "," => {
                    if expecting {
                        elements.push(None);
                    }
                    expecting = true;
                }
                _ if child.is_named() => {
                    let range = Self::span(child);
                    let element = if child.kind() == kinds::REST_PATTERN {
                        ArrayPatternElement::Rest {
                            target: Self::first_named(child)
                                .map(|t| self.lower_binding_target(t))
                                .unwrap_or_else(|| {
                                    BindingTarget::Invalid(kinds::REST_PATTERN.to_string())
                                }),
                            range,
                        }
                    } else {
                        let (target, default) = self.split_default(child);
                        ArrayPatternElement::Single {
                            target: self.lower_binding_target(target),
                            default,
                            range,
                        }
                    };
                    elements.push(Some(element));
                    expecting = false;
                }
                _ => {}
            }
        }
        ArrayPattern {
            elements,
            range: Self::span(node),
        }
    }

    fn lower_function(&self, node: Node<'_>) -> FunctionDecl {
        let kind = node.kind();
        let is_arrow = kind == kinds::ARROW_FUNCTION;

        let params = if let Some(params) = node.child_by_field_name("parameters") {
            self.lower_params(params)
        } else if let Some(single) = node.child_by_field_name("parameter") {
            vec![Param {
                target: self.lower_binding_target(single),
                type_annotation: None,
                default: None,
                rest: false,
                optional: false,
                accessibility: None,
                readonly: false,
                range: Self::span(single),
            }]
        } else {
            Vec::new()
        };

        let body = match node.child_by_field_name("body") {
            Some(body) if body.kind() == kinds::STATEMENT_BLOCK => {
                FunctionBody::Block(self.lower_statements(body))
            }
            Some(expr) => FunctionBody::Expression(Box::new(self.lower_expr(expr))),
            None => FunctionBody::Absent,
        };

        FunctionDecl {
            name: node
                .child_by_field_name("name")
                .map(|n| self.text(n).to_string()),
            params,
            return_type: node
                .child_by_field_name("return_type")
                .and_then(|t| self.lower_type_annotation(t)),
            body,
            is_async: Self::has_token(node, "async"),
            is_arrow,
            is_generator: kind.contains("generator") || Self::has_token(node, "*"),
            modifiers: Modifiers::default(),
            range: Self::span(node),
        }
    }

    fn lower_params(&self, node: Node<'_>) -> Vec<Param> {
        let mut params = Vec::new();
        for child in Self::named_children(node) {
            let range = Self::span(child);
            let param = match child.kind() {
                kinds::REQUIRED_PARAMETER | kinds::OPTIONAL_PARAMETER => {
                    let Some(pattern) = child.child_by_field_name("pattern") else {
                        continue;
                    };
                    if pattern.kind() == kinds::THIS {
                        continue;
                    }
                    let (target, rest) = if pattern.kind() == kinds::REST_PATTERN {
                        (
                            Self::first_named(pattern)
                                .map(|t| self.lower_binding_target(t))
                                .unwrap_or_else(|| {
                                    BindingTarget::Invalid(kinds::REST_PATTERN.to_string())
                                }),
                            true,
                        )
                    } else {
                        (self.lower_binding_target(pattern), false)
                    };
                    let accessibility = Self::named_children(child)
                        .into_iter()
                        .find(|c| c.kind() == kinds::ACCESSIBILITY_MODIFIER)
                        .map(|m| match self.text(m) {
                            "private" => Accessibility::Private,
                            "protected" => Accessibility::Protected,
                            _ => Accessibility::Public,
                        });
                    Param {
                        target,
                        type_annotation: child
                            .child_by_field_name("type")
                            .and_then(|t| self.lower_type_annotation(t)),
                        default: child.child_by_field_name("value").map(|v| self.lower_expr(v)),
                        rest,
                        optional: child.kind() == kinds::OPTIONAL_PARAMETER,
                        accessibility,
                        readonly: Self::has_child_kind(child, "readonly"),
                        range,
                    }
                }
                kinds::REST_PATTERN => Param {
                    target: Self::first_named(child)
                        .map(|t| self.lower_binding_target(t))
                        .unwrap_or_else(|| BindingTarget::Invalid(kinds::REST_PATTERN.to_string())),
                    type_annotation: None,
                    default: None,
                    rest: true,
                    optional: false,
                    accessibility: None,
                    readonly: false,
                    range,
                },
                _ => {
                    let (target, default) = self.split_default(child);
                    Param {
                        target: self.lower_binding_target(target),
                        type_annotation: None,
                        default,
                        rest: false,
                        optional: false,
                        accessibility: None,
                        readonly: false,
                        range,
                    }
                }
            };
            params.push(param);
        }
        params
    }

    fn lower_heritage_expr(&self, node: Node<'_>) -> HeritageRef {
        let (name_node, args) = match node.kind() {
            kinds::GENERIC_TYPE => (
                node.child_by_field_name("name").unwrap_or(node),
                node.child_by_field_name("type_arguments")
                    .map(|a| self.lower_type_arguments(a))
                    .unwrap_or_default(),
            ),
            _ => (node, Vec::new()),
        };
        HeritageRef {
            name: self.text(name_node).to_string(),
            type_args: args,
            range: Self::span(node),
        }
    }

    fn lower_class(&self, node: Node<'_>) -> ClassDecl {
        let mut extends = None;
        let mut implements = Vec::new();

        if let Some(heritage) = Self::named_children(node)
            .into_iter()
            .find(|c| c.kind() == kinds::CLASS_HERITAGE)
        {
            for clause in Self::named_children(heritage) {
                match clause.kind() {
                    kinds::EXTENDS_CLAUSE => {
                        if let Some(value) = clause
                            .child_by_field_name("value")
                            .or_else(|| Self::first_named(clause))
                        {
                            let mut heritage = self.lower_heritage_expr(value);
                            if let Some(args) = clause.child_by_field_name("type_arguments") {
                                heritage.type_args = self.lower_type_arguments(args);
                            }
                            extends = Some(heritage);
                        }
                    }
                    kinds::IMPLEMENTS_CLAUSE => {
                        implements.extend(
                            Self::named_children(clause)
                                .into_iter()
                                .map(|t| self.lower_heritage_expr(t)),
                        );
                    }
                    _ => {}
                }
            }
        }

        let members = node
            .child_by_field_name("body")
            .map(|body| {
                Self::named_children(body)
                    .into_iter()
                    .filter_map(|m| self.lower_class_member(m))
                    .collect()
            })
            .unwrap_or_default();

        ClassDecl {
            name: node
                .child_by_field_name("name")
                .map(|n| self.text(n).to_string()),
            extends,
            implements,
            members,
            modifiers: Modifiers::default(),
            is_abstract: node.kind() == kinds::ABSTRACT_CLASS_DECLARATION,
            range: Self::span(node),
        }
    }

    fn accessor_of(node: Node<'_>) -> Option<Accessor> {
        if Self::has_token(node, "get") {
            Some(Accessor::Get)
        } else if Self::has_token(node, "set") {
            Some(Accessor::Set)
        } else {
            None
        }
    }

    fn lower_class_member(&self, node: Node<'_>) -> Option<ClassMember> {
        let range = Self::span(node);
        let kind = match node.kind() {
            kinds::METHOD_DEFINITION => {
                let name_node = node.child_by_field_name("name")?;
                let function = self.lower_function(node);
                if self.text(name_node) == "constructor" {
                    ClassMemberKind::Constructor(function)
                } else {
                    ClassMemberKind::Method {
                        name: self.lower_property_name(name_node),
                        function,
                        is_static: Self::has_token(node, "static"),
                        accessor: Self::accessor_of(node),
                    }
                }
            }
            kinds::PUBLIC_FIELD_DEFINITION | kinds::FIELD_DEFINITION => {
                let name_node = node
                    .child_by_field_name("name")
                    .or_else(|| node.child_by_field_name("property"))?;
                ClassMemberKind::Property {
                    name: self.lower_property_name(name_node),
                    type_annotation: node
                        .child_by_field_name("type")
                        .and_then(|t| self.lower_type_annotation(t)),
                    init: node.child_by_field_name("value").map(|v| self.lower_expr(v)),
                    is_static: Self::has_token(node, "static"),
                    readonly: Self::has_token(node, "readonly"),
                }
            }
            kinds::CLASS_STATIC_BLOCK => ClassMemberKind::StaticBlock(
                node.child_by_field_name("body")
                    .map(|b| self.lower_block(b))
                    .unwrap_or_default(),
            ),
            kinds::INDEX_SIGNATURE => ClassMemberKind::IndexSignature,
            kinds::METHOD_SIGNATURE | kinds::ABSTRACT_METHOD_SIGNATURE | kinds::DECORATOR => {
                return None
            }
            other => ClassMemberKind::Unsupported(other.to_string()),
        };
        Some(ClassMember { kind, range })
    }

    fn lower_property_name(&self, node: Node<'_>) -> PropertyName {
        let text = self.text(node);
        match node.kind() {
            kinds::PROPERTY_IDENTIFIER
            | kinds::IDENTIFIER
            | kinds::SHORTHAND_PROPERTY_IDENTIFIER
            | kinds::TYPE_IDENTIFIER => PropertyName::Identifier(text.to_string()),
            kinds::PRIVATE_PROPERTY_IDENTIFIER => PropertyName::Private(text.to_string()),
            kinds::STRING => PropertyName::String(unquote(text)),
            kinds::NUMBER => match text.strip_suffix('n') {
                Some(digits) if !text.starts_with("0x") && !text.starts_with("0X") => {
                    PropertyName::BigInt(digits.to_string())
                }
                _ => PropertyName::Number(text.to_string()),
            },
            kinds::COMPUTED_PROPERTY_NAME => match Self::first_named(node) {
                Some(inner) => PropertyName::Computed(Box::new(self.lower_expr(inner))),
                None => PropertyName::Invalid(text.to_string()),
            },
            other => PropertyName::Invalid(other.to_string()),
        }
    }

    fn lower_interface(&self, node: Node<'_>) -> InterfaceDecl {
        let extends = Self::named_children(node)
            .into_iter()
            .filter(|c| c.kind() == kinds::EXTENDS_TYPE_CLAUSE)
            .flat_map(Self::named_children)
            .map(|t| self.lower_heritage_expr(t))
            .collect();

        let members = node
            .child_by_field_name("body")
            .map(|body| {
                Self::named_children(body)
                    .into_iter()
                    .filter_map(|m| self.lower_interface_member(m))
                    .collect()
            })
            .unwrap_or_default();

        InterfaceDecl {
            name: node
                .child_by_field_name("name")
                .map(|n| self.text(n).to_string()),
            extends,
            members,
            modifiers: Modifiers::default(),
            range: Self::span(node),
        }
    }

    fn signature_parts(&self, node: Node<'_>) -> (Vec<Param>, Option<TypeNode>) {
        (
            node.child_by_field_name("parameters")
                .map(|p| self.lower_params(p))
                .unwrap_or_default(),
            node.child_by_field_name("return_type")
                .and_then(|t| self.lower_type_annotation(t)),
        )
    }

    fn lower_interface_member(&self, node: Node<'_>) -> Option<InterfaceMember> {
        let range = Self::span(node);
        let kind = match node.kind() {
            kinds::PROPERTY_SIGNATURE => InterfaceMemberKind::Property {
                name: self.lower_property_name(node.child_by_field_name("name")?),
                type_annotation: node
                    .child_by_field_name("type")
                    .and_then(|t| self.lower_type_annotation(t)),
                optional: Self::has_token(node, "?"),
            },
            kinds::METHOD_SIGNATURE => {
                let (params, return_type) = self.signature_parts(node);
                InterfaceMemberKind::Method {
                    name: self.lower_property_name(node.child_by_field_name("name")?),
                    params,
                    return_type,
                }
            }
            kinds::CALL_SIGNATURE => {
                let (params, return_type) = self.signature_parts(node);
                InterfaceMemberKind::Call {
                    params,
                    return_type,
                }
            }
            kinds::CONSTRUCT_SIGNATURE => {
                let (params, return_type) = self.signature_parts(node);
                InterfaceMemberKind::Construct {
                    params,
                    return_type,
                }
            }
            kinds::INDEX_SIGNATURE => {
                let key_type = node
                    .child_by_field_name("index_type")
                    .map(|t| self.lower_type(t))
                    .or_else(|| Some(TypeNode::keyword("string")));
                let value_type = node
                    .child_by_field_name("type")
                    .and_then(|t| self.lower_type_annotation(t));
                InterfaceMemberKind::Index {
                    key_type,
                    value_type,
                }
            }
            _ => return None,
        };
        Some(InterfaceMember { kind, range })
    }

    fn lower_enum(&self, node: Node<'_>) -> EnumDecl {
        let members = node
            .child_by_field_name("body")
            .map(|body| {
                Self::named_children(body)
                    .into_iter()
                    .map(|m| {
                        let range = Self::span(m);
                        if m.kind() == kinds::ENUM_ASSIGNMENT {
                            EnumMember {
                                name: m
                                    .child_by_field_name("name")
                                    .map(|n| self.lower_property_name(n))
                                    .unwrap_or_else(|| {
                                        PropertyName::Invalid("missing name".to_string())
                                    }),
                                init: m.child_by_field_name("value").map(|v| self.lower_expr(v)),
                                range,
                            }
                        } else {
                            EnumMember {
                                name: self.lower_property_name(m),
                                init: None,
                                range,
                            }
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        EnumDecl {
            name: node
                .child_by_field_name("name")
                .map(|n| self.text(n).to_string()),
            members,
            modifiers: Modifiers::default(),
            is_const: Self::has_token(node, "const"),
            range: Self::span(node),
        }
    }

    fn lower_type_alias(&self, node: Node<'_>) -> Option<TypeAliasDecl> {
        Some(TypeAliasDecl {
            name: self.text(node.child_by_field_name("name")?).to_string(),
            ty: self.lower_type(node.child_by_field_name("value")?),
            modifiers: Modifiers::default(),
            range: Self::span(node),
        })
    }

    fn lower_import(&self, node: Node<'_>) -> ImportDecl {
        let mut decl = ImportDecl {
            source: node
                .child_by_field_name("source")
                .map(|s| unquote(self.text(s)))
                .unwrap_or_default(),
            type_only: Self::has_token(node, "type"),
            default: None,
            namespace: None,
            named: Vec::new(),
            range: Self::span(node),
        };

        for child in Self::named_children(node) {
            match child.kind() {
                kinds::IMPORT_CLAUSE => {
                    for part in Self::named_children(child) {
                        match part.kind() {
                            kinds::IDENTIFIER => decl.default = Some(self.text(part).to_string()),
                            kinds::NAMESPACE_IMPORT => {
                                decl.namespace = Self::first_named(part)
                                    .map(|id| self.text(id).to_string());
                            }
                            kinds::NAMED_IMPORTS => {
                                for spec in Self::named_children(part)
                                    .into_iter()
                                    .filter(|s| s.kind() == kinds::IMPORT_SPECIFIER)
                                {
                                    let Some(name) = spec.child_by_field_name("name") else {
                                        continue;
                                    };
                                    let imported = unquote(self.text(name));
                                    let local = spec
                                        .child_by_field_name("alias")
                                        .map(|a| self.text(a).to_string())
                                        .unwrap_or_else(|| imported.clone());
                                    decl.named.push(ImportSpecifier {
                                        imported,
                                        local,
                                        type_only: Self::has_token(spec, "type"),
                                    });
                                }
                            }
                            _ => {}
                        }
                    }
                }
                // import x = require("m")
                kinds::IMPORT_REQUIRE_CLAUSE => {
                    for part in Self::named_children(child) {
                        match part.kind() {
                            kinds::IDENTIFIER => decl.default = Some(self.text(part).to_string()),
                            kinds::STRING => decl.source = unquote(self.text(part)),
                            _ => {}
                        }
                    }
                }
                _ => {}
            }
        }
        decl
    }

    fn lower_export(&self, node: Node<'_>) -> Stmt {
        let range = Self::span(node);
        let is_default = Self::has_token(node, "default");

        if let Some(declaration) = node.child_by_field_name("declaration") {
            let mut stmt = self.lower_statement(declaration);
            let modifiers = Modifiers {
                export: true,
                default_export: is_default,
                declare: declaration.kind() == kinds::AMBIENT_DECLARATION,
            };
            match &mut stmt.kind {
                StmtKind::Variable(decl) => decl.modifiers = modifiers,
                StmtKind::Function(decl) => decl.modifiers = modifiers,
                StmtKind::Class(decl) => decl.modifiers = modifiers,
                StmtKind::Interface(decl) => decl.modifiers = modifiers,
                StmtKind::Enum(decl) => decl.modifiers = modifiers,
                StmtKind::TypeAlias(decl) => decl.modifiers = modifiers,
                _ => {}
            }
            stmt.range = range;
            return stmt;
        }

        let source = node
            .child_by_field_name("source")
            .map(|s| unquote(self.text(s)));

        if is_default {
            let value = node
                .child_by_field_name("value")
                .or_else(|| Self::first_named(node));
            let kind = match value {
                Some(v) => StmtKind::Export(ExportDecl::Default(self.lower_expr(v))),
                None => StmtKind::Unsupported(node.kind().to_string()),
            };
            return Stmt::new(kind, range);
        }

        if let Some(clause) = Self::named_children(node)
            .into_iter()
            .find(|c| c.kind() == kinds::EXPORT_CLAUSE)
        {
            let specifiers = Self::named_children(clause)
                .into_iter()
                .filter(|s| s.kind() == kinds::EXPORT_SPECIFIER)
                .filter_map(|spec| {
                    let local = unquote(self.text(spec.child_by_field_name("name")?));
                    let exported = spec
                        .child_by_field_name("alias")
                        .map(|a| unquote(self.text(a)))
                        .unwrap_or_else(|| local.clone());
                    Some(ExportSpecifier { local, exported })
                })
                .collect();
            return Stmt::new(
                StmtKind::Export(ExportDecl::Named {
                    specifiers,
                    source,
                    type_only: Self::has_token(node, "type"),
                }),
                range,
            );
        }

        if Self::has_token(node, "*") {
            let alias = Self::named_children(node)
                .into_iter()
                .find(|c| c.kind() == kinds::NAMESPACE_EXPORT)
                .and_then(Self::first_named)
                .map(|id| unquote(self.text(id)));
            return Stmt::new(
                StmtKind::Export(ExportDecl::All {
                    source: source.unwrap_or_default(),
                    alias,
                }),
                range,
            );
        }

        // export = expr
        if Self::has_token(node, "=") {
            if let Some(value) = Self::first_named(node) {
                return Stmt::new(
                    StmtKind::Export(ExportDecl::Assignment(self.lower_expr(value))),
                    range,
                );
            }
        }

        Stmt::new(StmtKind::Unsupported(node.kind().to_string()), range)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Expressions
    // ═══════════════════════════════════════════════════════════════════

    fn lower_expr(&self, node: Node<'_>) -> Expr {
        let range = Self::span(node);
        let boxed = |n| self.boxed_expr(n, range);

        let kind = match node.kind() {
            kinds::IDENTIFIER | kinds::SHORTHAND_PROPERTY_IDENTIFIER => {
                match self.text(node) {
                    "undefined" => ExprKind::Undefined,
                    name => ExprKind::Identifier(name.to_string()),
                }
            }
            kinds::UNDEFINED => ExprKind::Undefined,
            kinds::THIS => ExprKind::This,
            kinds::SUPER => ExprKind::Super,
            kinds::NUMBER => {
                let text = self.text(node);
                match text.strip_suffix('n') {
                    Some(digits) if !text.starts_with("0x") && !text.starts_with("0X") => {
                        ExprKind::BigInt(digits.to_string())
                    }
                    _ => ExprKind::Number(text.to_string()),
                }
            }
            kinds::STRING => ExprKind::String(unquote(self.text(node))),
            kinds::TEMPLATE_STRING => ExprKind::Template(self.lower_template(node)),
            kinds::REGEX => ExprKind::Regex(self.text(node).to_string()),
            kinds::TRUE => ExprKind::Boolean(true),
            kinds::FALSE => ExprKind::Boolean(false),
            kinds::NULL => ExprKind::Null,
            kinds::ARRAY => ExprKind::Array(self.lower_array_literal(node)),
            kinds::OBJECT => ExprKind::Object(self.lower_object_literal(node)),
            kinds::FUNCTION_EXPRESSION
            | kinds::FUNCTION
            | kinds::GENERATOR_FUNCTION
            | kinds::ARROW_FUNCTION => ExprKind::Function(Box::new(self.lower_function(node))),
            kinds::CLASS => ExprKind::Class(Box::new(self.lower_class(node))),
            kinds::UNARY_EXPRESSION => {
                let op = node
                    .child_by_field_name("operator")
                    .and_then(|op| UnaryOperator::from_token(op.kind()));
                match op {
                    Some(op) => ExprKind::Unary {
                        op,
                        arg: boxed(node.child_by_field_name("argument")),
                    },
                    None => ExprKind::Unsupported(self.text(node).to_string()),
                }
            }
            kinds::UPDATE_EXPRESSION => {
                let op_node = node.child_by_field_name("operator");
                let op = match op_node.map(|o| o.kind()) {
                    Some("--") => UpdateOperator::Decrement,
                    _ => UpdateOperator::Increment,
                };
                let prefix = node
                    .child(0)
                    .map(|first| first.kind() == "++" || first.kind() == "--")
                    .unwrap_or(false);
                ExprKind::Update {
                    op,
                    prefix,
                    arg: boxed(node.child_by_field_name("argument")),
                }
            }
            kinds::BINARY_EXPRESSION => {
                let op = node
                    .child_by_field_name("operator")
                    .and_then(|op| BinaryOperator::from_token(op.kind()));
                match op {
                    Some(op) => ExprKind::Binary {
                        op,
                        left: boxed(node.child_by_field_name("left")),
                        right: boxed(node.child_by_field_name("right")),
                    },
                    None => ExprKind::Unsupported(node.kind().to_string()),
                }
            }
            kinds::ASSIGNMENT_EXPRESSION => ExprKind::Assign {
                op: AssignOperator::Assign,
                left: boxed(node.child_by_field_name("left")),
                right: boxed(node.child_by_field_name("right")),
            },
            kinds::AUGMENTED_ASSIGNMENT_EXPRESSION => {
                let op = node
                    .child_by_field_name("operator")
                    .and_then(|op| AssignOperator::from_token(op.kind()));
                match op {
                    Some(op) => ExprKind::Assign {
                        op,
                        left: boxed(node.child_by_field_name("left")),
                        right: boxed(node.child_by_field_name("right")),
                    },
                    None => ExprKind::Unsupported(node.kind().to_string()),
                }
            }
            kinds::TERNARY_EXPRESSION => ExprKind::Conditional {
                test: boxed(node.child_by_field_name("condition")),
                consequent: boxed(node.child_by_field_name("consequence")),
                alternate: boxed(node.child_by_field_name("alternative")),
            },
            kinds::CALL_EXPRESSION => {
                let callee = boxed(node.child_by_field_name("function"));
                match node.child_by_field_name("arguments") {
                    Some(args) if args.kind() == kinds::TEMPLATE_STRING => ExprKind::TaggedTemplate {
                        tag: callee,
                        template: self.lower_template(args),
                    },
                    args => ExprKind::Call {
                        callee,
                        args: args.map(|a| self.lower_arguments(a)).unwrap_or_default(),
                        optional: Self::has_child_kind(node, kinds::OPTIONAL_CHAIN),
                    },
                }
            }
            kinds::NEW_EXPRESSION => ExprKind::New {
                callee: boxed(node.child_by_field_name("constructor")),
                args: node
                    .child_by_field_name("arguments")
                    .map(|a| self.lower_arguments(a))
                    .unwrap_or_default(),
            },
            kinds::MEMBER_EXPRESSION => ExprKind::Member {
                object: boxed(node.child_by_field_name("object")),
                property: node
                    .child_by_field_name("property")
                    .map(|p| self.text(p).to_string())
                    .unwrap_or_default(),
                optional: Self::has_child_kind(node, kinds::OPTIONAL_CHAIN),
            },
            kinds::SUBSCRIPT_EXPRESSION => ExprKind::Index {
                object: boxed(node.child_by_field_name("object")),
                index: boxed(node.child_by_field_name("index")),
                optional: Self::has_child_kind(node, kinds::OPTIONAL_CHAIN),
            },
            kinds::PARENTHESIZED_EXPRESSION => ExprKind::Paren(boxed(Self::first_named(node))),
            kinds::SEQUENCE_EXPRESSION => {
                let mut parts = Self::named_children(node)
                    .into_iter()
                    .map(|c| self.lower_expr(c));
                let Some(first) = parts.next() else {
                    return self.unsupported_expr(node);
                };
                let folded = parts.fold(first, |left, right| {
                    Expr::new(
                        ExprKind::Binary {
                            op: BinaryOperator::Comma,
                            left: Box::new(left),
                            right: Box::new(right),
                        },
                        range,
                    )
                });
                return folded;
            }
            kinds::AWAIT_EXPRESSION => ExprKind::Await(boxed(Self::first_named(node))),
            kinds::AS_EXPRESSION | kinds::SATISFIES_EXPRESSION => {
                let children = Self::named_children(node);
                ExprKind::TypeAssertion {
                    expr: boxed(children.first().copied()),
                    ty: children.get(1).map(|t| self.lower_type(*t)),
                }
            }
            kinds::TYPE_ASSERTION => {
                let children = Self::named_children(node);
                let ty = children
                    .iter()
                    .find(|c| c.kind() == kinds::TYPE_ARGUMENTS)
                    .and_then(|args| self.lower_type_arguments(*args).into_iter().next());
                ExprKind::TypeAssertion {
                    expr: boxed(
                        children
                            .iter()
                            .find(|c| c.kind() != kinds::TYPE_ARGUMENTS)
                            .copied(),
                    ),
                    ty,
                }
            }
            kinds::NON_NULL_EXPRESSION => ExprKind::NonNull(boxed(Self::first_named(node))),
            other => ExprKind::Unsupported(other.to_string()),
        };
        Expr::new(kind, range)
    }

    fn boxed_expr(&self, node: Option<Node<'_>>, range: Span) -> Box<Expr> {
        Box::new(match node {
            Some(node) => self.lower_expr(node),
            None => Expr::new(ExprKind::Unsupported("missing operand".to_string()), range),
        })
    }

    fn lower_arguments(&self, node: Node<'_>) -> Vec<Argument> {
        Self::named_children(node)
            .into_iter()
            .map(|arg| {
                if arg.kind() == kinds::SPREAD_ELEMENT {
                    Argument {
                        expr: Self::first_named(arg)
                            .map(|e| self.lower_expr(e))
                            .unwrap_or_else(|| self.unsupported_expr(arg)),
                        spread: true,
                    }
                } else {
                    Argument {
                        expr: self.lower_expr(arg),
                        spread: false,
                    }
                }
            })
            .collect()
    }

    fn lower_template(&self, node: Node<'_>) -> TemplateLiteral {
        let mut quasis = Vec::new();
        let mut exprs = Vec::new();
        // skip the opening backtick
        let mut cursor = node.start_byte() + 1;
        for child in Self::named_children(node) {
            if child.kind() != kinds::TEMPLATE_SUBSTITUTION {
                continue;
            }
            quasis.push(unescape(
                self.source.get(cursor..child.start_byte()).unwrap_or(""),
            ));
            exprs.push(
                Self::first_named(child)
                    .map(|e| self.lower_expr(e))
                    .unwrap_or_else(|| self.unsupported_expr(child)),
            );
            cursor = child.end_byte();
        }
        let end = node.end_byte().saturating_sub(1).max(cursor);
        quasis.push(unescape(self.source.get(cursor..end).unwrap_or("")));
        TemplateLiteral { quasis, exprs }
    }

    fn lower_array_literal(&self, node: Node<'_>) -> Vec<Option<ArrayElement>> {
        let mut elements = Vec::new();
        let mut expecting = true;
        for child in Self::all_children(node) {
            match child.kind() {
                "[" | kinds::COMMENT => {}
                "]" => break,
                "," => {
                    if expecting {
                        elements.push(None);
                    }
                    expecting = true;
                }
                _ if child.is_named() => {
                    let element = if child.kind() == kinds::SPREAD_ELEMENT {
                        ArrayElement {
                            expr: Self::first_named(child)
                                .map(|e| self.lower_expr(e))
                                .unwrap_or_else(|| self.unsupported_expr(child)),
                            spread: true,
                        }
                    } else {
                        ArrayElement {
                            expr: self.lower_expr(child),
                            spread: false,
                        }
                    };
                    elements.push(Some(element));
                    expecting = false;
                }
                _ => {}
            }
        }
        elements
    }

    fn lower_object_literal(&self, node: Node<'_>) -> Vec<ObjectProperty> {
        Self::named_children(node)
            .into_iter()
            .filter_map(|prop| {
                let range = Self::span(prop);
                let property = match prop.kind() {
                    kinds::PAIR => ObjectProperty::KeyValue {
                        key: self.lower_property_name(prop.child_by_field_name("key")?),
                        value: self.lower_expr(prop.child_by_field_name("value")?),
                        range,
                    },
                    kinds::SHORTHAND_PROPERTY_IDENTIFIER => ObjectProperty::Shorthand {
                        name: self.text(prop).to_string(),
                        range,
                    },
                    kinds::SPREAD_ELEMENT => ObjectProperty::Spread {
                        expr: self.lower_expr(Self::first_named(prop)?),
                        range,
                    },
                    kinds::METHOD_DEFINITION => ObjectProperty::Method {
                        key: self.lower_property_name(prop.child_by_field_name("name")?),
                        function: self.lower_function(prop),
                        accessor: Self::accessor_of(prop),
                        range,
                    },
                    _ => return None,
                };
                Some(property)
            })
            .collect()
    }

    // ═══════════════════════════════════════════════════════════════════
    // Types
    // ═══════════════════════════════════════════════════════════════════

    /// `: T` annotation wrapper
    fn lower_type_annotation(&self, node: Node<'_>) -> Option<TypeNode> {
        if node.kind() == kinds::TYPE_ANNOTATION {
            Self::first_named(node).map(|t| self.lower_type(t))
        } else {
            Some(self.lower_type(node))
        }
    }

    fn lower_type_arguments(&self, node: Node<'_>) -> Vec<TypeNode> {
        Self::named_children(node)
            .into_iter()
            .map(|t| self.lower_type(t))
            .collect()
    }

    fn flatten_type(&self, node: Node<'_>, kind: &str, out: &mut Vec<TypeNode>) {
        for child in Self::named_children(node) {
            if child.kind() == kind {
                self.flatten_type(child, kind, out);
            } else {
                out.push(self.lower_type(child));
            }
        }
    }

    fn lower_type(&self, node: Node<'_>) -> TypeNode {
        let range = Self::span(node);
        let text = self.text(node);
        let kind = match node.kind() {
            kinds::PREDEFINED_TYPE => TypeNodeKind::Keyword(text.to_string()),
            kinds::TYPE_IDENTIFIER | kinds::NESTED_TYPE_IDENTIFIER | kinds::IDENTIFIER => {
                TypeNodeKind::Reference {
                    name: text.to_string(),
                    args: Vec::new(),
                }
            }
            kinds::GENERIC_TYPE => TypeNodeKind::Reference {
                name: node
                    .child_by_field_name("name")
                    .map(|n| self.text(n).to_string())
                    .unwrap_or_default(),
                args: node
                    .child_by_field_name("type_arguments")
                    .map(|a| self.lower_type_arguments(a))
                    .unwrap_or_default(),
            },
            kinds::ARRAY_TYPE => match Self::first_named(node) {
                Some(element) => TypeNodeKind::Array(Box::new(self.lower_type(element))),
                None => TypeNodeKind::Unsupported(node.kind().to_string()),
            },
            kinds::UNION_TYPE => {
                let mut members = Vec::new();
                self.flatten_type(node, kinds::UNION_TYPE, &mut members);
                TypeNodeKind::Union(members)
            }
            kinds::INTERSECTION_TYPE => {
                let mut members = Vec::new();
                self.flatten_type(node, kinds::INTERSECTION_TYPE, &mut members);
                TypeNodeKind::Intersection(members)
            }
            kinds::TUPLE_TYPE => TypeNodeKind::Tuple(
                Self::named_children(node)
                    .into_iter()
                    .map(|t| self.lower_type(t))
                    .collect(),
            ),
            kinds::FUNCTION_TYPE => {
                let params = node
                    .child_by_field_name("parameters")
                    .map(|p| {
                        self.lower_params(p)
                            .into_iter()
                            .map(|param| {
                                param
                                    .type_annotation
                                    .unwrap_or_else(|| TypeNode::keyword("any"))
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                let return_type = node
                    .child_by_field_name("return_type")
                    .map(|t| self.lower_type(t))
                    .unwrap_or_else(|| TypeNode::keyword("any"));
                TypeNodeKind::Function {
                    params,
                    return_type: Box::new(return_type),
                }
            }
            kinds::LITERAL_TYPE => match Self::first_named(node) {
                Some(literal) => {
                    let literal_text = self.text(literal);
                    match literal.kind() {
                        kinds::NUMBER | kinds::UNARY_EXPRESSION => {
                            TypeNodeKind::Literal(LiteralType::Number(literal_text.to_string()))
                        }
                        kinds::STRING => TypeNodeKind::Literal(LiteralType::String(unquote(literal_text))),
                        kinds::TRUE => TypeNodeKind::Literal(LiteralType::Boolean(true)),
                        kinds::FALSE => TypeNodeKind::Literal(LiteralType::Boolean(false)),
                        kinds::NULL => TypeNodeKind::Literal(LiteralType::Null),
                        kinds::UNDEFINED => TypeNodeKind::Literal(LiteralType::Undefined),
                        other => TypeNodeKind::Unsupported(other.to_string()),
                    }
                }
                None => TypeNodeKind::Unsupported(node.kind().to_string()),
            },
            kinds::PARENTHESIZED_TYPE => match Self::first_named(node) {
                Some(inner) => TypeNodeKind::Parenthesized(Box::new(self.lower_type(inner))),
                None => TypeNodeKind::Unsupported(node.kind().to_string()),
            },
            kinds::OPTIONAL_TYPE => match Self::first_named(node) {
                Some(inner) => TypeNodeKind::Optional(Box::new(self.lower_type(inner))),
                None => TypeNodeKind::Unsupported(node.kind().to_string()),
            },
            kinds::READONLY_TYPE => match Self::first_named(node) {
                Some(inner) => return self.lower_type(inner),
                None => TypeNodeKind::Unsupported(node.kind().to_string()),
            },
            kinds::OBJECT_TYPE => TypeNodeKind::ObjectLiteral,
            kinds::TYPE_QUERY => TypeNodeKind::TypeQuery(
                text.trim_start_matches("typeof").trim().to_string(),
            ),
            kinds::THIS_TYPE => TypeNodeKind::This,
            kinds::TYPE_ANNOTATION => match Self::first_named(node) {
                Some(inner) => return self.lower_type(inner),
                None => TypeNodeKind::Unsupported(node.kind().to_string()),
            },
            other => TypeNodeKind::Unsupported(other.to_string()),
        };
        TypeNode::new(kind, range)
    }
}

/// Strip string quotes and decode the common escapes
fn unquote(text: &str) -> String {
    let inner = if text.len() >= 2
        && ((text.starts_with('"') && text.ends_with('"'))
            || (text.starts_with('\'') && text.ends_with('\'')))
    {
        &text[1..text.len() - 1]
    } else {
        text
    };
    unescape(inner)
}

fn unescape(text: &str) -> String {
    if !text.contains('\\') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('\n') => {}
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Program {
        parse_typescript(source).unwrap().program
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("\"abc\""), "abc");
        assert_eq!(unquote("'a\\'b'"), "a'b");
        assert_eq!(unquote("'line\\n'"), "line\n");
    }

    #[test]
    fn test_parse_variable_declaration() {
        let program = parse("let a = 1;");
        assert_eq!(program.body.len(), 1);
        match &program.body[0].kind {
            StmtKind::Variable(decl) => {
                assert_eq!(decl.kind, DeclarationKind::Let);
                assert_eq!(decl.declarators.len(), 1);
                assert_eq!(
                    decl.declarators[0].target,
                    Some(BindingTarget::Identifier("a".to_string()))
                );
                assert!(matches!(
                    decl.declarators[0].init.as_ref().map(|e| &e.kind),
                    Some(ExprKind::Number(n)) if n == "1"
                ));
            }
            other => panic!("expected variable declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_array_pattern_holes() {
        let program = parse("const [, b = 2, ...rest] = xs;");
        let StmtKind::Variable(decl) = &program.body[0].kind else {
            panic!("expected declaration");
        };
        let Some(BindingTarget::Array(pattern)) = &decl.declarators[0].target else {
            panic!("expected array pattern");
        };
        assert_eq!(pattern.elements.len(), 3);
        assert!(pattern.elements[0].is_none());
        assert!(matches!(
            &pattern.elements[1],
            Some(ArrayPatternElement::Single { default: Some(_), .. })
        ));
        assert!(matches!(
            &pattern.elements[2],
            Some(ArrayPatternElement::Rest { .. })
        ));
    }

    #[test]
    fn test_parse_class_with_heritage() {
        let program = parse("class A extends B implements C { x = 1; static y: number; m() {} }");
        let StmtKind::Class(class) = &program.body[0].kind else {
            panic!("expected class");
        };
        assert_eq!(class.name.as_deref(), Some("A"));
        assert_eq!(class.extends.as_ref().map(|h| h.name.as_str()), Some("B"));
        assert_eq!(class.implements.len(), 1);
        assert_eq!(class.members.len(), 3);
        assert!(matches!(
            &class.members[1].kind,
            ClassMemberKind::Property { is_static: true, .. }
        ));
    }

    #[test]
    fn test_parse_template_quasis() {
        let program = parse("let s = `a${x}b${y}`;");
        let StmtKind::Variable(decl) = &program.body[0].kind else {
            panic!("expected declaration");
        };
        let Some(ExprKind::Template(template)) = decl.declarators[0].init.as_ref().map(|e| &e.kind)
        else {
            panic!("expected template");
        };
        assert_eq!(template.quasis, vec!["a", "b", ""]);
        assert_eq!(template.exprs.len(), 2);
    }

    #[test]
    fn test_parse_compound_assignment_and_update() {
        let program = parse("x += 2; i++; --j;");
        assert!(matches!(
            &program.body[0].kind,
            StmtKind::Expression(Expr {
                kind: ExprKind::Assign {
                    op: AssignOperator::Compound(BinaryOperator::Add),
                    ..
                },
                ..
            })
        ));
        assert!(matches!(
            &program.body[1].kind,
            StmtKind::Expression(Expr {
                kind: ExprKind::Update { prefix: false, .. },
                ..
            })
        ));
        assert!(matches!(
            &program.body[2].kind,
            StmtKind::Expression(Expr {
                kind: ExprKind::Update {
                    prefix: true,
                    op: UpdateOperator::Decrement,
                    ..
                },
                ..
            })
        ));
    }

    #[test]
    fn test_parse_switch_cases() {
        let program = parse("switch (a) { case 1: x = 1; default: x = 2; case 3: break; }");
        let StmtKind::Switch(switch) = &program.body[0].kind else {
            panic!("expected switch");
        };
        assert_eq!(switch.cases.len(), 3);
        assert!(switch.cases[1].test.is_none());
        assert_eq!(switch.cases[0].body.len(), 1);
    }

    #[test]
    fn test_parse_generic_type_annotation() {
        let program = parse("let p: Promise<number[]>;");
        let StmtKind::Variable(decl) = &program.body[0].kind else {
            panic!("expected declaration");
        };
        let Some(TypeNode {
            kind: TypeNodeKind::Reference { name, args },
            ..
        }) = &decl.declarators[0].type_annotation
        else {
            panic!("expected reference type");
        };
        assert_eq!(name, "Promise");
        assert!(matches!(args[0].kind, TypeNodeKind::Array(_)));
    }

    #[test]
    fn test_syntax_errors_are_reported() {
        let parsed = parse_typescript("let = ;").unwrap();
        assert!(!parsed.syntax_errors.is_empty());
        assert_eq!(parsed.syntax_errors[0].tag, DiagnosticTag::SyntaxError);
    }

    #[test]
    fn test_export_modifiers() {
        let program = parse("export const a = 1; export default function f() {}");
        let StmtKind::Variable(decl) = &program.body[0].kind else {
            panic!("expected declaration");
        };
        assert!(decl.modifiers.export);
        match &program.body[1].kind {
            StmtKind::Function(func) => assert!(func.modifiers.default_export),
            StmtKind::Export(ExportDecl::Default(_)) => {}
            other => panic!("expected default export, got {:?}", other),
        }
    }
}
