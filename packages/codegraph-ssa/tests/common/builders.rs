//! Syntax tree builders
//!
//! Build `Program`s directly, without the parser, for the core SSA
//! properties.

use codegraph_ssa::features::syntax::domain::ast::{
    BindingTarget, ClassDecl, ClassMember, ClassMemberKind, DeclarationKind, Expr, ExprKind,
    ForInit, ForStmt, FunctionBody, FunctionDecl, HeritageRef, IfStmt, Modifiers, ObjectPattern,
    ObjectPatternProperty, ObjectProperty, Program, PropertyName, Stmt, StmtKind,
    VariableDeclaration, VariableDeclarator,
};
use codegraph_ssa::features::syntax::domain::operators::{BinaryOperator, UpdateOperator};
use codegraph_ssa::{build_from_ast, BuildConfig, Span, SsaUnit};

/// Lower `body` with the default configuration
pub fn build(body: Vec<Stmt>) -> SsaUnit {
    build_with(body, &BuildConfig::default())
}

pub fn build_with(body: Vec<Stmt>, config: &BuildConfig) -> SsaUnit {
    build_from_ast(&program(body), config)
}

pub fn program(body: Vec<Stmt>) -> Program {
    Program {
        body,
        range: Span::zero(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Statements
// ═══════════════════════════════════════════════════════════════════════════

pub fn let_(name: &str, init: Expr) -> Stmt {
    Stmt::declare(DeclarationKind::Let, name, Some(init))
}

/// `export let name = init;`
pub fn export_let(name: &str, init: Expr) -> Stmt {
    let mut stmt = let_(name, init);
    if let StmtKind::Variable(decl) = &mut stmt.kind {
        decl.modifiers = Modifiers {
            export: true,
            ..Modifiers::default()
        };
    }
    stmt
}

pub fn assign(name: &str, value: Expr) -> Stmt {
    Stmt::expr(Expr::assign(Expr::ident(name), value))
}

pub fn block(body: Vec<Stmt>) -> Stmt {
    Stmt::new(StmtKind::Block(body), Span::zero())
}

pub fn if_else(cond: Expr, then: Vec<Stmt>, otherwise: Option<Vec<Stmt>>) -> Stmt {
    Stmt::new(
        StmtKind::If(IfStmt {
            cond,
            consequent: Box::new(block(then)),
            alternate: otherwise.map(|body| Box::new(block(body))),
        }),
        Span::zero(),
    )
}

/// `if (c0) {a = v0} else if (c1) {a = v1} ... else {a = last}`
pub fn if_chain(target: &str, values: &[i64]) -> Stmt {
    let (last, arms) = match values.split_last() {
        Some(split) => split,
        None => return Stmt::new(StmtKind::Empty, Span::zero()),
    };
    let mut stmt = block(vec![assign(target, num(*last))]);
    for (index, value) in arms.iter().enumerate().rev() {
        stmt = Stmt::new(
            StmtKind::If(IfStmt {
                cond: Expr::ident(&format!("c{}", index)),
                consequent: Box::new(block(vec![assign(target, num(*value))])),
                alternate: Some(Box::new(stmt)),
            }),
            Span::zero(),
        );
    }
    stmt
}

/// `for (let name = start; name < end; name++) { body }`
pub fn for_let(name: &str, start: i64, end: i64, body: Vec<Stmt>) -> Stmt {
    Stmt::new(
        StmtKind::For(ForStmt {
            init: Some(ForInit::Declaration(VariableDeclaration {
                kind: DeclarationKind::Let,
                declarators: vec![VariableDeclarator {
                    target: Some(BindingTarget::Identifier(name.into())),
                    type_annotation: None,
                    init: Some(num(start)),
                    range: Span::zero(),
                }],
                modifiers: Modifiers::default(),
                range: Span::zero(),
            })),
            cond: Some(Expr::binary(BinaryOperator::Lt, Expr::ident(name), num(end))),
            update: Some(Expr::new(
                ExprKind::Update {
                    op: UpdateOperator::Increment,
                    prefix: false,
                    arg: Box::new(Expr::ident(name)),
                },
                Span::zero(),
            )),
            body: Box::new(block(body)),
        }),
        Span::zero(),
    )
}

/// `path(args);` where `path` may be dotted (`console.log`)
pub fn call_stmt(path: &str, args: Vec<Expr>) -> Stmt {
    Stmt::expr(Expr::call(path_expr(path), args))
}

/// `let { key = default } = init;`
pub fn let_object_default(key: &str, default: Expr, init: Expr) -> Stmt {
    Stmt::new(
        StmtKind::Variable(VariableDeclaration {
            kind: DeclarationKind::Let,
            declarators: vec![VariableDeclarator {
                target: Some(BindingTarget::Object(ObjectPattern {
                    properties: vec![ObjectPatternProperty::Shorthand {
                        name: key.into(),
                        default: Some(default),
                        range: Span::zero(),
                    }],
                    range: Span::zero(),
                })),
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

/// `class name extends parent { method() {} ... }`
pub fn class_decl(name: &str, parent: Option<&str>, methods: &[&str]) -> Stmt {
    Stmt::new(
        StmtKind::Class(ClassDecl {
            name: Some(name.into()),
            extends: parent.map(|p| HeritageRef {
                name: p.into(),
                type_args: vec![],
                range: Span::zero(),
            }),
            implements: vec![],
            members: methods
                .iter()
                .map(|method| ClassMember {
                    kind: ClassMemberKind::Method {
                        name: PropertyName::Identifier((*method).into()),
                        function: function_decl(vec![]),
                        is_static: false,
                        accessor: None,
                    },
                    range: Span::zero(),
                })
                .collect(),
            modifiers: Modifiers::default(),
            is_abstract: false,
            range: Span::zero(),
        }),
        Span::zero(),
    )
}

pub fn function_decl(body: Vec<Stmt>) -> FunctionDecl {
    FunctionDecl {
        name: None,
        params: vec![],
        return_type: None,
        body: FunctionBody::Block(body),
        is_async: false,
        is_arrow: false,
        is_generator: false,
        modifiers: Modifiers::default(),
        range: Span::zero(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Expressions
// ═══════════════════════════════════════════════════════════════════════════

pub fn num(value: i64) -> Expr {
    Expr::number(&value.to_string())
}

/// `a.b.c` as nested member expressions
pub fn path_expr(path: &str) -> Expr {
    let mut parts = path.split('.');
    let head = Expr::ident(parts.next().unwrap_or(path));
    parts.fold(head, Expr::member)
}

/// `{ key: value, ... }`
pub fn object(entries: Vec<(&str, Expr)>) -> Expr {
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

/// `(name = value)` used as an expression
pub fn assign_expr(name: &str, value: Expr) -> Expr {
    Expr::new(
        ExprKind::Paren(Box::new(Expr::assign(Expr::ident(name), value))),
        Span::zero(),
    )
}
