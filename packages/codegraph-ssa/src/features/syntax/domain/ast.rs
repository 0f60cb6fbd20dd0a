//! JavaScript/TypeScript syntax tree
//!
//! Produced once by a parser adapter and never mutated afterwards. Every node
//! category is a closed enum so the lowering visitors match exhaustively.

use crate::shared::models::Span;

use super::operators::{AssignOperator, BinaryOperator, UnaryOperator, UpdateOperator};

// ═══════════════════════════════════════════════════════════════════════════
// Program & statements
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub body: Vec<Stmt>,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Expression(Expr),
    Variable(VariableDeclaration),
    Function(FunctionDecl),
    Class(ClassDecl),
    Interface(InterfaceDecl),
    Enum(EnumDecl),
    TypeAlias(TypeAliasDecl),
    Import(ImportDecl),
    Export(ExportDecl),
    Block(Vec<Stmt>),
    If(IfStmt),
    For(ForStmt),
    ForIn(ForInStmt),
    While { cond: Expr, body: Box<Stmt> },
    DoWhile { body: Box<Stmt>, cond: Expr },
    Return(Option<Expr>),
    Break(Option<String>),
    Continue(Option<String>),
    Labeled { label: String, body: Box<Stmt> },
    Switch(SwitchStmt),
    Try(TryStmt),
    Throw(Expr),
    Empty,
    Debugger,
    With { object: Expr, body: Box<Stmt> },
    /// Node kind the adapter does not lower (raw kind name)
    Unsupported(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub cond: Expr,
    pub consequent: Box<Stmt>,
    pub alternate: Option<Box<Stmt>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    Declaration(VariableDeclaration),
    Expression(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub init: Option<ForInit>,
    pub cond: Option<Expr>,
    pub update: Option<Expr>,
    pub body: Box<Stmt>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterationKind {
    /// `for (k in obj)`
    In,
    /// `for (v of iterable)`
    Of,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForInLeft {
    Declaration {
        kind: DeclarationKind,
        target: BindingTarget,
    },
    Expression(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForInStmt {
    pub left: ForInLeft,
    pub right: Expr,
    pub body: Box<Stmt>,
    pub iteration: IterationKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStmt {
    pub discriminant: Expr,
    pub cases: Vec<SwitchCase>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    /// `None` for `default:`
    pub test: Option<Expr>,
    pub body: Vec<Stmt>,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TryStmt {
    pub block: Vec<Stmt>,
    pub handler: Option<CatchClause>,
    pub finalizer: Option<Vec<Stmt>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    pub param: Option<BindingTarget>,
    pub body: Vec<Stmt>,
    pub range: Span,
}

// ═══════════════════════════════════════════════════════════════════════════
// Declarations
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclarationKind {
    Var,
    Let,
    Const,
    /// Anything else the parser produced in modifier position
    Other(String),
}

impl DeclarationKind {
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword {
            "var" => Self::Var,
            "let" => Self::Let,
            "const" => Self::Const,
            other => Self::Other(other.to_string()),
        }
    }

    /// `let` and `const` bind in the enclosing block
    pub fn is_block_scoped(&self) -> bool {
        matches!(self, Self::Let | Self::Const)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub export: bool,
    pub default_export: bool,
    pub declare: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    pub kind: DeclarationKind,
    pub declarators: Vec<VariableDeclarator>,
    pub modifiers: Modifiers,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclarator {
    /// `None` when the parser recovered a declarator without a name
    pub target: Option<BindingTarget>,
    pub type_annotation: Option<TypeNode>,
    pub init: Option<Expr>,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BindingTarget {
    Identifier(String),
    Object(ObjectPattern),
    Array(ArrayPattern),
    /// Target the lowering cannot bind (raw kind name)
    Invalid(String),
}

impl BindingTarget {
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Self::Identifier(name) => Some(name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectPattern {
    pub properties: Vec<ObjectPatternProperty>,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectPatternProperty {
    /// `{ key: target = default }`
    KeyValue {
        key: PropertyName,
        value: BindingTarget,
        default: Option<Expr>,
        range: Span,
    },
    /// `{ name = default }`
    Shorthand {
        name: String,
        default: Option<Expr>,
        range: Span,
    },
    /// `{ ...rest }`
    Rest { target: BindingTarget, range: Span },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayPattern {
    /// `None` marks a hole (`[, b]`)
    pub elements: Vec<Option<ArrayPatternElement>>,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArrayPatternElement {
    Single {
        target: BindingTarget,
        default: Option<Expr>,
        range: Span,
    },
    Rest { target: BindingTarget, range: Span },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Option<String>,
    pub params: Vec<Param>,
    pub return_type: Option<TypeNode>,
    pub body: FunctionBody,
    pub is_async: bool,
    pub is_arrow: bool,
    pub is_generator: bool,
    pub modifiers: Modifiers,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FunctionBody {
    Block(Vec<Stmt>),
    /// Arrow function with an expression body
    Expression(Box<Expr>),
    /// Overload signature or ambient declaration
    Absent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accessibility {
    Public,
    Private,
    Protected,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub target: BindingTarget,
    pub type_annotation: Option<TypeNode>,
    pub default: Option<Expr>,
    pub rest: bool,
    pub optional: bool,
    pub accessibility: Option<Accessibility>,
    pub readonly: bool,
    pub range: Span,
}

impl Param {
    /// Constructor parameter that also declares a member
    pub fn is_parameter_property(&self) -> bool {
        self.accessibility.is_some() || self.readonly
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeritageRef {
    pub name: String,
    pub type_args: Vec<TypeNode>,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: Option<String>,
    pub extends: Option<HeritageRef>,
    pub implements: Vec<HeritageRef>,
    pub members: Vec<ClassMember>,
    pub modifiers: Modifiers,
    pub is_abstract: bool,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassMember {
    pub kind: ClassMemberKind,
    pub range: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accessor {
    Get,
    Set,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClassMemberKind {
    Constructor(FunctionDecl),
    Method {
        name: PropertyName,
        function: FunctionDecl,
        is_static: bool,
        accessor: Option<Accessor>,
    },
    Property {
        name: PropertyName,
        type_annotation: Option<TypeNode>,
        init: Option<Expr>,
        is_static: bool,
        readonly: bool,
    },
    StaticBlock(Vec<Stmt>),
    IndexSignature,
    Unsupported(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyName {
    Identifier(String),
    Private(String),
    String(String),
    Number(String),
    BigInt(String),
    Computed(Box<Expr>),
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDecl {
    pub name: Option<String>,
    pub extends: Vec<HeritageRef>,
    pub members: Vec<InterfaceMember>,
    pub modifiers: Modifiers,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceMember {
    pub kind: InterfaceMemberKind,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InterfaceMemberKind {
    Property {
        name: PropertyName,
        type_annotation: Option<TypeNode>,
        optional: bool,
    },
    Method {
        name: PropertyName,
        params: Vec<Param>,
        return_type: Option<TypeNode>,
    },
    Call {
        params: Vec<Param>,
        return_type: Option<TypeNode>,
    },
    Construct {
        params: Vec<Param>,
        return_type: Option<TypeNode>,
    },
    Index {
        key_type: Option<TypeNode>,
        value_type: Option<TypeNode>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    pub name: Option<String>,
    pub members: Vec<EnumMember>,
    pub modifiers: Modifiers,
    pub is_const: bool,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    pub name: PropertyName,
    pub init: Option<Expr>,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeAliasDecl {
    pub name: String,
    pub ty: TypeNode,
    pub modifiers: Modifiers,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub source: String,
    pub type_only: bool,
    pub default: Option<String>,
    pub namespace: Option<String>,
    pub named: Vec<ImportSpecifier>,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportSpecifier {
    pub imported: String,
    pub local: String,
    pub type_only: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExportDecl {
    /// `export { a, b as c } [from "m"]`
    Named {
        specifiers: Vec<ExportSpecifier>,
        source: Option<String>,
        type_only: bool,
    },
    /// `export default <expr>`
    Default(Expr),
    /// `export = <expr>`
    Assignment(Expr),
    /// `export * [as ns] from "m"`
    All {
        source: String,
        alias: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportSpecifier {
    pub local: String,
    pub exported: String,
}

// ═══════════════════════════════════════════════════════════════════════════
// Expressions
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Identifier(String),
    This,
    Super,
    Number(String),
    String(String),
    BigInt(String),
    Boolean(bool),
    Null,
    Undefined,
    Regex(String),
    Template(TemplateLiteral),
    TaggedTemplate {
        tag: Box<Expr>,
        template: TemplateLiteral,
    },
    /// `None` marks a hole (`[1, , 3]`)
    Array(Vec<Option<ArrayElement>>),
    Object(Vec<ObjectProperty>),
    /// Function expression or arrow function
    Function(Box<FunctionDecl>),
    Class(Box<ClassDecl>),
    Unary {
        op: UnaryOperator,
        arg: Box<Expr>,
    },
    Update {
        op: UpdateOperator,
        prefix: bool,
        arg: Box<Expr>,
    },
    Binary {
        op: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Assign {
        op: AssignOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Argument>,
        optional: bool,
    },
    New {
        callee: Box<Expr>,
        args: Vec<Argument>,
    },
    Member {
        object: Box<Expr>,
        property: String,
        optional: bool,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
        optional: bool,
    },
    Paren(Box<Expr>),
    Await(Box<Expr>),
    /// `e as T`, `e satisfies T`, `<T>e`
    TypeAssertion {
        expr: Box<Expr>,
        ty: Option<TypeNode>,
    },
    NonNull(Box<Expr>),
    Unsupported(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TemplateLiteral {
    /// Literal chunks; always one more than `exprs`
    pub quasis: Vec<String>,
    pub exprs: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayElement {
    pub expr: Expr,
    pub spread: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectProperty {
    KeyValue {
        key: PropertyName,
        value: Expr,
        range: Span,
    },
    Shorthand {
        name: String,
        range: Span,
    },
    Method {
        key: PropertyName,
        function: FunctionDecl,
        accessor: Option<Accessor>,
        range: Span,
    },
    Spread {
        expr: Expr,
        range: Span,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub expr: Expr,
    pub spread: bool,
}

impl Expr {
    pub fn new(kind: ExprKind, range: Span) -> Self {
        Self { kind, range }
    }

    pub fn ident(name: &str) -> Self {
        Self::new(ExprKind::Identifier(name.to_string()), Span::zero())
    }

    pub fn number(text: &str) -> Self {
        Self::new(ExprKind::Number(text.to_string()), Span::zero())
    }

    pub fn string(text: &str) -> Self {
        Self::new(ExprKind::String(text.to_string()), Span::zero())
    }

    pub fn binary(op: BinaryOperator, left: Expr, right: Expr) -> Self {
        Self::new(
            ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            Span::zero(),
        )
    }

    pub fn assign(left: Expr, right: Expr) -> Self {
        Self::new(
            ExprKind::Assign {
                op: AssignOperator::Assign,
                left: Box::new(left),
                right: Box::new(right),
            },
            Span::zero(),
        )
    }

    pub fn call(callee: Expr, args: Vec<Expr>) -> Self {
        Self::new(
            ExprKind::Call {
                callee: Box::new(callee),
                args: args
                    .into_iter()
                    .map(|expr| Argument {
                        expr,
                        spread: false,
                    })
                    .collect(),
                optional: false,
            },
            Span::zero(),
        )
    }

    pub fn member(object: Expr, property: &str) -> Self {
        Self::new(
            ExprKind::Member {
                object: Box::new(object),
                property: property.to_string(),
                optional: false,
            },
            Span::zero(),
        )
    }

    /// Strip parentheses and type-only wrappers
    pub fn unwrap_transparent(&self) -> &Expr {
        match &self.kind {
            ExprKind::Paren(inner) | ExprKind::NonNull(inner) => inner.unwrap_transparent(),
            ExprKind::TypeAssertion { expr, .. } => expr.unwrap_transparent(),
            _ => self,
        }
    }
}

impl Stmt {
    pub fn new(kind: StmtKind, range: Span) -> Self {
        Self { kind, range }
    }

    pub fn expr(expr: Expr) -> Self {
        let range = expr.range;
        Self::new(StmtKind::Expression(expr), range)
    }

    /// `<kind> name = init;`
    pub fn declare(kind: DeclarationKind, name: &str, init: Option<Expr>) -> Self {
        Self::new(
            StmtKind::Variable(VariableDeclaration {
                kind,
                declarators: vec![VariableDeclarator {
                    target: Some(BindingTarget::Identifier(name.to_string())),
                    type_annotation: None,
                    init,
                    range: Span::zero(),
                }],
                modifiers: Modifiers::default(),
                range: Span::zero(),
            }),
            Span::zero(),
        )
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Type nodes
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct TypeNode {
    pub kind: TypeNodeKind,
    pub range: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeNodeKind {
    /// `number`, `string`, `void`, ...
    Keyword(String),
    /// `Foo`, `A.B`, `Promise<T>`
    Reference { name: String, args: Vec<TypeNode> },
    /// `T[]`
    Array(Box<TypeNode>),
    Union(Vec<TypeNode>),
    Intersection(Vec<TypeNode>),
    Tuple(Vec<TypeNode>),
    Function {
        params: Vec<TypeNode>,
        return_type: Box<TypeNode>,
    },
    Literal(LiteralType),
    /// `T?` inside tuples and optional members
    Optional(Box<TypeNode>),
    Parenthesized(Box<TypeNode>),
    ObjectLiteral,
    TypeQuery(String),
    This,
    Unsupported(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralType {
    Number(String),
    String(String),
    Boolean(bool),
    Null,
    Undefined,
}

impl TypeNode {
    pub fn new(kind: TypeNodeKind, range: Span) -> Self {
        Self { kind, range }
    }

    pub fn keyword(name: &str) -> Self {
        Self::new(TypeNodeKind::Keyword(name.to_string()), Span::zero())
    }

    pub fn reference(name: &str, args: Vec<TypeNode>) -> Self {
        Self::new(
            TypeNodeKind::Reference {
                name: name.to_string(),
                args,
            },
            Span::zero(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwrap_transparent() {
        let inner = Expr::ident("x");
        let wrapped = Expr::new(
            ExprKind::Paren(Box::new(Expr::new(
                ExprKind::NonNull(Box::new(inner.clone())),
                Span::zero(),
            ))),
            Span::zero(),
        );
        assert_eq!(wrapped.unwrap_transparent(), &inner);
    }

    #[test]
    fn test_declaration_kind() {
        assert!(DeclarationKind::from_keyword("let").is_block_scoped());
        assert!(!DeclarationKind::from_keyword("var").is_block_scoped());
        assert_eq!(
            DeclarationKind::from_keyword("using"),
            DeclarationKind::Other("using".to_string())
        );
    }

    #[test]
    fn test_parameter_property() {
        let param = Param {
            target: BindingTarget::Identifier("name".into()),
            type_annotation: None,
            default: None,
            rest: false,
            optional: false,
            accessibility: None,
            readonly: true,
            range: Span::zero(),
        };
        assert!(param.is_parameter_property());
    }
}
