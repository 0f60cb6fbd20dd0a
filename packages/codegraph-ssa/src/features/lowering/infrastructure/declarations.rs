//! Variable and function declarations
//!
//! Function bodies are lazy: declaring a function creates its value and
//! files the body under `Owner::Function`. The body is built on first call
//! or when the unit drains.

use crate::features::blueprint::{BlueprintKind, CONSTRUCTOR};
use crate::features::lowering::domain::{ExportBinding, LoweringError, LoweringResult};
use crate::features::ssa::domain::{
    BlueprintId, ContainerKind, FunctionId, UndefinedKind, Value, ValueId, ValueKind,
};
use crate::features::syntax::domain::ast::{
    BindingTarget, DeclarationKind, FunctionBody, FunctionDecl, Modifiers, Param,
    VariableDeclaration, VariableDeclarator,
};
use crate::features::type_resolution::{Type, TypeKind};
use crate::shared::models::{DiagnosticTag, Span};

use super::builder::{unique_suffix, UnitBuilder};

/// Where a declared name is bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BindKind {
    /// `let`, `const`, parameters, catch bindings
    Local,
    /// `var`
    Hoisted,
    /// Plain assignment to an existing (or implicit) binding
    Assign,
}

impl BindKind {
    pub(crate) fn from_declaration(kind: &DeclarationKind) -> Self {
        if kind.is_block_scoped() {
            Self::Local
        } else {
            Self::Hoisted
        }
    }
}

/// How a function relates to a blueprint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FunctionRole {
    Plain,
    /// Instance method; receives the instance as its first parameter
    Method(BlueprintId),
    StaticMethod(BlueprintId),
    Constructor(BlueprintId),
}

impl FunctionRole {
    fn blueprint(&self) -> Option<BlueprintId> {
        match *self {
            Self::Plain => None,
            Self::Method(id) | Self::StaticMethod(id) | Self::Constructor(id) => Some(id),
        }
    }

    fn has_receiver(&self) -> bool {
        matches!(self, Self::Method(_) | Self::Constructor(_))
    }
}

impl<'a> UnitBuilder<'a> {
    // ═══════════════════════════════════════════════════════════════════
    // Variables
    // ═══════════════════════════════════════════════════════════════════

    pub(crate) fn visit_variable_declaration(&mut self, decl: &'a VariableDeclaration) {
        for declarator in &decl.declarators {
            if self.is_stopped() {
                return;
            }
            if let Err(err) = self.lower_declarator(decl, declarator) {
                self.error(err.tag(), err.to_string(), declarator.range);
            }
        }
    }

    fn lower_declarator(
        &mut self,
        decl: &'a VariableDeclaration,
        declarator: &'a VariableDeclarator,
    ) -> LoweringResult<()> {
        let bind = match &decl.kind {
            DeclarationKind::Other(modifier) => {
                return Err(LoweringError::UnexpectedModifier(modifier.clone()))
            }
            kind => BindKind::from_declaration(kind),
        };
        let target = declarator
            .target
            .as_ref()
            .ok_or(LoweringError::NoDeclarationName)?;
        let explicit = declarator
            .type_annotation
            .as_ref()
            .map(|node| self.elaborate(node));

        let value = match (&declarator.init, target) {
            (Some(init), _) => {
                let value = self.visit_expr(init);
                let inferred = self.cursor.ty(value).cloned();
                let merged = self.merge_annotation(inferred.as_ref(), explicit.as_ref(), declarator.range);
                self.refine_type(value, merged);
                value
            }
            (None, BindingTarget::Identifier(name)) => {
                if decl.kind == DeclarationKind::Const && !decl.modifiers.declare {
                    return Err(LoweringError::ConstWithoutInitializer(name.clone()));
                }
                if bind == BindKind::Hoisted {
                    // `var x;` keeps whatever x already holds
                    let var = self.cursor.declare_hoisted(name);
                    self.export_binding(name, ExportBinding::Variable(var), decl.modifiers);
                    return Ok(());
                }
                self.cursor
                    .undefined_typed(UndefinedKind::Default, name, explicit, declarator.range)
            }
            (None, _) => return Err(LoweringError::BindingPatternWithoutInitializer),
        };

        self.bind_target(target, value, bind, decl.modifiers);
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Functions
    // ═══════════════════════════════════════════════════════════════════

    pub(crate) fn hoist_function(&mut self, decl: &'a FunctionDecl) {
        let Some(name) = decl.name.as_deref() else {
            if decl.modifiers.default_export {
                let value = self.declare_function(decl, &anonymous_name(), FunctionRole::Plain);
                self.export_binding("", ExportBinding::Value(value), decl.modifiers);
            } else {
                self.error(
                    DiagnosticTag::NoDeclarationName,
                    LoweringError::NoDeclarationName.to_string(),
                    decl.range,
                );
            }
            return;
        };
        let value = self.declare_function(decl, name, FunctionRole::Plain);
        let var = self.cursor.declare_hoisted(name);
        self.cursor.assign(var, value);
        self.export_binding(name, ExportBinding::Variable(var), decl.modifiers);
    }

    /// Function or arrow expression
    pub(crate) fn function_expression(&mut self, decl: &'a FunctionDecl) -> ValueId {
        let name = decl.name.clone().unwrap_or_else(anonymous_name);
        self.declare_function(decl, &name, FunctionRole::Plain)
    }

    /// Create the function value now, build the body later
    pub(crate) fn declare_function(
        &mut self,
        decl: &'a FunctionDecl,
        name: &str,
        role: FunctionRole,
    ) -> ValueId {
        let parent = self.cursor.function();
        let scope = self.cursor.scope();
        let fid = self
            .cursor
            .program
            .create_function(name, Some(parent), Some(scope), decl.range);

        let explicit = decl.return_type.as_ref().map(|node| self.elaborate(node));
        let return_type = match (role, explicit) {
            (FunctionRole::Constructor(id), _) => self.blueprints.get(id).map(|bp| bp.instance_type()),
            (_, Some(ty)) => Some(ty),
            (_, None) if decl.is_async => Some(Type::promise(Type::any())),
            (_, None) => None,
        };
        let params: Vec<Type> = decl
            .params
            .iter()
            .map(|p| {
                p.type_annotation
                    .as_ref()
                    .map(|node| self.elaborate(node))
                    .unwrap_or_else(Type::any)
            })
            .collect();
        let signature = Type::function(params, return_type.clone().unwrap_or_else(Type::any));

        let value = match self.cursor.program.function_mut(fid) {
            Some(f) => {
                f.is_async = decl.is_async;
                f.return_type = return_type;
                f.has_this = role.has_receiver();
                f.this_blueprint = role.blueprint();
                f.value
            }
            None => return self.cursor.undefined(name, decl.range),
        };
        self.cursor.set_type(value, Some(signature));

        self.defer_function(
            fid,
            Box::new(move |b: &mut UnitBuilder<'a>| b.build_function(fid, decl, role)),
        );
        value
    }

    fn build_function(&mut self, fid: FunctionId, decl: &'a FunctionDecl, role: FunctionRole) {
        #[cfg(feature = "trace")]
        tracing::trace!(function = %fid, "Building function body");

        self.cursor.push_function(fid);
        self.cursor.current.this_blueprint = role.blueprint();
        let hints = self.param_hints.remove(&fid).unwrap_or_default();
        let mut param_types = Vec::with_capacity(decl.params.len());

        let receiver = self.bind_receiver(role, decl.range);

        for (index, param) in decl.params.iter().enumerate() {
            let ty = self.lower_parameter(index, param, hints.get(index));
            param_types.push(ty.unwrap_or_else(Type::any));
        }

        if let (FunctionRole::Constructor(_), Some(container)) = (role, receiver) {
            for param in decl.params.iter().filter(|p| p.is_parameter_property()) {
                if let Some(name) = param.target.as_identifier() {
                    let value = self.cursor.read(name);
                    self.write_member(container, name, value);
                }
            }
        }

        match &decl.body {
            FunctionBody::Block(stmts) => self.visit_statements(stmts),
            FunctionBody::Expression(expr) => {
                let value = self.visit_expr(expr);
                self.emit_return(vec![value], expr.range);
            }
            FunctionBody::Absent => {}
        }
        match (role, receiver) {
            (FunctionRole::Constructor(_), Some(container)) => {
                self.emit_return(vec![container], decl.range)
            }
            _ => self.emit_return(Vec::new(), decl.range),
        }

        let return_type = self.resolve_return_type(fid, decl, role);
        let value = match self.cursor.program.function_mut(fid) {
            Some(f) => {
                f.return_type = return_type.clone();
                f.built = true;
                Some(f.value)
            }
            None => None,
        };
        if let Some(value) = value {
            let receiver_types = self
                .cursor
                .program
                .function(fid)
                .filter(|f| f.has_this)
                .and_then(|f| f.params.first().copied())
                .and_then(|p| self.cursor.ty(p).cloned());
            let params = receiver_types.into_iter().chain(param_types).collect();
            let signature = Type::function(params, return_type.unwrap_or_else(Type::any));
            self.cursor.set_type(value, Some(signature));
        }
        self.cursor.pop_function();
    }

    /// Bind `this` for methods and constructors; constructors build the receiver
    fn bind_receiver(&mut self, role: FunctionRole, range: Span) -> Option<ValueId> {
        let blueprint = role.blueprint()?;
        let (instance, container) = self
            .blueprints
            .get(blueprint)
            .map(|bp| (bp.instance_type(), bp.container))?;

        match role {
            FunctionRole::Method(_) => {
                let this = self.add_parameter("this", Some(instance), range);
                let var = self.cursor.declare_local("this");
                self.cursor.assign(var, this);
                self.cursor.current.this_value = Some(this);
                Some(this)
            }
            FunctionRole::Constructor(_) => {
                self.add_parameter("$this", Some(instance.clone()), range);
                let container = self.cursor.emit_typed(
                    ValueKind::Make {
                        container: ContainerKind::Instance,
                    },
                    Some(instance),
                    range,
                );
                let var = self.cursor.declare_local("this");
                self.cursor.assign(var, container);
                self.cursor.current.this_value = Some(container);
                self.cursor.current.registers_members = true;
                Some(container)
            }
            FunctionRole::StaticMethod(_) => {
                let container = container?;
                let var = self.cursor.declare_local("this");
                self.cursor.assign(var, container);
                self.cursor.current.this_value = Some(container);
                None
            }
            FunctionRole::Plain => None,
        }
    }

    pub(crate) fn add_parameter(&mut self, name: &str, ty: Option<Type>, range: Span) -> ValueId {
        let function = self.cursor.function();
        let index = self
            .cursor
            .program
            .function(function)
            .map(|f| f.params.len())
            .unwrap_or(0);
        let value = self.cursor.program.graph.add(
            Value::new(ValueKind::Parameter { index }, range)
                .with_name(name)
                .with_type(ty),
        );
        if let Some(f) = self.cursor.program.function_mut(function) {
            f.params.push(value);
            f.param_names.push(name.to_string());
        }
        value
    }

    /// Parameter type: annotation, then caller hint, then the default's type
    fn lower_parameter(&mut self, index: usize, param: &'a Param, hint: Option<&Type>) -> Option<Type> {
        let explicit = param
            .type_annotation
            .as_ref()
            .map(|node| self.elaborate(node));
        let ty = match (explicit, &param.default) {
            (Some(ty), _) => Some(ty),
            (None, _) if hint.is_some() => hint.cloned(),
            (None, Some(default)) => {
                let value = self.visit_expr(default);
                self.cursor.ty(value).cloned()
            }
            (None, None) => None,
        };
        let ty = match (param.rest, ty) {
            (true, Some(ty)) if matches!(ty.kind, TypeKind::Slice(_)) => Some(ty),
            (true, ty) => Some(Type::slice(ty.unwrap_or_else(Type::any))),
            (false, ty) => ty,
        };

        let name = match &param.target {
            BindingTarget::Identifier(name) => name.clone(),
            _ => format!("param{}", index),
        };
        let value = self.add_parameter(&name, ty.clone(), param.range);
        match &param.target {
            BindingTarget::Invalid(raw) => {
                self.error(
                    DiagnosticTag::InvalidParameter,
                    format!("cannot bind parameter `{}`", raw),
                    param.range,
                );
            }
            target => self.bind_target(target, value, BindKind::Local, Modifiers::default()),
        }
        ty
    }

    fn resolve_return_type(&mut self, fid: FunctionId, decl: &'a FunctionDecl, role: FunctionRole) -> Option<Type> {
        if let FunctionRole::Constructor(id) = role {
            return self.blueprints.get(id).map(|bp| bp.instance_type());
        }
        let inferred = self.cursor.program.function(fid).and_then(|f| {
            f.returns
                .iter()
                .find_map(|&ret| self.cursor.ty(ret).cloned())
        });
        let inferred = match inferred {
            Some(ty) if decl.is_async && !ty.is_promise() => Some(Type::promise(ty)),
            other => other,
        };
        let explicit = decl.return_type.as_ref().map(|node| self.elaborate(node));
        match explicit {
            Some(explicit) => self.merge_annotation(inferred.as_ref(), Some(&explicit), decl.range),
            None if decl.is_async => Some(Type::promise(Type::any())),
            None => inferred,
        }
    }

    /// Default constructor synthesized for `new C()` on a class never declared
    pub(crate) fn default_constructor(&mut self, blueprint: BlueprintId, range: Span) -> Option<ValueId> {
        let (name, instance) = self
            .blueprints
            .get(blueprint)
            .map(|bp| (bp.name.clone(), bp.instance_type()))?;
        let main = self.cursor.program.functions.first().map(|f| (f.id, f.root_scope))?;
        let fid = self.cursor.program.create_function(
            &format!("{}_default_ctor_func", name),
            Some(main.0),
            Some(main.1),
            range,
        );

        self.cursor.push_function(fid);
        self.add_parameter("$this", Some(instance.clone()), range);
        let container = self.cursor.emit_typed(
            ValueKind::Make {
                container: ContainerKind::Instance,
            },
            Some(instance.clone()),
            range,
        );
        let var = self.cursor.declare_local("this");
        self.cursor.assign(var, container);
        self.emit_return(vec![container], range);
        self.cursor.pop_function();

        let value = match self.cursor.program.function_mut(fid) {
            Some(f) => {
                f.has_this = true;
                f.built = true;
                f.this_blueprint = Some(blueprint);
                f.return_type = Some(instance.clone());
                f.value
            }
            None => return None,
        };
        self.cursor
            .set_type(value, Some(Type::function(vec![instance.clone()], instance)));
        if let Some(bp) = self.blueprints.get_mut(blueprint) {
            if bp.kind != BlueprintKind::Class {
                bp.kind = BlueprintKind::Class;
            }
            bp.register_magic_method(CONSTRUCTOR, value);
        }
        Some(value)
    }
}

pub(crate) fn anonymous_name() -> String {
    format!("anonymous_func_{}", unique_suffix())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildOptions;
    use crate::features::syntax::domain::ast::{Expr, Program, Stmt, StmtKind, TypeNode};

    fn leak(body: Vec<Stmt>) -> &'static Program {
        Box::leak(Box::new(Program {
            body,
            range: Span::zero(),
        }))
    }

    fn function(name: Option<&str>, params: Vec<Param>, body: FunctionBody, is_async: bool) -> FunctionDecl {
        FunctionDecl {
            name: name.map(str::to_string),
            params,
            return_type: None,
            body,
            is_async,
            is_arrow: false,
            is_generator: false,
            modifiers: Modifiers::default(),
            range: Span::zero(),
        }
    }

    fn param(name: &str, ty: Option<TypeNode>) -> Param {
        Param {
            target: BindingTarget::Identifier(name.into()),
            type_annotation: ty,
            default: None,
            rest: false,
            optional: false,
            accessibility: None,
            readonly: false,
            range: Span::zero(),
        }
    }

    #[test]
    fn test_const_without_initializer_fails_only_that_declaration() {
        let program = leak(vec![
            Stmt::declare(DeclarationKind::Const, "a", None),
            Stmt::declare(DeclarationKind::Let, "b", Some(Expr::number("1"))),
        ]);
        let mut b = UnitBuilder::new("main", BuildOptions::default());
        b.lower_program(program);
        assert_eq!(b.diagnostics().len(), 1);
        assert_eq!(b.diagnostics()[0].tag, DiagnosticTag::ConstDeclarationWithoutInitializer);
        assert!(b.cursor.lookup("b").is_some());
    }

    #[test]
    fn test_unexpected_modifier_is_fast_fail() {
        let program = leak(vec![Stmt::declare(
            DeclarationKind::Other("using".into()),
            "r",
            Some(Expr::number("1")),
        )]);
        let mut b = UnitBuilder::new("main", BuildOptions::default());
        b.lower_program(program);
        assert_eq!(
            b.diagnostics()[0].tag,
            DiagnosticTag::UnexpectedVariableDeclarationModifier
        );
        assert!(b.cursor.lookup("r").is_none());
    }

    #[test]
    fn test_function_body_is_lazy_until_drained() {
        let decl = function(
            Some("f"),
            vec![param("x", Some(TypeNode::keyword("number")))],
            FunctionBody::Expression(Box::new(Expr::ident("x"))),
            false,
        );
        let program = leak(vec![Stmt::new(StmtKind::Function(decl), Span::zero())]);
        let mut b = UnitBuilder::new(
            "main",
            BuildOptions {
                drain_at_end: false,
                ..BuildOptions::default()
            },
        );
        b.lower_program(program);
        let f = b.cursor.program.functions.iter().find(|f| f.name == "f").unwrap();
        assert!(!f.built);
        let fid = f.id;

        b.drain_deferred();
        let f = b.cursor.program.function(fid).unwrap();
        assert!(f.built);
        assert_eq!(f.arity(), 1);
        assert_eq!(f.return_type, Some(Type::number()));
    }

    #[test]
    fn test_async_function_without_annotation_returns_promise_any() {
        let decl = function(Some("load"), vec![], FunctionBody::Block(vec![]), true);
        let program = leak(vec![Stmt::new(StmtKind::Function(decl), Span::zero())]);
        let mut b = UnitBuilder::new("main", BuildOptions::default());
        b.lower_program(program);
        let f = b.cursor.program.functions.iter().find(|f| f.name == "load").unwrap();
        assert_eq!(f.return_type, Some(Type::promise(Type::any())));
    }

    #[test]
    fn test_anonymous_names_are_unique() {
        let names: std::collections::HashSet<String> = (0..2000).map(|_| anonymous_name()).collect();
        assert_eq!(names.len(), 2000);
        assert!(names.iter().all(|name| name.starts_with("anonymous_func_")));
    }
}
