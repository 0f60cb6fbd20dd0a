//! Classes, interfaces and enums
//!
//! Declarations are registered during hoisting so later statements (and
//! earlier ones, through the deferred queue) see every member. Member
//! tables get placeholders at once; initializers, static blocks and
//! parent links run later as blueprint-owned builders.

use crate::features::blueprint::{BlueprintKind, BlueprintState, LinkOutcome, CONSTRUCTOR};
use crate::features::lowering::domain::ExportBinding;
use crate::features::ssa::domain::{
    BlueprintId, ConstValue, ContainerKind, UndefinedKind, ValueId, ValueKind,
};
use crate::features::ssa::infrastructure::render_const;
use crate::features::syntax::domain::ast::{
    ClassDecl, ClassMember, ClassMemberKind, EnumDecl, Expr, HeritageRef, InterfaceDecl,
    InterfaceMemberKind, Modifiers, Param, PropertyName, Stmt, TypeNode,
};
use crate::features::type_resolution::Type;
use crate::shared::models::{Diagnostic, DiagnosticTag, Span};

use super::builder::{unique_suffix, UnitBuilder};
use super::declarations::FunctionRole;

const CALL_SIGNATURE: &str = "__call__";
const CONSTRUCT_SIGNATURE: &str = "__construct__";
const INDEX_SIGNATURE: &str = "__index__";

impl<'a> UnitBuilder<'a> {
    /// Skeleton plus container value, reusing a skeleton made by a forward reference
    pub(crate) fn declare_blueprint(
        &mut self,
        name: &str,
        kind: BlueprintKind,
        range: Span,
    ) -> (BlueprintId, ValueId) {
        let id = match self.blueprints.id_of(name) {
            Some(id) => id,
            None => self.blueprints.create(name, kind),
        };
        if let Some(container) = self.blueprints.get(id).and_then(|bp| bp.container) {
            return (id, container);
        }

        let ty = self.blueprints.get(id).map(|bp| bp.static_type());
        let container = self.cursor.emit_typed(
            ValueKind::Make {
                container: ContainerKind::Blueprint,
            },
            ty,
            range,
        );
        self.cursor.program.graph.name_if_unnamed(container, name);
        if let Some(bp) = self.blueprints.get_mut(id) {
            bp.kind = kind;
            bp.container = Some(container);
            bp.range = range;
        }
        tracing::debug!(blueprint = name, kind = ?kind, "Declared blueprint");
        (id, container)
    }

    /// Bind a declaration's container to its name and export value and type
    fn bind_blueprint(&mut self, name: &str, id: BlueprintId, container: ValueId, modifiers: Modifiers) {
        let var = self.cursor.declare_local(name);
        self.cursor.assign(var, container);
        self.export_binding(name, ExportBinding::Variable(var), modifiers);
        if let Some(instance) = self.blueprints.get(id).map(|bp| bp.instance_type()) {
            self.export_type_binding(name, instance, modifiers);
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Classes
    // ═══════════════════════════════════════════════════════════════════

    pub(crate) fn hoist_class(&mut self, decl: &'a ClassDecl) {
        let Some(name) = decl.name.as_deref() else {
            return;
        };
        let (id, container) = self.declare_blueprint(name, BlueprintKind::Class, decl.range);
        self.bind_blueprint(name, id, container, decl.modifiers);
        self.register_class_members(id, decl);
    }

    pub(crate) fn visit_class_declaration(&mut self, decl: &'a ClassDecl) {
        match decl.name.as_deref() {
            Some(name) => match self.blueprints.id_of(name) {
                Some(id) => self.register_class_members(id, decl),
                None => self.hoist_class(decl),
            },
            None if decl.modifiers.default_export => {
                let value = self.class_expression(decl);
                self.export_binding("", ExportBinding::Value(value), decl.modifiers);
                if let Some(ty) = self.cursor.ty(value).cloned() {
                    self.export_type_binding("", ty, decl.modifiers);
                }
            }
            None => self.error(
                DiagnosticTag::NoDeclarationName,
                "class declaration without a name",
                decl.range,
            ),
        }
    }

    pub(crate) fn class_expression(&mut self, decl: &'a ClassDecl) -> ValueId {
        let name = decl.name.clone().unwrap_or_else(anonymous_class_name);
        let (id, container) = self.declare_blueprint(&name, BlueprintKind::Class, decl.range);
        self.register_class_members(id, decl);
        container
    }

    fn register_class_members(&mut self, id: BlueprintId, decl: &'a ClassDecl) {
        let Some(bp) = self.blueprints.get_mut(id) else {
            return;
        };
        if bp.state >= BlueprintState::MembersRegistering {
            return;
        }
        bp.advance(BlueprintState::MembersRegistering);
        let class_name = bp.name.clone();
        tracing::debug!(class = %class_name, members = decl.members.len(), "Registering class members");

        if let Some(parent) = decl.extends.as_ref() {
            self.defer_blueprint(
                id,
                Box::new(move |b: &mut UnitBuilder<'a>| {
                    b.link_heritage(id, parent, BlueprintKind::Class, false)
                }),
            );
        }
        for interface in &decl.implements {
            self.defer_blueprint(
                id,
                Box::new(move |b: &mut UnitBuilder<'a>| {
                    b.link_heritage(id, interface, BlueprintKind::Interface, true)
                }),
            );
        }
        for member in &decl.members {
            self.register_class_member(id, &class_name, member);
        }
    }

    fn register_class_member(&mut self, id: BlueprintId, class_name: &str, member: &'a ClassMember) {
        match &member.kind {
            ClassMemberKind::Constructor(function) => {
                let name = format!("{}_constructor_{}", class_name, unique_suffix());
                let value = self.declare_function(function, &name, FunctionRole::Constructor(id));
                for param in function.params.iter().filter(|p| p.is_parameter_property()) {
                    if let Some(field) = param.target.as_identifier() {
                        let ty = param.type_annotation.as_ref().map(|node| self.elaborate(node));
                        let placeholder =
                            self.cursor
                                .undefined_typed(UndefinedKind::Default, field, ty, param.range);
                        if let Some(bp) = self.blueprints.get_mut(id) {
                            bp.register_normal_member(field, placeholder);
                        }
                    }
                }
                if let Some(bp) = self.blueprints.get_mut(id) {
                    bp.register_magic_method(CONSTRUCTOR, value);
                }
            }
            ClassMemberKind::Method {
                name,
                function,
                is_static,
                ..
            } => {
                let Some(key) = self.member_name(name, member.range) else {
                    return;
                };
                let function_name =
                    format!("{}_{}_{}", class_name, key.trim_start_matches('#'), unique_suffix());
                let role = if *is_static {
                    FunctionRole::StaticMethod(id)
                } else {
                    FunctionRole::Method(id)
                };
                let value = self.declare_function(function, &function_name, role);
                if let Some(bp) = self.blueprints.get_mut(id) {
                    if *is_static {
                        bp.register_static_method(&key, value);
                    } else {
                        bp.register_normal_method(&key, value);
                    }
                }
            }
            ClassMemberKind::Property {
                name,
                type_annotation,
                init,
                is_static,
                ..
            } => {
                let Some(key) = self.member_name(name, member.range) else {
                    return;
                };
                let explicit = type_annotation.as_ref().map(|node| self.elaborate(node));
                let placeholder = self.cursor.undefined_typed(
                    UndefinedKind::Default,
                    &key,
                    explicit.clone(),
                    member.range,
                );
                let is_static = *is_static;
                self.register_property(id, &key, placeholder, is_static);

                if let Some(init) = init.as_ref() {
                    let range = member.range;
                    self.defer_blueprint(
                        id,
                        Box::new(move |b: &mut UnitBuilder<'a>| {
                            b.initialize_property(id, &key, init, explicit, is_static, range)
                        }),
                    );
                }
            }
            ClassMemberKind::StaticBlock(stmts) => {
                self.defer_blueprint(
                    id,
                    Box::new(move |b: &mut UnitBuilder<'a>| b.run_static_block(id, stmts)),
                );
            }
            ClassMemberKind::IndexSignature => {}
            ClassMemberKind::Unsupported(kind) => self.warn(
                DiagnosticTag::NotFullyImplemented,
                format!("class member `{}` skipped", kind),
                member.range,
            ),
        }
    }

    fn member_name(&mut self, name: &'a PropertyName, range: Span) -> Option<String> {
        let key = self.property_key(name);
        if key.is_none() {
            self.error(DiagnosticTag::InvalidPropertyName, "invalid member name", range);
        }
        key
    }

    fn register_property(&mut self, id: BlueprintId, key: &str, value: ValueId, is_static: bool) {
        if let Some(bp) = self.blueprints.get_mut(id) {
            if is_static {
                bp.register_static_member(key, value);
            } else {
                bp.register_normal_member(key, value);
            }
        }
    }

    fn initialize_property(
        &mut self,
        id: BlueprintId,
        key: &str,
        init: &'a Expr,
        explicit: Option<Type>,
        is_static: bool,
        range: Span,
    ) {
        let value = self.visit_expr(init);
        let inferred = self.cursor.ty(value).cloned();
        let merged = self.merge_annotation(inferred.as_ref(), explicit.as_ref(), range);
        self.refine_type(value, merged);
        self.register_property(id, key, value, is_static);
    }

    /// `static { ... }` runs with `this` bound to the class container
    fn run_static_block(&mut self, id: BlueprintId, stmts: &'a [Stmt]) {
        let container = self.blueprints.get(id).and_then(|bp| bp.container);
        let previous = (self.cursor.current.this_value, self.cursor.current.registers_members);
        self.cursor.push_scope();
        if let Some(container) = container {
            let var = self.cursor.declare_local("this");
            self.cursor.assign(var, container);
            self.cursor.current.this_value = Some(container);
            self.cursor.current.registers_members = true;
        }
        self.visit_statements(stmts);
        self.cursor.pop_scope();
        (self.cursor.current.this_value, self.cursor.current.registers_members) = previous;
    }

    /// Resolve a heritage clause and link it, creating a skeleton when unknown
    fn link_heritage(
        &mut self,
        child: BlueprintId,
        heritage: &'a HeritageRef,
        kind: BlueprintKind,
        as_interface: bool,
    ) {
        let parent = match self.blueprints.id_of(&heritage.name) {
            Some(parent) => parent,
            None => {
                tracing::debug!(parent = %heritage.name, "Creating skeleton for unknown parent");
                self.blueprints.create(&heritage.name, kind)
            }
        };
        if parent != child {
            self.ensure_blueprint_built(parent);
        }

        let outcome = if as_interface {
            self.blueprints.link_interface(child, parent)
        } else {
            self.blueprints.link_parent(child, parent)
        };
        match outcome {
            Ok(LinkOutcome::Linked) => {}
            Ok(LinkOutcome::Redundant) => self.report(Diagnostic::info(
                DiagnosticTag::RedundantParent,
                format!("`{}` is already an ancestor", heritage.name),
                heritage.range,
            )),
            Err(err) => self.error(err.tag(), err.to_string(), heritage.range),
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Interfaces
    // ═══════════════════════════════════════════════════════════════════

    pub(crate) fn hoist_interface(&mut self, decl: &'a InterfaceDecl) {
        let Some(name) = decl.name.as_deref() else {
            return;
        };
        let (id, _) = self.declare_blueprint(name, BlueprintKind::Interface, decl.range);
        if let Some(instance) = self.blueprints.get(id).map(|bp| bp.instance_type()) {
            self.export_type_binding(name, instance, decl.modifiers);
        }
        self.register_interface_members(id, decl);
    }

    pub(crate) fn visit_interface(&mut self, decl: &'a InterfaceDecl) {
        match decl.name.as_deref() {
            Some(name) => match self.blueprints.id_of(name) {
                Some(id) => self.register_interface_members(id, decl),
                None => self.hoist_interface(decl),
            },
            None => self.error(
                DiagnosticTag::NoDeclarationName,
                "interface declaration without a name",
                decl.range,
            ),
        }
    }

    fn register_interface_members(&mut self, id: BlueprintId, decl: &'a InterfaceDecl) {
        let Some(bp) = self.blueprints.get_mut(id) else {
            return;
        };
        if bp.state >= BlueprintState::MembersRegistering {
            return;
        }
        bp.advance(BlueprintState::MembersRegistering);

        for parent in &decl.extends {
            self.defer_blueprint(
                id,
                Box::new(move |b: &mut UnitBuilder<'a>| {
                    b.link_heritage(id, parent, BlueprintKind::Interface, false)
                }),
            );
        }

        for member in &decl.members {
            match &member.kind {
                InterfaceMemberKind::Property {
                    name,
                    type_annotation,
                    ..
                } => {
                    let Some(key) = self.member_name(name, member.range) else {
                        continue;
                    };
                    let ty = type_annotation
                        .as_ref()
                        .map(|node| self.elaborate(node))
                        .unwrap_or_else(Type::any);
                    let placeholder = self.cursor.undefined_typed(
                        UndefinedKind::Default,
                        &key,
                        Some(ty),
                        member.range,
                    );
                    if let Some(bp) = self.blueprints.get_mut(id) {
                        bp.register_static_member(&key, placeholder);
                        bp.register_normal_member(&key, placeholder);
                    }
                }
                InterfaceMemberKind::Method {
                    name,
                    params,
                    return_type,
                } => {
                    let Some(key) = self.member_name(name, member.range) else {
                        continue;
                    };
                    let signature = self.signature_placeholder(&key, params, return_type.as_ref(), member.range);
                    if let Some(bp) = self.blueprints.get_mut(id) {
                        bp.register_normal_method(&key, signature);
                    }
                }
                InterfaceMemberKind::Call {
                    params,
                    return_type,
                } => {
                    let signature =
                        self.signature_placeholder(CALL_SIGNATURE, params, return_type.as_ref(), member.range);
                    if let Some(bp) = self.blueprints.get_mut(id) {
                        bp.register_magic_method(CALL_SIGNATURE, signature);
                    }
                }
                InterfaceMemberKind::Construct {
                    params,
                    return_type,
                } => {
                    let signature = self.signature_placeholder(
                        CONSTRUCT_SIGNATURE,
                        params,
                        return_type.as_ref(),
                        member.range,
                    );
                    if let Some(bp) = self.blueprints.get_mut(id) {
                        bp.register_magic_method(CONSTRUCT_SIGNATURE, signature);
                    }
                }
                InterfaceMemberKind::Index {
                    key_type,
                    value_type,
                } => {
                    let key = self.elaborate_or_any(key_type.as_ref());
                    let value = self.elaborate_or_any(value_type.as_ref());
                    let placeholder = self.cursor.undefined_typed(
                        UndefinedKind::Default,
                        INDEX_SIGNATURE,
                        Some(Type::map(key, value)),
                        member.range,
                    );
                    if let Some(bp) = self.blueprints.get_mut(id) {
                        bp.register_magic_method(INDEX_SIGNATURE, placeholder);
                    }
                }
            }
        }
    }

    fn elaborate_or_any(&self, node: Option<&TypeNode>) -> Type {
        node.map(|node| self.elaborate(node)).unwrap_or_else(Type::any)
    }

    /// Undefined value typed with a signature's function type
    fn signature_placeholder(
        &mut self,
        name: &str,
        params: &[Param],
        return_type: Option<&TypeNode>,
        range: Span,
    ) -> ValueId {
        let params = params
            .iter()
            .map(|p| self.elaborate_or_any(p.type_annotation.as_ref()))
            .collect();
        let ret = self.elaborate_or_any(return_type);
        self.cursor.undefined_typed(
            UndefinedKind::Default,
            name,
            Some(Type::function(params, ret)),
            range,
        )
    }

    // ═══════════════════════════════════════════════════════════════════
    // Enums
    // ═══════════════════════════════════════════════════════════════════

    pub(crate) fn hoist_enum(&mut self, decl: &'a EnumDecl) {
        let Some(name) = decl.name.as_deref() else {
            return;
        };
        let (id, container) = self.declare_blueprint(name, BlueprintKind::Enum, decl.range);
        self.bind_blueprint(name, id, container, decl.modifiers);
        self.register_enum_members(id, decl);
    }

    pub(crate) fn visit_enum(&mut self, decl: &'a EnumDecl) {
        match decl.name.as_deref() {
            Some(name) => match self.blueprints.id_of(name) {
                Some(id) => self.register_enum_members(id, decl),
                None => self.hoist_enum(decl),
            },
            None => self.error(
                DiagnosticTag::NoDeclarationName,
                "enum declaration without a name",
                decl.range,
            ),
        }
    }

    /// Members count up from 0; an explicit number restarts the count after it
    fn register_enum_members(&mut self, id: BlueprintId, decl: &'a EnumDecl) {
        let Some(bp) = self.blueprints.get_mut(id) else {
            return;
        };
        if bp.state >= BlueprintState::MembersRegistering {
            return;
        }
        bp.advance(BlueprintState::MembersRegistering);

        let mut next = 0.0;
        for member in &decl.members {
            let Some(key) = self.member_name(&member.name, member.range) else {
                continue;
            };
            let value = match member.init.as_ref() {
                Some(init) => self.visit_expr(init),
                None => self.cursor.constant(ConstValue::Number(next), member.range),
            };
            let number = match self.const_of(value) {
                Some(ConstValue::Number(n)) => {
                    next = n + 1.0;
                    Some(n)
                }
                _ => None,
            };

            let reverse = number.map(|n| {
                let name = self.cursor.constant(ConstValue::String(key.clone()), member.range);
                (render_const(&ConstValue::Number(n)), name)
            });
            if let Some(bp) = self.blueprints.get_mut(id) {
                bp.register_static_member(&key, value);
                if let Some((number, name)) = reverse {
                    bp.register_static_member(&number, name);
                }
            }
        }
        if let Some(bp) = self.blueprints.get_mut(id) {
            bp.advance(BlueprintState::FullyBuilt);
        }
    }
}

pub(crate) fn anonymous_class_name() -> String {
    format!("anonymous_class_{}", unique_suffix())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildOptions;
    use crate::features::ssa::infrastructure::render_value;
    use crate::features::syntax::domain::ast::{
        Accessibility, BindingTarget, EnumMember, FunctionBody, FunctionDecl, InterfaceMember,
        Program, StmtKind,
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

    fn heritage(name: &str) -> HeritageRef {
        HeritageRef {
            name: name.into(),
            type_args: vec![],
            range: Span::zero(),
        }
    }

    fn function(params: Vec<Param>, body: Vec<Stmt>) -> FunctionDecl {
        FunctionDecl {
            name: None,
            params,
            return_type: None,
            body: FunctionBody::Block(body),
            is_async: false,
            is_arrow: false,
            is_generator: false,
            modifiers: Modifiers::default(),
            range: Span::zero(),
        }
    }

    fn class(name: &str, extends: Option<&str>, members: Vec<ClassMemberKind>) -> Stmt {
        Stmt::new(
            StmtKind::Class(ClassDecl {
                name: Some(name.into()),
                extends: extends.map(heritage),
                implements: vec![],
                members: members
                    .into_iter()
                    .map(|kind| ClassMember {
                        kind,
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

    fn method(name: &str) -> ClassMemberKind {
        ClassMemberKind::Method {
            name: PropertyName::Identifier(name.into()),
            function: function(vec![], vec![]),
            is_static: false,
            accessor: None,
        }
    }

    fn property(name: &str, init: Expr) -> ClassMemberKind {
        ClassMemberKind::Property {
            name: PropertyName::Identifier(name.into()),
            type_annotation: None,
            init: Some(init),
            is_static: false,
            readonly: false,
        }
    }

    #[test]
    fn test_class_registers_methods_and_properties() {
        let b = lower(vec![class(
            "A",
            None,
            vec![method("m"), property("x", Expr::number("1"))],
        )]);
        let bp = b.blueprints.by_name("A").unwrap();
        assert_eq!(bp.kind, BlueprintKind::Class);
        assert!(bp.normal_methods.contains_key("m"));
        let x = bp.normal_members["x"];
        assert_eq!(render_value(&b.cursor.program, x), "1");
        assert!(bp.is_built());
    }

    #[test]
    fn test_parent_members_are_inherited() {
        let b = lower(vec![
            class("B", None, vec![method("f")]),
            class("A", Some("B"), vec![]),
        ]);
        let parent = b.blueprints.id_of("B").unwrap();
        let child = b.blueprints.by_name("A").unwrap();
        assert_eq!(child.parents, vec![parent]);
        assert!(child.normal_methods.contains_key("f"));
    }

    #[test]
    fn test_forward_parent_resolves_after_drain() {
        let b = lower(vec![
            class("A", Some("B"), vec![]),
            class("B", None, vec![method("g")]),
        ]);
        let parent = b.blueprints.id_of("B").unwrap();
        let child = b.blueprints.by_name("A").unwrap();
        assert_eq!(child.parents, vec![parent]);
        assert!(child.normal_methods.contains_key("g"));
        assert_eq!(b.blueprints.len(), 2);
    }

    #[test]
    fn test_mutual_inheritance_is_rejected() {
        let b = lower(vec![
            class("A", Some("B"), vec![]),
            class("B", Some("A"), vec![]),
        ]);
        assert!(b
            .diagnostics()
            .iter()
            .any(|d| d.tag == DiagnosticTag::CircularInheritance));
        let linked = ["A", "B"]
            .iter()
            .filter(|n| !b.blueprints.by_name(n).unwrap().parents.is_empty())
            .count();
        assert_eq!(linked, 1);
    }

    #[test]
    fn test_parameter_property_becomes_member() {
        let param = Param {
            target: BindingTarget::Identifier("x".into()),
            type_annotation: Some(TypeNode::keyword("number")),
            default: None,
            rest: false,
            optional: false,
            accessibility: Some(Accessibility::Public),
            readonly: false,
            range: Span::zero(),
        };
        let b = lower(vec![class(
            "P",
            None,
            vec![ClassMemberKind::Constructor(function(vec![param], vec![]))],
        )]);
        let bp = b.blueprints.by_name("P").unwrap();
        assert!(bp.constructor().is_some());
        let x = bp.normal_members["x"];
        assert_eq!(b.cursor.ty(x), Some(&Type::number()));
    }

    #[test]
    fn test_enum_counts_and_reverse_maps() {
        let member = |name: &str, init: Option<Expr>| EnumMember {
            name: PropertyName::Identifier(name.into()),
            init,
            range: Span::zero(),
        };
        let b = lower(vec![Stmt::new(
            StmtKind::Enum(EnumDecl {
                name: Some("Color".into()),
                members: vec![
                    member("Red", None),
                    member("Green", Some(Expr::number("5"))),
                    member("Blue", None),
                ],
                modifiers: Modifiers::default(),
                is_const: false,
                range: Span::zero(),
            }),
            Span::zero(),
        )]);
        let bp = b.blueprints.by_name("Color").unwrap();
        let show = |key: &str| render_value(&b.cursor.program, bp.static_members[key]);
        assert_eq!(show("Red"), "0");
        assert_eq!(show("Green"), "5");
        assert_eq!(show("Blue"), "6");
        assert_eq!(show("6"), "\"Blue\"");
    }

    #[test]
    fn test_interface_members_and_redundant_parent() {
        let interface = |name: &str, extends: Vec<HeritageRef>, members: Vec<InterfaceMemberKind>| {
            Stmt::new(
                StmtKind::Interface(InterfaceDecl {
                    name: Some(name.into()),
                    extends,
                    members: members
                        .into_iter()
                        .map(|kind| InterfaceMember {
                            kind,
                            range: Span::zero(),
                        })
                        .collect(),
                    modifiers: Modifiers::default(),
                    range: Span::zero(),
                }),
                Span::zero(),
            )
        };
        let b = lower(vec![
            interface(
                "I",
                vec![],
                vec![
                    InterfaceMemberKind::Property {
                        name: PropertyName::Identifier("n".into()),
                        type_annotation: Some(TypeNode::keyword("number")),
                        optional: false,
                    },
                    InterfaceMemberKind::Index {
                        key_type: Some(TypeNode::keyword("string")),
                        value_type: Some(TypeNode::keyword("number")),
                    },
                ],
            ),
            interface("J", vec![heritage("I"), heritage("I")], vec![]),
        ]);
        let i = b.blueprints.by_name("I").unwrap();
        assert_eq!(i.kind, BlueprintKind::Interface);
        assert_eq!(b.cursor.ty(i.static_members["n"]), Some(&Type::number()));
        assert_eq!(i.normal_members["n"], i.static_members["n"]);
        assert!(i.magic_methods.contains_key(INDEX_SIGNATURE));

        let j = b.blueprints.by_name("J").unwrap();
        assert_eq!(j.parents, vec![i.id]);
        assert!(j.normal_members.contains_key("n"));
        assert!(b
            .diagnostics()
            .iter()
            .any(|d| d.tag == DiagnosticTag::RedundantParent));
    }

    #[test]
    fn test_anonymous_class_names_are_unique() {
        assert_ne!(anonymous_class_name(), anonymous_class_name());
    }
}
