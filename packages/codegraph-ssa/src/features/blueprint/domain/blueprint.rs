/*
 * Blueprint
 *
 * Shared shape of a class, interface or enum:
 * - parents and implemented interfaces, in declaration order
 * - five member tables (normal/static members, normal/static methods,
 *   magic methods such as the constructor)
 * - the container value the declaration name is bound to
 * - a build state advancing skeleton → members → parents → built
 *
 * Tables are ordered maps so rendering and snapshots are deterministic.
 */

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::features::ssa::domain::{BlueprintId, FunctionId, ValueId};
use crate::features::type_resolution::domain::{BlueprintView, Type};
use crate::shared::models::Span;

/// Magic-method key of the constructor
pub const CONSTRUCTOR: &str = "constructor";

pub type MemberTable = BTreeMap<String, ValueId>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlueprintKind {
    Class,
    Interface,
    Enum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BlueprintState {
    SkeletonCreated,
    MembersRegistering,
    ParentLinking,
    FullyBuilt,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    pub id: BlueprintId,
    pub name: String,
    pub kind: BlueprintKind,
    pub parents: Vec<BlueprintId>,
    pub interfaces: Vec<BlueprintId>,
    pub normal_members: MemberTable,
    pub static_members: MemberTable,
    pub normal_methods: MemberTable,
    pub static_methods: MemberTable,
    pub magic_methods: MemberTable,
    /// Value the declaration name is bound to
    pub container: Option<ValueId>,
    /// Function context deferred builders run in
    pub init_function: Option<FunctionId>,
    pub state: BlueprintState,
    pub range: Span,
}

impl Blueprint {
    pub fn new(id: BlueprintId, name: impl Into<String>, kind: BlueprintKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            parents: Vec::new(),
            interfaces: Vec::new(),
            normal_members: MemberTable::new(),
            static_members: MemberTable::new(),
            normal_methods: MemberTable::new(),
            static_methods: MemberTable::new(),
            magic_methods: MemberTable::new(),
            container: None,
            init_function: None,
            state: BlueprintState::SkeletonCreated,
            range: Span::zero(),
        }
    }

    /// Move forward; states never go back
    pub fn advance(&mut self, state: BlueprintState) {
        if state > self.state {
            self.state = state;
        }
    }

    pub fn is_built(&self) -> bool {
        self.state == BlueprintState::FullyBuilt
    }

    /// Direct ancestors: parents first, then interfaces
    pub fn ancestors(&self) -> impl Iterator<Item = BlueprintId> + '_ {
        self.parents.iter().chain(self.interfaces.iter()).copied()
    }

    pub fn register_normal_member(&mut self, name: &str, value: ValueId) {
        self.normal_members.insert(name.to_string(), value);
    }

    pub fn register_static_member(&mut self, name: &str, value: ValueId) {
        self.static_members.insert(name.to_string(), value);
    }

    pub fn register_normal_method(&mut self, name: &str, function: ValueId) {
        self.normal_methods.insert(name.to_string(), function);
    }

    pub fn register_static_method(&mut self, name: &str, function: ValueId) {
        self.static_methods.insert(name.to_string(), function);
    }

    pub fn register_magic_method(&mut self, name: &str, function: ValueId) {
        self.magic_methods.insert(name.to_string(), function);
    }

    pub fn constructor(&self) -> Option<ValueId> {
        self.magic_methods.get(CONSTRUCTOR).copied()
    }

    /// Member or method visible from `view`, own tables only
    pub fn own_member(&self, key: &str, view: BlueprintView) -> Option<ValueId> {
        match view {
            BlueprintView::Instance => self
                .normal_members
                .get(key)
                .or_else(|| self.normal_methods.get(key))
                .copied(),
            BlueprintView::Static => self
                .static_members
                .get(key)
                .or_else(|| self.static_methods.get(key))
                .copied(),
        }
    }

    /// Copy every entry missing here from `parent`; existing keys win
    pub fn inherit_from(&mut self, parent: &Blueprint) {
        fn merge(child: &mut MemberTable, parent: &MemberTable) {
            for (key, value) in parent {
                child.entry(key.clone()).or_insert(*value);
            }
        }
        merge(&mut self.normal_members, &parent.normal_members);
        merge(&mut self.static_members, &parent.static_members);
        merge(&mut self.normal_methods, &parent.normal_methods);
        merge(&mut self.static_methods, &parent.static_methods);
        // constructors are not inherited through the snapshot
        for (key, value) in &parent.magic_methods {
            if key != CONSTRUCTOR {
                self.magic_methods.entry(key.clone()).or_insert(*value);
            }
        }
    }

    pub fn instance_type(&self) -> Type {
        Type::blueprint(self.id, self.name.clone(), BlueprintView::Instance)
    }

    pub fn static_type(&self) -> Type {
        Type::blueprint(self.id, self.name.clone(), BlueprintView::Static)
    }

    /// Total entries across all tables
    pub fn table_size(&self) -> usize {
        self.normal_members.len()
            + self.static_members.len()
            + self.normal_methods.len()
            + self.static_methods.len()
            + self.magic_methods.len()
    }
}
