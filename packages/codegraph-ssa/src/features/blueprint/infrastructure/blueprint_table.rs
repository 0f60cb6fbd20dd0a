/*
 * Blueprint Table
 *
 * Owns every blueprint of a unit, indexed by id and by name.
 *
 * Linking a parent (or interface) is guarded by `has_circular_dependency`:
 *
 * ```text
 * parent ─ancestors→ … → child ?    yes → CircularInheritance (rejected)
 * depth of that walk > max           → InheritanceTooDeep    (rejected)
 * child ─ancestors→ … → parent ?    yes → redundant link     (skipped)
 * ```
 *
 * Each walk keeps its own visited set, so diamond-shaped hierarchies are
 * visited once. A rejected link leaves both blueprints untouched.
 */

use ahash::{AHashMap as HashMap, AHashSet as HashSet};
use std::collections::VecDeque;

use crate::features::ssa::domain::{BlueprintId, ValueId};
use crate::features::type_resolution::domain::{BlueprintView, Type};
use crate::features::type_resolution::ports::TypeLookup;

use super::super::domain::{Blueprint, BlueprintKind, BlueprintState};
use super::super::errors::BlueprintError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    Linked,
    /// The parent was already an ancestor
    Redundant,
}

#[derive(Debug, Clone)]
pub struct BlueprintTable {
    blueprints: Vec<Blueprint>,
    by_name: HashMap<String, BlueprintId>,
    max_depth: usize,
}

impl Default for BlueprintTable {
    fn default() -> Self {
        Self::new(64)
    }
}

impl BlueprintTable {
    pub fn new(max_depth: usize) -> Self {
        Self {
            blueprints: Vec::new(),
            by_name: HashMap::new(),
            max_depth,
        }
    }

    /// Skeleton for `name`, reusing one created by an earlier forward reference
    pub fn create(&mut self, name: &str, kind: BlueprintKind) -> BlueprintId {
        if let Some(&id) = self.by_name.get(name) {
            if let Some(bp) = self.blueprints.get_mut(id.index()) {
                bp.kind = kind;
            }
            return id;
        }
        let id = BlueprintId::from_index(self.blueprints.len());
        self.blueprints.push(Blueprint::new(id, name, kind));
        self.by_name.insert(name.to_string(), id);

        tracing::debug!(blueprint = %name, id = %id, "Created blueprint skeleton");
        id
    }

    pub fn get(&self, id: BlueprintId) -> Option<&Blueprint> {
        self.blueprints.get(id.index())
    }

    pub fn get_mut(&mut self, id: BlueprintId) -> Option<&mut Blueprint> {
        self.blueprints.get_mut(id.index())
    }

    pub fn by_name(&self, name: &str) -> Option<&Blueprint> {
        self.by_name.get(name).and_then(|&id| self.get(id))
    }

    pub fn id_of(&self, name: &str) -> Option<BlueprintId> {
        self.by_name.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Blueprint> {
        self.blueprints.iter()
    }

    pub fn len(&self) -> usize {
        self.blueprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blueprints.is_empty()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    fn name_of(&self, id: BlueprintId) -> String {
        self.get(id).map(|b| b.name.clone()).unwrap_or_else(|| id.to_string())
    }

    /// Check whether `child → parent` may be added
    ///
    /// `Ok(Redundant)` when `parent` is already an ancestor of `child`.
    pub fn has_circular_dependency(
        &self,
        child: BlueprintId,
        parent: BlueprintId,
    ) -> Result<LinkOutcome, BlueprintError> {
        if self.get(child).is_none() {
            return Err(BlueprintError::Unknown(child.0));
        }
        if self.get(parent).is_none() {
            return Err(BlueprintError::Unknown(parent.0));
        }
        if child == parent {
            return Err(BlueprintError::CircularInheritance {
                child: self.name_of(child),
                parent: self.name_of(parent),
            });
        }

        // upward from parent: reaching child closes a cycle
        let (found, depth) = self.walk_ancestors(parent, child);
        if found {
            return Err(BlueprintError::CircularInheritance {
                child: self.name_of(child),
                parent: self.name_of(parent),
            });
        }
        if depth + 1 > self.max_depth {
            return Err(BlueprintError::InheritanceTooDeep {
                name: self.name_of(child),
                max_depth: self.max_depth,
            });
        }

        // upward from child: reaching parent makes the link redundant
        let (found, _) = self.walk_ancestors(child, parent);
        if found {
            return Ok(LinkOutcome::Redundant);
        }
        Ok(LinkOutcome::Linked)
    }

    /// BFS over ancestors of `start` looking for `target`
    ///
    /// Returns whether it was found and the longest chain seen, capped one
    /// past the depth limit.
    fn walk_ancestors(&self, start: BlueprintId, target: BlueprintId) -> (bool, usize) {
        let mut visited: HashSet<BlueprintId> = HashSet::new();
        let mut queue = VecDeque::from([(start, 0usize)]);
        let mut max_seen = 0;
        visited.insert(start);

        while let Some((current, depth)) = queue.pop_front() {
            max_seen = max_seen.max(depth);
            if depth > self.max_depth {
                break;
            }
            let Some(bp) = self.get(current) else {
                continue;
            };
            for ancestor in bp.ancestors() {
                if ancestor == target {
                    return (true, depth + 1);
                }
                if visited.insert(ancestor) {
                    queue.push_back((ancestor, depth + 1));
                }
            }
        }
        (false, max_seen)
    }

    /// Add `parent` to `child` and snapshot its tables into `child`
    pub fn link_parent(
        &mut self,
        child: BlueprintId,
        parent: BlueprintId,
    ) -> Result<LinkOutcome, BlueprintError> {
        self.link(child, parent, false)
    }

    pub fn link_interface(
        &mut self,
        child: BlueprintId,
        interface: BlueprintId,
    ) -> Result<LinkOutcome, BlueprintError> {
        self.link(child, interface, true)
    }

    fn link(
        &mut self,
        child: BlueprintId,
        parent: BlueprintId,
        interface: bool,
    ) -> Result<LinkOutcome, BlueprintError> {
        let outcome = match self.has_circular_dependency(child, parent) {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(
                    child = %self.name_of(child),
                    parent = %self.name_of(parent),
                    error = %err,
                    "Rejected blueprint link"
                );
                return Err(err);
            }
        };
        if outcome == LinkOutcome::Redundant {
            return Ok(outcome);
        }

        let snapshot = self
            .get(parent)
            .cloned()
            .ok_or(BlueprintError::Unknown(parent.0))?;
        let bp = self
            .get_mut(child)
            .ok_or(BlueprintError::Unknown(child.0))?;
        if interface {
            bp.interfaces.push(parent);
        } else {
            bp.parents.push(parent);
        }
        bp.inherit_from(&snapshot);
        bp.advance(BlueprintState::ParentLinking);

        tracing::debug!(child = %bp.name, parent = %snapshot.name, "Linked blueprint parent");
        Ok(LinkOutcome::Linked)
    }

    /// Member of `id` visible from `view`, searching ancestors breadth-first
    pub fn lookup_member(&self, id: BlueprintId, key: &str, view: BlueprintView) -> Option<ValueId> {
        let mut visited: HashSet<BlueprintId> = HashSet::new();
        let mut queue = VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            let bp = self.get(current)?;
            if let Some(value) = bp.own_member(key, view) {
                return Some(value);
            }
            queue.extend(bp.ancestors());
        }
        None
    }

    /// Constructor of `id` or its nearest ancestor
    pub fn lookup_constructor(&self, id: BlueprintId) -> Option<ValueId> {
        let mut visited: HashSet<BlueprintId> = HashSet::new();
        let mut queue = VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            let bp = self.get(current)?;
            if let Some(ctor) = bp.constructor() {
                return Some(ctor);
            }
            queue.extend(bp.parents.iter().copied());
        }
        None
    }
}

impl TypeLookup for BlueprintTable {
    fn lookup_type(&self, name: &str) -> Option<Type> {
        self.by_name(name).map(Blueprint::instance_type)
    }
}
