//! Deferred builder queue
//!
//! Bodies of functions, methods and blueprint members are not lowered when
//! their declaration is visited. Each one becomes a boxed task filed under
//! its owner and runs when the owner is first used or when the unit drains
//! the queue. Taking an owner's tasks removes them, so every task runs at
//! most once even if it re-enters the queue.

use std::collections::BTreeMap;

use crate::features::ssa::domain::{BlueprintId, FunctionId};

/// Entity whose lazy body a task builds
///
/// Blueprints order before functions, so a full drain materializes class
/// members before free functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Owner {
    Blueprint(BlueprintId),
    Function(FunctionId),
}

pub type DeferredTask<'a, C> = Box<dyn FnOnce(&mut C) + 'a>;

pub struct DeferredQueue<'a, C> {
    tasks: BTreeMap<Owner, Vec<DeferredTask<'a, C>>>,
}

impl<'a, C> Default for DeferredQueue<'a, C> {
    fn default() -> Self {
        Self {
            tasks: BTreeMap::new(),
        }
    }
}

impl<'a, C> DeferredQueue<'a, C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, owner: Owner, task: DeferredTask<'a, C>) {
        self.tasks.entry(owner).or_default().push(task);
    }

    /// Remove and return every task of `owner`, in push order
    pub fn take(&mut self, owner: Owner) -> Vec<DeferredTask<'a, C>> {
        self.tasks.remove(&owner).unwrap_or_default()
    }

    /// Remove the first owner in drain order with its tasks
    pub fn pop_next(&mut self) -> Option<(Owner, Vec<DeferredTask<'a, C>>)> {
        let owner = *self.tasks.keys().next()?;
        let tasks = self.take(owner);
        Some((owner, tasks))
    }

    pub fn contains(&self, owner: Owner) -> bool {
        self.tasks.contains_key(&owner)
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Pending task count across owners
    pub fn len(&self) -> usize {
        self.tasks.values().map(Vec::len).sum()
    }
}

impl<'a, C> std::fmt::Debug for DeferredQueue<'a, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeferredQueue")
            .field("owners", &self.tasks.keys().collect::<Vec<_>>())
            .field("tasks", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_consumes_tasks_in_order() {
        let mut queue: DeferredQueue<'_, Vec<u32>> = DeferredQueue::new();
        let owner = Owner::Function(FunctionId(1));
        queue.push(owner, Box::new(|log: &mut Vec<u32>| log.push(1)));
        queue.push(owner, Box::new(|log: &mut Vec<u32>| log.push(2)));
        assert_eq!(queue.len(), 2);

        let mut log = Vec::new();
        for task in queue.take(owner) {
            task(&mut log);
        }
        assert_eq!(log, vec![1, 2]);
        assert!(queue.take(owner).is_empty());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_blueprints_drain_before_functions() {
        let mut queue: DeferredQueue<'_, Vec<&'static str>> = DeferredQueue::new();
        queue.push(Owner::Function(FunctionId(0)), Box::new(|log: &mut Vec<&'static str>| log.push("f")));
        queue.push(Owner::Blueprint(BlueprintId(3)), Box::new(|log: &mut Vec<&'static str>| log.push("bp")));

        let mut log = Vec::new();
        while let Some((_, tasks)) = queue.pop_next() {
            for task in tasks {
                task(&mut log);
            }
        }
        assert_eq!(log, vec!["bp", "f"]);
    }
}
