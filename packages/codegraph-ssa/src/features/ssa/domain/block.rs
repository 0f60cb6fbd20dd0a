//! Basic blocks and terminators

use serde::{Deserialize, Serialize};

use super::ids::{BlockId, FunctionId, ValueId};

/// The single control transfer ending a block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Terminator {
    Jump(BlockId),
    If {
        cond: ValueId,
        then_block: BlockId,
        else_block: BlockId,
    },
    Loop {
        cond: ValueId,
        header: BlockId,
        body: BlockId,
        latch: BlockId,
        exit: BlockId,
    },
    Switch {
        discriminant: ValueId,
        /// `(comparison, case body)` in source order
        cases: Vec<(ValueId, BlockId)>,
        default: BlockId,
    },
    Return(ValueId),
    ErrorHandler {
        try_block: BlockId,
        catch_block: Option<BlockId>,
        finally_block: Option<BlockId>,
        done: BlockId,
    },
}

impl Terminator {
    pub fn successors(&self) -> Vec<BlockId> {
        match self {
            Self::Jump(target) => vec![*target],
            Self::If {
                then_block,
                else_block,
                ..
            } => vec![*then_block, *else_block],
            Self::Loop { body, exit, .. } => vec![*body, *exit],
            Self::Switch { cases, default, .. } => {
                let mut targets: Vec<BlockId> = cases.iter().map(|(_, b)| *b).collect();
                targets.push(*default);
                targets
            }
            Self::Return(_) => Vec::new(),
            Self::ErrorHandler {
                try_block,
                catch_block,
                ..
            } => {
                let mut targets = vec![*try_block];
                targets.extend(catch_block.iter().copied());
                targets
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicBlock {
    pub id: BlockId,
    pub function: FunctionId,
    pub name: String,
    pub preds: Vec<BlockId>,
    pub succs: Vec<BlockId>,
    pub phis: Vec<ValueId>,
    pub instructions: Vec<ValueId>,
    pub terminator: Option<Terminator>,
    /// All predecessors are known
    pub sealed: bool,
}

impl BasicBlock {
    pub fn new(id: BlockId, function: FunctionId, name: impl Into<String>) -> Self {
        Self {
            id,
            function,
            name: name.into(),
            preds: Vec::new(),
            succs: Vec::new(),
            phis: Vec::new(),
            instructions: Vec::new(),
            terminator: None,
            sealed: false,
        }
    }

    /// A terminator has been emitted; later statements are dead
    pub fn is_finished(&self) -> bool {
        self.terminator.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switch_successors_end_with_default() {
        let term = Terminator::Switch {
            discriminant: ValueId(0),
            cases: vec![(ValueId(1), BlockId(2)), (ValueId(3), BlockId(4))],
            default: BlockId(5),
        };
        assert_eq!(term.successors(), vec![BlockId(2), BlockId(4), BlockId(5)]);
    }

    #[test]
    fn test_new_block_is_open() {
        let block = BasicBlock::new(BlockId(0), FunctionId(0), "entry");
        assert!(!block.is_finished());
        assert!(!block.sealed);
    }
}
