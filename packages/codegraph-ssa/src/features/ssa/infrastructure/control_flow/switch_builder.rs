//! Switch
//!
//! Cases never break on their own: a body that does not end in `break`
//! falls into the next body. Case tests are evaluated up front in the
//! dispatch block, each compared with `===` against the discriminant.
//!
//! `done` predecessors: case bodies that break or fall off the end, in
//! source order, then the dispatch block when there is no `default`.

use crate::features::ssa::domain::{BlockId, Terminator, ValueKind};
use crate::features::ssa::infrastructure::cursor::{JumpKind, JumpTarget};
use crate::features::ssa::ports::CfgEmitter;
use crate::features::syntax::domain::operators::BinaryOperator;
use crate::features::type_resolution::domain::Type;
use crate::shared::models::Span;

use super::{BodyFn, ValueFn};

pub struct SwitchBuilder<'f, E> {
    discriminant: ValueFn<'f, E>,
    /// `None` test marks `default`
    cases: Vec<(Option<ValueFn<'f, E>>, BodyFn<'f, E>)>,
    range: Span,
}

impl<'f, E: CfgEmitter> SwitchBuilder<'f, E> {
    pub fn new(discriminant: ValueFn<'f, E>, range: Span) -> Self {
        Self {
            discriminant,
            cases: Vec::new(),
            range,
        }
    }

    pub fn add_case(mut self, test: Option<ValueFn<'f, E>>, body: BodyFn<'f, E>) -> Self {
        self.cases.push((test, body));
        self
    }

    pub fn build(self, emitter: &mut E) {
        let label = emitter.cursor().take_pending_label();
        let discriminant = (self.discriminant)(emitter);
        let done = emitter.cursor().new_block("switch.done");

        let mut blocks: Vec<BlockId> = Vec::with_capacity(self.cases.len());
        let mut comparisons = Vec::new();
        let mut default = None;
        let mut bodies = Vec::with_capacity(self.cases.len());

        for (test, body) in self.cases {
            match test {
                Some(test) => {
                    let value = test(emitter);
                    let cursor = emitter.cursor();
                    let block = cursor.new_block("switch.case");
                    let cmp = cursor.emit_typed(
                        ValueKind::BinOp {
                            op: BinaryOperator::StrictEq,
                            lhs: discriminant,
                            rhs: value,
                        },
                        Some(Type::boolean()),
                        self.range,
                    );
                    comparisons.push((cmp, block));
                    blocks.push(block);
                }
                None => {
                    let block = emitter.cursor().new_block("switch.default");
                    default = Some(block);
                    blocks.push(block);
                }
            }
            bodies.push(body);
        }

        let cursor = emitter.cursor();
        let dispatch = cursor.current_block();
        let wired = cursor.terminate(Terminator::Switch {
            discriminant,
            cases: comparisons,
            default: default.unwrap_or(done),
        });
        if wired {
            for &block in &blocks {
                cursor.add_edge(dispatch, block);
            }
        }

        cursor.push_target(JumpTarget {
            label,
            break_to: done,
            continue_to: None,
            kind: JumpKind::Switch,
        });
        for (index, body) in bodies.into_iter().enumerate() {
            let block = blocks[index];
            let fallthrough = blocks.get(index + 1).copied().unwrap_or(done);
            emitter.cursor().seal(block);
            emitter.cursor().set_block(block);
            body(emitter);
            emitter.cursor().jump(fallthrough);
        }

        let cursor = emitter.cursor();
        cursor.pop_target();
        if wired && default.is_none() {
            cursor.add_edge(dispatch, done);
        }
        cursor.seal(done);
        cursor.set_block(done);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::ssa::domain::{ConstValue, ValueId, VariableId};
    use crate::features::ssa::infrastructure::{render_value, SsaCursor};

    fn num(c: &mut SsaCursor, n: f64) -> ValueId {
        c.constant(ConstValue::Number(n), Span::zero())
    }

    fn case<'f>(n: f64) -> Option<ValueFn<'f, SsaCursor>> {
        Some(Box::new(move |c: &mut SsaCursor| num(c, n)))
    }

    fn assign_then<'f>(a: VariableId, n: f64, brk: bool) -> BodyFn<'f, SsaCursor> {
        Box::new(move |c: &mut SsaCursor| {
            let v = num(c, n);
            c.assign(a, v);
            if brk {
                let target = c.break_target(None).unwrap();
                c.jump(target);
            }
        })
    }

    fn setup() -> (SsaCursor, VariableId, ValueId) {
        let mut c = SsaCursor::new("main");
        let a = c.declare_local("a");
        let one = num(&mut c, 1.0);
        c.assign(a, one);
        let x = c.undefined("x", Span::zero());
        (c, a, x)
    }

    #[test]
    fn test_fallthrough_reaches_next_body() {
        let (mut c, a, x) = setup();
        SwitchBuilder::new(Box::new(move |_: &mut SsaCursor| x), Span::zero())
            .add_case(case(1.0), assign_then(a, 22.0, false))
            .add_case(case(2.0), assign_then(a, 33.0, true))
            .build(&mut c);
        let merged = c.read_var(a);
        assert_eq!(render_value(&c.program, merged), "phi(a)[33,1]");
    }

    #[test]
    fn test_breaking_cases_without_default() {
        let (mut c, a, x) = setup();
        SwitchBuilder::new(Box::new(move |_: &mut SsaCursor| x), Span::zero())
            .add_case(case(1.0), assign_then(a, 22.0, true))
            .add_case(case(2.0), assign_then(a, 33.0, true))
            .build(&mut c);
        let merged = c.read_var(a);
        assert_eq!(render_value(&c.program, merged), "phi(a)[22,33,1]");
    }

    #[test]
    fn test_default_replaces_dispatch_edge() {
        let (mut c, a, x) = setup();
        SwitchBuilder::new(Box::new(move |_: &mut SsaCursor| x), Span::zero())
            .add_case(case(1.0), assign_then(a, 22.0, true))
            .add_case(case(2.0), assign_then(a, 33.0, true))
            .add_case(None, assign_then(a, 44.0, false))
            .build(&mut c);
        let merged = c.read_var(a);
        assert_eq!(render_value(&c.program, merged), "phi(a)[22,33,44]");
    }

    #[test]
    fn test_case_comparisons_use_strict_equality() {
        let (mut c, a, x) = setup();
        SwitchBuilder::new(Box::new(move |_: &mut SsaCursor| x), Span::zero())
            .add_case(case(7.0), assign_then(a, 1.0, true))
            .build(&mut c);
        let dispatch = c.program.function(c.function()).unwrap().entry;
        match c.program.block(dispatch).and_then(|b| b.terminator.clone()) {
            Some(Terminator::Switch { cases, .. }) => {
                assert_eq!(render_value(&c.program, cases[0].0), "seq(Undefined-x, 7)");
            }
            other => panic!("expected switch, got {:?}", other),
        }
    }
}
