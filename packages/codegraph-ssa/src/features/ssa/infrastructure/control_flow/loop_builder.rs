//! Loops
//!
//! ```text
//! preheader (first)
//!     │
//!   header (condition) ──false──► exit
//!     │true                        ▲
//!   body ── break ─────────────────┘
//!     │ continue
//!   latch (third) ──back edge──► header
//! ```
//!
//! The header is sealed only after the back edge exists, so every variable
//! the body or latch writes becomes a header phi `[preheader, latch]`.

use crate::features::ssa::domain::{ConstValue, Terminator};
use crate::features::ssa::infrastructure::cursor::{JumpKind, JumpTarget};
use crate::features::ssa::ports::CfgEmitter;
use crate::shared::models::Span;

use super::{BodyFn, ValueFn};

pub struct LoopBuilder<'f, E> {
    first: Option<BodyFn<'f, E>>,
    condition: Option<ValueFn<'f, E>>,
    third: Option<BodyFn<'f, E>>,
    body: Option<BodyFn<'f, E>>,
    range: Span,
}

impl<'f, E: CfgEmitter> LoopBuilder<'f, E> {
    pub fn new(range: Span) -> Self {
        Self {
            first: None,
            condition: None,
            third: None,
            body: None,
            range,
        }
    }

    /// Initializer, run once in the preheader
    pub fn set_first(mut self, first: BodyFn<'f, E>) -> Self {
        self.first = Some(first);
        self
    }

    /// Defaults to `true`
    pub fn set_condition(mut self, condition: ValueFn<'f, E>) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Increment, run in the latch
    pub fn set_third(mut self, third: BodyFn<'f, E>) -> Self {
        self.third = Some(third);
        self
    }

    pub fn set_body(mut self, body: BodyFn<'f, E>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn build(self, emitter: &mut E) {
        let label = emitter.cursor().take_pending_label();
        emitter.cursor().push_scope();

        if let Some(first) = self.first {
            first(emitter);
        }

        let header = emitter.cursor().new_block("loop.header");
        emitter.cursor().jump(header);
        emitter.cursor().set_block(header);

        let cond = match self.condition {
            Some(condition) => condition(emitter),
            None => emitter
                .cursor()
                .constant(ConstValue::Boolean(true), self.range),
        };

        let cursor = emitter.cursor();
        let cond_end = cursor.current_block();
        let body = cursor.new_block("loop.body");
        let latch = cursor.new_block("loop.latch");
        let exit = cursor.new_block("loop.exit");
        if cursor.terminate(Terminator::Loop {
            cond,
            header,
            body,
            latch,
            exit,
        }) {
            cursor.add_edge(cond_end, body);
            cursor.add_edge(cond_end, exit);
        }
        cursor.seal(body);

        cursor.push_target(JumpTarget {
            label,
            break_to: exit,
            continue_to: Some(latch),
            kind: JumpKind::Loop,
        });
        cursor.set_block(body);
        if let Some(body) = self.body {
            body(emitter);
        }
        let cursor = emitter.cursor();
        cursor.jump(latch);
        cursor.pop_target();
        cursor.seal(latch);

        cursor.set_block(latch);
        if let Some(third) = self.third {
            third(emitter);
        }
        let cursor = emitter.cursor();
        cursor.jump(header);
        cursor.seal(header);
        cursor.seal(exit);
        cursor.set_block(exit);
        cursor.pop_scope();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::ssa::domain::ValueKind;
    use crate::features::ssa::infrastructure::{render_value, SsaCursor};
    use crate::features::syntax::domain::operators::BinaryOperator;

    #[test]
    fn test_for_loop_variable_is_header_phi() {
        let mut c = SsaCursor::new("main");
        let seen = std::rc::Rc::new(std::cell::Cell::new(None));
        let seen_in_body = seen.clone();
        let i_var = std::rc::Rc::new(std::cell::Cell::new(None));
        let (i_first, i_cond, i_body, i_third) =
            (i_var.clone(), i_var.clone(), i_var.clone(), i_var.clone());

        LoopBuilder::new(Span::zero())
            .set_first(Box::new(move |c: &mut SsaCursor| {
                let i = c.declare_local("i");
                let zero = c.constant(ConstValue::Number(0.0), Span::zero());
                c.assign(i, zero);
                i_first.set(Some(i));
            }))
            .set_condition(Box::new(move |c: &mut SsaCursor| {
                let i = c.read_var(i_cond.get().unwrap());
                let n = c.undefined("N", Span::zero());
                c.emit(ValueKind::BinOp { op: BinaryOperator::Lt, lhs: i, rhs: n }, Span::zero())
            }))
            .set_third(Box::new(move |c: &mut SsaCursor| {
                let var = i_third.get().unwrap();
                let i = c.read_var(var);
                let one = c.constant(ConstValue::Number(1.0), Span::zero());
                let next = c.emit(ValueKind::BinOp { op: BinaryOperator::Add, lhs: i, rhs: one }, Span::zero());
                c.assign(var, next);
            }))
            .set_body(Box::new(move |c: &mut SsaCursor| {
                let i = c.read_var(i_body.get().unwrap());
                seen_in_body.set(Some(i));
            }))
            .build(&mut c);

        let in_body = seen.get().unwrap();
        assert_eq!(render_value(&c.program, in_body), "phi(i)[0,add(i, 1)]");
        // loop scope is gone
        assert_eq!(c.lookup("i"), None);
    }

    #[test]
    fn test_header_has_preheader_and_latch_predecessors() {
        let mut c = SsaCursor::new("main");
        let entry = c.current_block();
        LoopBuilder::new(Span::zero()).build(&mut c);

        let exit = c.current_block();
        let header = c
            .program
            .blocks
            .iter()
            .find(|b| b.name == "loop.header")
            .map(|b| b.id)
            .unwrap();
        let latch = c
            .program
            .blocks
            .iter()
            .find(|b| b.name == "loop.latch")
            .map(|b| b.id)
            .unwrap();
        assert_eq!(c.program.predecessors(header), &[entry, latch]);
        assert!(c.program.is_sealed(header));
        assert!(c.program.is_sealed(exit));
        assert!(matches!(
            c.program.block(header).and_then(|b| b.terminator.clone()),
            Some(Terminator::Loop { .. })
        ));
    }
}
