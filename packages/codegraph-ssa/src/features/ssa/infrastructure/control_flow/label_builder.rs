//! Labeled statements
//!
//! The body runs in its own block with a `done` block as `break label`
//! destination. A loop or switch directly under the label adopts it, so
//! `continue label` finds the loop latch.

use crate::features::ssa::infrastructure::cursor::{JumpKind, JumpTarget};
use crate::features::ssa::ports::CfgEmitter;

use super::BodyFn;

pub struct LabelBuilder<'f, E> {
    label: String,
    body: BodyFn<'f, E>,
    names_iteration: bool,
}

impl<'f, E: CfgEmitter> LabelBuilder<'f, E> {
    pub fn new(label: impl Into<String>, body: BodyFn<'f, E>) -> Self {
        Self {
            label: label.into(),
            body,
            names_iteration: false,
        }
    }

    /// The body is a loop or switch that should carry the label
    pub fn names_iteration(mut self, yes: bool) -> Self {
        self.names_iteration = yes;
        self
    }

    pub fn build(self, emitter: &mut E) {
        let cursor = emitter.cursor();
        let body = cursor.new_block("label.body");
        let done = cursor.new_block("label.done");
        cursor.jump(body);
        cursor.seal(body);
        cursor.set_block(body);

        cursor.push_target(JumpTarget {
            label: Some(self.label.clone()),
            break_to: done,
            continue_to: None,
            kind: JumpKind::Label,
        });
        if self.names_iteration {
            cursor.current.pending_label = Some(self.label);
        }
        (self.body)(emitter);

        let cursor = emitter.cursor();
        cursor.current.pending_label = None;
        cursor.pop_target();
        cursor.jump(done);
        cursor.seal(done);
        cursor.set_block(done);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::ssa::domain::ConstValue;
    use crate::features::ssa::infrastructure::control_flow::LoopBuilder;
    use crate::features::ssa::infrastructure::{render_value, SsaCursor};
    use crate::shared::models::Span;

    #[test]
    fn test_break_label_skips_rest_of_body() {
        let mut c = SsaCursor::new("main");
        let a = c.declare_local("a");
        let one = c.constant(ConstValue::Number(1.0), Span::zero());
        c.assign(a, one);

        LabelBuilder::new(
            "blk",
            Box::new(move |c: &mut SsaCursor| {
                let two = c.constant(ConstValue::Number(2.0), Span::zero());
                c.assign(a, two);
                let target = c.break_target(Some("blk")).unwrap();
                c.jump(target);
                // dead: block already finished
                c.jump(target);
            }),
        )
        .build(&mut c);

        let value = c.read_var(a);
        assert_eq!(render_value(&c.program, value), "2");
    }

    #[test]
    fn test_labeled_loop_adopts_label_for_continue() {
        let mut c = SsaCursor::new("main");
        let found = std::rc::Rc::new(std::cell::Cell::new(false));
        let found_in_body = found.clone();

        LabelBuilder::new(
            "outer",
            Box::new(move |c: &mut SsaCursor| {
                LoopBuilder::new(Span::zero())
                    .set_body(Box::new(move |c: &mut SsaCursor| {
                        found_in_body.set(c.continue_target(Some("outer")).is_some());
                        let exit = c.break_target(None).unwrap();
                        c.jump(exit);
                    }))
                    .build(c);
            }),
        )
        .names_iteration(true)
        .build(&mut c);

        assert!(found.get());
        assert!(c.current.pending_label.is_none());
    }
}
