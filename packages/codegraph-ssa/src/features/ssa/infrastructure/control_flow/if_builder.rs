//! If / else-if / else
//!
//! ```text
//!   cond₁ ──true──► then₁ ──┐
//!     │false                │
//!   cond₂ ──true──► then₂ ──┤
//!     │false                ▼
//!   else ─────────────────► done
//! ```
//!
//! `done` predecessors follow the item order with the else (or the last
//! false edge) at the end.

use crate::features::ssa::domain::Terminator;
use crate::features::ssa::ports::CfgEmitter;
use super::{BodyFn, ValueFn};

pub struct IfBuilder<'f, E> {
    items: Vec<(ValueFn<'f, E>, BodyFn<'f, E>)>,
    else_body: Option<BodyFn<'f, E>>,
}

impl<'f, E: CfgEmitter> IfBuilder<'f, E> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            else_body: None,
        }
    }

    /// Add an `if`/`else if` arm
    pub fn append_item(mut self, cond: ValueFn<'f, E>, body: BodyFn<'f, E>) -> Self {
        self.items.push((cond, body));
        self
    }

    pub fn set_else(mut self, body: BodyFn<'f, E>) -> Self {
        self.else_body = Some(body);
        self
    }

    pub fn build(self, emitter: &mut E) {
        let done = emitter.cursor().new_block("if.done");

        for (cond, body) in self.items {
            let cond = cond(emitter);
            let cursor = emitter.cursor();
            let head = cursor.current_block();
            let then_block = cursor.new_block("if.then");
            let else_block = cursor.new_block("if.else");
            if cursor.terminate(Terminator::If {
                cond,
                then_block,
                else_block,
            }) {
                cursor.add_edge(head, then_block);
                cursor.add_edge(head, else_block);
            }
            cursor.seal(then_block);
            cursor.seal(else_block);

            cursor.set_block(then_block);
            body(emitter);
            emitter.cursor().jump(done);
            emitter.cursor().set_block(else_block);
        }

        if let Some(body) = self.else_body {
            body(emitter);
        }
        let cursor = emitter.cursor();
        cursor.jump(done);
        cursor.seal(done);
        cursor.set_block(done);
    }
}
