//! Try / catch / finally
//!
//! One `ErrorHandler` terminator in the head block names every region:
//!
//! ```text
//! head ──► try ──► finally ──► done
//!   └────► catch ─┘
//! ```
//!
//! The catch block also has the end of the try body as predecessor, so
//! definitions made inside `try` are visible (as phis) in `catch`. Each body
//! runs in its own block scope; the catch callback binds its parameter there.

use crate::features::ssa::domain::Terminator;
use crate::features::ssa::ports::CfgEmitter;

use super::BodyFn;

pub struct TryBuilder<'f, E> {
    try_body: BodyFn<'f, E>,
    catch_body: Option<BodyFn<'f, E>>,
    finally_body: Option<BodyFn<'f, E>>,
}

impl<'f, E: CfgEmitter> TryBuilder<'f, E> {
    pub fn new(try_body: BodyFn<'f, E>) -> Self {
        Self {
            try_body,
            catch_body: None,
            finally_body: None,
        }
    }

    pub fn set_catch(mut self, body: BodyFn<'f, E>) -> Self {
        self.catch_body = Some(body);
        self
    }

    pub fn set_finally(mut self, body: BodyFn<'f, E>) -> Self {
        self.finally_body = Some(body);
        self
    }

    pub fn build(self, emitter: &mut E) {
        let cursor = emitter.cursor();
        let head = cursor.current_block();
        let try_block = cursor.new_block("error.try");
        let catch_block = self
            .catch_body
            .as_ref()
            .map(|_| cursor.new_block("error.catch"));
        let finally_block = self
            .finally_body
            .as_ref()
            .map(|_| cursor.new_block("error.finally"));
        let done = cursor.new_block("error.done");
        let after = finally_block.unwrap_or(done);

        if cursor.terminate(Terminator::ErrorHandler {
            try_block,
            catch_block,
            finally_block,
            done,
        }) {
            cursor.add_edge(head, try_block);
            if let Some(catch_block) = catch_block {
                cursor.add_edge(head, catch_block);
            }
        }
        cursor.seal(try_block);

        cursor.set_block(try_block);
        cursor.push_scope();
        (self.try_body)(emitter);
        let cursor = emitter.cursor();
        cursor.pop_scope();
        let try_end = cursor.current_block();
        cursor.jump(after);

        if let (Some(catch_block), Some(catch_body)) = (catch_block, self.catch_body) {
            cursor.add_edge(try_end, catch_block);
            cursor.seal(catch_block);
            cursor.set_block(catch_block);
            cursor.push_scope();
            catch_body(emitter);
            let cursor = emitter.cursor();
            cursor.pop_scope();
            cursor.jump(after);
        }

        if let (Some(finally_block), Some(finally_body)) = (finally_block, self.finally_body) {
            let cursor = emitter.cursor();
            cursor.seal(finally_block);
            cursor.set_block(finally_block);
            cursor.push_scope();
            finally_body(emitter);
            let cursor = emitter.cursor();
            cursor.pop_scope();
            cursor.jump(done);
        }

        let cursor = emitter.cursor();
        cursor.seal(done);
        cursor.set_block(done);
    }
}
