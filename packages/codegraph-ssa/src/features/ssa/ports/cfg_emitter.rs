//! Control-flow emitter port
//!
//! The structured builders need two things from their driver: the SSA cursor
//! to emit into, and the driver itself to hand back to statement and
//! expression callbacks. Any type exposing a cursor qualifies.

use crate::features::ssa::infrastructure::cursor::SsaCursor;

pub trait CfgEmitter {
    fn cursor(&mut self) -> &mut SsaCursor;
}

impl CfgEmitter for SsaCursor {
    fn cursor(&mut self) -> &mut SsaCursor {
        self
    }
}
