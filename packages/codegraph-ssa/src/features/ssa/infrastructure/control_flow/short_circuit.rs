//! Value-producing conditionals
//!
//! `a && b`, `a || b`, `a ?? b`, their assignment forms and `c ? x : y` all
//! lower the same way: a fresh synthetic local is assigned in each arm of an
//! If and read back after the merge, where the resolver builds the phi.

use crate::features::ssa::domain::ValueId;
use crate::features::ssa::ports::CfgEmitter;

use super::{IfBuilder, ValueFn};

pub struct ShortCircuitBuilder<'f, E> {
    name: &'static str,
    cond: ValueFn<'f, E>,
    when_true: ValueFn<'f, E>,
    when_false: ValueFn<'f, E>,
}

impl<'f, E: CfgEmitter + 'f> ShortCircuitBuilder<'f, E> {
    /// `name` labels the synthetic local (and so the merge phi)
    pub fn new(
        name: &'static str,
        cond: ValueFn<'f, E>,
        when_true: ValueFn<'f, E>,
        when_false: ValueFn<'f, E>,
    ) -> Self {
        Self {
            name,
            cond,
            when_true,
            when_false,
        }
    }

    pub fn build(self, emitter: &mut E) -> ValueId {
        let var = emitter.cursor().declare_local(self.name);
        let when_true = self.when_true;
        let when_false = self.when_false;

        IfBuilder::new()
            .append_item(
                self.cond,
                Box::new(move |e: &mut E| {
                    let value = when_true(e);
                    e.cursor().assign(var, value);
                }),
            )
            .set_else(Box::new(move |e: &mut E| {
                let value = when_false(e);
                e.cursor().assign(var, value);
            }))
            .build(emitter);

        emitter.cursor().read_var(var)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::ssa::domain::ConstValue;
    use crate::features::ssa::infrastructure::{render_value, SsaCursor};
    use crate::shared::models::Span;

    #[test]
    fn test_and_merges_right_then_left() {
        let mut c = SsaCursor::new("main");
        let left = c.undefined("l", Span::zero());
        let right = c.constant(ConstValue::Number(1.0), Span::zero());
        let value = ShortCircuitBuilder::new(
            "and_expr",
            Box::new(move |_: &mut SsaCursor| left),
            Box::new(move |_: &mut SsaCursor| right),
            Box::new(move |_: &mut SsaCursor| left),
        )
        .build(&mut c);
        assert_eq!(render_value(&c.program, value), "phi(and_expr)[1,Undefined-l]");
    }

    #[test]
    fn test_same_value_both_arms_collapses() {
        let mut c = SsaCursor::new("main");
        let cond = c.undefined("c", Span::zero());
        let v = c.constant(ConstValue::String("s".into()), Span::zero());
        let value = ShortCircuitBuilder::new(
            "ternary_expr",
            Box::new(move |_: &mut SsaCursor| cond),
            Box::new(move |_: &mut SsaCursor| v),
            Box::new(move |_: &mut SsaCursor| v),
        )
        .build(&mut c);
        assert_eq!(value, v);
    }
}
