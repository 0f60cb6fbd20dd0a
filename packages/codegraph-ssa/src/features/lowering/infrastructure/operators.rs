//! Operators
//!
//! Binary and unary values with optional folding over constants, result
//! typing, and the short-circuit forms.

use crate::features::ssa::domain::{ConstValue, UndefinedKind, ValueId, ValueKind};
use crate::features::ssa::infrastructure::{render_const, ShortCircuitBuilder, ValueFn};
use crate::features::syntax::domain::ast::Expr;
use crate::features::syntax::domain::operators::{BinaryOperator, UnaryOperator};
use crate::features::type_resolution::{Type, TypeKind};
use crate::shared::models::Span;

use super::builder::UnitBuilder;

impl<'a> UnitBuilder<'a> {
    pub(crate) fn emit_binary(
        &mut self,
        op: BinaryOperator,
        lhs: ValueId,
        rhs: ValueId,
        range: Span,
    ) -> ValueId {
        if self.options.fold_constants {
            if let Some(folded) = self.const_of(lhs).zip(self.const_of(rhs)).and_then(|(l, r)| fold_binary(op, &l, &r)) {
                return self.cursor.constant(folded, range);
            }
        }
        if op == BinaryOperator::Comma {
            return rhs;
        }
        let ty = binary_result_type(op, self.cursor.ty(lhs), self.cursor.ty(rhs));
        self.cursor
            .emit_typed(ValueKind::BinOp { op, lhs, rhs }, ty, range)
    }

    pub(crate) fn emit_unary(&mut self, op: UnaryOperator, operand: ValueId, range: Span) -> ValueId {
        match op {
            UnaryOperator::TypeOf => return self.emit_typeof(operand, range),
            UnaryOperator::Void => {
                return self.cursor.undefined_typed(
                    UndefinedKind::Default,
                    "undefined",
                    Some(Type::undefined()),
                    range,
                )
            }
            UnaryOperator::Delete => return self.cursor.constant(ConstValue::Boolean(true), range),
            _ => {}
        }
        if self.options.fold_constants {
            if let Some(folded) = self.const_of(operand).and_then(|c| fold_unary(op, &c)) {
                return self.cursor.constant(folded, range);
            }
        }
        let ty = match op {
            UnaryOperator::Not => Type::boolean(),
            _ => Type::number(),
        };
        self.cursor
            .emit_typed(ValueKind::UnOp { op, operand }, Some(ty), range)
    }

    /// `typeof v` is a string constant whenever the operand's type decides it
    fn emit_typeof(&mut self, operand: ValueId, range: Span) -> ValueId {
        let known = match self.const_of(operand) {
            Some(ConstValue::Number(_)) => Some("number"),
            Some(ConstValue::String(_)) => Some("string"),
            Some(ConstValue::Boolean(_)) => Some("boolean"),
            Some(ConstValue::Null) => Some("object"),
            None => self.cursor.ty(operand).and_then(Type::typeof_name),
        };
        match known {
            Some(name) => self.cursor.constant(ConstValue::String(name.to_string()), range),
            None => self.cursor.emit_typed(
                ValueKind::UnOp {
                    op: UnaryOperator::TypeOf,
                    operand,
                },
                Some(Type::string()),
                range,
            ),
        }
    }

    /// `a && b`, `a || b`, `a ?? b` with `a` already evaluated
    ///
    /// The right operand is only lowered inside the arm that needs it.
    pub(crate) fn short_circuit(
        &mut self,
        op: BinaryOperator,
        left: ValueId,
        right: &'a Expr,
        range: Span,
    ) -> ValueId {
        let name = match op {
            BinaryOperator::And => "and_expr",
            BinaryOperator::Or => "or_expr",
            _ => "nullish_expr",
        };
        let cond: ValueFn<'a, Self> = match op {
            BinaryOperator::Nullish => Box::new(move |b: &mut Self| {
                let null = b.cursor.constant(ConstValue::Null, range);
                b.emit_binary(BinaryOperator::Eq, left, null, range)
            }),
            _ => Box::new(move |_: &mut Self| left),
        };
        let keep_left: ValueFn<'a, Self> = Box::new(move |_: &mut Self| left);
        let take_right: ValueFn<'a, Self> = Box::new(move |b: &mut Self| b.visit_expr(right));
        let (when_true, when_false) = match op {
            BinaryOperator::Or => (keep_left, take_right),
            _ => (take_right, keep_left),
        };
        ShortCircuitBuilder::new(name, cond, when_true, when_false).build(self)
    }

    pub(crate) fn const_of(&self, value: ValueId) -> Option<ConstValue> {
        self.cursor
            .program
            .graph
            .get(value)
            .and_then(|v| v.as_const())
            .cloned()
    }
}

fn binary_result_type(op: BinaryOperator, lhs: Option<&Type>, rhs: Option<&Type>) -> Option<Type> {
    use BinaryOperator::*;
    let is = |ty: Option<&Type>, kind: TypeKind| ty.map_or(false, |t| t.kind == kind);
    match op {
        Add if is(lhs, TypeKind::String) || is(rhs, TypeKind::String) => Some(Type::string()),
        Add if is(lhs, TypeKind::Number) && is(rhs, TypeKind::Number) => Some(Type::number()),
        Add => None,
        Sub | Mul | Div | Mod | Exp | Shl | Shr | UShr | BitAnd | BitOr | BitXor => {
            Some(Type::number())
        }
        Lt | Gt | LtEq | GtEq | Eq | NotEq | StrictEq | StrictNotEq | In | InstanceOf => {
            Some(Type::boolean())
        }
        Comma => rhs.cloned(),
        And | Or | Nullish => None,
    }
}

/// JavaScript `ToString` for constants
fn js_string(value: &ConstValue) -> String {
    match value {
        ConstValue::String(s) => s.clone(),
        ConstValue::Number(n) if n.is_nan() => "NaN".to_string(),
        ConstValue::Number(n) if n.is_infinite() && *n > 0.0 => "Infinity".to_string(),
        ConstValue::Number(n) if n.is_infinite() => "-Infinity".to_string(),
        other => render_const(other),
    }
}

/// JavaScript `ToNumber` for constants
fn js_number(value: &ConstValue) -> f64 {
    match value {
        ConstValue::Number(n) => *n,
        ConstValue::Boolean(b) => f64::from(u8::from(*b)),
        ConstValue::Null => 0.0,
        ConstValue::String(s) => string_to_number(s),
    }
}

/// JavaScript `StringToNumber`: blank is 0, unparsable text is NaN
fn string_to_number(text: &str) -> f64 {
    let text = text.trim();
    if text.is_empty() {
        return 0.0;
    }
    if let Some(n) = prefixed_integer(text) {
        return n;
    }
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, text.strip_prefix('+').unwrap_or(text)),
    };
    if unsigned == "Infinity" {
        return sign * f64::INFINITY;
    }
    if !is_decimal_literal(unsigned) {
        return f64::NAN;
    }
    unsigned.parse::<f64>().map(|n| sign * n).unwrap_or(f64::NAN)
}

/// `0x`/`0o`/`0b` integer text; `None` without a prefix, NaN on bad digits
pub(crate) fn prefixed_integer(text: &str) -> Option<f64> {
    let radix = match text.get(..2).map(str::to_ascii_lowercase).as_deref() {
        Some("0x") => 16,
        Some("0o") => 8,
        Some("0b") => 2,
        _ => return None,
    };
    let digits = &text[2..];
    if digits.is_empty() {
        return Some(f64::NAN);
    }
    let value = digits.chars().try_fold(0.0_f64, |acc, c| {
        c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
    });
    Some(value.unwrap_or(f64::NAN))
}

/// Digits with an optional fraction and exponent, nothing else
pub(crate) fn is_decimal_literal(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
        && text
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
}

/// JavaScript `ToInt32`: truncate, then wrap modulo 2^32
fn to_int32(n: f64) -> i32 {
    if !n.is_finite() {
        return 0;
    }
    n.trunc().rem_euclid(4_294_967_296.0) as u32 as i32
}

fn strict_equals(l: &ConstValue, r: &ConstValue) -> bool {
    match (l, r) {
        (ConstValue::Number(a), ConstValue::Number(b)) => a == b,
        _ => l == r,
    }
}

/// Fold a binary operation over two constants
pub(crate) fn fold_binary(op: BinaryOperator, l: &ConstValue, r: &ConstValue) -> Option<ConstValue> {
    use BinaryOperator::*;
    use ConstValue::{Boolean, Number};

    let folded = match op {
        Add => match (l, r) {
            (ConstValue::String(_), _) | (_, ConstValue::String(_)) => {
                ConstValue::String(format!("{}{}", js_string(l), js_string(r)))
            }
            _ => Number(js_number(l) + js_number(r)),
        },
        Sub => Number(js_number(l) - js_number(r)),
        Mul => Number(js_number(l) * js_number(r)),
        Div => Number(js_number(l) / js_number(r)),
        Mod => Number(js_number(l) % js_number(r)),
        Exp => Number(js_number(l).powf(js_number(r))),
        BitAnd => Number(f64::from(to_int32(js_number(l)) & to_int32(js_number(r)))),
        BitOr => Number(f64::from(to_int32(js_number(l)) | to_int32(js_number(r)))),
        BitXor => Number(f64::from(to_int32(js_number(l)) ^ to_int32(js_number(r)))),
        Shl => Number(f64::from(to_int32(js_number(l)).wrapping_shl(to_int32(js_number(r)) as u32 & 31))),
        Shr => Number(f64::from(to_int32(js_number(l)).wrapping_shr(to_int32(js_number(r)) as u32 & 31))),
        UShr => {
            let shifted = (to_int32(js_number(l)) as u32).wrapping_shr(to_int32(js_number(r)) as u32 & 31);
            Number(f64::from(shifted))
        }
        Lt | Gt | LtEq | GtEq => {
            let ordering = match (l, r) {
                (ConstValue::String(a), ConstValue::String(b)) => Some(a.cmp(b)),
                _ => js_number(l).partial_cmp(&js_number(r)),
            };
            let result = match ordering {
                None => false,
                Some(ordering) => match op {
                    Lt => ordering.is_lt(),
                    Gt => ordering.is_gt(),
                    LtEq => ordering.is_le(),
                    _ => ordering.is_ge(),
                },
            };
            Boolean(result)
        }
        StrictEq => Boolean(strict_equals(l, r)),
        StrictNotEq => Boolean(!strict_equals(l, r)),
        Eq | NotEq => {
            let equal = match (l, r) {
                (ConstValue::Null, ConstValue::Null) => true,
                (ConstValue::Null, _) | (_, ConstValue::Null) => false,
                (ConstValue::String(a), ConstValue::String(b)) => a == b,
                _ => js_number(l) == js_number(r),
            };
            Boolean(if op == Eq { equal } else { !equal })
        }
        And => if l.is_truthy() { r.clone() } else { l.clone() },
        Or => if l.is_truthy() { l.clone() } else { r.clone() },
        Nullish => match l {
            ConstValue::Null => r.clone(),
            _ => l.clone(),
        },
        Comma => r.clone(),
        In | InstanceOf => return None,
    };
    Some(folded)
}

fn fold_unary(op: UnaryOperator, value: &ConstValue) -> Option<ConstValue> {
    let folded = match op {
        UnaryOperator::Not => ConstValue::Boolean(!value.is_truthy()),
        UnaryOperator::Minus => ConstValue::Number(-js_number(value)),
        UnaryOperator::Plus => ConstValue::Number(js_number(value)),
        UnaryOperator::BitNot => ConstValue::Number(f64::from(!to_int32(js_number(value)))),
        UnaryOperator::TypeOf | UnaryOperator::Void | UnaryOperator::Delete => return None,
    };
    Some(folded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildOptions;
    use crate::features::ssa::infrastructure::render_value;

    fn num(n: f64) -> ConstValue {
        ConstValue::Number(n)
    }

    fn string(s: &str) -> ConstValue {
        ConstValue::String(s.to_string())
    }

    #[test]
    fn test_fold_arithmetic_and_concatenation() {
        assert_eq!(fold_binary(BinaryOperator::Add, &num(1.0), &num(2.0)), Some(num(3.0)));
        assert_eq!(fold_binary(BinaryOperator::Add, &string("a"), &num(1.0)), Some(string("a1")));
        assert_eq!(fold_binary(BinaryOperator::Add, &num(1.5), &string("")), Some(string("1.5")));
        assert_eq!(fold_binary(BinaryOperator::Mul, &num(6.0), &num(7.0)), Some(num(42.0)));
        assert_eq!(fold_binary(BinaryOperator::Shl, &num(1.0), &num(4.0)), Some(num(16.0)));
        assert_eq!(fold_binary(BinaryOperator::UShr, &num(-1.0), &num(28.0)), Some(num(15.0)));
    }

    #[test]
    fn test_bitwise_folds_wrap_like_int32() {
        let two_32 = 4_294_967_296.0;
        assert_eq!(fold_binary(BinaryOperator::BitOr, &num(two_32 + 5.0), &num(0.0)), Some(num(5.0)));
        assert_eq!(fold_binary(BinaryOperator::BitOr, &num(4_294_967_295.0), &num(0.0)), Some(num(-1.0)));
        assert_eq!(fold_binary(BinaryOperator::BitOr, &num(-two_32 - 1.0), &num(0.0)), Some(num(-1.0)));
        assert_eq!(fold_binary(BinaryOperator::Shl, &num(1.0), &num(31.0)), Some(num(-2_147_483_648.0)));
        assert_eq!(fold_binary(BinaryOperator::Shl, &num(1.0), &num(32.0)), Some(num(1.0)));
        assert_eq!(fold_binary(BinaryOperator::BitAnd, &num(f64::NAN), &num(7.0)), Some(num(0.0)));
    }

    #[test]
    fn test_strings_convert_like_javascript_numbers() {
        let minus_zero = |s: &str| fold_binary(BinaryOperator::Sub, &string(s), &num(0.0));
        assert_eq!(minus_zero("0x10"), Some(num(16.0)));
        assert_eq!(minus_zero("0b11"), Some(num(3.0)));
        assert_eq!(minus_zero(" 12 "), Some(num(12.0)));
        assert_eq!(minus_zero(""), Some(num(0.0)));
        assert_eq!(minus_zero("-Infinity"), Some(num(f64::NEG_INFINITY)));
        assert_eq!(minus_zero("1e3"), Some(num(1000.0)));

        for text in ["inf", "nan", "infinity", "-0x10", "0x", "1_000", "12px"] {
            match minus_zero(text) {
                Some(ConstValue::Number(n)) => assert!(n.is_nan(), "{} gave {}", text, n),
                other => panic!("{} gave {:?}", text, other),
            }
        }
    }

    #[test]
    fn test_fold_comparisons() {
        assert_eq!(
            fold_binary(BinaryOperator::Lt, &num(1.0), &num(2.0)),
            Some(ConstValue::Boolean(true))
        );
        assert_eq!(
            fold_binary(BinaryOperator::StrictEq, &num(1.0), &string("1")),
            Some(ConstValue::Boolean(false))
        );
        assert_eq!(
            fold_binary(BinaryOperator::Eq, &num(1.0), &string("1")),
            Some(ConstValue::Boolean(true))
        );
        assert_eq!(
            fold_binary(BinaryOperator::Eq, &ConstValue::Null, &num(0.0)),
            Some(ConstValue::Boolean(false))
        );
        assert_eq!(fold_binary(BinaryOperator::In, &string("a"), &num(0.0)), None);
    }

    #[test]
    fn test_fold_unary() {
        assert_eq!(fold_unary(UnaryOperator::Not, &num(0.0)), Some(ConstValue::Boolean(true)));
        assert_eq!(fold_unary(UnaryOperator::Minus, &num(3.0)), Some(num(-3.0)));
        assert_eq!(fold_unary(UnaryOperator::BitNot, &num(0.0)), Some(num(-1.0)));
        assert_eq!(fold_unary(UnaryOperator::TypeOf, &num(0.0)), None);
    }

    #[test]
    fn test_folding_can_be_disabled() {
        let mut b = UnitBuilder::new(
            "main",
            BuildOptions {
                fold_constants: false,
                ..BuildOptions::default()
            },
        );
        let one = b.cursor.constant(num(1.0), Span::zero());
        let two = b.cursor.constant(num(2.0), Span::zero());
        let sum = b.emit_binary(BinaryOperator::Add, one, two, Span::zero());
        assert_eq!(render_value(&b.cursor.program, sum), "add(1, 2)");
        assert_eq!(b.cursor.ty(sum), Some(&Type::number()));
    }

    #[test]
    fn test_typeof_uses_operand_type() {
        let mut b = UnitBuilder::new("main", BuildOptions::default());
        let text = b.cursor.undefined_typed(
            UndefinedKind::Default,
            "s",
            Some(Type::string()),
            Span::zero(),
        );
        let unknown = b.cursor.undefined("u", Span::zero());
        let known = b.emit_unary(UnaryOperator::TypeOf, text, Span::zero());
        let opaque = b.emit_unary(UnaryOperator::TypeOf, unknown, Span::zero());
        assert_eq!(render_value(&b.cursor.program, known), "\"string\"");
        assert_eq!(render_value(&b.cursor.program, opaque), "typeof(Undefined-u)");
    }

    #[test]
    fn test_comparison_is_boolean_typed() {
        let mut b = UnitBuilder::new("main", BuildOptions::default());
        let x = b.cursor.undefined("x", Span::zero());
        let one = b.cursor.constant(num(1.0), Span::zero());
        let cmp = b.emit_binary(BinaryOperator::Lt, x, one, Span::zero());
        assert_eq!(b.cursor.ty(cmp), Some(&Type::boolean()));
    }
}
