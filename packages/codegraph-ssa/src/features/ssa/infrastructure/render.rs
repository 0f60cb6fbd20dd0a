//! Stable textual form of SSA values
//!
//! ```text
//! 1, "str", true, null          constants
//! Undefined-a, Parameter-p      named leaves
//! phi(a)[1,add(a, 1)]           phi; a phi already being printed shows its name
//! add(a, 1), not(x)             operators
//! f(1, 2), return(x)            calls and returns
//! ```

use crate::features::ssa::domain::{ConstValue, ContainerKind, ValueId, ValueKind};
use crate::features::syntax::domain::operators::{BinaryOperator, UnaryOperator};

use super::program::Program;

pub fn render_const(value: &ConstValue) -> String {
    match value {
        ConstValue::Number(n) if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 => {
            format!("{}", *n as i64)
        }
        ConstValue::Number(n) => n.to_string(),
        ConstValue::String(s) => format!("{:?}", s),
        ConstValue::Boolean(b) => b.to_string(),
        ConstValue::Null => "null".to_string(),
    }
}

pub fn binary_name(op: BinaryOperator) -> &'static str {
    match op {
        BinaryOperator::Add => "add",
        BinaryOperator::Sub => "sub",
        BinaryOperator::Mul => "mul",
        BinaryOperator::Div => "div",
        BinaryOperator::Mod => "mod",
        BinaryOperator::Exp => "exp",
        BinaryOperator::Shl => "shl",
        BinaryOperator::Shr => "shr",
        BinaryOperator::UShr => "ushr",
        BinaryOperator::BitAnd => "and",
        BinaryOperator::BitOr => "or",
        BinaryOperator::BitXor => "xor",
        BinaryOperator::Lt => "lt",
        BinaryOperator::Gt => "gt",
        BinaryOperator::LtEq => "le",
        BinaryOperator::GtEq => "ge",
        BinaryOperator::Eq => "eq",
        BinaryOperator::NotEq => "neq",
        BinaryOperator::StrictEq => "seq",
        BinaryOperator::StrictNotEq => "sneq",
        BinaryOperator::In => "in",
        BinaryOperator::InstanceOf => "instanceof",
        BinaryOperator::And => "land",
        BinaryOperator::Or => "lor",
        BinaryOperator::Nullish => "nullish",
        BinaryOperator::Comma => "comma",
    }
}

pub fn unary_name(op: UnaryOperator) -> &'static str {
    match op {
        UnaryOperator::Minus => "neg",
        UnaryOperator::Plus => "plus",
        UnaryOperator::Not => "not",
        UnaryOperator::BitNot => "bitnot",
        UnaryOperator::TypeOf => "typeof",
        UnaryOperator::Void => "void",
        UnaryOperator::Delete => "delete",
    }
}

/// Render `value` with every forward resolved
pub fn render_value(program: &Program, value: ValueId) -> String {
    let mut stack = Vec::new();
    render_inner(program, value, &mut stack)
}

fn render_inner(program: &Program, value: ValueId, stack: &mut Vec<ValueId>) -> String {
    let id = program.graph.resolve(value);
    let Some(v) = program.graph.get(id) else {
        return id.to_string();
    };
    let name = || v.name.clone().unwrap_or_else(|| id.to_string());

    match &v.kind {
        ValueKind::Const(c) => render_const(c),
        ValueKind::Undefined(_) => format!("Undefined-{}", name()),
        ValueKind::Parameter { .. } => format!("Parameter-{}", name()),
        ValueKind::FreeValue { .. } => format!("FreeValue-{}", name()),
        ValueKind::Function(_) => format!("Function-{}", name()),
        ValueKind::Phi(phi) => {
            let variable = program.scopes.variable_name(phi.variable).to_string();
            if stack.contains(&id) {
                return variable;
            }
            stack.push(id);
            let operands: Vec<String> = phi
                .operands
                .iter()
                .map(|&op| render_inner(program, op, stack))
                .collect();
            stack.pop();
            format!("phi({})[{}]", variable, operands.join(","))
        }
        ValueKind::BinOp { op, lhs, rhs } => {
            let (l, r) = render_pair(program, *lhs, *rhs, id, stack);
            format!("{}({}, {})", binary_name(*op), l, r)
        }
        ValueKind::UnOp { op, operand } => {
            format!("{}({})", unary_name(*op), render_nested(program, *operand, id, stack))
        }
        ValueKind::Call { callee, args } => {
            let callee = render_nested(program, *callee, id, stack);
            let args = render_list(program, args, id, stack);
            format!("{}({})", callee, args)
        }
        ValueKind::Return { results } => {
            format!("return({})", render_list(program, results, id, stack))
        }
        ValueKind::Make { container } => {
            let label = match (&v.ty, container) {
                (Some(ty), _) => ty.full_name(),
                (None, ContainerKind::Array) => "array".to_string(),
                (None, _) => "object".to_string(),
            };
            format!("make({})", label)
        }
        ValueKind::Next { iterable, .. } => {
            format!("next({})", render_nested(program, *iterable, id, stack))
        }
        ValueKind::Extract { tuple, field } => {
            format!("extract({}, {})", render_nested(program, *tuple, id, stack), field.as_str())
        }
        ValueKind::SideEffect { value, variable, .. } => format!(
            "side-effect({}, {})",
            render_nested(program, *value, id, stack),
            program.scopes.variable_name(*variable)
        ),
        ValueKind::TypeCast { value } => {
            let ty = v.ty.as_ref().map(|t| t.full_name()).unwrap_or_else(|| "any".to_string());
            format!("castType({}, {})", ty, render_nested(program, *value, id, stack))
        }
        ValueKind::Forward(target) => render_inner(program, *target, stack),
    }
}

fn render_nested(program: &Program, operand: ValueId, owner: ValueId, stack: &mut Vec<ValueId>) -> String {
    if stack.contains(&owner) {
        return program.display_name(owner);
    }
    stack.push(owner);
    let text = render_inner(program, operand, stack);
    stack.pop();
    text
}

fn render_pair(
    program: &Program,
    lhs: ValueId,
    rhs: ValueId,
    owner: ValueId,
    stack: &mut Vec<ValueId>,
) -> (String, String) {
    (
        render_nested(program, lhs, owner, stack),
        render_nested(program, rhs, owner, stack),
    )
}

fn render_list(program: &Program, items: &[ValueId], owner: ValueId, stack: &mut Vec<ValueId>) -> String {
    items
        .iter()
        .map(|&item| render_nested(program, item, owner, stack))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::ssa::domain::{UndefinedKind, Value};
    use crate::shared::models::Span;

    #[test]
    fn test_render_constants() {
        assert_eq!(render_const(&ConstValue::Number(42.0)), "42");
        assert_eq!(render_const(&ConstValue::Number(1.5)), "1.5");
        assert_eq!(render_const(&ConstValue::String("str".into())), "\"str\"");
        assert_eq!(render_const(&ConstValue::Null), "null");
    }

    #[test]
    fn test_render_binop_over_named_leaf() {
        let mut program = Program::new();
        let a = program.undefined(UndefinedKind::Default, "a", Span::zero());
        let one = program
            .graph
            .constant(ConstValue::Number(1.0), Span::zero());
        let sum = program.graph.add(Value::new(
            ValueKind::BinOp {
                op: BinaryOperator::Add,
                lhs: a,
                rhs: one,
            },
            Span::zero(),
        ));
        assert_eq!(render_value(&program, sum), "add(Undefined-a, 1)");
    }
}
