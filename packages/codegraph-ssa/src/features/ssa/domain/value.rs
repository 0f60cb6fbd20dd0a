/*
 * SSA values
 *
 * One tagged union for everything an expression or statement effect can
 * produce. Values are immutable after creation except for:
 * - `ty`, which merge logic may refine
 * - a collapsed trivial phi, which becomes `Forward(replacement)`
 */

use serde::{Deserialize, Serialize};

use crate::features::syntax::domain::operators::{BinaryOperator, UnaryOperator};
use crate::features::type_resolution::domain::Type;
use crate::shared::models::Span;

use super::ids::{BlockId, FunctionId, ValueId, VariableId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConstValue {
    Number(f64),
    String(String),
    Boolean(bool),
    Null,
}

impl ConstValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// JavaScript truthiness
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::String(s) => !s.is_empty(),
            Self::Boolean(b) => *b,
            Self::Null => false,
        }
    }
}

/// Why a value is undefined
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UndefinedKind {
    /// Unassigned variable or implicit global
    Default,
    /// Member read with no reaching definition
    Member { object: ValueId, key: String },
    /// Placeholder for an imported binding
    Import { module: String },
    /// Exception bound by a catch clause
    CaughtError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContainerKind {
    Object,
    Array,
    /// Receiver created by a constructor
    Instance,
    /// Backing value of a class, interface or enum
    Blueprint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractField {
    /// Whether the iterator produced an element
    Ok,
    Key,
    Value,
}

impl ExtractField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Key => "key",
            Self::Value => "field",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phi {
    pub variable: VariableId,
    pub block: BlockId,
    /// One operand per predecessor, in predecessor order
    pub operands: Vec<ValueId>,
    /// `[same, different]` seen by the last triviality check
    pub witness: [Option<ValueId>; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValueKind {
    Const(ConstValue),
    Undefined(UndefinedKind),
    Phi(Phi),
    Parameter {
        index: usize,
    },
    /// Variable captured from an enclosing function
    FreeValue {
        variable: VariableId,
    },
    BinOp {
        op: BinaryOperator,
        lhs: ValueId,
        rhs: ValueId,
    },
    UnOp {
        op: UnaryOperator,
        operand: ValueId,
    },
    Call {
        callee: ValueId,
        args: Vec<ValueId>,
    },
    Return {
        results: Vec<ValueId>,
    },
    Make {
        container: ContainerKind,
    },
    /// Iterator step over `iterable`
    Next {
        iterable: ValueId,
        in_keys: bool,
    },
    Extract {
        tuple: ValueId,
        field: ExtractField,
    },
    /// Caller-side effect of a call that wrote a captured variable
    SideEffect {
        call: ValueId,
        value: ValueId,
        variable: VariableId,
    },
    Function(FunctionId),
    /// Conversion to the value's `ty`
    TypeCast {
        value: ValueId,
    },
    /// Collapsed trivial phi
    Forward(ValueId),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Value {
    pub kind: ValueKind,
    pub ty: Option<Type>,
    pub range: Span,
    /// First variable this value was bound to
    pub name: Option<String>,
    pub block: Option<BlockId>,
}

impl Value {
    pub fn new(kind: ValueKind, range: Span) -> Self {
        Self {
            kind,
            ty: None,
            range,
            name: None,
            block: None,
        }
    }

    pub fn with_type(mut self, ty: Option<Type>) -> Self {
        self.ty = ty;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn ty(&self) -> Option<&Type> {
        self.ty.as_ref()
    }

    pub fn range(&self) -> Span {
        self.range
    }

    pub fn as_const(&self) -> Option<&ConstValue> {
        match &self.kind {
            ValueKind::Const(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_phi(&self) -> Option<&Phi> {
        match &self.kind {
            ValueKind::Phi(phi) => Some(phi),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<FunctionId> {
        match &self.kind {
            ValueKind::Function(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self.kind, ValueKind::Undefined(_))
    }

    pub fn is_phi(&self) -> bool {
        matches!(self.kind, ValueKind::Phi(_))
    }

    /// Values this one reads, unresolved
    pub fn operands(&self) -> Vec<ValueId> {
        match &self.kind {
            ValueKind::Phi(phi) => phi.operands.clone(),
            ValueKind::BinOp { lhs, rhs, .. } => vec![*lhs, *rhs],
            ValueKind::UnOp { operand, .. } => vec![*operand],
            ValueKind::Call { callee, args } => {
                let mut operands = Vec::with_capacity(args.len() + 1);
                operands.push(*callee);
                operands.extend(args.iter().copied());
                operands
            }
            ValueKind::Return { results } => results.clone(),
            ValueKind::Next { iterable, .. } => vec![*iterable],
            ValueKind::Extract { tuple, .. } => vec![*tuple],
            ValueKind::SideEffect { call, value, .. } => vec![*call, *value],
            ValueKind::TypeCast { value } => vec![*value],
            ValueKind::Undefined(UndefinedKind::Member { object, .. }) => vec![*object],
            ValueKind::Forward(target) => vec![*target],
            ValueKind::Const(_)
            | ValueKind::Undefined(_)
            | ValueKind::Parameter { .. }
            | ValueKind::FreeValue { .. }
            | ValueKind::Make { .. }
            | ValueKind::Function(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(ConstValue::Number(1.0).is_truthy());
        assert!(!ConstValue::Number(f64::NAN).is_truthy());
        assert!(!ConstValue::String(String::new()).is_truthy());
        assert!(!ConstValue::Null.is_truthy());
    }

    #[test]
    fn test_call_operands_include_callee_first() {
        let value = Value::new(
            ValueKind::Call {
                callee: ValueId(4),
                args: vec![ValueId(1), ValueId(2)],
            },
            Span::zero(),
        );
        assert_eq!(value.operands(), vec![ValueId(4), ValueId(1), ValueId(2)]);
    }
}
