//! Operator enums shared by expressions

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Exp,
    Shl,
    Shr,
    UShr,
    BitAnd,
    BitOr,
    BitXor,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
    In,
    InstanceOf,
    And,
    Or,
    Nullish,
    Comma,
}

impl BinaryOperator {
    pub fn from_token(token: &str) -> Option<Self> {
        let op = match token {
            "+" => Self::Add,
            "-" => Self::Sub,
            "*" => Self::Mul,
            "/" => Self::Div,
            "%" => Self::Mod,
            "**" => Self::Exp,
            "<<" => Self::Shl,
            ">>" => Self::Shr,
            ">>>" => Self::UShr,
            "&" => Self::BitAnd,
            "|" => Self::BitOr,
            "^" => Self::BitXor,
            "<" => Self::Lt,
            ">" => Self::Gt,
            "<=" => Self::LtEq,
            ">=" => Self::GtEq,
            "==" => Self::Eq,
            "!=" => Self::NotEq,
            "===" => Self::StrictEq,
            "!==" => Self::StrictNotEq,
            "in" => Self::In,
            "instanceof" => Self::InstanceOf,
            "&&" => Self::And,
            "||" => Self::Or,
            "??" => Self::Nullish,
            "," => Self::Comma,
            _ => return None,
        };
        Some(op)
    }

    /// `&&`, `||` and `??`
    pub fn is_short_circuit(&self) -> bool {
        matches!(self, Self::And | Self::Or | Self::Nullish)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOperator {
    Plus,
    Minus,
    BitNot,
    Not,
    TypeOf,
    Void,
    Delete,
}

impl UnaryOperator {
    pub fn from_token(token: &str) -> Option<Self> {
        let op = match token {
            "+" => Self::Plus,
            "-" => Self::Minus,
            "~" => Self::BitNot,
            "!" => Self::Not,
            "typeof" => Self::TypeOf,
            "void" => Self::Void,
            "delete" => Self::Delete,
            _ => return None,
        };
        Some(op)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpdateOperator {
    Increment,
    Decrement,
}

/// `=` or a compound form such as `+=`, `&&=`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignOperator {
    Assign,
    Compound(BinaryOperator),
}

impl AssignOperator {
    pub fn from_token(token: &str) -> Option<Self> {
        if token == "=" {
            return Some(Self::Assign);
        }
        let binary = token.strip_suffix('=')?;
        BinaryOperator::from_token(binary)
            .filter(|op| {
                !matches!(
                    op,
                    BinaryOperator::Comma
                        | BinaryOperator::In
                        | BinaryOperator::InstanceOf
                        | BinaryOperator::Lt
                        | BinaryOperator::Gt
                        | BinaryOperator::Eq
                        | BinaryOperator::NotEq
                        | BinaryOperator::LtEq
                        | BinaryOperator::GtEq
                        | BinaryOperator::StrictEq
                        | BinaryOperator::StrictNotEq
                )
            })
            .map(Self::Compound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_operator_tokens() {
        assert_eq!(AssignOperator::from_token("="), Some(AssignOperator::Assign));
        assert_eq!(
            AssignOperator::from_token(">>>="),
            Some(AssignOperator::Compound(BinaryOperator::UShr))
        );
        assert_eq!(
            AssignOperator::from_token("??="),
            Some(AssignOperator::Compound(BinaryOperator::Nullish))
        );
        assert_eq!(AssignOperator::from_token("=="), None);
        assert_eq!(AssignOperator::from_token("<="), None);
        assert_eq!(AssignOperator::from_token("!=="), None);
    }

    #[test]
    fn test_short_circuit_classification() {
        assert!(BinaryOperator::Nullish.is_short_circuit());
        assert!(!BinaryOperator::BitAnd.is_short_circuit());
    }
}
