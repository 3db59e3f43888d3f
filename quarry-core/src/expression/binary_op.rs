use crate::Expression;
use std::fmt::{self, Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOpType {
    Addition,
    Like,
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    And,
    Or,
}

impl BinaryOpType {
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOpType::Equal
                | BinaryOpType::NotEqual
                | BinaryOpType::Less
                | BinaryOpType::Greater
                | BinaryOpType::LessEqual
                | BinaryOpType::GreaterEqual
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOpType::And | BinaryOpType::Or)
    }

    /// The operator obtained by swapping the operands (`a < b` becomes `b > a`).
    pub fn mirrored(&self) -> Self {
        match self {
            BinaryOpType::Less => BinaryOpType::Greater,
            BinaryOpType::Greater => BinaryOpType::Less,
            BinaryOpType::LessEqual => BinaryOpType::GreaterEqual,
            BinaryOpType::GreaterEqual => BinaryOpType::LessEqual,
            v => *v,
        }
    }

    /// SQL spelling.
    pub fn as_sql(&self) -> &'static str {
        match self {
            BinaryOpType::Addition => "+",
            BinaryOpType::Like => "LIKE",
            BinaryOpType::Equal => "=",
            BinaryOpType::NotEqual => "!=",
            BinaryOpType::Less => "<",
            BinaryOpType::Greater => ">",
            BinaryOpType::LessEqual => "<=",
            BinaryOpType::GreaterEqual => ">=",
            BinaryOpType::And => "AND",
            BinaryOpType::Or => "OR",
        }
    }
}

impl Display for BinaryOpType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOp {
    pub op: BinaryOpType,
    pub lhs: Box<Expression>,
    pub rhs: Box<Expression>,
}
