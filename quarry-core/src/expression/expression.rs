use crate::{AsValue, BinaryOp, BinaryOpType, Operand, UnaryOp, UnaryOpType, Value};
use std::{
    borrow::Cow,
    fmt::{self, Display, Formatter},
    ops::{Add, Not},
};

/// Boolean predicate over the members of an entity.
///
/// Trees are assembled with [`col`], [`val`] and the comparison methods:
/// ```rust
/// use quarry_core::col;
/// let adults_named_bob = col("age").ge(18).and(col("name").eq("Bob"));
/// let outside = !col("id").is_in([1, 2, 3]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Operand(Operand),
    Unary(UnaryOp),
    Binary(BinaryOp),
    /// Membership of `item` in `collection`.
    Contains {
        collection: Box<Expression>,
        item: Box<Expression>,
    },
}

/// Reference to an entity member.
pub fn col(member: impl Into<Cow<'static, str>>) -> Expression {
    Expression::Operand(Operand::Member(member.into()))
}

/// Constant operand.
pub fn val(value: impl Into<Value>) -> Expression {
    Expression::Operand(Operand::Variable(value.into()))
}

/// Function call operand.
pub fn call(name: impl Into<Cow<'static, str>>, args: Vec<Expression>) -> Expression {
    Expression::Operand(Operand::Call(name.into(), args))
}

/// Membership of `item` in `collection`, whatever their shape.
pub fn contains(collection: impl Into<Expression>, item: impl Into<Expression>) -> Expression {
    Expression::Contains {
        collection: Box::new(collection.into()),
        item: Box::new(item.into()),
    }
}

impl Expression {
    pub fn binary(
        op: BinaryOpType,
        lhs: impl Into<Expression>,
        rhs: impl Into<Expression>,
    ) -> Self {
        Expression::Binary(BinaryOp {
            op,
            lhs: Box::new(lhs.into()),
            rhs: Box::new(rhs.into()),
        })
    }

    pub fn unary(op: UnaryOpType, arg: impl Into<Expression>) -> Self {
        Expression::Unary(UnaryOp {
            op,
            arg: Box::new(arg.into()),
        })
    }

    pub fn eq(self, rhs: impl Into<Expression>) -> Self {
        Self::binary(BinaryOpType::Equal, self, rhs)
    }
    pub fn ne(self, rhs: impl Into<Expression>) -> Self {
        Self::binary(BinaryOpType::NotEqual, self, rhs)
    }
    pub fn lt(self, rhs: impl Into<Expression>) -> Self {
        Self::binary(BinaryOpType::Less, self, rhs)
    }
    pub fn le(self, rhs: impl Into<Expression>) -> Self {
        Self::binary(BinaryOpType::LessEqual, self, rhs)
    }
    pub fn gt(self, rhs: impl Into<Expression>) -> Self {
        Self::binary(BinaryOpType::Greater, self, rhs)
    }
    pub fn ge(self, rhs: impl Into<Expression>) -> Self {
        Self::binary(BinaryOpType::GreaterEqual, self, rhs)
    }
    pub fn like(self, rhs: impl Into<Expression>) -> Self {
        Self::binary(BinaryOpType::Like, self, rhs)
    }
    pub fn and(self, rhs: impl Into<Expression>) -> Self {
        Self::binary(BinaryOpType::And, self, rhs)
    }
    pub fn or(self, rhs: impl Into<Expression>) -> Self {
        Self::binary(BinaryOpType::Or, self, rhs)
    }

    /// `self IN (values...)`.
    pub fn is_in<I, T>(self, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        let list = values.into_iter().map(Into::into).collect();
        contains(Expression::Operand(Operand::List(list)), self)
    }

    /// The member name when this is a bare member reference.
    pub fn as_member(&self) -> Option<&str> {
        match self {
            Expression::Operand(Operand::Member(v)) => Some(v.as_ref()),
            _ => None,
        }
    }

    /// The constant when this is a bare variable.
    pub fn as_variable(&self) -> Option<&Value> {
        match self {
            Expression::Operand(Operand::Variable(v)) => Some(v),
            _ => None,
        }
    }
}

impl<R: Into<Expression>> Add<R> for Expression {
    type Output = Expression;
    fn add(self, rhs: R) -> Self::Output {
        Expression::binary(BinaryOpType::Addition, self, rhs)
    }
}

impl Not for Expression {
    type Output = Expression;
    fn not(self) -> Self::Output {
        Expression::unary(UnaryOpType::Not, self)
    }
}

impl From<Operand> for Expression {
    fn from(value: Operand) -> Self {
        Expression::Operand(value)
    }
}

impl<T: AsValue> From<T> for Expression {
    fn from(value: T) -> Self {
        Expression::Operand(Operand::Variable(value.as_value()))
    }
}

impl From<&str> for Expression {
    fn from(value: &str) -> Self {
        Expression::Operand(Operand::Variable(value.into()))
    }
}

impl Display for Operand {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Member(v) => f.write_str(v),
            Operand::Variable(v) => write!(f, "{v}"),
            Operand::List(v) => {
                f.write_str("[")?;
                for (i, v) in v.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{v}")?;
                }
                f.write_str("]")
            }
            Operand::Call(name, args) => {
                write!(f, "{name}(")?;
                for (i, v) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{v}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Operand(v) => write!(f, "{v}"),
            Expression::Unary(v) => match v.op {
                UnaryOpType::Not => write!(f, "NOT ({})", v.arg),
            },
            Expression::Binary(v) => write!(f, "({} {} {})", v.lhs, v.op, v.rhs),
            Expression::Contains { collection, item } => {
                write!(f, "{collection}.contains({item})")
            }
        }
    }
}
