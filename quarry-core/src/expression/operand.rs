use crate::{Expression, Value};
use std::borrow::Cow;

/// Leaf of a predicate tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Entity member, resolved to its column when translated.
    Member(Cow<'static, str>),
    /// Constant or captured value, always bound as a parameter.
    Variable(Value),
    /// Constant collection, the right side of a membership test.
    List(Vec<Value>),
    /// Function call on arbitrary arguments.
    Call(Cow<'static, str>, Vec<Expression>),
}
