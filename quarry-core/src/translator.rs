use crate::{
    BinaryOp, BinaryOpType, EntityDef, Expression, Operand, Parameters, QuarryError, Result,
    SqlWriter, UnaryOp, UnaryOpType, Value,
    writer::{Context, Fragment},
};

/// Turns a predicate tree into `WHERE` text, binding every constant as a positional
/// parameter in the order it is met.
///
/// The translatable subset:
/// - `AND` / `OR` of translatable predicates, rendered `(lhs) AND (rhs)`
/// - a member compared (`=`, `!=`, `<`, `<=`, `>`, `>=`) with a non null constant
/// - a member tested for membership in a constant list, optionally negated
///
/// Anything else fails with [`QuarryError::UnsupportedExpression`].
pub struct PredicateTranslator<'a> {
    writer: &'a dyn SqlWriter,
    entity: &'a EntityDef,
    qualifier: Option<&'a str>,
}

impl<'a> PredicateTranslator<'a> {
    pub fn new(writer: &'a dyn SqlWriter, entity: &'a EntityDef) -> Self {
        Self {
            writer,
            entity,
            qualifier: None,
        }
    }

    /// Prefix columns with `table`.
    pub fn qualified(mut self, table: Option<&'a str>) -> Self {
        self.qualifier = table;
        self
    }

    pub fn translate(
        &self,
        expression: &Expression,
        parameters: &mut Parameters,
    ) -> Result<String> {
        let mut out = String::with_capacity(64);
        self.write_predicate(&mut out, expression, parameters)?;
        Ok(out)
    }

    fn write_predicate(
        &self,
        out: &mut String,
        expression: &Expression,
        parameters: &mut Parameters,
    ) -> Result<()> {
        match expression {
            Expression::Binary(BinaryOp { op, lhs, rhs }) if op.is_logical() => {
                out.push('(');
                self.write_predicate(out, lhs, parameters)?;
                out.push_str(") ");
                out.push_str(op.as_sql());
                out.push_str(" (");
                self.write_predicate(out, rhs, parameters)?;
                out.push(')');
                Ok(())
            }
            Expression::Binary(BinaryOp { op, lhs, rhs }) if op.is_comparison() => {
                self.write_comparison(out, *op, lhs, rhs, parameters)
            }
            Expression::Contains { collection, item } => {
                self.write_membership(out, collection, item, false, parameters)
            }
            Expression::Unary(UnaryOp {
                op: UnaryOpType::Not,
                arg,
            }) => match arg.as_ref() {
                Expression::Contains { collection, item } => {
                    self.write_membership(out, collection, item, true, parameters)
                }
                _ => Err(unsupported(expression, "only membership tests can be negated")),
            },
            _ => Err(unsupported(
                expression,
                "expected a comparison, a membership test or a logical combination of them",
            )),
        }
    }

    fn write_comparison(
        &self,
        out: &mut String,
        op: BinaryOpType,
        lhs: &Expression,
        rhs: &Expression,
        parameters: &mut Parameters,
    ) -> Result<()> {
        let (member, value, sql_op) = match (lhs.as_member(), rhs.as_variable()) {
            (Some(member), Some(value)) => (member, value, op),
            _ => match (rhs.as_member(), lhs.as_variable()) {
                (Some(member), Some(value)) => (member, value, op.mirrored()),
                _ => {
                    return Err(unsupported(
                        &Expression::binary(op, lhs.clone(), rhs.clone()),
                        "a comparison needs a member on one side and a constant on the other",
                    ));
                }
            },
        };
        if value.is_null() {
            return Err(unsupported(
                &Expression::binary(op, lhs.clone(), rhs.clone()),
                "comparisons against NULL are not translated",
            ));
        }
        self.write_member(out, member);
        out.push(' ');
        out.push_str(sql_op.as_sql());
        out.push(' ');
        let placeholder = self.bind(parameters, value);
        out.push_str(&placeholder);
        Ok(())
    }

    fn write_membership(
        &self,
        out: &mut String,
        collection: &Expression,
        item: &Expression,
        negated: bool,
        parameters: &mut Parameters,
    ) -> Result<()> {
        let (Some(member), Expression::Operand(Operand::List(values))) =
            (item.as_member(), collection)
        else {
            return Err(unsupported(
                &Expression::Contains {
                    collection: Box::new(collection.clone()),
                    item: Box::new(item.clone()),
                },
                "membership is translated only for a member against a constant list",
            ));
        };
        if values.is_empty() {
            // Nothing is in an empty list
            out.push_str(if negated { "1 = 1" } else { "1 = 0" });
            return Ok(());
        }
        self.write_member(out, member);
        out.push_str(if negated { " NOT IN (" } else { " IN (" });
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            let placeholder = self.bind(parameters, value);
            out.push_str(&placeholder);
        }
        out.push(')');
        Ok(())
    }

    fn write_member(&self, out: &mut String, member: &str) {
        let context = Context::new(Fragment::SqlSelectWhere, self.qualifier);
        self.writer
            .write_column(&context, out, self.entity.column_name(member));
    }

    fn bind(&self, parameters: &mut Parameters, value: &Value) -> String {
        self.writer.bind_positional(parameters, value.clone())
    }
}

fn unsupported(expression: &Expression, reason: &str) -> crate::Error {
    QuarryError::unsupported(format!("`{}`: {}", expression, reason)).into()
}
