use quarry_core::{
    Assignment, SqlWriter, separated_by,
    writer::{Context, Fragment},
};
use std::borrow::Cow;

/// Case rule applied to every identifier before quoting.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseFolding {
    /// Identifiers are quoted as declared.
    #[default]
    None,
    /// `FirstName` becomes `firstname`.
    Lower,
    /// `FirstName` becomes `first_name`.
    LowerSnake,
}

/// PostgreSQL rendering: double quoted identifiers, `LIMIT`/`OFFSET` paging and serial
/// sequences for generated keys.
///
/// With a [`CaseFolding`] other than `None` the selected columns are aliased back to the
/// declared names, so rows still map onto the entity.
#[derive(Default, Debug, Clone, Copy)]
pub struct PostgresSqlWriter {
    pub case: CaseFolding,
}

impl PostgresSqlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_case(case: CaseFolding) -> Self {
        Self { case }
    }
}

impl SqlWriter for PostgresSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    fn name(&self) -> &'static str {
        "postgres"
    }

    fn fold_identifier<'a>(&self, value: &'a str) -> Cow<'a, str> {
        match self.case {
            CaseFolding::None => Cow::Borrowed(value),
            CaseFolding::Lower => {
                if value.chars().any(char::is_uppercase) {
                    Cow::Owned(value.to_lowercase())
                } else {
                    Cow::Borrowed(value)
                }
            }
            CaseFolding::LowerSnake => {
                let folded = lower_snake_case(value);
                if folded == value {
                    Cow::Borrowed(value)
                } else {
                    Cow::Owned(folded)
                }
            }
        }
    }

    fn identity_value_expression(&self, table: &str, column: &str) -> String {
        // The first argument is parsed as an identifier, the second taken literally
        let mut out = String::with_capacity(48 + table.len() + column.len());
        out.push_str("currval(pg_get_serial_sequence('");
        self.write_escaped(&mut out, &self.format_table(table), '\'', "''");
        out.push_str("', '");
        self.write_escaped(&mut out, &self.fold_identifier(column), '\'', "''");
        out.push_str("'))");
        out
    }

    fn write_read_back(
        &self,
        out: &mut String,
        table: &str,
        columns: &[&str],
        keys: &[Assignment],
    ) {
        if self.case == CaseFolding::None || columns.is_empty() {
            out.push_str("; SELECT * FROM ");
        } else {
            let context = Context::new(Fragment::SqlReadBack, None);
            out.push_str("; SELECT ");
            separated_by(
                out,
                columns,
                |out, v| self.write_column(&context, out, v),
                ", ",
            );
            out.push_str(" FROM ");
        }
        self.write_table(out, table);
        out.push_str(" WHERE ");
        self.write_assignments(
            &Context::new(Fragment::SqlReadBack, None),
            out,
            keys,
            " AND ",
        );
    }
}

/// `FirstName` to `first_name`, whitespace, dashes and dots become underscores.
pub fn lower_snake_case(value: &str) -> String {
    let mut result = String::with_capacity(value.len() + 4);
    let mut after_lower_or_digit = false;
    for c in value.chars() {
        if c.is_uppercase() {
            if after_lower_or_digit {
                result.push('_');
            }
            result.extend(c.to_lowercase());
            after_lower_or_digit = false;
        } else if c.is_whitespace() || c == '-' || c == '.' {
            result.push('_');
            after_lower_or_digit = false;
        } else {
            result.push(c);
            after_lower_or_digit = c.is_lowercase() || c.is_ascii_digit();
        }
    }
    while result.contains("__") {
        result = result.replace("__", "_");
    }
    result.trim_matches('_').to_string()
}
