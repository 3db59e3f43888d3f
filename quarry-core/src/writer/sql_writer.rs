use crate::{
    JoinNode, Options, Parameters, SelectNode, SelectSource, Value, parameter_name,
    separated_by,
    writer::{Context, Fragment},
};
use std::{borrow::Cow, fmt::Write};

/// `column = value` where `value` is already SQL text (a placeholder or an expression).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub column: String,
    pub value: String,
}

impl Assignment {
    pub fn new(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// Row filter of a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter<'a> {
    /// Equalities joined by `AND`, rendered by the dialect.
    Equalities(&'a [Assignment]),
    /// Translated predicate text.
    Sql(&'a str),
}

/// Split `schema.table` on dots outside quoted segments.
pub fn split_qualified(value: &str, open: char, close: char) -> Vec<&str> {
    let mut result = Vec::new();
    let mut quoted = false;
    let mut start = 0;
    for (i, c) in value.char_indices() {
        if !quoted && c == open {
            quoted = true;
        } else if quoted && c == close {
            quoted = false;
        } else if !quoted && c == '.' {
            result.push(&value[start..i]);
            start = i + 1;
        }
    }
    result.push(&value[start..]);
    result
}

/// Dialect printer turning AST nodes and mutation requests into SQL text.
///
/// Every method has a default rendering, a dialect overrides only what differs.
/// Implementations hold no mutable state, a writer can be shared across threads.
pub trait SqlWriter: Send + Sync {
    fn as_dyn(&self) -> &dyn SqlWriter;

    /// Dialect name, used in logs.
    fn name(&self) -> &'static str;

    /// Opening and closing identifier quote.
    fn identifier_quotes(&self) -> (char, char) {
        ('"', '"')
    }

    /// Case rule applied to identifiers before quoting.
    fn fold_identifier<'a>(&self, value: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(value)
    }

    /// Whether the select list declares aliases for columns whose folded name differs.
    fn alias_declaration(&self, context: &Context) -> bool {
        matches!(context.fragment, Fragment::SqlSelect | Fragment::SqlReadBack)
    }

    /// Escape occurrences of `search` char with `replace` while copying into buffer.
    fn write_escaped(&self, out: &mut String, value: &str, search: char, replace: &str) {
        let mut position = 0;
        for (i, c) in value.char_indices() {
            if c == search {
                out.push_str(&value[position..i]);
                out.push_str(replace);
                position = i + c.len_utf8();
            }
        }
        out.push_str(&value[position..]);
    }

    /// Quote one identifier, doubling the closing quote. Already quoted input is kept as is.
    fn write_identifier_quoted(&self, out: &mut String, value: &str) {
        if value.is_empty() {
            return;
        }
        let (open, close) = self.identifier_quotes();
        if value.len() >= 2 && value.starts_with(open) && value.ends_with(close) {
            out.push_str(value);
            return;
        }
        let folded = self.fold_identifier(value);
        out.push(open);
        let mut replace = String::with_capacity(2);
        replace.push(close);
        replace.push(close);
        self.write_escaped(out, &folded, close, &replace);
        out.push(close);
    }

    /// Quote every segment of a possibly schema qualified name.
    fn write_table(&self, out: &mut String, value: &str) {
        if value.is_empty() {
            return;
        }
        let (open, close) = self.identifier_quotes();
        separated_by(
            out,
            split_qualified(value, open, close),
            |out, v| self.write_identifier_quoted(out, v),
            ".",
        );
    }

    /// Quote a column, qualified when the context says so.
    fn write_column(&self, context: &Context, out: &mut String, value: &str) {
        if let Some(qualifier) = context.qualifier {
            self.write_table(out, qualifier);
            out.push('.');
        }
        self.write_identifier_quoted(out, value);
        if self.alias_declaration(context) && self.fold_identifier(value) != value {
            out.push_str(" AS ");
            let (open, close) = self.identifier_quotes();
            out.push(open);
            let mut replace = String::with_capacity(2);
            replace.push(close);
            replace.push(close);
            self.write_escaped(out, value, close, &replace);
            out.push(close);
        }
    }

    fn format_table(&self, value: &str) -> String {
        let mut out = String::with_capacity(value.len() + 4);
        self.write_table(&mut out, value);
        out
    }

    fn format_column(&self, value: &str) -> String {
        let mut out = String::with_capacity(value.len() + 2);
        self.write_identifier_quoted(&mut out, value);
        out
    }

    fn parameter_prefix(&self) -> &'static str {
        "@"
    }

    /// Positional placeholder, `@p{index}`.
    fn parameter_placeholder(&self, index: usize) -> String {
        format!("{}p{}", self.parameter_prefix(), index)
    }

    /// Placeholder named after a column, `@{name}`.
    fn named_placeholder(&self, name: &str) -> String {
        format!("{}{}", self.parameter_prefix(), parameter_name(name))
    }

    /// Bind `value` under the next positional placeholder and return it.
    fn bind_positional(&self, parameters: &mut Parameters, value: Value) -> String {
        let name = self.parameter_placeholder(parameters.len());
        parameters.bind(name, value)
    }

    /// Bind `value` under a placeholder named after `column` and return it.
    fn bind_named(&self, parameters: &mut Parameters, column: &str, value: Value) -> String {
        let name = self.named_placeholder(column);
        parameters.bind(name, value)
    }

    /// SQL expression yielding the key generated by the last insert. Never a bind parameter.
    fn identity_value_expression(&self, table: &str, column: &str) -> String;

    /// Render `SELECT <cols|*> FROM <source> [joins] [WHERE] [ORDER BY] [paging]`.
    fn write_select(&self, out: &mut String, ast: &SelectNode, parameters: &mut Parameters) {
        out.reserve(64 + ast.columns.len() * 24);
        let context = Context::new(Fragment::SqlSelect, ast.qualifier());
        out.push_str("SELECT ");
        if ast.columns.is_empty() {
            out.push('*');
        } else {
            separated_by(
                out,
                &ast.columns,
                |out, v| self.write_column(&context, out, v),
                ", ",
            );
        }
        out.push_str(" FROM ");
        self.write_select_source(
            &context.switch_fragment(Fragment::SqlSelectFrom),
            out,
            &ast.source,
            parameters,
        );
        for join in &ast.joins {
            out.push(' ');
            self.write_join(&context.switch_fragment(Fragment::SqlJoin), out, join);
        }
        if let Some(where_sql) = ast.where_sql.as_deref().filter(|v| !v.is_empty()) {
            out.push_str(" WHERE ");
            out.push_str(where_sql);
        }
        self.write_order_by(&context.switch_fragment(Fragment::SqlSelectOrderBy), out, ast);
        self.write_paging(&context, out, ast);
    }

    /// Table name or `function(@p..)`.
    fn write_select_source(
        &self,
        _context: &Context,
        out: &mut String,
        source: &SelectSource,
        parameters: &mut Parameters,
    ) {
        match source {
            SelectSource::Table(table) => self.write_table(out, table),
            SelectSource::Function(function) => {
                self.write_table(out, &function.name);
                out.push('(');
                separated_by(
                    out,
                    &function.args,
                    |out, v| {
                        let placeholder = self.bind_positional(parameters, v.clone());
                        out.push_str(&placeholder);
                    },
                    ", ",
                );
                out.push(')');
            }
        }
    }

    fn write_join(&self, context: &Context, out: &mut String, join: &JoinNode) {
        out.push_str(join.join_type.as_sql());
        out.push(' ');
        self.write_table(out, &join.table);
        out.push_str(" ON ");
        self.write_column(context, out, &join.left_column);
        out.push_str(" = ");
        self.write_column(
            &context.qualified_by(Some(join.table.as_str())),
            out,
            &join.right_column,
        );
    }

    fn write_order_by(&self, context: &Context, out: &mut String, ast: &SelectNode) {
        if ast.order_by.is_empty() {
            return;
        }
        out.push_str(" ORDER BY ");
        separated_by(
            out,
            &ast.order_by,
            |out, v| {
                self.write_column(context, out, &v.column);
                out.push(' ');
                out.push_str(v.order.as_sql());
            },
            ", ",
        );
    }

    /// `LIMIT n OFFSET m`, each part only when requested.
    fn write_paging(&self, _context: &Context, out: &mut String, ast: &SelectNode) {
        if let Some(take) = ast.take {
            let _ = write!(out, " LIMIT {}", take);
        }
        if let Some(skip) = ast.skip {
            let _ = write!(out, " OFFSET {}", skip);
        }
    }

    /// Render `INSERT INTO t (cols) VALUES (placeholders)`, followed by the read-back when
    /// requested and `read_back` is not empty.
    fn write_insert(
        &self,
        out: &mut String,
        table: &str,
        values: &[Assignment],
        options: &Options,
        columns: &[&str],
        read_back: &[Assignment],
    ) {
        out.reserve(64 + values.len() * 32);
        let context = Context::new(Fragment::SqlInsertInto, None);
        out.push_str("INSERT INTO ");
        self.write_table(out, table);
        if values.is_empty() {
            out.push_str(" DEFAULT VALUES");
        } else {
            out.push_str(" (");
            separated_by(
                out,
                values,
                |out, v| self.write_column(&context, out, &v.column),
                ", ",
            );
            out.push_str(") VALUES (");
            separated_by(out, values, |out, v| out.push_str(&v.value), ", ");
            out.push(')');
        }
        if options.select_after_mutation && !read_back.is_empty() {
            self.write_read_back(out, table, columns, read_back);
        }
    }

    /// Render `UPDATE t SET a = @a [WHERE k = @k]`, followed by the read-back when requested
    /// and `read_back` is not empty.
    fn write_update(
        &self,
        out: &mut String,
        table: &str,
        set: &[Assignment],
        filter: Filter,
        options: &Options,
        columns: &[&str],
        read_back: &[Assignment],
    ) {
        out.reserve(64 + set.len() * 32);
        let context = Context::new(Fragment::SqlUpdateSet, None);
        out.push_str("UPDATE ");
        self.write_table(out, table);
        out.push_str(" SET ");
        self.write_assignments(&context, out, set, ", ");
        match filter {
            Filter::Equalities(filter) if !filter.is_empty() => {
                out.push_str(" WHERE ");
                self.write_assignments(
                    &context.switch_fragment(Fragment::SqlUpdateWhere),
                    out,
                    filter,
                    " AND ",
                );
            }
            Filter::Sql(sql) if !sql.is_empty() => {
                out.push_str(" WHERE ");
                out.push_str(sql);
            }
            _ => {}
        }
        if options.select_after_mutation && !read_back.is_empty() {
            self.write_read_back(out, table, columns, read_back);
        }
    }

    /// Render `DELETE FROM t [WHERE k = @k AND ...]`.
    fn write_delete(&self, out: &mut String, table: &str, filter: Filter) {
        let context = Context::new(Fragment::SqlDeleteFrom, None);
        out.push_str("DELETE FROM ");
        self.write_table(out, table);
        match filter {
            Filter::Equalities(filter) if !filter.is_empty() => {
                out.push_str(" WHERE ");
                self.write_assignments(&context, out, filter, " AND ");
            }
            Filter::Sql(sql) if !sql.is_empty() => {
                out.push_str(" WHERE ");
                out.push_str(sql);
            }
            _ => {}
        }
    }

    /// `; SELECT * FROM t WHERE k = v AND ...`, the row just written.
    fn write_read_back(
        &self,
        out: &mut String,
        table: &str,
        _columns: &[&str],
        keys: &[Assignment],
    ) {
        let context = Context::new(Fragment::SqlReadBack, None);
        out.push_str("; SELECT * FROM ");
        self.write_table(out, table);
        out.push_str(" WHERE ");
        self.write_assignments(&context, out, keys, " AND ");
    }

    fn write_assignments(
        &self,
        context: &Context,
        out: &mut String,
        values: &[Assignment],
        separator: &str,
    ) {
        let context = Context::new(Fragment::None, context.qualifier);
        separated_by(
            out,
            values,
            |out, v| {
                self.write_column(&context, out, &v.column);
                out.push_str(" = ");
                out.push_str(&v.value);
            },
            separator,
        );
    }
}
