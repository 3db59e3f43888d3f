use quarry_core::{
    SelectNode, SqlWriter,
    writer::{Context, Fragment},
};
use std::fmt::Write;

/// SQL Server rendering: bracket quoted identifiers, `OFFSET`/`FETCH` paging and
/// `SCOPE_IDENTITY()` for generated keys.
#[derive(Default, Debug, Clone, Copy)]
pub struct SqlServerSqlWriter {}

impl SqlServerSqlWriter {
    pub fn new() -> Self {
        Self {}
    }
}

impl SqlWriter for SqlServerSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    fn name(&self) -> &'static str {
        "mssql"
    }

    fn identifier_quotes(&self) -> (char, char) {
        ('[', ']')
    }

    fn identity_value_expression(&self, _table: &str, _column: &str) -> String {
        "SCOPE_IDENTITY()".into()
    }

    fn write_order_by(&self, context: &Context, out: &mut String, ast: &SelectNode) {
        if ast.order_by.is_empty() {
            if ast.is_paged() {
                // OFFSET requires an ORDER BY
                out.push_str(" ORDER BY (SELECT NULL)");
            }
            return;
        }
        out.push_str(" ORDER BY ");
        let context = context.switch_fragment(Fragment::SqlSelectOrderBy);
        for (i, term) in ast.order_by.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.write_column(&context, out, &term.column);
            out.push(' ');
            out.push_str(term.order.as_sql());
        }
    }

    fn write_paging(&self, _context: &Context, out: &mut String, ast: &SelectNode) {
        if !ast.is_paged() {
            return;
        }
        let _ = write!(out, " OFFSET {} ROWS", ast.skip.unwrap_or(0));
        if let Some(take) = ast.take {
            let _ = write!(out, " FETCH NEXT {} ROWS ONLY", take);
        }
    }
}
