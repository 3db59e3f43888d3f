/// Per-call switches for statement generation.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Replaces the entity table name, schema qualified names allowed.
    pub table_name: Option<String>,
    /// Append a read-back `SELECT` to `INSERT` and `UPDATE` so the stored row is returned.
    pub select_after_mutation: bool,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }

    pub fn select_after_mutation(mut self, select_after_mutation: bool) -> Self {
        self.select_after_mutation = select_after_mutation;
        self
    }
}
