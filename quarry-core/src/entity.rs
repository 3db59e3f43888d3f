use crate::{ColumnDef, Result, Row, RowLabeled, Value};

/// Static schema descriptor of an entity, resolved once per type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDef {
    /// Rust type name, the table name of last resort.
    pub type_name: &'static str,
    /// Declared table name, possibly schema qualified (`dbo.Person`).
    pub table_name: Option<&'static str>,
    pub columns: Box<[ColumnDef]>,
}

impl EntityDef {
    pub fn new(
        type_name: &'static str,
        table_name: Option<&'static str>,
        columns: impl Into<Box<[ColumnDef]>>,
    ) -> Self {
        Self {
            type_name,
            table_name,
            columns: columns.into(),
        }
    }

    /// Declared table name, else the type name.
    pub fn table_name(&self) -> &'static str {
        self.table_name.unwrap_or(self.type_name)
    }

    /// Table name after applying an optional override.
    pub fn resolve_table_name<'a>(&self, table_override: Option<&'a str>) -> &'a str {
        match table_override {
            Some(v) if !v.is_empty() => v,
            _ => self.table_name(),
        }
    }

    /// Columns taking part in statements (not-mapped members excluded).
    pub fn mapped_columns(&self) -> impl Iterator<Item = &ColumnDef> + Clone {
        self.columns.iter().filter(|c| !c.not_mapped)
    }

    pub fn primary_key_def(&self) -> impl Iterator<Item = &ColumnDef> + Clone {
        self.mapped_columns().filter(|c| c.primary_key)
    }

    /// Find a column by member name, then by column name.
    pub fn column(&self, member: &str) -> Option<&ColumnDef> {
        self.mapped_columns()
            .find(|c| c.field == member)
            .or_else(|| self.mapped_columns().find(|c| c.name == member))
    }

    /// Column name of a member, the member itself when it is not described.
    pub fn column_name<'a>(&'a self, member: &'a str) -> &'a str {
        self.column(member).map(|c| c.name).unwrap_or(member)
    }
}

/// A type mapped to a table.
///
/// Usually implemented by `#[derive(Entity)]`, it can be written by hand as well:
/// `row` must yield one value per entry of `entity_def().columns`, in the same order.
pub trait Entity {
    fn entity_def() -> &'static EntityDef;

    /// Values of every column, positionally matching `entity_def().columns`.
    fn row(&self) -> Row;

    fn from_row(row: RowLabeled) -> Result<Self>
    where
        Self: Sized;

    /// Primary key columns paired with the current values.
    fn primary_key(&self) -> Vec<(&'static ColumnDef, Value)> {
        let def = Self::entity_def();
        def.columns
            .iter()
            .zip(self.row().into_vec())
            .filter(|(c, _)| c.primary_key && !c.not_mapped)
            .collect()
    }
}
