/// How the database produces the value of a column.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Generated {
    /// Written by the application.
    #[default]
    None,
    /// Assigned by the database on insert (identity, serial, auto increment).
    Identity,
    /// Derived by the database and never written.
    Computed,
}

/// Declarative specification of an entity column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    /// Rust member name, used by predicates and key-value lookups.
    pub field: &'static str,
    /// Column name in the database.
    pub name: &'static str,
    /// Part of the primary key (composite keys have several).
    pub primary_key: bool,
    pub generated: Generated,
    /// Excluded from every generated statement and from the select list.
    pub not_mapped: bool,
}

impl ColumnDef {
    /// Column named after its member, not a key, written by the application.
    pub const fn new(field: &'static str) -> Self {
        Self {
            field,
            name: field,
            primary_key: false,
            generated: Generated::None,
            not_mapped: false,
        }
    }
    pub const fn name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }
    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }
    pub const fn identity(mut self) -> Self {
        self.generated = Generated::Identity;
        self
    }
    pub const fn computed(mut self) -> Self {
        self.generated = Generated::Computed;
        self
    }
    pub const fn not_mapped(mut self) -> Self {
        self.not_mapped = true;
        self
    }
    pub fn is_identity(&self) -> bool {
        self.generated == Generated::Identity
    }
    pub fn is_computed(&self) -> bool {
        self.generated == Generated::Computed
    }
    /// Whether the column receives a value in `INSERT`.
    pub fn is_insertable(&self) -> bool {
        !self.not_mapped && self.generated == Generated::None
    }
}
