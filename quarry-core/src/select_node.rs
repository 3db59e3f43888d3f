use crate::{JoinNode, Order, Value};

/// Table valued function used in place of a table, arguments are bound as parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSource {
    pub name: String,
    pub args: Vec<Value>,
}

/// Row source of a `SELECT`, either a table or a function, never both.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectSource {
    Table(String),
    Function(FunctionSource),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTerm {
    pub column: String,
    pub order: Order,
}

/// Dialect independent description of a `SELECT`.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectNode {
    pub source: SelectSource,
    /// Column names, empty means `*`.
    pub columns: Vec<String>,
    /// Already translated predicate.
    pub where_sql: Option<String>,
    pub primary_keys: Vec<String>,
    pub skip: Option<u64>,
    pub take: Option<u64>,
    pub order_by: Vec<OrderTerm>,
    pub joins: Vec<JoinNode>,
}

impl SelectNode {
    /// `SELECT * FROM <table>` with nothing else.
    pub fn table(name: impl Into<String>) -> Self {
        Self {
            source: SelectSource::Table(name.into()),
            columns: Vec::new(),
            where_sql: None,
            primary_keys: Vec::new(),
            skip: None,
            take: None,
            order_by: Vec::new(),
            joins: Vec::new(),
        }
    }

    /// Table prefixing the selected columns, present only when joins make names ambiguous.
    pub fn qualifier(&self) -> Option<&str> {
        match &self.source {
            SelectSource::Table(table) if !self.joins.is_empty() => Some(table),
            _ => None,
        }
    }

    pub fn is_paged(&self) -> bool {
        self.skip.is_some() || self.take.is_some()
    }
}
