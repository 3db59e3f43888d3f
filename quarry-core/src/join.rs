#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinType {
    #[default]
    Inner,
    Left,
}

impl JoinType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
        }
    }
}

/// `<join type> <table> ON <source>.<left_column> = <table>.<right_column>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinNode {
    pub join_type: JoinType,
    pub table: String,
    /// Column of the selected table.
    pub left_column: String,
    /// Column of the joined table.
    pub right_column: String,
}
