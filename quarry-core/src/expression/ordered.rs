#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    #[default]
    ASC,
    DESC,
}

impl Order {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Order::ASC => "ASC",
            Order::DESC => "DESC",
        }
    }
}
