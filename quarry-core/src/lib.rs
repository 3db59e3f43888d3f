mod as_value;
mod column;
mod connection;
mod entity;
mod error;
mod executor;
mod expression;
mod join;
mod options;
mod parameters;
mod query;
mod row;
mod select_node;
mod session;
mod statement;
mod transaction;
mod translator;
mod util;
mod value;
pub mod writer;

pub use ::anyhow::Context;
pub use as_value::*;
pub use column::*;
pub use connection::*;
pub use entity::*;
pub use error::*;
pub use executor::*;
pub use expression::*;
pub use join::*;
pub use options::*;
pub use parameters::*;
pub use query::*;
pub use row::*;
pub use select_node::*;
pub use session::Session;
pub use statement::*;
pub use transaction::*;
pub use translator::*;
pub use util::*;
pub use value::*;
pub use writer::{Assignment, Filter, SqlWriter, split_qualified};

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
