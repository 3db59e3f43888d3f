use crate::Result;
use std::fmt::{self, Display, Formatter};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Closed,
    Open,
    /// Failed and unusable until closed and opened again.
    Broken,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsolationLevel {
    ReadUncommitted,
    #[default]
    ReadCommitted,
    RepeatableRead,
    Serializable,
    Snapshot,
}

impl Display for IsolationLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IsolationLevel::ReadUncommitted => "READ UNCOMMITTED",
            IsolationLevel::ReadCommitted => "READ COMMITTED",
            IsolationLevel::RepeatableRead => "REPEATABLE READ",
            IsolationLevel::Serializable => "SERIALIZABLE",
            IsolationLevel::Snapshot => "SNAPSHOT",
        })
    }
}

/// Physical database connection, supplied by the driver.
pub trait Connection {
    type Transaction: Transaction;

    fn state(&self) -> ConnectionState;

    fn open(&mut self) -> Result<()>;

    fn close(&mut self) -> Result<()>;

    /// Start a physical transaction, `None` leaves the backend default.
    fn begin(&mut self, isolation_level: Option<IsolationLevel>) -> Result<Self::Transaction>;
}

/// Physical transaction started by [`Connection::begin`].
pub trait Transaction {
    fn isolation_level(&self) -> IsolationLevel;

    fn commit(self) -> Result<()>;

    fn rollback(self) -> Result<()>;
}
