use quarry::{
    Connection, ConnectionState, Error, Executor, IsolationLevel, Result, RowLabeled,
    RowsAffected, Statement, Transaction,
};
use std::{cell::RefCell, collections::VecDeque, rc::Rc};

/// What the mock backend was asked to do, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Open,
    Close,
    Begin(Option<IsolationLevel>),
    Commit,
    Rollback,
    Execute {
        statement: Statement,
        in_transaction: bool,
    },
    Fetch {
        statement: Statement,
        in_transaction: bool,
    },
}

#[derive(Default)]
struct Shared {
    state: ConnectionState,
    events: Vec<Event>,
    rows: VecDeque<Vec<RowLabeled>>,
    rows_affected: u64,
    fail_next: Option<String>,
    fail_begin: bool,
}

/// In memory backend recording every request. Connection, transactions and executor created
/// from the same backend share the event log.
#[derive(Default, Clone)]
pub struct MockBackend {
    shared: Rc<RefCell<Shared>>,
}

impl MockBackend {
    pub fn new() -> Self {
        let result = Self::default();
        result.shared.borrow_mut().rows_affected = 1;
        result
    }

    pub fn connection(&self) -> MockConnection {
        MockConnection {
            shared: self.shared.clone(),
        }
    }

    pub fn executor(&self) -> MockExecutor {
        MockExecutor {
            shared: self.shared.clone(),
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.shared.borrow().events.clone()
    }

    /// Drain the recorded events.
    pub fn take_events(&self) -> Vec<Event> {
        std::mem::take(&mut self.shared.borrow_mut().events)
    }

    /// Statements sent to the executor, in order.
    pub fn statements(&self) -> Vec<Statement> {
        self.shared
            .borrow()
            .events
            .iter()
            .filter_map(|v| match v {
                Event::Execute { statement, .. } | Event::Fetch { statement, .. } => {
                    Some(statement.clone())
                }
                _ => None,
            })
            .collect()
    }

    /// Rows returned by the next fetch.
    pub fn push_rows(&self, rows: Vec<RowLabeled>) {
        self.shared.borrow_mut().rows.push_back(rows);
    }

    pub fn set_rows_affected(&self, rows_affected: u64) {
        self.shared.borrow_mut().rows_affected = rows_affected;
    }

    /// Make the next statement fail with `message`.
    pub fn fail_next(&self, message: impl Into<String>) {
        self.shared.borrow_mut().fail_next = Some(message.into());
    }

    /// Simulate a dropped link.
    pub fn break_connection(&self) {
        self.shared.borrow_mut().state = ConnectionState::Broken;
    }

    /// Make the next begin fail.
    pub fn fail_begin(&self) {
        self.shared.borrow_mut().fail_begin = true;
    }
}

pub struct MockConnection {
    shared: Rc<RefCell<Shared>>,
}

impl Connection for MockConnection {
    type Transaction = MockTransaction;

    fn state(&self) -> ConnectionState {
        self.shared.borrow().state
    }

    fn open(&mut self) -> Result<()> {
        let mut shared = self.shared.borrow_mut();
        if shared.state == ConnectionState::Open {
            return Err(Error::msg("The connection is already open"));
        }
        shared.events.push(Event::Open);
        shared.state = ConnectionState::Open;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let mut shared = self.shared.borrow_mut();
        shared.events.push(Event::Close);
        shared.state = ConnectionState::Closed;
        Ok(())
    }

    fn begin(&mut self, isolation_level: Option<IsolationLevel>) -> Result<Self::Transaction> {
        let mut shared = self.shared.borrow_mut();
        if shared.state != ConnectionState::Open {
            return Err(Error::msg("Cannot begin a transaction on a closed connection"));
        }
        if std::mem::take(&mut shared.fail_begin) {
            return Err(Error::msg("Begin refused by the backend"));
        }
        shared.events.push(Event::Begin(isolation_level));
        Ok(MockTransaction {
            isolation_level: isolation_level.unwrap_or_default(),
            shared: self.shared.clone(),
        })
    }
}

pub struct MockTransaction {
    isolation_level: IsolationLevel,
    shared: Rc<RefCell<Shared>>,
}

impl Transaction for MockTransaction {
    fn isolation_level(&self) -> IsolationLevel {
        self.isolation_level
    }

    fn commit(self) -> Result<()> {
        self.shared.borrow_mut().events.push(Event::Commit);
        Ok(())
    }

    fn rollback(self) -> Result<()> {
        self.shared.borrow_mut().events.push(Event::Rollback);
        Ok(())
    }
}

pub struct MockExecutor {
    shared: Rc<RefCell<Shared>>,
}

impl MockExecutor {
    fn check(&self, connection: &MockConnection) -> Result<()> {
        if connection.state() != ConnectionState::Open {
            return Err(Error::msg("The connection is not open"));
        }
        if let Some(message) = self.shared.borrow_mut().fail_next.take() {
            return Err(Error::msg(message));
        }
        Ok(())
    }
}

impl Executor<MockConnection> for MockExecutor {
    fn execute(
        &mut self,
        connection: &mut MockConnection,
        transaction: Option<&mut MockTransaction>,
        statement: &Statement,
    ) -> Result<RowsAffected> {
        self.check(connection)?;
        let mut shared = self.shared.borrow_mut();
        shared.events.push(Event::Execute {
            statement: statement.clone(),
            in_transaction: transaction.is_some(),
        });
        Ok(RowsAffected::new(shared.rows_affected))
    }

    fn fetch(
        &mut self,
        connection: &mut MockConnection,
        transaction: Option<&mut MockTransaction>,
        statement: &Statement,
    ) -> Result<Vec<RowLabeled>> {
        self.check(connection)?;
        let mut shared = self.shared.borrow_mut();
        shared.events.push(Event::Fetch {
            statement: statement.clone(),
            in_transaction: transaction.is_some(),
        });
        Ok(shared.rows.pop_front().unwrap_or_default())
    }
}
