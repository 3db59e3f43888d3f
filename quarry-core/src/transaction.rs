use crate::{
    Connection, Executor, IsolationLevel, QuarryError, Result, Session, Transaction,
    session::TransactionState,
};
use std::ops::{Deref, DerefMut};

/// One level of a possibly nested transaction, obtained from
/// [`Session::begin_transaction`].
///
/// The session stays reachable through the handle, operations performed on it run inside
/// the transaction. Dropping the handle without committing rolls the whole transaction back.
pub struct SessionTransaction<'s, C: Connection, X: Executor<C>> {
    session: &'s mut Session<C, X>,
    depth: usize,
    serial: u64,
    completed: bool,
}

impl<'s, C: Connection, X: Executor<C>> SessionTransaction<'s, C, X> {
    pub(crate) fn new(session: &'s mut Session<C, X>, depth: usize, serial: u64) -> Self {
        Self {
            session,
            depth,
            serial,
            completed: false,
        }
    }

    /// Nesting level of this handle, 1 for the outermost.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn isolation_level(&self) -> Option<IsolationLevel> {
        match &self.session.transaction {
            TransactionState::Active(v) => Some(v.isolation_level()),
            _ => None,
        }
    }

    /// Commit this level, the database commit happens when the outermost level commits.
    ///
    /// Fails with [`QuarryError::ResourceState`] when a nested level already rolled the
    /// transaction back.
    pub fn commit(mut self) -> Result<()> {
        self.completed = true;
        self.session.commit_transaction(self.depth, self.serial)
    }

    /// Roll back the whole transaction, whatever the nesting level.
    pub fn rollback(mut self) -> Result<()> {
        self.completed = true;
        if !self.session.owns_level(self.depth, self.serial) {
            return Err(QuarryError::resource_state(
                "there is no active transaction to roll back",
            )
            .into());
        }
        self.session.rollback_transaction()
    }
}

impl<'s, C: Connection, X: Executor<C>> Deref for SessionTransaction<'s, C, X> {
    type Target = Session<C, X>;
    fn deref(&self) -> &Self::Target {
        self.session
    }
}

impl<'s, C: Connection, X: Executor<C>> DerefMut for SessionTransaction<'s, C, X> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.session
    }
}

impl<'s, C: Connection, X: Executor<C>> Drop for SessionTransaction<'s, C, X> {
    fn drop(&mut self) {
        if self.completed || !self.session.owns_level(self.depth, self.serial) {
            return;
        }
        log::warn!(
            "Transaction level {} dropped without commit or rollback, rolling back",
            self.depth
        );
        if let Err(e) = self.session.rollback_transaction() {
            log::error!("{:#}", e);
        }
    }
}
