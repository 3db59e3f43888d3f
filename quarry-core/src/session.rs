use crate::{
    Connection, ConnectionState, DeleteFilter, Entity, Error, Executor, Expression,
    IsolationLevel, KeyValues, Options, QuarryError, Query, Result, RowsAffected,
    SessionTransaction, SqlWriter, Statement, StatementBuilder, Transaction, Value, col,
    truncate_long, val,
};
use anyhow::Context as _;
use std::{mem, sync::Arc};

/// Lifecycle of the single physical transaction owned by a session.
pub(crate) enum TransactionState<T> {
    Idle,
    Active(T),
    Committing,
    RollingBack,
}

/// Unit of work over one physical connection.
///
/// Every operation opens the connection when needed and closes it afterwards, unless it
/// was already open. Transactions started with [`Session::begin_transaction`] keep the
/// connection open until the outermost one completes, nested begins share the physical
/// transaction and only move the depth counter.
pub struct Session<C: Connection, X: Executor<C>> {
    connection: Option<C>,
    executor: X,
    writer: Arc<dyn SqlWriter>,
    pub(crate) transaction: TransactionState<C::Transaction>,
    pub(crate) depth: usize,
    /// Serial of the physical transaction, handles of an ended one are stale.
    pub(crate) serial: u64,
    opened_by_transaction: bool,
}

fn disposed() -> Error {
    QuarryError::resource_state("the session has been disposed").into()
}

impl<C: Connection, X: Executor<C>> Session<C, X> {
    pub fn new(connection: C, writer: Arc<dyn SqlWriter>, executor: X) -> Self {
        Self {
            connection: Some(connection),
            executor,
            writer,
            transaction: TransactionState::Idle,
            depth: 0,
            serial: 0,
            opened_by_transaction: false,
        }
    }

    pub fn writer(&self) -> &dyn SqlWriter {
        self.writer.as_dyn()
    }

    pub fn executor(&self) -> &X {
        &self.executor
    }

    /// Physical connection, `None` once disposed.
    pub fn connection(&self) -> Option<&C> {
        self.connection.as_ref()
    }

    pub fn state(&self) -> ConnectionState {
        self.connection
            .as_ref()
            .map(C::state)
            .unwrap_or(ConnectionState::Closed)
    }

    pub fn is_disposed(&self) -> bool {
        self.connection.is_none()
    }

    /// Number of begins not yet matched by a commit, zero when no transaction is active.
    pub fn transaction_depth(&self) -> usize {
        self.depth
    }

    pub fn in_transaction(&self) -> bool {
        matches!(self.transaction, TransactionState::Active(..))
    }

    /// Open the connection, reopening it when broken. Returns whether it was opened here.
    fn open_connection(&mut self) -> Result<bool> {
        let connection = self.connection.as_mut().ok_or_else(disposed)?;
        match connection.state() {
            ConnectionState::Open => Ok(false),
            ConnectionState::Broken => {
                log::trace!("Reopening broken connection");
                connection.close()?;
                connection.open()?;
                Ok(true)
            }
            ConnectionState::Closed => {
                log::trace!("Opening connection");
                connection.open()?;
                Ok(true)
            }
        }
    }

    fn close_connection(&mut self) -> Result<()> {
        let connection = self.connection.as_mut().ok_or_else(disposed)?;
        if connection.state() != ConnectionState::Closed {
            log::trace!("Closing connection");
            connection.close()?;
        }
        Ok(())
    }

    /// Open the connection, a no-op when it is already open.
    pub fn open(&mut self) -> Result<()> {
        self.open_connection().map(|_| ())
    }

    /// Close the connection, a no-op when it is already closed.
    pub fn close(&mut self) -> Result<()> {
        if self.in_transaction() {
            return Err(QuarryError::resource_state(
                "cannot close the connection while a transaction is active",
            )
            .into());
        }
        self.close_connection()
    }

    /// Roll back the active transaction and release the connection. Every later operation
    /// fails, calling it again does nothing.
    pub fn dispose(&mut self) -> Result<()> {
        if self.connection.is_none() {
            return Ok(());
        }
        let mut result = Ok(());
        if self.in_transaction() {
            log::warn!("Disposing a session with an active transaction, rolling back");
            result = self.rollback_transaction();
        }
        let closed = self.close_connection();
        self.connection = None;
        result.and(closed)
    }

    /// Run `f` with the connection open, closing it afterwards when opened here.
    fn scoped<R>(
        &mut self,
        f: impl FnOnce(&mut X, &mut C, Option<&mut C::Transaction>) -> Result<R>,
    ) -> Result<R> {
        let opened = self.open_connection()?;
        let result = match self.connection.as_mut() {
            Some(connection) => {
                let transaction = match &mut self.transaction {
                    TransactionState::Active(v) => Some(v),
                    _ => None,
                };
                f(&mut self.executor, connection, transaction)
            }
            None => Err(disposed()),
        };
        if opened {
            if let Err(e) = self.close_connection() {
                log::error!("{:#}", e);
                if result.is_ok() {
                    return Err(e);
                }
            }
        }
        result
    }

    fn execute(&mut self, statement: &Statement) -> Result<RowsAffected> {
        log::debug!("{}", statement);
        self.scoped(|executor, connection, transaction| {
            executor
                .execute(connection, transaction, statement)
                .with_context(|| format!("While executing `{}`", truncate_long!(statement.sql)))
        })
        .inspect_err(|e| log::error!("{:#}", e))
    }

    fn fetch_all<E: Entity>(&mut self, statement: &Statement) -> Result<Vec<E>> {
        log::debug!("{}", statement);
        self.scoped(|executor, connection, transaction| {
            executor
                .query(connection, transaction, statement)
                .with_context(|| format!("While fetching `{}`", truncate_long!(statement.sql)))
        })
        .inspect_err(|e| log::error!("{:#}", e))
    }

    fn fetch_one<E: Entity>(&mut self, statement: &Statement) -> Result<Option<E>> {
        log::debug!("{}", statement);
        self.scoped(|executor, connection, transaction| {
            executor
                .query_single_or_default(connection, transaction, statement)
                .with_context(|| format!("While fetching `{}`", truncate_long!(statement.sql)))
        })
        .inspect_err(|e| log::error!("{:#}", e))
    }

    fn builder(&self) -> StatementBuilder<'_> {
        StatementBuilder::new(self.writer.as_dyn())
    }

    fn ensure_usable(&self) -> Result<()> {
        if self.connection.is_none() {
            return Err(disposed());
        }
        Ok(())
    }

    /// A new query over `E` rendered by this session's dialect.
    pub fn select<E: Entity>(&self) -> Query<E> {
        Query::new(self.writer.clone())
    }

    pub fn query<E: Entity>(&mut self, query: &Query<E>) -> Result<Vec<E>> {
        self.ensure_usable()?;
        let statement = query.to_sql()?;
        self.fetch_all(&statement)
    }

    pub fn query_where<E: Entity>(
        &mut self,
        predicate: Expression,
        options: &Options,
    ) -> Result<Vec<E>> {
        let mut query = self.select::<E>().filter(predicate);
        if let Some(table_name) = &options.table_name {
            query = query.with_table_name(table_name);
        }
        self.query(&query)
    }

    /// Entity whose single column primary key equals `id`.
    pub fn get_by_id<E: Entity>(
        &mut self,
        id: impl Into<Value>,
        options: &Options,
    ) -> Result<Option<E>> {
        let def = E::entity_def();
        let mut keys = def.primary_key_def();
        let key = match (keys.next(), keys.next()) {
            (Some(key), None) => key,
            (None, _) => {
                return Err(QuarryError::configuration(format!(
                    "`{}` has no primary key",
                    def.type_name
                ))
                .into());
            }
            (Some(..), Some(..)) => {
                return Err(QuarryError::configuration(format!(
                    "`{}` has a composite primary key, use get_by_key",
                    def.type_name
                ))
                .into());
            }
        };
        self.get_by_key::<E>(&KeyValues::new().with(key.field, id), options)
    }

    /// Entity identified by its whole primary key, entries keyed by member or column names.
    pub fn get_by_key<E: Entity>(
        &mut self,
        keys: &KeyValues,
        options: &Options,
    ) -> Result<Option<E>> {
        self.ensure_usable()?;
        let def = E::entity_def();
        if def.primary_key_def().next().is_none() {
            return Err(QuarryError::configuration(format!(
                "`{}` has no primary key",
                def.type_name
            ))
            .into());
        }
        if let Some((name, _)) = keys
            .iter()
            .find(|(name, _)| !def.column(name).is_some_and(|c| c.primary_key))
        {
            return Err(QuarryError::argument(format!(
                "`{}` is not a primary key member of `{}`",
                name, def.type_name
            ))
            .into());
        }
        let predicate = def
            .primary_key_def()
            .map(|key| {
                keys.iter()
                    .find(|(name, _)| def.column(name).is_some_and(|c| c.field == key.field))
                    .map(|(_, value)| col(key.field).eq(val(value.clone())))
                    .ok_or_else(|| {
                        QuarryError::argument(format!(
                            "missing value for the key member `{}` of `{}`",
                            key.field, def.type_name
                        ))
                    })
            })
            .collect::<std::result::Result<Vec<_>, QuarryError>>()?
            .into_iter()
            .reduce(|lhs, rhs| lhs.and(rhs))
            .ok_or_else(|| {
                QuarryError::configuration(format!("`{}` has no primary key", def.type_name))
            })?;
        let mut query = self.select::<E>().filter(predicate);
        if let Some(table_name) = &options.table_name {
            query = query.with_table_name(table_name);
        }
        let statement = query.to_sql()?;
        self.fetch_one(&statement)
    }

    /// Insert `entity`, returning the number of rows affected.
    pub fn insert<E: Entity>(&mut self, entity: &E, options: &Options) -> Result<u64> {
        self.ensure_usable()?;
        let statement = self.builder().insert(entity, options)?;
        self.execute(&statement).map(|v| v.rows_affected)
    }

    /// Insert `entity` and read the stored row back, generated columns included.
    pub fn insert_returning<E: Entity>(
        &mut self,
        entity: &E,
        options: &Options,
    ) -> Result<Option<E>> {
        self.ensure_usable()?;
        let options = options.clone().select_after_mutation(true);
        let statement = self.builder().insert(entity, &options)?;
        self.fetch_one(&statement)
    }

    /// Update `entity` by primary key, returning the number of rows affected.
    pub fn update<E: Entity>(&mut self, entity: &E, options: &Options) -> Result<u64> {
        self.ensure_usable()?;
        let statement = self.builder().update(entity, options)?;
        self.execute(&statement).map(|v| v.rows_affected)
    }

    /// Update `entity` by primary key and read the stored row back.
    pub fn update_returning<E: Entity>(
        &mut self,
        entity: &E,
        options: &Options,
    ) -> Result<Option<E>> {
        self.ensure_usable()?;
        let options = options.clone().select_after_mutation(true);
        let statement = self.builder().update(entity, &options)?;
        self.fetch_one(&statement)
    }

    /// Update the rows matching a single comparison with the values of `entity`.
    pub fn update_where<E: Entity>(
        &mut self,
        entity: &E,
        predicate: &Expression,
        options: &Options,
    ) -> Result<u64> {
        self.ensure_usable()?;
        let statement = self.builder().update_where(entity, predicate, options)?;
        self.execute(&statement).map(|v| v.rows_affected)
    }

    /// Delete `entity` by primary key.
    pub fn delete<E: Entity>(&mut self, entity: &E, options: &Options) -> Result<u64> {
        self.ensure_usable()?;
        let statement = self.builder().delete_entity(entity, options)?;
        self.execute(&statement).map(|v| v.rows_affected)
    }

    pub fn delete_where<E: Entity>(
        &mut self,
        predicate: &Expression,
        options: &Options,
    ) -> Result<u64> {
        self.ensure_usable()?;
        let statement = self
            .builder()
            .delete::<E>(DeleteFilter::Predicate(predicate), options)?;
        self.execute(&statement).map(|v| v.rows_affected)
    }

    pub fn delete_by_key<E: Entity>(&mut self, keys: &KeyValues, options: &Options) -> Result<u64> {
        self.ensure_usable()?;
        let statement = self.builder().delete::<E>(DeleteFilter::Keys(keys), options)?;
        self.execute(&statement).map(|v| v.rows_affected)
    }

    /// Start a transaction, or join the active one incrementing the depth.
    ///
    /// The handle commits with [`SessionTransaction::commit`], only the outermost commit
    /// reaches the database. Dropping a handle without completing it rolls back.
    pub fn begin_transaction(
        &mut self,
        isolation_level: Option<IsolationLevel>,
    ) -> Result<SessionTransaction<'_, C, X>> {
        self.ensure_usable()?;
        match &self.transaction {
            TransactionState::Active(transaction) => {
                if let Some(requested) = isolation_level {
                    if requested != transaction.isolation_level() {
                        log::warn!(
                            "Nested transaction requested {}, keeping {}",
                            requested,
                            transaction.isolation_level()
                        );
                    }
                }
                self.depth += 1;
                log::trace!("Joined transaction, depth {}", self.depth);
            }
            TransactionState::Idle => {
                let opened = self.open_connection()?;
                let begun = match self.connection.as_mut() {
                    Some(connection) => connection.begin(isolation_level),
                    None => Err(disposed()),
                };
                match begun {
                    Ok(transaction) => {
                        log::trace!("Began transaction {}", transaction.isolation_level());
                        self.transaction = TransactionState::Active(transaction);
                        self.depth = 1;
                        self.serial = self.serial.wrapping_add(1);
                        self.opened_by_transaction = opened;
                    }
                    Err(e) => {
                        if opened {
                            if let Err(e) = self.close_connection() {
                                log::error!("{:#}", e);
                            }
                        }
                        log::error!("{:#}", e);
                        return Err(e);
                    }
                }
            }
            TransactionState::Committing | TransactionState::RollingBack => {
                return Err(QuarryError::resource_state(
                    "cannot begin while the transaction is completing",
                )
                .into());
            }
        }
        let (depth, serial) = (self.depth, self.serial);
        Ok(SessionTransaction::new(self, depth, serial))
    }

    /// Whether level `depth` of the physical transaction `serial` is still active.
    pub(crate) fn owns_level(&self, depth: usize, serial: u64) -> bool {
        matches!(self.transaction, TransactionState::Active(..))
            && self.serial == serial
            && self.depth >= depth
    }

    /// Commit the level `depth`, the physical commit happens once every level committed.
    pub(crate) fn commit_transaction(&mut self, depth: usize, serial: u64) -> Result<()> {
        if !self.owns_level(depth, serial) {
            return Err(QuarryError::resource_state(format!(
                "transaction level {} cannot commit, the transaction was already rolled back",
                depth
            ))
            .into());
        }
        self.depth -= 1;
        if self.depth > 0 {
            log::trace!("Committed nested level, depth {}", self.depth);
            return Ok(());
        }
        let result = match mem::replace(&mut self.transaction, TransactionState::Committing) {
            TransactionState::Active(transaction) => {
                log::trace!("Committing transaction");
                transaction.commit()
            }
            _ => Ok(()),
        };
        self.transaction = TransactionState::Idle;
        self.complete_transaction(result)
    }

    /// Roll back the physical transaction whatever the depth.
    pub(crate) fn rollback_transaction(&mut self) -> Result<()> {
        if !self.in_transaction() {
            return Err(
                QuarryError::resource_state("there is no active transaction to roll back").into(),
            );
        }
        self.depth = 0;
        let result = match mem::replace(&mut self.transaction, TransactionState::RollingBack) {
            TransactionState::Active(transaction) => {
                log::trace!("Rolling back transaction");
                transaction.rollback()
            }
            _ => Ok(()),
        };
        self.transaction = TransactionState::Idle;
        self.complete_transaction(result)
    }

    fn complete_transaction(&mut self, result: Result<()>) -> Result<()> {
        if let Err(e) = &result {
            log::error!("{:#}", e);
        }
        if mem::take(&mut self.opened_by_transaction) {
            let closed = self.close_connection();
            if let Err(e) = &closed {
                log::error!("{:#}", e);
            }
            return result.and(closed);
        }
        result
    }
}

impl<C: Connection, X: Executor<C>> Drop for Session<C, X> {
    fn drop(&mut self) {
        if let Err(e) = self.dispose() {
            log::error!("{:#}", e);
        }
    }
}
