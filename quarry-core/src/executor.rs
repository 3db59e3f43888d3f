use crate::{Connection, Entity, Error, Result, RowLabeled, RowsAffected, Statement};

/// Runs generated statements against a connection, supplied by the driver.
pub trait Executor<C: Connection> {
    /// Execute the statement and return the total number of rows affected.
    fn execute(
        &mut self,
        connection: &mut C,
        transaction: Option<&mut C::Transaction>,
        statement: &Statement,
    ) -> Result<RowsAffected>;

    /// Execute the statement and return the rows.
    fn fetch(
        &mut self,
        connection: &mut C,
        transaction: Option<&mut C::Transaction>,
        statement: &Statement,
    ) -> Result<Vec<RowLabeled>>;

    /// Execute the statement and map every row to `E`.
    fn query<E: Entity>(
        &mut self,
        connection: &mut C,
        transaction: Option<&mut C::Transaction>,
        statement: &Statement,
    ) -> Result<Vec<E>> {
        self.fetch(connection, transaction, statement)?
            .into_iter()
            .map(E::from_row)
            .collect()
    }

    /// The only row mapped to `E`, `None` when there is none.
    fn query_single_or_default<E: Entity>(
        &mut self,
        connection: &mut C,
        transaction: Option<&mut C::Transaction>,
        statement: &Statement,
    ) -> Result<Option<E>> {
        let mut rows = self.fetch(connection, transaction, statement)?.into_iter();
        let Some(row) = rows.next() else {
            return Ok(None);
        };
        if rows.next().is_some() {
            return Err(Error::msg(format!(
                "Expected at most one row from `{}`",
                statement
            )));
        }
        E::from_row(row).map(Some)
    }
}
