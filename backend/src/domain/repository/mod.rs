//! Repository Operations: typed CRUD over the `SqlExecutor` port.
//!
//! Each operation is a thin composition of one or two statements with a
//! declared fetch cardinality. Uniqueness violations on insert-style
//! operations are downgraded to `Ok(false)`; every other failure propagates
//! unchanged. A missing row is `Ok(None)`, never an error.

use std::sync::Arc;

use mockable::Clock;
use tracing::debug;

use super::Statement;
use super::ports::{SqlExecutor, SqlExecutorExt, StoreError};

mod catalog;
mod scenarios;
pub(crate) mod statements;
mod users;


/// Repository for users, projects, scenarios and per-user catalogs.
///
/// The repository holds no entity state; the remote store owns it all.
pub struct HydraulicRepository<E: ?Sized> {
    executor: Arc<E>,
    clock: Arc<dyn Clock>,
}

impl<E: ?Sized> Clone for HydraulicRepository<E> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<E> HydraulicRepository<E>
where
    E: SqlExecutor + ?Sized,
{
    /// Create a repository over `executor`, stamping scenario saves with
    /// `clock`.
    pub fn new(executor: Arc<E>, clock: Arc<dyn Clock>) -> Self {
        Self { executor, clock }
    }

    /// Run an insert whose only expected failure is a natural-key clash.
    async fn insert_unique(&self, statement: Statement, entity: &str) -> Result<bool, StoreError> {
        match self.executor.run(&statement).await {
            Ok(()) => Ok(true),
            Err(error) if error.is_unique_violation() => {
                debug!(entity, "insert skipped: natural key already exists");
                Ok(false)
            }
            Err(error) => Err(error),
        }
    }

    /// Collect the named text column of every row, preserving row order.
    async fn fetch_names(&self, statement: Statement, column: &str) -> Result<Vec<String>, StoreError> {
        self.executor
            .fetch_all(&statement)
            .await?
            .iter()
            .map(|row| row.text(column).map(str::to_owned))
            .collect()
    }
}
