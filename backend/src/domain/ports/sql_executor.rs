//! Driven port for executing one SQL statement against the remote store.
//!
//! Repository Operations and the schema migrator reach the network only
//! through [`SqlExecutor`]. Adapters map every failure into [`StoreError`]
//! before it crosses this boundary, so callers never inspect gateway message
//! text to decide control flow.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{FetchMode, QueryOutput, Row, Statement};

/// Structured classification of a gateway-reported statement error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    /// A natural-key uniqueness constraint rejected the write.
    UniqueViolation,
    /// An additive `ALTER TABLE ... ADD COLUMN` found the column present.
    DuplicateColumn,
    /// Any other server-side failure.
    Other,
}

define_port_error! {
    /// Failures surfaced by the remote SQL store.
    pub enum StoreError {
        /// The HTTP round trip failed before a response arrived.
        Transport { message: String } =>
            "gateway transport failed: {message}",
        /// The gateway answered with a non-2xx status.
        GatewayHttp { status: u16, body: String } =>
            "gateway returned HTTP {status}: {body}",
        /// The response body did not match the active protocol generation.
        ProtocolDecode { message: String } =>
            "gateway response decode failed: {message}",
        /// The gateway reported an application-level statement error.
        RemoteExecution { kind: RemoteErrorKind, message: String } =>
            "remote statement failed: {message}",
        /// A schema statement failed while ensuring the remote schema.
        SchemaSetup { statement: String, message: String } =>
            "schema setup failed at `{statement}`: {message}",
        /// A parameter could not be encoded for the wire.
        InvalidArgument { message: String } =>
            "statement argument rejected: {message}",
        /// A scenario payload could not be serialised or deserialised.
        Payload { message: String } =>
            "scenario payload invalid: {message}",
    }
}

impl StoreError {
    /// Return whether the error is a natural-key uniqueness violation.
    pub const fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            Self::RemoteExecution {
                kind: RemoteErrorKind::UniqueViolation,
                ..
            }
        )
    }

    /// Return whether the error reports an already-present column.
    pub const fn is_duplicate_column(&self) -> bool {
        matches!(
            self,
            Self::RemoteExecution {
                kind: RemoteErrorKind::DuplicateColumn,
                ..
            }
        )
    }
}

/// Port executing a single statement per round trip.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Execute `statement` and shape the result according to `fetch`.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// use hydraulic_store::domain::{FetchMode, Statement};
    /// use hydraulic_store::domain::ports::SqlExecutor;
    ///
    /// let output = executor
    ///     .execute(&Statement::new("SELECT 1 AS one"), FetchMode::One)
    ///     .await?;
    /// ```
    async fn execute(
        &self,
        statement: &Statement,
        fetch: FetchMode,
    ) -> Result<QueryOutput, StoreError>;
}

/// Cardinality-specific helpers layered over [`SqlExecutor::execute`].
#[async_trait]
pub trait SqlExecutorExt: SqlExecutor {
    /// Execute a statement that returns no rows.
    async fn run(&self, statement: &Statement) -> Result<(), StoreError> {
        self.execute(statement, FetchMode::None).await.map(|_| ())
    }

    /// Execute a statement expecting at most one row.
    async fn fetch_one(&self, statement: &Statement) -> Result<Option<Row>, StoreError> {
        self.execute(statement, FetchMode::One).await?.into_row()
    }

    /// Execute a statement expecting any number of rows.
    async fn fetch_all(&self, statement: &Statement) -> Result<Vec<Row>, StoreError> {
        self.execute(statement, FetchMode::All).await?.into_rows()
    }
}

impl<T> SqlExecutorExt for T where T: SqlExecutor + ?Sized {}

#[cfg(test)]
mod tests {
    //! Coverage for error discrimination helpers and the extension trait.

    use rstest::rstest;

    use super::*;
    use crate::domain::SqlValue;

    #[rstest]
    #[case::unique(RemoteErrorKind::UniqueViolation, true, false)]
    #[case::duplicate_column(RemoteErrorKind::DuplicateColumn, false, true)]
    #[case::other(RemoteErrorKind::Other, false, false)]
    fn remote_error_kinds_drive_helpers(
        #[case] kind: RemoteErrorKind,
        #[case] unique: bool,
        #[case] duplicate: bool,
    ) {
        let error = StoreError::remote_execution(kind, "boom");
        assert_eq!(error.is_unique_violation(), unique);
        assert_eq!(error.is_duplicate_column(), duplicate);
    }

    #[test]
    fn non_remote_errors_are_never_unique_violations() {
        assert!(!StoreError::transport("refused").is_unique_violation());
        assert!(!StoreError::gateway_http(409_u16, "conflict").is_unique_violation());
    }

    #[tokio::test]
    async fn fetch_one_requests_single_row_cardinality() {
        let mut executor = MockSqlExecutor::new();
        executor
            .expect_execute()
            .withf(|_, fetch| *fetch == FetchMode::One)
            .times(1)
            .return_once(|_, _| {
                Ok(QueryOutput::Row(Some(Row::from_pairs([(
                    "one",
                    SqlValue::Integer(1),
                )]))))
            });

        let row = executor
            .fetch_one(&Statement::new("SELECT 1 AS one"))
            .await
            .expect("query succeeds")
            .expect("row present");
        assert_eq!(row.get("one"), Some(&SqlValue::Integer(1)));
    }
}
