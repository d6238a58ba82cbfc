//! Gateway protocol generations behind one adapter interface.
//!
//! Each generation owns three things: the endpoint path, the request
//! envelope, and the response envelope. Every reply is reduced to a
//! [`StatementReply`] so result decoding and error classification happen
//! exactly once, independent of the wire format.

mod bare;
mod pipeline;
mod query_params;
mod stmt_params;

use std::fmt;

use url::Url;

use super::ProtocolVersion;
use crate::domain::ports::{RemoteErrorKind, StoreError};
use crate::domain::{SqlValue, Statement};

pub use self::pipeline::PipelineProtocol;
pub use self::query_params::QueryParamsProtocol;
pub use self::stmt_params::StmtParamsProtocol;

/// Column names and raw cells of one statement result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    /// Column names in result order; `None` when the gateway omitted them.
    pub columns: Option<Vec<String>>,
    /// Positional cells, one inner vector per row.
    pub rows: Vec<Vec<SqlValue>>,
}

/// Protocol-independent outcome of a single statement.
#[derive(Debug, Clone, PartialEq)]
pub enum StatementReply {
    /// The gateway acknowledged the statement without a result envelope.
    Empty,
    /// The gateway reported an application-level error.
    Error {
        /// Structured classification of the failure.
        kind: RemoteErrorKind,
        /// Gateway-supplied message.
        message: String,
    },
    /// The statement produced a result set, possibly with no rows.
    Rows(RowSet),
}

impl StatementReply {
    /// Build an error reply, classifying it from its code and message.
    pub fn error(code: Option<&str>, message: impl Into<String>) -> Self {
        let message = message.into();
        Self::Error {
            kind: classify_remote_error(code, &message),
            message,
        }
    }
}

/// Request/response format of one gateway generation.
pub trait ProtocolAdapter: Send + Sync + fmt::Debug {
    /// Generation implemented by this adapter.
    fn version(&self) -> ProtocolVersion;

    /// Resolve the statement endpoint against the configured base URL.
    ///
    /// # Errors
    ///
    /// Returns an error when the joined URL cannot be represented.
    fn endpoint(&self, base: &Url) -> Result<Url, url::ParseError>;

    /// Encode one statement as this generation's request body.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidArgument`] when a parameter cannot be
    /// represented on the wire.
    fn encode_request(&self, statement: &Statement) -> Result<serde_json::Value, StoreError>;

    /// Reduce a 2xx response body to a [`StatementReply`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ProtocolDecode`] when the body does not match
    /// this generation's envelope.
    fn decode_reply(&self, body: &[u8]) -> Result<StatementReply, StoreError>;
}

/// Return the adapter for a configured protocol generation.
pub fn adapter_for(version: ProtocolVersion) -> Box<dyn ProtocolAdapter> {
    match version {
        ProtocolVersion::QueryParams => Box::new(QueryParamsProtocol),
        ProtocolVersion::StmtParams => Box::new(StmtParamsProtocol),
        ProtocolVersion::Pipeline => Box::new(PipelineProtocol),
    }
}

/// Classify a gateway error from its optional code and message text.
///
/// Codes are preferred; message matching covers generations that only
/// report text.
pub fn classify_remote_error(code: Option<&str>, message: &str) -> RemoteErrorKind {
    let unique_code = matches!(
        code,
        Some("SQLITE_CONSTRAINT_UNIQUE" | "SQLITE_CONSTRAINT_PRIMARYKEY")
    );
    if unique_code || message.contains("UNIQUE constraint failed") {
        RemoteErrorKind::UniqueViolation
    } else if message.contains("duplicate column name") {
        RemoteErrorKind::DuplicateColumn
    } else {
        RemoteErrorKind::Other
    }
}

/// Join `path` below `base`, treating `base` as a directory.
pub(super) fn join_endpoint(base: &Url, path: &str) -> Result<Url, url::ParseError> {
    let mut directory = base.clone();
    if !directory.path().ends_with('/') {
        let with_slash = format!("{}/", directory.path());
        directory.set_path(&with_slash);
    }
    directory.join(path)
}

fn decode_error(context: &str, error: impl fmt::Display) -> StoreError {
    StoreError::protocol_decode(format!("{context}: {error}"))
}
