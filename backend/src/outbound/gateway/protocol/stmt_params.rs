//! Second generation: `{"statements":[{"stmt", "params"}]}` posted to
//! `/v1/execute`, answered with `{"results":[...]}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use super::bare::{BareRowsDto, ErrorDto, encode_params};
use super::{ProtocolAdapter, StatementReply, decode_error, join_endpoint};
use crate::domain::Statement;
use crate::domain::ports::StoreError;
use crate::outbound::gateway::ProtocolVersion;

const EXECUTE_PATH: &str = "v1/execute";

#[derive(Debug, Serialize)]
struct StmtParamsRequest<'a> {
    statements: [StmtParamsStatement<'a>; 1],
}

#[derive(Debug, Serialize)]
struct StmtParamsStatement<'a> {
    stmt: &'a str,
    params: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct StmtParamsResponseDto {
    results: Vec<StmtParamsEntryDto>,
}

#[derive(Debug, Deserialize)]
struct StmtParamsEntryDto {
    #[serde(default)]
    error: Option<ErrorDto>,
    #[serde(flatten)]
    rows: BareRowsDto,
}

/// Adapter for the stmt-params generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct StmtParamsProtocol;

impl ProtocolAdapter for StmtParamsProtocol {
    fn version(&self) -> ProtocolVersion {
        ProtocolVersion::StmtParams
    }

    fn endpoint(&self, base: &Url) -> Result<Url, url::ParseError> {
        join_endpoint(base, EXECUTE_PATH)
    }

    fn encode_request(&self, statement: &Statement) -> Result<Value, StoreError> {
        let request = StmtParamsRequest {
            statements: [StmtParamsStatement {
                stmt: statement.sql(),
                params: encode_params(statement.params())?,
            }],
        };
        serde_json::to_value(&request)
            .map_err(|error| StoreError::invalid_argument(error.to_string()))
    }

    fn decode_reply(&self, body: &[u8]) -> Result<StatementReply, StoreError> {
        let response: StmtParamsResponseDto = serde_json::from_slice(body)
            .map_err(|error| decode_error("invalid stmt-params response", error))?;
        let Some(entry) = response.results.into_iter().next() else {
            return Ok(StatementReply::Empty);
        };
        match entry.error {
            Some(error) => Ok(error.into_reply()),
            None => Ok(StatementReply::Rows(entry.rows.into_row_set()?)),
        }
    }
}
