//! Third generation: typed-argument pipeline posted to `/v2/pipeline`.
//!
//! Requests carry one `execute` entry whose arguments are tagged with their
//! SQL type; integers travel as decimal strings. Responses carry one result
//! per request, either `ok` with typed rows or `error`. Older deployments
//! send numeric integers or bare scalar cells, both of which are accepted.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use super::bare::{self, ErrorDto};
use super::{ProtocolAdapter, RowSet, StatementReply, decode_error, join_endpoint};
use crate::domain::ports::StoreError;
use crate::domain::{SqlValue, Statement};
use crate::outbound::gateway::ProtocolVersion;

const PIPELINE_PATH: &str = "v2/pipeline";

#[derive(Debug, Serialize)]
struct PipelineRequest<'a> {
    requests: [PipelineStreamRequest<'a>; 1],
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum PipelineStreamRequest<'a> {
    Execute { stmt: PipelineStmt<'a> },
}

#[derive(Debug, Serialize)]
struct PipelineStmt<'a> {
    sql: &'a str,
    args: Vec<TypedValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum TypedValue {
    Null,
    Integer { value: IntegerRepr },
    Float { value: f64 },
    Text { value: String },
    Blob { base64: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
enum IntegerRepr {
    Decimal(String),
    Number(i64),
}

impl TypedValue {
    fn encode(value: &SqlValue) -> Result<Self, StoreError> {
        match value {
            SqlValue::Null => Ok(Self::Null),
            SqlValue::Integer(integer) => Ok(Self::Integer {
                value: IntegerRepr::Decimal(integer.to_string()),
            }),
            SqlValue::Float(float) if float.is_finite() => Ok(Self::Float { value: *float }),
            SqlValue::Float(float) => Err(StoreError::invalid_argument(format!(
                "non-finite float {float} cannot be sent"
            ))),
            SqlValue::Text(text) => Ok(Self::Text {
                value: text.clone(),
            }),
        }
    }

    fn decode(self) -> Result<SqlValue, StoreError> {
        match self {
            Self::Null => Ok(SqlValue::Null),
            Self::Integer {
                value: IntegerRepr::Number(integer),
            } => Ok(SqlValue::Integer(integer)),
            Self::Integer {
                value: IntegerRepr::Decimal(digits),
            } => digits.trim().parse().map(SqlValue::Integer).map_err(|error| {
                decode_error(&format!("integer cell `{digits}` is not decimal"), error)
            }),
            Self::Float { value } => Ok(SqlValue::Float(value)),
            Self::Text { value } => Ok(SqlValue::Text(value)),
            Self::Blob { .. } => Err(StoreError::protocol_decode(
                "blob cells are not supported",
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PipelineResponseDto {
    results: Vec<PipelineResultDto>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum PipelineResultDto {
    Ok {
        #[serde(default)]
        response: Option<PipelineStreamResponseDto>,
    },
    Error {
        error: ErrorDto,
    },
}

#[derive(Debug, Deserialize)]
struct PipelineStreamResponseDto {
    #[serde(default)]
    result: Option<PipelineExecuteResultDto>,
}

#[derive(Debug, Deserialize)]
struct PipelineExecuteResultDto {
    #[serde(default)]
    cols: Option<Vec<PipelineColumnDto>>,
    #[serde(default)]
    rows: Vec<Vec<PipelineCellDto>>,
}

#[derive(Debug, Deserialize)]
struct PipelineColumnDto {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PipelineCellDto {
    Typed(TypedValue),
    Bare(Value),
}

impl PipelineCellDto {
    fn decode(self) -> Result<SqlValue, StoreError> {
        match self {
            Self::Typed(typed) => typed.decode(),
            Self::Bare(value) => bare::decode_value(value),
        }
    }
}

impl PipelineExecuteResultDto {
    fn into_row_set(self) -> Result<RowSet, StoreError> {
        let columns = self
            .cols
            .map(|cols| {
                cols.into_iter()
                    .enumerate()
                    .map(|(index, column)| {
                        column.name.ok_or_else(|| {
                            StoreError::protocol_decode(format!("column {index} has no name"))
                        })
                    })
                    .collect::<Result<Vec<String>, StoreError>>()
            })
            .transpose()?;
        let rows = self
            .rows
            .into_iter()
            .map(|row| row.into_iter().map(PipelineCellDto::decode).collect())
            .collect::<Result<Vec<Vec<SqlValue>>, StoreError>>()?;
        Ok(RowSet { columns, rows })
    }
}

/// Adapter for the pipeline generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineProtocol;

impl ProtocolAdapter for PipelineProtocol {
    fn version(&self) -> ProtocolVersion {
        ProtocolVersion::Pipeline
    }

    fn endpoint(&self, base: &Url) -> Result<Url, url::ParseError> {
        join_endpoint(base, PIPELINE_PATH)
    }

    fn encode_request(&self, statement: &Statement) -> Result<Value, StoreError> {
        let args = statement
            .params()
            .iter()
            .map(TypedValue::encode)
            .collect::<Result<Vec<_>, _>>()?;
        let request = PipelineRequest {
            requests: [PipelineStreamRequest::Execute {
                stmt: PipelineStmt {
                    sql: statement.sql(),
                    args,
                },
            }],
        };
        serde_json::to_value(&request)
            .map_err(|error| StoreError::invalid_argument(error.to_string()))
    }

    fn decode_reply(&self, body: &[u8]) -> Result<StatementReply, StoreError> {
        let response: PipelineResponseDto = serde_json::from_slice(body)
            .map_err(|error| decode_error("invalid pipeline response", error))?;
        match response.results.into_iter().next() {
            None => Ok(StatementReply::Empty),
            Some(PipelineResultDto::Error { error }) => Ok(error.into_reply()),
            Some(PipelineResultDto::Ok { response }) => {
                match response.and_then(|response| response.result) {
                    Some(result) => Ok(StatementReply::Rows(result.into_row_set()?)),
                    None => Ok(StatementReply::Empty),
                }
            }
        }
    }
}
