//! First generation: `{"statements":[{"q", "params"}]}` posted to the
//! gateway root, answered with an array of per-statement envelopes.
//!
//! `params` is the bare value array: one untyped JSON scalar per `?`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use super::bare::{BareRowsDto, ErrorDto, encode_params};
use super::{ProtocolAdapter, StatementReply, decode_error, join_endpoint};
use crate::domain::Statement;
use crate::domain::ports::StoreError;
use crate::outbound::gateway::ProtocolVersion;

#[derive(Debug, Serialize)]
struct QueryParamsRequest<'a> {
    statements: [QueryParamsStatement<'a>; 1],
}

#[derive(Debug, Serialize)]
struct QueryParamsStatement<'a> {
    q: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    params: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct QueryParamsEntryDto {
    #[serde(default)]
    results: Option<BareRowsDto>,
    #[serde(default)]
    error: Option<ErrorDto>,
}

/// Adapter for the query-params generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryParamsProtocol;

impl ProtocolAdapter for QueryParamsProtocol {
    fn version(&self) -> ProtocolVersion {
        ProtocolVersion::QueryParams
    }

    fn endpoint(&self, base: &Url) -> Result<Url, url::ParseError> {
        join_endpoint(base, "")
    }

    fn encode_request(&self, statement: &Statement) -> Result<Value, StoreError> {
        let request = QueryParamsRequest {
            statements: [QueryParamsStatement {
                q: statement.sql(),
                params: encode_params(statement.params())?,
            }],
        };
        serde_json::to_value(&request)
            .map_err(|error| StoreError::invalid_argument(error.to_string()))
    }

    fn decode_reply(&self, body: &[u8]) -> Result<StatementReply, StoreError> {
        let entries: Vec<QueryParamsEntryDto> = serde_json::from_slice(body)
            .map_err(|error| decode_error("invalid query-params response", error))?;
        let Some(entry) = entries.into_iter().next() else {
            return Ok(StatementReply::Empty);
        };
        if let Some(error) = entry.error {
            return Ok(error.into_reply());
        }
        match entry.results {
            Some(results) => Ok(StatementReply::Rows(results.into_row_set()?)),
            None => Ok(StatementReply::Empty),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::SqlValue;
    use crate::domain::ports::RemoteErrorKind;
    use crate::outbound::gateway::protocol::RowSet;

    #[test]
    fn omits_params_when_statement_has_none() {
        let body = QueryParamsProtocol
            .encode_request(&Statement::new("SELECT 1"))
            .expect("encodable");
        assert_eq!(body, json!({ "statements": [{ "q": "SELECT 1" }] }));
    }

    #[test]
    fn sends_bare_positional_params() {
        let statement = Statement::new("SELECT name FROM users WHERE username = ? AND id > ?")
            .bind("ada")
            .bind(3_i64);
        let body = QueryParamsProtocol
            .encode_request(&statement)
            .expect("encodable");
        assert_eq!(body["statements"][0]["params"], json!(["ada", 3]));
    }

    #[test]
    fn decodes_first_result_envelope() {
        let body = br#"[{"results":{"columns":["name","roughness"],"rows":[["steel",4.5e-5]]}}]"#;
        let reply = QueryParamsProtocol.decode_reply(body).expect("decodable");
        assert_eq!(
            reply,
            StatementReply::Rows(RowSet {
                columns: Some(vec!["name".to_owned(), "roughness".to_owned()]),
                rows: vec![vec![SqlValue::from("steel"), SqlValue::Float(4.5e-5)]],
            })
        );
    }

    #[test]
    fn decodes_error_envelope() {
        let body = br#"[{"error":{"message":"UNIQUE constraint failed: users.username"}}]"#;
        let reply = QueryParamsProtocol.decode_reply(body).expect("decodable");
        assert!(matches!(
            reply,
            StatementReply::Error {
                kind: RemoteErrorKind::UniqueViolation,
                ..
            }
        ));
    }

    #[test]
    fn empty_array_is_an_empty_reply() {
        assert_eq!(
            QueryParamsProtocol.decode_reply(b"[]").expect("decodable"),
            StatementReply::Empty
        );
    }

    #[test]
    fn rejects_non_array_bodies() {
        let error = QueryParamsProtocol
            .decode_reply(br#"{"results":[]}"#)
            .expect_err("wrong envelope");
        assert!(matches!(error, StoreError::ProtocolDecode { .. }));
    }
}
