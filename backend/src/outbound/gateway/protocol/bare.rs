//! Untyped JSON values and result envelopes shared by the two legacy
//! generations.

use serde::Deserialize;
use serde_json::{Number, Value};

use super::{RowSet, StatementReply};
use crate::domain::SqlValue;
use crate::domain::ports::StoreError;

/// Encode a parameter as a bare JSON scalar.
pub(super) fn encode_value(value: &SqlValue) -> Result<Value, StoreError> {
    match value {
        SqlValue::Text(text) => Ok(Value::String(text.clone())),
        SqlValue::Integer(integer) => Ok(Value::Number((*integer).into())),
        SqlValue::Float(float) => Number::from_f64(*float).map(Value::Number).ok_or_else(|| {
            StoreError::invalid_argument(format!("non-finite float {float} cannot be sent"))
        }),
        SqlValue::Null => Ok(Value::Null),
    }
}

pub(super) fn encode_params(params: &[SqlValue]) -> Result<Vec<Value>, StoreError> {
    params.iter().map(encode_value).collect()
}

/// Decode a bare JSON cell into a scalar.
pub(super) fn decode_value(cell: Value) -> Result<SqlValue, StoreError> {
    match cell {
        Value::Null => Ok(SqlValue::Null),
        Value::Bool(flag) => Ok(SqlValue::Integer(i64::from(flag))),
        Value::Number(number) => number
            .as_i64()
            .map(SqlValue::Integer)
            .or_else(|| number.as_f64().map(SqlValue::Float))
            .ok_or_else(|| {
                StoreError::protocol_decode(format!("numeric cell {number} is out of range"))
            }),
        Value::String(text) => Ok(SqlValue::Text(text)),
        other @ (Value::Array(_) | Value::Object(_)) => Err(StoreError::protocol_decode(
            format!("unsupported cell value {other}"),
        )),
    }
}

/// Error payload; some gateways send a bare string instead of an object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum ErrorDto {
    Detailed {
        message: String,
        #[serde(default)]
        code: Option<String>,
    },
    Message(String),
}

impl ErrorDto {
    pub(super) fn into_reply(self) -> StatementReply {
        match self {
            Self::Detailed { message, code } => StatementReply::error(code.as_deref(), message),
            Self::Message(message) => StatementReply::error(None, message),
        }
    }
}

/// Columns plus untyped rows.
#[derive(Debug, Default, Deserialize)]
pub(super) struct BareRowsDto {
    #[serde(default)]
    pub(super) columns: Option<Vec<String>>,
    #[serde(default)]
    pub(super) rows: Vec<Vec<Value>>,
}

impl BareRowsDto {
    pub(super) fn into_row_set(self) -> Result<RowSet, StoreError> {
        let rows = self
            .rows
            .into_iter()
            .map(|row| row.into_iter().map(decode_value).collect())
            .collect::<Result<Vec<Vec<SqlValue>>, StoreError>>()?;
        Ok(RowSet {
            columns: self.columns,
            rows,
        })
    }
}
