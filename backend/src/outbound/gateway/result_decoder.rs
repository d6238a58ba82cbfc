//! Shape a protocol-independent reply into the cardinality the caller asked for.

use super::protocol::{RowSet, StatementReply};
use crate::domain::ports::StoreError;
use crate::domain::{FetchMode, QueryOutput, Row};

/// Convert `reply` into a [`QueryOutput`] matching `fetch`.
///
/// Error replies always surface as [`StoreError::RemoteExecution`], whatever
/// the fetch mode. An empty column list means "no rows".
pub(crate) fn decode_result(
    reply: StatementReply,
    fetch: FetchMode,
) -> Result<QueryOutput, StoreError> {
    match reply {
        StatementReply::Error { kind, message } => {
            Err(StoreError::remote_execution(kind, message))
        }
        StatementReply::Empty => Ok(empty_output(fetch)),
        StatementReply::Rows(set) => match fetch {
            FetchMode::None => Ok(QueryOutput::Done),
            FetchMode::One => Ok(QueryOutput::Row(named_rows(set)?.into_iter().next())),
            FetchMode::All => Ok(QueryOutput::Rows(named_rows(set)?)),
        },
    }
}

const fn empty_output(fetch: FetchMode) -> QueryOutput {
    match fetch {
        FetchMode::None => QueryOutput::Done,
        FetchMode::One => QueryOutput::Row(None),
        FetchMode::All => QueryOutput::Rows(Vec::new()),
    }
}

fn named_rows(set: RowSet) -> Result<Vec<Row>, StoreError> {
    let RowSet { columns, rows } = set;
    let columns = match columns {
        Some(columns) if !columns.is_empty() => columns,
        Some(_) => return Ok(Vec::new()),
        None if rows.is_empty() => return Ok(Vec::new()),
        None => {
            return Err(StoreError::protocol_decode(
                "result rows arrived without column names",
            ));
        }
    };

    rows.into_iter()
        .enumerate()
        .map(|(index, cells)| {
            if cells.len() != columns.len() {
                return Err(StoreError::protocol_decode(format!(
                    "row {index} has {} cells for {} columns",
                    cells.len(),
                    columns.len()
                )));
            }
            Ok(Row::from_pairs(columns.iter().cloned().zip(cells)))
        })
        .collect()
}
