//! SQL statements, scalar values and decoded rows.
//!
//! These types are the vocabulary shared by Repository Operations and the
//! `SqlExecutor` port. They carry no knowledge of any gateway wire format;
//! protocol adapters translate them at the outbound boundary.

use std::collections::BTreeMap;
use std::fmt;

use super::ports::StoreError;

/// One scalar SQL value, either bound as a parameter or read from a row.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// UTF-8 text.
    Text(String),
    /// Signed 64-bit integer.
    Integer(i64),
    /// Double-precision float.
    Float(f64),
    /// SQL `NULL`.
    Null,
}

impl SqlValue {
    /// Return the wire type name used by typed protocols.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Null => "null",
        }
    }

    /// Return whether this value is `NULL`.
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl<T> From<Option<T>> for SqlValue
where
    T: Into<Self>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Requested fetch cardinality for a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// No rows are expected.
    None,
    /// At most one row is expected.
    One,
    /// Any number of rows is expected.
    All,
}

impl fmt::Display for FetchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::None => "none",
            Self::One => "one",
            Self::All => "all",
        };
        f.write_str(label)
    }
}

/// A SQL template with positional `?` placeholders and its parameters.
///
/// # Examples
/// ```
/// use hydraulic_store::domain::{SqlValue, Statement};
///
/// let statement = Statement::new("SELECT roughness FROM user_materials WHERE username = ?")
///     .bind("ada");
/// assert_eq!(statement.params(), &[SqlValue::Text("ada".to_owned())]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    sql: String,
    params: Vec<SqlValue>,
}

impl Statement {
    /// Start a statement with no parameters.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Append the next positional parameter.
    #[must_use]
    pub fn bind(mut self, value: impl Into<SqlValue>) -> Self {
        self.params.push(value.into());
        self
    }

    /// SQL template text.
    pub fn sql(&self) -> &str {
        self.sql.as_str()
    }

    /// Positional parameters in placeholder order.
    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }
}

/// One decoded result row, addressed by column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: BTreeMap<String, SqlValue>,
}

impl Row {
    /// Build a row by pairing column names with values.
    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, SqlValue)>,
        K: Into<String>,
    {
        Self {
            cells: pairs
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        }
    }

    /// Look up a cell by column name.
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.cells.get(column)
    }

    /// Number of columns in the row.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Return whether the row carries no columns.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Read a non-null text column.
    pub fn text(&self, column: &str) -> Result<&str, StoreError> {
        match self.cell(column)? {
            SqlValue::Text(value) => Ok(value.as_str()),
            other => Err(mismatch(column, "text", other)),
        }
    }

    /// Read a nullable text column.
    pub fn optional_text(&self, column: &str) -> Result<Option<&str>, StoreError> {
        match self.cell(column)? {
            SqlValue::Null => Ok(None),
            SqlValue::Text(value) => Ok(Some(value.as_str())),
            other => Err(mismatch(column, "text", other)),
        }
    }

    /// Read a non-null real column, widening integer cells.
    pub fn real(&self, column: &str) -> Result<f64, StoreError> {
        self.optional_real(column)?
            .ok_or_else(|| StoreError::protocol_decode(format!("column `{column}` is null")))
    }

    /// Read a nullable real column, widening integer cells.
    ///
    /// A column missing from the row reads as `None`; rows written before an
    /// additive column existed are returned by some gateways without it.
    pub fn optional_real(&self, column: &str) -> Result<Option<f64>, StoreError> {
        match self.cells.get(column) {
            None | Some(SqlValue::Null) => Ok(None),
            Some(SqlValue::Float(value)) => Ok(Some(*value)),
            #[expect(
                clippy::cast_precision_loss,
                reason = "SQLite returns whole-number REAL values as integers"
            )]
            Some(SqlValue::Integer(value)) => Ok(Some(*value as f64)),
            Some(other) => Err(mismatch(column, "real", other)),
        }
    }

    fn cell(&self, column: &str) -> Result<&SqlValue, StoreError> {
        self.cells.get(column).ok_or_else(|| {
            StoreError::protocol_decode(format!("column `{column}` missing from result row"))
        })
    }
}

fn mismatch(column: &str, expected: &str, actual: &SqlValue) -> StoreError {
    StoreError::protocol_decode(format!(
        "column `{column}` expected {expected}, found {}",
        actual.type_name()
    ))
}

/// Result of executing one statement, shaped by the requested [`FetchMode`].
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutput {
    /// `FetchMode::None` completed.
    Done,
    /// `FetchMode::One` result; `None` when no row matched.
    Row(Option<Row>),
    /// `FetchMode::All` result, possibly empty.
    Rows(Vec<Row>),
}

impl QueryOutput {
    /// Consume the output as a single optional row.
    pub fn into_row(self) -> Result<Option<Row>, StoreError> {
        match self {
            Self::Row(row) => Ok(row),
            Self::Rows(rows) => Ok(rows.into_iter().next()),
            Self::Done => Err(StoreError::protocol_decode(
                "executor returned no row set for a fetch-one statement",
            )),
        }
    }

    /// Consume the output as an ordered row sequence.
    pub fn into_rows(self) -> Result<Vec<Row>, StoreError> {
        match self {
            Self::Rows(rows) => Ok(rows),
            Self::Row(row) => Ok(row.into_iter().collect()),
            Self::Done => Err(StoreError::protocol_decode(
                "executor returned no row set for a fetch-all statement",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit coverage for row accessors and statement building.

    use rstest::rstest;

    use super::*;

    fn fluid_row() -> Row {
        Row::from_pairs([
            ("fluid_name", SqlValue::from("glycol")),
            ("density", SqlValue::Integer(1_113)),
            ("kinematic_viscosity", SqlValue::Float(1.6e-5)),
            ("vapor_pressure_kpa", SqlValue::Null),
        ])
    }

    #[test]
    fn bind_preserves_parameter_order() {
        let statement = Statement::new("INSERT INTO t VALUES (?, ?, ?)")
            .bind("a")
            .bind(2_i64)
            .bind(None::<f64>);

        assert_eq!(
            statement.params(),
            &[
                SqlValue::Text("a".to_owned()),
                SqlValue::Integer(2),
                SqlValue::Null
            ]
        );
    }

    #[test]
    fn real_accessor_widens_integer_cells() {
        let row = fluid_row();
        assert_eq!(row.real("density").expect("density"), 1_113.0);
        assert_eq!(row.real("kinematic_viscosity").expect("viscosity"), 1.6e-5);
    }

    #[rstest]
    #[case::null_cell("vapor_pressure_kpa")]
    #[case::absent_cell("not_selected")]
    fn optional_real_reads_absent_values_as_none(#[case] column: &str) {
        assert_eq!(fluid_row().optional_real(column).expect("optional"), None);
    }

    #[test]
    fn text_accessor_rejects_numeric_cells() {
        let error = fluid_row().text("density").expect_err("type mismatch");
        assert!(
            matches!(error, StoreError::ProtocolDecode { .. }),
            "type mismatch should surface as a decode error: {error}"
        );
    }

    #[test]
    fn text_accessor_reports_missing_columns() {
        let error = fluid_row().text("material_name").expect_err("missing");
        assert!(error.to_string().contains("material_name"));
    }

    #[test]
    fn fetch_all_output_rejects_done() {
        assert!(QueryOutput::Done.into_rows().is_err());
        assert_eq!(
            QueryOutput::Rows(Vec::new()).into_rows().expect("rows"),
            Vec::new()
        );
    }
}
