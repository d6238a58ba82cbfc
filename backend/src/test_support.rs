//! Test utilities for the hydraulic store crate.
//!
//! This module provides shared helpers for both unit tests (in `src/`) and
//! integration tests (in `tests/`). It is only compiled with the
//! `test-support` feature.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, ffi, params, params_from_iter};

use crate::domain::ports::{SqlExecutor, StoreError};
use crate::domain::{FetchMode, QueryOutput, ScenarioKey, SqlValue, Statement};
use crate::outbound::gateway::protocol::{RowSet, StatementReply, classify_remote_error};
use crate::outbound::gateway::result_decoder::decode_result;

/// Tables as they stood before `email`, `vapor_pressure_kpa` and
/// `last_modified` were introduced.
const LEGACY_TABLES: [&str; 5] = [
    "CREATE TABLE users (\
     id INTEGER PRIMARY KEY AUTOINCREMENT, \
     username TEXT NOT NULL UNIQUE, \
     password TEXT NOT NULL, \
     name TEXT NOT NULL)",
    "CREATE TABLE projects (\
     id INTEGER PRIMARY KEY AUTOINCREMENT, \
     username TEXT NOT NULL, \
     project_name TEXT NOT NULL, \
     UNIQUE(username, project_name))",
    "CREATE TABLE scenarios (\
     id INTEGER PRIMARY KEY AUTOINCREMENT, \
     username TEXT NOT NULL, \
     project_name TEXT NOT NULL, \
     scenario_name TEXT NOT NULL, \
     scenario_data TEXT NOT NULL, \
     UNIQUE(username, project_name, scenario_name))",
    "CREATE TABLE user_fluids (\
     id INTEGER PRIMARY KEY AUTOINCREMENT, \
     username TEXT NOT NULL, \
     fluid_name TEXT NOT NULL, \
     density REAL NOT NULL, \
     kinematic_viscosity REAL NOT NULL, \
     UNIQUE(username, fluid_name))",
    "CREATE TABLE user_materials (\
     id INTEGER PRIMARY KEY AUTOINCREMENT, \
     username TEXT NOT NULL, \
     material_name TEXT NOT NULL, \
     roughness REAL NOT NULL, \
     UNIQUE(username, material_name))",
];

/// In-process stand-in for the remote SQL gateway.
///
/// Every statement runs against a private in-memory SQLite database, and the
/// result is shaped by the same decoder the HTTP executor uses. Foreign keys
/// stay off, matching the remote engine's default.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use hydraulic_store::domain::SchemaMigrator;
/// use hydraulic_store::test_support::InMemoryGateway;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let gateway = Arc::new(InMemoryGateway::new().unwrap());
/// SchemaMigrator::new(Arc::clone(&gateway)).ensure_schema().await.unwrap();
/// assert!(gateway.has_table("user_materials").unwrap());
/// # });
/// ```
#[derive(Debug)]
pub struct InMemoryGateway {
    connection: Mutex<Connection>,
    log: Mutex<StatementLog>,
}

#[derive(Debug, Default)]
struct StatementLog {
    issued: Vec<String>,
    injected: Vec<(String, StoreError)>,
}

impl InMemoryGateway {
    /// A remote store with no tables.
    pub fn new() -> Result<Self, StoreError> {
        let connection = Connection::open_in_memory().map_err(|error| store_error(&error))?;
        Ok(Self {
            connection: Mutex::new(connection),
            log: Mutex::new(StatementLog::default()),
        })
    }

    /// A remote store whose tables predate every additive column.
    pub fn with_legacy_schema() -> Result<Self, StoreError> {
        let gateway = Self::new()?;
        {
            let connection = gateway.connection();
            for sql in LEGACY_TABLES {
                connection
                    .execute(sql, [])
                    .map_err(|error| store_error(&error))?;
            }
        }
        Ok(gateway)
    }

    /// Fail the next statement whose SQL contains `fragment` with `error`.
    pub fn fail_next(&self, fragment: &str, error: StoreError) {
        self.log().injected.push((fragment.to_owned(), error));
    }

    /// SQL text of every statement received, in order.
    pub fn issued_sql(&self) -> Vec<String> {
        self.log().issued.clone()
    }

    /// Return whether `table` exists.
    pub fn has_table(&self, table: &str) -> Result<bool, StoreError> {
        self.connection()
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![table],
                |row| row.get::<_, i64>(0),
            )
            .map(|count| count > 0)
            .map_err(|error| store_error(&error))
    }

    /// Return whether `table` carries `column`.
    pub fn has_column(&self, table: &str, column: &str) -> Result<bool, StoreError> {
        self.connection()
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info(?1) WHERE name = ?2",
                params![table, column],
                |row| row.get::<_, i64>(0),
            )
            .map(|count| count > 0)
            .map_err(|error| store_error(&error))
    }

    /// Remote row id of a saved scenario.
    pub fn scenario_row_id(&self, key: &ScenarioKey) -> Result<Option<i64>, StoreError> {
        self.scenario_column(key, "id")
    }

    /// Stored modification timestamp of a saved scenario.
    pub fn scenario_last_modified(
        &self,
        key: &ScenarioKey,
    ) -> Result<Option<String>, StoreError> {
        self.scenario_column::<Option<String>>(key, "last_modified")
            .map(Option::flatten)
    }

    /// Insert a fluid row the way it looked before vapour pressure existed.
    pub fn insert_legacy_fluid(
        &self,
        username: &str,
        fluid_name: &str,
        density: f64,
        kinematic_viscosity: f64,
    ) -> Result<(), StoreError> {
        self.connection()
            .execute(
                "INSERT INTO user_fluids (username, fluid_name, density, kinematic_viscosity) \
                 VALUES (?1, ?2, ?3, ?4)",
                params![username, fluid_name, density, kinematic_viscosity],
            )
            .map(drop)
            .map_err(|error| store_error(&error))
    }

    fn scenario_column<T: rusqlite::types::FromSql>(
        &self,
        key: &ScenarioKey,
        column: &str,
    ) -> Result<Option<T>, StoreError> {
        let sql = format!(
            "SELECT {column} FROM scenarios \
             WHERE username = ?1 AND project_name = ?2 AND scenario_name = ?3"
        );
        self.connection()
            .query_row(
                &sql,
                params![key.username, key.project_name, key.scenario_name],
                |row| row.get::<_, T>(0),
            )
            .optional()
            .map_err(|error| store_error(&error))
    }

    fn connection(&self) -> MutexGuard<'_, Connection> {
        self.connection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn log(&self) -> MutexGuard<'_, StatementLog> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl SqlExecutor for InMemoryGateway {
    async fn execute(
        &self,
        statement: &Statement,
        fetch: FetchMode,
    ) -> Result<QueryOutput, StoreError> {
        {
            let mut log = self.log();
            log.issued.push(statement.sql().to_owned());
            if let Some(error) = log.take_injected(statement.sql()) {
                return Err(error);
            }
        }
        let reply = match run(&self.connection(), statement) {
            Ok(rows) => StatementReply::Rows(rows?),
            Err(error) => StatementReply::error(error_code(&error), error.to_string()),
        };
        decode_result(reply, fetch)
    }
}

impl StatementLog {
    fn take_injected(&mut self, sql: &str) -> Option<StoreError> {
        let position = self
            .injected
            .iter()
            .position(|(fragment, _)| sql.contains(fragment.as_str()))?;
        Some(self.injected.remove(position).1)
    }
}

/// Run `statement` to completion, collecting every row it yields.
///
/// The outer error is the engine's; the inner one covers cells the gateway
/// could never have sent.
fn run(
    connection: &Connection,
    statement: &Statement,
) -> Result<Result<RowSet, StoreError>, rusqlite::Error> {
    let mut prepared = connection.prepare(statement.sql())?;
    let columns: Vec<String> = prepared
        .column_names()
        .into_iter()
        .map(str::to_owned)
        .collect();
    let width = columns.len();

    let mut cells = Vec::new();
    let mut rows = prepared.query(params_from_iter(statement.params().iter().map(to_sqlite)))?;
    while let Some(row) = rows.next()? {
        let values = (0..width)
            .map(|index| row.get::<_, Value>(index))
            .collect::<Result<Vec<_>, _>>()?;
        cells.push(values);
    }

    Ok(cells
        .into_iter()
        .map(|values| values.into_iter().map(from_sqlite).collect())
        .collect::<Result<Vec<Vec<SqlValue>>, StoreError>>()
        .map(|rows| RowSet {
            columns: Some(columns),
            rows,
        }))
}

fn to_sqlite(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(number) => Value::Integer(*number),
        SqlValue::Float(number) => Value::Real(*number),
        SqlValue::Text(text) => Value::Text(text.clone()),
    }
}

fn from_sqlite(value: Value) -> Result<SqlValue, StoreError> {
    match value {
        Value::Null => Ok(SqlValue::Null),
        Value::Integer(number) => Ok(SqlValue::Integer(number)),
        Value::Real(number) => Ok(SqlValue::Float(number)),
        Value::Text(text) => Ok(SqlValue::Text(text)),
        Value::Blob(_) => Err(StoreError::protocol_decode("blob cells are not supported")),
    }
}

/// Gateway-style result code for an engine failure.
fn error_code(error: &rusqlite::Error) -> Option<&'static str> {
    let rusqlite::Error::SqliteFailure(failure, _) = error else {
        return None;
    };
    Some(match failure.extended_code {
        ffi::SQLITE_CONSTRAINT_UNIQUE => "SQLITE_CONSTRAINT_UNIQUE",
        ffi::SQLITE_CONSTRAINT_PRIMARYKEY => "SQLITE_CONSTRAINT_PRIMARYKEY",
        ffi::SQLITE_CONSTRAINT_NOTNULL => "SQLITE_CONSTRAINT_NOTNULL",
        _ => "SQLITE_ERROR",
    })
}

fn store_error(error: &rusqlite::Error) -> StoreError {
    let message = error.to_string();
    StoreError::remote_execution(classify_remote_error(error_code(error), &message), message)
}
