//! Idempotent remote schema setup.
//!
//! The migrator assumes nothing about the remote schema's prior state. It
//! first attempts each additive column (best effort), then issues one
//! `CREATE TABLE IF NOT EXISTS` per entity with its natural-key uniqueness
//! constraint. Referenced tables are created before referencing tables.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::Statement;
use super::ports::{SqlExecutor, SqlExecutorExt, StoreError};

/// A column added to a table that may predate it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct AdditiveColumn {
    pub(crate) table: &'static str,
    pub(crate) column: &'static str,
    pub(crate) sql: &'static str,
}

/// A table created if absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TableDefinition {
    pub(crate) name: &'static str,
    pub(crate) sql: &'static str,
}

pub(crate) const ADDITIVE_COLUMNS: [AdditiveColumn; 3] = [
    AdditiveColumn {
        table: "users",
        column: "email",
        sql: "ALTER TABLE users ADD COLUMN email TEXT",
    },
    AdditiveColumn {
        table: "user_fluids",
        column: "vapor_pressure_kpa",
        sql: "ALTER TABLE user_fluids ADD COLUMN vapor_pressure_kpa REAL",
    },
    AdditiveColumn {
        table: "scenarios",
        column: "last_modified",
        sql: "ALTER TABLE scenarios ADD COLUMN last_modified TEXT",
    },
];

pub(crate) const TABLES: [TableDefinition; 5] = [
    TableDefinition {
        name: "users",
        sql: "CREATE TABLE IF NOT EXISTS users (\
              id INTEGER PRIMARY KEY AUTOINCREMENT, \
              username TEXT NOT NULL UNIQUE, \
              password TEXT NOT NULL, \
              name TEXT NOT NULL, \
              email TEXT)",
    },
    TableDefinition {
        name: "projects",
        sql: "CREATE TABLE IF NOT EXISTS projects (\
              id INTEGER PRIMARY KEY AUTOINCREMENT, \
              username TEXT NOT NULL, \
              project_name TEXT NOT NULL, \
              UNIQUE(username, project_name), \
              FOREIGN KEY (username) REFERENCES users(username))",
    },
    TableDefinition {
        name: "scenarios",
        sql: "CREATE TABLE IF NOT EXISTS scenarios (\
              id INTEGER PRIMARY KEY AUTOINCREMENT, \
              username TEXT NOT NULL, \
              project_name TEXT NOT NULL, \
              scenario_name TEXT NOT NULL, \
              scenario_data TEXT NOT NULL, \
              last_modified TEXT, \
              UNIQUE(username, project_name, scenario_name), \
              FOREIGN KEY (username, project_name) \
              REFERENCES projects(username, project_name))",
    },
    TableDefinition {
        name: "user_fluids",
        sql: "CREATE TABLE IF NOT EXISTS user_fluids (\
              id INTEGER PRIMARY KEY AUTOINCREMENT, \
              username TEXT NOT NULL, \
              fluid_name TEXT NOT NULL, \
              density REAL NOT NULL, \
              kinematic_viscosity REAL NOT NULL, \
              vapor_pressure_kpa REAL, \
              UNIQUE(username, fluid_name), \
              FOREIGN KEY (username) REFERENCES users(username))",
    },
    TableDefinition {
        name: "user_materials",
        sql: "CREATE TABLE IF NOT EXISTS user_materials (\
              id INTEGER PRIMARY KEY AUTOINCREMENT, \
              username TEXT NOT NULL, \
              material_name TEXT NOT NULL, \
              roughness REAL NOT NULL, \
              UNIQUE(username, material_name), \
              FOREIGN KEY (username) REFERENCES users(username))",
    },
];

/// Outcome of one [`SchemaMigrator::ensure_schema`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaReport {
    /// Additive columns added by this run, as `table.column`.
    pub added_columns: Vec<String>,
    /// Number of `CREATE TABLE IF NOT EXISTS` statements that succeeded.
    pub tables_ensured: usize,
}

/// Applies the remote schema through a [`SqlExecutor`].
pub struct SchemaMigrator<E: ?Sized> {
    executor: Arc<E>,
}

impl<E: ?Sized> Clone for SchemaMigrator<E> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
        }
    }
}

impl<E> SchemaMigrator<E>
where
    E: SqlExecutor + ?Sized,
{
    /// Create a migrator issuing statements through `executor`.
    pub const fn new(executor: Arc<E>) -> Self {
        Self { executor }
    }

    /// Bring the remote schema up to date. Safe to call on every start.
    ///
    /// Additive-column failures never abort the run. A failing
    /// create-table statement aborts immediately with
    /// [`StoreError::SchemaSetup`]; later tables are not attempted.
    pub async fn ensure_schema(&self) -> Result<SchemaReport, StoreError> {
        let mut report = SchemaReport::default();

        for column in ADDITIVE_COLUMNS {
            if self.add_column(column).await {
                report
                    .added_columns
                    .push(format!("{}.{}", column.table, column.column));
            }
        }

        for table in TABLES {
            self.executor
                .run(&Statement::new(table.sql))
                .await
                .map_err(|error| StoreError::schema_setup(table.name, error.to_string()))?;
            report.tables_ensured += 1;
        }

        info!(
            added_columns = report.added_columns.len(),
            tables = report.tables_ensured,
            "remote schema ensured"
        );
        Ok(report)
    }

    async fn add_column(&self, column: AdditiveColumn) -> bool {
        match self.executor.run(&Statement::new(column.sql)).await {
            Ok(()) => true,
            Err(error) if error.is_duplicate_column() => {
                debug!(
                    table = column.table,
                    column = column.column,
                    "additive column already present"
                );
                false
            }
            Err(error) => {
                warn!(
                    table = column.table,
                    column = column.column,
                    error = %error,
                    "additive column statement failed; continuing"
                );
                false
            }
        }
    }
}
