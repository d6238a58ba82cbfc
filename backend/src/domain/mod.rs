//! Domain types, ports and services for the remote hydraulic store.
//!
//! Purpose: describe users, projects, scenarios and per-user catalogs, and
//! implement Repository Operations and schema setup purely in terms of the
//! [`ports::SqlExecutor`] port. Nothing in this module knows about HTTP or a
//! particular gateway protocol generation.
//!
//! Public surface:
//! - `HydraulicRepository` — typed CRUD operations.
//! - `SchemaMigrator` — idempotent remote schema setup.
//! - `Statement`, `SqlValue`, `Row`, `FetchMode`, `QueryOutput` — SQL
//!   vocabulary shared with executor adapters.

pub mod catalog;
pub mod ports;
pub mod repository;
pub mod scenario;
pub mod schema;
pub mod sql;
pub mod user;

pub use self::catalog::{FluidCatalog, FluidProperties, MaterialCatalog, NewFluid};
pub use self::repository::HydraulicRepository;
pub use self::scenario::ScenarioKey;
pub use self::schema::{SchemaMigrator, SchemaReport};
pub use self::sql::{FetchMode, QueryOutput, Row, SqlValue, Statement};
pub use self::user::{NewUser, UserRecord, UserValidationError};
