//! Client-side data access for hydraulic users, projects, scenarios and
//! per-user catalogs, stored behind a remote SQL gateway.
//!
//! - `domain` holds the SQL vocabulary, the `SqlExecutor` port, the schema
//!   migrator and Repository Operations.
//! - `outbound::gateway` implements the port over HTTP for each gateway
//!   protocol generation.
//! - `settings` loads gateway configuration for the binary.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

pub mod domain;
pub mod outbound;
pub mod settings;

#[cfg(feature = "test-support")]
pub mod test_support;
