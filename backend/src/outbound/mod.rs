//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **gateway**: reqwest-backed `SqlExecutor` speaking one of the remote
//!   SQL gateway's protocol generations.
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod gateway;
