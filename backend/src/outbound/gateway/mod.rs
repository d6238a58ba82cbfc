//! Remote SQL gateway adapter.
//!
//! [`GatewayHttpExecutor`] implements the domain `SqlExecutor` port over
//! HTTP. The wire format is chosen once from [`GatewayConfig::protocol`]; all
//! three generations decode into the same protocol-independent reply before
//! result shaping and error classification.

mod config;
mod http_executor;
pub mod protocol;
pub(crate) mod result_decoder;

pub use config::{DEFAULT_TIMEOUT, GatewayConfig, GatewayConfigError, ProtocolVersion};
pub use http_executor::GatewayHttpExecutor;
