//! Gateway connection settings loaded via OrthoConfig.
//!
//! Values come from `HYDRAULIC_GATEWAY_*` environment variables, matching
//! command-line flags, or a configuration file. They are validated once into
//! an immutable [`GatewayConfig`].

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::outbound::gateway::{GatewayConfig, GatewayConfigError, ProtocolVersion};

/// Raw gateway settings before validation.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "HYDRAULIC_GATEWAY")]
pub struct GatewaySettings {
    /// Gateway base URL.
    pub url: Option<String>,
    /// Bearer token presented on every request.
    pub auth_token: Option<String>,
    /// Protocol generation name (`query-params`, `stmt-params`, `pipeline`).
    pub protocol: Option<String>,
    /// Whole-request timeout in seconds; zero is raised to one.
    #[ortho_config(default = 30)]
    pub timeout_seconds: u64,
}

impl GatewaySettings {
    /// Validate the settings into a [`GatewayConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`GatewayConfigError`] when the URL or token is missing or
    /// invalid, or the protocol name is unknown.
    pub fn into_config(self) -> Result<GatewayConfig, GatewayConfigError> {
        let url = self.url.ok_or(GatewayConfigError::Missing("url"))?;
        let token = self
            .auth_token
            .ok_or(GatewayConfigError::Missing("auth_token"))?;
        let mut config = GatewayConfig::new(&url, &token)?;
        if let Some(protocol) = self.protocol.as_deref() {
            config = config.with_protocol(protocol.parse::<ProtocolVersion>()?);
        }
        Ok(config.with_timeout(Duration::from_secs(self.timeout_seconds.max(1))))
    }
}

impl std::fmt::Debug for GatewaySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewaySettings")
            .field("url", &self.url)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .field("protocol", &self.protocol)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}
