//! Immutable connection configuration for the remote SQL gateway.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use url::Url;
use zeroize::Zeroizing;

/// Request timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Gateway request/response schema generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProtocolVersion {
    /// `{"statements":[{"q", "params"}]}` posted to the gateway root.
    QueryParams,
    /// `{"statements":[{"stmt", "params"}]}` posted to `/v1/execute`.
    StmtParams,
    /// Typed-argument pipeline posted to `/v2/pipeline`.
    #[default]
    Pipeline,
}

impl ProtocolVersion {
    /// Stable configuration name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::QueryParams => "query-params",
            Self::StmtParams => "stmt-params",
            Self::Pipeline => "pipeline",
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProtocolVersion {
    type Err = GatewayConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "query-params" | "v1" => Ok(Self::QueryParams),
            "stmt-params" | "v2" => Ok(Self::StmtParams),
            "pipeline" | "v3" => Ok(Self::Pipeline),
            _ => Err(GatewayConfigError::UnknownProtocol(raw.to_owned())),
        }
    }
}

/// Reasons a gateway configuration is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayConfigError {
    /// Base URL did not parse.
    #[error("invalid gateway URL: {0}")]
    InvalidUrl(String),
    /// Base URL used a scheme other than http or https.
    #[error("gateway URL must use http or https, found `{0}`")]
    UnsupportedScheme(String),
    /// Auth token was empty or blank.
    #[error("gateway auth token must not be empty")]
    EmptyToken,
    /// Protocol name was not recognised.
    #[error("unknown gateway protocol `{0}`")]
    UnknownProtocol(String),
    /// A required setting was not provided.
    #[error("missing gateway setting `{0}`")]
    Missing(&'static str),
    /// The HTTP client could not be constructed.
    #[error("failed to build gateway HTTP client: {0}")]
    HttpClient(String),
}

/// Connection settings fixed for the lifetime of an executor.
///
/// ## Invariants
/// - `base_url` uses http or https.
/// - `auth_token` is non-blank; it is redacted from `Debug` output.
///
/// # Examples
/// ```
/// use hydraulic_store::outbound::gateway::{GatewayConfig, ProtocolVersion};
///
/// let config = GatewayConfig::new("https://db.example.test", "secret-token")
///     .unwrap()
///     .with_protocol(ProtocolVersion::StmtParams);
/// assert_eq!(config.protocol(), ProtocolVersion::StmtParams);
/// assert!(!format!("{config:?}").contains("secret-token"));
/// ```
#[derive(Clone)]
pub struct GatewayConfig {
    base_url: Url,
    auth_token: Zeroizing<String>,
    protocol: ProtocolVersion,
    timeout: Duration,
}

impl GatewayConfig {
    /// Validate a base URL and token, using the default protocol and timeout.
    pub fn new(base_url: &str, auth_token: &str) -> Result<Self, GatewayConfigError> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|error| GatewayConfigError::InvalidUrl(error.to_string()))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(GatewayConfigError::UnsupportedScheme(
                base_url.scheme().to_owned(),
            ));
        }
        if auth_token.trim().is_empty() {
            return Err(GatewayConfigError::EmptyToken);
        }
        Ok(Self {
            base_url,
            auth_token: Zeroizing::new(auth_token.to_owned()),
            protocol: ProtocolVersion::default(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Select the protocol generation spoken by the gateway.
    #[must_use]
    pub const fn with_protocol(mut self, protocol: ProtocolVersion) -> Self {
        self.protocol = protocol;
        self
    }

    /// Override the whole-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Gateway base URL.
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Bearer token sent with every request.
    pub fn auth_token(&self) -> &str {
        self.auth_token.as_str()
    }

    /// Active protocol generation.
    pub const fn protocol(&self) -> ProtocolVersion {
        self.protocol
    }

    /// Whole-request timeout.
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("base_url", &self.base_url.as_str())
            .field("auth_token", &"<redacted>")
            .field("protocol", &self.protocol)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::not_a_url("not a url", "token")]
    #[case::ftp("ftp://db.example.test", "token")]
    #[case::blank_token("https://db.example.test", "   ")]
    fn rejects_invalid_configuration(#[case] url: &str, #[case] token: &str) {
        assert!(GatewayConfig::new(url, token).is_err());
    }

    #[test]
    fn unsupported_scheme_is_named() {
        let error = GatewayConfig::new("ftp://db.example.test", "token").expect_err("ftp");
        assert_eq!(error, GatewayConfigError::UnsupportedScheme("ftp".to_owned()));
    }

    #[rstest]
    #[case("pipeline", ProtocolVersion::Pipeline)]
    #[case("V3", ProtocolVersion::Pipeline)]
    #[case(" stmt-params ", ProtocolVersion::StmtParams)]
    #[case("v2", ProtocolVersion::StmtParams)]
    #[case("query-params", ProtocolVersion::QueryParams)]
    #[case("v1", ProtocolVersion::QueryParams)]
    fn parses_protocol_names(#[case] raw: &str, #[case] expected: ProtocolVersion) {
        assert_eq!(raw.parse::<ProtocolVersion>(), Ok(expected));
    }

    #[test]
    fn rejects_unknown_protocol_names() {
        assert_eq!(
            "hrana-9".parse::<ProtocolVersion>(),
            Err(GatewayConfigError::UnknownProtocol("hrana-9".to_owned()))
        );
    }

    #[test]
    fn defaults_to_pipeline_with_thirty_second_timeout() {
        let config = GatewayConfig::new("http://127.0.0.1:8080", "token").expect("valid");
        assert_eq!(config.protocol(), ProtocolVersion::Pipeline);
        assert_eq!(config.timeout(), DEFAULT_TIMEOUT);
    }
}
