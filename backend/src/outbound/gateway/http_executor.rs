//! Reqwest-backed [`SqlExecutor`] speaking one gateway protocol generation.
//!
//! This adapter owns transport details only: authentication, the request
//! timeout, HTTP status mapping, and handing the body to the configured
//! protocol adapter. One statement is sent per request.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;
use url::Url;

use super::config::{GatewayConfig, GatewayConfigError};
use super::protocol::{ProtocolAdapter, adapter_for};
use super::result_decoder::decode_result;
use crate::domain::ports::{SqlExecutor, StoreError};
use crate::domain::{FetchMode, QueryOutput, Statement};

/// Executor posting each statement to the remote SQL gateway.
pub struct GatewayHttpExecutor {
    client: Client,
    endpoint: Url,
    config: GatewayConfig,
    protocol: Box<dyn ProtocolAdapter>,
}

impl GatewayHttpExecutor {
    /// Build an executor for `config`, resolving the protocol endpoint once.
    ///
    /// # Examples
    /// ```rust,ignore
    /// let executor = GatewayHttpExecutor::new(config)?;
    /// let rows = executor.fetch_all(&Statement::new("SELECT 1 AS one")).await?;
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error when the endpoint cannot be derived from the base URL
    /// or the reqwest client cannot be constructed.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayConfigError> {
        let protocol = adapter_for(config.protocol());
        let endpoint = protocol
            .endpoint(config.base_url())
            .map_err(|error| GatewayConfigError::InvalidUrl(error.to_string()))?;
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|error| GatewayConfigError::HttpClient(error.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            config,
            protocol,
        })
    }

    /// Resolved statement endpoint.
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Connection settings in use.
    pub const fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

#[async_trait]
impl SqlExecutor for GatewayHttpExecutor {
    async fn execute(
        &self,
        statement: &Statement,
        fetch: FetchMode,
    ) -> Result<QueryOutput, StoreError> {
        let request = self.protocol.encode_request(statement)?;
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(self.config.auth_token())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        debug!(
            protocol = %self.protocol.version(),
            %fetch,
            params = statement.params().len(),
            status = status.as_u16(),
            bytes = body.len(),
            "gateway statement round trip"
        );
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        let reply = self.protocol.decode_reply(body.as_ref())?;
        decode_result(reply, fetch)
    }
}

fn map_transport_error(error: reqwest::Error) -> StoreError {
    if error.is_timeout() {
        StoreError::transport(format!("request timed out: {error}"))
    } else {
        StoreError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> StoreError {
    StoreError::gateway_http(status.as_u16(), body_preview(body))
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
