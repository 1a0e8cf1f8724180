use crate::transport;
use crate::UpstreamError;
use govdash_models::RuntimeMode;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use url::Url;

pub const DEFAULT_PROPOSALS_URL: &str =
    "https://api.glam.systems/v0/governance/proposals/jupiter";
pub const DEFAULT_LIMIT: &str = "10";

#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub proposals_url: String,
    pub user_agent: String,
    /// `None` leaves the request without a client-side timeout.
    pub timeout: Option<Duration>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            proposals_url: DEFAULT_PROPOSALS_URL.to_string(),
            user_agent: concat!("govdash-proxy/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: None,
        }
    }
}

/// HTTP client for the external governance API.
#[derive(Debug, Clone)]
pub struct GovernanceClient {
    http: Client,
    proposals_url: Url,
    mode: RuntimeMode,
}

impl GovernanceClient {
    pub fn new(config: &UpstreamConfig, mode: RuntimeMode) -> Result<Self, UpstreamError> {
        let proposals_url = Url::parse(&config.proposals_url)
            .map_err(|e| UpstreamError::InvalidUrl(format!("{}: {e}", config.proposals_url)))?;

        let mut builder = Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(transport::fixed_headers());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        // Local trust stores are often incomplete; never relaxed outside development.
        if mode.is_development() {
            tracing::warn!("TLS certificate verification disabled for upstream requests (development mode)");
            builder = builder.danger_accept_invalid_certs(true);
        }
        let http = builder
            .build()
            .map_err(|e| UpstreamError::Client(e.to_string()))?;

        Ok(Self {
            http,
            proposals_url,
            mode,
        })
    }

    pub fn verifies_tls(&self) -> bool {
        !self.mode.is_development()
    }

    pub fn mode(&self) -> RuntimeMode {
        self.mode
    }

    pub fn proposals_url(&self) -> &Url {
        &self.proposals_url
    }

    /// Fetch the raw proposals payload. The body shape is not inspected.
    pub async fn fetch_proposals(&self, limit: &str) -> Result<Value, UpstreamError> {
        let url = transport::proposals_url(&self.proposals_url, limit);
        tracing::debug!("Fetching proposals from {}", url);

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;
        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        if !status.is_success() {
            let data = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes)
                    .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
            };
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                data,
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| UpstreamError::InvalidBody(e.to_string()))
    }
}
