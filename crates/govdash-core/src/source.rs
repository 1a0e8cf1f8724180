use crate::error::FetchError;
use chrono::Utc;
use reqwest::Client;
use serde_json::Value;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use url::Url;

pub const PROPOSALS_PATH: &str = "/api/proposals";

/// Where the controller gets its raw proposal payloads from.
pub trait ProposalSource: Send + Sync + 'static {
    fn fetch(&self, limit: u32) -> impl Future<Output = Result<Value, FetchError>> + Send;
}

impl<T: ProposalSource> ProposalSource for std::sync::Arc<T> {
    fn fetch(&self, limit: u32) -> impl Future<Output = Result<Value, FetchError>> + Send {
        (**self).fetch(limit)
    }
}

/// Fetches proposals through the dashboard's own proxy endpoint.
#[derive(Debug)]
pub struct HttpProposalSource {
    http: Client,
    endpoint: Url,
    seq: AtomicU64,
}

impl HttpProposalSource {
    pub fn new(proxy_base_url: &str) -> Result<Self, FetchError> {
        let base = Url::parse(proxy_base_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{proxy_base_url}: {e}")))?;
        let endpoint = base
            .join(PROPOSALS_PATH)
            .map_err(|e| FetchError::InvalidUrl(format!("{proxy_base_url}: {e}")))?;
        let http = Client::builder()
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            endpoint,
            seq: AtomicU64::new(0),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn cache_buster(&self) -> String {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", Utc::now().timestamp_millis(), seq)
    }
}

impl ProposalSource for HttpProposalSource {
    fn fetch(&self, limit: u32) -> impl Future<Output = Result<Value, FetchError>> + Send {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("_", &self.cache_buster());

        async move {
            let resp = self
                .http
                .get(url)
                .send()
                .await
                .map_err(|e| FetchError::Transport(e.to_string()))?;
            let status = resp.status();
            let bytes = resp
                .bytes()
                .await
                .map_err(|e| FetchError::Transport(e.to_string()))?;

            if !status.is_success() {
                let message = serde_json::from_slice::<Value>(&bytes)
                    .ok()
                    .and_then(|body| body.get("message").and_then(Value::as_str).map(str::to_string));
                return Err(FetchError::Status {
                    status: status.as_u16(),
                    message,
                });
            }

            serde_json::from_slice(&bytes).map_err(|e| FetchError::Malformed(e.to_string()))
        }
    }
}
