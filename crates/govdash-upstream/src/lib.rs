pub mod client;
pub mod transport;

pub use client::{GovernanceClient, UpstreamConfig, DEFAULT_LIMIT, DEFAULT_PROPOSALS_URL};

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("invalid upstream url: {0}")]
    InvalidUrl(String),
    #[error("http client error: {0}")]
    Client(String),
    #[error("Request failed with status code {status}")]
    Status { status: u16, data: Value },
    #[error("{0}")]
    Transport(String),
    #[error("upstream returned invalid JSON: {0}")]
    InvalidBody(String),
}

impl UpstreamError {
    /// HTTP status reported by the upstream, if it answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            UpstreamError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn data(&self) -> Option<&Value> {
        match self {
            UpstreamError::Status { data, .. } => Some(data),
            _ => None,
        }
    }

    /// Failures of the request itself, as opposed to local processing errors.
    pub fn is_upstream_failure(&self) -> bool {
        matches!(
            self,
            UpstreamError::Status { .. } | UpstreamError::Transport(_)
        )
    }
}
