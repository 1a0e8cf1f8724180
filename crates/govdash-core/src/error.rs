use thiserror::Error;

/// Shown when no more specific failure message is available.
pub const GENERIC_FETCH_ERROR: &str = "Failed to fetch proposals";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("proxy returned {status}: {}", .message.as_deref().unwrap_or(GENERIC_FETCH_ERROR))]
    Status {
        status: u16,
        message: Option<String>,
    },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed payload: {0}")]
    Malformed(String),
    #[error("{message}")]
    Exhausted { attempts: u32, message: String },
    #[error("invalid proxy url: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Error message reported by the proxy body, when there was one.
    pub fn upstream_message(&self) -> Option<&str> {
        match self {
            FetchError::Status {
                message: Some(message),
                ..
            } => Some(message.as_str()),
            FetchError::Exhausted { message, .. } => Some(message.as_str()),
            _ => None,
        }
    }
}
