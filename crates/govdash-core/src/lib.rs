pub mod clock;
pub mod controller;
pub mod error;
pub mod observability;
pub mod retry;
pub mod source;

#[cfg(test)]
pub(crate) mod testing;

pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{ListState, LoadState, PollerConfig, PollingController};
pub use error::FetchError;
pub use retry::{fetch_with_retry, RetryPolicy, Sleeper, TokioSleeper};
pub use source::{HttpProposalSource, ProposalSource};

use govdash_models::RuntimeMode;
use govdash_upstream::GovernanceClient;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub upstream: GovernanceClient,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub mode: RuntimeMode,
    /// Limit forwarded upstream when the caller does not supply one.
    pub default_limit: String,
    /// Browser origins allowed by CORS. Empty means same-origin only.
    pub allowed_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mode: RuntimeMode::default(),
            default_limit: govdash_upstream::DEFAULT_LIMIT.to_string(),
            allowed_origins: Vec::new(),
        }
    }
}
