use crate::error::{FetchError, GENERIC_FETCH_ERROR};
use crate::source::ProposalSource;
use govdash_models::{sort_newest_first, Proposal};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Waits between retry attempts.
pub trait Sleeper: Send + Sync + 'static {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

impl<T: Sleeper> Sleeper for std::sync::Arc<T> {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        (**self).sleep(duration)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Delay after the 0-based `attempt` failed: `base_delay * 2^attempt`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

/// Fetch proposals with sequential retries and exponential backoff.
///
/// No delay follows the final attempt. On exhaustion the error carries the
/// proxy's message from the last failure, or a generic one.
pub async fn fetch_with_retry<S, Z>(
    source: &S,
    sleeper: &Z,
    policy: &RetryPolicy,
    limit: u32,
) -> Result<Vec<Proposal>, FetchError>
where
    S: ProposalSource,
    Z: Sleeper,
{
    let attempts = policy.max_attempts.max(1);
    let mut last_err: Option<FetchError> = None;

    for attempt in 0..attempts {
        match source.fetch(limit).await.and_then(parse_proposals) {
            Ok(proposals) => {
                tracing::debug!(
                    attempt = attempt + 1,
                    count = proposals.len(),
                    "Fetched proposals"
                );
                return Ok(proposals);
            }
            Err(e) => {
                tracing::warn!(
                    attempt = attempt + 1,
                    max_attempts = attempts,
                    error = %e,
                    "Proposal fetch attempt failed"
                );
                last_err = Some(e);
            }
        }
        if attempt + 1 < attempts {
            sleeper.sleep(policy.delay_after(attempt)).await;
        }
    }

    let message = last_err
        .as_ref()
        .and_then(FetchError::upstream_message)
        .unwrap_or(GENERIC_FETCH_ERROR)
        .to_string();
    Err(FetchError::Exhausted { attempts, message })
}

/// Accept a payload only if it is an array of proposals, newest first.
/// Items that do not decode as a proposal, or whose votes do not line up with
/// their options, are dropped.
pub fn parse_proposals(body: Value) -> Result<Vec<Proposal>, FetchError> {
    let items = match body {
        Value::Array(items) => items,
        other => {
            return Err(FetchError::Malformed(format!(
                "expected an array of proposals, got {}",
                json_kind(&other)
            )))
        }
    };

    let mut proposals: Vec<Proposal> = items
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| match serde_json::from_value::<Proposal>(item) {
            Ok(p) => Some(p),
            Err(e) => {
                tracing::warn!(index = i, error = %e, "Dropping undecodable proposal");
                None
            }
        })
        .filter(|p| match p.option_tally() {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("Dropping proposal: {}", e);
                false
            }
        })
        .collect();
    sort_newest_first(&mut proposals);
    Ok(proposals)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
