//! Proxy for the external governance API's proposal listing.
//!
//! The upstream body is relayed unchanged; failures are reshaped into the
//! dashboard's error body by [`ApiError`].

use axum::{
    extract::{Query, State},
    Json,
};
use govdash_core::observability::{proxy_request_finished, ProxyOutcome};
use govdash_core::AppState;
use govdash_upstream::transport::payload_len_for_log;
use serde_json::Value;
use std::time::Instant;

use crate::error::ApiError;

/// First `limit` in the query string. Repeated keys are not an error.
pub fn first_limit(params: &[(String, String)]) -> Option<&str> {
    params
        .iter()
        .find(|(key, _)| key == "limit")
        .map(|(_, value)| value.as_str())
}

pub async fn proxy_proposals(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Value>, ApiError> {
    let started = Instant::now();
    let limit = first_limit(&params)
        .map(str::to_string)
        .unwrap_or_else(|| state.config.default_limit.clone());

    tracing::info!(
        environment = state.config.mode.as_str(),
        ssl_verification = state.upstream.verifies_tls(),
        limit = %limit,
        "Starting proposals request"
    );

    let result = state.upstream.fetch_proposals(&limit).await;
    let duration_ms = started.elapsed().as_millis() as u64;

    match result {
        Ok(body) => {
            tracing::info!(
                duration_ms,
                data_length = %payload_len_for_log(&body),
                "Proposals request completed"
            );
            proxy_request_finished(ProxyOutcome::Success, duration_ms);
            Ok(Json(body))
        }
        Err(e) if e.is_upstream_failure() => {
            tracing::error!(
                status = ?e.status(),
                duration_ms,
                error = %e,
                environment = state.config.mode.as_str(),
                "Upstream proposals request failed"
            );
            proxy_request_finished(ProxyOutcome::UpstreamError, duration_ms);
            Err(e.into())
        }
        Err(e) => {
            tracing::error!(
                duration_ms,
                error = %e,
                environment = state.config.mode.as_str(),
                "Unexpected error while proxying proposals"
            );
            proxy_request_finished(ProxyOutcome::InternalError, duration_ms);
            Err(e.into())
        }
    }
}
