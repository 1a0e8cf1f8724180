use std::sync::atomic::{AtomicU64, Ordering};

static PROXY_REQUESTS_TOTAL: AtomicU64 = AtomicU64::new(0);
static PROXY_UPSTREAM_ERRORS: AtomicU64 = AtomicU64::new(0);
static PROXY_INTERNAL_ERRORS: AtomicU64 = AtomicU64::new(0);
static PROXY_LAST_LATENCY_MS: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyOutcome {
    Success,
    UpstreamError,
    InternalError,
}

pub fn proxy_request_finished(outcome: ProxyOutcome, latency_ms: u64) {
    PROXY_REQUESTS_TOTAL.fetch_add(1, Ordering::Relaxed);
    PROXY_LAST_LATENCY_MS.store(latency_ms, Ordering::Relaxed);
    match outcome {
        ProxyOutcome::Success => {}
        ProxyOutcome::UpstreamError => {
            PROXY_UPSTREAM_ERRORS.fetch_add(1, Ordering::Relaxed);
        }
        ProxyOutcome::InternalError => {
            PROXY_INTERNAL_ERRORS.fetch_add(1, Ordering::Relaxed);
        }
    }
}

#[derive(Clone, Debug, Default, serde::Serialize)]
pub struct ProxyMetricsSnapshot {
    pub requests_total: u64,
    pub upstream_errors: u64,
    pub internal_errors: u64,
    pub last_latency_ms: u64,
}

pub fn proxy_metrics_snapshot() -> ProxyMetricsSnapshot {
    ProxyMetricsSnapshot {
        requests_total: PROXY_REQUESTS_TOTAL.load(Ordering::Relaxed),
        upstream_errors: PROXY_UPSTREAM_ERRORS.load(Ordering::Relaxed),
        internal_errors: PROXY_INTERNAL_ERRORS.load(Ordering::Relaxed),
        last_latency_ms: PROXY_LAST_LATENCY_MS.load(Ordering::Relaxed),
    }
}
