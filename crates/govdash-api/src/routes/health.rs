use axum::{extract::State, Json};
use govdash_core::observability::proxy_metrics_snapshot;
use govdash_core::AppState;
use serde_json::{json, Value};

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "mode": state.config.mode.as_str(),
        "upstream": state.upstream.proposals_url().as_str(),
        "proxy": proxy_metrics_snapshot(),
    }))
}
