use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use govdash_upstream::UpstreamError;
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The upstream answered with an error status, or never answered.
    #[error("External API error")]
    Upstream {
        status: Option<u16>,
        details: String,
        data: Value,
    },
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Upstream {
                status: Some(status),
                ..
            } => StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            ApiError::Upstream { status: None, .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        let body = match self {
            ApiError::Upstream {
                status: upstream_status,
                details,
                data,
            } => json!({
                "message": message,
                "details": details,
                "status": upstream_status,
                "data": data,
            }),
            ApiError::Internal(err) => {
                tracing::error!("API internal error: {err:#}");
                json!({
                    "message": message,
                    "details": err.to_string(),
                })
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<UpstreamError> for ApiError {
    fn from(e: UpstreamError) -> Self {
        if e.is_upstream_failure() {
            ApiError::Upstream {
                status: e.status(),
                details: e.to_string(),
                data: e.data().cloned().unwrap_or(Value::Null),
            }
        } else {
            ApiError::Internal(e.into())
        }
    }
}
