use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use parley_provider::{ProviderError, RunStatus};
use serde_json::json;

pub type Result<T> = std::result::Result<T, WebError>;

/// Errors surfaced to the browser as `{"error": "..."}`
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error("No current thread found. Please create an assistant first.")]
    NoSession,

    #[error("No assistant to delete. Please create an assistant first.")]
    NoAssistant,

    #[error("{0}")]
    InvalidInput(String),

    #[error("A run is still active, cannot add new message.")]
    RunActive { run_id: String, status: RunStatus },

    #[error("{0}")]
    Provider(#[from] ProviderError),

    #[error("Run {run_id} ended with status {status}: {detail}")]
    RunFailed {
        run_id: String,
        status: RunStatus,
        detail: String,
    },

    #[error("Run {run_id} is still {status} after {waited_secs}s; giving up")]
    PollTimeout {
        run_id: String,
        status: RunStatus,
        waited_secs: u64,
    },

    #[error("Asset error: {0}")]
    Asset(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WebError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebError::NoSession | WebError::NoAssistant | WebError::InvalidInput(_) => {
                StatusCode::BAD_REQUEST
            }
            WebError::RunActive { .. } => StatusCode::CONFLICT,
            WebError::Provider(ProviderError::MissingApiKey(_)) => StatusCode::SERVICE_UNAVAILABLE,
            WebError::Provider(_) | WebError::RunFailed { .. } => StatusCode::BAD_GATEWAY,
            WebError::PollTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            WebError::Asset(_) | WebError::Config(_) | WebError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "{}", self);
        } else {
            tracing::warn!(status = status.as_u16(), "{}", self);
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
