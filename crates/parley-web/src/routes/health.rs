//! Health, readiness and session status endpoints

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::services::AppState;

pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/readiness_check", get(readiness_check))
        .route("/session", get(session_status))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "parley-web"
    }))
}

/// Ready iff the credential variable is set and non-empty; the provider is
/// not contacted and session state does not matter
async fn readiness_check(State(state): State<AppState>) -> (StatusCode, &'static str) {
    if state.provider.api_key().is_some() {
        (StatusCode::OK, "OK")
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, "API key not set")
    }
}

async fn session_status(State(state): State<AppState>) -> Json<Value> {
    let body = match state.sessions.current().await {
        Some(session) => json!({
            "active": true,
            "assistant_id": session.assistant_id,
            "thread_id": session.thread_id,
            "assistant_name": session.assistant_name,
            "personality": session.personality,
            "model": session.model,
            "created_at": session.created_at.to_rfc3339(),
        }),
        None => json!({
            "active": false,
            "assistant_name": state.sessions.display_name().await,
        }),
    };

    Json(body)
}
