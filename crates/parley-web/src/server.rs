use crate::assets::asset_routes;
use crate::routes::{assistant_routes, conversation_routes, health_routes};
use crate::services::AppState;
use crate::{Result, WebError};
use axum::extract::DefaultBodyLimit;
use axum::Router;
use parley_config::ParleyConfig;
use parley_provider::AssistantsApi;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Assemble every route around an existing state
pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .merge(conversation_routes())
        .merge(assistant_routes())
        .merge(health_routes())
        .with_state(state)
        .merge(asset_routes())
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
}

pub async fn start_server(config: &ParleyConfig, api: Arc<dyn AssistantsApi>) -> Result<()> {
    let state = AppState::new(api, config);
    let app = build_router(state, config.server.max_body_bytes());

    let addr: SocketAddr = config
        .server
        .bind_address()
        .parse()
        .map_err(|e| WebError::Config(format!("Invalid address: {e}")))?;

    tracing::info!("Starting web server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(WebError::Io)?;

    axum::serve(listener, app).await.map_err(WebError::Io)?;

    Ok(())
}
