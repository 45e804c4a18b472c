//! The page and the chat endpoint, both on `/`

use axum::{
    extract::{rejection::FormRejection, State},
    response::Html,
    routing::get,
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::assets::page_template;
use crate::render::render_page;
use crate::services::AppState;
use crate::WebError;

pub fn conversation_routes() -> Router<AppState> {
    Router::new().route("/", get(home).post(chat))
}

#[derive(Debug, Deserialize)]
pub struct ChatForm {
    #[serde(default)]
    pub user_input: String,
    pub thread_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    response: String,
    thread_id: String,
}

async fn home(State(state): State<AppState>) -> Result<Html<String>, WebError> {
    let template = page_template()?;
    let name = state.sessions.display_name().await;
    let active = state.sessions.is_active().await;

    Ok(Html(render_page(&template, &name, active)))
}

async fn chat(
    State(state): State<AppState>,
    form: Result<Form<ChatForm>, FormRejection>,
) -> Result<Json<ChatResponse>, WebError> {
    let Form(form) = form.map_err(|e| WebError::InvalidInput(e.body_text()))?;

    let reply = state
        .conversation
        .chat(&form.user_input, form.thread_id.as_deref())
        .await?;

    Ok(Json(ChatResponse {
        response: reply.html,
        thread_id: reply.thread_id,
    }))
}
