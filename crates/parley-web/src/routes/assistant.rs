//! Assistant lifecycle endpoints

use axum::{
    extract::{rejection::FormRejection, State},
    routing::post,
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::services::{AppState, AssistantSpec};
use crate::WebError;

pub fn assistant_routes() -> Router<AppState> {
    Router::new()
        .route("/create_assistant", post(create_assistant))
        .route("/delete_assistant", post(delete_assistant))
}

/// Form posted by the create-assistant panel
#[derive(Debug, Deserialize)]
pub struct CreateAssistantForm {
    pub assistant_name: Option<String>,
    pub instructions: Option<String>,
    pub personality: Option<String>,
    pub model_type: Option<String>,
}

impl CreateAssistantForm {
    fn into_spec(self) -> Result<AssistantSpec, WebError> {
        let name = required("assistant_name", self.assistant_name)?;
        let model = required("model_type", self.model_type)?;
        if name.trim().is_empty() {
            return Err(WebError::InvalidInput("Assistant name cannot be empty".to_string()));
        }
        if model.trim().is_empty() {
            return Err(WebError::InvalidInput("Model type cannot be empty".to_string()));
        }

        Ok(AssistantSpec {
            name,
            instructions: required("instructions", self.instructions)?,
            personality: required("personality", self.personality)?,
            model,
        })
    }
}

fn required(field: &str, value: Option<String>) -> Result<String, WebError> {
    value.ok_or_else(|| WebError::InvalidInput(format!("Missing form field: {field}")))
}

#[derive(Debug, Serialize)]
struct CreatedResponse {
    message: &'static str,
    assistant_id: String,
    thread_id: String,
}

#[derive(Debug, Serialize)]
struct DeletedResponse {
    message: &'static str,
}

async fn create_assistant(
    State(state): State<AppState>,
    form: Result<Form<CreateAssistantForm>, FormRejection>,
) -> Result<Json<CreatedResponse>, WebError> {
    let Form(form) = form.map_err(|e| WebError::InvalidInput(e.body_text()))?;
    let session = state.assistants.create(form.into_spec()?).await?;

    Ok(Json(CreatedResponse {
        message: "Assistant created",
        assistant_id: session.assistant_id,
        thread_id: session.thread_id,
    }))
}

async fn delete_assistant(State(state): State<AppState>) -> Result<Json<DeletedResponse>, WebError> {
    state.assistants.delete().await?;

    Ok(Json(DeletedResponse {
        message: "Assistant deleted",
    }))
}
