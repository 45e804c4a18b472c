//! Assistant lifecycle: create and delete the live assistant/thread pair

use chrono::Utc;
use parley_provider::{AssistantsApi, CreateAssistantRequest, ToolSpec};
use std::sync::Arc;
use tracing::{info, warn};

use super::session::{ConversationSession, SessionStore};
use crate::{Result, WebError};

/// Fields of the create-assistant form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantSpec {
    pub name: String,
    pub instructions: String,
    pub personality: String,
    pub model: String,
}

pub struct AssistantService {
    api: Arc<dyn AssistantsApi>,
    sessions: Arc<SessionStore>,
}

impl AssistantService {
    pub fn new(api: Arc<dyn AssistantsApi>, sessions: Arc<SessionStore>) -> Self {
        Self { api, sessions }
    }

    /// Create an assistant plus its conversation thread and make them current.
    ///
    /// Any previous pair is replaced and removed from the provider on a
    /// best-effort basis. If the thread cannot be opened the new assistant is
    /// removed again and the previous session stays live.
    pub async fn create(&self, spec: AssistantSpec) -> Result<ConversationSession> {
        let _guard = self.sessions.lock_lifecycle().await;

        let request = CreateAssistantRequest::new(spec.model.as_str())
            .with_name(spec.name.as_str())
            .with_instructions(spec.instructions.as_str())
            .with_tool(ToolSpec::CodeInterpreter);

        let assistant = self.api.create_assistant(request).await?;

        let thread = match self.api.create_thread().await {
            Ok(thread) => thread,
            Err(e) => {
                self.discard_assistant(&assistant.id).await;
                return Err(e.into());
            }
        };

        let session = ConversationSession {
            assistant_id: assistant.id,
            thread_id: thread.id,
            assistant_name: spec.name,
            personality: spec.personality,
            model: spec.model,
            created_at: Utc::now(),
        };

        info!(
            assistant_id = %session.assistant_id,
            thread_id = %session.thread_id,
            provider = self.api.provider_name(),
            "Assistant created"
        );

        if let Some(previous) = self.sessions.replace(session.clone()).await {
            self.discard_assistant(&previous.assistant_id).await;
            self.discard_thread(&previous.thread_id).await;
        }

        Ok(session)
    }

    /// Delete the live assistant and forget the session.
    ///
    /// The session survives a provider failure so the delete can be retried.
    pub async fn delete(&self) -> Result<ConversationSession> {
        let _guard = self.sessions.lock_lifecycle().await;

        let session = self.sessions.current().await.ok_or(WebError::NoAssistant)?;

        self.api.delete_assistant(&session.assistant_id).await?;
        self.discard_thread(&session.thread_id).await;
        self.sessions.clear().await;

        info!(assistant_id = %session.assistant_id, "Assistant deleted");
        Ok(session)
    }

    async fn discard_assistant(&self, assistant_id: &str) {
        if let Err(e) = self.api.delete_assistant(assistant_id).await {
            warn!(assistant_id, "Failed to delete stale assistant: {}", e);
        }
    }

    async fn discard_thread(&self, thread_id: &str) {
        if let Err(e) = self.api.delete_thread(thread_id).await {
            warn!(thread_id, "Failed to delete thread: {}", e);
        }
    }
}
