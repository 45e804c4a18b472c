//! Backend-agnostic assistants API abstraction
//!
//! The web layer only talks to this trait, so tests can substitute an
//! in-memory provider for the HTTP client.

use async_trait::async_trait;

use crate::error::ProviderResult;
use crate::types::{
    Assistant, CreateAssistantRequest, CreateMessageRequest, CreateRunRequest, DeletionStatus,
    ListMessagesQuery, ListResponse, Run, Thread, ThreadMessage,
};

/// Page size used when walking a whole transcript
pub const MESSAGE_PAGE_LIMIT: u32 = 100;

#[async_trait]
pub trait AssistantsApi: Send + Sync {
    async fn create_assistant(&self, request: CreateAssistantRequest) -> ProviderResult<Assistant>;

    async fn delete_assistant(&self, assistant_id: &str) -> ProviderResult<DeletionStatus>;

    async fn create_thread(&self) -> ProviderResult<Thread>;

    async fn delete_thread(&self, thread_id: &str) -> ProviderResult<DeletionStatus>;

    async fn create_message(
        &self,
        thread_id: &str,
        request: CreateMessageRequest,
    ) -> ProviderResult<ThreadMessage>;

    async fn create_run(&self, thread_id: &str, request: CreateRunRequest) -> ProviderResult<Run>;

    /// Most recently created run on the thread, if any
    async fn latest_run(&self, thread_id: &str) -> ProviderResult<Option<Run>>;

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> ProviderResult<Run>;

    async fn list_messages(
        &self,
        thread_id: &str,
        query: ListMessagesQuery,
    ) -> ProviderResult<ListResponse<ThreadMessage>>;

    /// Every message on the thread, oldest first, following pagination
    async fn list_all_messages(&self, thread_id: &str) -> ProviderResult<Vec<ThreadMessage>> {
        let mut messages = Vec::new();
        let mut query = ListMessagesQuery::ascending(MESSAGE_PAGE_LIMIT);

        loop {
            let page = self.list_messages(thread_id, query.clone()).await?;
            let cursor = page
                .last_id
                .clone()
                .or_else(|| page.data.last().map(|m| m.id.clone()));
            let has_more = page.has_more && !page.data.is_empty();
            messages.extend(page.data);

            match cursor {
                Some(cursor) if has_more => query = query.after(cursor),
                _ => break,
            }
        }

        Ok(messages)
    }

    fn provider_name(&self) -> &str;
}
