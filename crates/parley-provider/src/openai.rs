//! OpenAI assistants (v2) client

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};
use crate::traits::AssistantsApi;
use crate::types::{
    Assistant, CreateAssistantRequest, CreateMessageRequest, CreateRunRequest, DeletionStatus,
    ListMessagesQuery, ListResponse, Run, SortOrder, Thread, ThreadMessage,
};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const BETA_HEADER: (&str, &str) = ("OpenAI-Beta", "assistants=v2");

/// OpenAI assistants provider
pub struct OpenAIAssistantsClient {
    client: reqwest::Client,
    api_key: Option<String>,
    api_key_env: String,
    base_url: String,
    timeout: Duration,
}

impl OpenAIAssistantsClient {
    /// Create a new client.
    ///
    /// Without an explicit key the client reads [`Self::with_api_key_env`]'s
    /// variable on every request, so a key exported after startup is picked
    /// up. A missing key is not an error here: requests fail with
    /// [`ProviderError::MissingApiKey`] instead, so the server can still start
    /// and report the problem through its readiness check.
    pub fn new(api_key: Option<String>, base_url: Option<String>, timeout_secs: u64) -> Self {
        let base_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.filter(|key| !key.is_empty()),
            api_key_env: "OPENAI_API_KEY".to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Environment variable consulted when no explicit key was given
    pub fn with_api_key_env(mut self, name: impl Into<String>) -> Self {
        self.api_key_env = name.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_api_key(&self) -> bool {
        self.resolve_api_key().is_some()
    }

    fn resolve_api_key(&self) -> Option<String> {
        self.api_key.clone().or_else(|| {
            std::env::var(&self.api_key_env)
                .ok()
                .filter(|key| !key.is_empty())
        })
    }

    fn request(&self, method: Method, path: &str) -> ProviderResult<RequestBuilder> {
        let api_key = self
            .resolve_api_key()
            .ok_or_else(|| ProviderError::MissingApiKey(self.api_key_env.clone()))?;

        debug!(%method, path, "assistants API request");

        Ok(self
            .client
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(api_key)
            .header(BETA_HEADER.0, BETA_HEADER.1)
            .timeout(self.timeout))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ProviderResult<T> {
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {e}")))
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Prefer the provider's `{"error": {"message": ..}}` text over the raw body
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.message.is_empty() => envelope.error.message,
        _ if body.trim().is_empty() => "Empty error response".to_string(),
        _ => body.trim().to_string(),
    }
}

#[async_trait]
impl AssistantsApi for OpenAIAssistantsClient {
    async fn create_assistant(&self, request: CreateAssistantRequest) -> ProviderResult<Assistant> {
        let builder = self.request(Method::POST, "/assistants")?.json(&request);
        self.send(builder).await
    }

    async fn delete_assistant(&self, assistant_id: &str) -> ProviderResult<DeletionStatus> {
        let builder = self.request(Method::DELETE, &format!("/assistants/{assistant_id}"))?;
        self.send(builder).await
    }

    async fn create_thread(&self) -> ProviderResult<Thread> {
        let builder = self
            .request(Method::POST, "/threads")?
            .json(&serde_json::json!({}));
        self.send(builder).await
    }

    async fn delete_thread(&self, thread_id: &str) -> ProviderResult<DeletionStatus> {
        let builder = self.request(Method::DELETE, &format!("/threads/{thread_id}"))?;
        self.send(builder).await
    }

    async fn create_message(
        &self,
        thread_id: &str,
        request: CreateMessageRequest,
    ) -> ProviderResult<ThreadMessage> {
        let builder = self
            .request(Method::POST, &format!("/threads/{thread_id}/messages"))?
            .json(&request);
        self.send(builder).await
    }

    async fn create_run(&self, thread_id: &str, request: CreateRunRequest) -> ProviderResult<Run> {
        let builder = self
            .request(Method::POST, &format!("/threads/{thread_id}/runs"))?
            .json(&request);
        self.send(builder).await
    }

    async fn latest_run(&self, thread_id: &str) -> ProviderResult<Option<Run>> {
        let builder = self
            .request(Method::GET, &format!("/threads/{thread_id}/runs"))?
            .query(&[("order", SortOrder::Desc.as_str()), ("limit", "1")]);
        let page: ListResponse<Run> = self.send(builder).await?;
        Ok(page.data.into_iter().next())
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> ProviderResult<Run> {
        let builder = self.request(Method::GET, &format!("/threads/{thread_id}/runs/{run_id}"))?;
        self.send(builder).await
    }

    async fn list_messages(
        &self,
        thread_id: &str,
        query: ListMessagesQuery,
    ) -> ProviderResult<ListResponse<ThreadMessage>> {
        let builder = self
            .request(Method::GET, &format!("/threads/{thread_id}/messages"))?
            .query(&query.to_pairs());
        self.send(builder).await
    }

    fn provider_name(&self) -> &str {
        "OpenAI"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation_trims_base_url() {
        let client = OpenAIAssistantsClient::new(
            Some("sk-test-key".to_string()),
            Some("http://localhost:4010/v1/".to_string()),
            30,
        );

        assert_eq!(client.base_url(), "http://localhost:4010/v1");
        assert_eq!(client.provider_name(), "OpenAI");
        assert!(client.has_api_key());
    }

    #[test]
    fn test_empty_key_counts_as_missing() {
        let client = OpenAIAssistantsClient::new(Some(String::new()), None, 30)
            .with_api_key_env("PARLEY_UNIT_UNSET_KEY");
        assert!(!client.has_api_key());
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_error_message_prefers_envelope() {
        let body = r#"{"error": {"message": "Invalid model", "type": "invalid_request_error"}}"#;
        assert_eq!(error_message(body), "Invalid model");
        assert_eq!(error_message("  upstream down \n"), "upstream down");
        assert_eq!(error_message(""), "Empty error response");
    }
}
