//! Shared fixtures for router tests: an in-memory assistants provider and
//! request helpers.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use parley_config::ParleyConfig;
use parley_provider::{
    Assistant, AssistantsApi, CreateAssistantRequest, CreateMessageRequest, CreateRunRequest,
    DeletionStatus, ListMessagesQuery, ListResponse, MessageContent, MessageRole, ProviderError,
    ProviderResult, Run, RunError, RunStatus, TextContent, Thread, ThreadMessage,
};
use parley_web::{build_router, AppState};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

pub const READY_KEY_ENV: &str = "PARLEY_TEST_READY_KEY";

#[derive(Default)]
struct FakeState {
    next_id: u32,
    assistants: HashSet<String>,
    threads: HashMap<String, Vec<ThreadMessage>>,
    runs: HashMap<String, Vec<Run>>,

    assistant_requests: Vec<CreateAssistantRequest>,
    deleted_assistants: Vec<String>,
    deleted_threads: Vec<String>,
    retrieve_calls: usize,

    /// Statuses handed out by successive `retrieve_run` calls; `completed` once empty
    run_script: VecDeque<RunStatus>,
    run_error: Option<RunError>,
    page_size: Option<usize>,
    /// Delay before create_assistant, create_thread and latest_run answer
    latency: Duration,

    fail_create_assistant: Option<ProviderError>,
    fail_create_thread: Option<ProviderError>,
    fail_delete_assistant: Option<ProviderError>,
    fail_latest_run: Option<ProviderError>,
}

impl FakeState {
    fn next(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}_{}", self.next_id)
    }

    fn text_message(&mut self, role: MessageRole, text: &str, run_id: Option<String>) -> ThreadMessage {
        ThreadMessage {
            id: self.next("msg"),
            role,
            content: vec![MessageContent::Text {
                text: TextContent {
                    value: text.to_string(),
                },
            }],
            created_at: self.next_id as i64,
            run_id,
        }
    }
}

fn not_found(what: &str, id: &str) -> ProviderError {
    ProviderError::Api {
        status: 404,
        message: format!("No {what} found with id '{id}'."),
    }
}

/// In-memory provider that answers each run with `Echo: <last user message>`
#[derive(Default)]
pub struct FakeAssistants {
    state: Mutex<FakeState>,
}

impl FakeAssistants {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut FakeState) -> T) -> T {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    async fn settle(&self) {
        let latency = self.with_state(|s| s.latency);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }

    pub fn set_latency(&self, latency: Duration) {
        self.with_state(|s| s.latency = latency);
    }

    pub fn script_runs(&self, statuses: impl IntoIterator<Item = RunStatus>) {
        self.with_state(|s| s.run_script.extend(statuses));
    }

    pub fn set_run_error(&self, code: &str, message: &str) {
        self.with_state(|s| {
            s.run_error = Some(RunError {
                code: code.to_string(),
                message: message.to_string(),
            })
        });
    }

    pub fn set_page_size(&self, size: usize) {
        self.with_state(|s| s.page_size = Some(size));
    }

    pub fn fail_create_assistant(&self, err: ProviderError) {
        self.with_state(|s| s.fail_create_assistant = Some(err));
    }

    pub fn fail_create_thread(&self, err: ProviderError) {
        self.with_state(|s| s.fail_create_thread = Some(err));
    }

    pub fn fail_delete_assistant(&self, err: ProviderError) {
        self.with_state(|s| s.fail_delete_assistant = Some(err));
    }

    pub fn fail_latest_run(&self, err: ProviderError) {
        self.with_state(|s| s.fail_latest_run = Some(err));
    }

    /// Put a run with `status` on the thread without going through a submit
    pub fn seed_run(&self, thread_id: &str, status: RunStatus) -> String {
        self.with_state(|s| {
            let id = s.next("run");
            s.runs.entry(thread_id.to_string()).or_default().push(Run {
                id: id.clone(),
                thread_id: thread_id.to_string(),
                assistant_id: String::new(),
                status,
                last_error: None,
                created_at: 0,
            });
            id
        })
    }

    pub fn run_count(&self, thread_id: &str) -> usize {
        self.with_state(|s| s.runs.get(thread_id).map_or(0, Vec::len))
    }

    pub fn message_count(&self, thread_id: &str) -> usize {
        self.with_state(|s| s.threads.get(thread_id).map_or(0, Vec::len))
    }

    pub fn retrieve_calls(&self) -> usize {
        self.with_state(|s| s.retrieve_calls)
    }

    pub fn assistant_requests(&self) -> Vec<CreateAssistantRequest> {
        self.with_state(|s| s.assistant_requests.clone())
    }

    pub fn live_assistants(&self) -> usize {
        self.with_state(|s| s.assistants.len())
    }

    pub fn deleted_assistants(&self) -> Vec<String> {
        self.with_state(|s| s.deleted_assistants.clone())
    }

    pub fn deleted_threads(&self) -> Vec<String> {
        self.with_state(|s| s.deleted_threads.clone())
    }
}

#[async_trait]
impl AssistantsApi for FakeAssistants {
    async fn create_assistant(&self, request: CreateAssistantRequest) -> ProviderResult<Assistant> {
        self.settle().await;
        self.with_state(|s| {
            if let Some(err) = s.fail_create_assistant.take() {
                return Err(err);
            }
            let id = s.next("asst");
            s.assistants.insert(id.clone());
            s.assistant_requests.push(request.clone());
            Ok(Assistant {
                id,
                name: request.name,
                model: request.model,
                instructions: request.instructions,
                created_at: 0,
            })
        })
    }

    async fn delete_assistant(&self, assistant_id: &str) -> ProviderResult<DeletionStatus> {
        self.with_state(|s| {
            if let Some(err) = s.fail_delete_assistant.take() {
                return Err(err);
            }
            if !s.assistants.remove(assistant_id) {
                return Err(not_found("assistant", assistant_id));
            }
            s.deleted_assistants.push(assistant_id.to_string());
            Ok(DeletionStatus {
                id: assistant_id.to_string(),
                deleted: true,
            })
        })
    }

    async fn create_thread(&self) -> ProviderResult<Thread> {
        self.settle().await;
        self.with_state(|s| {
            if let Some(err) = s.fail_create_thread.take() {
                return Err(err);
            }
            let id = s.next("thread");
            s.threads.insert(id.clone(), Vec::new());
            Ok(Thread { id, created_at: 0 })
        })
    }

    async fn delete_thread(&self, thread_id: &str) -> ProviderResult<DeletionStatus> {
        self.with_state(|s| {
            if s.threads.remove(thread_id).is_none() {
                return Err(not_found("thread", thread_id));
            }
            s.deleted_threads.push(thread_id.to_string());
            Ok(DeletionStatus {
                id: thread_id.to_string(),
                deleted: true,
            })
        })
    }

    async fn create_message(
        &self,
        thread_id: &str,
        request: CreateMessageRequest,
    ) -> ProviderResult<ThreadMessage> {
        self.with_state(|s| {
            if !s.threads.contains_key(thread_id) {
                return Err(not_found("thread", thread_id));
            }
            let message = s.text_message(request.role, &request.content, None);
            s.threads
                .get_mut(thread_id)
                .expect("thread checked above")
                .push(message.clone());
            Ok(message)
        })
    }

    async fn create_run(&self, thread_id: &str, request: CreateRunRequest) -> ProviderResult<Run> {
        self.with_state(|s| {
            if !s.threads.contains_key(thread_id) {
                return Err(not_found("thread", thread_id));
            }
            let run = Run {
                id: s.next("run"),
                thread_id: thread_id.to_string(),
                assistant_id: request.assistant_id,
                status: RunStatus::Queued,
                last_error: None,
                created_at: s.next_id as i64,
            };
            s.runs.entry(thread_id.to_string()).or_default().push(run.clone());
            Ok(run)
        })
    }

    async fn latest_run(&self, thread_id: &str) -> ProviderResult<Option<Run>> {
        self.settle().await;
        self.with_state(|s| {
            if let Some(err) = s.fail_latest_run.take() {
                return Err(err);
            }
            Ok(s.runs.get(thread_id).and_then(|runs| runs.last().cloned()))
        })
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> ProviderResult<Run> {
        self.with_state(|s| {
            s.retrieve_calls += 1;

            let index = s
                .runs
                .get(thread_id)
                .and_then(|runs| runs.iter().position(|r| r.id == run_id))
                .ok_or_else(|| not_found("run", run_id))?;

            let current = s.runs[thread_id][index].status.clone();
            if !current.is_pending() {
                return Ok(s.runs[thread_id][index].clone());
            }

            let next = s.run_script.pop_front().unwrap_or(RunStatus::Completed);
            if next == RunStatus::Completed {
                let last_user = s.threads[thread_id]
                    .iter()
                    .rev()
                    .find(|m| m.role == MessageRole::User)
                    .map(|m| m.text())
                    .unwrap_or_default();
                let reply = s.text_message(
                    MessageRole::Assistant,
                    &format!("Echo: {last_user}"),
                    Some(run_id.to_string()),
                );
                s.threads
                    .get_mut(thread_id)
                    .expect("run belongs to thread")
                    .push(reply);
            }

            let last_error = if next.is_pending() || next.is_completed() {
                None
            } else {
                s.run_error.clone()
            };

            let run = &mut s.runs.get_mut(thread_id).expect("run located above")[index];
            run.status = next;
            run.last_error = last_error;
            Ok(run.clone())
        })
    }

    async fn list_messages(
        &self,
        thread_id: &str,
        query: ListMessagesQuery,
    ) -> ProviderResult<ListResponse<ThreadMessage>> {
        self.with_state(|s| {
            let messages = s
                .threads
                .get(thread_id)
                .ok_or_else(|| not_found("thread", thread_id))?;

            let start = match &query.after {
                Some(after) => messages
                    .iter()
                    .position(|m| &m.id == after)
                    .map_or(messages.len(), |i| i + 1),
                None => 0,
            };
            let limit = query
                .limit
                .map_or(20, |l| l as usize)
                .min(s.page_size.unwrap_or(usize::MAX));

            let data: Vec<ThreadMessage> = messages[start..].iter().take(limit).cloned().collect();
            let has_more = start + data.len() < messages.len();

            Ok(ListResponse {
                first_id: data.first().map(|m| m.id.clone()),
                last_id: data.last().map(|m| m.id.clone()),
                data,
                has_more,
            })
        })
    }

    fn provider_name(&self) -> &str {
        "fake"
    }
}

// ============================================================================
// App and request helpers
// ============================================================================

pub fn test_config() -> ParleyConfig {
    let mut config = ParleyConfig::default();
    config.provider.api_key_env = READY_KEY_ENV.to_string();
    config.polling.initial_interval_ms = 5;
    config.polling.max_interval_ms = 20;
    config.polling.timeout_secs = 5;
    config
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub fake: Arc<FakeAssistants>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: ParleyConfig) -> Self {
        let fake = FakeAssistants::new();
        let state = AppState::new(fake.clone(), &config);
        let router = build_router(state.clone(), config.server.max_body_bytes());
        Self {
            router,
            state,
            fake,
        }
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, String) {
        let request = Request::get(uri).body(Body::empty()).unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    pub async fn get_json(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let (status, body) = self.get(uri).await;
        (status, serde_json::from_str(&body).unwrap())
    }

    /// POST an already url-encoded form body and parse the JSON reply
    pub async fn post_form(&self, uri: &str, body: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    pub async fn create_assistant(&self, name: &str) -> serde_json::Value {
        let body = format!(
            "assistant_name={name}&instructions=Be+terse&personality=helpful&model_type=gpt-4-turbo"
        );
        let (status, json) = self.post_form("/create_assistant", &body).await;
        assert_eq!(status, StatusCode::OK, "create failed: {json}");
        json
    }

    pub async fn chat(&self, encoded_input: &str) -> (StatusCode, serde_json::Value) {
        self.post_form("/", &format!("user_input={encoded_input}&thread_id="))
            .await
    }
}
