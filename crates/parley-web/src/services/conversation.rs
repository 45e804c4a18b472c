//! Submitting user messages and waiting for the assistant's run

use parley_config::PollingConfig;
use parley_provider::{AssistantsApi, CreateMessageRequest, CreateRunRequest, Run, RunStatus};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::session::{ConversationSession, SessionStore};
use crate::render::render_transcript;
use crate::{Result, WebError};

/// Delay schedule for run status checks
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    pub initial_interval: Duration,
    pub max_interval: Duration,
    pub backoff_factor: f64,
    pub timeout: Duration,
}

impl PollPolicy {
    pub fn from_config(config: &PollingConfig) -> Self {
        Self {
            initial_interval: config.initial_interval(),
            max_interval: config.max_interval(),
            backoff_factor: config.backoff_factor,
            timeout: config.timeout(),
        }
    }

    /// Grow `current` by the backoff factor, saturating at `max_interval`
    pub fn next_interval(&self, current: Duration) -> Duration {
        Duration::try_from_secs_f64(current.as_secs_f64() * self.backoff_factor)
            .map_or(self.max_interval, |next| next.min(self.max_interval))
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::from_config(&PollingConfig::default())
    }
}

/// Result of trying to add a message to the thread
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Message posted and a new run started
    Accepted(Run),
    /// The thread's latest run has not finished; nothing was posted
    Rejected { run_id: String, status: RunStatus },
}

/// Rendered transcript returned to the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub html: String,
    pub thread_id: String,
}

pub struct ConversationService {
    api: Arc<dyn AssistantsApi>,
    sessions: Arc<SessionStore>,
    policy: PollPolicy,
}

impl ConversationService {
    pub fn new(api: Arc<dyn AssistantsApi>, sessions: Arc<SessionStore>, policy: PollPolicy) -> Self {
        Self {
            api,
            sessions,
            policy,
        }
    }

    /// Send `user_input` on the live thread and return the whole transcript
    pub async fn chat(&self, user_input: &str, client_thread_id: Option<&str>) -> Result<ChatReply> {
        let session = self.sessions.current().await.ok_or(WebError::NoSession)?;

        if user_input.trim().is_empty() {
            return Err(WebError::InvalidInput("Message cannot be empty".to_string()));
        }

        if let Some(client_thread) = client_thread_id.filter(|id| !id.is_empty()) {
            if client_thread != session.thread_id {
                warn!(
                    client_thread,
                    live_thread = %session.thread_id,
                    "Client sent a stale thread id; using the live thread"
                );
            }
        }

        let run = match self.submit(&session, user_input).await? {
            SubmitOutcome::Accepted(run) => run,
            SubmitOutcome::Rejected { run_id, status } => {
                return Err(WebError::RunActive { run_id, status });
            }
        };

        let run = self.wait_for_run(&session.thread_id, run).await?;
        if !run.status.is_completed() {
            let detail = run
                .last_error
                .map(|e| format!("{} ({})", e.message, e.code))
                .unwrap_or_else(|| "no error details".to_string());
            return Err(WebError::RunFailed {
                run_id: run.id,
                status: run.status,
                detail,
            });
        }

        let messages = self.api.list_all_messages(&session.thread_id).await?;
        Ok(ChatReply {
            html: render_transcript(&messages),
            thread_id: session.thread_id,
        })
    }

    /// Post the message and start a run, unless a run is still active.
    ///
    /// A failure to read the latest run is logged and treated as an idle
    /// thread; the provider rejects the message itself if that was wrong.
    pub async fn submit(&self, session: &ConversationSession, text: &str) -> Result<SubmitOutcome> {
        let _guard = self.sessions.lock_submit().await;
        let thread_id = session.thread_id.as_str();

        match self.api.latest_run(thread_id).await {
            Ok(Some(run)) if run.status.is_active() => {
                debug!(thread_id, run_id = %run.id, status = %run.status, "Submit rejected");
                return Ok(SubmitOutcome::Rejected {
                    run_id: run.id,
                    status: run.status,
                });
            }
            Ok(_) => {}
            Err(e) => warn!(thread_id, "Error getting active run status: {}", e),
        }

        self.api
            .create_message(thread_id, CreateMessageRequest::user(text))
            .await?;
        let run = self
            .api
            .create_run(thread_id, CreateRunRequest::new(session.assistant_id.as_str()))
            .await?;

        debug!(thread_id, run_id = %run.id, "Run started");
        Ok(SubmitOutcome::Accepted(run))
    }

    /// Poll until the run is no longer pending or the policy's timeout passes
    pub async fn wait_for_run(&self, thread_id: &str, mut run: Run) -> Result<Run> {
        let started = Instant::now();
        // A timeout too large to represent never expires
        let deadline = started.checked_add(self.policy.timeout);
        let mut interval = self.policy.initial_interval;

        while run.status.is_pending() {
            let now = Instant::now();
            if deadline.is_some_and(|deadline| now >= deadline) {
                warn!(thread_id, run_id = %run.id, status = %run.status, "Run polling timed out");
                return Err(WebError::PollTimeout {
                    run_id: run.id,
                    status: run.status,
                    waited_secs: started.elapsed().as_secs(),
                });
            }

            let remaining = deadline.map_or(interval, |deadline| deadline - now);
            tokio::time::sleep(interval.min(remaining)).await;
            run = self.api.retrieve_run(thread_id, &run.id).await?;
            interval = self.policy.next_interval(interval);
        }

        info!(
            thread_id,
            run_id = %run.id,
            status = %run.status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Run finished"
        );
        Ok(run)
    }
}
