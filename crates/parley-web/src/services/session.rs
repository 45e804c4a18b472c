//! The live assistant/thread pair

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, MutexGuard, RwLock};

/// Title shown when no assistant exists
pub const DEFAULT_DISPLAY_NAME: &str = "Assistant";

/// Everything parley remembers about the current conversation
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationSession {
    pub assistant_id: String,
    pub thread_id: String,
    pub assistant_name: String,
    /// Chosen in the form but never sent to the provider
    pub personality: String,
    pub model: String,
    pub created_at: DateTime<Utc>,
}

/// Process-wide holder for at most one [`ConversationSession`].
///
/// `lifecycle` serializes create/delete across their provider calls and
/// `submit` serializes the active-run check with message posting. Readers
/// only ever take the short `current` lock.
#[derive(Debug, Default)]
pub struct SessionStore {
    current: RwLock<Option<ConversationSession>>,
    lifecycle: Mutex<()>,
    submit: Mutex<()>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn current(&self) -> Option<ConversationSession> {
        self.current.read().await.clone()
    }

    pub async fn is_active(&self) -> bool {
        self.current.read().await.is_some()
    }

    /// Name for the page title and heading
    pub async fn display_name(&self) -> String {
        self.current
            .read()
            .await
            .as_ref()
            .map(|s| s.assistant_name.clone())
            .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string())
    }

    pub(crate) async fn lock_lifecycle(&self) -> MutexGuard<'_, ()> {
        self.lifecycle.lock().await
    }

    pub(crate) async fn lock_submit(&self) -> MutexGuard<'_, ()> {
        self.submit.lock().await
    }

    /// Install a new session, returning the one it replaced
    pub(crate) async fn replace(&self, session: ConversationSession) -> Option<ConversationSession> {
        self.current.write().await.replace(session)
    }

    pub(crate) async fn clear(&self) -> Option<ConversationSession> {
        self.current.write().await.take()
    }
}
