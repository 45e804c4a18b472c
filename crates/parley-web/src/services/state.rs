use parley_config::{ParleyConfig, ProviderConfig};
use parley_provider::AssistantsApi;
use std::sync::Arc;

use super::{AssistantService, ConversationService, PollPolicy, SessionStore};

#[derive(Clone)]
pub struct AppState {
    pub assistants: Arc<AssistantService>,
    pub conversation: Arc<ConversationService>,
    pub sessions: Arc<SessionStore>,
    /// Credential settings the readiness check inspects
    pub provider: Arc<ProviderConfig>,
}

impl AppState {
    pub fn new(api: Arc<dyn AssistantsApi>, config: &ParleyConfig) -> Self {
        let sessions = Arc::new(SessionStore::new());
        let policy = PollPolicy::from_config(&config.polling);

        Self {
            assistants: Arc::new(AssistantService::new(api.clone(), sessions.clone())),
            conversation: Arc::new(ConversationService::new(api, sessions.clone(), policy)),
            sessions,
            provider: Arc::new(config.provider.clone()),
        }
    }
}
