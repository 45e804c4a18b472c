pub mod assistants;
pub mod conversation;
pub mod session;
pub mod state;

pub use assistants::{AssistantService, AssistantSpec};
pub use conversation::{ChatReply, ConversationService, PollPolicy, SubmitOutcome};
pub use session::{ConversationSession, SessionStore, DEFAULT_DISPLAY_NAME};
pub use state::AppState;
