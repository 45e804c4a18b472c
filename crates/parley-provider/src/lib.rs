//! Hosted assistants API client
//!
//! - [`AssistantsApi`]: trait the web layer depends on
//! - [`OpenAIAssistantsClient`]: reqwest implementation of the OpenAI assistants v2 API
//! - [`types`]: request/response wire types

pub mod error;
pub mod openai;
pub mod traits;
pub mod types;

pub use error::{ProviderError, ProviderResult};
pub use openai::OpenAIAssistantsClient;
pub use traits::{AssistantsApi, MESSAGE_PAGE_LIMIT};
pub use types::*;
