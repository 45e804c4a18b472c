//! Web front end for hosted assistant conversations
//!
//! One assistant and one thread are live at a time. The browser creates or
//! deletes the assistant, posts messages to `/` and gets back the whole
//! transcript as an HTML fragment.

pub mod render;
pub mod routes;
pub mod server;
pub mod services;

mod assets;
mod error;

pub use error::{Result, WebError};
pub use server::{build_router, start_server};
pub use services::AppState;
