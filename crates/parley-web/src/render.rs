//! HTML rendering for the transcript fragment and the page template

use parley_provider::{MessageRole, ThreadMessage};

/// Placed between consecutive messages of a transcript
pub const MESSAGE_SEPARATOR: &str = "<br><br>";

const NAME_PLACEHOLDER: &str = "{{ assistant_name }}";
const SESSION_PLACEHOLDER: &str = "{{ session_state }}";

/// Render messages as `Role: text` blocks, oldest first.
///
/// Message text is HTML-escaped before newlines become `<br>`.
pub fn render_transcript(messages: &[ThreadMessage]) -> String {
    messages
        .iter()
        .map(|message| {
            format!(
                "{}: {}",
                role_label(message.role),
                text_to_html(&message.text())
            )
        })
        .collect::<Vec<_>>()
        .join(MESSAGE_SEPARATOR)
}

/// `user` -> `User`, `assistant` -> `Assistant`
pub fn role_label(role: MessageRole) -> String {
    let role = role.as_str();
    let mut chars = role.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn text_to_html(text: &str) -> String {
    html_escape::encode_text(text).replace('\n', "<br>")
}

/// Fill the page template with the display name and session state
pub fn render_page(template: &str, display_name: &str, session_active: bool) -> String {
    let state = if session_active { "active" } else { "idle" };
    template
        .replace(NAME_PLACEHOLDER, &html_escape::encode_text(display_name))
        .replace(SESSION_PLACEHOLDER, state)
}
