//! Embedded page template, stylesheet and script
//!
//! Debug builds read `web/` from disk on each request so the page can be
//! edited without recompiling; release builds embed the files.

use axum::{
    body::Body,
    extract::Path,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use rust_embed::Embed;

use crate::{Result, WebError};

#[derive(Embed)]
#[folder = "web/"]
struct Assets;

const PAGE_TEMPLATE: &str = "index.html";

/// `GET /assets/{*path}`
pub fn asset_routes() -> Router {
    Router::new().route("/assets/{*path}", get(asset_handler))
}

/// Raw page template with placeholders still in place
pub(crate) fn page_template() -> Result<String> {
    let file = <Assets as Embed>::get(PAGE_TEMPLATE)
        .ok_or_else(|| WebError::Asset(format!("{PAGE_TEMPLATE} is not embedded")))?;
    String::from_utf8(file.data.into_owned())
        .map_err(|e| WebError::Asset(format!("{PAGE_TEMPLATE} is not UTF-8: {e}")))
}

async fn asset_handler(Path(path): Path<String>) -> Response {
    // The template is only served rendered, through `/`
    if path == PAGE_TEMPLATE {
        return not_found();
    }

    match <Assets as Embed>::get(&path) {
        Some(content) => respond_with_asset(&path, content.data.into_owned()),
        None => not_found(),
    }
}

fn respond_with_asset(path: &str, data: Vec<u8>) -> Response {
    let mime = mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string();

    ([(header::CONTENT_TYPE, mime)], Body::from(data)).into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}
