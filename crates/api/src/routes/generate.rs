use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{generate, index};
use crate::state::AppState;

/// Mount the upload page and the generation endpoint.
///
/// `max_upload_bytes` replaces axum's default 2 MB body limit on
/// `/generate` so full-size images fit.
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new().route("/", get(index::index)).route(
        "/generate",
        post(generate::generate).layer(DefaultBodyLimit::max(max_upload_bytes)),
    )
}
