use axum::extract::State;
use axum::response::Html;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

const INDEX_FILE: &str = "index.html";

/// GET / -- serves the upload page from the static directory.
pub async fn index(State(state): State<AppState>) -> AppResult<Html<String>> {
    let path = state.config.static_dir.join(INDEX_FILE);

    let html = tokio::fs::read_to_string(&path).await.map_err(|e| {
        AppError::InternalError(format!("Failed to read {}: {e}", path.display()))
    })?;

    Ok(Html(html))
}
