//! HTTP endpoint serving type path files to preview sessions.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json};
use axum::routing::get;
use axum::Router;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

pub struct ServeState {
    pub dir: PathBuf,
}

#[derive(Debug, Serialize)]
struct Listing {
    files: Vec<String>,
}

/// `type-paths-<hex>.json`, the only names the server hands out.
pub fn is_type_paths_filename(name: &str) -> bool {
    name.strip_prefix("type-paths-")
        .and_then(|rest| rest.strip_suffix(".json"))
        .is_some_and(|digest| !digest.is_empty() && digest.chars().all(|c| c.is_ascii_hexdigit()))
}

async fn health() -> &'static str {
    "ok"
}

async fn list_handler(State(state): State<Arc<ServeState>>) -> Result<Json<Listing>, StatusCode> {
    let mut entries = tokio::fs::read_dir(&state.dir)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let mut files = Vec::new();
    while let Ok(Some(entry)) = entries.next_entry().await {
        if let Some(name) = entry.file_name().to_str() {
            if is_type_paths_filename(name) {
                files.push(name.to_string());
            }
        }
    }
    files.sort();
    Ok(Json(Listing { files }))
}

async fn file_handler(
    State(state): State<Arc<ServeState>>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    if !is_type_paths_filename(&filename) {
        return Err(StatusCode::NOT_FOUND);
    }

    let body = tokio::fs::read_to_string(state.dir.join(&filename))
        .await
        .map_err(|_| StatusCode::NOT_FOUND)?;
    debug!("Serving {}", filename);

    Ok((
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::CACHE_CONTROL, "public, max-age=31536000, immutable"),
        ],
        body,
    ))
}

/// Build the HTTP router serving the type path files of `state.dir`.
pub fn build_router(state: Arc<ServeState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/type-paths", get(list_handler))
        .route("/type-paths/{filename}", get(file_handler))
        .with_state(state)
}
