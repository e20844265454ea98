//! Health check endpoint
//!
//! Reports `degraded` when the repository root is not a readable directory.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::http::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub repo_root_available: bool,
}

/// GET /health
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let repo_root_available = state.settings().repo_root.is_dir();
    if !repo_root_available {
        tracing::warn!(
            repo_root = %state.settings().repo_root.display(),
            "repository root is not a directory"
        );
    }

    Json(HealthResponse {
        status: if repo_root_available { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        repo_root_available,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
