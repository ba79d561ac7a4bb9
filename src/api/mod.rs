//! Axum handlers and route table.

pub mod abstracts;
pub mod annotate;
pub mod download;

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;

use crate::models::DEFAULT_PER_PAGE;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/stats", get(abstracts::stats))
        .route("/api/abstracts", get(abstracts::list_abstracts))
        .route("/api/models", get(abstracts::list_models))
        .route("/api/annotate", post(annotate::annotate))
        .route("/api/progress/{task_id}", get(annotate::progress))
        .route("/api/annotated/{task_id}", get(annotate::annotated))
        .route("/api/download/current", get(download::download_current))
        .route("/api/download/{task_id}", get(download::download_task))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// Validate 1-based pagination parameters, applying defaults.
pub(crate) fn page_params(
    page: Option<i64>,
    per_page: Option<i64>,
) -> Result<(usize, usize), (StatusCode, String)> {
    let page = page.unwrap_or(1);
    let per_page = per_page.unwrap_or(DEFAULT_PER_PAGE);
    if page < 1 {
        return Err((StatusCode::BAD_REQUEST, "page must be at least 1".to_string()));
    }
    if per_page < 1 {
        return Err((
            StatusCode::BAD_REQUEST,
            "per_page must be at least 1".to_string(),
        ));
    }
    Ok((page as usize, per_page as usize))
}
