use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::annotate::TaskProgress;
use crate::api::page_params;
use crate::llm::{Answerer, DryRunAnswerer, LlmAnswerer};
use crate::models::{
    AnnotateRequest, AnnotateResponse, AnnotatedResponse, PageQuery, DEFAULT_NUM_THREADS,
};
use crate::search::{filter, paginate};
use crate::state::AppState;
use crate::table::{TableView, COL_MATCHED_KEYWORDS};

/// POST /api/annotate - Filter the table and start answering the question
/// for every selected row in the background.
pub async fn annotate(
    State(state): State<AppState>,
    Json(req): Json<AnnotateRequest>,
) -> Result<Json<AnnotateResponse>, (StatusCode, String)> {
    if req.question.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Question is required".to_string()));
    }

    let answerer: Arc<dyn Answerer> = if req.dry_run {
        Arc::new(DryRunAnswerer::new(state.config.dry_run_delay()))
    } else {
        let api_key = req
            .api_key
            .filter(|k| !k.trim().is_empty())
            .or_else(|| state.config.llm.api_key.clone());
        if api_key.is_none() && state.config.llm.provider == "openai" {
            return Err((
                StatusCode::BAD_REQUEST,
                "API key is required unless dry_run is enabled".to_string(),
            ));
        }
        let model = req
            .model
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| state.config.llm.default_model.clone());
        Arc::new(LlmAnswerer::new(
            state.http_client.clone(),
            state.config.llm.clone(),
            model,
            api_key,
        ))
    };

    let max_threads = state.config.max_threads.max(1) as i64;
    let num_threads = req
        .num_threads
        .unwrap_or(DEFAULT_NUM_THREADS)
        .clamp(1, max_threads) as usize;

    let result = filter(&state.table, &req.search_filter, req.show_empty);
    let mut columns = state.table.columns().to_vec();
    if result.search_active() {
        columns.push(COL_MATCHED_KEYWORDS.to_string());
    }
    let view = TableView {
        columns,
        rows: result.rows(&state.table, &result.indices()),
    };

    // The job keeps running after the handle is dropped.
    let handle = state
        .annotator
        .submit(view, &req.question, answerer, num_threads);

    Ok(Json(AnnotateResponse {
        task_id: handle.task_id().to_string(),
        total: handle.total(),
    }))
}

/// GET /api/progress/{task_id}
pub async fn progress(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskProgress>, (StatusCode, String)> {
    state.sweep_expired();
    state
        .results
        .progress(&task_id)
        .map(Json)
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Task not found".to_string()))
}

/// GET /api/annotated/{task_id} - One page of a finished annotation
pub async fn annotated(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<AnnotatedResponse>, (StatusCode, String)> {
    let (page, per_page) = page_params(query.page, query.per_page)?;

    state.sweep_expired();
    let result = state
        .results
        .get(&task_id)
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Results not found".to_string()))?;

    let slice = paginate(&result.rows, page, per_page);

    Ok(Json(AnnotatedResponse {
        data: slice.items.to_vec(),
        total: slice.total,
        page,
        per_page,
        total_pages: slice.total_pages,
        columns: result.columns.clone(),
        search_terms: result.has_column(COL_MATCHED_KEYWORDS).then_some(true),
    }))
}
