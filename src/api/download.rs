use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::export::{annotated_columns, filtered_columns, stream_csv};
use crate::models::AbstractsQuery;
use crate::search::filter;
use crate::state::AppState;

/// GET /api/download/current - The filtered view as a CSV attachment
pub async fn download_current(
    State(state): State<AppState>,
    Query(query): Query<AbstractsQuery>,
) -> Response {
    let result = filter(&state.table, &query.search, query.show_empty());
    let columns = filtered_columns(result.search_active());
    let indices = result.indices();

    let table = state.table.clone();
    let rows = indices
        .into_iter()
        .filter_map(move |i| result.row(&table, i));

    let filename = format!(
        "abstracts_filtered_{}.csv",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    csv_attachment(&filename, Body::from_stream(stream_csv(rows, columns)))
}

/// GET /api/download/{task_id} - An annotation result as a CSV attachment
pub async fn download_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Response, (StatusCode, String)> {
    state.sweep_expired();
    let result = state
        .results
        .get(&task_id)
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Results not found".to_string()))?;

    let columns = annotated_columns(&result.columns);
    let rows = (0..result.len()).map(move |i| result.rows[i].clone());

    let prefix: String = task_id.chars().take(8).collect();
    let filename = format!("annotated_abstracts_{prefix}.csv");
    Ok(csv_attachment(
        &filename,
        Body::from_stream(stream_csv(rows, columns)),
    ))
}

fn csv_attachment(filename: &str, body: Body) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}
