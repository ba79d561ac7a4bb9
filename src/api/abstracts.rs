use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::page_params;
use crate::models::{AbstractsQuery, AbstractsResponse, ModelsResponse, StatsResponse, MODELS};
use crate::search::{filter, paginate};
use crate::state::AppState;

/// GET /api/stats - Row counts and spreadsheet columns
pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let with_text = state.table.with_abstract_count();
    Json(StatsResponse {
        total_abstracts: with_text,
        abstracts_with_text: with_text,
        total_all: state.table.len(),
        columns: state.table.columns().to_vec(),
    })
}

/// GET /api/abstracts - One page of the filtered table.
///
/// The mask is computed over the whole table; only the rows of the
/// requested page are copied out.
pub async fn list_abstracts(
    State(state): State<AppState>,
    Query(query): Query<AbstractsQuery>,
) -> Result<Json<AbstractsResponse>, (StatusCode, String)> {
    let (page, per_page) = page_params(query.page, query.per_page)?;

    state.sweep_expired();

    let result = filter(&state.table, &query.search, query.show_empty());
    let indices = result.indices();
    let slice = paginate(&indices, page, per_page);
    let data = result.rows(&state.table, slice.items);

    Ok(Json(AbstractsResponse {
        data,
        total: slice.total,
        page,
        per_page,
        total_pages: slice.total_pages,
        search_terms: result.search_active().then(|| result.terms.clone()),
    }))
}

/// GET /api/models - Selectable chat models
pub async fn list_models() -> Json<ModelsResponse> {
    Json(ModelsResponse { models: MODELS })
}
