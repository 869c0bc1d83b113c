//! Handlers for trainings, step type descriptors and reference catalogs.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use questline_core::catalog::CatalogKind;
use questline_core::step_config::registry;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/trainings
pub async fn list_trainings(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let trainings = state.content.list_trainings().await?;
    Ok(Json(DataResponse { data: trainings }))
}

/// GET /api/v1/step-types
pub async fn list_step_types() -> impl IntoResponse {
    Json(DataResponse {
        data: registry::descriptors(),
    })
}

/// GET /api/v1/catalogs/{kind}
pub async fn list_catalog(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> AppResult<impl IntoResponse> {
    let kind = CatalogKind::from_str_db(&kind)?;
    let entries = state.catalog.list(kind).await?;
    Ok(Json(DataResponse { data: entries }))
}
