//! Handlers for the `/sessions` resource.
//!
//! Every mutating endpoint answers with the mutation's own result plus the
//! refreshed [`SessionView`], so clients re-render from one response.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use questline_core::module::ModulePatch;
use questline_core::types::{ModuleId, TrainingId};
use questline_editor::{EditorError, SessionView};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response DTOs
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AddModuleRequest {
    /// `None` adds a top-level module.
    pub parent_id: Option<ModuleId>,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    #[serde(default)]
    pub parent_id: Option<ModuleId>,
    pub ordered_ids: Vec<ModuleId>,
}

#[derive(Debug, Deserialize)]
pub struct DragRequest {
    pub active_id: ModuleId,
    pub over_id: ModuleId,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SelectRequest {
    pub module_id: Option<ModuleId>,
}

#[derive(Debug, Serialize)]
pub struct MutationResponse<T: Serialize> {
    pub result: T,
    pub session: SessionView,
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// POST /api/v1/sessions/{training_id}
pub async fn open(
    State(state): State<AppState>,
    Path(training_id): Path<TrainingId>,
) -> AppResult<impl IntoResponse> {
    let view = state.open_session(training_id).await?;
    Ok(Json(DataResponse { data: view }))
}

/// GET /api/v1/sessions/{training_id}
pub async fn view(
    State(state): State<AppState>,
    Path(training_id): Path<TrainingId>,
) -> AppResult<impl IntoResponse> {
    let view = state.session(training_id).await?.view()?;
    Ok(Json(DataResponse { data: view }))
}

/// DELETE /api/v1/sessions/{training_id}
pub async fn close(
    State(state): State<AppState>,
    Path(training_id): Path<TrainingId>,
) -> AppResult<StatusCode> {
    if state.close_session(training_id).await {
        tracing::info!(%training_id, "Edit session closed");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Editor(EditorError::NoSession))
    }
}

// ---------------------------------------------------------------------------
// Tree mutations
// ---------------------------------------------------------------------------

/// POST /api/v1/sessions/{training_id}/modules
///
/// `result` is the new module id, or `null` when the parent is unknown or
/// already a step.
pub async fn add_module(
    State(state): State<AppState>,
    Path(training_id): Path<TrainingId>,
    Json(input): Json<AddModuleRequest>,
) -> AppResult<impl IntoResponse> {
    let session = state.session(training_id).await?;
    let result = session.add_module(input.parent_id)?;
    let status = if result.is_some() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    let data = MutationResponse {
        result,
        session: session.view()?,
    };
    Ok((status, Json(DataResponse { data })))
}

/// PATCH /api/v1/sessions/{training_id}/modules/{id}
pub async fn update_module(
    State(state): State<AppState>,
    Path((training_id, id)): Path<(TrainingId, ModuleId)>,
    Json(patch): Json<ModulePatch>,
) -> AppResult<impl IntoResponse> {
    let session = state.session(training_id).await?;
    let result = session.update_module(id, &patch)?;
    let data = MutationResponse {
        result,
        session: session.view()?,
    };
    Ok(Json(DataResponse { data }))
}

/// DELETE /api/v1/sessions/{training_id}/modules/{id}
///
/// `result` lists the removed ids (the module and its steps).
pub async fn delete_module(
    State(state): State<AppState>,
    Path((training_id, id)): Path<(TrainingId, ModuleId)>,
) -> AppResult<impl IntoResponse> {
    let session = state.session(training_id).await?;
    let result = session.delete_module(id)?;
    let data = MutationResponse {
        result,
        session: session.view()?,
    };
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/sessions/{training_id}/modules/{id}/duplicate
pub async fn duplicate_module(
    State(state): State<AppState>,
    Path((training_id, id)): Path<(TrainingId, ModuleId)>,
) -> AppResult<impl IntoResponse> {
    let session = state.session(training_id).await?;
    let result = session.duplicate_module(id)?;
    let status = if result.is_some() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    let data = MutationResponse {
        result,
        session: session.view()?,
    };
    Ok((status, Json(DataResponse { data })))
}

/// PUT /api/v1/sessions/{training_id}/order
///
/// `result` lists the `order_index` writes the reorder produced.
pub async fn reorder(
    State(state): State<AppState>,
    Path(training_id): Path<TrainingId>,
    Json(input): Json<ReorderRequest>,
) -> AppResult<impl IntoResponse> {
    let session = state.session(training_id).await?;
    let result = session.reorder_siblings(input.parent_id, &input.ordered_ids)?;
    let data = MutationResponse {
        result,
        session: session.view()?,
    };
    Ok(Json(DataResponse { data }))
}

/// PUT /api/v1/sessions/{training_id}/order/drag
///
/// Moves `active_id` to `over_id`'s slot. Ids in different sibling groups
/// produce an empty `result` and leave the session untouched.
pub async fn drag(
    State(state): State<AppState>,
    Path(training_id): Path<TrainingId>,
    Json(input): Json<DragRequest>,
) -> AppResult<impl IntoResponse> {
    let session = state.session(training_id).await?;
    let result = session.drag_module(input.active_id, input.over_id)?;
    let data = MutationResponse {
        result,
        session: session.view()?,
    };
    Ok(Json(DataResponse { data }))
}

/// PUT /api/v1/sessions/{training_id}/selection
pub async fn select(
    State(state): State<AppState>,
    Path(training_id): Path<TrainingId>,
    Json(input): Json<SelectRequest>,
) -> AppResult<impl IntoResponse> {
    let session = state.session(training_id).await?;
    let result = session.select(input.module_id)?;
    let data = MutationResponse {
        result,
        session: session.view()?,
    };
    Ok(Json(DataResponse { data }))
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

/// GET /api/v1/sessions/{training_id}/changes
pub async fn changes(
    State(state): State<AppState>,
    Path(training_id): Path<TrainingId>,
) -> AppResult<impl IntoResponse> {
    let changes = state.session(training_id).await?.pending_changes()?;
    Ok(Json(DataResponse { data: changes }))
}

/// POST /api/v1/sessions/{training_id}/save
///
/// 409 while another save for the same session is still in flight.
pub async fn save(
    State(state): State<AppState>,
    Path(training_id): Path<TrainingId>,
) -> AppResult<impl IntoResponse> {
    let session = state.session(training_id).await?;
    let result = session.save().await?;
    let data = MutationResponse {
        result,
        session: session.view()?,
    };
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/sessions/{training_id}/discard
pub async fn discard(
    State(state): State<AppState>,
    Path(training_id): Path<TrainingId>,
) -> AppResult<impl IntoResponse> {
    let session = state.session(training_id).await?;
    session.discard()?;
    Ok(Json(DataResponse {
        data: session.view()?,
    }))
}
