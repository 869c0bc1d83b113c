//! Handlers for the `/wizards` resource.
//!
//! A wizard stays registered until it is cancelled, backed out of, or
//! submitted successfully.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use questline_core::error::CoreError;
use questline_core::wizard::{BackOutcome, DraftPatch, WizardStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response DTOs
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct WizardResponse {
    pub wizard_id: Uuid,
    pub status: WizardStatus,
}

#[derive(Debug, Serialize)]
pub struct BackResponse {
    /// True when going back from the first step closed the wizard.
    pub cancelled: bool,
    pub status: WizardStatus,
}

#[derive(Debug, Serialize)]
pub struct ThumbnailResponse {
    pub url: String,
    pub status: WizardStatus,
}

#[derive(Debug, Deserialize)]
pub struct UploadParams {
    pub file_name: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/wizards
pub async fn start(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let wizard = state.start_wizard().await;
    tracing::info!(wizard_id = %wizard.id(), "Wizard started");
    let data = WizardResponse {
        wizard_id: wizard.id(),
        status: wizard.status()?,
    };
    Ok((StatusCode::CREATED, Json(DataResponse { data })))
}

/// GET /api/v1/wizards/{id}
pub async fn view(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let status = state.wizard(id).await?.status()?;
    Ok(Json(DataResponse {
        data: WizardResponse {
            wizard_id: id,
            status,
        },
    }))
}

/// PATCH /api/v1/wizards/{id}/draft
pub async fn update_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<DraftPatch>,
) -> AppResult<impl IntoResponse> {
    let status = state.wizard(id).await?.update_draft(&patch)?;
    Ok(Json(DataResponse { data: status }))
}

/// POST /api/v1/wizards/{id}/next
pub async fn next(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let status = state.wizard(id).await?.next()?;
    Ok(Json(DataResponse { data: status }))
}

/// POST /api/v1/wizards/{id}/back
pub async fn back(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let wizard = state.wizard(id).await?;
    let outcome = wizard.back().await?;
    let cancelled = outcome == BackOutcome::Cancelled;
    if cancelled {
        state.close_wizard(id).await;
    }
    let data = BackResponse {
        cancelled,
        status: wizard.status()?,
    };
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/wizards/{id}/submit
pub async fn submit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let training = state.wizard(id).await?.submit().await?;
    state.close_wizard(id).await;
    Ok((StatusCode::CREATED, Json(DataResponse { data: training })))
}

/// POST /api/v1/wizards/{id}/thumbnail?file_name=...
///
/// The request body is the raw image.
pub async fn upload_thumbnail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    if body.is_empty() {
        return Err(AppError::BadRequest("Thumbnail body is empty".into()));
    }
    let wizard = state.wizard(id).await?;
    let url = wizard.upload_thumbnail(&params.file_name, &body).await?;
    let data = ThumbnailResponse {
        url,
        status: wizard.status()?,
    };
    Ok((StatusCode::CREATED, Json(DataResponse { data })))
}

/// DELETE /api/v1/wizards/{id}/thumbnail
pub async fn remove_thumbnail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let status = state.wizard(id).await?.remove_thumbnail().await?;
    Ok(Json(DataResponse { data: status }))
}

/// DELETE /api/v1/wizards/{id}
pub async fn cancel(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<StatusCode> {
    let wizard = state
        .close_wizard(id)
        .await
        .ok_or(CoreError::NotFound {
            entity: "Wizard",
            id,
        })?;
    wizard.cancel().await?;
    Ok(StatusCode::NO_CONTENT)
}
