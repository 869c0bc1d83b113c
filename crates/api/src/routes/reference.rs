//! Route definitions for read-only reference data.

use axum::routing::get;
use axum::Router;

use crate::handlers::reference;
use crate::state::AppState;

/// Routes mounted at the `/api/v1` root.
///
/// ```text
/// GET    /trainings                         -> list_trainings
/// GET    /step-types                        -> list_step_types
/// GET    /catalogs/{kind}                   -> list_catalog
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/trainings", get(reference::list_trainings))
        .route("/step-types", get(reference::list_step_types))
        .route("/catalogs/{kind}", get(reference::list_catalog))
}
