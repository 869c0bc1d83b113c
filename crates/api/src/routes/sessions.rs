//! Route definitions for the `/sessions` resource.

use axum::routing::{get, patch, post, put};
use axum::Router;

use crate::handlers::sessions;
use crate::state::AppState;

/// Routes mounted at `/sessions`.
///
/// ```text
/// POST   /{training_id}                         -> open
/// GET    /{training_id}                         -> view
/// DELETE /{training_id}                         -> close
/// POST   /{training_id}/modules                 -> add_module
/// PATCH  /{training_id}/modules/{id}            -> update_module
/// DELETE /{training_id}/modules/{id}            -> delete_module
/// POST   /{training_id}/modules/{id}/duplicate  -> duplicate_module
/// PUT    /{training_id}/order                   -> reorder
/// PUT    /{training_id}/order/drag              -> drag
/// PUT    /{training_id}/selection               -> select
/// GET    /{training_id}/changes                 -> changes
/// POST   /{training_id}/save                    -> save
/// POST   /{training_id}/discard                 -> discard
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{training_id}",
            post(sessions::open)
                .get(sessions::view)
                .delete(sessions::close),
        )
        .route("/{training_id}/modules", post(sessions::add_module))
        .route(
            "/{training_id}/modules/{id}",
            patch(sessions::update_module).delete(sessions::delete_module),
        )
        .route(
            "/{training_id}/modules/{id}/duplicate",
            post(sessions::duplicate_module),
        )
        .route("/{training_id}/order", put(sessions::reorder))
        .route("/{training_id}/order/drag", put(sessions::drag))
        .route("/{training_id}/selection", put(sessions::select))
        .route("/{training_id}/changes", get(sessions::changes))
        .route("/{training_id}/save", post(sessions::save))
        .route("/{training_id}/discard", post(sessions::discard))
}
