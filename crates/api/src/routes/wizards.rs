//! Route definitions for the `/wizards` resource.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::wizards;
use crate::state::AppState;

/// Routes mounted at `/wizards`.
///
/// ```text
/// POST   /                      -> start
/// GET    /{id}                  -> view
/// DELETE /{id}                  -> cancel
/// PATCH  /{id}/draft            -> update_draft
/// POST   /{id}/next             -> next
/// POST   /{id}/back             -> back
/// POST   /{id}/submit           -> submit
/// POST   /{id}/thumbnail        -> upload_thumbnail
/// DELETE /{id}/thumbnail        -> remove_thumbnail
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(wizards::start))
        .route("/{id}", get(wizards::view).delete(wizards::cancel))
        .route("/{id}/draft", patch(wizards::update_draft))
        .route("/{id}/next", post(wizards::next))
        .route("/{id}/back", post(wizards::back))
        .route("/{id}/submit", post(wizards::submit))
        .route(
            "/{id}/thumbnail",
            post(wizards::upload_thumbnail).delete(wizards::remove_thumbnail),
        )
}
