pub mod health;
pub mod reference;
pub mod sessions;
pub mod wizards;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /trainings                                       list trainings
///
/// /sessions/{training_id}                          load (POST), view (GET), close (DELETE)
/// /sessions/{training_id}/modules                  add module (POST)
/// /sessions/{training_id}/modules/{id}             update (PATCH), delete (DELETE)
/// /sessions/{training_id}/modules/{id}/duplicate   duplicate (POST)
/// /sessions/{training_id}/order                    reorder siblings (PUT)
/// /sessions/{training_id}/order/drag               drop one module onto another (PUT)
/// /sessions/{training_id}/selection                select (PUT)
/// /sessions/{training_id}/changes                  pending changes (GET)
/// /sessions/{training_id}/save                     save (POST)
/// /sessions/{training_id}/discard                  discard (POST)
///
/// /step-types                                      step type descriptors
/// /catalogs/{kind}                                 games | skills | badges
///
/// /wizards                                         start (POST)
/// /wizards/{id}                                    view (GET), cancel (DELETE)
/// /wizards/{id}/draft                              update draft (PATCH)
/// /wizards/{id}/next                               advance (POST)
/// /wizards/{id}/back                               go back (POST)
/// /wizards/{id}/submit                             create the training (POST)
/// /wizards/{id}/thumbnail                          upload (POST), remove (DELETE)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(reference::router())
        .nest("/sessions", sessions::router())
        .nest("/wizards", wizards::router())
}
