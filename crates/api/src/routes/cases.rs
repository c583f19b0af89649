//! Route definitions for the `/cases` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use super::UPLOAD_BODY_LIMIT;
use crate::handlers::cases;
use crate::state::AppState;

/// Routes mounted at `/cases`.
///
/// ```text
/// POST   /                      -> submit_case
/// GET    /                      -> list_cases
/// GET    /{id}                  -> get_case
/// GET    /{id}/timeline         -> case_timeline
/// GET    /{id}/integrity        -> case_integrity
/// POST   /{id}/actions          -> act_on_case
/// POST   /{id}/documents        -> upload_case_document
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(cases::submit_case).get(cases::list_cases))
        .route("/{id}", get(cases::get_case))
        .route("/{id}/timeline", get(cases::case_timeline))
        .route("/{id}/integrity", get(cases::case_integrity))
        .route("/{id}/actions", post(cases::act_on_case))
        .route(
            "/{id}/documents",
            post(cases::upload_case_document).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
}
