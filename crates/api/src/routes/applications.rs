//! Route definitions for the `/applications` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use super::UPLOAD_BODY_LIMIT;
use crate::handlers::applications;
use crate::state::AppState;

/// Routes mounted at `/applications`.
///
/// ```text
/// POST   /                      -> submit_application
/// GET    /                      -> list_applications
/// GET    /{id}                  -> get_application
/// GET    /{id}/timeline         -> application_timeline
/// GET    /{id}/integrity        -> application_integrity
/// POST   /{id}/actions          -> act_on_application
/// POST   /{id}/documents        -> upload_application_document
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(applications::submit_application).get(applications::list_applications),
        )
        .route("/{id}", get(applications::get_application))
        .route("/{id}/timeline", get(applications::application_timeline))
        .route("/{id}/integrity", get(applications::application_integrity))
        .route("/{id}/actions", post(applications::act_on_application))
        .route(
            "/{id}/documents",
            post(applications::upload_application_document)
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
}
