//! Route definitions for the `/documents` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::documents;
use crate::state::AppState;

/// Routes mounted at `/documents`.
///
/// ```text
/// GET    /{key}                 -> fetch_document
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{key}", get(documents::fetch_document))
}
