//! Route definitions for the `/treasury` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::treasury;
use crate::state::AppState;

/// Routes mounted at `/treasury`.
///
/// ```text
/// POST   /credit                          -> credit
/// GET    /{state_ut}/{district}/balance   -> balance
/// GET    /{state_ut}/{district}/history   -> history
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/credit", post(treasury::credit))
        .route("/{state_ut}/{district}/balance", get(treasury::balance))
        .route("/{state_ut}/{district}/history", get(treasury::history))
}
