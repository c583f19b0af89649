pub mod applications;
pub mod cases;
pub mod documents;
pub mod health;
pub mod treasury;

use axum::Router;
use dbt_core::documents::MAX_DOCUMENT_BYTES;

use crate::state::AppState;

/// Body limit for multipart uploads: the largest document plus form overhead.
pub(crate) const UPLOAD_BODY_LIMIT: usize = MAX_DOCUMENT_BYTES + 64 * 1024;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /cases                                 submit (?draft=true), list
/// /cases/{id}                            get
/// /cases/{id}/timeline                   audit events, oldest first
/// /cases/{id}/integrity                  re-verify the audit hash chain
/// /cases/{id}/actions                    approve, correct, release, ...
/// /cases/{id}/documents                  multipart upload
///
/// /applications                          submit (?draft=true), list
/// /applications/{id}                     get
/// /applications/{id}/timeline            audit events, oldest first
/// /applications/{id}/integrity           re-verify the audit hash chain
/// /applications/{id}/actions             approve, correct, reject, release
/// /applications/{id}/documents           multipart upload
///
/// /documents/{key}                       download
///
/// /treasury/credit                       fund a district
/// /treasury/{state_ut}/{district}/balance
/// /treasury/{state_ut}/{district}/history
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/cases", cases::router())
        .nest("/applications", applications::router())
        .nest("/documents", documents::router())
        .nest("/treasury", treasury::router())
}
