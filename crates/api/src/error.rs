//! HTTP error mapping.
//!
//! Every failure leaves the API as `{ "error": <message>, "code": <CODE> }`.
//! Database, filesystem and internal details are logged here and replaced by
//! a generic message in the body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use dbt_core::error::CoreError;
use dbt_workflow::WorkflowError;
use serde_json::json;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A backing service other than the database is down.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Malformed request that never reached the workflow (e.g. a broken
    /// multipart body).
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::Core(core) => Self::Core(core),
            WorkflowError::StoreUnavailable(db) => Self::Database(db),
            WorkflowError::DocumentStoreUnavailable(io) => {
                tracing::error!(error = %io, "Document store failure");
                Self::Unavailable("Document store is unavailable".into())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::Core(core) => core_error_parts(core),
            AppError::Database(err) => classify_sqlx_error(&err),
            AppError::Unavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE", msg)
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        (status, axum::Json(json!({ "error": message, "code": code }))).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        INTERNAL_MESSAGE.to_string(),
    )
}

/// Status and code per workflow error. Structured variants use their display
/// text; free-text variants pass the message through unprefixed.
fn core_error_parts(core: CoreError) -> (StatusCode, &'static str, String) {
    match core {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg),
        ref err @ CoreError::RoleMismatch { .. } => {
            (StatusCode::FORBIDDEN, "ROLE_MISMATCH", err.to_string())
        }
        ref err @ CoreError::RoleNotAllowedAtStage { .. } => (
            StatusCode::FORBIDDEN,
            "ROLE_NOT_ALLOWED_AT_STAGE",
            err.to_string(),
        ),
        ref err @ CoreError::WrongStage { .. } => {
            (StatusCode::BAD_REQUEST, "WRONG_STAGE", err.to_string())
        }
        ref err @ CoreError::InsufficientFunds { .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "INSUFFICIENT_FUNDS",
            err.to_string(),
        ),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            internal()
        }
    }
}

/// Unique violations on `uq_*` constraints map to 409 and lost connections
/// to 503. Anything else is a 500.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err)
            if db_err.code().as_deref() == Some("23505")
                && db_err.constraint().is_some_and(|c| c.starts_with("uq_")) =>
        {
            let constraint = db_err.constraint().unwrap_or_default();
            (
                StatusCode::CONFLICT,
                "CONFLICT",
                format!("Duplicate value violates unique constraint: {constraint}"),
            )
        }
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => {
            tracing::error!(error = %err, "Database unreachable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                "The record store is unavailable".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}
