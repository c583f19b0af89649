//! Tests for `AppError` → HTTP response mapping.
//!
//! These call `IntoResponse` directly; no server or database is involved.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use dbt_api::error::AppError;
use dbt_core::error::CoreError;
use dbt_core::roles::Role;
use dbt_workflow::WorkflowError;
use http_body_util::BodyExt;

async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "AtrocityCase",
        id: 42,
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "AtrocityCase with id 42 not found");
}

#[tokio::test]
async fn forbidden_family_returns_403() {
    let cases = [
        (CoreError::Forbidden("outside jurisdiction".into()), "FORBIDDEN"),
        (
            CoreError::RoleMismatch {
                claimed: Role::StateOfficer,
                verified: Role::VerifyingOfficer,
            },
            "ROLE_MISMATCH",
        ),
        (
            CoreError::RoleNotAllowedAtStage {
                role: Role::StateOfficer,
                stage: 1,
            },
            "ROLE_NOT_ALLOWED_AT_STAGE",
        ),
    ];
    for (core, code) in cases {
        let (status, json) = error_to_response(AppError::Core(core)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["code"], code);
    }
}

#[tokio::test]
async fn wrong_stage_returns_400() {
    let err = AppError::Core(CoreError::WrongStage {
        actual: 2,
        expected: vec![4],
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "WRONG_STAGE");
}

#[tokio::test]
async fn insufficient_funds_returns_422() {
    let err = AppError::Core(CoreError::InsufficientFunds {
        available: 0,
        requested: 25_000,
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["code"], "INSUFFICIENT_FUNDS");
    assert!(json["error"].as_str().unwrap().contains("25000"));
}

#[tokio::test]
async fn conflict_error_returns_409() {
    let err = AppError::Core(CoreError::Conflict("duplicate application".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
    assert_eq!(json["error"], "duplicate application");
}

#[tokio::test]
async fn validation_error_returns_400() {
    let err = AppError::Core(CoreError::Validation("fir_no is required".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "fir_no is required");
}

#[tokio::test]
async fn unauthorized_error_returns_401() {
    let err = AppError::Core(CoreError::Unauthorized("no token provided".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn document_store_failure_returns_503() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only volume");
    let err = AppError::from(WorkflowError::DocumentStoreUnavailable(io));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], "SERVICE_UNAVAILABLE");
    assert!(!json.to_string().contains("read-only volume"));
}

#[tokio::test]
async fn pool_timeout_returns_503() {
    let err = AppError::from(WorkflowError::StoreUnavailable(sqlx::Error::PoolTimedOut));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], "SERVICE_UNAVAILABLE");
}

#[tokio::test]
async fn internal_error_returns_500_and_sanitizes_message() {
    let err = AppError::InternalError("secret database credentials leaked".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert!(!json.to_string().contains("secret"));
    assert_eq!(json["error"], "An internal error occurred");
}
