//! Token handling at the HTTP boundary.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, get_auth, token_for, STATE};
use dbt_core::actor::IdentityClaims;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_token_is_401(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/cases").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn garbage_token_is_401(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/cases", "not-a-jwt").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_role_is_403(pool: PgPool) {
    let token = token_for(&IdentityClaims {
        subject: "sp-1".into(),
        role: "Superintendent of Police".into(),
        state_ut: Some(STATE.into()),
        ..Default::default()
    });
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/cases", &token).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn officer_without_district_is_401(pool: PgPool) {
    let token = token_for(&IdentityClaims {
        subject: "to-1".into(),
        role: "Tribal Officer".into(),
        state_ut: Some(STATE.into()),
        ..Default::default()
    });
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/cases", &token).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn valid_officer_lists_cases(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/cases", &common::verifying_officer()).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"], serde_json::json!([]));
}
