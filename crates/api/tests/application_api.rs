//! HTTP-level tests for the `/applications` endpoints.

mod common;

use axum::http::StatusCode;
use common::*;
use sqlx::PgPool;

const GROOM: &str = "111122223333";
const BRIDE: &str = "444455556666";

async fn submit(pool: &PgPool, token: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    let app = build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/v1/applications", token, body).await;
    let status = response.status();
    (status, body_json(response).await)
}

async fn act(
    pool: &PgPool,
    id: i64,
    token: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let app = build_test_app(pool.clone());
    let uri = format!("/api/v1/applications/{id}/actions");
    let response = post_json_auth(app, &uri, token, body).await;
    let status = response.status();
    (status, body_json(response).await)
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn draft_then_submit(pool: PgPool) {
    let token = citizen(GROOM, 1);
    let app = build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/applications?draft=true",
        &token,
        application_body("MC/1", GROOM, BRIDE),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["record"]["stage"], 0);
    assert_eq!(json["data"]["record"]["status"], "draft");

    let (status, json) = submit(&pool, &token, application_body("MC/1", GROOM, BRIDE)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["disposition"], "advanced");
    assert_eq!(json["data"]["record"]["stage"], 1);
    assert_eq!(json["data"]["event"]["event_type"], "APPLICATION_SUBMITTED");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_couple_is_409(pool: PgPool) {
    let (status, _) = submit(&pool, &citizen(GROOM, 1), application_body("MC/2", GROOM, BRIDE)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, json) = submit(&pool, &citizen(BRIDE, 2), application_body("MC/3", BRIDE, GROOM)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn rejected_application_refuses_actions(pool: PgPool) {
    let (_, json) = submit(&pool, &citizen(GROOM, 1), application_body("MC/4", GROOM, BRIDE)).await;
    let id = json["data"]["record"]["id"].as_i64().unwrap();

    let (status, json) = act(&pool, id, &verifying_officer(), action("reject", "Tribal Officer")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["record"]["status"], "rejected");
    assert_eq!(json["data"]["event"]["event_type"], "TO_REJECTED");

    let (status, json) = act(&pool, id, &verifying_officer(), action("approve", "Tribal Officer")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "WRONG_STAGE");

    // The applicant still sees its application.
    let app = build_test_app(pool);
    let response = get_auth(app, &format!("/api/v1/applications/{id}"), &citizen(GROOM, 1)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn citizen_timeline_of_other_application_is_403(pool: PgPool) {
    let (_, json) = submit(&pool, &citizen(GROOM, 1), application_body("MC/5", GROOM, BRIDE)).await;
    let id = json["data"]["record"]["id"].as_i64().unwrap();

    let app = build_test_app(pool);
    let uri = format!("/api/v1/applications/{id}/timeline");
    let response = get_auth(app, &uri, &citizen("999900001111", 9)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
