#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use dbt_api::auth::jwt::{Claims, JwtConfig};
use dbt_api::config::ServerConfig;
use dbt_api::router::build_app_router;
use dbt_api::state::AppState;
use dbt_core::actor::IdentityClaims;
use dbt_core::settings::WorkflowSettings;
use dbt_workflow::documents::LocalDocumentStore;
use dbt_workflow::registry::StaticRegistry;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use sqlx::PgPool;
use tower::ServiceExt;

pub const STATE: &str = "Kerala";
pub const DISTRICT: &str = "Wayanad";

/// Build a test `ServerConfig` with safe defaults.
///
/// Each call gets its own upload directory under the system temp dir.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        upload_dir: std::env::temp_dir().join(format!("dbt-api-test-{}", uuid::Uuid::new_v4())),
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
        },
    }
}

/// Build the full application router over the given pool, with an empty
/// registry and default workflow settings.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        settings: Arc::new(WorkflowSettings::default()),
        documents: Arc::new(LocalDocumentStore::new(config.upload_dir.clone())),
        registry: Arc::new(StaticRegistry::default()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Identities
// ---------------------------------------------------------------------------

/// Sign a 15-minute HS256 token for `identity`, as the identity provider
/// would.
pub fn token_for(identity: &IdentityClaims) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: identity.subject.clone(),
        role: identity.role.clone(),
        state_ut: identity.state_ut.clone(),
        district: identity.district.clone(),
        sub_unit: identity.sub_unit.clone(),
        person_id: identity.person_id.clone(),
        owner_id: identity.owner_id,
        exp: now + 15 * 60,
        iat: now,
        jti: uuid::Uuid::new_v4().to_string(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(test_config().jwt.secret.as_bytes()),
    )
    .expect("token generation should succeed")
}

fn officer(subject: &str, role: &str, district: Option<&str>) -> String {
    token_for(&IdentityClaims {
        subject: subject.into(),
        role: role.into(),
        state_ut: Some(STATE.into()),
        district: district.map(Into::into),
        ..Default::default()
    })
}

pub fn filing_officer() -> String {
    token_for(&IdentityClaims {
        subject: "io-1".into(),
        role: "Investigation Officer".into(),
        state_ut: Some(STATE.into()),
        district: Some(DISTRICT.into()),
        sub_unit: Some("Kalpetta PS".into()),
        ..Default::default()
    })
}

pub fn verifying_officer() -> String {
    officer("to-1", "Tribal Officer", Some(DISTRICT))
}

pub fn district_officer() -> String {
    officer("dm-1", "District Collector", Some(DISTRICT))
}

pub fn state_officer() -> String {
    officer("sno-1", "State Nodal Officer", None)
}

pub fn fund_officer() -> String {
    officer("pfms-1", "PFMS Officer", None)
}

pub fn citizen(person_id: &str, owner_id: i64) -> String {
    token_for(&IdentityClaims {
        subject: format!("citizen-{owner_id}"),
        role: "Citizen".into(),
        state_ut: Some(STATE.into()),
        district: Some(DISTRICT.into()),
        person_id: Some(person_id.into()),
        owner_id: Some(owner_id),
        ..Default::default()
    })
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::get(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::post(uri)
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// POST a multipart form with a `doc_type` field and one file.
pub async fn post_document(
    app: Router,
    uri: &str,
    token: &str,
    doc_type: &str,
    filename: &str,
    bytes: &[u8],
) -> Response<Body> {
    let boundary = "dbt-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"doc_type\"\r\n\r\n{doc_type}\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let request = Request::post(uri)
        .header("authorization", format!("Bearer {token}"))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

pub fn case_body(fir_no: &str) -> serde_json::Value {
    serde_json::json!({
        "fir_no": fir_no,
        "victim_name": "Ramesh",
        "victim_aadhaar": "123412341234",
        "bank_ifsc": "SBIN0001234",
    })
}

pub fn application_body(certificate_no: &str, groom: &str, bride: &str) -> serde_json::Value {
    serde_json::json!({
        "certificate_no": certificate_no,
        "groom_person_id": groom,
        "groom_name": "Arun",
        "groom_dob": "1995-03-01",
        "bride_person_id": bride,
        "bride_name": "Meera",
        "bride_dob": "1998-07-09",
        "marriage_date": "2024-05-01",
        "joint_account_no": "000111222333",
        "joint_ifsc": "SBIN0001234",
    })
}

pub fn action(action: &str, role: &str) -> serde_json::Value {
    serde_json::json!({ "action": action, "claimed_role": role })
}
