//! `GET /health`: liveness plus a database round trip.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
}

/// 200 with `ok`, or 503 with `degraded` when the workflow database does not
/// answer, so load balancers stop routing here.
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (code, status, db_healthy) = match dbt_db::health_check(&state.pool).await {
        Ok(()) => (StatusCode::OK, "ok", true),
        Err(err) => {
            tracing::warn!(error = %err, "Health check could not reach the database");
            (StatusCode::SERVICE_UNAVAILABLE, "degraded", false)
        }
    };

    let body = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
    };
    (code, Json(body))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
