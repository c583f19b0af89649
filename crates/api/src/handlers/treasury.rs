//! Handlers for the `/treasury` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use dbt_core::treasury::Jurisdiction;
use dbt_core::types::Amount;
use dbt_db::models::treasury::{CreditRequest, TreasuryEntry};
use dbt_workflow::treasury;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::auth::AuthActor;
use crate::response::DataResponse;
use crate::state::AppState;

/// Current balance of one jurisdiction.
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub state_ut: String,
    pub district: String,
    pub balance: Amount,
}

/// Pagination for the ledger history.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// POST /api/v1/treasury/credit
pub async fn credit(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Json(input): Json<CreditRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<TreasuryEntry>>)> {
    let entry = treasury::credit(&state.pool, &actor, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: entry })))
}

/// GET /api/v1/treasury/{state_ut}/{district}/balance
pub async fn balance(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Path((state_ut, district)): Path<(String, String)>,
) -> AppResult<Json<DataResponse<BalanceResponse>>> {
    let jurisdiction = Jurisdiction::new(&state_ut, &district);
    let balance = treasury::balance(&state.pool, &actor, &jurisdiction).await?;
    Ok(Json(DataResponse {
        data: BalanceResponse {
            state_ut,
            district,
            balance,
        },
    }))
}

/// GET /api/v1/treasury/{state_ut}/{district}/history
pub async fn history(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Path((state_ut, district)): Path<(String, String)>,
    Query(params): Query<HistoryParams>,
) -> AppResult<Json<DataResponse<Vec<TreasuryEntry>>>> {
    let jurisdiction = Jurisdiction::new(state_ut, district);
    let entries =
        treasury::history(&state.pool, &actor, &jurisdiction, params.limit, params.offset)
            .await?;
    Ok(Json(DataResponse { data: entries }))
}
