//! Handlers for the `/cases` resource.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use dbt_core::stages::WorkflowKind;
use dbt_core::types::DbId;
use dbt_db::models::case::{AtrocityCase, CaseListQuery, CaseSubmission};
use dbt_db::models::event::{AuditEvent, EventLog};
use dbt_workflow::audit::verify_record;
use dbt_workflow::documents::StoredDocument;
use dbt_workflow::engine::{self, ActionRequest, TransitionOutcome};
use dbt_workflow::intake::{self, Disposition, IntakeOutcome};

use crate::error::AppResult;
use crate::handlers::documents::attach_upload;
use crate::handlers::{IntegrityReport, SubmitParams};
use crate::middleware::auth::AuthActor;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/cases
///
/// File a case, or submit a previously drafted one. Returns 201 when a case
/// was created and 200 when an existing one was advanced or left as is.
pub async fn submit_case(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Query(params): Query<SubmitParams>,
    Json(input): Json<CaseSubmission>,
) -> AppResult<(StatusCode, Json<DataResponse<IntakeOutcome<AtrocityCase>>>)> {
    let outcome =
        intake::submit_case(&state.pool, state.registry.as_ref(), &actor, input, params.draft)
            .await?;
    let status = match outcome.disposition {
        Disposition::Created => StatusCode::CREATED,
        Disposition::Advanced | Disposition::Unchanged => StatusCode::OK,
    };
    Ok((status, Json(DataResponse { data: outcome })))
}

/// GET /api/v1/cases
pub async fn list_cases(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Query(query): Query<CaseListQuery>,
) -> AppResult<Json<DataResponse<Vec<AtrocityCase>>>> {
    let cases = engine::list_cases(&state.pool, &actor, &query).await?;
    Ok(Json(DataResponse { data: cases }))
}

/// GET /api/v1/cases/{id}
pub async fn get_case(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<AtrocityCase>>> {
    let case = engine::get_case(&state.pool, &actor, id).await?;
    Ok(Json(DataResponse { data: case }))
}

/// GET /api/v1/cases/{id}/timeline
pub async fn case_timeline(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<AuditEvent>>>> {
    let events = engine::case_timeline(&state.pool, &actor, id).await?;
    Ok(Json(DataResponse { data: events }))
}

/// GET /api/v1/cases/{id}/integrity
pub async fn case_integrity(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<IntegrityReport>>> {
    engine::get_case(&state.pool, &actor, id).await?;
    let broken = verify_record(&state.pool, EventLog::Case, id).await?;
    if let Some(event_id) = broken {
        tracing::error!(case_id = id, event_id, "Audit chain broken");
    }
    Ok(Json(DataResponse {
        data: IntegrityReport::new(id, broken),
    }))
}

/// POST /api/v1/cases/{id}/actions
pub async fn act_on_case(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Path(id): Path<DbId>,
    Json(request): Json<ActionRequest>,
) -> AppResult<Json<DataResponse<TransitionOutcome<AtrocityCase>>>> {
    let outcome =
        engine::transition_case(&state.pool, &state.settings, &actor, id, &request).await?;
    Ok(Json(DataResponse { data: outcome }))
}

/// POST /api/v1/cases/{id}/documents
///
/// Multipart form with a `doc_type` text field and a `file` field.
pub async fn upload_case_document(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<StoredDocument>>)> {
    let stored = attach_upload(&state, &actor, WorkflowKind::Case, id, multipart).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: stored })))
}
