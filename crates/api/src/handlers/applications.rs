//! Handlers for the `/applications` resource.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use dbt_core::stages::WorkflowKind;
use dbt_core::types::DbId;
use dbt_db::models::application::{
    ApplicationListQuery, ApplicationSubmission, MarriageApplication,
};
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

/// POST /api/v1/applications
///
/// Create, complete or resubmit an application. Returns 201 when an
/// application was created.
pub async fn submit_application(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Query(params): Query<SubmitParams>,
    Json(input): Json<ApplicationSubmission>,
) -> AppResult<(
    StatusCode,
    Json<DataResponse<IntakeOutcome<MarriageApplication>>>,
)> {
    let outcome = intake::submit_application(
        &state.pool,
        state.registry.as_ref(),
        &state.settings,
        &actor,
        input,
        params.draft,
    )
    .await?;
    let status = match outcome.disposition {
        Disposition::Created => StatusCode::CREATED,
        Disposition::Advanced | Disposition::Unchanged => StatusCode::OK,
    };
    Ok((status, Json(DataResponse { data: outcome })))
}

/// GET /api/v1/applications
pub async fn list_applications(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Query(query): Query<ApplicationListQuery>,
) -> AppResult<Json<DataResponse<Vec<MarriageApplication>>>> {
    let applications = engine::list_applications(&state.pool, &actor, &query).await?;
    Ok(Json(DataResponse { data: applications }))
}

/// GET /api/v1/applications/{id}
pub async fn get_application(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<MarriageApplication>>> {
    let application = engine::get_application(&state.pool, &actor, id).await?;
    Ok(Json(DataResponse { data: application }))
}

/// GET /api/v1/applications/{id}/timeline
pub async fn application_timeline(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<AuditEvent>>>> {
    let events = engine::application_timeline(&state.pool, &actor, id).await?;
    Ok(Json(DataResponse { data: events }))
}

/// GET /api/v1/applications/{id}/integrity
pub async fn application_integrity(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<IntegrityReport>>> {
    engine::get_application(&state.pool, &actor, id).await?;
    let broken = verify_record(&state.pool, EventLog::Application, id).await?;
    if let Some(event_id) = broken {
        tracing::error!(application_id = id, event_id, "Audit chain broken");
    }
    Ok(Json(DataResponse {
        data: IntegrityReport::new(id, broken),
    }))
}

/// POST /api/v1/applications/{id}/actions
pub async fn act_on_application(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Path(id): Path<DbId>,
    Json(request): Json<ActionRequest>,
) -> AppResult<Json<DataResponse<TransitionOutcome<MarriageApplication>>>> {
    let outcome =
        engine::transition_application(&state.pool, &state.settings, &actor, id, &request)
            .await?;
    Ok(Json(DataResponse { data: outcome }))
}

/// POST /api/v1/applications/{id}/documents
pub async fn upload_application_document(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<StoredDocument>>)> {
    let stored = attach_upload(&state, &actor, WorkflowKind::Application, id, multipart).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: stored })))
}
