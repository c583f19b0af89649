//! Document upload parsing and the `/documents` download endpoint.

use axum::extract::{Multipart, Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::IntoResponse;
use dbt_core::actor::ActorClaims;
use dbt_core::stages::WorkflowKind;
use dbt_core::types::DbId;
use dbt_workflow::documents::{self, StoredDocument, Upload};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthActor;
use crate::state::AppState;

/// Read the `doc_type` and `file` fields of an upload form and attach the
/// file to the record.
pub(crate) async fn attach_upload(
    state: &AppState,
    actor: &ActorClaims,
    workflow: WorkflowKind,
    record_id: DbId,
    mut multipart: Multipart,
) -> AppResult<StoredDocument> {
    let mut doc_type = None;
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "doc_type" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                doc_type = Some(text);
            }
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                file = Some((filename, bytes));
            }
            _ => {}
        }
    }

    let doc_type =
        doc_type.ok_or_else(|| AppError::BadRequest("Missing 'doc_type' field".into()))?;
    let (filename, bytes) =
        file.ok_or_else(|| AppError::BadRequest("Missing 'file' field".into()))?;

    let stored = documents::attach(
        &state.pool,
        state.documents.as_ref(),
        actor,
        workflow,
        record_id,
        Upload {
            doc_type: &doc_type,
            filename: &filename,
            bytes: &bytes,
        },
    )
    .await?;
    Ok(stored)
}

/// GET /api/v1/documents/{key}
///
/// Stream a stored document back with its content type.
pub async fn fetch_document(
    State(state): State<AppState>,
    AuthActor(actor): AuthActor,
    Path(key): Path<String>,
) -> AppResult<impl IntoResponse> {
    let document =
        documents::fetch(&state.pool, state.documents.as_ref(), &actor, &key).await?;
    let disposition = format!("inline; filename=\"{}\"", document.key);
    Ok((
        [
            (CONTENT_TYPE, document.mime_type.to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        document.bytes,
    ))
}
