//! Supporting documents: storage backend and attach/fetch operations.

use std::path::PathBuf;

use async_trait::async_trait;
use dbt_core::actor::ActorClaims;
use dbt_core::documents::{
    document_key, mime_type, parse_document_key, validate_upload, DocumentType,
};
use dbt_core::error::CoreError;
use dbt_core::jurisdiction::authorize;
use dbt_core::stages::WorkflowKind;
use dbt_core::types::DbId;
use dbt_db::repositories::{ApplicationRepo, CaseRepo};
use serde::Serialize;
use sqlx::PgPool;

use crate::error::WorkflowResult;

/// Byte storage addressed by document key.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn put(&self, key: &str, bytes: &[u8]) -> WorkflowResult<()>;

    /// `None` when nothing is stored under `key`.
    async fn get(&self, key: &str) -> WorkflowResult<Option<Vec<u8>>>;
}

/// Stores documents as flat files under one directory.
#[derive(Debug, Clone)]
pub struct LocalDocumentStore {
    root: PathBuf,
}

impl LocalDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> WorkflowResult<PathBuf> {
        // Keys are generated, but never let one escape the root.
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(CoreError::Validation(format!("Invalid document key '{key}'")).into());
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl DocumentStore for LocalDocumentStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> WorkflowResult<()> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(key, size = bytes.len(), "Document stored");
        Ok(())
    }

    async fn get(&self, key: &str) -> WorkflowResult<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Result of attaching a document to a record.
#[derive(Debug, Clone, Serialize)]
pub struct StoredDocument {
    pub record_id: DbId,
    pub doc_type: &'static str,
    pub key: String,
    pub size: usize,
}

/// A fetched document with its content type.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    pub key: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Load the record a document belongs to and check the actor may see it.
async fn authorize_record(
    pool: &PgPool,
    actor: &ActorClaims,
    workflow: WorkflowKind,
    record_id: DbId,
) -> WorkflowResult<()> {
    let not_found = || CoreError::NotFound {
        entity: workflow.entity(),
        id: record_id,
    };
    match workflow {
        WorkflowKind::Case => {
            let case = CaseRepo::find_by_id(pool, record_id)
                .await?
                .ok_or_else(not_found)?;
            authorize(&actor.actor, &case)?;
        }
        WorkflowKind::Application => {
            let application = ApplicationRepo::find_by_id(pool, record_id)
                .await?
                .ok_or_else(not_found)?;
            authorize(&actor.actor, &application)?;
        }
    }
    Ok(())
}

/// An uploaded file as received from the client.
#[derive(Debug, Clone, Copy)]
pub struct Upload<'a> {
    /// Document type code, e.g. `"FIR"`.
    pub doc_type: &'a str,
    pub filename: &'a str,
    pub bytes: &'a [u8],
}

/// Validate, store and record a document against a case or application.
///
/// Uploading again under the same type replaces the stored file.
pub async fn attach(
    pool: &PgPool,
    store: &dyn DocumentStore,
    actor: &ActorClaims,
    workflow: WorkflowKind,
    record_id: DbId,
    upload: Upload<'_>,
) -> WorkflowResult<StoredDocument> {
    authorize_record(pool, actor, workflow, record_id).await?;

    let doc_type = DocumentType::from_code(upload.doc_type)?;
    validate_upload(doc_type, workflow, upload.filename, upload.bytes.len())?;
    let key = document_key(doc_type, record_id, upload.filename)?;

    store.put(&key, upload.bytes).await?;
    match workflow {
        WorkflowKind::Case => {
            CaseRepo::set_document(pool, record_id, doc_type.code(), &key).await?;
        }
        WorkflowKind::Application => {
            ApplicationRepo::set_document(pool, record_id, doc_type.code(), &key).await?;
        }
    }

    tracing::info!(
        entity = workflow.entity(),
        record_id,
        doc_type = doc_type.code(),
        key = %key,
        user = %actor.subject,
        "Document attached",
    );
    Ok(StoredDocument {
        record_id,
        doc_type: doc_type.code(),
        key,
        size: upload.bytes.len(),
    })
}

/// Fetch a document by key, authorizing against the record the key names.
pub async fn fetch(
    pool: &PgPool,
    store: &dyn DocumentStore,
    actor: &ActorClaims,
    key: &str,
) -> WorkflowResult<FetchedDocument> {
    let parsed = parse_document_key(key)?;
    authorize_record(pool, actor, parsed.workflow, parsed.record_id).await?;

    let bytes = store.get(key).await?.ok_or(CoreError::NotFound {
        entity: "Document",
        id: parsed.record_id,
    })?;
    Ok(FetchedDocument {
        key: key.to_string(),
        mime_type: mime_type(key),
        bytes,
    })
}
