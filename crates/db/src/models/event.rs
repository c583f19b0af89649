//! Audit event models.
//!
//! Events have no `updated_at` field: rows are immutable once written.

use dbt_core::stages::WorkflowKind;
use dbt_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Which event table a query targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventLog {
    Case,
    Application,
}

impl EventLog {
    pub fn table(self) -> &'static str {
        match self {
            Self::Case => "case_events",
            Self::Application => "application_events",
        }
    }

    /// Foreign-key column pointing at the owning record.
    pub fn record_column(self) -> &'static str {
        match self {
            Self::Case => "case_id",
            Self::Application => "application_id",
        }
    }
}

impl From<WorkflowKind> for EventLog {
    fn from(kind: WorkflowKind) -> Self {
        match kind {
            WorkflowKind::Case => Self::Case,
            WorkflowKind::Application => Self::Application,
        }
    }
}

/// A row from `case_events` or `application_events`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuditEvent {
    pub id: DbId,
    pub record_id: DbId,
    pub actor: String,
    pub actor_role: String,
    /// Stage of the record before the event.
    pub stage: i16,
    pub event_type: String,
    pub comment: Option<String>,
    pub payload: serde_json::Value,
    pub integrity_hash: String,
    pub created_at: Timestamp,
}

/// DTO for appending an event.
#[derive(Debug, Clone)]
pub struct CreateAuditEvent {
    pub record_id: DbId,
    pub actor: String,
    pub actor_role: String,
    pub stage: i16,
    pub event_type: String,
    pub comment: Option<String>,
    pub payload: serde_json::Value,
    pub integrity_hash: String,
}
