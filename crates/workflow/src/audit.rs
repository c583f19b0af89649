//! Appending to and checking the per-record audit chain.

use dbt_core::audit::{
    canonical_event, compute_integrity_hash, redact_sensitive_fields, verify_chain,
};
use dbt_core::roles::Role;
use dbt_core::types::DbId;
use dbt_db::models::event::{AuditEvent, CreateAuditEvent, EventLog};
use dbt_db::repositories::AuditEventRepo;
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::WorkflowResult;

/// One event about to be written.
#[derive(Debug, Clone)]
pub struct NewEvent<'a> {
    pub log: EventLog,
    pub record_id: DbId,
    pub actor: &'a str,
    pub actor_role: Role,
    /// Stage of the record before the event.
    pub stage: i16,
    pub event_type: &'a str,
    pub comment: Option<&'a str>,
    pub payload: serde_json::Value,
}

/// Redact, hash onto the record's chain and insert one event.
///
/// The caller must hold the record's row lock in `tx`.
pub async fn append_event(
    tx: &mut Transaction<'_, Postgres>,
    event: NewEvent<'_>,
) -> WorkflowResult<AuditEvent> {
    let payload = redact_sensitive_fields(&event.payload);
    let actor_role = event.actor_role.label();
    let canonical = canonical_event(
        event.record_id,
        event.actor,
        actor_role,
        event.stage,
        event.event_type,
        event.comment,
        &payload,
    );
    let prev = AuditEventRepo::latest_hash(tx, event.log, event.record_id).await?;
    let integrity_hash = compute_integrity_hash(prev.as_deref(), &canonical);

    let created = AuditEventRepo::insert(
        tx,
        event.log,
        &CreateAuditEvent {
            record_id: event.record_id,
            actor: event.actor.to_string(),
            actor_role: actor_role.to_string(),
            stage: event.stage,
            event_type: event.event_type.to_string(),
            comment: event.comment.map(str::to_string),
            payload,
            integrity_hash,
        },
    )
    .await?;

    tracing::debug!(
        table = event.log.table(),
        record_id = event.record_id,
        event_id = created.id,
        event_type = %created.event_type,
        "Audit event appended",
    );
    Ok(created)
}

/// Recompute a stored timeline's hash chain.
///
/// Returns the id of the first event whose hash does not match, or `None`
/// when the chain is intact.
pub fn first_broken_link(events: &[AuditEvent]) -> Option<DbId> {
    let chain = events.iter().map(|e| {
        (
            canonical_event(
                e.record_id,
                &e.actor,
                &e.actor_role,
                e.stage,
                &e.event_type,
                e.comment.as_deref(),
                &e.payload,
            ),
            e.integrity_hash.as_str(),
        )
    });
    verify_chain(chain).err().map(|index| events[index].id)
}

/// Load a record's events and check their chain.
pub async fn verify_record(
    pool: &PgPool,
    log: EventLog,
    record_id: DbId,
) -> WorkflowResult<Option<DbId>> {
    let events = AuditEventRepo::list_for_record(pool, log, record_id).await?;
    let broken = first_broken_link(&events);
    if let Some(event_id) = broken {
        tracing::warn!(table = log.table(), record_id, event_id, "Audit chain broken");
    }
    Ok(broken)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(id: DbId, prev: Option<&str>, event_type: &str) -> AuditEvent {
        let payload = serde_json::json!({ "to": 2 });
        let canonical = canonical_event(7, "to-1", "Tribal Officer", 1, event_type, None, &payload);
        AuditEvent {
            id,
            record_id: 7,
            actor: "to-1".into(),
            actor_role: "Tribal Officer".into(),
            stage: 1,
            event_type: event_type.into(),
            comment: None,
            payload,
            integrity_hash: compute_integrity_hash(prev, &canonical),
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn intact_chain_has_no_broken_link() {
        let first = stored(1, None, "VERIFIED");
        let second = stored(2, Some(&first.integrity_hash), "SANCTIONED");
        assert_eq!(first_broken_link(&[first, second]), None);
    }

    #[test]
    fn edited_payload_is_reported() {
        let first = stored(1, None, "VERIFIED");
        let mut second = stored(2, Some(&first.integrity_hash), "SANCTIONED");
        second.payload = serde_json::json!({ "to": 8 });
        assert_eq!(first_broken_link(&[first, second]), Some(2));
    }
}
