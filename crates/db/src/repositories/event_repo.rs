//! Repository for the append-only `case_events` and `application_events` tables.
//!
//! Inserts and reads only. A trigger on both tables rejects UPDATE and DELETE.

use dbt_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::event::{AuditEvent, CreateAuditEvent, EventLog};

/// Column list with the foreign key aliased so both tables share one model.
fn columns(log: EventLog) -> String {
    format!(
        "id, {} AS record_id, actor, actor_role, stage, event_type, comment, payload, \
         integrity_hash, created_at",
        log.record_column()
    )
}

/// Provides append and read operations for audit events.
pub struct AuditEventRepo;

impl AuditEventRepo {
    /// Append one event inside the caller's transaction.
    pub async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        log: EventLog,
        input: &CreateAuditEvent,
    ) -> Result<AuditEvent, sqlx::Error> {
        let query = format!(
            "INSERT INTO {table}
                ({fk}, actor, actor_role, stage, event_type, comment, payload, integrity_hash)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {cols}",
            table = log.table(),
            fk = log.record_column(),
            cols = columns(log),
        );
        sqlx::query_as::<_, AuditEvent>(&query)
            .bind(input.record_id)
            .bind(&input.actor)
            .bind(&input.actor_role)
            .bind(input.stage)
            .bind(&input.event_type)
            .bind(&input.comment)
            .bind(&input.payload)
            .bind(&input.integrity_hash)
            .fetch_one(&mut **tx)
            .await
    }

    /// Integrity hash of the newest event for a record, if any.
    ///
    /// Callers hold the record's row lock, so the chain cannot fork.
    pub async fn latest_hash(
        tx: &mut Transaction<'_, Postgres>,
        log: EventLog,
        record_id: DbId,
    ) -> Result<Option<String>, sqlx::Error> {
        let query = format!(
            "SELECT integrity_hash FROM {table}
             WHERE {fk} = $1
             ORDER BY id DESC
             LIMIT 1",
            table = log.table(),
            fk = log.record_column(),
        );
        sqlx::query_scalar::<_, String>(&query)
            .bind(record_id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Whether a record already has an event of `event_type`.
    pub async fn exists_of_type(
        tx: &mut Transaction<'_, Postgres>,
        log: EventLog,
        record_id: DbId,
        event_type: &str,
    ) -> Result<bool, sqlx::Error> {
        let query = format!(
            "SELECT EXISTS(SELECT 1 FROM {table} WHERE {fk} = $1 AND event_type = $2)",
            table = log.table(),
            fk = log.record_column(),
        );
        sqlx::query_scalar::<_, bool>(&query)
            .bind(record_id)
            .bind(event_type)
            .fetch_one(&mut **tx)
            .await
    }

    /// All events for a record, oldest first.
    pub async fn list_for_record(
        pool: &PgPool,
        log: EventLog,
        record_id: DbId,
    ) -> Result<Vec<AuditEvent>, sqlx::Error> {
        let query = format!(
            "SELECT {cols} FROM {table}
             WHERE {fk} = $1
             ORDER BY id ASC",
            cols = columns(log),
            table = log.table(),
            fk = log.record_column(),
        );
        sqlx::query_as::<_, AuditEvent>(&query)
            .bind(record_id)
            .fetch_all(pool)
            .await
    }
}
