//! Repository for the `treasury_entries` ledger.

use dbt_core::treasury::Jurisdiction;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::treasury::{CreateTreasuryEntry, TreasuryEntry};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, state_ut, district, direction, amount, balance_after, \
    reference, remark, created_by, created_at";

/// Default page size for history queries.
const DEFAULT_LIMIT: i64 = 100;

/// Provides append and read operations for the treasury ledger.
pub struct TreasuryRepo;

impl TreasuryRepo {
    /// Newest entry for a jurisdiction inside the caller's transaction.
    ///
    /// Only meaningful while the jurisdiction's advisory lock is held.
    pub async fn latest(
        tx: &mut Transaction<'_, Postgres>,
        jurisdiction: &Jurisdiction,
    ) -> Result<Option<TreasuryEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM treasury_entries
             WHERE lower(state_ut) = lower($1) AND lower(district) = lower($2)
             ORDER BY id DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, TreasuryEntry>(&query)
            .bind(&jurisdiction.state_ut)
            .bind(&jurisdiction.district)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Newest entry for a jurisdiction, read outside any transaction.
    pub async fn latest_for(
        pool: &PgPool,
        jurisdiction: &Jurisdiction,
    ) -> Result<Option<TreasuryEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM treasury_entries
             WHERE lower(state_ut) = lower($1) AND lower(district) = lower($2)
             ORDER BY id DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, TreasuryEntry>(&query)
            .bind(&jurisdiction.state_ut)
            .bind(&jurisdiction.district)
            .fetch_optional(pool)
            .await
    }

    /// Append an entry, returning the created row.
    pub async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        input: &CreateTreasuryEntry,
    ) -> Result<TreasuryEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO treasury_entries
                (state_ut, district, direction, amount, balance_after, reference, remark, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TreasuryEntry>(&query)
            .bind(&input.jurisdiction.state_ut)
            .bind(&input.jurisdiction.district)
            .bind(input.direction.as_str())
            .bind(input.amount)
            .bind(input.balance_after)
            .bind(&input.reference)
            .bind(&input.remark)
            .bind(&input.created_by)
            .fetch_one(&mut **tx)
            .await
    }

    /// Ledger entries for a jurisdiction, newest first.
    pub async fn history(
        pool: &PgPool,
        jurisdiction: &Jurisdiction,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<TreasuryEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM treasury_entries
             WHERE lower(state_ut) = lower($1) AND lower(district) = lower($2)
             ORDER BY id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, TreasuryEntry>(&query)
            .bind(&jurisdiction.state_ut)
            .bind(&jurisdiction.district)
            .bind(limit.unwrap_or(DEFAULT_LIMIT))
            .bind(offset.unwrap_or(0))
            .fetch_all(pool)
            .await
    }
}
