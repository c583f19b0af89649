//! Transaction-scoped PostgreSQL advisory locks.
//!
//! Keys are arbitrary strings hashed server-side with `hashtextextended`, so
//! callers can lock on domain values (a treasury jurisdiction, a couple)
//! without allocating lock ids. Locks release on commit or rollback.

/// Block until the advisory lock for `key` is held by this transaction.
pub async fn advisory_xact_lock(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    key: &str,
) -> Result<(), sqlx::Error> {
    tracing::trace!(key, "Acquiring advisory lock");
    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
        .bind(key)
        .execute(&mut **tx)
        .await?;
    Ok(())
}
