//! Per-jurisdiction treasury ledger operations.
//!
//! Every write takes the jurisdiction's advisory lock first, then reads the
//! newest entry and appends one more. Concurrent writers to the same
//! jurisdiction therefore see each other's balances in commit order.

use dbt_core::actor::{Actor, ActorClaims};
use dbt_core::error::CoreError;
use dbt_core::jurisdiction::same_place;
use dbt_core::treasury::{apply_credit, apply_debit, EntryDirection, Jurisdiction};
use dbt_core::types::Amount;
use dbt_db::locks::advisory_xact_lock;
use dbt_db::models::treasury::{CreateTreasuryEntry, CreditRequest, TreasuryEntry};
use dbt_db::repositories::TreasuryRepo;
use sqlx::{PgPool, Postgres, Transaction};
use validator::Validate;

use crate::error::WorkflowResult;

// ---------------------------------------------------------------------------
// Access
// ---------------------------------------------------------------------------

/// State-level finance roles may fund and inspect any district of their
/// state; district officers may inspect their own district.
fn ensure_access(
    actor: &Actor,
    jurisdiction: &Jurisdiction,
    write: bool,
) -> Result<(), CoreError> {
    let allowed = match actor {
        Actor::StateOfficer { state_ut } | Actor::FundOfficer { state_ut } => {
            same_place(state_ut, &jurisdiction.state_ut)
        }
        Actor::DistrictOfficer { state_ut, district } if !write => {
            same_place(state_ut, &jurisdiction.state_ut)
                && same_place(district, &jurisdiction.district)
        }
        _ => false,
    };
    if allowed {
        Ok(())
    } else {
        Err(CoreError::Forbidden(format!(
            "{} may not {} the treasury of {}/{}",
            actor.role(),
            if write { "fund" } else { "view" },
            jurisdiction.state_ut,
            jurisdiction.district
        )))
    }
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Append a credit inside the caller's transaction.
pub async fn credit_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    jurisdiction: &Jurisdiction,
    amount: Amount,
    reference: Option<String>,
    remark: Option<String>,
    created_by: &str,
) -> WorkflowResult<TreasuryEntry> {
    jurisdiction.validate()?;
    advisory_xact_lock(tx, &jurisdiction.lock_key()).await?;

    let latest = TreasuryRepo::latest(tx, jurisdiction).await?;
    let balance_after = apply_credit(latest.map(|e| e.balance_after), amount)?;

    let entry = TreasuryRepo::insert(
        tx,
        &CreateTreasuryEntry {
            jurisdiction: jurisdiction.clone(),
            direction: EntryDirection::Credit,
            amount,
            balance_after,
            reference,
            remark,
            created_by: created_by.to_string(),
        },
    )
    .await?;
    tracing::info!(
        state_ut = %jurisdiction.state_ut,
        district = %jurisdiction.district,
        amount,
        balance_after,
        "Treasury credited",
    );
    Ok(entry)
}

/// Append a debit inside the caller's transaction.
///
/// Fails with `InsufficientFunds` before writing anything when the
/// jurisdiction has no entries or too small a balance.
pub async fn debit_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    jurisdiction: &Jurisdiction,
    amount: Amount,
    reference: Option<String>,
    created_by: &str,
) -> WorkflowResult<TreasuryEntry> {
    jurisdiction.validate()?;
    advisory_xact_lock(tx, &jurisdiction.lock_key()).await?;

    let latest = TreasuryRepo::latest(tx, jurisdiction).await?;
    let balance_after = match apply_debit(latest.map(|e| e.balance_after), amount) {
        Ok(balance) => balance,
        Err(err) => {
            tracing::warn!(
                state_ut = %jurisdiction.state_ut,
                district = %jurisdiction.district,
                amount,
                error = %err,
                "Treasury debit refused",
            );
            return Err(err.into());
        }
    };

    let entry = TreasuryRepo::insert(
        tx,
        &CreateTreasuryEntry {
            jurisdiction: jurisdiction.clone(),
            direction: EntryDirection::Debit,
            amount,
            balance_after,
            reference,
            remark: None,
            created_by: created_by.to_string(),
        },
    )
    .await?;
    tracing::info!(
        state_ut = %jurisdiction.state_ut,
        district = %jurisdiction.district,
        amount,
        balance_after,
        "Treasury debited",
    );
    Ok(entry)
}

/// Fund a jurisdiction on behalf of a state-level officer.
pub async fn credit(
    pool: &PgPool,
    actor: &ActorClaims,
    request: &CreditRequest,
) -> WorkflowResult<TreasuryEntry> {
    request.validate()?;
    let jurisdiction = Jurisdiction::new(&request.state_ut, &request.district);
    ensure_access(&actor.actor, &jurisdiction, true)?;

    let mut tx = pool.begin().await?;
    let entry = credit_in_tx(
        &mut tx,
        &jurisdiction,
        request.amount,
        None,
        request.remark.clone(),
        &actor.subject,
    )
    .await?;
    tx.commit().await?;
    Ok(entry)
}

/// Debit a jurisdiction in its own transaction.
pub async fn debit(
    pool: &PgPool,
    jurisdiction: &Jurisdiction,
    amount: Amount,
    reference: Option<String>,
    created_by: &str,
) -> WorkflowResult<TreasuryEntry> {
    let mut tx = pool.begin().await?;
    let entry = debit_in_tx(&mut tx, jurisdiction, amount, reference, created_by).await?;
    tx.commit().await?;
    Ok(entry)
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Current balance; zero for a jurisdiction that was never funded.
pub async fn balance(
    pool: &PgPool,
    actor: &ActorClaims,
    jurisdiction: &Jurisdiction,
) -> WorkflowResult<Amount> {
    jurisdiction.validate()?;
    ensure_access(&actor.actor, jurisdiction, false)?;
    let latest = TreasuryRepo::latest_for(pool, jurisdiction).await?;
    Ok(latest.map_or(0, |e| e.balance_after))
}

/// Ledger entries, newest first.
pub async fn history(
    pool: &PgPool,
    actor: &ActorClaims,
    jurisdiction: &Jurisdiction,
    limit: Option<i64>,
    offset: Option<i64>,
) -> WorkflowResult<Vec<TreasuryEntry>> {
    jurisdiction.validate()?;
    ensure_access(&actor.actor, jurisdiction, false)?;
    Ok(TreasuryRepo::history(pool, jurisdiction, limit, offset).await?)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn kerala_wayanad() -> Jurisdiction {
        Jurisdiction::new("Kerala", "Wayanad")
    }

    #[test]
    fn fund_officer_may_fund_own_state() {
        let actor = Actor::FundOfficer {
            state_ut: "kerala".into(),
        };
        assert!(ensure_access(&actor, &kerala_wayanad(), true).is_ok());
    }

    #[test]
    fn district_officer_reads_but_never_funds() {
        let actor = Actor::DistrictOfficer {
            state_ut: "Kerala".into(),
            district: "Wayanad".into(),
        };
        assert!(ensure_access(&actor, &kerala_wayanad(), false).is_ok());
        assert_matches!(
            ensure_access(&actor, &kerala_wayanad(), true),
            Err(CoreError::Forbidden(_))
        );
    }

    #[test]
    fn other_state_is_forbidden() {
        let actor = Actor::StateOfficer {
            state_ut: "Tamil Nadu".into(),
        };
        assert_matches!(
            ensure_access(&actor, &kerala_wayanad(), false),
            Err(CoreError::Forbidden(_))
        );
    }
}
