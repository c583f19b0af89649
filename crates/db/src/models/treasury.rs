//! Treasury ledger models.

use dbt_core::treasury::{EntryDirection, Jurisdiction};
use dbt_core::types::{Amount, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `treasury_entries` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TreasuryEntry {
    pub id: DbId,
    pub state_ut: String,
    pub district: String,
    pub direction: String,
    pub amount: Amount,
    pub balance_after: Amount,
    pub reference: Option<String>,
    pub remark: Option<String>,
    pub created_by: String,
    pub created_at: Timestamp,
}

/// DTO for appending a ledger entry.
#[derive(Debug, Clone)]
pub struct CreateTreasuryEntry {
    pub jurisdiction: Jurisdiction,
    pub direction: EntryDirection,
    pub amount: Amount,
    pub balance_after: Amount,
    pub reference: Option<String>,
    pub remark: Option<String>,
    pub created_by: String,
}

/// Request body for crediting a jurisdiction.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreditRequest {
    #[validate(length(min = 1, max = 100))]
    pub state_ut: String,
    #[validate(length(min = 1, max = 100))]
    pub district: String,
    #[validate(range(min = 1))]
    pub amount: Amount,
    #[validate(length(max = 500))]
    pub remark: Option<String>,
}
