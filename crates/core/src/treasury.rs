//! Treasury ledger arithmetic.
//!
//! The ledger is an append-only chain per jurisdiction: every entry stores the
//! balance after it was applied, and the newest entry is the balance. These
//! functions compute the next link; the store is responsible for reading the
//! newest entry and writing the new one under a per-jurisdiction lock.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::jurisdiction::same_place;
use crate::types::Amount;

/// Direction of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryDirection {
    Credit,
    Debit,
}

impl EntryDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "credit" => Ok(Self::Credit),
            "debit" => Ok(Self::Debit),
            other => Err(CoreError::Internal(format!(
                "Unknown ledger direction '{other}'"
            ))),
        }
    }
}

/// A (state, district) pair identifying one treasury balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jurisdiction {
    pub state_ut: String,
    pub district: String,
}

impl Jurisdiction {
    pub fn new(state_ut: impl Into<String>, district: impl Into<String>) -> Self {
        Self {
            state_ut: state_ut.into(),
            district: district.into(),
        }
    }

    /// Normalized key used for advisory locking. Two jurisdictions that compare
    /// equal under [`same_place`] always produce the same key.
    pub fn lock_key(&self) -> String {
        format!(
            "treasury:{}/{}",
            self.state_ut.trim().to_lowercase(),
            self.district.trim().to_lowercase()
        )
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.state_ut.trim().is_empty() || self.district.trim().is_empty() {
            return Err(CoreError::Validation(
                "Treasury jurisdiction needs both state and district".into(),
            ));
        }
        Ok(())
    }
}

impl PartialEq for Jurisdiction {
    fn eq(&self, other: &Self) -> bool {
        same_place(&self.state_ut, &other.state_ut) && same_place(&self.district, &other.district)
    }
}

impl Eq for Jurisdiction {}

/// Ledger amounts are strictly positive whole rupees.
pub fn validate_amount(amount: Amount) -> Result<(), CoreError> {
    if amount <= 0 {
        return Err(CoreError::Validation(format!(
            "Amount must be positive, got {amount}"
        )));
    }
    Ok(())
}

/// Balance after crediting `amount`. A jurisdiction with no history starts at zero.
pub fn apply_credit(latest_balance: Option<Amount>, amount: Amount) -> Result<Amount, CoreError> {
    validate_amount(amount)?;
    latest_balance
        .unwrap_or(0)
        .checked_add(amount)
        .ok_or_else(|| CoreError::Validation("Credit would overflow the balance".into()))
}

/// Balance after debiting `amount`.
///
/// A jurisdiction with no history has nothing to debit, and a debit larger
/// than the balance is refused. Neither case produces an entry.
pub fn apply_debit(latest_balance: Option<Amount>, amount: Amount) -> Result<Amount, CoreError> {
    validate_amount(amount)?;
    let available = latest_balance.unwrap_or(0);
    if latest_balance.is_none() || available < amount {
        return Err(CoreError::InsufficientFunds {
            available,
            requested: amount,
        });
    }
    Ok(available - amount)
}
