//! Tunable amounts and thresholds, injected into the workflow at startup.

use serde::Deserialize;

use crate::error::CoreError;
use crate::types::Amount;

/// Default incentive paid per marriage application (whole rupees).
pub const DEFAULT_MARRIAGE_GRANT_AMOUNT: Amount = 250_000;

/// Default sanctioned compensation when the verifier records none.
pub const DEFAULT_COMPENSATION_AMOUNT: Amount = 85_000;

/// Bounds on a sanctioned compensation. The lower bound keeps every tranche
/// above zero; the upper bound keeps tranche arithmetic far from overflow.
pub const MIN_COMPENSATION_AMOUNT: Amount = 100;
pub const MAX_COMPENSATION_AMOUNT: Amount = 100_000_000;

/// Minimum ages at the date of marriage.
pub const DEFAULT_MIN_GROOM_AGE: u32 = 21;
pub const DEFAULT_MIN_BRIDE_AGE: u32 = 18;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorkflowSettings {
    pub marriage_grant_amount: Amount,
    pub default_compensation_amount: Amount,
    pub min_groom_age: u32,
    pub min_bride_age: u32,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            marriage_grant_amount: DEFAULT_MARRIAGE_GRANT_AMOUNT,
            default_compensation_amount: DEFAULT_COMPENSATION_AMOUNT,
            min_groom_age: DEFAULT_MIN_GROOM_AGE,
            min_bride_age: DEFAULT_MIN_BRIDE_AGE,
        }
    }
}

impl WorkflowSettings {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.marriage_grant_amount <= 0 {
            return Err(CoreError::Validation(
                "marriage_grant_amount must be positive".into(),
            ));
        }
        validate_compensation(self.default_compensation_amount)
    }
}

/// Check a compensation amount before it is sanctioned on a case.
pub fn validate_compensation(amount: Amount) -> Result<(), CoreError> {
    if (MIN_COMPENSATION_AMOUNT..=MAX_COMPENSATION_AMOUNT).contains(&amount) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Compensation must be between {MIN_COMPENSATION_AMOUNT} and \
             {MAX_COMPENSATION_AMOUNT}, got {amount}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(WorkflowSettings::default().validate().is_ok());
    }

    #[test]
    fn compensation_bounds() {
        assert!(validate_compensation(MIN_COMPENSATION_AMOUNT).is_ok());
        assert!(validate_compensation(MAX_COMPENSATION_AMOUNT).is_ok());
        assert!(validate_compensation(3).is_err());
        assert!(validate_compensation(i64::MAX / 10).is_err());
    }

    #[test]
    fn zero_grant_is_rejected() {
        let settings = WorkflowSettings {
            marriage_grant_amount: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }
}
