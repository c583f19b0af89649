//! Atrocity compensation case models and DTOs.

use chrono::NaiveDate;
use dbt_core::jurisdiction::JurisdictionTarget;
use dbt_core::stages::WorkflowKind;
use dbt_core::types::{Amount, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `atrocity_cases` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AtrocityCase {
    pub id: DbId,
    pub fir_no: String,
    pub state_ut: String,
    pub district: String,
    pub sub_unit: String,
    pub victim_name: String,
    pub victim_relation: Option<String>,
    pub victim_gender: Option<String>,
    pub victim_caste: Option<String>,
    pub victim_mobile: Option<String>,
    #[serde(skip_serializing)]
    pub victim_aadhaar: Option<String>,
    pub applicant_name: Option<String>,
    pub applicant_mobile: Option<String>,
    pub applicant_email: Option<String>,
    pub incident_summary: Option<String>,
    pub incident_location: Option<String>,
    pub incident_date: Option<NaiveDate>,
    pub applied_acts: Option<String>,
    pub bank_account_no: Option<String>,
    pub bank_ifsc: Option<String>,
    pub bank_name: Option<String>,
    pub bank_holder_name: Option<String>,
    /// Document type code -> document store key.
    pub documents: serde_json::Value,
    pub stage: i16,
    pub pending_at: String,
    pub approved_by: Option<String>,
    pub compensation_amount: Option<Amount>,
    pub disbursed_amount: Amount,
    pub created_by: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl JurisdictionTarget for AtrocityCase {
    fn workflow(&self) -> WorkflowKind {
        WorkflowKind::Case
    }

    fn record_id(&self) -> DbId {
        self.id
    }

    fn state_ut(&self) -> &str {
        &self.state_ut
    }

    fn district(&self) -> &str {
        &self.district
    }

    fn sub_unit(&self) -> Option<&str> {
        Some(&self.sub_unit)
    }

    fn stage(&self) -> i16 {
        self.stage
    }
}

/// Payload of a case submission. Identity fields (`fir_no`) are only ever
/// written on insert.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CaseSubmission {
    #[validate(length(min = 1, max = 50))]
    pub fir_no: String,
    #[validate(length(min = 1, max = 150))]
    pub victim_name: String,
    #[validate(length(max = 150))]
    pub victim_relation: Option<String>,
    pub victim_gender: Option<String>,
    #[validate(length(max = 50))]
    pub victim_caste: Option<String>,
    pub victim_mobile: Option<String>,
    #[validate(length(equal = 12))]
    pub victim_aadhaar: Option<String>,
    #[validate(length(max = 150))]
    pub applicant_name: Option<String>,
    pub applicant_mobile: Option<String>,
    #[validate(email)]
    pub applicant_email: Option<String>,
    #[validate(length(max = 500))]
    pub incident_summary: Option<String>,
    #[validate(length(max = 200))]
    pub incident_location: Option<String>,
    pub incident_date: Option<NaiveDate>,
    #[validate(length(max = 500))]
    pub applied_acts: Option<String>,
    #[validate(length(max = 20))]
    pub bank_account_no: Option<String>,
    pub bank_ifsc: Option<String>,
    #[validate(length(max = 100))]
    pub bank_name: Option<String>,
    #[validate(length(max = 100))]
    pub bank_holder_name: Option<String>,
}

/// Jurisdiction a new case is filed under, taken from the filer's claims.
#[derive(Debug, Clone)]
pub struct CaseScope {
    pub state_ut: String,
    pub district: String,
    pub sub_unit: String,
}

/// Column values written by a stage transition.
#[derive(Debug, Clone)]
pub struct CaseTransition {
    pub stage: i16,
    pub pending_at: String,
    pub approved_by: String,
    /// Set when the verifier sanctions an amount; otherwise left unchanged.
    pub compensation_amount: Option<Amount>,
    /// Added to `disbursed_amount`; zero for non-release transitions.
    pub disbursed_delta: Amount,
}

/// Query parameters for listing cases.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaseListQuery {
    pub state_ut: Option<String>,
    pub stage: Option<i16>,
    pub pending_at: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
