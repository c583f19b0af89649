//! Marriage incentive application models and DTOs.

use chrono::NaiveDate;
use dbt_core::jurisdiction::JurisdictionTarget;
use dbt_core::stages::{ApplicationStatus, WorkflowKind};
use dbt_core::types::{Amount, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `marriage_applications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MarriageApplication {
    pub id: DbId,
    pub certificate_no: String,
    pub owner_id: DbId,
    pub applicant_person_id: String,
    pub groom_person_id: String,
    pub groom_name: String,
    pub groom_dob: NaiveDate,
    pub groom_father_name: Option<String>,
    pub groom_address: Option<String>,
    pub bride_person_id: String,
    pub bride_name: String,
    pub bride_dob: NaiveDate,
    pub bride_father_name: Option<String>,
    pub bride_address: Option<String>,
    pub marriage_date: NaiveDate,
    pub witness_name: Option<String>,
    pub witness_person_id: Option<String>,
    pub joint_account_no: String,
    pub joint_ifsc: Option<String>,
    pub joint_bank_name: Option<String>,
    pub documents: serde_json::Value,
    pub state_ut: String,
    pub district: String,
    pub stage: i16,
    pub pending_at: String,
    pub approved_by: Option<String>,
    pub status: String,
    pub disbursed_amount: Amount,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl MarriageApplication {
    /// Parsed status; an unknown value in the column counts as open.
    pub fn status(&self) -> Option<ApplicationStatus> {
        ApplicationStatus::parse(&self.status).ok()
    }

    /// Rejected applications accept no further actions.
    pub fn is_rejected(&self) -> bool {
        self.status() == Some(ApplicationStatus::Rejected)
    }
}

impl JurisdictionTarget for MarriageApplication {
    fn workflow(&self) -> WorkflowKind {
        WorkflowKind::Application
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
        None
    }

    fn stage(&self) -> i16 {
        self.stage
    }

    fn parties(&self) -> Option<(&str, &str)> {
        Some((&self.groom_person_id, &self.bride_person_id))
    }

    fn owner_id(&self) -> Option<DbId> {
        Some(self.owner_id)
    }
}

/// Payload of an application submission.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ApplicationSubmission {
    #[validate(length(min = 1, max = 50))]
    pub certificate_no: String,
    #[validate(length(min = 1, max = 64))]
    pub groom_person_id: String,
    #[validate(length(min = 1, max = 150))]
    pub groom_name: String,
    pub groom_dob: NaiveDate,
    #[validate(length(max = 150))]
    pub groom_father_name: Option<String>,
    #[validate(length(max = 300))]
    pub groom_address: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub bride_person_id: String,
    #[validate(length(min = 1, max = 150))]
    pub bride_name: String,
    pub bride_dob: NaiveDate,
    #[validate(length(max = 150))]
    pub bride_father_name: Option<String>,
    #[validate(length(max = 300))]
    pub bride_address: Option<String>,
    pub marriage_date: NaiveDate,
    #[validate(length(max = 150))]
    pub witness_name: Option<String>,
    pub witness_person_id: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub joint_account_no: String,
    pub joint_ifsc: Option<String>,
    #[validate(length(max = 100))]
    pub joint_bank_name: Option<String>,
}

/// Submitting citizen and the jurisdiction the application is filed under.
#[derive(Debug, Clone)]
pub struct ApplicationScope {
    pub owner_id: DbId,
    pub applicant_person_id: String,
    pub state_ut: String,
    pub district: String,
}

/// Column values written by a stage transition.
#[derive(Debug, Clone)]
pub struct ApplicationTransition {
    pub stage: i16,
    pub pending_at: String,
    pub approved_by: String,
    pub status: ApplicationStatus,
    pub disbursed_delta: Amount,
}

/// Query parameters for listing applications.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationListQuery {
    pub state_ut: Option<String>,
    pub owner_id: Option<DbId>,
    pub stage: Option<i16>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
