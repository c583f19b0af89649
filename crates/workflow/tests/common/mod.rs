//! Shared fixtures for workflow integration tests.

#![allow(dead_code)]

use chrono::NaiveDate;
use dbt_core::actor::{Actor, ActorClaims};
use dbt_core::settings::WorkflowSettings;
use dbt_core::transition::ActionKind;
use dbt_db::models::application::{ApplicationSubmission, MarriageApplication};
use dbt_db::models::case::{AtrocityCase, CaseSubmission};
use dbt_db::models::treasury::CreditRequest;
use dbt_workflow::engine::{self, ActionRequest};
use dbt_workflow::registry::StaticRegistry;
use dbt_workflow::{intake, treasury, WorkflowResult};
use sqlx::PgPool;

pub const STATE: &str = "Kerala";
pub const DISTRICT: &str = "Wayanad";
pub const SUB_UNIT: &str = "Kalpetta PS";

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn settings() -> WorkflowSettings {
    WorkflowSettings::default()
}

pub fn registry() -> StaticRegistry {
    StaticRegistry::default()
}

// ---------------------------------------------------------------------------
// Actors
// ---------------------------------------------------------------------------

fn claims(subject: &str, actor: Actor) -> ActorClaims {
    ActorClaims {
        subject: subject.to_string(),
        actor,
    }
}

pub fn filing_officer() -> ActorClaims {
    claims(
        "io-1",
        Actor::FilingOfficer {
            state_ut: STATE.into(),
            district: DISTRICT.into(),
            sub_unit: SUB_UNIT.into(),
        },
    )
}

pub fn verifying_officer() -> ActorClaims {
    verifying_officer_in(DISTRICT)
}

pub fn verifying_officer_in(district: &str) -> ActorClaims {
    claims(
        "to-1",
        Actor::VerifyingOfficer {
            state_ut: STATE.into(),
            district: district.into(),
        },
    )
}

pub fn district_officer() -> ActorClaims {
    claims(
        "dm-1",
        Actor::DistrictOfficer {
            state_ut: STATE.into(),
            district: DISTRICT.into(),
        },
    )
}

pub fn state_officer() -> ActorClaims {
    claims(
        "sno-1",
        Actor::StateOfficer {
            state_ut: STATE.into(),
        },
    )
}

pub fn fund_officer() -> ActorClaims {
    claims(
        "pfms-1",
        Actor::FundOfficer {
            state_ut: STATE.into(),
        },
    )
}

pub fn applicant(person_id: &str, owner_id: i64) -> ActorClaims {
    claims(
        &format!("citizen-{owner_id}"),
        Actor::Applicant {
            person_id: person_id.into(),
            owner_id,
            state_ut: STATE.into(),
            district: DISTRICT.into(),
        },
    )
}

// ---------------------------------------------------------------------------
// Submissions
// ---------------------------------------------------------------------------

pub fn case_submission(fir_no: &str) -> CaseSubmission {
    CaseSubmission {
        fir_no: fir_no.to_string(),
        victim_name: "Ramesh".to_string(),
        victim_aadhaar: Some("123412341234".to_string()),
        bank_ifsc: Some("SBIN0001234".to_string()),
        ..Default::default()
    }
}

pub fn application_submission(
    certificate_no: &str,
    groom: &str,
    bride: &str,
) -> ApplicationSubmission {
    ApplicationSubmission {
        certificate_no: certificate_no.to_string(),
        groom_person_id: groom.to_string(),
        groom_name: "Arun".to_string(),
        groom_dob: date(1995, 3, 1),
        groom_father_name: None,
        groom_address: None,
        bride_person_id: bride.to_string(),
        bride_name: "Meera".to_string(),
        bride_dob: date(1998, 7, 9),
        bride_father_name: None,
        bride_address: None,
        marriage_date: date(2024, 5, 1),
        witness_name: Some("Joseph".to_string()),
        witness_person_id: None,
        joint_account_no: "000111222333".to_string(),
        joint_ifsc: Some("SBIN0001234".to_string()),
        joint_bank_name: None,
    }
}

// ---------------------------------------------------------------------------
// Shortcuts
// ---------------------------------------------------------------------------

pub async fn fund(pool: &PgPool, amount: i64) {
    treasury::credit(
        pool,
        &state_officer(),
        &CreditRequest {
            state_ut: STATE.into(),
            district: DISTRICT.into(),
            amount,
            remark: Some("Quarterly allocation".into()),
        },
    )
    .await
    .unwrap();
}

pub async fn file_case(pool: &PgPool, fir_no: &str) -> AtrocityCase {
    intake::submit_case(pool, &registry(), &filing_officer(), case_submission(fir_no), false)
        .await
        .unwrap()
        .record
}

pub async fn act_on_case(
    pool: &PgPool,
    actor: &ActorClaims,
    case_id: i64,
    action: ActionKind,
) -> WorkflowResult<AtrocityCase> {
    let request = ActionRequest::new(action, actor.role());
    engine::transition_case(pool, &settings(), actor, case_id, &request)
        .await
        .map(|outcome| outcome.record)
}

pub async fn submit_application(
    pool: &PgPool,
    groom: &str,
    bride: &str,
    certificate_no: &str,
) -> MarriageApplication {
    intake::submit_application(
        pool,
        &registry(),
        &settings(),
        &applicant(groom, 1),
        application_submission(certificate_no, groom, bride),
        false,
    )
    .await
    .unwrap()
    .record
}

pub async fn act_on_application(
    pool: &PgPool,
    actor: &ActorClaims,
    application_id: i64,
    action: ActionKind,
) -> WorkflowResult<MarriageApplication> {
    let request = ActionRequest::new(action, actor.role());
    engine::transition_application(pool, &settings(), actor, application_id, &request)
        .await
        .map(|outcome| outcome.record)
}
