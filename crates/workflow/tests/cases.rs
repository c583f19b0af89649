//! Atrocity case intake and stage transitions against a real database.

mod common;

use assert_matches::assert_matches;
use chrono::Utc;
use common::*;
use dbt_core::error::CoreError;
use dbt_core::roles::Role;
use dbt_core::transition::ActionKind;
use dbt_core::treasury::Jurisdiction;
use dbt_db::models::case::CaseListQuery;
use dbt_db::models::event::EventLog;
use dbt_db::models::registry::FirRecord;
use dbt_db::repositories::CaseRepo;
use dbt_workflow::audit::{append_event, verify_record, NewEvent};
use dbt_workflow::engine::{self, ActionRequest};
use dbt_workflow::intake::{self, Disposition};
use dbt_workflow::registry::StaticRegistry;
use dbt_workflow::{treasury, WorkflowError};
use sqlx::PgPool;

fn event_types(events: &[dbt_db::models::event::AuditEvent]) -> Vec<&str> {
    events.iter().map(|e| e.event_type.as_str()).collect()
}

// ---------------------------------------------------------------------------
// Intake
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn submit_lands_with_verifier(pool: PgPool) {
    let outcome = intake::submit_case(
        &pool,
        &registry(),
        &filing_officer(),
        case_submission("FIR/12/2024"),
        false,
    )
    .await
    .unwrap();

    assert_eq!(outcome.disposition, Disposition::Created);
    assert_eq!(outcome.record.stage, 1);
    assert_eq!(outcome.record.pending_at, "Tribal Officer");
    assert_eq!(outcome.record.sub_unit, SUB_UNIT);

    let event = outcome.event.expect("submission writes an event");
    assert_eq!(event.event_type, "FIR_SUBMITTED");
    assert_eq!(event.stage, 0);
    assert_eq!(event.payload["victim_aadhaar"], "[REDACTED]");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn repeated_submit_is_unchanged(pool: PgPool) {
    let first = file_case(&pool, "FIR/13/2024").await;
    let again = intake::submit_case(
        &pool,
        &registry(),
        &filing_officer(),
        case_submission("  FIR/13/2024 "),
        false,
    )
    .await
    .unwrap();

    assert_eq!(again.disposition, Disposition::Unchanged);
    assert_eq!(again.record.id, first.id);
    assert!(again.event.is_none());

    let events = engine::case_timeline(&pool, &filing_officer(), first.id)
        .await
        .unwrap();
    assert_eq!(event_types(&events), ["FIR_SUBMITTED"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_submits_create_one_case(pool: PgPool) {
    let registry = registry();
    let officer = filing_officer();
    let submit = || {
        intake::submit_case(
            &pool,
            &registry,
            &officer,
            case_submission("FIR/14/2024"),
            false,
        )
    };
    let (a, b) = tokio::join!(submit(), submit());
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(a.record.id, b.record.id);
    let mut dispositions = [a.disposition, b.disposition];
    dispositions.sort_by_key(|d| *d == Disposition::Unchanged);
    assert_eq!(dispositions, [Disposition::Created, Disposition::Unchanged]);

    let events = engine::case_timeline(&pool, &filing_officer(), a.record.id)
        .await
        .unwrap();
    assert_eq!(events.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn draft_then_submit_advances(pool: PgPool) {
    let officer = filing_officer();
    let draft = intake::submit_case(&pool, &registry(), &officer, case_submission("FIR/15/2024"), true)
        .await
        .unwrap();
    assert_eq!(draft.record.stage, 0);
    assert_eq!(draft.record.pending_at, "Investigation Officer");
    assert!(draft.event.is_none());

    let submitted =
        intake::submit_case(&pool, &registry(), &officer, case_submission("FIR/15/2024"), false)
            .await
            .unwrap();
    assert_eq!(submitted.disposition, Disposition::Advanced);
    assert_eq!(submitted.record.id, draft.record.id);
    assert_eq!(submitted.record.stage, 1);
    assert_eq!(
        submitted.event.map(|e| e.event_type),
        Some("FIR_SUBMITTED".to_string())
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn only_filing_officers_file(pool: PgPool) {
    let result = intake::submit_case(
        &pool,
        &registry(),
        &verifying_officer(),
        case_submission("FIR/16/2024"),
        false,
    )
    .await;
    assert_matches!(result, Err(WorkflowError::Core(CoreError::Forbidden(_))));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn bad_ifsc_is_rejected(pool: PgPool) {
    let mut input = case_submission("FIR/17/2024");
    input.bank_ifsc = Some("SBI123".into());
    let result = intake::submit_case(&pool, &registry(), &filing_officer(), input, false).await;
    assert_matches!(result, Err(WorkflowError::Core(CoreError::Validation(_))));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn blank_incident_details_come_from_fir_registry(pool: PgPool) {
    let registry = StaticRegistry::default().with_fir(FirRecord {
        fir_no: "FIR/18/2024".into(),
        police_station_code: "KL-WYD-01".into(),
        police_station_name: SUB_UNIT.into(),
        district: DISTRICT.into(),
        state: STATE.into(),
        filing_datetime: Utc::now(),
        complainant_name: "Suresh".into(),
        victim_name: Some("Someone Else".into()),
        incident_date: date(2024, 2, 10),
        incident_location: Some("Meppadi".into()),
        incident_summary: Some("Assault at the village well".into()),
        sections_invoked: Some("3(1)(r)".into()),
    });
    let mut input = case_submission("FIR/18/2024");
    input.incident_location = Some("Kalpetta market".into());

    let outcome = intake::submit_case(&pool, &registry, &filing_officer(), input, false)
        .await
        .unwrap();

    let case = outcome.record;
    assert_eq!(case.incident_location.as_deref(), Some("Kalpetta market"));
    assert_eq!(case.incident_summary.as_deref(), Some("Assault at the village well"));
    assert_eq!(case.incident_date, Some(date(2024, 2, 10)));
    assert_eq!(case.applied_acts.as_deref(), Some("3(1)(r)"));
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn full_lifecycle_releases_three_tranches(pool: PgPool) {
    fund(&pool, 1_000_000).await;
    let case = file_case(&pool, "FIR/20/2024").await;

    let mut verify = ActionRequest::new(ActionKind::Approve, Role::VerifyingOfficer);
    verify.amount = Some(100_000);
    let verified = engine::transition_case(&pool, &settings(), &verifying_officer(), case.id, &verify)
        .await
        .unwrap();
    assert_eq!(verified.record.stage, 2);
    assert_eq!(verified.record.compensation_amount, Some(100_000));

    act_on_case(&pool, &state_officer(), case.id, ActionKind::Approve)
        .await
        .unwrap();

    let first = engine::transition_case(
        &pool,
        &settings(),
        &fund_officer(),
        case.id,
        &ActionRequest::new(ActionKind::ReleaseFunds, Role::FundOfficer),
    )
    .await
    .unwrap();
    assert_eq!(first.record.stage, 4);
    assert_eq!(first.disbursement.as_ref().map(|e| e.amount), Some(25_000));
    assert_eq!(first.event.payload["tranche"], "FIRST");

    act_on_case(&pool, &filing_officer(), case.id, ActionKind::SubmitChargesheet)
        .await
        .unwrap();
    let second = act_on_case(&pool, &fund_officer(), case.id, ActionKind::ReleaseFunds)
        .await
        .unwrap();
    assert_eq!(second.disbursed_amount, 75_000);

    act_on_case(&pool, &district_officer(), case.id, ActionKind::RecordJudgment)
        .await
        .unwrap();
    let closed = act_on_case(&pool, &fund_officer(), case.id, ActionKind::ReleaseFunds)
        .await
        .unwrap();

    assert_eq!(closed.stage, 8);
    assert_eq!(closed.pending_at, "Closed");
    assert_eq!(closed.disbursed_amount, 100_000);
    // Sanctioned amount survives later transitions.
    assert_eq!(closed.compensation_amount, Some(100_000));

    let events = engine::case_timeline(&pool, &state_officer(), case.id)
        .await
        .unwrap();
    assert_eq!(
        event_types(&events),
        [
            "FIR_SUBMITTED",
            "VERIFIED",
            "SANCTIONED",
            "FIRST_TRANCHE_RELEASED",
            "CHARGESHEET_SUBMITTED",
            "SECOND_TRANCHE_RELEASED",
            "JUDGMENT_RECORDED",
            "FINAL_TRANCHE_RELEASED",
        ]
    );
    assert_eq!(verify_record(&pool, EventLog::Case, case.id).await.unwrap(), None);

    let balance = treasury::balance(&pool, &state_officer(), &Jurisdiction::new(STATE, DISTRICT))
        .await
        .unwrap();
    assert_eq!(balance, 900_000);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn verifier_without_amount_sanctions_default(pool: PgPool) {
    let case = file_case(&pool, "FIR/21/2024").await;
    let verified = act_on_case(&pool, &verifying_officer(), case.id, ActionKind::Approve)
        .await
        .unwrap();
    assert_eq!(
        verified.compensation_amount,
        Some(settings().default_compensation_amount)
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn out_of_range_compensation_is_not_sanctioned(pool: PgPool) {
    let case = file_case(&pool, "FIR/23/2024").await;

    for amount in [3, i64::MAX / 10] {
        let mut verify = ActionRequest::new(ActionKind::Approve, Role::VerifyingOfficer);
        verify.amount = Some(amount);
        let err = engine::transition_case(&pool, &settings(), &verifying_officer(), case.id, &verify)
            .await
            .unwrap_err();
        assert_matches!(err, WorkflowError::Core(CoreError::Validation(_)));
    }

    let unchanged = CaseRepo::find_by_id(&pool, case.id).await.unwrap().unwrap();
    assert_eq!(unchanged.stage, 1);
    assert_eq!(unchanged.compensation_amount, None);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn correction_returns_case_to_verifier(pool: PgPool) {
    let case = file_case(&pool, "FIR/22/2024").await;
    act_on_case(&pool, &verifying_officer(), case.id, ActionKind::Approve)
        .await
        .unwrap();

    let mut request = ActionRequest::new(ActionKind::RequestCorrection, Role::StateOfficer);
    request.comment = Some("Medical report missing".into());
    let outcome = engine::transition_case(&pool, &settings(), &state_officer(), case.id, &request)
        .await
        .unwrap();

    assert_eq!(outcome.record.stage, 1);
    assert_eq!(outcome.record.pending_at, "Tribal Officer");
    assert_eq!(outcome.event.event_type, "CORRECTION_REQUESTED");
    assert_eq!(outcome.event.stage, 2);
    assert_eq!(outcome.event.comment.as_deref(), Some("Medical report missing"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn preconditions_fail_in_order(pool: PgPool) {
    let case = file_case(&pool, "FIR/23/2024").await;

    assert_matches!(
        act_on_case(&pool, &verifying_officer(), case.id + 1000, ActionKind::Approve).await,
        Err(WorkflowError::Core(CoreError::NotFound { .. }))
    );

    // Outside the jurisdiction, even with a mismatched role claim.
    let outsider = verifying_officer_in("Idukki");
    let mismatched = ActionRequest::new(ActionKind::Approve, Role::StateOfficer);
    assert_matches!(
        engine::transition_case(&pool, &settings(), &outsider, case.id, &mismatched).await,
        Err(WorkflowError::Core(CoreError::Forbidden(_)))
    );

    assert_matches!(
        engine::transition_case(&pool, &settings(), &verifying_officer(), case.id, &mismatched)
            .await,
        Err(WorkflowError::Core(CoreError::RoleMismatch { .. }))
    );

    assert_matches!(
        act_on_case(&pool, &verifying_officer(), case.id, ActionKind::SubmitChargesheet).await,
        Err(WorkflowError::Core(CoreError::WrongStage { actual: 1, .. }))
    );

    assert_matches!(
        act_on_case(&pool, &state_officer(), case.id, ActionKind::Approve).await,
        Err(WorkflowError::Core(CoreError::RoleNotAllowedAtStage { stage: 1, .. }))
    );

    // Fund officers only see cases at a disbursement stage.
    assert_matches!(
        act_on_case(&pool, &fund_officer(), case.id, ActionKind::ReleaseFunds).await,
        Err(WorkflowError::Core(CoreError::Forbidden(_)))
    );

    // Nothing above wrote anything.
    let events = engine::case_timeline(&pool, &filing_officer(), case.id)
        .await
        .unwrap();
    assert_eq!(events.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn release_without_funds_rolls_back(pool: PgPool) {
    let case = file_case(&pool, "FIR/24/2024").await;
    act_on_case(&pool, &verifying_officer(), case.id, ActionKind::Approve)
        .await
        .unwrap();
    act_on_case(&pool, &state_officer(), case.id, ActionKind::Approve)
        .await
        .unwrap();

    assert_matches!(
        act_on_case(&pool, &fund_officer(), case.id, ActionKind::ReleaseFunds).await,
        Err(WorkflowError::Core(CoreError::InsufficientFunds { available: 0, .. }))
    );

    let unchanged = CaseRepo::find_by_id(&pool, case.id).await.unwrap().unwrap();
    assert_eq!(unchanged.stage, 3);
    assert_eq!(unchanged.disbursed_amount, 0);
    let events = engine::case_timeline(&pool, &state_officer(), case.id)
        .await
        .unwrap();
    assert_eq!(event_types(&events), ["FIR_SUBMITTED", "VERIFIED", "SANCTIONED"]);
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_only_shows_visible_cases(pool: PgPool) {
    let case = file_case(&pool, "FIR/30/2024").await;

    let own = engine::list_cases(&pool, &filing_officer(), &CaseListQuery::default())
        .await
        .unwrap();
    assert_eq!(own.iter().map(|c| c.id).collect::<Vec<_>>(), [case.id]);

    let elsewhere = engine::list_cases(
        &pool,
        &verifying_officer_in("Idukki"),
        &CaseListQuery::default(),
    )
    .await
    .unwrap();
    assert!(elsewhere.is_empty());

    // Not yet at a disbursement stage.
    let fund = engine::list_cases(&pool, &fund_officer(), &CaseListQuery::default())
        .await
        .unwrap();
    assert!(fund.is_empty());

    assert_matches!(
        engine::get_case(&pool, &verifying_officer_in("Idukki"), case.id).await,
        Err(WorkflowError::Core(CoreError::Forbidden(_)))
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn event_appended_by_older_transaction_stays_last_in_chain(pool: PgPool) {
    let case = file_case(&pool, "FIR/77/2024").await;

    let mut older = pool.begin().await.unwrap();
    sqlx::query("SELECT 1").execute(&mut *older).await.unwrap();

    let mut newer = pool.begin().await.unwrap();
    CaseRepo::lock_by_id(&mut newer, case.id).await.unwrap();
    append_event(&mut newer, note(case.id, "FIRST_NOTE")).await.unwrap();
    newer.commit().await.unwrap();

    CaseRepo::lock_by_id(&mut older, case.id).await.unwrap();
    append_event(&mut older, note(case.id, "SECOND_NOTE")).await.unwrap();
    older.commit().await.unwrap();

    let events = engine::case_timeline(&pool, &verifying_officer(), case.id)
        .await
        .unwrap();
    assert_eq!(
        event_types(&events),
        ["FIR_SUBMITTED", "FIRST_NOTE", "SECOND_NOTE"]
    );
    assert!(events.windows(2).all(|w| w[0].created_at <= w[1].created_at));
    assert_eq!(verify_record(&pool, EventLog::Case, case.id).await.unwrap(), None);
}

fn note(case_id: i64, event_type: &str) -> NewEvent<'_> {
    NewEvent {
        log: EventLog::Case,
        record_id: case_id,
        actor: "to-1",
        actor_role: Role::VerifyingOfficer,
        stage: 1,
        event_type,
        comment: None,
        payload: serde_json::json!({}),
    }
}
