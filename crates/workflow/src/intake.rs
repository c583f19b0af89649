//! Submission intake for cases and applications.
//!
//! Intake is an upsert by external reference (FIR number, marriage
//! certificate number) and is safe to retry: a record is only ever moved
//! forward, and the submitted event is written at most once per record.

use dbt_core::actor::{Actor, ActorClaims};
use dbt_core::error::CoreError;
use dbt_core::intake::{
    couple_key, decide, ensure_submitter_is_party, normalize_reference, validate_couple,
    validate_ifsc, validate_mobile, IntakeDecision,
};
use dbt_core::jurisdiction::authorize;
use dbt_core::settings::WorkflowSettings;
use dbt_core::stages::{ApplicationStage, ApplicationStatus, CaseStage, WorkflowStage};
use dbt_core::types::DbId;
use dbt_db::locks::advisory_xact_lock;
use dbt_db::models::application::{ApplicationScope, ApplicationSubmission, MarriageApplication};
use dbt_db::models::case::{AtrocityCase, CaseScope, CaseSubmission};
use dbt_db::models::event::{AuditEvent, EventLog};
use dbt_db::models::registry::PersonRecord;
use dbt_db::repositories::{ApplicationRepo, AuditEventRepo, CaseRepo};
use serde::Serialize;
use serde_json::json;
use sqlx::{PgPool, Postgres, Transaction};
use validator::Validate;

use crate::audit::{append_event, NewEvent};
use crate::error::WorkflowResult;
use crate::registry::RegistryLookup;

/// What intake did with a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    Created,
    Advanced,
    Unchanged,
}

#[derive(Debug, Clone, Serialize)]
pub struct IntakeOutcome<R> {
    pub record: R,
    pub disposition: Disposition,
    /// The submitted/resubmitted event, when one was written.
    pub event: Option<AuditEvent>,
}

/// Submitted on first submission, resubmitted on every later one.
async fn submission_event_type<S: WorkflowStage>(
    tx: &mut Transaction<'_, Postgres>,
    log: EventLog,
    record_id: DbId,
) -> WorkflowResult<&'static str> {
    let already = AuditEventRepo::exists_of_type(tx, log, record_id, S::SUBMITTED_EVENT).await?;
    Ok(if already {
        S::RESUBMITTED_EVENT
    } else {
        S::SUBMITTED_EVENT
    })
}

// ---------------------------------------------------------------------------
// Atrocity cases
// ---------------------------------------------------------------------------

fn check_case_fields(input: &CaseSubmission) -> Result<(), CoreError> {
    if let Some(ifsc) = input.bank_ifsc.as_deref() {
        validate_ifsc(ifsc)?;
    }
    for mobile in [input.victim_mobile.as_deref(), input.applicant_mobile.as_deref()]
        .into_iter()
        .flatten()
    {
        validate_mobile(mobile)?;
    }
    Ok(())
}

/// Fill incident details the filer left blank from the FIR registry.
async fn enrich_from_fir(registry: &dyn RegistryLookup, input: &mut CaseSubmission) {
    let fir = match registry.find_fir(&input.fir_no).await {
        Ok(Some(fir)) => fir,
        Ok(None) => {
            tracing::warn!(fir_no = %input.fir_no, "FIR not found in registry");
            return;
        }
        Err(e) => {
            tracing::warn!(fir_no = %input.fir_no, error = %e, "FIR registry lookup failed");
            return;
        }
    };

    if let Some(name) = fir.victim_name.as_deref() {
        if !name.trim().eq_ignore_ascii_case(input.victim_name.trim()) {
            tracing::warn!(fir_no = %input.fir_no, "Victim name differs from FIR registry");
        }
    }
    input.incident_summary = input.incident_summary.take().or(fir.incident_summary);
    input.incident_location = input.incident_location.take().or(fir.incident_location);
    input.incident_date = input.incident_date.or(Some(fir.incident_date));
    input.applied_acts = input.applied_acts.take().or(fir.sections_invoked);
}

/// File or submit an atrocity case.
///
/// Only filing officers may file, and the case lands in the filer's own
/// jurisdiction. `is_draft` keeps the case with the filer.
pub async fn submit_case(
    pool: &PgPool,
    registry: &dyn RegistryLookup,
    actor: &ActorClaims,
    mut input: CaseSubmission,
    is_draft: bool,
) -> WorkflowResult<IntakeOutcome<AtrocityCase>> {
    let Actor::FilingOfficer {
        state_ut,
        district,
        sub_unit,
    } = &actor.actor
    else {
        tracing::warn!(user = %actor.subject, role = %actor.role(), "Case filing refused");
        return Err(CoreError::Forbidden(format!("{} may not file cases", actor.role())).into());
    };
    let scope = CaseScope {
        state_ut: state_ut.clone(),
        district: district.clone(),
        sub_unit: sub_unit.clone(),
    };

    input.fir_no = normalize_reference(&input.fir_no)?;
    input.validate()?;
    check_case_fields(&input)?;
    enrich_from_fir(registry, &mut input).await;

    let mut tx = pool.begin().await?;
    advisory_xact_lock(&mut tx, &format!("intake:case:{}", input.fir_no)).await?;

    let existing = CaseRepo::find_by_fir_no_for_update(&mut tx, &input.fir_no).await?;
    if let Some(case) = &existing {
        authorize(&actor.actor, case)?;
    }

    let decision = decide::<CaseStage>(existing.as_ref().map(|c| c.stage), is_draft)?;
    let (record, disposition, stage) = match (decision, existing) {
        (IntakeDecision::Unchanged, Some(case)) => {
            tracing::debug!(case_id = case.id, stage = case.stage, "Case intake is a retry");
            return Ok(IntakeOutcome {
                record: case,
                disposition: Disposition::Unchanged,
                event: None,
            });
        }
        (IntakeDecision::Advance { stage, pending_at }, Some(case)) => {
            let record =
                CaseRepo::advance(&mut tx, case.id, &input, stage.number(), pending_at).await?;
            (record, Disposition::Advanced, stage)
        }
        (IntakeDecision::Create { stage, pending_at }, None) => {
            let record = CaseRepo::insert(
                &mut tx,
                &input,
                &scope,
                stage.number(),
                pending_at,
                &actor.subject,
            )
            .await?;
            (record, Disposition::Created, stage)
        }
        _ => {
            return Err(CoreError::Internal("Inconsistent intake decision".into()).into());
        }
    };

    let event = if stage == CaseStage::draft_stage() {
        None
    } else {
        let event_type =
            submission_event_type::<CaseStage>(&mut tx, EventLog::Case, record.id).await?;
        let payload = json!({
            "fir_no": record.fir_no,
            "to_stage": stage.number(),
            "pending_at": record.pending_at,
            "victim_aadhaar": input.victim_aadhaar,
        });
        Some(
            append_event(
                &mut tx,
                NewEvent {
                    log: EventLog::Case,
                    record_id: record.id,
                    actor: &actor.subject,
                    actor_role: actor.role(),
                    stage: CaseStage::draft_stage().number(),
                    event_type,
                    comment: None,
                    payload,
                },
            )
            .await?,
        )
    };

    tx.commit().await?;

    tracing::info!(
        case_id = record.id,
        fir_no = %record.fir_no,
        stage = record.stage,
        disposition = ?disposition,
        user = %actor.subject,
        "Case submitted",
    );
    Ok(IntakeOutcome {
        record,
        disposition,
        event,
    })
}

// ---------------------------------------------------------------------------
// Marriage applications
// ---------------------------------------------------------------------------

/// Compare a party against the person registry. Never fails.
async fn check_party(
    registry: &dyn RegistryLookup,
    party: &str,
    person_id: &str,
    name: &str,
    dob: chrono::NaiveDate,
) {
    match registry.find_person(person_id).await {
        Ok(Some(PersonRecord {
            full_name,
            dob: registered_dob,
            status,
            ..
        })) => {
            if !full_name.trim().eq_ignore_ascii_case(name.trim()) {
                tracing::warn!(party, person_id, "Name differs from person registry");
            }
            if registered_dob != dob {
                tracing::warn!(party, person_id, "Date of birth differs from person registry");
            }
            if !status.eq_ignore_ascii_case("active") {
                tracing::warn!(party, person_id, status = %status, "Registry record is not active");
            }
        }
        Ok(None) => tracing::warn!(party, person_id, "Person not found in registry"),
        Err(e) => tracing::warn!(party, person_id, error = %e, "Person registry lookup failed"),
    }
}

/// Duplicate checks across applications, run under the couple lock.
async fn ensure_no_duplicate(
    tx: &mut Transaction<'_, Postgres>,
    input: &ApplicationSubmission,
    exclude_id: Option<DbId>,
) -> WorkflowResult<()> {
    let open = ApplicationRepo::find_open_for_couple(
        tx,
        &input.groom_person_id,
        &input.bride_person_id,
        exclude_id,
    )
    .await?;
    if let Some(other) = open {
        return Err(CoreError::Conflict(format!(
            "Application {} for this couple is already in progress",
            other.id
        ))
        .into());
    }

    for person_id in [&input.groom_person_id, &input.bride_person_id] {
        if let Some(done) = ApplicationRepo::find_completed_for_party(tx, person_id).await? {
            return Err(CoreError::Conflict(format!(
                "Person {person_id} already received the incentive under application {}",
                done.id
            ))
            .into());
        }
    }
    Ok(())
}

/// Create, complete or resubmit a marriage incentive application.
///
/// The submitting citizen must be the groom or the bride.
pub async fn submit_application(
    pool: &PgPool,
    registry: &dyn RegistryLookup,
    settings: &WorkflowSettings,
    actor: &ActorClaims,
    mut input: ApplicationSubmission,
    is_draft: bool,
) -> WorkflowResult<IntakeOutcome<MarriageApplication>> {
    let Actor::Applicant {
        person_id,
        owner_id,
        state_ut,
        district,
    } = &actor.actor
    else {
        tracing::warn!(user = %actor.subject, role = %actor.role(), "Application refused");
        return Err(CoreError::Forbidden(format!(
            "{} may not submit applications",
            actor.role()
        ))
        .into());
    };

    input.certificate_no = normalize_reference(&input.certificate_no)?;
    input.groom_person_id = input.groom_person_id.trim().to_string();
    input.bride_person_id = input.bride_person_id.trim().to_string();
    input.validate()?;
    ensure_submitter_is_party(person_id, &input.groom_person_id, &input.bride_person_id)?;
    validate_couple(
        &input.groom_person_id,
        &input.bride_person_id,
        input.groom_dob,
        input.bride_dob,
        input.marriage_date,
        settings,
    )?;
    if let Some(ifsc) = input.joint_ifsc.as_deref() {
        validate_ifsc(ifsc)?;
    }

    check_party(
        registry,
        "groom",
        &input.groom_person_id,
        &input.groom_name,
        input.groom_dob,
    )
    .await;
    check_party(
        registry,
        "bride",
        &input.bride_person_id,
        &input.bride_name,
        input.bride_dob,
    )
    .await;

    let scope = ApplicationScope {
        owner_id: *owner_id,
        applicant_person_id: person_id.clone(),
        state_ut: state_ut.clone(),
        district: district.clone(),
    };

    let mut tx = pool.begin().await?;
    // Certificate first, couple second: every intake takes them in this order.
    advisory_xact_lock(&mut tx, &format!("intake:application:{}", input.certificate_no)).await?;
    let couple = couple_key(&input.groom_person_id, &input.bride_person_id);
    advisory_xact_lock(&mut tx, &format!("intake:couple:{}/{}", couple.0, couple.1)).await?;

    let existing =
        ApplicationRepo::find_by_certificate_for_update(&mut tx, &input.certificate_no).await?;
    if let Some(application) = &existing {
        authorize(&actor.actor, application)?;
        if couple_key(&application.groom_person_id, &application.bride_person_id) != couple {
            return Err(CoreError::Conflict(format!(
                "Certificate {} is registered to a different couple",
                input.certificate_no
            ))
            .into());
        }
    }

    let decision = decide::<ApplicationStage>(existing.as_ref().map(|a| a.stage), is_draft)?;
    let (record, disposition, stage) = match (decision, existing) {
        (IntakeDecision::Unchanged, Some(application)) => {
            tracing::debug!(
                application_id = application.id,
                stage = application.stage,
                "Application intake is a retry",
            );
            return Ok(IntakeOutcome {
                record: application,
                disposition: Disposition::Unchanged,
                event: None,
            });
        }
        (IntakeDecision::Advance { stage, pending_at }, Some(application)) => {
            ensure_no_duplicate(&mut tx, &input, Some(application.id)).await?;
            let record = ApplicationRepo::advance(
                &mut tx,
                application.id,
                &input,
                stage.number(),
                pending_at,
                ApplicationStatus::after_move(stage, false, false),
            )
            .await?;
            (record, Disposition::Advanced, stage)
        }
        (IntakeDecision::Create { stage, pending_at }, None) => {
            ensure_no_duplicate(&mut tx, &input, None).await?;
            let record = ApplicationRepo::insert(
                &mut tx,
                &input,
                &scope,
                stage.number(),
                pending_at,
                ApplicationStatus::after_move(stage, false, false),
            )
            .await?;
            (record, Disposition::Created, stage)
        }
        _ => {
            return Err(CoreError::Internal("Inconsistent intake decision".into()).into());
        }
    };

    let event = if stage == ApplicationStage::draft_stage() {
        None
    } else {
        let event_type =
            submission_event_type::<ApplicationStage>(&mut tx, EventLog::Application, record.id)
                .await?;
        let payload = json!({
            "certificate_no": record.certificate_no,
            "to_stage": stage.number(),
            "pending_at": record.pending_at,
            "joint_account_no": record.joint_account_no,
        });
        Some(
            append_event(
                &mut tx,
                NewEvent {
                    log: EventLog::Application,
                    record_id: record.id,
                    actor: &actor.subject,
                    actor_role: actor.role(),
                    stage: ApplicationStage::draft_stage().number(),
                    event_type,
                    comment: None,
                    payload,
                },
            )
            .await?,
        )
    };

    tx.commit().await?;

    tracing::info!(
        application_id = record.id,
        certificate_no = %record.certificate_no,
        stage = record.stage,
        disposition = ?disposition,
        user = %actor.subject,
        "Application submitted",
    );
    Ok(IntakeOutcome {
        record,
        disposition,
        event,
    })
}
