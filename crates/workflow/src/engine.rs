//! Stage transitions and record reads for both workflows.
//!
//! A transition runs in one transaction:
//!
//! 1. lock the record row (`SELECT ... FOR UPDATE`), `NotFound` if absent
//! 2. plan the move with [`plan_transition`] (jurisdiction, role, stage checks)
//! 3. for fund releases, debit the jurisdiction's treasury
//! 4. update the record and append exactly one audit event
//!
//! Any failure drops the transaction, so either all of it lands or none of it.

use dbt_core::actor::ActorClaims;
use dbt_core::error::CoreError;
use dbt_core::jurisdiction::{authorize, filter_visible, JurisdictionTarget};
use dbt_core::roles::Role;
use dbt_core::settings::{validate_compensation, WorkflowSettings};
use dbt_core::stages::{ApplicationStage, ApplicationStatus, CaseStage, WorkflowStage};
use dbt_core::transition::{plan_transition, ActionKind, ActionStages, TransitionPlan};
use dbt_core::treasury::Jurisdiction;
use dbt_core::types::{Amount, DbId};
use dbt_db::models::application::{
    ApplicationListQuery, ApplicationTransition, MarriageApplication,
};
use dbt_db::models::case::{AtrocityCase, CaseListQuery, CaseTransition};
use dbt_db::models::event::{AuditEvent, EventLog};
use dbt_db::models::treasury::TreasuryEntry;
use dbt_db::repositories::{ApplicationRepo, AuditEventRepo, CaseRepo};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::{PgPool, Postgres, Transaction};

use crate::audit::{append_event, NewEvent};
use crate::error::WorkflowResult;
use crate::treasury::debit_in_tx;

// ---------------------------------------------------------------------------
// Requests and outcomes
// ---------------------------------------------------------------------------

/// An officer's request to act on a record.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionRequest {
    pub action: ActionKind,
    /// Role the caller says it is acting as; must equal the verified role.
    pub claimed_role: Role,
    pub comment: Option<String>,
    /// Compensation to sanction when verifying a case, or the amount the
    /// caller expects a release to pay out.
    pub amount: Option<Amount>,
    /// Free-form details recorded in the event payload (chargesheet number,
    /// verdict, correction reasons).
    #[serde(default)]
    pub details: serde_json::Value,
}

impl ActionRequest {
    pub fn new(action: ActionKind, claimed_role: Role) -> Self {
        Self {
            action,
            claimed_role,
            comment: None,
            amount: None,
            details: serde_json::Value::Null,
        }
    }
}

/// What a successful transition wrote.
#[derive(Debug, Clone, Serialize)]
pub struct TransitionOutcome<R> {
    pub record: R,
    pub event: AuditEvent,
    /// The treasury debit, for fund releases.
    pub disbursement: Option<TreasuryEntry>,
}

fn plan_or_log<S, T>(
    actor: &ActorClaims,
    target: &T,
    request: &ActionRequest,
    accepts_actions: bool,
) -> Result<TransitionPlan<S>, CoreError>
where
    S: ActionStages,
    T: JurisdictionTarget,
{
    plan_transition(
        &actor.actor,
        target,
        request.claimed_role,
        request.action,
        accepts_actions,
    )
    .inspect_err(|err| {
        tracing::warn!(
            entity = S::KIND.entity(),
            record_id = target.record_id(),
            user = %actor.subject,
            role = %actor.role(),
            action = %request.action,
            error = %err,
            "Transition refused",
        );
    })
}

fn event_payload<S: WorkflowStage>(
    plan: &TransitionPlan<S>,
    request: &ActionRequest,
) -> serde_json::Value {
    let mut payload = json!({
        "action": plan.action,
        "from_stage": plan.from.number(),
        "to_stage": plan.to.number(),
        "pending_at": plan.pending_at.label(),
    });
    if !request.details.is_null() {
        payload["details"] = request.details.clone();
    }
    payload
}

/// A fund release about to be debited.
struct Release<'a> {
    reference: String,
    tranche: &'a str,
    amount: Amount,
    /// Amount the caller expected, if it said.
    requested: Option<Amount>,
}

/// Debit the record's jurisdiction for a release and note it in `payload`.
async fn release(
    tx: &mut Transaction<'_, Postgres>,
    target: &impl JurisdictionTarget,
    debit: Release<'_>,
    created_by: &str,
    payload: &mut serde_json::Value,
) -> WorkflowResult<TreasuryEntry> {
    let Release {
        reference,
        tranche,
        amount,
        requested,
    } = debit;
    if let Some(requested) = requested.filter(|r| *r != amount) {
        tracing::warn!(
            record_id = target.record_id(),
            requested,
            amount,
            "Requested release amount differs from the configured amount",
        );
        payload["requested_amount"] = json!(requested);
    }

    let jurisdiction = Jurisdiction::new(target.state_ut(), target.district());
    let entry = debit_in_tx(tx, &jurisdiction, amount, Some(reference), created_by).await?;
    payload["tranche"] = json!(tranche);
    payload["amount"] = json!(amount);
    payload["balance_after"] = json!(entry.balance_after);
    Ok(entry)
}

// ---------------------------------------------------------------------------
// Atrocity cases
// ---------------------------------------------------------------------------

/// Apply an officer action to a case.
pub async fn transition_case(
    pool: &PgPool,
    settings: &WorkflowSettings,
    actor: &ActorClaims,
    case_id: DbId,
    request: &ActionRequest,
) -> WorkflowResult<TransitionOutcome<AtrocityCase>> {
    let mut tx = pool.begin().await?;
    let case = CaseRepo::lock_by_id(&mut tx, case_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "AtrocityCase",
            id: case_id,
        })?;

    let plan: TransitionPlan<CaseStage> = plan_or_log(actor, &case, request, true)?;
    let mut payload = event_payload(&plan, request);

    // The verifier fixes the compensation; everything later pays out of it.
    let mut compensation_amount = None;
    if plan.action == ActionKind::Approve && plan.from == CaseStage::AwaitingVerification {
        let amount = request
            .amount
            .unwrap_or(settings.default_compensation_amount);
        validate_compensation(amount)?;
        payload["compensation_amount"] = json!(amount);
        compensation_amount = Some(amount);
    }

    let mut disbursement = None;
    if let Some(tranche) = plan.tranche {
        let total = case.compensation_amount.ok_or_else(|| {
            CoreError::Validation(format!("Case {case_id} has no sanctioned compensation"))
        })?;
        let amount = tranche.amount(total, case.disbursed_amount)?;
        if amount <= 0 {
            return Err(CoreError::Validation(format!(
                "Nothing left to release for case {case_id}"
            ))
            .into());
        }
        let debit = Release {
            reference: format!("CASE{case_id}/{}", tranche.name),
            tranche: tranche.name,
            amount,
            requested: request.amount,
        };
        disbursement =
            Some(release(&mut tx, &case, debit, &actor.subject, &mut payload).await?);
    }
    let disbursed_delta = disbursement.as_ref().map_or(0, |e| e.amount);

    let record = CaseRepo::apply_transition(
        &mut tx,
        case_id,
        &CaseTransition {
            stage: plan.to.number(),
            pending_at: plan.pending_at.label().to_string(),
            approved_by: actor.subject.clone(),
            compensation_amount,
            disbursed_delta,
        },
    )
    .await?;

    let event = append_event(
        &mut tx,
        NewEvent {
            log: EventLog::Case,
            record_id: case_id,
            actor: &actor.subject,
            actor_role: plan.acting_role,
            stage: plan.from.number(),
            event_type: plan.event_type,
            comment: request.comment.as_deref(),
            payload,
        },
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        case_id,
        from = plan.from.number(),
        to = plan.to.number(),
        event_type = plan.event_type,
        user = %actor.subject,
        disbursed = disbursed_delta,
        "Case transitioned",
    );

    Ok(TransitionOutcome {
        record,
        event,
        disbursement,
    })
}

/// Load a case the actor may see.
pub async fn get_case(
    pool: &PgPool,
    actor: &ActorClaims,
    case_id: DbId,
) -> WorkflowResult<AtrocityCase> {
    let case = CaseRepo::find_by_id(pool, case_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "AtrocityCase",
            id: case_id,
        })?;
    authorize(&actor.actor, &case)?;
    Ok(case)
}

/// Cases matching `query` that the actor may see, newest first.
pub async fn list_cases(
    pool: &PgPool,
    actor: &ActorClaims,
    query: &CaseListQuery,
) -> WorkflowResult<Vec<AtrocityCase>> {
    let cases = CaseRepo::list(pool, query).await?;
    Ok(filter_visible(&actor.actor, cases))
}

/// A case's audit events, oldest first.
pub async fn case_timeline(
    pool: &PgPool,
    actor: &ActorClaims,
    case_id: DbId,
) -> WorkflowResult<Vec<AuditEvent>> {
    get_case(pool, actor, case_id).await?;
    Ok(AuditEventRepo::list_for_record(pool, EventLog::Case, case_id).await?)
}

// ---------------------------------------------------------------------------
// Marriage applications
// ---------------------------------------------------------------------------

/// Apply an officer action to an application.
pub async fn transition_application(
    pool: &PgPool,
    settings: &WorkflowSettings,
    actor: &ActorClaims,
    application_id: DbId,
    request: &ActionRequest,
) -> WorkflowResult<TransitionOutcome<MarriageApplication>> {
    let mut tx = pool.begin().await?;
    let application = ApplicationRepo::lock_by_id(&mut tx, application_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "MarriageApplication",
            id: application_id,
        })?;

    let accepts_actions = !application.is_rejected();
    let plan: TransitionPlan<ApplicationStage> =
        plan_or_log(actor, &application, request, accepts_actions)?;
    let mut payload = event_payload(&plan, request);

    let mut disbursement = None;
    if let Some(tranche) = plan.tranche {
        let amount = tranche.amount(
            settings.marriage_grant_amount,
            application.disbursed_amount,
        )?;
        let debit = Release {
            reference: format!("ICM{application_id}/{}", tranche.name),
            tranche: tranche.name,
            amount,
            requested: request.amount,
        };
        disbursement =
            Some(release(&mut tx, &application, debit, &actor.subject, &mut payload).await?);
    }
    let disbursed_delta = disbursement.as_ref().map_or(0, |e| e.amount);

    let status = ApplicationStatus::after_move(
        plan.to,
        plan.action == ActionKind::Reject,
        plan.action == ActionKind::RequestCorrection,
    );
    payload["status"] = json!(status.as_str());

    let record = ApplicationRepo::apply_transition(
        &mut tx,
        application_id,
        &ApplicationTransition {
            stage: plan.to.number(),
            pending_at: plan.pending_at.label().to_string(),
            approved_by: actor.subject.clone(),
            status,
            disbursed_delta,
        },
    )
    .await?;

    let event = append_event(
        &mut tx,
        NewEvent {
            log: EventLog::Application,
            record_id: application_id,
            actor: &actor.subject,
            actor_role: plan.acting_role,
            stage: plan.from.number(),
            event_type: plan.event_type,
            comment: request.comment.as_deref(),
            payload,
        },
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        application_id,
        from = plan.from.number(),
        to = plan.to.number(),
        event_type = plan.event_type,
        status = status.as_str(),
        user = %actor.subject,
        disbursed = disbursed_delta,
        "Application transitioned",
    );

    Ok(TransitionOutcome {
        record,
        event,
        disbursement,
    })
}

/// Load an application the actor may see.
pub async fn get_application(
    pool: &PgPool,
    actor: &ActorClaims,
    application_id: DbId,
) -> WorkflowResult<MarriageApplication> {
    let application = ApplicationRepo::find_by_id(pool, application_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "MarriageApplication",
            id: application_id,
        })?;
    authorize(&actor.actor, &application)?;
    Ok(application)
}

/// Applications matching `query` that the actor may see, newest first.
pub async fn list_applications(
    pool: &PgPool,
    actor: &ActorClaims,
    query: &ApplicationListQuery,
) -> WorkflowResult<Vec<MarriageApplication>> {
    let applications = ApplicationRepo::list(pool, query).await?;
    Ok(filter_visible(&actor.actor, applications))
}

/// An application's audit events, oldest first.
pub async fn application_timeline(
    pool: &PgPool,
    actor: &ActorClaims,
    application_id: DbId,
) -> WorkflowResult<Vec<AuditEvent>> {
    get_application(pool, actor, application_id).await?;
    Ok(AuditEventRepo::list_for_record(pool, EventLog::Application, application_id).await?)
}
