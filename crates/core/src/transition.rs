//! Transition planning: the precondition chain in front of every action.
//!
//! [`plan_transition`] runs the checks in a fixed order and returns the first
//! failure:
//!
//! 1. jurisdiction (`Forbidden`)
//! 2. claimed role equals verified role (`RoleMismatch`)
//! 3. current stage accepted by the action (`WrongStage`)
//! 4. stage owner equals the acting role (`RoleNotAllowedAtStage`)
//!
//! Existence is checked by the caller before any of these, since it needs
//! storage. The resulting [`TransitionPlan`] says exactly what to write.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::actor::Actor;
use crate::error::CoreError;
use crate::jurisdiction::{authorize, JurisdictionTarget};
use crate::roles::Role;
use crate::stages::{
    parse_stage, ApplicationStage, CaseStage, PendingAt, StageRule, Tranche, WorkflowStage,
};

/// Actions an officer can take on an existing record.
///
/// Submission is not here: it goes through intake, which has its own
/// idempotency rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Approve,
    RequestCorrection,
    Reject,
    ReleaseFunds,
    SubmitChargesheet,
    RecordJudgment,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::RequestCorrection => "request_correction",
            Self::Reject => "reject",
            Self::ReleaseFunds => "release_funds",
            Self::SubmitChargesheet => "submit_chargesheet",
            Self::RecordJudgment => "record_judgment",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which stages accept which action, per workflow.
pub trait ActionStages: WorkflowStage {
    /// Stages at which `action` is legal. Empty when the workflow has no such action.
    fn expected_stages(action: ActionKind) -> &'static [Self];
}

impl ActionStages for CaseStage {
    fn expected_stages(action: ActionKind) -> &'static [Self] {
        match action {
            ActionKind::Approve => &[Self::AwaitingVerification, Self::AwaitingSanction],
            ActionKind::RequestCorrection => &[Self::AwaitingSanction],
            ActionKind::ReleaseFunds => &[
                Self::AwaitingFirstTranche,
                Self::AwaitingSecondTranche,
                Self::AwaitingFinalTranche,
            ],
            ActionKind::SubmitChargesheet => &[Self::AwaitingChargesheet],
            ActionKind::RecordJudgment => &[Self::AwaitingJudgment],
            ActionKind::Reject => &[],
        }
    }
}

impl ActionStages for ApplicationStage {
    fn expected_stages(action: ActionKind) -> &'static [Self] {
        const OFFICER_STAGES: &[ApplicationStage] = &[
            ApplicationStage::AwaitingVerification,
            ApplicationStage::AwaitingDistrictApproval,
            ApplicationStage::AwaitingSanction,
            ApplicationStage::AwaitingDisbursement,
        ];
        match action {
            ActionKind::Approve => &[
                Self::AwaitingVerification,
                Self::AwaitingDistrictApproval,
                Self::AwaitingSanction,
            ],
            ActionKind::RequestCorrection | ActionKind::Reject => OFFICER_STAGES,
            ActionKind::ReleaseFunds => &[Self::AwaitingDisbursement],
            ActionKind::SubmitChargesheet | ActionKind::RecordJudgment => &[],
        }
    }
}

/// Everything the store needs to apply a legal transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionPlan<S> {
    pub action: ActionKind,
    pub acting_role: Role,
    pub from: S,
    pub to: S,
    pub pending_at: PendingAt,
    pub event_type: &'static str,
    /// Present only for fund releases.
    pub tranche: Option<Tranche>,
}

fn rule_for<S: WorkflowStage>(stage: S, action: ActionKind) -> Option<StageRule<S>> {
    match action {
        ActionKind::RequestCorrection => stage.correction(),
        ActionKind::Reject => stage.rejection(),
        ActionKind::Approve
        | ActionKind::ReleaseFunds
        | ActionKind::SubmitChargesheet
        | ActionKind::RecordJudgment => stage.forward(),
    }
}

/// Run the precondition chain for `action` on `target`.
///
/// `accepts_actions` is false for records that are closed outside the stage
/// table (a rejected application); they fail the stage check like any
/// terminal record.
pub fn plan_transition<S, T>(
    actor: &Actor,
    target: &T,
    claimed_role: Role,
    action: ActionKind,
    accepts_actions: bool,
) -> Result<TransitionPlan<S>, CoreError>
where
    S: ActionStages,
    T: JurisdictionTarget + ?Sized,
{
    authorize(actor, target)?;

    let verified = actor.role();
    if claimed_role != verified {
        return Err(CoreError::RoleMismatch {
            claimed: claimed_role,
            verified,
        });
    }

    let expected = S::expected_stages(action);
    if expected.is_empty() {
        return Err(CoreError::Validation(format!(
            "Action '{action}' is not available for {}",
            S::KIND.entity()
        )));
    }

    let stage: S = parse_stage(target.stage())?;
    if !accepts_actions || !expected.contains(&stage) {
        return Err(CoreError::WrongStage {
            actual: stage.number(),
            expected: expected.iter().map(|s| s.number()).collect(),
        });
    }

    let rule = rule_for(stage, action).ok_or_else(|| {
        CoreError::Internal(format!(
            "No rule for '{action}' at stage {} of {}",
            stage.number(),
            S::KIND.entity()
        ))
    })?;

    if rule.allowed_role != claimed_role {
        return Err(CoreError::RoleNotAllowedAtStage {
            role: claimed_role,
            stage: stage.number(),
        });
    }

    let tranche = match action {
        ActionKind::ReleaseFunds => stage.tranche(),
        _ => None,
    };

    Ok(TransitionPlan {
        action,
        acting_role: claimed_role,
        from: stage,
        to: rule.next_stage,
        pending_at: rule.next_pending_at,
        event_type: rule.event_type,
        tranche,
    })
}
