//! Jurisdiction scope checks.
//!
//! [`authorize`] is the single gate in front of every read and every write:
//! it is pure, deterministic and never touches storage. State and district
//! names compare case-insensitively after trimming; sub-unit codes compare
//! exactly.

use crate::actor::Actor;
use crate::error::CoreError;
use crate::stages::{ApplicationStage, CaseStage, WorkflowKind, WorkflowStage};
use crate::types::DbId;

/// The fields of a workflow record that jurisdiction rules look at.
pub trait JurisdictionTarget {
    fn workflow(&self) -> WorkflowKind;
    fn record_id(&self) -> DbId;
    fn state_ut(&self) -> &str;
    fn district(&self) -> &str;
    /// Sub-unit (police station) code. Applications have none.
    fn sub_unit(&self) -> Option<&str>;
    fn stage(&self) -> i16;

    /// Registry person ids of the two parties to an application.
    fn parties(&self) -> Option<(&str, &str)> {
        None
    }

    /// Citizen account that created an application.
    fn owner_id(&self) -> Option<DbId> {
        None
    }
}

pub fn same_place(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Raw stage numbers a fund officer may see for the given workflow.
pub fn disbursement_eligible(kind: WorkflowKind) -> Vec<i16> {
    match kind {
        WorkflowKind::Case => CaseStage::DISBURSEMENT_ELIGIBLE
            .iter()
            .map(|s| s.number())
            .collect(),
        WorkflowKind::Application => ApplicationStage::DISBURSEMENT_ELIGIBLE
            .iter()
            .map(|s| s.number())
            .collect(),
    }
}

/// Check that `actor` may read or act on `target`.
pub fn authorize<T: JurisdictionTarget + ?Sized>(
    actor: &Actor,
    target: &T,
) -> Result<(), CoreError> {
    let allowed = match actor {
        Actor::FilingOfficer { sub_unit, .. } => target.workflow() == WorkflowKind::Case
            && target.sub_unit() == Some(sub_unit.as_str()),
        Actor::VerifyingOfficer { state_ut, district }
        | Actor::DistrictOfficer { state_ut, district } => {
            same_place(target.state_ut(), state_ut) && same_place(target.district(), district)
        }
        Actor::StateOfficer { state_ut } => same_place(target.state_ut(), state_ut),
        Actor::FundOfficer { state_ut } => {
            same_place(target.state_ut(), state_ut)
                && disbursement_eligible(target.workflow()).contains(&target.stage())
        }
        Actor::Applicant {
            person_id,
            owner_id,
            ..
        } => {
            target.workflow() == WorkflowKind::Application
                && (target
                    .parties()
                    .is_some_and(|(a, b)| a == person_id.as_str() || b == person_id.as_str())
                    || target.owner_id() == Some(*owner_id))
        }
    };

    if allowed {
        Ok(())
    } else {
        Err(CoreError::Forbidden(format!(
            "{} may not access {} {}",
            actor.role(),
            target.workflow().entity(),
            target.record_id()
        )))
    }
}

/// Keep only the records `actor` may see, preserving input order.
pub fn filter_visible<T: JurisdictionTarget>(actor: &Actor, records: Vec<T>) -> Vec<T> {
    records
        .into_iter()
        .filter(|record| authorize(actor, record).is_ok())
        .collect()
}
