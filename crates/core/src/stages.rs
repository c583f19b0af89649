//! Static stage tables for both workflows.
//!
//! Each workflow is a closed enum of stages. Every table lookup is an
//! exhaustive `match`, so adding a stage without deciding its owner, successor
//! and audit event does not compile.

use std::fmt;

use crate::error::CoreError;
use crate::roles::Role;
use crate::types::Amount;

// ---------------------------------------------------------------------------
// Shared types
// ---------------------------------------------------------------------------

/// Which workflow a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowKind {
    /// Atrocity compensation case.
    Case,
    /// Inter-caste marriage incentive application.
    Application,
}

impl WorkflowKind {
    /// Entity name used in not-found errors and log fields.
    pub fn entity(self) -> &'static str {
        match self {
            Self::Case => "AtrocityCase",
            Self::Application => "MarriageApplication",
        }
    }
}

/// Label stored in `pending_at` once a record has left every queue.
pub const PENDING_AT_CLOSED: &str = "Closed";

/// Who currently holds a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAt {
    Role(Role),
    Closed,
}

impl PendingAt {
    pub fn label(self) -> &'static str {
        match self {
            Self::Role(role) => role.label(),
            Self::Closed => PENDING_AT_CLOSED,
        }
    }

    pub fn from_label(label: &str) -> Result<Self, CoreError> {
        if label.trim().eq_ignore_ascii_case(PENDING_AT_CLOSED) {
            return Ok(Self::Closed);
        }
        Role::from_label(label).map(Self::Role)
    }
}

impl fmt::Display for PendingAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of a stage table: who may act and where the record goes next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageRule<S> {
    pub allowed_role: Role,
    pub next_stage: S,
    pub next_pending_at: PendingAt,
    pub event_type: &'static str,
}

/// A partial disbursement attached to a fund-bearing stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tranche {
    pub name: &'static str,
    /// Share of the total in percent.
    pub percent: Amount,
    /// The final tranche pays out whatever remains so rounding never loses a rupee.
    pub is_final: bool,
}

impl Tranche {
    /// Amount to release given the sanctioned total and what has already been paid.
    pub fn amount(&self, total: Amount, already_disbursed: Amount) -> Result<Amount, CoreError> {
        if self.is_final {
            return Ok(total.saturating_sub(already_disbursed).max(0));
        }
        total
            .checked_mul(self.percent)
            .map(|share| share / 100)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Sanctioned total {total} is too large to split into tranches"
                ))
            })
    }
}

/// Behaviour shared by the per-workflow stage enums.
pub trait WorkflowStage: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    const KIND: WorkflowKind;
    /// Every stage in ascending order.
    const ALL: &'static [Self];
    /// Stages at which a fund officer may see and act on a record.
    const DISBURSEMENT_ELIGIBLE: &'static [Self];
    /// Event recorded the first time a record leaves its draft stage.
    const SUBMITTED_EVENT: &'static str;
    /// Event recorded when a record returned for correction is submitted again.
    const RESUBMITTED_EVENT: &'static str;

    fn number(self) -> i16;

    /// Forward rule for this stage; `None` for terminal stages.
    fn forward(self) -> Option<StageRule<Self>>;

    /// Rule for sending the record back for correction, if allowed here.
    fn correction(self) -> Option<StageRule<Self>>;

    /// Rule for rejecting the record outright, if allowed here.
    fn rejection(self) -> Option<StageRule<Self>>;

    /// Tranche released when leaving this stage, if any.
    fn tranche(self) -> Option<Tranche>;

    fn from_number(number: i16) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.number() == number)
    }

    /// Role that owns the stage.
    fn allowed_role(self) -> Option<Role> {
        self.forward().map(|rule| rule.allowed_role)
    }

    fn pending_at(self) -> PendingAt {
        self.allowed_role().map_or(PendingAt::Closed, PendingAt::Role)
    }

    fn is_terminal(self) -> bool {
        self.forward().is_none()
    }

    fn is_disbursement_eligible(self) -> bool {
        Self::DISBURSEMENT_ELIGIBLE.contains(&self)
    }

    /// The stage a first (non-draft) submission lands on.
    fn first_review_stage() -> Self;

    /// The stage a draft sits on.
    fn draft_stage() -> Self;
}

/// Resolve a raw stage number, failing loudly on values outside the table.
pub fn parse_stage<S: WorkflowStage>(number: i16) -> Result<S, CoreError> {
    S::from_number(number).ok_or_else(|| {
        CoreError::Internal(format!(
            "Stage {number} is not defined for {}",
            S::KIND.entity()
        ))
    })
}

// ---------------------------------------------------------------------------
// Atrocity compensation case
// ---------------------------------------------------------------------------

/// Custody stages of an atrocity compensation case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseStage {
    Filed,
    AwaitingVerification,
    AwaitingSanction,
    AwaitingFirstTranche,
    AwaitingChargesheet,
    AwaitingSecondTranche,
    AwaitingJudgment,
    AwaitingFinalTranche,
    Closed,
}

pub const EVENT_FIR_SUBMITTED: &str = "FIR_SUBMITTED";
pub const EVENT_FIR_RESUBMITTED: &str = "FIR_RESUBMITTED";
pub const EVENT_CORRECTION_REQUESTED: &str = "CORRECTION_REQUESTED";

impl WorkflowStage for CaseStage {
    const KIND: WorkflowKind = WorkflowKind::Case;
    const ALL: &'static [Self] = &[
        Self::Filed,
        Self::AwaitingVerification,
        Self::AwaitingSanction,
        Self::AwaitingFirstTranche,
        Self::AwaitingChargesheet,
        Self::AwaitingSecondTranche,
        Self::AwaitingJudgment,
        Self::AwaitingFinalTranche,
        Self::Closed,
    ];
    const DISBURSEMENT_ELIGIBLE: &'static [Self] = &[
        Self::AwaitingFirstTranche,
        Self::AwaitingSecondTranche,
        Self::AwaitingFinalTranche,
        Self::Closed,
    ];
    const SUBMITTED_EVENT: &'static str = EVENT_FIR_SUBMITTED;
    const RESUBMITTED_EVENT: &'static str = EVENT_FIR_RESUBMITTED;

    fn number(self) -> i16 {
        match self {
            Self::Filed => 0,
            Self::AwaitingVerification => 1,
            Self::AwaitingSanction => 2,
            Self::AwaitingFirstTranche => 3,
            Self::AwaitingChargesheet => 4,
            Self::AwaitingSecondTranche => 5,
            Self::AwaitingJudgment => 6,
            Self::AwaitingFinalTranche => 7,
            Self::Closed => 8,
        }
    }

    fn forward(self) -> Option<StageRule<Self>> {
        let (allowed_role, next_stage, next_pending_at, event_type) = match self {
            Self::Filed => (
                Role::FilingOfficer,
                Self::AwaitingVerification,
                PendingAt::Role(Role::VerifyingOfficer),
                EVENT_FIR_SUBMITTED,
            ),
            Self::AwaitingVerification => (
                Role::VerifyingOfficer,
                Self::AwaitingSanction,
                PendingAt::Role(Role::StateOfficer),
                "VERIFIED",
            ),
            Self::AwaitingSanction => (
                Role::StateOfficer,
                Self::AwaitingFirstTranche,
                PendingAt::Role(Role::FundOfficer),
                "SANCTIONED",
            ),
            Self::AwaitingFirstTranche => (
                Role::FundOfficer,
                Self::AwaitingChargesheet,
                PendingAt::Role(Role::FilingOfficer),
                "FIRST_TRANCHE_RELEASED",
            ),
            Self::AwaitingChargesheet => (
                Role::FilingOfficer,
                Self::AwaitingSecondTranche,
                PendingAt::Role(Role::FundOfficer),
                "CHARGESHEET_SUBMITTED",
            ),
            Self::AwaitingSecondTranche => (
                Role::FundOfficer,
                Self::AwaitingJudgment,
                PendingAt::Role(Role::DistrictOfficer),
                "SECOND_TRANCHE_RELEASED",
            ),
            Self::AwaitingJudgment => (
                Role::DistrictOfficer,
                Self::AwaitingFinalTranche,
                PendingAt::Role(Role::FundOfficer),
                "JUDGMENT_RECORDED",
            ),
            Self::AwaitingFinalTranche => (
                Role::FundOfficer,
                Self::Closed,
                PendingAt::Closed,
                "FINAL_TRANCHE_RELEASED",
            ),
            Self::Closed => return None,
        };
        Some(StageRule {
            allowed_role,
            next_stage,
            next_pending_at,
            event_type,
        })
    }

    fn correction(self) -> Option<StageRule<Self>> {
        match self {
            Self::AwaitingSanction => Some(StageRule {
                allowed_role: Role::StateOfficer,
                next_stage: Self::AwaitingVerification,
                next_pending_at: PendingAt::Role(Role::VerifyingOfficer),
                event_type: EVENT_CORRECTION_REQUESTED,
            }),
            Self::Filed
            | Self::AwaitingVerification
            | Self::AwaitingFirstTranche
            | Self::AwaitingChargesheet
            | Self::AwaitingSecondTranche
            | Self::AwaitingJudgment
            | Self::AwaitingFinalTranche
            | Self::Closed => None,
        }
    }

    fn rejection(self) -> Option<StageRule<Self>> {
        None
    }

    fn tranche(self) -> Option<Tranche> {
        match self {
            Self::AwaitingFirstTranche => Some(Tranche {
                name: "FIRST",
                percent: 25,
                is_final: false,
            }),
            Self::AwaitingSecondTranche => Some(Tranche {
                name: "SECOND",
                percent: 50,
                is_final: false,
            }),
            Self::AwaitingFinalTranche => Some(Tranche {
                name: "FINAL",
                percent: 25,
                is_final: true,
            }),
            Self::Filed
            | Self::AwaitingVerification
            | Self::AwaitingSanction
            | Self::AwaitingChargesheet
            | Self::AwaitingJudgment
            | Self::Closed => None,
        }
    }

    fn first_review_stage() -> Self {
        Self::AwaitingVerification
    }

    fn draft_stage() -> Self {
        Self::Filed
    }
}

// ---------------------------------------------------------------------------
// Marriage incentive application
// ---------------------------------------------------------------------------

/// Custody stages of a marriage incentive application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApplicationStage {
    /// Draft, or returned to the applicant for correction.
    WithApplicant,
    AwaitingVerification,
    AwaitingDistrictApproval,
    AwaitingSanction,
    AwaitingDisbursement,
    Completed,
}

pub const EVENT_APPLICATION_SUBMITTED: &str = "APPLICATION_SUBMITTED";
pub const EVENT_APPLICATION_RESUBMITTED: &str = "APPLICATION_RESUBMITTED";

impl WorkflowStage for ApplicationStage {
    const KIND: WorkflowKind = WorkflowKind::Application;
    const ALL: &'static [Self] = &[
        Self::WithApplicant,
        Self::AwaitingVerification,
        Self::AwaitingDistrictApproval,
        Self::AwaitingSanction,
        Self::AwaitingDisbursement,
        Self::Completed,
    ];
    const DISBURSEMENT_ELIGIBLE: &'static [Self] = &[Self::AwaitingDisbursement, Self::Completed];
    const SUBMITTED_EVENT: &'static str = EVENT_APPLICATION_SUBMITTED;
    const RESUBMITTED_EVENT: &'static str = EVENT_APPLICATION_RESUBMITTED;

    fn number(self) -> i16 {
        match self {
            Self::WithApplicant => 0,
            Self::AwaitingVerification => 1,
            Self::AwaitingDistrictApproval => 2,
            Self::AwaitingSanction => 3,
            Self::AwaitingDisbursement => 4,
            Self::Completed => 5,
        }
    }

    fn forward(self) -> Option<StageRule<Self>> {
        let (allowed_role, next_stage, next_pending_at, event_type) = match self {
            Self::WithApplicant => (
                Role::Applicant,
                Self::AwaitingVerification,
                PendingAt::Role(Role::VerifyingOfficer),
                EVENT_APPLICATION_SUBMITTED,
            ),
            Self::AwaitingVerification => (
                Role::VerifyingOfficer,
                Self::AwaitingDistrictApproval,
                PendingAt::Role(Role::DistrictOfficer),
                "TO_APPROVED",
            ),
            Self::AwaitingDistrictApproval => (
                Role::DistrictOfficer,
                Self::AwaitingSanction,
                PendingAt::Role(Role::StateOfficer),
                "DM_APPROVED",
            ),
            Self::AwaitingSanction => (
                Role::StateOfficer,
                Self::AwaitingDisbursement,
                PendingAt::Role(Role::FundOfficer),
                "SNO_APPROVED",
            ),
            Self::AwaitingDisbursement => (
                Role::FundOfficer,
                Self::Completed,
                PendingAt::Closed,
                "PFMS_FUND_RELEASED",
            ),
            Self::Completed => return None,
        };
        Some(StageRule {
            allowed_role,
            next_stage,
            next_pending_at,
            event_type,
        })
    }

    fn correction(self) -> Option<StageRule<Self>> {
        let event_type = match self {
            Self::AwaitingVerification => "TO_CORRECTION",
            Self::AwaitingDistrictApproval => "DM_CORRECTION",
            Self::AwaitingSanction => "SNO_CORRECTION",
            Self::AwaitingDisbursement => "PFMS_CORRECTION",
            Self::WithApplicant | Self::Completed => return None,
        };
        Some(StageRule {
            allowed_role: self.allowed_role()?,
            next_stage: Self::WithApplicant,
            next_pending_at: PendingAt::Role(Role::Applicant),
            event_type,
        })
    }

    fn rejection(self) -> Option<StageRule<Self>> {
        let event_type = match self {
            Self::AwaitingVerification => "TO_REJECTED",
            Self::AwaitingDistrictApproval => "DM_REJECTED",
            Self::AwaitingSanction => "SNO_REJECTED",
            Self::AwaitingDisbursement => "PFMS_REJECTED",
            Self::WithApplicant | Self::Completed => return None,
        };
        Some(StageRule {
            allowed_role: self.allowed_role()?,
            next_stage: self,
            next_pending_at: PendingAt::Closed,
            event_type,
        })
    }

    fn tranche(self) -> Option<Tranche> {
        match self {
            Self::AwaitingDisbursement => Some(Tranche {
                name: "GRANT",
                percent: 100,
                is_final: true,
            }),
            Self::WithApplicant
            | Self::AwaitingVerification
            | Self::AwaitingDistrictApproval
            | Self::AwaitingSanction
            | Self::Completed => None,
        }
    }

    fn first_review_stage() -> Self {
        Self::AwaitingVerification
    }

    fn draft_stage() -> Self {
        Self::WithApplicant
    }
}

/// Coarse status shown to applicants, kept next to the stage.
///
/// `Rejected` closes an application outside the stage table: the stage stays
/// where the rejection happened and no further action is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationStatus {
    Draft,
    Pending,
    UnderReview,
    CorrectionRequired,
    Rejected,
    Completed,
}

impl ApplicationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::UnderReview => "under_review",
            Self::CorrectionRequired => "correction_required",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "draft" => Ok(Self::Draft),
            "pending" => Ok(Self::Pending),
            "under_review" => Ok(Self::UnderReview),
            "correction_required" => Ok(Self::CorrectionRequired),
            "rejected" => Ok(Self::Rejected),
            "completed" => Ok(Self::Completed),
            other => Err(CoreError::Internal(format!(
                "Unknown application status '{other}'"
            ))),
        }
    }

    /// Rejected and completed applications are finished.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Completed)
    }

    /// Status after an application moves to `stage`.
    pub fn after_move(stage: ApplicationStage, rejected: bool, corrected: bool) -> Self {
        if rejected {
            Self::Rejected
        } else if corrected {
            Self::CorrectionRequired
        } else {
            match stage {
                ApplicationStage::WithApplicant => Self::Draft,
                ApplicationStage::AwaitingVerification => Self::Pending,
                ApplicationStage::AwaitingDistrictApproval
                | ApplicationStage::AwaitingSanction
                | ApplicationStage::AwaitingDisbursement => Self::UnderReview,
                ApplicationStage::Completed => Self::Completed,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
