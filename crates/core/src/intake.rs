//! Submission intake rules.
//!
//! Intake is an upsert keyed by the record's external reference. Retries must
//! never move a record backwards and never write a second submission event;
//! [`decide`] encodes that as a three-way decision for the store to carry out.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use crate::error::CoreError;
use crate::settings::WorkflowSettings;
use crate::stages::{parse_stage, PendingAt, WorkflowStage};

// ---------------------------------------------------------------------------
// Upsert decision
// ---------------------------------------------------------------------------

/// What intake should do with a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeDecision<S> {
    /// No record with this reference exists yet: insert one at `stage`.
    Create { stage: S, pending_at: PendingAt },
    /// An existing draft moves to the first review stage.
    Advance { stage: S, pending_at: PendingAt },
    /// A retry: the record is already where this submission would put it, or
    /// further along. Nothing is written.
    Unchanged,
}

/// Stage and owner a new submission lands on.
pub fn placement<S: WorkflowStage>(is_draft: bool) -> (S, PendingAt) {
    let stage = if is_draft {
        S::draft_stage()
    } else {
        S::first_review_stage()
    };
    (stage, stage.pending_at())
}

/// Decide how to apply a submission given the stage of any existing record.
pub fn decide<S: WorkflowStage>(
    existing_stage: Option<i16>,
    is_draft: bool,
) -> Result<IntakeDecision<S>, CoreError> {
    let (stage, pending_at) = placement::<S>(is_draft);
    let Some(existing) = existing_stage else {
        return Ok(IntakeDecision::Create { stage, pending_at });
    };

    let existing: S = parse_stage(existing)?;
    if !is_draft && existing == S::draft_stage() {
        Ok(IntakeDecision::Advance { stage, pending_at })
    } else {
        Ok(IntakeDecision::Unchanged)
    }
}

/// Trimmed, non-empty external reference.
pub fn normalize_reference(reference: &str) -> Result<String, CoreError> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("External reference is required".into()));
    }
    Ok(trimmed.to_string())
}

// ---------------------------------------------------------------------------
// Marriage applications
// ---------------------------------------------------------------------------

/// Order-independent key for a couple, so (A, B) and (B, A) collide.
pub fn couple_key(first: &str, second: &str) -> (String, String) {
    let (a, b) = (first.trim().to_string(), second.trim().to_string());
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// The submitting citizen must be one of the two parties.
pub fn ensure_submitter_is_party(
    submitter: &str,
    groom_person_id: &str,
    bride_person_id: &str,
) -> Result<(), CoreError> {
    let submitter = submitter.trim();
    if submitter == groom_person_id.trim() || submitter == bride_person_id.trim() {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "Applicant must be either the groom or the bride".into(),
        ))
    }
}

/// Completed years between `dob` and `on`.
pub fn age_on(dob: NaiveDate, on: NaiveDate) -> u32 {
    let mut years = on.year() - dob.year();
    if (on.month(), on.day()) < (dob.month(), dob.day()) {
        years -= 1;
    }
    years.max(0) as u32
}

/// Party-level checks that need no registry or store access.
pub fn validate_couple(
    groom_person_id: &str,
    bride_person_id: &str,
    groom_dob: NaiveDate,
    bride_dob: NaiveDate,
    marriage_date: NaiveDate,
    settings: &WorkflowSettings,
) -> Result<(), CoreError> {
    if groom_person_id.trim().is_empty() || bride_person_id.trim().is_empty() {
        return Err(CoreError::Validation(
            "Both parties need a person id".into(),
        ));
    }
    if groom_person_id.trim() == bride_person_id.trim() {
        return Err(CoreError::Validation(
            "Groom and bride must be different people".into(),
        ));
    }

    let groom_age = age_on(groom_dob, marriage_date);
    if groom_age < settings.min_groom_age {
        return Err(CoreError::Validation(format!(
            "Groom was {groom_age} at marriage; minimum is {}",
            settings.min_groom_age
        )));
    }
    let bride_age = age_on(bride_dob, marriage_date);
    if bride_age < settings.min_bride_age {
        return Err(CoreError::Validation(format!(
            "Bride was {bride_age} at marriage; minimum is {}",
            settings.min_bride_age
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Bank details
// ---------------------------------------------------------------------------

static IFSC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{4}0[A-Z0-9]{6}$").expect("valid regex"));

static MOBILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[6-9][0-9]{9}$").expect("valid regex"));

/// Indian Financial System Code: four letters, a zero, six alphanumerics.
pub fn validate_ifsc(ifsc: &str) -> Result<(), CoreError> {
    if IFSC_RE.is_match(ifsc.trim()) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!("Invalid IFSC code '{ifsc}'")))
    }
}

/// Ten-digit mobile number.
pub fn validate_mobile(mobile: &str) -> Result<(), CoreError> {
    if MOBILE_RE.is_match(mobile.trim()) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!("Invalid mobile number '{mobile}'")))
    }
}
