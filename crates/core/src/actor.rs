//! Verified actors and their jurisdiction claims.
//!
//! [`IdentityClaims`] is the loose shape an identity verifier hands us (every
//! scope field optional, role as a label). [`ActorClaims`] is the checked
//! form: one [`Actor`] variant per role carrying exactly the scope fields that
//! role needs, so an officer without a district cannot exist past the boundary.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::roles::Role;
use crate::types::DbId;

/// Raw identity claims as produced by the identity verifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Stable login identifier of the actor.
    pub subject: String,
    /// Designation label, e.g. `"Tribal Officer"`.
    pub role: String,
    pub state_ut: Option<String>,
    pub district: Option<String>,
    /// Police-station code, present only for filing officers.
    pub sub_unit: Option<String>,
    /// Registry person identifier, present only for applicants.
    pub person_id: Option<String>,
    /// Citizen account id, present only for applicants.
    pub owner_id: Option<DbId>,
}

/// A verified actor with the jurisdiction scope of its role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    FilingOfficer {
        state_ut: String,
        district: String,
        sub_unit: String,
    },
    VerifyingOfficer {
        state_ut: String,
        district: String,
    },
    DistrictOfficer {
        state_ut: String,
        district: String,
    },
    StateOfficer {
        state_ut: String,
    },
    FundOfficer {
        state_ut: String,
    },
    Applicant {
        person_id: String,
        owner_id: DbId,
        state_ut: String,
        district: String,
    },
}

impl Actor {
    pub fn role(&self) -> Role {
        match self {
            Self::FilingOfficer { .. } => Role::FilingOfficer,
            Self::VerifyingOfficer { .. } => Role::VerifyingOfficer,
            Self::DistrictOfficer { .. } => Role::DistrictOfficer,
            Self::StateOfficer { .. } => Role::StateOfficer,
            Self::FundOfficer { .. } => Role::FundOfficer,
            Self::Applicant { .. } => Role::Applicant,
        }
    }

    pub fn state_ut(&self) -> &str {
        match self {
            Self::FilingOfficer { state_ut, .. }
            | Self::VerifyingOfficer { state_ut, .. }
            | Self::DistrictOfficer { state_ut, .. }
            | Self::StateOfficer { state_ut }
            | Self::FundOfficer { state_ut }
            | Self::Applicant { state_ut, .. } => state_ut,
        }
    }

    /// District of the actor, if its role is district-scoped or narrower.
    pub fn district(&self) -> Option<&str> {
        match self {
            Self::FilingOfficer { district, .. }
            | Self::VerifyingOfficer { district, .. }
            | Self::DistrictOfficer { district, .. }
            | Self::Applicant { district, .. } => Some(district),
            Self::StateOfficer { .. } | Self::FundOfficer { .. } => None,
        }
    }
}

/// Identity subject plus the checked [`Actor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorClaims {
    pub subject: String,
    pub actor: Actor,
}

impl ActorClaims {
    pub fn role(&self) -> Role {
        self.actor.role()
    }
}

impl TryFrom<IdentityClaims> for ActorClaims {
    type Error = CoreError;

    /// Unknown roles are rejected with `Forbidden`; a known role missing one
    /// of its scope fields is rejected with `Unauthorized`.
    fn try_from(claims: IdentityClaims) -> Result<Self, Self::Error> {
        if claims.subject.trim().is_empty() {
            return Err(CoreError::Unauthorized("Token has no subject".into()));
        }

        let role = Role::from_label(&claims.role)?;
        let IdentityClaims {
            subject,
            state_ut,
            district,
            sub_unit,
            person_id,
            owner_id,
            ..
        } = claims;

        let actor = match role {
            Role::FilingOfficer => Actor::FilingOfficer {
                state_ut: required(state_ut, "state_ut")?,
                district: required(district, "district")?,
                sub_unit: required(sub_unit, "sub_unit")?,
            },
            Role::VerifyingOfficer => Actor::VerifyingOfficer {
                state_ut: required(state_ut, "state_ut")?,
                district: required(district, "district")?,
            },
            Role::DistrictOfficer => Actor::DistrictOfficer {
                state_ut: required(state_ut, "state_ut")?,
                district: required(district, "district")?,
            },
            Role::StateOfficer => Actor::StateOfficer {
                state_ut: required(state_ut, "state_ut")?,
            },
            Role::FundOfficer => Actor::FundOfficer {
                state_ut: required(state_ut, "state_ut")?,
            },
            Role::Applicant => Actor::Applicant {
                person_id: required(person_id, "person_id")?,
                owner_id: owner_id
                    .ok_or_else(|| CoreError::Unauthorized("Token has no owner_id claim".into()))?,
                state_ut: required(state_ut, "state_ut")?,
                district: required(district, "district")?,
            },
        };

        Ok(ActorClaims { subject, actor })
    }
}

fn required(value: Option<String>, claim: &str) -> Result<String, CoreError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(CoreError::Unauthorized(format!(
            "Token has no {claim} claim"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn claims(role: &str) -> IdentityClaims {
        IdentityClaims {
            subject: "officer-1".into(),
            role: role.into(),
            state_ut: Some("Madhya Pradesh".into()),
            district: Some("Bhopal".into()),
            sub_unit: Some("PS-0042".into()),
            person_id: None,
            owner_id: None,
        }
    }

    #[test]
    fn filing_officer_keeps_sub_unit() {
        let actor = ActorClaims::try_from(claims("Investigation Officer")).unwrap();
        assert_eq!(
            actor.actor,
            Actor::FilingOfficer {
                state_ut: "Madhya Pradesh".into(),
                district: "Bhopal".into(),
                sub_unit: "PS-0042".into(),
            }
        );
    }

    #[test]
    fn state_officer_drops_district() {
        let actor = ActorClaims::try_from(claims("State Nodal Officer")).unwrap();
        assert_eq!(actor.role(), Role::StateOfficer);
        assert_eq!(actor.actor.district(), None);
    }

    #[test]
    fn missing_scope_field_is_unauthorized() {
        let mut raw = claims("Tribal Officer");
        raw.district = None;
        assert_matches!(ActorClaims::try_from(raw), Err(CoreError::Unauthorized(_)));
    }

    #[test]
    fn applicant_requires_person_and_owner() {
        let mut raw = claims("Citizen");
        assert_matches!(
            ActorClaims::try_from(raw.clone()),
            Err(CoreError::Unauthorized(_))
        );
        raw.person_id = Some("P-1".into());
        raw.owner_id = Some(7);
        let actor = ActorClaims::try_from(raw).unwrap();
        assert_matches!(actor.actor, Actor::Applicant { owner_id: 7, .. });
    }

    #[test]
    fn unknown_role_is_forbidden() {
        assert_matches!(
            ActorClaims::try_from(claims("Auditor")),
            Err(CoreError::Forbidden(_))
        );
    }
}
