//! The closed set of workflow roles.
//!
//! Roles travel through tokens and database columns as human-readable
//! designation labels ("Tribal Officer", "PFMS Officer", ...). Inside the
//! crate they are always a [`Role`]; labels are mapped only at the boundary.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// A workflow role. Every stage of every workflow is owned by exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Finest-grained officer, scoped to a single sub-unit (police station).
    FilingOfficer,
    /// District-level officer who verifies submissions.
    VerifyingOfficer,
    /// District-level officer who approves and records court outcomes.
    DistrictOfficer,
    /// State-level officer who sanctions compensation.
    StateOfficer,
    /// State-level officer who releases funds.
    FundOfficer,
    /// Citizen applicant. Only ever acts on marriage incentive applications.
    Applicant,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::FilingOfficer,
        Role::VerifyingOfficer,
        Role::DistrictOfficer,
        Role::StateOfficer,
        Role::FundOfficer,
        Role::Applicant,
    ];

    /// Canonical designation label, as stored in `pending_at` columns.
    pub fn label(self) -> &'static str {
        match self {
            Self::FilingOfficer => "Investigation Officer",
            Self::VerifyingOfficer => "Tribal Officer",
            Self::DistrictOfficer => "District Collector",
            Self::StateOfficer => "State Nodal Officer",
            Self::FundOfficer => "PFMS Officer",
            Self::Applicant => "Citizen",
        }
    }

    /// Short code used as the prefix of role-specific audit event types.
    pub fn code(self) -> &'static str {
        match self {
            Self::FilingOfficer => "IO",
            Self::VerifyingOfficer => "TO",
            Self::DistrictOfficer => "DM",
            Self::StateOfficer => "SNO",
            Self::FundOfficer => "PFMS",
            Self::Applicant => "CITIZEN",
        }
    }

    /// Parse a designation label or short code. Case-insensitive, and
    /// whitespace around `/` in combined labels is ignored.
    ///
    /// Several designations share the same role: a District Magistrate, a
    /// Social Justice Officer and the combined "District Collector/DM/SJO"
    /// label all map to [`Role::DistrictOfficer`].
    pub fn from_label(label: &str) -> Result<Self, CoreError> {
        let normalized = label
            .to_ascii_lowercase()
            .split('/')
            .map(str::trim)
            .collect::<Vec<_>>()
            .join("/");
        let role = match normalized.as_str() {
            "investigation officer" | "vishesh thana officer" | "io" => Self::FilingOfficer,
            "tribal officer" | "to" => Self::VerifyingOfficer,
            "district collector/dm/sjo"
            | "district collector"
            | "district magistrate"
            | "social justice officer"
            | "dm"
            | "sjo" => Self::DistrictOfficer,
            "state nodal officer" | "sno" => Self::StateOfficer,
            "pfms officer" | "pfms" => Self::FundOfficer,
            "citizen" => Self::Applicant,
            _ => {
                return Err(CoreError::Forbidden(format!(
                    "Unknown role '{}'",
                    label.trim()
                )))
            }
        };
        Ok(role)
    }

    /// True for every role except [`Role::Applicant`].
    pub fn is_officer(self) -> bool {
        !matches!(self, Self::Applicant)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Role::from_label(&label).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn every_label_parses_back() {
        for role in Role::ALL {
            assert_eq!(Role::from_label(role.label()).unwrap(), role);
            assert_eq!(Role::from_label(role.code()).unwrap(), role);
        }
    }

    #[test]
    fn district_designations_share_a_role() {
        assert_eq!(
            Role::from_label("District Magistrate").unwrap(),
            Role::DistrictOfficer
        );
        assert_eq!(Role::from_label("sjo").unwrap(), Role::DistrictOfficer);
        assert_eq!(
            Role::from_label("District Collector/DM/SJO").unwrap(),
            Role::DistrictOfficer
        );
        assert_eq!(
            Role::from_label(" district collector / dm / sjo ").unwrap(),
            Role::DistrictOfficer
        );
    }

    #[test]
    fn unknown_label_is_forbidden() {
        assert_matches!(Role::from_label("Superintendent"), Err(CoreError::Forbidden(_)));
    }

    #[test]
    fn serializes_as_label() {
        let json = serde_json::to_string(&Role::FundOfficer).unwrap();
        assert_eq!(json, "\"PFMS Officer\"");
        let back: Role = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Role::FundOfficer);
    }
}
