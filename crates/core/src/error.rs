use crate::roles::Role;
use crate::types::{Amount, DbId};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The role named in the request differs from the verified identity's role.
    #[error("Role mismatch: request claims {claimed} but identity is {verified}")]
    RoleMismatch { claimed: Role, verified: Role },

    /// The record is not at a stage the requested action accepts.
    #[error("Wrong stage: record is at stage {actual}, action expects one of {expected:?}")]
    WrongStage { actual: i16, expected: Vec<i16> },

    /// The stage table does not allow this role to act at this stage.
    #[error("Role {role} may not act at stage {stage}")]
    RoleNotAllowedAtStage { role: Role, stage: i16 },

    #[error("Insufficient funds: balance {available}, requested {requested}")]
    InsufficientFunds { available: Amount, requested: Amount },

    #[error("Internal error: {0}")]
    Internal(String),
}
