//! HTTP handlers. Each one authenticates, delegates to `dbt_workflow` and
//! wraps the result in the `{ "data": ... }` envelope.

pub mod applications;
pub mod cases;
pub mod documents;
pub mod treasury;

use dbt_core::types::DbId;
use serde::{Deserialize, Serialize};

/// `?draft=true` keeps a submission with its submitter.
#[derive(Debug, Default, Deserialize)]
pub struct SubmitParams {
    #[serde(default)]
    pub draft: bool,
}

/// Result of re-verifying a record's audit hash chain.
#[derive(Debug, Serialize)]
pub struct IntegrityReport {
    pub record_id: DbId,
    pub intact: bool,
    /// First event whose hash does not match its content or predecessor.
    pub first_broken_event_id: Option<DbId>,
}

impl IntegrityReport {
    fn new(record_id: DbId, first_broken_event_id: Option<DbId>) -> Self {
        Self {
            record_id,
            intact: first_broken_event_id.is_none(),
            first_broken_event_id,
        }
    }
}
