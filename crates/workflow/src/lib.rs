//! Workflow services: intake, stage transitions, treasury and documents.
//!
//! Every operation here takes a `PgPool` and the verified caller, runs its
//! checks and writes inside one transaction, and returns either the written
//! rows or a [`WorkflowError`].

pub mod audit;
pub mod documents;
pub mod engine;
pub mod error;
pub mod intake;
pub mod registry;
pub mod treasury;

pub use error::{WorkflowError, WorkflowResult};
