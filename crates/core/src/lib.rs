//! Pure domain rules for the benefit disbursement workflows.
//!
//! Nothing in this crate touches the database: jurisdiction checks, stage
//! tables, transition planning, treasury arithmetic and intake rules are all
//! plain functions over plain data so they can be unit tested in isolation.

pub mod actor;
pub mod audit;
pub mod documents;
pub mod error;
pub mod intake;
pub mod jurisdiction;
pub mod roles;
pub mod settings;
pub mod stages;
pub mod transition;
pub mod treasury;
pub mod types;
