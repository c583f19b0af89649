//! Repository structs providing data access for each table.
//!
//! Each repository is a zero-sized struct with async methods that take
//! `&PgPool` for reads or `&mut Transaction` for writes that must commit
//! together.

pub mod application_repo;
pub mod case_repo;
pub mod event_repo;
pub mod registry_repo;
pub mod treasury_repo;

pub use application_repo::ApplicationRepo;
pub use case_repo::CaseRepo;
pub use event_repo::AuditEventRepo;
pub use registry_repo::RegistryRepo;
pub use treasury_repo::TreasuryRepo;
