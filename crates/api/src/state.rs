use std::sync::Arc;

use dbt_core::settings::WorkflowSettings;
use dbt_workflow::documents::DocumentStore;
use dbt_workflow::registry::RegistryLookup;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: everything is behind an `Arc` or is a pool handle.
#[derive(Clone)]
pub struct AppState {
    /// Workflow database pool.
    pub pool: dbt_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Amounts and thresholds injected into every workflow call.
    pub settings: Arc<WorkflowSettings>,
    pub documents: Arc<dyn DocumentStore>,
    /// Person and FIR registries consulted during intake.
    pub registry: Arc<dyn RegistryLookup>,
}
