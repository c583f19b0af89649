//! Government registry lookups used to cross-check submissions.
//!
//! Registry answers are advisory. Intake logs mismatches and lookup failures
//! and carries on; nothing here can reject a submission.

use std::collections::HashMap;

use async_trait::async_trait;
use dbt_db::models::registry::{FirRecord, PersonRecord};
use dbt_db::repositories::RegistryRepo;
use sqlx::PgPool;

use crate::error::WorkflowResult;

/// Read access to the person and FIR registries.
#[async_trait]
pub trait RegistryLookup: Send + Sync {
    async fn find_person(&self, person_id: &str) -> WorkflowResult<Option<PersonRecord>>;

    async fn find_fir(&self, fir_no: &str) -> WorkflowResult<Option<FirRecord>>;
}

// ---------------------------------------------------------------------------
// PostgreSQL registry
// ---------------------------------------------------------------------------

/// Registry backed by its own database pool.
#[derive(Clone)]
pub struct PgRegistry {
    pool: PgPool,
}

impl PgRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RegistryLookup for PgRegistry {
    async fn find_person(&self, person_id: &str) -> WorkflowResult<Option<PersonRecord>> {
        Ok(RegistryRepo::find_person(&self.pool, person_id).await?)
    }

    async fn find_fir(&self, fir_no: &str) -> WorkflowResult<Option<FirRecord>> {
        Ok(RegistryRepo::find_fir(&self.pool, fir_no).await?)
    }
}

// ---------------------------------------------------------------------------
// In-memory registry
// ---------------------------------------------------------------------------

/// Fixed registry contents, for development without a registry database and
/// for tests. An empty registry knows nobody.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    persons: HashMap<String, PersonRecord>,
    firs: HashMap<String, FirRecord>,
}

impl StaticRegistry {
    pub fn with_person(mut self, record: PersonRecord) -> Self {
        self.persons.insert(record.aadhaar_id.clone(), record);
        self
    }

    pub fn with_fir(mut self, record: FirRecord) -> Self {
        self.firs.insert(record.fir_no.clone(), record);
        self
    }
}

#[async_trait]
impl RegistryLookup for StaticRegistry {
    async fn find_person(&self, person_id: &str) -> WorkflowResult<Option<PersonRecord>> {
        Ok(self.persons.get(person_id).cloned())
    }

    async fn find_fir(&self, fir_no: &str) -> WorkflowResult<Option<FirRecord>> {
        Ok(self.firs.get(fir_no).cloned())
    }
}
