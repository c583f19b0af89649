//! Read-only lookups against the government registry database.

use sqlx::PgPool;

use crate::models::registry::{FirRecord, PersonRecord};

const PERSON_COLUMNS: &str =
    "aadhaar_id, full_name, father_name, dob, gender, district, state, mobile, status";

const FIR_COLUMNS: &str = "fir_no, police_station_code, police_station_name, district, state, \
    filing_datetime, complainant_name, victim_name, incident_date, incident_location, \
    incident_summary, sections_invoked";

/// Provides lookups in the registry tables. The pool points at the registry
/// database, not the workflow database.
pub struct RegistryRepo;

impl RegistryRepo {
    pub async fn find_person(
        pool: &PgPool,
        person_id: &str,
    ) -> Result<Option<PersonRecord>, sqlx::Error> {
        let query = format!("SELECT {PERSON_COLUMNS} FROM aadhaar_records WHERE aadhaar_id = $1");
        sqlx::query_as::<_, PersonRecord>(&query)
            .bind(person_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_fir(pool: &PgPool, fir_no: &str) -> Result<Option<FirRecord>, sqlx::Error> {
        let query = format!("SELECT {FIR_COLUMNS} FROM fir_records WHERE fir_no = $1");
        sqlx::query_as::<_, FirRecord>(&query)
            .bind(fir_no)
            .fetch_optional(pool)
            .await
    }
}
