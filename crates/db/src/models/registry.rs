//! Government registry records consulted during intake (read-only).

use chrono::NaiveDate;
use dbt_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

/// A row from `aadhaar_records`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PersonRecord {
    pub aadhaar_id: String,
    pub full_name: String,
    pub father_name: Option<String>,
    pub dob: NaiveDate,
    pub gender: String,
    pub district: String,
    pub state: String,
    pub mobile: Option<String>,
    pub status: String,
}

/// A row from `fir_records`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FirRecord {
    pub fir_no: String,
    pub police_station_code: String,
    pub police_station_name: String,
    pub district: String,
    pub state: String,
    pub filing_datetime: Timestamp,
    pub complainant_name: String,
    pub victim_name: Option<String>,
    pub incident_date: NaiveDate,
    pub incident_location: Option<String>,
    pub incident_summary: Option<String>,
    pub sections_invoked: Option<String>,
}
