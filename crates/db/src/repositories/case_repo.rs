//! Repository for the `atrocity_cases` table.

use dbt_core::stages::PendingAt;
use dbt_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::case::{AtrocityCase, CaseListQuery, CaseScope, CaseSubmission, CaseTransition};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, fir_no, state_ut, district, sub_unit, \
    victim_name, victim_relation, victim_gender, victim_caste, victim_mobile, victim_aadhaar, \
    applicant_name, applicant_mobile, applicant_email, \
    incident_summary, incident_location, incident_date, applied_acts, \
    bank_account_no, bank_ifsc, bank_name, bank_holder_name, documents, \
    stage, pending_at, approved_by, compensation_amount, disbursed_amount, \
    created_by, created_at, updated_at";

/// Default page size for list queries.
const DEFAULT_LIMIT: i64 = 100;

/// Provides data access for atrocity compensation cases.
pub struct CaseRepo;

impl CaseRepo {
    /// Find a case by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<AtrocityCase>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM atrocity_cases WHERE id = $1");
        sqlx::query_as::<_, AtrocityCase>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a case by FIR number and lock its row for the rest of the transaction.
    pub async fn find_by_fir_no_for_update(
        tx: &mut Transaction<'_, Postgres>,
        fir_no: &str,
    ) -> Result<Option<AtrocityCase>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM atrocity_cases WHERE fir_no = $1 FOR UPDATE");
        sqlx::query_as::<_, AtrocityCase>(&query)
            .bind(fir_no)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Load a case and lock its row for the rest of the transaction.
    pub async fn lock_by_id(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<Option<AtrocityCase>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM atrocity_cases WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, AtrocityCase>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Insert a new case at `stage`, returning the created row.
    pub async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        input: &CaseSubmission,
        scope: &CaseScope,
        stage: i16,
        pending_at: PendingAt,
        created_by: &str,
    ) -> Result<AtrocityCase, sqlx::Error> {
        let query = format!(
            "INSERT INTO atrocity_cases
                (fir_no, state_ut, district, sub_unit,
                 victim_name, victim_relation, victim_gender, victim_caste, victim_mobile,
                 victim_aadhaar, applicant_name, applicant_mobile, applicant_email,
                 incident_summary, incident_location, incident_date, applied_acts,
                 bank_account_no, bank_ifsc, bank_name, bank_holder_name,
                 stage, pending_at, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                     $16, $17, $18, $19, $20, $21, $22, $23, $24)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AtrocityCase>(&query)
            .bind(&input.fir_no)
            .bind(&scope.state_ut)
            .bind(&scope.district)
            .bind(&scope.sub_unit)
            .bind(&input.victim_name)
            .bind(&input.victim_relation)
            .bind(&input.victim_gender)
            .bind(&input.victim_caste)
            .bind(&input.victim_mobile)
            .bind(&input.victim_aadhaar)
            .bind(&input.applicant_name)
            .bind(&input.applicant_mobile)
            .bind(&input.applicant_email)
            .bind(&input.incident_summary)
            .bind(&input.incident_location)
            .bind(input.incident_date)
            .bind(&input.applied_acts)
            .bind(&input.bank_account_no)
            .bind(&input.bank_ifsc)
            .bind(&input.bank_name)
            .bind(&input.bank_holder_name)
            .bind(stage)
            .bind(pending_at.label())
            .bind(created_by)
            .fetch_one(&mut **tx)
            .await
    }

    /// Move an existing draft forward and refresh its editable fields.
    ///
    /// `fir_no` and the jurisdiction are never touched here.
    pub async fn advance(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
        input: &CaseSubmission,
        stage: i16,
        pending_at: PendingAt,
    ) -> Result<AtrocityCase, sqlx::Error> {
        let query = format!(
            "UPDATE atrocity_cases SET
                victim_name = $2,
                victim_relation = COALESCE($3, victim_relation),
                victim_gender = COALESCE($4, victim_gender),
                victim_caste = COALESCE($5, victim_caste),
                victim_mobile = COALESCE($6, victim_mobile),
                victim_aadhaar = COALESCE($7, victim_aadhaar),
                applicant_name = COALESCE($8, applicant_name),
                applicant_mobile = COALESCE($9, applicant_mobile),
                applicant_email = COALESCE($10, applicant_email),
                incident_summary = COALESCE($11, incident_summary),
                incident_location = COALESCE($12, incident_location),
                incident_date = COALESCE($13, incident_date),
                applied_acts = COALESCE($14, applied_acts),
                bank_account_no = COALESCE($15, bank_account_no),
                bank_ifsc = COALESCE($16, bank_ifsc),
                bank_name = COALESCE($17, bank_name),
                bank_holder_name = COALESCE($18, bank_holder_name),
                stage = $19,
                pending_at = $20,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AtrocityCase>(&query)
            .bind(id)
            .bind(&input.victim_name)
            .bind(&input.victim_relation)
            .bind(&input.victim_gender)
            .bind(&input.victim_caste)
            .bind(&input.victim_mobile)
            .bind(&input.victim_aadhaar)
            .bind(&input.applicant_name)
            .bind(&input.applicant_mobile)
            .bind(&input.applicant_email)
            .bind(&input.incident_summary)
            .bind(&input.incident_location)
            .bind(input.incident_date)
            .bind(&input.applied_acts)
            .bind(&input.bank_account_no)
            .bind(&input.bank_ifsc)
            .bind(&input.bank_name)
            .bind(&input.bank_holder_name)
            .bind(stage)
            .bind(pending_at.label())
            .fetch_one(&mut **tx)
            .await
    }

    /// Write the outcome of a stage transition.
    pub async fn apply_transition(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
        change: &CaseTransition,
    ) -> Result<AtrocityCase, sqlx::Error> {
        let query = format!(
            "UPDATE atrocity_cases SET
                stage = $2,
                pending_at = $3,
                approved_by = $4,
                compensation_amount = COALESCE($5, compensation_amount),
                disbursed_amount = disbursed_amount + $6,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AtrocityCase>(&query)
            .bind(id)
            .bind(change.stage)
            .bind(&change.pending_at)
            .bind(&change.approved_by)
            .bind(change.compensation_amount)
            .bind(change.disbursed_delta)
            .fetch_one(&mut **tx)
            .await
    }

    /// Record a stored document key under its type code.
    pub async fn set_document(
        pool: &PgPool,
        id: DbId,
        type_code: &str,
        key: &str,
    ) -> Result<Option<AtrocityCase>, sqlx::Error> {
        let query = format!(
            "UPDATE atrocity_cases SET
                documents = documents || jsonb_build_object($2::text, $3::text),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AtrocityCase>(&query)
            .bind(id)
            .bind(type_code)
            .bind(key)
            .fetch_optional(pool)
            .await
    }

    /// List cases, newest first, narrowed by the optional filters.
    ///
    /// Jurisdiction visibility is applied by the caller on top of this.
    pub async fn list(
        pool: &PgPool,
        params: &CaseListQuery,
    ) -> Result<Vec<AtrocityCase>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM atrocity_cases
             WHERE ($1::text IS NULL OR lower(state_ut) = lower($1))
               AND ($2::smallint IS NULL OR stage = $2)
               AND ($3::text IS NULL OR pending_at = $3)
             ORDER BY created_at DESC, id DESC
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, AtrocityCase>(&query)
            .bind(&params.state_ut)
            .bind(params.stage)
            .bind(&params.pending_at)
            .bind(params.limit.unwrap_or(DEFAULT_LIMIT))
            .bind(params.offset.unwrap_or(0))
            .fetch_all(pool)
            .await
    }
}
