//! Repository for the `marriage_applications` table.

use dbt_core::stages::{ApplicationStatus, PendingAt};
use dbt_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::application::{
    ApplicationListQuery, ApplicationScope, ApplicationSubmission, ApplicationTransition,
    MarriageApplication,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, certificate_no, owner_id, applicant_person_id, \
    groom_person_id, groom_name, groom_dob, groom_father_name, groom_address, \
    bride_person_id, bride_name, bride_dob, bride_father_name, bride_address, \
    marriage_date, witness_name, witness_person_id, \
    joint_account_no, joint_ifsc, joint_bank_name, documents, \
    state_ut, district, stage, pending_at, approved_by, status, disbursed_amount, \
    created_at, updated_at";

/// Default page size for list queries.
const DEFAULT_LIMIT: i64 = 100;

/// Provides data access for marriage incentive applications.
pub struct ApplicationRepo;

impl ApplicationRepo {
    /// Find an application by its internal ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<MarriageApplication>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM marriage_applications WHERE id = $1");
        sqlx::query_as::<_, MarriageApplication>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an application by certificate number and lock its row.
    pub async fn find_by_certificate_for_update(
        tx: &mut Transaction<'_, Postgres>,
        certificate_no: &str,
    ) -> Result<Option<MarriageApplication>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM marriage_applications WHERE certificate_no = $1 FOR UPDATE"
        );
        sqlx::query_as::<_, MarriageApplication>(&query)
            .bind(certificate_no)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Load an application and lock its row for the rest of the transaction.
    pub async fn lock_by_id(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<Option<MarriageApplication>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM marriage_applications WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, MarriageApplication>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// An open application for the same couple in either order, other than
    /// `exclude_id`. Rejected and completed applications do not count.
    pub async fn find_open_for_couple(
        tx: &mut Transaction<'_, Postgres>,
        first: &str,
        second: &str,
        exclude_id: Option<DbId>,
    ) -> Result<Option<MarriageApplication>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM marriage_applications
             WHERE LEAST(groom_person_id, bride_person_id) = LEAST($1::text, $2::text)
               AND GREATEST(groom_person_id, bride_person_id) = GREATEST($1::text, $2::text)
               AND status NOT IN ('rejected', 'completed')
               AND ($3::bigint IS NULL OR id <> $3)
             ORDER BY id ASC
             LIMIT 1"
        );
        sqlx::query_as::<_, MarriageApplication>(&query)
            .bind(first)
            .bind(second)
            .bind(exclude_id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// A completed application in which `person_id` is either party.
    pub async fn find_completed_for_party(
        tx: &mut Transaction<'_, Postgres>,
        person_id: &str,
    ) -> Result<Option<MarriageApplication>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM marriage_applications
             WHERE status = 'completed'
               AND (groom_person_id = $1 OR bride_person_id = $1)
             ORDER BY id ASC
             LIMIT 1"
        );
        sqlx::query_as::<_, MarriageApplication>(&query)
            .bind(person_id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Insert a new application at `stage`, returning the created row.
    pub async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        input: &ApplicationSubmission,
        scope: &ApplicationScope,
        stage: i16,
        pending_at: PendingAt,
        status: ApplicationStatus,
    ) -> Result<MarriageApplication, sqlx::Error> {
        let query = format!(
            "INSERT INTO marriage_applications
                (certificate_no, owner_id, applicant_person_id,
                 groom_person_id, groom_name, groom_dob, groom_father_name, groom_address,
                 bride_person_id, bride_name, bride_dob, bride_father_name, bride_address,
                 marriage_date, witness_name, witness_person_id,
                 joint_account_no, joint_ifsc, joint_bank_name,
                 state_ut, district, stage, pending_at, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                     $16, $17, $18, $19, $20, $21, $22, $23, $24)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MarriageApplication>(&query)
            .bind(&input.certificate_no)
            .bind(scope.owner_id)
            .bind(&scope.applicant_person_id)
            .bind(&input.groom_person_id)
            .bind(&input.groom_name)
            .bind(input.groom_dob)
            .bind(&input.groom_father_name)
            .bind(&input.groom_address)
            .bind(&input.bride_person_id)
            .bind(&input.bride_name)
            .bind(input.bride_dob)
            .bind(&input.bride_father_name)
            .bind(&input.bride_address)
            .bind(input.marriage_date)
            .bind(&input.witness_name)
            .bind(&input.witness_person_id)
            .bind(&input.joint_account_no)
            .bind(&input.joint_ifsc)
            .bind(&input.joint_bank_name)
            .bind(&scope.state_ut)
            .bind(&scope.district)
            .bind(stage)
            .bind(pending_at.label())
            .bind(status.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    /// Move an application sitting with the applicant back into review and
    /// refresh its editable fields. The certificate number and parties stay.
    pub async fn advance(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
        input: &ApplicationSubmission,
        stage: i16,
        pending_at: PendingAt,
        status: ApplicationStatus,
    ) -> Result<MarriageApplication, sqlx::Error> {
        let query = format!(
            "UPDATE marriage_applications SET
                groom_name = $2,
                groom_dob = $3,
                groom_father_name = COALESCE($4, groom_father_name),
                groom_address = COALESCE($5, groom_address),
                bride_name = $6,
                bride_dob = $7,
                bride_father_name = COALESCE($8, bride_father_name),
                bride_address = COALESCE($9, bride_address),
                marriage_date = $10,
                witness_name = COALESCE($11, witness_name),
                witness_person_id = COALESCE($12, witness_person_id),
                joint_account_no = $13,
                joint_ifsc = COALESCE($14, joint_ifsc),
                joint_bank_name = COALESCE($15, joint_bank_name),
                stage = $16,
                pending_at = $17,
                status = $18,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MarriageApplication>(&query)
            .bind(id)
            .bind(&input.groom_name)
            .bind(input.groom_dob)
            .bind(&input.groom_father_name)
            .bind(&input.groom_address)
            .bind(&input.bride_name)
            .bind(input.bride_dob)
            .bind(&input.bride_father_name)
            .bind(&input.bride_address)
            .bind(input.marriage_date)
            .bind(&input.witness_name)
            .bind(&input.witness_person_id)
            .bind(&input.joint_account_no)
            .bind(&input.joint_ifsc)
            .bind(&input.joint_bank_name)
            .bind(stage)
            .bind(pending_at.label())
            .bind(status.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    /// Write the outcome of a stage transition.
    pub async fn apply_transition(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
        change: &ApplicationTransition,
    ) -> Result<MarriageApplication, sqlx::Error> {
        let query = format!(
            "UPDATE marriage_applications SET
                stage = $2,
                pending_at = $3,
                approved_by = $4,
                status = $5,
                disbursed_amount = disbursed_amount + $6,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MarriageApplication>(&query)
            .bind(id)
            .bind(change.stage)
            .bind(&change.pending_at)
            .bind(&change.approved_by)
            .bind(change.status.as_str())
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
    ) -> Result<Option<MarriageApplication>, sqlx::Error> {
        let query = format!(
            "UPDATE marriage_applications SET
                documents = documents || jsonb_build_object($2::text, $3::text),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MarriageApplication>(&query)
            .bind(id)
            .bind(type_code)
            .bind(key)
            .fetch_optional(pool)
            .await
    }

    /// List applications, newest first, narrowed by the optional filters.
    pub async fn list(
        pool: &PgPool,
        params: &ApplicationListQuery,
    ) -> Result<Vec<MarriageApplication>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM marriage_applications
             WHERE ($1::text IS NULL OR lower(state_ut) = lower($1))
               AND ($2::bigint IS NULL OR owner_id = $2)
               AND ($3::smallint IS NULL OR stage = $3)
               AND ($4::text IS NULL OR status = $4)
             ORDER BY created_at DESC, id DESC
             LIMIT $5 OFFSET $6"
        );
        sqlx::query_as::<_, MarriageApplication>(&query)
            .bind(&params.state_ut)
            .bind(params.owner_id)
            .bind(params.stage)
            .bind(&params.status)
            .bind(params.limit.unwrap_or(DEFAULT_LIMIT))
            .bind(params.offset.unwrap_or(0))
            .fetch_all(pool)
            .await
    }
}
