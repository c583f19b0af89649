//! Supporting document types and the storage naming scheme.
//!
//! Documents are stored under keys of the form `{PREFIX}{id}_{TYPE}.{ext}`,
//! e.g. `CASE42_FIR.pdf` or `ICM7_GROOM_SIGN.jpeg`. The key alone is enough to
//! recover the owning record and the document type.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::stages::WorkflowKind;
use crate::types::DbId;

/// Maximum accepted document size (10 MiB).
pub const MAX_DOCUMENT_BYTES: usize = 10 * 1024 * 1024;

/// Accepted file extensions.
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "jpg", "jpeg", "png"];

/// Supporting documents, grouped by the workflow that uses them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    // Atrocity case
    Fir,
    CasteCertificate,
    MedicalReport,
    Chargesheet,
    Judgment,
    BankPassbook,
    // Marriage application
    Marriage,
    GroomSign,
    BrideSign,
    WitnessSign,
    JointPhoto,
    JointPassbook,
}

impl DocumentType {
    pub const ALL: [DocumentType; 12] = [
        Self::Fir,
        Self::CasteCertificate,
        Self::MedicalReport,
        Self::Chargesheet,
        Self::Judgment,
        Self::BankPassbook,
        Self::Marriage,
        Self::GroomSign,
        Self::BrideSign,
        Self::WitnessSign,
        Self::JointPhoto,
        Self::JointPassbook,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Self::Fir => "FIR",
            Self::CasteCertificate => "CASTE_CERTIFICATE",
            Self::MedicalReport => "MEDICAL_REPORT",
            Self::Chargesheet => "CHARGESHEET",
            Self::Judgment => "JUDGMENT",
            Self::BankPassbook => "BANK_PASSBOOK",
            Self::Marriage => "MARRIAGE",
            Self::GroomSign => "GROOM_SIGN",
            Self::BrideSign => "BRIDE_SIGN",
            Self::WitnessSign => "WITNESS_SIGN",
            Self::JointPhoto => "JOINT_PHOTO",
            Self::JointPassbook => "JOINT_PASSBOOK",
        }
    }

    pub fn workflow(self) -> WorkflowKind {
        match self {
            Self::Fir
            | Self::CasteCertificate
            | Self::MedicalReport
            | Self::Chargesheet
            | Self::Judgment
            | Self::BankPassbook => WorkflowKind::Case,
            Self::Marriage
            | Self::GroomSign
            | Self::BrideSign
            | Self::WitnessSign
            | Self::JointPhoto
            | Self::JointPassbook => WorkflowKind::Application,
        }
    }

    pub fn from_code(code: &str) -> Result<Self, CoreError> {
        let upper = code.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|t| t.code() == upper)
            .ok_or_else(|| CoreError::Validation(format!("Unknown document type '{code}'")))
    }
}

fn key_prefix(kind: WorkflowKind) -> &'static str {
    match kind {
        WorkflowKind::Case => "CASE",
        WorkflowKind::Application => "ICM",
    }
}

/// Lower-cased extension of `filename`, checked against [`ALLOWED_EXTENSIONS`].
pub fn extension_of(filename: &str) -> Result<String, CoreError> {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(CoreError::Validation(format!(
            "Invalid file type '{filename}'. Only PDF/JPG/PNG allowed"
        )))
    }
}

/// MIME type for a stored document key.
pub fn mime_type(key: &str) -> &'static str {
    match key.rsplit_once('.').map(|(_, e)| e.to_ascii_lowercase()).as_deref() {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}

/// Build the storage key for a document attached to a record.
pub fn document_key(
    doc_type: DocumentType,
    record_id: DbId,
    filename: &str,
) -> Result<String, CoreError> {
    let ext = extension_of(filename)?;
    Ok(format!(
        "{}{record_id}_{}.{ext}",
        key_prefix(doc_type.workflow()),
        doc_type.code()
    ))
}

static KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(CASE|ICM)([0-9]+)_([A-Z_]+)\.([a-z]+)$").expect("valid regex")
});

/// A document key split back into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedKey {
    pub workflow: WorkflowKind,
    pub record_id: DbId,
    pub doc_type: DocumentType,
}

/// Parse a key produced by [`document_key`].
pub fn parse_document_key(key: &str) -> Result<ParsedKey, CoreError> {
    let invalid = || CoreError::Validation(format!("Malformed document key '{key}'"));
    let caps = KEY_RE.captures(key).ok_or_else(invalid)?;

    let workflow = match &caps[1] {
        "CASE" => WorkflowKind::Case,
        _ => WorkflowKind::Application,
    };
    let record_id: DbId = caps[2].parse().map_err(|_| invalid())?;
    let doc_type = DocumentType::from_code(&caps[3])?;
    if doc_type.workflow() != workflow {
        return Err(invalid());
    }
    Ok(ParsedKey {
        workflow,
        record_id,
        doc_type,
    })
}

/// Size and type checks for an upload.
pub fn validate_upload(
    doc_type: DocumentType,
    workflow: WorkflowKind,
    filename: &str,
    size: usize,
) -> Result<(), CoreError> {
    if doc_type.workflow() != workflow {
        return Err(CoreError::Validation(format!(
            "Document type {} does not belong to {}",
            doc_type.code(),
            workflow.entity()
        )));
    }
    if size == 0 {
        return Err(CoreError::Validation("Document is empty".into()));
    }
    if size > MAX_DOCUMENT_BYTES {
        return Err(CoreError::Validation(format!(
            "Document exceeds {MAX_DOCUMENT_BYTES} bytes"
        )));
    }
    extension_of(filename).map(|_| ())
}
