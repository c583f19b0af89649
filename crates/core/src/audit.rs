//! Audit event hashing and payload redaction.
//!
//! Every audit event stores a SHA-256 hash chained to the previous event of
//! the same record, so a timeline can be checked for tampering without
//! trusting the store. Payloads are redacted before they are hashed or stored.

use sha2::{Digest, Sha256};

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Integrity hash computation
// ---------------------------------------------------------------------------

/// Known seed value for the first event of every record.
const CHAIN_SEED: &str = "DBT_EVENT_CHAIN_SEED_V1";

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

/// Canonical string form of the hashed fields of an event.
///
/// `serde_json` maps are ordered by key, so the output is stable.
pub fn canonical_event(
    record_id: DbId,
    actor: &str,
    actor_role: &str,
    stage: i16,
    event_type: &str,
    comment: Option<&str>,
    payload: &serde_json::Value,
) -> String {
    serde_json::json!({
        "record_id": record_id,
        "actor": actor,
        "actor_role": actor_role,
        "stage": stage,
        "event_type": event_type,
        "comment": comment,
        "payload": payload,
    })
    .to_string()
}

/// Hash of an event chained onto `prev_hash` (or the seed for the first event).
pub fn compute_integrity_hash(prev_hash: Option<&str>, entry_data: &str) -> String {
    let prev = prev_hash.unwrap_or(CHAIN_SEED);
    let combined = format!("{prev}|{entry_data}");
    sha256_hex(combined.as_bytes())
}

/// Check a record's events, oldest first, given as `(canonical, stored_hash)`.
///
/// Returns the index of the first event whose stored hash does not match.
pub fn verify_chain<'a, I>(events: I) -> Result<(), usize>
where
    I: IntoIterator<Item = (String, &'a str)>,
{
    let mut prev: Option<String> = None;
    for (index, (canonical, stored)) in events.into_iter().enumerate() {
        let expected = compute_integrity_hash(prev.as_deref(), &canonical);
        if expected != stored {
            return Err(index);
        }
        prev = Some(expected);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Sensitive field redaction
// ---------------------------------------------------------------------------

/// Keys whose values never reach the audit log in clear.
pub const SENSITIVE_FIELDS: &[&str] = &[
    "aadhaar",
    "account_no",
    "account_number",
    "password",
    "token",
];

/// Replace the value of any key containing a [`SENSITIVE_FIELDS`] entry with
/// `"[REDACTED]"`, recursively.
pub fn redact_sensitive_fields(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut redacted = serde_json::Map::new();
            for (key, val) in map {
                let lower_key = key.to_lowercase();
                if SENSITIVE_FIELDS.iter().any(|f| lower_key.contains(f)) {
                    redacted.insert(
                        key.clone(),
                        serde_json::Value::String("[REDACTED]".to_string()),
                    );
                } else {
                    redacted.insert(key.clone(), redact_sensitive_fields(val));
                }
            }
            serde_json::Value::Object(redacted)
        }
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.iter().map(redact_sensitive_fields).collect())
        }
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(stage: i16, event_type: &str) -> String {
        canonical_event(1, "to-bhopal", "Tribal Officer", stage, event_type, None, &json!({}))
    }

    #[test]
    fn first_event_uses_seed() {
        let data = event(1, "VERIFIED");
        assert_eq!(
            compute_integrity_hash(None, &data),
            compute_integrity_hash(Some(CHAIN_SEED), &data)
        );
    }

    #[test]
    fn chain_verifies_and_detects_tampering() {
        let first = event(0, "FIR_SUBMITTED");
        let second = event(1, "VERIFIED");
        let h1 = compute_integrity_hash(None, &first);
        let h2 = compute_integrity_hash(Some(&h1), &second);

        let chain = [(first.clone(), h1.as_str()), (second, h2.as_str())];
        assert!(verify_chain(chain).is_ok());

        let forged = event(1, "SANCTIONED");
        assert_eq!(
            verify_chain([(first, h1.as_str()), (forged, h2.as_str())]),
            Err(1)
        );
    }

    #[test]
    fn canonical_form_is_key_ordered() {
        let a = canonical_event(1, "a", "r", 0, "E", Some("c"), &json!({"b": 1, "a": 2}));
        let b = canonical_event(1, "a", "r", 0, "E", Some("c"), &json!({"a": 2, "b": 1}));
        assert_eq!(a, b);
    }

    #[test]
    fn redacts_nested_bank_fields() {
        let input = json!({
            "txn_id": "T-1",
            "beneficiary": { "bank_account_no": "1234", "victim_aadhaar": "9999" }
        });
        let redacted = redact_sensitive_fields(&input);
        assert_eq!(redacted["txn_id"], "T-1");
        assert_eq!(redacted["beneficiary"]["bank_account_no"], "[REDACTED]");
        assert_eq!(redacted["beneficiary"]["victim_aadhaar"], "[REDACTED]");
    }
}
