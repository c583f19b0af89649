//! HS256 access tokens carrying an officer's or citizen's jurisdiction claims.
//!
//! The token payload is the loose [`IdentityClaims`] shape plus the standard
//! timing claims; converting it into a checked actor happens in the
//! authentication extractor.

use dbt_core::actor::IdentityClaims;
use dbt_core::types::DbId;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// JWT claims embedded in every access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the actor's login identifier.
    pub sub: String,
    /// Designation label (e.g. `"Tribal Officer"`, `"Citizen"`).
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_ut: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    /// Police-station code of a filing officer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_unit: Option<String>,
    /// Registry person id of a citizen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_id: Option<String>,
    /// Citizen account id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<DbId>,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier (UUID v4).
    pub jti: String,
}

impl From<Claims> for IdentityClaims {
    fn from(claims: Claims) -> Self {
        Self {
            subject: claims.sub,
            role: claims.role,
            state_ut: claims.state_ut,
            district: claims.district,
            sub_unit: claims.sub_unit,
            person_id: claims.person_id,
            owner_id: claims.owner_id,
        }
    }
}

/// Configuration for access-token validation. Tokens are issued by the
/// identity provider; this service only verifies them.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret shared with the identity provider.
    pub secret: String,
}

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var      | Required | Default |
    /// |--------------|----------|---------|
    /// | `JWT_SECRET` | **yes**  | --      |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        Self { secret }
    }
}

/// Validate and decode an access token, returning the embedded [`Claims`].
///
/// Validates the signature and expiration.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(), // HS256, validates exp
    )?;
    Ok(token_data.claims)
}
