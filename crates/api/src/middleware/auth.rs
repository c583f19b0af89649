//! Bearer-token extractor turning a request into a checked [`ActorClaims`].

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use dbt_core::actor::{ActorClaims, IdentityClaims};
use dbt_core::error::CoreError;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// The caller of a handler. A missing or invalid token, or one lacking a
/// scope field its role needs, is a 401. An unknown role is a 403.
#[derive(Debug, Clone)]
pub struct AuthActor(pub ActorClaims);

impl FromRequestParts<AppState> for AuthActor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        let actor = ActorClaims::try_from(IdentityClaims::from(claims)).inspect_err(|e| {
            tracing::warn!(error = %e, "Token claims rejected");
        })?;
        Ok(AuthActor(actor))
    }
}
