//! Request extractors.
//!
//! - [`auth::AuthActor`] -- the verified actor behind a JWT Bearer token.

pub mod auth;
