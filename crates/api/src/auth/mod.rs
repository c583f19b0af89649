//! Token verification for the identity provider's access tokens.
//!
//! - [`jwt`] -- HS256 access-token validation.

pub mod jwt;
