//! Bearer-token authentication for the admin endpoints.
//!
//! Tokens are RS256 JWTs issued by an external OIDC provider; the signing keys
//! are fetched from `{AUTH_ISSUER}/jwks` and cached. The middleware in
//! `core::middleware` stores the resulting [`model::AuthenticatedUser`] in the
//! request extensions.

mod jwks;
mod validator;

pub mod model;

pub use jwks::JwksClient;
pub use validator::JwtValidator;
