//! `toyshelf-auth`: bearer-token boundary for user-scoped routes.
//!
//! Claims are validated deterministically against a caller-supplied clock;
//! signing and signature checks are delegated to `jsonwebtoken`. This crate
//! knows nothing about HTTP or storage.

pub mod claims;
pub mod jwt;

pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtIssuer, Hs256JwtValidator, IssuedToken, JwtValidator, TokenIssueError};
