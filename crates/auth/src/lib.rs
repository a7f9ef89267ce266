//! `tradepost-auth` — authentication boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: claims
//! validation, token issue/verify, and password hashing only.

pub mod claims;
pub mod password;
pub mod token;

pub use claims::{AuthClaims, TokenValidationError, validate_claims};
pub use password::{PasswordError, hash_password, verify_password};
pub use token::{Hs256Tokens, JwtValidator, TokenError};
