//! Authentication and authorization primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- access-token issuance and validation.
//! - [`authorize`] -- the per-operation access check.

pub mod authorize;
pub mod jwt;
pub mod password;
