//! Domain primitives shared by the data-access layer and the API server.
//!
//! Nothing in this crate performs I/O: it holds the id/timestamp types,
//! the error taxonomy, field validators, the three-state [`patch::Patch`]
//! wrapper, and the authentication primitives (password hashing, token
//! issuance, authorization checks).

pub mod auth;
pub mod error;
pub mod patch;
pub mod roles;
pub mod types;
pub mod validation;
