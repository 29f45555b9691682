//! Destination registry access
//!
//! Holds the credentials and the login session that must exist before any
//! image is pushed.

pub mod auth;

pub use auth::{Credentials, RegistrySession, Secret, TOKEN_VAR, USERNAME_VAR};
