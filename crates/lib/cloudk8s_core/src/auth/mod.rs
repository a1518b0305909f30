//! Authentication and authorization logic.
//!
//! Provides login-hash checks, JWT issuance and verification, the
//! authenticator implementations and the host allow-list shared by the
//! HTTP layer and the CLI.

pub mod authenticator;
pub mod host;
pub mod jwt;
pub mod password;
pub mod validation;

use thiserror::Error;

use crate::store::StoreError;

pub use authenticator::{AdminAccount, AdminAuthenticator, Authenticator, StoreAuthenticator};
pub use host::{HostError, validate_host_allowed};
pub use jwt::JwtChecker;

/// Token verification and issuance errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed: {0}")]
    Malformed(String),

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token is not valid yet")]
    NotYetValid,

    #[error("token claims are invalid: {0}")]
    InvalidClaims(String),

    #[error("token could not be signed: {0}")]
    Signing(String),
}

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    CredentialError,

    #[error("User does not exist: {0}")]
    UserNotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    HostNotAllowed(#[from] HostError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}
