//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::token::TokenError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A required field was missing or blank.
    #[error("missing details")]
    MissingDetails,

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] imagify_core::EmailError),

    /// Wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No account for that email.
    #[error("user not found")]
    UserNotFound,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Token signing error.
    #[error(transparent)]
    Token(#[from] TokenError),
}
