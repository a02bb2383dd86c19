//! Authentication error types.

use thiserror::Error;

use crate::db::StoreError;

/// Generic login failure message; never says which half of the credentials was wrong
pub const MSG_LOGIN_FAILED: &str = "Login failed!";

/// Message for a verified user lacking the admin role
pub const MSG_NOT_ADMIN: &str = "You are not authorized to perform this operation!";

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Store error (query failure or timeout)
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Password hashing primitive failed or the stored hash is malformed
    #[error("Password hashing failed")]
    HashingFailed,

    /// Token could not be signed
    #[error("Token signing failed")]
    SigningFailed,

    /// Token missing, malformed, badly signed or expired
    #[error("Invalid token")]
    InvalidToken,

    /// Unknown username or wrong password
    #[error("{}", MSG_LOGIN_FAILED)]
    InvalidCredentials,

    /// Verified identity without the admin role
    #[error("{}", MSG_NOT_ADMIN)]
    NotAdmin,

    /// Signup body is missing a required field
    #[error("Malformed signup: {0}")]
    MalformedSignup(String),

    /// Insert of a new account failed (duplicate username included)
    #[error("Unable to create user: {0}")]
    CreationFailed(StoreError),
}

impl AuthError {
    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// Store and creation errors are sanitized so SQL details and username
    /// existence never reach the caller.
    pub fn client_message(&self) -> String {
        match self {
            AuthError::Store(_) | AuthError::CreationFailed(_) => {
                "Internal server error".to_string()
            }
            AuthError::HashingFailed | AuthError::SigningFailed => {
                "Internal server error".to_string()
            }
            AuthError::InvalidToken => "Unauthorized".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;
