//! Authentication data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// User ID type
pub type UserId = i64;

/// User account as exposed to administrators.
///
/// The password hash is deliberately not part of this type; it only travels
/// inside [`CredentialRecord`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub firstname: String,
    pub lastname: String,
    pub username: String,
    pub admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row inserted by signup
#[derive(Debug, Clone)]
pub struct NewUser {
    pub firstname: String,
    pub lastname: String,
    pub username: String,
    /// `None` for accounts whose identity lives with a remote provider
    pub password_hash: Option<String>,
}

/// What a login needs from the store for one username
#[derive(Debug, Clone)]
pub struct CredentialRecord {
    pub id: UserId,
    pub password_hash: Option<String>,
    pub admin: bool,
}

/// Signup request body
#[derive(Clone, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupRequest")
            .field("firstname", &self.firstname)
            .field("lastname", &self.lastname)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Login attempt; never persisted
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Verified identity carried by a token.
///
/// `Claims::default()` is the zero value handed out when a request carries no
/// verified identity: empty user id, not an admin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "_id")]
    pub user_id: String,
    pub admin: bool,
    /// Expiration, seconds since the Unix epoch
    pub exp: i64,
}

impl Claims {
    /// Numeric user id, if the claim holds one
    pub fn user_id(&self) -> Option<UserId> {
        self.user_id.parse().ok()
    }
}

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub user_id: UserId,
    pub admin: bool,
}
