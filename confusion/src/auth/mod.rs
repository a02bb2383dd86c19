//! Authentication module: password hashing, bearer tokens, signup and login.
//!
//! This module implements stateless authentication with:
//! - Argon2id password hashing with fixed cost parameters
//! - HS256 JWTs carrying the user id, the admin flag and a 24 hour expiry
//! - A generic login failure that never reveals whether the username exists
//!
//! ## Example
//!
//! ```no_run
//! use confusion::auth::{AuthManager, Credentials, SignupRequest, TokenIssuer};
//! use confusion::db::MemoryStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let auth = AuthManager::new(
//!         Arc::new(MemoryStore::new()),
//!         TokenIssuer::new("a_signing_secret_of_at_least_32_chars"),
//!     );
//!
//!     auth.signup(SignupRequest {
//!         firstname: "Alice".to_string(),
//!         lastname: "Liddell".to_string(),
//!         username: "alice".to_string(),
//!         password: "secret1".to_string(),
//!     })
//!     .await?;
//!
//!     let issued = auth
//!         .login(Credentials {
//!             username: "alice".to_string(),
//!             password: "secret1".to_string(),
//!         })
//!         .await?;
//!     println!("token: {}", issued.token);
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod manager;
pub mod models;
pub mod password;
pub mod token;

pub use errors::{AuthError, AuthResult, MSG_LOGIN_FAILED, MSG_NOT_ADMIN};
pub use manager::AuthManager;
pub use models::{
    Claims, CredentialRecord, Credentials, IssuedToken, NewUser, SignupRequest, User, UserId,
};
pub use password::PasswordHasher;
pub use token::{DEFAULT_TOKEN_TTL, TokenIssuer};
