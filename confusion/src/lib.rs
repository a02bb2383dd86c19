//! # conFusion
//!
//! Domain core of the conFusion restaurant backend: user accounts and
//! stateless token authentication, plus the menu resources the web client
//! browses and edits.
//!
//! ## Core Modules
//!
//! - [`auth`]: Argon2id password hashing, HS256 bearer tokens, signup and login
//! - [`db`]: PostgreSQL pool, query timeouts, repository traits with
//!   PostgreSQL and in-memory implementations
//! - [`menu`]: Dishes, promotions, leaders, comments and favorites
//!
//! ## Example
//!
//! ```
//! use confusion::auth::TokenIssuer;
//!
//! let issuer = TokenIssuer::new("a_signing_secret_of_at_least_32_chars");
//! let token = issuer.issue(1, false).unwrap();
//! assert_eq!(issuer.verify(&token).unwrap().user_id, "1");
//! ```

/// User accounts, password hashing and token authentication.
pub mod auth;
pub use auth::{AuthError, AuthManager, Claims, TokenIssuer};

/// Database pool, timeouts and repositories.
pub mod db;
pub use db::{Database, DatabaseConfig, MemoryStore, PgStore};

/// Menu resources.
pub mod menu;
pub use menu::{MenuError, MenuManager};
