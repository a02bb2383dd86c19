//! Argon2id password hashing.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        self, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
        rand_core::OsRng,
    },
};

use super::errors::{AuthError, AuthResult};

/// Memory cost in KiB (19 MiB)
pub const MEMORY_COST_KIB: u32 = 19_456;

/// Number of passes over memory
pub const ITERATIONS: u32 = 2;

/// Degree of parallelism
pub const LANES: u32 = 1;

/// Salted, adaptive one-way password hasher.
///
/// Cost parameters are compile-time constants and never derived from input.
/// Both operations are CPU bound; async callers should run them on the
/// blocking pool.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    pub fn new() -> Self {
        let params = Params::new(MEMORY_COST_KIB, ITERATIONS, LANES, None).unwrap_or_default();
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    /// Hash a plaintext password into a PHC string with a fresh random salt
    pub fn hash(&self, plaintext: &str) -> AuthResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|_| AuthError::HashingFailed)
    }

    /// Check a plaintext password against a stored hash.
    ///
    /// An absent hash (remotely created account) never matches. A stored hash
    /// that does not parse is reported as `HashingFailed`.
    pub fn verify(&self, stored_hash: Option<&str>, plaintext: &str) -> AuthResult<bool> {
        let Some(stored_hash) = stored_hash else {
            return Ok(false);
        };

        let parsed = PasswordHash::new(stored_hash).map_err(|_| AuthError::HashingFailed)?;
        match self.argon2.verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(_) => Err(AuthError::HashingFailed),
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
