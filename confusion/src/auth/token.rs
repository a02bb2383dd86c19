//! HS256 JWT issuance and verification.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use std::fmt;

use super::{
    errors::{AuthError, AuthResult},
    models::{Claims, UserId},
};

/// Token lifetime (24 hours)
pub const DEFAULT_TOKEN_TTL: Duration = Duration::hours(24);

/// Signs and verifies bearer tokens with one shared secret
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    /// Create an issuer for the given signing secret
    ///
    /// # Arguments
    ///
    /// * `secret` - HMAC key, loaded once from configuration
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // exp is enforced to the second
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl: DEFAULT_TOKEN_TTL,
        }
    }

    /// Override the token lifetime
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token that expires `ttl` from now
    pub fn issue(&self, user_id: UserId, is_admin: bool) -> AuthResult<String> {
        self.issue_expiring_at(user_id, is_admin, Utc::now() + self.ttl)
    }

    /// Issue a token with an explicit expiration instant
    pub fn issue_expiring_at(
        &self,
        user_id: UserId,
        is_admin: bool,
        expires_at: DateTime<Utc>,
    ) -> AuthResult<String> {
        let claims = Claims {
            user_id: user_id.to_string(),
            admin: is_admin,
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|_| AuthError::SigningFailed)
    }

    /// Verify signature and expiration.
    ///
    /// A token is valid only while its expiration is strictly in the future.
    /// Every failure reason collapses into `InvalidToken`.
    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| {
                log::debug!("Token rejected: {err}");
                AuthError::InvalidToken
            })?;

        // jsonwebtoken still accepts exp == now
        if claims.exp <= Utc::now().timestamp() {
            log::debug!("Token rejected: expires at {}", claims.exp);
            return Err(AuthError::InvalidToken);
        }

        Ok(claims)
    }
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}
