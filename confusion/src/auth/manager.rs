//! Authentication manager implementation.

use std::sync::Arc;

use super::{
    errors::{AuthError, AuthResult},
    models::{Claims, Credentials, IssuedToken, NewUser, SignupRequest, User, UserId},
    password::PasswordHasher,
    token::TokenIssuer,
};
use crate::db::{StoreResult, UserRepository};

/// Authentication manager
///
/// Composes the credential store, the password hasher and the token issuer.
#[derive(Clone)]
pub struct AuthManager {
    users: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
    tokens: TokenIssuer,
}

impl AuthManager {
    /// Create a new authentication manager
    ///
    /// # Arguments
    ///
    /// * `users` - Credential store
    /// * `tokens` - Token issuer holding the signing secret
    pub fn new(users: Arc<dyn UserRepository>, tokens: TokenIssuer) -> Self {
        Self {
            users,
            hasher: PasswordHasher::new(),
            tokens,
        }
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Register a new local account
    ///
    /// # Errors
    ///
    /// * `AuthError::MalformedSignup` - Username or password is empty
    /// * `AuthError::CreationFailed` - Insert rejected, duplicate username included
    /// * `AuthError::HashingFailed` - Hash primitive failed
    pub async fn signup(&self, request: SignupRequest) -> AuthResult<UserId> {
        if request.username.is_empty() {
            return Err(AuthError::MalformedSignup("username is required".to_string()));
        }
        if request.password.is_empty() {
            return Err(AuthError::MalformedSignup("password is required".to_string()));
        }

        let password_hash = self.hash_password(request.password).await?;
        let user = NewUser {
            firstname: request.firstname,
            lastname: request.lastname,
            username: request.username,
            password_hash: Some(password_hash),
        };

        let id = self
            .users
            .create_user(&user)
            .await
            .map_err(AuthError::CreationFailed)?;
        log::info!("Registered user {} ({})", id, user.username);
        Ok(id)
    }

    /// Check credentials and issue a token
    ///
    /// Unknown usernames and wrong passwords both yield
    /// `AuthError::InvalidCredentials`.
    pub async fn login(&self, credentials: Credentials) -> AuthResult<IssuedToken> {
        let Some(record) = self.users.find_credentials(&credentials.username).await? else {
            log::debug!("Login for unknown user {}", credentials.username);
            return Err(AuthError::InvalidCredentials);
        };

        let matches = self
            .verify_password(record.password_hash, credentials.password)
            .await?;
        if !matches {
            log::debug!("Password mismatch for user {}", record.id);
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(record.id, record.admin)?;
        Ok(IssuedToken {
            token,
            user_id: record.id,
            admin: record.admin,
        })
    }

    /// Verify a bearer token
    pub fn verify_token(&self, token: &str) -> AuthResult<Claims> {
        self.tokens.verify(token)
    }

    pub async fn list_users(&self) -> AuthResult<Vec<User>> {
        Ok(self.users.list_users().await?)
    }

    /// Round trip to the credential store
    pub async fn store_health(&self) -> StoreResult<()> {
        self.users.ping().await
    }

    async fn hash_password(&self, password: String) -> AuthResult<String> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|_| AuthError::HashingFailed)?
    }

    async fn verify_password(&self, stored: Option<String>, password: String) -> AuthResult<bool> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(stored.as_deref(), &password))
            .await
            .map_err(|_| AuthError::HashingFailed)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    const SECRET: &str = "test_secret_that_is_at_least_32_chars";

    fn manager() -> (AuthManager, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let manager = AuthManager::new(store.clone(), TokenIssuer::new(SECRET));
        (manager, store)
    }

    fn signup(username: &str, password: &str) -> SignupRequest {
        SignupRequest {
            firstname: "Alice".to_string(),
            lastname: "Liddell".to_string(),
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    fn creds(username: &str, password: &str) -> Credentials {
        Credentials {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_signup_then_login() {
        let (auth, _) = manager();
        let id = auth.signup(signup("alice", "secret1")).await.unwrap();

        let issued = auth.login(creds("alice", "secret1")).await.unwrap();
        assert_eq!(issued.user_id, id);
        assert!(!issued.admin);

        let claims = auth.verify_token(&issued.token).unwrap();
        assert_eq!(claims.user_id(), Some(id));
        assert!(!claims.admin);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let (auth, _) = manager();
        auth.signup(signup("alice", "secret1")).await.unwrap();

        let wrong_password = auth.login(creds("alice", "nope")).await.unwrap_err();
        let unknown_user = auth.login(creds("mallory", "secret1")).await.unwrap_err();

        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_user, AuthError::InvalidCredentials));
        assert_eq!(wrong_password.client_message(), unknown_user.client_message());
    }

    #[tokio::test]
    async fn test_duplicate_signup_fails() {
        let (auth, _) = manager();
        auth.signup(signup("alice", "secret1")).await.unwrap();
        let err = auth.signup(signup("alice", "other")).await.unwrap_err();
        assert!(matches!(err, AuthError::CreationFailed(_)));
    }

    #[tokio::test]
    async fn test_empty_fields_rejected() {
        let (auth, _) = manager();
        assert!(matches!(
            auth.signup(signup("", "pw")).await,
            Err(AuthError::MalformedSignup(_))
        ));
        assert!(matches!(
            auth.signup(signup("alice", "")).await,
            Err(AuthError::MalformedSignup(_))
        ));
    }

    #[tokio::test]
    async fn test_admin_flag_flows_into_token() {
        let (auth, store) = manager();
        auth.signup(signup("root", "toor")).await.unwrap();
        store.promote_to_admin("root");

        let issued = auth.login(creds("root", "toor")).await.unwrap();
        assert!(issued.admin);
        assert!(auth.verify_token(&issued.token).unwrap().admin);
    }

    #[tokio::test]
    async fn test_remote_account_cannot_password_login() {
        let (auth, store) = manager();
        store
            .create_user(&NewUser {
                firstname: String::new(),
                lastname: String::new(),
                username: "remote".to_string(),
                password_hash: None,
            })
            .await
            .unwrap();

        let err = auth.login(creds("remote", "")).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_list_users_hides_hashes() {
        let (auth, _) = manager();
        auth.signup(signup("alice", "secret1")).await.unwrap();
        auth.signup(signup("bob", "secret2")).await.unwrap();

        let users = auth.list_users().await.unwrap();
        assert_eq!(users.len(), 2);
        let json = serde_json::to_string(&users).unwrap();
        assert!(!json.contains("argon2"));
    }
}
