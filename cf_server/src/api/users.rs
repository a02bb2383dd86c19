//! Account handlers: signup, login, token check and the admin user listing.
//!
//! Response shapes follow what the web client already parses:
//!
//! ```bash
//! curl -X POST http://localhost:3000/users/signup \
//!   -H "Content-Type: application/json" \
//!   -d '{"username": "alice", "password": "secret1", "firstname": "Alice"}'
//! # {"status":"Registration Successful!","user":"alice"}
//!
//! curl -X POST http://localhost:3000/users/login \
//!   -H "Content-Type: application/json" \
//!   -d '{"username": "alice", "password": "secret1"}'
//! # {"success":true,"token":"eyJhbGciOiJIUzI1NiIs...","status":"You are successfully logged in!"}
//! ```

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
};
use confusion::auth::{AuthError, Credentials, MSG_LOGIN_FAILED, SignupRequest, User};
use serde::Serialize;

use super::{AppState, error::ApiError, middleware::extract_bearer};
use crate::{logging, metrics};

pub const MSG_LOGIN_OK: &str = "You are successfully logged in!";
pub const MSG_SIGNUP_OK: &str = "Registration Successful!";
pub const MSG_JWT_VALID: &str = "JWT valid!";
pub const MSG_JWT_INVALID: &str = "JWT invalid!";

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub status: String,
}

impl LoginResponse {
    fn failed() -> Self {
        LoginResponse {
            success: false,
            token: String::new(),
            status: MSG_LOGIN_FAILED.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub status: String,
    pub user: String,
}

#[derive(Debug, Serialize)]
pub struct TokenStatus {
    pub status: String,
    pub success: bool,
    pub err: String,
}

/// Create a local account.
///
/// # Errors
///
/// - `401 Unauthorized`: body is not a signup object, or username/password empty
/// - `500 Internal Server Error`: insert failed, duplicate username included
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<Json<SignupResponse>, ApiError> {
    let Ok(Json(request)) = payload else {
        return Err(ApiError::unauthorized());
    };
    let username = request.username.clone();

    let user_id = state.auth_manager.signup(request).await?;
    tracing::info!(user_id, username = %username, "User registered");

    Ok(Json(SignupResponse {
        status: MSG_SIGNUP_OK.to_string(),
        user: username,
    }))
}

/// Exchange credentials for a bearer token.
///
/// Unknown usernames and wrong passwords produce the same `401` body.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<(StatusCode, Json<LoginResponse>), ApiError> {
    let Ok(Json(credentials)) = payload else {
        metrics::login_attempts_total(false);
        return Ok((StatusCode::UNAUTHORIZED, Json(LoginResponse::failed())));
    };
    let username = credentials.username.clone();

    match state.auth_manager.login(credentials).await {
        Ok(issued) => {
            metrics::login_attempts_total(true);
            tracing::info!(user_id = issued.user_id, admin = issued.admin, "User logged in");
            Ok((
                StatusCode::OK,
                Json(LoginResponse {
                    success: true,
                    token: issued.token,
                    status: MSG_LOGIN_OK.to_string(),
                }),
            ))
        }
        Err(AuthError::InvalidCredentials) => {
            metrics::login_attempts_total(false);
            logging::log_security_event(
                "failed_login",
                None,
                Some("POST /users/login"),
                &format!("Login failed for '{username}'"),
            );
            Ok((StatusCode::UNAUTHORIZED, Json(LoginResponse::failed())))
        }
        Err(e) => {
            metrics::login_attempts_total(false);
            Err(e.into())
        }
    }
}

/// Report whether the presented bearer token is currently valid.
pub async fn check_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> (StatusCode, Json<TokenStatus>) {
    let valid = extract_bearer(headers.get(AUTHORIZATION))
        .map(|token| state.auth_manager.verify_token(token).is_ok())
        .unwrap_or(false);

    let (status, message) = if valid {
        (StatusCode::OK, MSG_JWT_VALID)
    } else {
        (StatusCode::UNAUTHORIZED, MSG_JWT_INVALID)
    };

    (
        status,
        Json(TokenStatus {
            status: message.to_string(),
            success: valid,
            err: message.to_string(),
        }),
    )
}

/// List every account (admin only). Password hashes are never serialized.
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(state.auth_manager.list_users().await?))
}
