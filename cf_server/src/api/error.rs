//! HTTP error taxonomy.
//!
//! Every handler and interceptor fails with [`ApiError`], which fixes the
//! status code and the body the client sees. Library errors are mapped here
//! so store internals never leak into responses.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use confusion::{AuthError, MenuError};
use serde::Serialize;
use thiserror::Error;

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// Undecodable body, bad path id or rejected field values (400)
    #[error("{0}")]
    MalformedRequest(String),

    /// Missing or bad credentials, or insufficient role (401)
    #[error("{0}")]
    Unauthorized(String),

    /// Target row does not exist (404)
    #[error("{0}")]
    NotFound(String),

    /// Store, timeout or crypto failure (500)
    #[error("{0}")]
    ServerFailure(String),

    /// Method registered only to be refused (403)
    #[error("{method} operation not supported on {path}")]
    Unsupported { method: Method, path: String },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::ServerFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unsupported { .. } => StatusCode::FORBIDDEN,
        }
    }

    /// Plain `401 Unauthorized` used by the token interceptor
    pub fn unauthorized() -> Self {
        ApiError::Unauthorized("Unauthorized".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            // Rejections and refusals are plain text bodies
            ApiError::Unauthorized(_) | ApiError::Unsupported { .. } => {
                (status, self.to_string()).into_response()
            }
            _ => (
                status,
                Json(ErrorResponse {
                    error: self.to_string(),
                }),
            )
                .into_response(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::InvalidToken
            | AuthError::NotAdmin
            | AuthError::MalformedSignup(_) => ApiError::Unauthorized(err.client_message()),
            AuthError::Store(_)
            | AuthError::CreationFailed(_)
            | AuthError::HashingFailed
            | AuthError::SigningFailed => {
                tracing::error!(error = %err, "Authentication backend failure");
                ApiError::ServerFailure(err.client_message())
            }
        }
    }
}

impl From<MenuError> for ApiError {
    fn from(err: MenuError) -> Self {
        match err {
            MenuError::Store(_) => {
                tracing::error!(error = %err, "Menu store failure");
                ApiError::ServerFailure(err.client_message())
            }
            MenuError::NotFound(_) => ApiError::NotFound(err.client_message()),
            MenuError::EmptyUpdate | MenuError::UpdateConflict | MenuError::InvalidRating(_) => {
                ApiError::MalformedRequest(err.client_message())
            }
            MenuError::NotOwner => ApiError::Unauthorized(err.client_message()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::MalformedRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confusion::db::StoreError;
    use std::time::Duration;

    #[test]
    fn test_menu_error_statuses() {
        let cases = [
            (MenuError::NotFound("dish".to_string()), StatusCode::NOT_FOUND),
            (MenuError::EmptyUpdate, StatusCode::BAD_REQUEST),
            (MenuError::UpdateConflict, StatusCode::BAD_REQUEST),
            (MenuError::InvalidRating(0), StatusCode::BAD_REQUEST),
            (MenuError::NotOwner, StatusCode::UNAUTHORIZED),
            (
                MenuError::Store(StoreError::Timeout(Duration::from_secs(15))),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn test_auth_error_statuses() {
        assert_eq!(
            ApiError::from(AuthError::InvalidCredentials).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AuthError::CreationFailed(StoreError::Conflict(
                "username".to_string()
            )))
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_store_details_not_exposed() {
        let err = ApiError::from(MenuError::Store(StoreError::Conflict(
            "dishes_name_key".to_string(),
        )));
        assert!(!err.to_string().contains("dishes_name_key"));
    }

    #[test]
    fn test_unsupported_message() {
        let err = ApiError::Unsupported {
            method: Method::PUT,
            path: "/dishes".to_string(),
        };
        assert_eq!(err.to_string(), "PUT operation not supported on /dishes");
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }
}
