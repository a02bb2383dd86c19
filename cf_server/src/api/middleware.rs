//! Authentication and authorization interceptors.
//!
//! Two interceptors share the `(request, next) -> response` shape and are
//! stacked per route group at registration time:
//!
//! - [`require_user`] verifies the `Authorization: Bearer <token>` header and
//!   attaches the decoded [`Claims`] to the request extensions.
//! - [`require_admin`] reads those claims and refuses callers without the
//!   admin role.
//!
//! # Usage
//!
//! The layer added last runs first, so the token check is layered after the
//! role check:
//!
//! ```rust,no_run
//! use axum::{Router, routing::delete, middleware};
//! # use cf_server::api::middleware::{require_admin, require_user};
//! # use cf_server::api::AppState;
//! # async fn handler() {}
//! # let state: AppState = unimplemented!();
//!
//! let admin_routes: Router<AppState> = Router::new()
//!     .route("/dishes", delete(handler))
//!     .layer(middleware::from_fn(require_admin))
//!     .layer(middleware::from_fn_with_state(state.clone(), require_user));
//! # let _ = admin_routes;
//! ```
//!
//! # Reading the caller
//!
//! ```rust,no_run
//! use cf_server::api::middleware::CurrentUser;
//!
//! async fn protected_handler(CurrentUser(claims): CurrentUser) -> String {
//!     format!("Authenticated as user {}", claims.user_id)
//! }
//! # let _ = protected_handler;
//! ```

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderValue, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use confusion::auth::{Claims, MSG_NOT_ADMIN, UserId};

use super::{AppState, error::ApiError};
use crate::{logging, metrics};

const BEARER_PREFIX: &str = "Bearer ";

/// Pull the token out of an `Authorization` header value.
///
/// Accepts exactly `Bearer <token>` with one non-empty, whitespace-free token.
pub fn extract_bearer(header: Option<&HeaderValue>) -> Option<&str> {
    let value = header?.to_str().ok()?;
    let token = value.strip_prefix(BEARER_PREFIX)?;
    if token.is_empty() || token.contains(char::is_whitespace) {
        return None;
    }
    Some(token)
}

/// Claims attached by [`require_user`], or the zero value when none were
pub fn claims_of(request: &Request) -> Claims {
    request
        .extensions()
        .get::<Claims>()
        .cloned()
        .unwrap_or_default()
}

fn route_of(request: &Request) -> String {
    format!("{} {}", request.method(), request.uri().path())
}

fn reject(reason: &'static str, user_id: Option<UserId>, route: &str, message: &str) {
    metrics::auth_rejections_total(reason);
    logging::log_security_event(reason, user_id, Some(route), message);
}

/// Verify the bearer token and attach its claims.
///
/// - **Missing or malformed header**: `401 Unauthorized`
/// - **Bad signature or expired token**: `401 Unauthorized`
/// - **Success**: inserts [`Claims`] into the request extensions and forwards
pub async fn require_user(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = extract_bearer(request.headers().get(AUTHORIZATION)) else {
        reject(
            "missing_token",
            None,
            &route_of(&request),
            "No bearer token on protected route",
        );
        return Err(ApiError::unauthorized());
    };

    match state.auth_manager.verify_token(token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            Ok(next.run(request).await)
        }
        Err(_) => {
            reject(
                "invalid_token",
                None,
                &route_of(&request),
                "Bearer token failed verification",
            );
            Err(ApiError::unauthorized())
        }
    }
}

/// Refuse callers whose verified claims lack the admin flag.
///
/// Must run after [`require_user`]; without attached claims the caller is
/// treated as the zero identity and refused.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let claims = claims_of(&request);
    if !claims.admin {
        reject(
            "not_admin",
            claims.user_id(),
            &route_of(&request),
            "Non-admin caller on admin route",
        );
        return Err(ApiError::Unauthorized(MSG_NOT_ADMIN.to_string()));
    }
    Ok(next.run(request).await)
}

/// Extractor for the caller's claims.
///
/// Never rejects: routes outside [`require_user`] see the zero-value claims.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Claims);

impl CurrentUser {
    /// Numeric id of the caller; the zero identity is unauthorized
    pub fn id(&self) -> Result<UserId, ApiError> {
        self.0.user_id().ok_or_else(ApiError::unauthorized)
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CurrentUser(
            parts.extensions.get::<Claims>().cloned().unwrap_or_default(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn header(value: &'static str) -> HeaderValue {
        HeaderValue::from_static(value)
    }

    #[test]
    fn test_extract_bearer_accepts_single_token() {
        let value = header("Bearer abc.def.ghi");
        assert_eq!(extract_bearer(Some(&value)), Some("abc.def.ghi"));
    }

    #[test]
    fn test_extract_bearer_rejects_malformed() {
        assert_eq!(extract_bearer(None), None);
        for raw in ["Bearer", "Bearer ", "Bearer a b", "Token xyz", "bearer abc", "Bearer  abc"] {
            let value = header(raw);
            assert_eq!(extract_bearer(Some(&value)), None, "accepted {raw:?}");
        }
    }

    #[test]
    fn test_claims_of_defaults_to_zero_value() {
        let request = Request::new(Body::empty());
        let claims = claims_of(&request);
        assert_eq!(claims, Claims::default());
        assert!(claims.user_id().is_none());
    }

    #[test]
    fn test_claims_of_reads_extension() {
        let mut request = Request::new(Body::empty());
        let claims = Claims {
            user_id: "7".to_string(),
            admin: true,
            exp: 0,
        };
        request.extensions_mut().insert(claims.clone());
        assert_eq!(claims_of(&request), claims);
    }

    #[test]
    fn test_current_user_zero_identity_is_unauthorized() {
        let user = CurrentUser(Claims::default());
        assert!(matches!(user.id(), Err(ApiError::Unauthorized(_))));

        let user = CurrentUser(Claims {
            user_id: "42".to_string(),
            ..Default::default()
        });
        assert_eq!(user.id().unwrap(), 42);
    }
}
