//! HTTP API for the conFusion backend.
//!
//! # Architecture
//!
//! The API is built with:
//! - **Axum**: async web framework
//! - **Tower**: CORS and per-route-group interceptors
//! - **JWT**: stateless bearer tokens verified by [`middleware::require_user`]
//!
//! Routes are split into three groups merged into one router: public reads,
//! routes gated by `require_user`, and routes gated by `require_user` then
//! `require_admin`.
//!
//! # Endpoints Overview
//!
//! ## Accounts
//! - `POST /users/signup`, `POST /signup` - Register (public)
//! - `POST /users/login`, `POST /login` - Login (public)
//! - `GET /users/checkJWTtoken`, `GET /checkToken` - Token check (public)
//! - `GET /users` - List accounts (admin)
//!
//! ## Menu
//! - `GET /dishes[?featured=true]`, `GET /dishes/{dish_id}` (public)
//! - `POST /dishes`, `PUT|DELETE /dishes/{dish_id}`, `DELETE /dishes` (admin)
//! - `GET /dishes/{dish_id}/comments[/{comment_id}]` (public)
//! - `POST /dishes/{dish_id}/comments` (user), `PUT|DELETE .../{comment_id}` (author)
//! - `DELETE /dishes/{dish_id}/comments` (admin)
//! - `/promotions` and `/leaders` mirror `/dishes` without comments
//! - `GET|POST|DELETE /favorites[/{dish_id}]` (user)
//!
//! Methods that a path refuses answer `403` with
//! `"<METHOD> operation not supported on <path>"`.
//!
//! ## Ambient
//! - `GET /` - Welcome text
//! - `GET /health` - Server and store health
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use cf_server::api::{create_router, AppState};
//! use confusion::{AuthManager, MemoryStore, MenuManager, TokenIssuer};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryStore::new());
//! let state = AppState {
//!     auth_manager: Arc::new(AuthManager::new(
//!         store.clone(),
//!         TokenIssuer::new("a_signing_secret_of_at_least_32_chars"),
//!     )),
//!     menu_manager: Arc::new(MenuManager::from_store(store)),
//! };
//!
//! let app = create_router(state, &["http://localhost:3000".to_string()]);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod comments;
pub mod dishes;
pub mod error;
pub mod favorites;
pub mod leaders;
pub mod middleware;
pub mod promotions;
pub mod request_id;
pub mod users;

use std::{sync::Arc, time::Instant};

use axum::{
    Router,
    extract::State,
    http::{HeaderName, HeaderValue, Method, StatusCode, Uri, header},
    middleware::{from_fn, from_fn_with_state},
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post, put},
};
use confusion::{AuthManager, MenuManager, menu::is_truthy};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::logging;
use error::ApiError;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request (cheap due to Arc wrappers).
#[derive(Clone)]
pub struct AppState {
    pub auth_manager: Arc<AuthManager>,
    pub menu_manager: Arc<MenuManager>,
}

/// Query string of the list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub featured: Option<String>,
}

impl ListQuery {
    /// `?featured=` accepts `true`, `t` or `1`; anything else lists everything
    pub fn featured_only(&self) -> bool {
        self.featured.as_deref().is_some_and(is_truthy)
    }
}

/// Serialize a single item, or answer `{}` when it does not exist
pub(crate) fn item_or_empty<T: Serialize>(item: Option<T>) -> Response {
    match item {
        Some(item) => Json(item).into_response(),
        None => Json(json!({})).into_response(),
    }
}

/// Handler for methods a path deliberately refuses
async fn unsupported(method: Method, uri: Uri) -> ApiError {
    ApiError::Unsupported {
        method,
        path: uri.path().to_string(),
    }
}

/// CORS policy: credentialed requests from the configured origins only
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring unusable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::CONTENT_LENGTH,
            header::ACCEPT_ENCODING,
            HeaderName::from_static("x-csrf-token"),
            header::AUTHORIZATION,
            header::ACCEPT,
            header::ORIGIN,
            header::CACHE_CONTROL,
            HeaderName::from_static("x-requested-with"),
        ])
}

/// Create the complete API router with all endpoints and middleware.
///
/// Request flow: request id → CORS → (`require_user` → (`require_admin`)) → handler.
pub fn create_router(state: AppState, allowed_origins: &[String]) -> Router {
    let public_routes = Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/users/signup", post(users::signup))
        .route("/signup", post(users::signup))
        .route("/users/login", post(users::login))
        .route("/login", post(users::login))
        .route("/users/checkJWTtoken", get(users::check_token))
        .route("/checkToken", get(users::check_token))
        .route("/dishes", get(dishes::list_dishes))
        .route("/dishes/{dish_id}", get(dishes::get_dish))
        .route("/dishes/{dish_id}/comments", get(comments::list_comments))
        .route(
            "/dishes/{dish_id}/comments/{comment_id}",
            get(comments::get_comment),
        )
        .route("/promotions", get(promotions::list_promotions))
        .route("/promotions/{promotion_id}", get(promotions::get_promotion))
        .route("/leaders", get(leaders::list_leaders))
        .route("/leaders/{leader_id}", get(leaders::get_leader));

    let user_routes = Router::new()
        .route(
            "/dishes/{dish_id}/comments",
            post(comments::add_comment).put(unsupported),
        )
        .route(
            "/dishes/{dish_id}/comments/{comment_id}",
            put(comments::update_comment)
                .post(unsupported)
                .delete(comments::delete_comment),
        )
        .route(
            "/favorites",
            get(favorites::list_favorites)
                .post(favorites::add_favorites)
                .delete(favorites::clear_favorites),
        )
        .route(
            "/favorites/{dish_id}",
            get(favorites::favorite_status)
                .post(favorites::add_favorite)
                .delete(favorites::remove_favorite),
        )
        .layer(from_fn_with_state(state.clone(), middleware::require_user));

    let admin_routes = Router::new()
        .route("/users", get(users::list_users))
        .route(
            "/dishes",
            post(dishes::create_dish)
                .put(unsupported)
                .delete(dishes::delete_all_dishes),
        )
        .route(
            "/dishes/{dish_id}",
            put(dishes::update_dish)
                .post(unsupported)
                .delete(dishes::delete_dish),
        )
        .route(
            "/dishes/{dish_id}/comments",
            delete(comments::delete_all_comments),
        )
        .route(
            "/promotions",
            post(promotions::create_promotion)
                .put(unsupported)
                .delete(promotions::delete_all_promotions),
        )
        .route(
            "/promotions/{promotion_id}",
            put(promotions::update_promotion)
                .post(unsupported)
                .delete(promotions::delete_promotion),
        )
        .route(
            "/leaders",
            post(leaders::create_leader)
                .put(unsupported)
                .delete(leaders::delete_all_leaders),
        )
        .route(
            "/leaders/{leader_id}",
            put(leaders::update_leader)
                .post(unsupported)
                .delete(leaders::delete_leader),
        )
        // Last layer runs first: token check, then role check
        .layer(from_fn(middleware::require_admin))
        .layer(from_fn_with_state(state.clone(), middleware::require_user));

    Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(admin_routes)
        .layer(
            ServiceBuilder::new()
                .layer(from_fn(request_id::request_id_middleware))
                .layer(cors_layer(allowed_origins)),
        )
        .with_state(state)
}

async fn index() -> &'static str {
    "Welcome to ConFusion!\n"
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when the store answers a ping, `503 Service Unavailable`
/// otherwise.
///
/// ```bash
/// curl http://localhost:3000/health
/// # {"status":"healthy","version":"1.0.0","database":true,"timestamp":"2026-01-01T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let started = Instant::now();
    let store = state.auth_manager.store_health().await;
    logging::log_database_operation("ping", started.elapsed().as_millis() as u64);

    if let Err(e) = &store {
        tracing::error!(error = %e, "Store health check failed");
    }
    let healthy = store.is_ok();

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "database": healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
