//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Liveness check
//! GET  /health/ready            - Readiness check (database)
//!
//! # Accounts (rate limited)
//! POST /api/user/register       - Create account, returns token
//! POST /api/user/login          - Password login, returns token
//!
//! # Requires token (Authorization: Bearer, or legacy `token` header)
//! GET  /api/user/credits        - Credit balance
//! POST /api/user/pay-razor      - Open a Razorpay order for a plan
//! POST /api/user/verify-razor   - Settle a completed checkout
//! GET  /api/user/transactions   - Purchase history, newest first
//! ```

pub mod health;
pub mod user;

use axum::{
    Router,
    body::Body,
    extract::FromRequest,
    http::{HeaderValue, Request},
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::middleware::{auth_rate_limiter, request_id_middleware};
use crate::state::AppState;

/// JSON body extractor whose rejection is rendered as an [`AppError`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Create the account routes router.
///
/// Register and login are rate limited per client IP.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(user::register))
        .route("/login", post(user::login))
        .layer(auth_rate_limiter())
}

/// Create the `/api/user` router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .merge(account_routes())
        .route("/credits", get(user::credits))
        .route("/pay-razor", post(user::pay_razor))
        .route("/verify-razor", post(user::verify_razor))
        .route("/transactions", get(user::transactions))
}

/// Create all routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api/user", user_routes())
}

/// Build the application with its middleware stack.
///
/// Sentry layers are added by the binary, outside this stack.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(state.config().cors_origin.as_deref());

    routes()
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = tracing::field::Empty,
                    user_id = tracing::field::Empty,
                )
            }),
        )
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    match origin.and_then(|o| HeaderValue::from_str(o).ok()) {
        Some(origin) => layer.allow_origin(origin),
        None => layer.allow_origin(Any),
    }
}
