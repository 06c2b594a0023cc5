//! HTTP middleware stack.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, HTTP context)
//! 2. CORS
//! 3. `TraceLayer` (request tracing)
//! 4. Request ID (add unique ID to each request)
//! 5. Rate limiting on auth routes (governor)
//!
//! Token authentication is an extractor, not a layer: see [`AuthUser`].

pub mod auth;
pub mod rate_limit;
pub mod request_id;

pub use auth::AuthUser;
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
