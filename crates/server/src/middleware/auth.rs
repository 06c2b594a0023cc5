//! Token authentication extractor.
//!
//! The token is read from `Authorization: Bearer <jwt>`, falling back to the
//! bare `token` header older frontends send.

use axum::{extract::FromRequestParts, http::request::Parts};

use imagify_core::UserId;

use crate::error::{AppError, set_sentry_user};
use crate::state::AppState;

/// Header used by older frontends to carry the raw token.
pub const LEGACY_TOKEN_HEADER: &str = "token";

/// Extractor that requires a valid session token.
///
/// Rejects with "Not Authorized. Login Again" when the token is missing,
/// malformed, forged or expired. It does not check that the user still
/// exists; services report that separately.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(AuthUser(user_id): AuthUser) -> impl IntoResponse {
///     format!("Hello, user {user_id}!")
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub UserId);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::Unauthorized)?;

        let user_id = state.tokens().verify(token).map_err(|e| {
            tracing::debug!(error = %e, "rejected session token");
            AppError::Unauthorized
        })?;

        set_sentry_user(&user_id);
        tracing::Span::current().record("user_id", user_id.as_i32());

        Ok(Self(user_id))
    }
}

/// Pull the raw token out of the request headers.
fn bearer_token(parts: &Parts) -> Option<&str> {
    let headers = &parts.headers;

    let from_authorization = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);

    from_authorization
        .or_else(|| {
            headers
                .get(LEGACY_TOKEN_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
        })
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/api/user/credits");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_header() {
        let parts = parts(&[("authorization", "Bearer abc.def.ghi")]);
        assert_eq!(bearer_token(&parts), Some("abc.def.ghi"));
    }

    #[test]
    fn test_legacy_token_header() {
        let parts = parts(&[("token", "abc.def.ghi")]);
        assert_eq!(bearer_token(&parts), Some("abc.def.ghi"));
    }

    #[test]
    fn test_authorization_wins_over_legacy() {
        let parts = parts(&[("authorization", "Bearer new"), ("token", "old")]);
        assert_eq!(bearer_token(&parts), Some("new"));
    }

    #[test]
    fn test_missing_or_blank() {
        assert_eq!(bearer_token(&parts(&[])), None);
        assert_eq!(bearer_token(&parts(&[("token", "  ")])), None);
        assert_eq!(bearer_token(&parts(&[("authorization", "Basic xyz")])), None);
    }
}
