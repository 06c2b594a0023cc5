//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. Failures are rendered as the
//! JSON envelope `{"success": false, "message": ...}` with HTTP 200, which is
//! what the frontend expects. Server-side failures are captured to Sentry
//! and hidden behind a generic message.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::services::auth::AuthError;
use crate::services::credits::CreditError;
use crate::services::payment::PaymentError;

/// Message shown for any failure the client cannot fix.
pub const GENERIC_FAILURE: &str = "Something went wrong";

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Registration or login failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Credit lookup failed.
    #[error("Credit error: {0}")]
    Credits(#[from] CreditError),

    /// Order creation or verification failed.
    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),

    /// Missing or invalid session token.
    #[error("Unauthorized")]
    Unauthorized,

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl AppError {
    /// Whether this error is our fault rather than the client's.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        match self {
            Self::Auth(err) => matches!(
                err,
                AuthError::Repository(_) | AuthError::PasswordHash | AuthError::Token(_)
            ),
            Self::Credits(err) => matches!(err, CreditError::Repository(_)),
            Self::Payment(err) => matches!(
                err,
                PaymentError::Repository(_)
                    | PaymentError::Gateway(_)
                    | PaymentError::AmountOutOfRange
            ),
            Self::Unauthorized | Self::BadRequest(_) => false,
        }
    }

    /// Message shown to the client.
    #[must_use]
    pub const fn client_message(&self) -> &'static str {
        if self.is_server_error() {
            return GENERIC_FAILURE;
        }

        match self {
            Self::Auth(err) => match err {
                AuthError::MissingDetails => "Missing Details",
                AuthError::InvalidEmail(_) => "Invalid email address",
                AuthError::UserNotFound => "User does not exist",
                AuthError::InvalidCredentials => "Invalid Credentials",
                AuthError::UserAlreadyExists => "User already exists",
                _ => GENERIC_FAILURE,
            },
            Self::Credits(_) => "User not found",
            Self::Payment(err) => match err {
                PaymentError::MissingDetails => "Missing Details",
                PaymentError::UserNotFound => "User not found",
                PaymentError::InvalidPlan(_) => "Invalid plan selected",
                PaymentError::TransactionNotFound => "Transaction not found",
                PaymentError::AlreadyPaid => "Payment already completed",
                PaymentError::OrderMismatch => "Order does not match transaction",
                PaymentError::SignatureRequired => "Payment signature required",
                PaymentError::InvalidSignature => "Invalid payment signature",
                _ => GENERIC_FAILURE,
            },
            Self::Unauthorized => "Not Authorized. Login Again",
            Self::BadRequest(_) => "Invalid request body",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        Json(json!({
            "success": false,
            "message": self.client_message(),
        }))
        .into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("payment", "Order created", Some(&[("plan", "Basic")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::RepositoryError;
    use axum::body::to_bytes;
    use axum::http::StatusCode;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_failures_use_envelope_with_ok_status() {
        let (status, body) = render(AppError::Unauthorized).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"success": false, "message": "Not Authorized. Login Again"})
        );
    }

    #[tokio::test]
    async fn test_server_errors_are_hidden() {
        let (_, body) = render(AppError::Credits(CreditError::Repository(
            RepositoryError::DataCorruption("negative balance".to_string()),
        )))
        .await;
        assert_eq!(body["message"], GENERIC_FAILURE);

        let (_, body) = render(AppError::Payment(PaymentError::Repository(
            RepositoryError::NotFound,
        )))
        .await;
        assert_eq!(body["message"], GENERIC_FAILURE);
    }

    #[test]
    fn test_client_messages() {
        let cases = [
            (AppError::Auth(AuthError::MissingDetails), "Missing Details"),
            (AppError::Auth(AuthError::UserNotFound), "User does not exist"),
            (AppError::Auth(AuthError::InvalidCredentials), "Invalid Credentials"),
            (AppError::Auth(AuthError::UserAlreadyExists), "User already exists"),
            (AppError::Credits(CreditError::UserNotFound), "User not found"),
            (
                AppError::Payment(PaymentError::InvalidPlan(imagify_core::PlanError(
                    "Gold".to_string(),
                ))),
                "Invalid plan selected",
            ),
            (
                AppError::Payment(PaymentError::TransactionNotFound),
                "Transaction not found",
            ),
            (
                AppError::Payment(PaymentError::AlreadyPaid),
                "Payment already completed",
            ),
        ];

        for (err, expected) in cases {
            assert!(!err.is_server_error(), "{err}");
            assert_eq!(err.client_message(), expected);
        }
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }
}
