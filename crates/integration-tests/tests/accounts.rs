//! Registration, login and token tests.

#![allow(clippy::unwrap_used)]

use imagify_core::UserId;
use imagify_integration_tests::{store, token_keys};
use imagify_server::services::auth::{AuthError, AuthService, DEFAULT_CREDIT_BALANCE};
use imagify_server::services::credits::{CreditError, CreditService};

#[tokio::test]
async fn test_register_then_login_then_credits() {
    let store = store();
    let keys = token_keys();
    let auth = AuthService::new(&store, &keys);

    let registered = auth
        .register("Asha", "asha@example.com", "correct horse")
        .await
        .unwrap();
    assert_eq!(registered.user.profile().name, "Asha");

    let session = auth.login("Asha@Example.com", "correct horse").await.unwrap();
    let user_id = keys.verify(&session.token).unwrap();
    assert_eq!(user_id, registered.user.id);

    let summary = CreditService::new(&store).get_credits(user_id).await.unwrap();
    assert_eq!(summary.credits, DEFAULT_CREDIT_BALANCE);
    assert_eq!(summary.user.name, "Asha");
}

#[tokio::test]
async fn test_login_failures_are_distinguished() {
    let store = store();
    let keys = token_keys();
    let auth = AuthService::new(&store, &keys);
    auth.register("Asha", "asha@example.com", "correct horse")
        .await
        .unwrap();

    assert!(matches!(
        auth.login("ravi@example.com", "correct horse").await,
        Err(AuthError::UserNotFound)
    ));
    assert!(matches!(
        auth.login("asha@example.com", "battery staple").await,
        Err(AuthError::InvalidCredentials)
    ));
    assert!(matches!(
        auth.login("", "correct horse").await,
        Err(AuthError::MissingDetails)
    ));
}

#[tokio::test]
async fn test_email_is_unique_case_insensitively() {
    let store = store();
    let keys = token_keys();
    let auth = AuthService::new(&store, &keys);

    auth.register("Asha", "asha@example.com", "pw").await.unwrap();
    assert!(matches!(
        auth.register("Imposter", "  ASHA@EXAMPLE.COM", "pw").await,
        Err(AuthError::UserAlreadyExists)
    ));
}

#[tokio::test]
async fn test_token_for_deleted_user_reports_not_found() {
    let store = store();
    let keys = token_keys();

    // A well-signed token for an id that was never stored.
    let token = keys.issue(UserId::new(77)).unwrap();
    let user_id = keys.verify(&token).unwrap();

    assert!(matches!(
        CreditService::new(&store).get_credits(user_id).await,
        Err(CreditError::UserNotFound)
    ));
}
