//! Authentication service.
//!
//! Password registration and login. Both return a signed session token
//! alongside the user.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use imagify_core::Email;

use crate::db::{RepositoryError, UserStore};
use crate::models::{NewUser, User};
use crate::services::token::TokenKeys;

/// Credit balance granted to every new account.
pub const DEFAULT_CREDIT_BALANCE: i64 = 5;

/// A logged-in user and their token.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

/// Authentication service.
pub struct AuthService<'a, U> {
    users: &'a U,
    tokens: &'a TokenKeys,
}

impl<'a, U: UserStore> AuthService<'a, U> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(users: &'a U, tokens: &'a TokenKeys) -> Self {
        Self { users, tokens }
    }

    /// Register a new user with name, email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingDetails` if any field is blank.
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        let name = name.trim();
        if name.is_empty() || email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::MissingDetails);
        }

        let email = Email::parse(email)?;
        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create_user(&NewUser {
                name: name.to_owned(),
                email,
                password_hash,
                credit_balance: DEFAULT_CREDIT_BALANCE,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, "user registered");

        let token = self.tokens.issue(user.id)?;
        Ok(AuthSession { token, user })
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingDetails` if either field is blank.
    /// Returns `AuthError::UserNotFound` if no account uses the email.
    /// Returns `AuthError::InvalidCredentials` if the password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::MissingDetails);
        }

        // A malformed address cannot belong to any account.
        let email = Email::parse(email).map_err(|_| AuthError::UserNotFound)?;

        let (user, password_hash) = self
            .users
            .find_with_password_hash(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        verify_password(password, &password_hash)?;

        let token = self.tokens.issue(user.id)?;
        Ok(AuthSession { token, user })
    }
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;
    use crate::db::MemoryStore;
    use secrecy::SecretString;

    fn token_keys() -> TokenKeys {
        TokenKeys::new(&JwtConfig {
            secret: SecretString::from("k3y-for-tests-0123456789-abcdefghijklmnop".to_owned()),
            expiry_hours: 1,
        })
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("hunter22").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("hunter22", &hash).is_ok());
        assert!(matches!(
            verify_password("hunter23", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(matches!(
            verify_password("pw", "plaintext"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_register_grants_default_balance() {
        let store = MemoryStore::new();
        let keys = token_keys();
        let auth = AuthService::new(&store, &keys);

        let session = auth
            .register("Asha", " Asha@Example.com ", "hunter22")
            .await
            .unwrap();

        assert_eq!(session.user.credit_balance, DEFAULT_CREDIT_BALANCE);
        assert_eq!(session.user.email.as_str(), "asha@example.com");
        assert_eq!(keys.verify(&session.token).unwrap(), session.user.id);
    }

    #[tokio::test]
    async fn test_register_missing_details_creates_nothing() {
        let store = MemoryStore::new();
        let keys = token_keys();
        let auth = AuthService::new(&store, &keys);

        for (name, email, password) in [
            ("", "a@example.com", "pw"),
            ("Asha", "  ", "pw"),
            ("Asha", "a@example.com", ""),
        ] {
            assert!(matches!(
                auth.register(name, email, password).await,
                Err(AuthError::MissingDetails)
            ));
        }

        let email = Email::parse("a@example.com").unwrap();
        assert!(store.find_with_password_hash(&email).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let store = MemoryStore::new();
        let keys = token_keys();
        let auth = AuthService::new(&store, &keys);

        auth.register("Asha", "asha@example.com", "pw").await.unwrap();
        let dup = auth.register("Asha 2", "ASHA@example.com", "pw").await;
        assert!(matches!(dup, Err(AuthError::UserAlreadyExists)));
    }

    #[tokio::test]
    async fn test_login_outcomes() {
        let store = MemoryStore::new();
        let keys = token_keys();
        let auth = AuthService::new(&store, &keys);
        let registered = auth
            .register("Asha", "asha@example.com", "hunter22")
            .await
            .unwrap();

        assert!(matches!(
            auth.login("nobody@example.com", "hunter22").await,
            Err(AuthError::UserNotFound)
        ));
        assert!(matches!(
            auth.login("asha@example.com", "wrong").await,
            Err(AuthError::InvalidCredentials)
        ));

        let session = auth.login("ASHA@example.com ", "hunter22").await.unwrap();
        assert_eq!(session.user.id, registered.user.id);
        assert_eq!(keys.verify(&session.token).unwrap(), registered.user.id);
    }
}
