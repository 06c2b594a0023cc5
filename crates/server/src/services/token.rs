//! Session tokens.
//!
//! Tokens are HS256 JWTs carrying the user id. They are stateless: there is
//! no server-side revocation list, a token stays valid until `exp`.

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    get_current_timestamp,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use imagify_core::UserId;

use crate::config::JwtConfig;

/// Errors from issuing or verifying tokens.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Token could not be signed.
    #[error("failed to sign token: {0}")]
    Sign(#[source] jsonwebtoken::errors::Error),

    /// Token is malformed, expired, or has a bad signature.
    #[error("invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}

/// JWT claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// The authenticated user.
    pub id: UserId,
    /// Issued at (seconds since epoch).
    pub iat: u64,
    /// Expiry (seconds since epoch).
    pub exp: u64,
}

/// Signing and verification keys derived from the JWT secret.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    lifetime_secs: u64,
}

impl std::fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenKeys")
            .field("keys", &"[REDACTED]")
            .field("lifetime_secs", &self.lifetime_secs)
            .finish()
    }
}

impl TokenKeys {
    /// Build keys from configuration.
    #[must_use]
    pub fn new(config: &JwtConfig) -> Self {
        let secret = config.secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            lifetime_secs: config.expiry_hours.unsigned_abs().saturating_mul(3600),
        }
    }

    /// Issue a token for a user.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Sign` if encoding fails.
    pub fn issue(&self, user_id: UserId) -> Result<String, TokenError> {
        let iat = get_current_timestamp();
        self.issue_with_claims(&Claims {
            id: user_id,
            iat,
            exp: iat.saturating_add(self.lifetime_secs),
        })
    }

    fn issue_with_claims(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding).map_err(TokenError::Sign)
    }

    /// Verify a token and return the user id it was issued for.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Invalid` for any malformed, forged or expired token.
    pub fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims.id)
            .map_err(TokenError::Invalid)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn keys(secret: &str) -> TokenKeys {
        TokenKeys::new(&JwtConfig {
            secret: SecretString::from(secret.to_owned()),
            expiry_hours: 168,
        })
    }

    #[test]
    fn test_issue_and_verify() {
        let keys = keys("k3y-for-tests-0123456789-abcdefghijklmnop");
        let token = keys.issue(UserId::new(7)).unwrap();
        assert_eq!(keys.verify(&token).unwrap(), UserId::new(7));
    }

    #[test]
    fn test_rejects_other_secret() {
        let a = keys("k3y-for-tests-0123456789-abcdefghijklmnop");
        let b = keys("another-k3y-9876543210-zyxwvutsrqponmlkjih");
        let token = a.issue(UserId::new(7)).unwrap();
        assert!(matches!(b.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_rejects_expired() {
        let keys = keys("k3y-for-tests-0123456789-abcdefghijklmnop");
        let now = get_current_timestamp();
        let token = keys
            .issue_with_claims(&Claims {
                id: UserId::new(7),
                iat: now - 7200,
                exp: now - 3600,
            })
            .unwrap();
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn test_rejects_garbage() {
        let keys = keys("k3y-for-tests-0123456789-abcdefghijklmnop");
        assert!(keys.verify("not-a-jwt").is_err());
        assert!(keys.verify("").is_err());
    }
}
