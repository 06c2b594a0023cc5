//! Credit balance lookup.

use thiserror::Error;

use imagify_core::UserId;

use crate::db::{RepositoryError, UserStore};
use crate::models::PublicProfile;

/// Errors from credit lookups.
#[derive(Debug, Error)]
pub enum CreditError {
    /// The authenticated user no longer exists.
    #[error("user not found")]
    UserNotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// A user's current balance and public profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreditSummary {
    pub credits: i64,
    pub user: PublicProfile,
}

/// Read-only view of user balances.
pub struct CreditService<'a, U> {
    users: &'a U,
}

impl<'a, U: UserStore> CreditService<'a, U> {
    #[must_use]
    pub const fn new(users: &'a U) -> Self {
        Self { users }
    }

    /// Current credit balance for a user.
    ///
    /// # Errors
    ///
    /// Returns `CreditError::UserNotFound` if the user does not exist.
    pub async fn get_credits(&self, user_id: UserId) -> Result<CreditSummary, CreditError> {
        let user = self
            .users
            .get_user(user_id)
            .await?
            .ok_or(CreditError::UserNotFound)?;

        Ok(CreditSummary {
            credits: user.credit_balance,
            user: user.profile(),
        })
    }
}
