//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use imagify_core::{Email, UserId};

/// An Imagify account (domain type).
///
/// The password hash is deliberately absent: it only ever leaves the store
/// paired with a user for verification, never as part of this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Normalized email address.
    pub email: Email,
    /// Current credit balance. Never negative.
    pub credit_balance: i64,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Public profile returned to clients.
    #[must_use]
    pub fn profile(&self) -> PublicProfile {
        PublicProfile {
            name: self.name.clone(),
        }
    }
}

/// Fields required to insert a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: Email,
    pub password_hash: String,
    pub credit_balance: i64,
}

/// The subset of a user that is safe to send to the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicProfile {
    pub name: String,
}
