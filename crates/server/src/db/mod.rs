//! Database operations for the Imagify `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `imagify.user` - Accounts and credit balances
//! - `imagify.transaction` - Credit purchases (unpaid until verified)
//!
//! # Stores
//!
//! Services are written against the [`UserStore`] and [`TransactionStore`]
//! traits. The `PostgreSQL` repositories in [`users`] and [`transactions`]
//! are the production implementations; [`memory::MemoryStore`] backs tests.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p imagify-cli -- migrate
//! ```

pub mod memory;
pub mod transactions;
pub mod users;

use std::future::Future;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use imagify_core::{Email, TransactionId, UserId};

use crate::models::{NewTransaction, NewUser, Transaction, User};

pub use memory::MemoryStore;
pub use transactions::TransactionRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Result of attempting to settle a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleOutcome {
    /// The transaction was unpaid and is now paid; the owner was credited.
    Settled {
        user_id: UserId,
        credits: i64,
        balance: i64,
    },
    /// The transaction had already been paid. Nothing changed.
    AlreadyPaid,
    /// No transaction with that id exists.
    NotFound,
}

/// Persistence for user accounts.
pub trait UserStore: Send + Sync {
    /// Insert a new user.
    ///
    /// Fails with `RepositoryError::Conflict` if the email is taken.
    fn create_user(
        &self,
        user: &NewUser,
    ) -> impl Future<Output = Result<User, RepositoryError>> + Send;

    /// Get a user by id.
    fn get_user(
        &self,
        id: UserId,
    ) -> impl Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// Get a user and their password hash by (normalized) email.
    fn find_with_password_hash(
        &self,
        email: &Email,
    ) -> impl Future<Output = Result<Option<(User, String)>, RepositoryError>> + Send;
}

/// Persistence for purchase transactions.
pub trait TransactionStore: Send + Sync {
    /// Insert a new unpaid transaction.
    fn create_transaction(
        &self,
        transaction: &NewTransaction,
    ) -> impl Future<Output = Result<Transaction, RepositoryError>> + Send;

    /// Record the gateway order id for a transaction.
    ///
    /// Fails with `RepositoryError::NotFound` if the transaction is missing.
    fn attach_order(
        &self,
        id: TransactionId,
        order_id: &str,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Get a transaction by id.
    fn get_transaction(
        &self,
        id: TransactionId,
    ) -> impl Future<Output = Result<Option<Transaction>, RepositoryError>> + Send;

    /// List a user's transactions, newest first.
    fn list_for_user(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<Transaction>, RepositoryError>> + Send;

    /// Mark a transaction paid and credit its owner, as one atomic step.
    ///
    /// Concurrent calls for the same id yield exactly one
    /// [`SettleOutcome::Settled`]; the rest see [`SettleOutcome::AlreadyPaid`].
    fn settle(
        &self,
        id: TransactionId,
    ) -> impl Future<Output = Result<SettleOutcome, RepositoryError>> + Send;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    pool_options().connect(database_url.expose_secret()).await
}

/// Create a pool that connects on first use.
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL cannot be parsed.
pub fn create_lazy_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    pool_options()
        .min_connections(0)
        .connect_lazy(database_url.expose_secret())
}

fn pool_options() -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
}

/// Map a unique-violation into `RepositoryError::Conflict`.
pub(crate) fn conflict_on_unique(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(e)
}
