//! Payment error types.

use thiserror::Error;

use crate::db::RepositoryError;

use super::GatewayError;

/// Errors that can occur while creating or verifying orders.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// A required field was missing or blank.
    #[error("missing details")]
    MissingDetails,

    /// The ordering user does not exist.
    #[error("user not found")]
    UserNotFound,

    /// Plan id is not one of the known plans.
    #[error("invalid plan: {0}")]
    InvalidPlan(#[from] imagify_core::PlanError),

    /// No transaction matches the receipt (or it belongs to someone else).
    #[error("transaction not found")]
    TransactionNotFound,

    /// The transaction was already settled.
    #[error("payment already completed")]
    AlreadyPaid,

    /// The order id does not belong to the receipt's transaction.
    #[error("order does not match transaction")]
    OrderMismatch,

    /// Checkout signature is required but was not supplied.
    #[error("payment signature required")]
    SignatureRequired,

    /// Checkout signature did not verify.
    #[error("invalid payment signature")]
    InvalidSignature,

    /// Plan price cannot be expressed in minor units.
    #[error("amount out of range")]
    AmountOutOfRange,

    /// Gateway call failed.
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
