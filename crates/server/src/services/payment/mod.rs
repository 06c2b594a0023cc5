//! Credit purchases.
//!
//! A purchase is a two-step flow:
//!
//! 1. [`PaymentService::create_order`] records an unpaid transaction for a
//!    plan and opens a gateway order whose receipt is the transaction id.
//! 2. [`PaymentService::verify_order`] is called after checkout. It settles
//!    the transaction, flipping it to paid and crediting the owner in one
//!    atomic store operation.
//!
//! A transaction is credited at most once no matter how many times (or how
//! concurrently) verification is attempted.

mod error;
mod gateway;

pub use error::PaymentError;
pub use gateway::{GatewayError, GatewayOrder, OrderRequest, PaymentGateway};

use imagify_core::{CurrencyCode, Plan, TransactionId, UserId};

use crate::db::{SettleOutcome, TransactionStore, UserStore};
use crate::models::{NewTransaction, Transaction};

/// Checkout callback fields submitted for verification.
#[derive(Debug, Clone, Default)]
pub struct VerifyOrder {
    pub order_id: String,
    /// Transaction id, as sent to the gateway.
    pub receipt: String,
    pub payment_id: Option<String>,
    pub signature: Option<String>,
}

/// Result of a successful verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub transaction_id: TransactionId,
    pub credits: i64,
    pub balance: i64,
}

/// Payment service.
pub struct PaymentService<'a, U, T, G> {
    users: &'a U,
    transactions: &'a T,
    gateway: &'a G,
    currency: CurrencyCode,
    require_signature: bool,
}

impl<'a, U, T, G> PaymentService<'a, U, T, G>
where
    U: UserStore,
    T: TransactionStore,
    G: PaymentGateway,
{
    /// Create a new payment service charging in `currency`.
    #[must_use]
    pub const fn new(
        users: &'a U,
        transactions: &'a T,
        gateway: &'a G,
        currency: CurrencyCode,
    ) -> Self {
        Self {
            users,
            transactions,
            gateway,
            currency,
            require_signature: false,
        }
    }

    /// Reject verifications that carry no checkout signature.
    #[must_use]
    pub const fn require_signature(mut self, required: bool) -> Self {
        self.require_signature = required;
        self
    }

    /// Open a gateway order for a plan purchase.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::MissingDetails` if no plan id was given.
    /// Returns `PaymentError::UserNotFound` if the user does not exist.
    /// Returns `PaymentError::InvalidPlan` for an unknown plan id.
    /// Returns `PaymentError::Gateway` if the gateway call fails.
    pub async fn create_order(
        &self,
        user_id: UserId,
        plan_id: Option<&str>,
    ) -> Result<GatewayOrder, PaymentError> {
        let plan_id = plan_id
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or(PaymentError::MissingDetails)?;

        self.users
            .get_user(user_id)
            .await?
            .ok_or(PaymentError::UserNotFound)?;

        let plan: Plan = plan_id.parse()?;
        let amount = self
            .currency
            .to_minor_units(plan.amount())
            .ok_or(PaymentError::AmountOutOfRange)?;

        let transaction = self
            .transactions
            .create_transaction(&NewTransaction::for_plan(user_id, plan))
            .await?;

        let order = self
            .gateway
            .create_order(&OrderRequest {
                amount,
                currency: self.currency,
                receipt: transaction.id.to_string(),
            })
            .await
            .inspect_err(|e| {
                tracing::warn!(transaction_id = %transaction.id, error = %e, "gateway order failed");
            })?;

        self.transactions
            .attach_order(transaction.id, &order.id)
            .await?;

        tracing::info!(
            user_id = %user_id,
            transaction_id = %transaction.id,
            order_id = %order.id,
            plan = %plan,
            "order created"
        );

        Ok(order)
    }

    /// Verify a completed checkout and credit the purchaser.
    ///
    /// `caller` must own the transaction named by the receipt.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::MissingDetails` if the order id or receipt is blank.
    /// Returns `PaymentError::TransactionNotFound` if the receipt names no
    /// transaction owned by `caller`.
    /// Returns `PaymentError::AlreadyPaid` if the transaction was settled before.
    /// Returns `PaymentError::OrderMismatch` if the order id is not the one
    /// recorded for the transaction, or no order was recorded.
    /// Returns `PaymentError::SignatureRequired` / `InvalidSignature` when the
    /// checkout signature is absent (and required) or wrong.
    pub async fn verify_order(
        &self,
        caller: UserId,
        request: &VerifyOrder,
    ) -> Result<Settlement, PaymentError> {
        let order_id = request.order_id.trim();
        let receipt = request.receipt.trim();
        if order_id.is_empty() || receipt.is_empty() {
            return Err(PaymentError::MissingDetails);
        }

        let id: TransactionId = receipt
            .parse()
            .map_err(|_| PaymentError::TransactionNotFound)?;

        let transaction = self
            .transactions
            .get_transaction(id)
            .await?
            .filter(|t| t.user_id == caller)
            .ok_or(PaymentError::TransactionNotFound)?;

        if transaction.payment {
            return Err(PaymentError::AlreadyPaid);
        }

        // No recorded order means no gateway order was opened for this receipt.
        if transaction.order_id.as_deref() != Some(order_id) {
            return Err(PaymentError::OrderMismatch);
        }

        self.check_signature(order_id, request)?;

        match self.transactions.settle(id).await? {
            SettleOutcome::Settled {
                user_id,
                credits,
                balance,
            } => {
                tracing::info!(
                    user_id = %user_id,
                    transaction_id = %id,
                    credits,
                    balance,
                    "credits added"
                );
                Ok(Settlement {
                    transaction_id: id,
                    credits,
                    balance,
                })
            }
            SettleOutcome::AlreadyPaid => Err(PaymentError::AlreadyPaid),
            SettleOutcome::NotFound => Err(PaymentError::TransactionNotFound),
        }
    }

    fn check_signature(&self, order_id: &str, request: &VerifyOrder) -> Result<(), PaymentError> {
        let signature = request.signature.as_deref().filter(|s| !s.is_empty());
        let payment_id = request.payment_id.as_deref().filter(|s| !s.is_empty());

        match (signature, payment_id) {
            (Some(signature), Some(payment_id)) => {
                if self.gateway.verify_signature(order_id, payment_id, signature) {
                    Ok(())
                } else {
                    Err(PaymentError::InvalidSignature)
                }
            }
            (Some(_), None) => Err(PaymentError::SignatureRequired),
            (None, _) if self.require_signature => Err(PaymentError::SignatureRequired),
            (None, _) => Ok(()),
        }
    }

    /// A user's purchase history, newest first.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::Repository` if the store fails.
    pub async fn history(&self, user_id: UserId) -> Result<Vec<Transaction>, PaymentError> {
        Ok(self.transactions.list_for_user(user_id).await?)
    }
}
