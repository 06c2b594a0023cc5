//! Purchase transaction domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use imagify_core::{Plan, TransactionId, UserId};

/// One purchase attempt (domain type).
///
/// Created unpaid when an order is requested. `payment` flips to `true`
/// exactly once, together with the credit grant, and never flips back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    pub user_id: UserId,
    pub plan: Plan,
    /// Price in whole currency units.
    pub amount: i64,
    pub credits: i64,
    /// Gateway order id, recorded once the order has been created.
    pub order_id: Option<String>,
    pub payment: bool,
    #[serde(rename = "date")]
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

/// Fields required to insert a new transaction.
#[derive(Debug, Clone, Copy)]
pub struct NewTransaction {
    pub user_id: UserId,
    pub plan: Plan,
    pub amount: i64,
    pub credits: i64,
}

impl NewTransaction {
    /// Build an unpaid transaction priced from the plan table.
    #[must_use]
    pub const fn for_plan(user_id: UserId, plan: Plan) -> Self {
        Self {
            user_id,
            plan,
            amount: plan.amount(),
            credits: plan.credits(),
        }
    }
}
