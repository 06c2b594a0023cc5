//! Transaction repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use imagify_core::{Plan, TransactionId, UserId};

use super::{RepositoryError, SettleOutcome, TransactionStore, conflict_on_unique};
use crate::models::{NewTransaction, Transaction};

#[derive(sqlx::FromRow)]
struct TransactionRow {
    id: i32,
    user_id: i32,
    plan: String,
    amount: i64,
    credits: i64,
    order_id: Option<String>,
    payment: bool,
    created_at: DateTime<Utc>,
    paid_at: Option<DateTime<Utc>>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = RepositoryError;

    fn try_from(r: TransactionRow) -> Result<Self, Self::Error> {
        let plan: Plan = r.plan.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid plan in database: {e}"))
        })?;

        Ok(Self {
            id: TransactionId::new(r.id),
            user_id: UserId::new(r.user_id),
            plan,
            amount: r.amount,
            credits: r.credits,
            order_id: r.order_id,
            payment: r.payment,
            created_at: r.created_at,
            paid_at: r.paid_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PaidRow {
    user_id: i32,
    credits: i64,
}

/// Repository for transaction database operations.
#[derive(Clone, Copy)]
pub struct TransactionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TransactionRepository<'a> {
    /// Create a new transaction repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

impl TransactionStore for TransactionRepository<'_> {
    async fn create_transaction(
        &self,
        transaction: &NewTransaction,
    ) -> Result<Transaction, RepositoryError> {
        let row = sqlx::query_as::<_, TransactionRow>(
            r"
            INSERT INTO imagify.transaction (user_id, plan, amount, credits)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, plan, amount, credits, order_id, payment, created_at, paid_at
            ",
        )
        .bind(transaction.user_id)
        .bind(transaction.plan.as_str())
        .bind(transaction.amount)
        .bind(transaction.credits)
        .fetch_one(self.pool)
        .await?;

        Transaction::try_from(row)
    }

    async fn attach_order(&self, id: TransactionId, order_id: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE imagify.transaction
            SET order_id = $2
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(order_id)
        .execute(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "order id"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn get_transaction(
        &self,
        id: TransactionId,
    ) -> Result<Option<Transaction>, RepositoryError> {
        let row = sqlx::query_as::<_, TransactionRow>(
            r"
            SELECT id, user_id, plan, amount, credits, order_id, payment, created_at, paid_at
            FROM imagify.transaction
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Transaction::try_from).transpose()
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Transaction>, RepositoryError> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            r"
            SELECT id, user_id, plan, amount, credits, order_id, payment, created_at, paid_at
            FROM imagify.transaction
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Transaction::try_from).collect()
    }

    async fn settle(&self, id: TransactionId) -> Result<SettleOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Only one caller can win the unpaid -> paid flip; losers get no row.
        let paid = sqlx::query_as::<_, PaidRow>(
            r"
            UPDATE imagify.transaction
            SET payment = TRUE, paid_at = now()
            WHERE id = $1 AND payment = FALSE
            RETURNING user_id, credits
            ",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(paid) = paid else {
            let exists: Option<(i32,)> =
                sqlx::query_as("SELECT id FROM imagify.transaction WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&mut *tx)
                    .await?;
            tx.rollback().await?;

            return Ok(if exists.is_some() {
                SettleOutcome::AlreadyPaid
            } else {
                SettleOutcome::NotFound
            });
        };

        let balance: Option<(i64,)> = sqlx::query_as(
            r"
            UPDATE imagify.user
            SET credit_balance = credit_balance + $2
            WHERE id = $1
            RETURNING credit_balance
            ",
        )
        .bind(paid.user_id)
        .bind(paid.credits)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((balance,)) = balance else {
            tx.rollback().await?;
            return Err(RepositoryError::NotFound);
        };

        tx.commit().await?;

        Ok(SettleOutcome::Settled {
            user_id: UserId::new(paid.user_id),
            credits: paid.credits,
            balance,
        })
    }
}
