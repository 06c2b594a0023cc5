//! In-process store implementing both [`UserStore`] and [`TransactionStore`].
//!
//! Used by service and integration tests. All state sits behind a single
//! async mutex, so every operation (including [`TransactionStore::settle`])
//! is atomic with respect to the others.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use imagify_core::{Email, TransactionId, UserId};

use super::{RepositoryError, SettleOutcome, TransactionStore, UserStore};
use crate::models::{NewTransaction, NewUser, Transaction, User};

#[derive(Default)]
struct Inner {
    users: BTreeMap<UserId, (User, String)>,
    transactions: BTreeMap<TransactionId, Transaction>,
    next_user_id: i32,
    next_transaction_id: i32,
}

/// Shared in-memory store. Clones see the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of transactions currently stored.
    pub async fn transaction_count(&self) -> usize {
        self.inner.lock().await.transactions.len()
    }
}

impl UserStore for MemoryStore {
    async fn create_user(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let mut inner = self.inner.lock().await;

        if inner.users.values().any(|(u, _)| u.email == user.email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        inner.next_user_id += 1;
        let created = User {
            id: UserId::new(inner.next_user_id),
            name: user.name.clone(),
            email: user.email.clone(),
            credit_balance: user.credit_balance,
            created_at: Utc::now(),
        };
        inner
            .users
            .insert(created.id, (created.clone(), user.password_hash.clone()));

        Ok(created)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let inner = self.inner.lock().await;
        Ok(inner.users.get(&id).map(|(u, _)| u.clone()))
    }

    async fn find_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .users
            .values()
            .find(|(u, _)| &u.email == email)
            .cloned())
    }
}

impl TransactionStore for MemoryStore {
    async fn create_transaction(
        &self,
        transaction: &NewTransaction,
    ) -> Result<Transaction, RepositoryError> {
        let mut inner = self.inner.lock().await;

        if !inner.users.contains_key(&transaction.user_id) {
            return Err(RepositoryError::Conflict(
                "transaction references a missing user".to_owned(),
            ));
        }

        inner.next_transaction_id += 1;
        let created = Transaction {
            id: TransactionId::new(inner.next_transaction_id),
            user_id: transaction.user_id,
            plan: transaction.plan,
            amount: transaction.amount,
            credits: transaction.credits,
            order_id: None,
            payment: false,
            created_at: Utc::now(),
            paid_at: None,
        };
        inner.transactions.insert(created.id, created.clone());

        Ok(created)
    }

    async fn attach_order(&self, id: TransactionId, order_id: &str) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().await;

        let taken = inner
            .transactions
            .values()
            .any(|t| t.id != id && t.order_id.as_deref() == Some(order_id));
        if taken {
            return Err(RepositoryError::Conflict("order id already exists".to_owned()));
        }

        let transaction = inner
            .transactions
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        transaction.order_id = Some(order_id.to_owned());

        Ok(())
    }

    async fn get_transaction(
        &self,
        id: TransactionId,
    ) -> Result<Option<Transaction>, RepositoryError> {
        let inner = self.inner.lock().await;
        Ok(inner.transactions.get(&id).cloned())
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Transaction>, RepositoryError> {
        let inner = self.inner.lock().await;
        let mut list: Vec<Transaction> = inner
            .transactions
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(list)
    }

    async fn settle(&self, id: TransactionId) -> Result<SettleOutcome, RepositoryError> {
        let mut inner = self.inner.lock().await;
        let inner = &mut *inner;

        let Some(transaction) = inner.transactions.get_mut(&id) else {
            return Ok(SettleOutcome::NotFound);
        };
        if transaction.payment {
            return Ok(SettleOutcome::AlreadyPaid);
        }

        let (user, _) = inner
            .users
            .get_mut(&transaction.user_id)
            .ok_or(RepositoryError::NotFound)?;

        transaction.payment = true;
        transaction.paid_at = Some(Utc::now());
        user.credit_balance += transaction.credits;

        Ok(SettleOutcome::Settled {
            user_id: user.id,
            credits: transaction.credits,
            balance: user.credit_balance,
        })
    }
}
