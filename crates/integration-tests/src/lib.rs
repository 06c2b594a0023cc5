//! Integration tests for Imagify.
//!
//! The tests drive the public service API end to end against the in-memory
//! store, so they need no database:
//!
//! ```bash
//! cargo test -p imagify-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `accounts` - Registration, login and tokens
//! - `purchases` - Order creation, verification and settlement
//! - `razorpay_gateway` - The Razorpay client against a mock API

use std::sync::atomic::{AtomicUsize, Ordering};

use secrecy::SecretString;

use imagify_server::config::JwtConfig;
use imagify_server::db::MemoryStore;
use imagify_server::services::payment::{
    GatewayError, GatewayOrder, OrderRequest, PaymentGateway,
};
use imagify_server::services::razorpay::payment_signature;
use imagify_server::services::token::TokenKeys;

/// Key secret shared by [`SigningGateway`] and [`sign`].
pub const TEST_KEY_SECRET: &str = "rzp-test-key-0123456789";

/// Token keys with a fixed test secret.
#[must_use]
pub fn token_keys() -> TokenKeys {
    TokenKeys::new(&JwtConfig {
        secret: SecretString::from("k3y-for-tests-0123456789-abcdefghijklmnop".to_owned()),
        expiry_hours: 1,
    })
}

/// Checkout signature a real payment would carry.
#[must_use]
pub fn sign(order_id: &str, payment_id: &str) -> String {
    payment_signature(
        &SecretString::from(TEST_KEY_SECRET.to_owned()),
        order_id,
        payment_id,
    )
    .unwrap_or_default()
}

/// In-process gateway that issues sequential orders and checks signatures
/// the way Razorpay does.
#[derive(Debug, Default)]
pub struct SigningGateway {
    issued: AtomicUsize,
}

impl SigningGateway {
    /// Orders issued so far.
    #[must_use]
    pub fn issued(&self) -> usize {
        self.issued.load(Ordering::SeqCst)
    }
}

impl PaymentGateway for SigningGateway {
    async fn create_order(&self, request: &OrderRequest) -> Result<GatewayOrder, GatewayError> {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(GatewayOrder {
            id: format!("order_test{n}"),
            entity: "order".to_owned(),
            amount: request.amount,
            amount_paid: 0,
            amount_due: request.amount,
            currency: request.currency.code().to_owned(),
            receipt: Some(request.receipt.clone()),
            status: "created".to_owned(),
            attempts: 0,
            notes: serde_json::Value::Null,
            created_at: 0,
        })
    }

    fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        sign(order_id, payment_id) == signature
    }
}

/// An empty in-memory store.
#[must_use]
pub fn store() -> MemoryStore {
    MemoryStore::new()
}
