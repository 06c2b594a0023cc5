//! Payment gateway seam.
//!
//! [`PaymentService`](super::PaymentService) talks to the gateway only
//! through [`PaymentGateway`], so tests can substitute a fake.

use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use imagify_core::CurrencyCode;

/// Errors returned by a payment gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Gateway returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// A request to open a new order with the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    /// Amount in the currency's minor unit.
    pub amount: i64,
    pub currency: CurrencyCode,
    /// Our transaction id, echoed back by the gateway.
    pub receipt: String,
}

/// An order as reported by the gateway. Sent to the browser checkout as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    #[serde(default = "default_entity")]
    pub entity: String,
    pub amount: i64,
    #[serde(default)]
    pub amount_paid: i64,
    #[serde(default)]
    pub amount_due: i64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub attempts: i64,
    #[serde(default)]
    pub notes: serde_json::Value,
    #[serde(default)]
    pub created_at: i64,
}

fn default_entity() -> String {
    "order".to_owned()
}

/// An external payment gateway.
pub trait PaymentGateway: Send + Sync {
    /// Open an order for the given amount.
    fn create_order(
        &self,
        request: &OrderRequest,
    ) -> impl Future<Output = Result<GatewayOrder, GatewayError>> + Send;

    /// Check a checkout callback signature for an order/payment pair.
    fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool;
}
