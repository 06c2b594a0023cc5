//! `/api/user` handlers: accounts, credits and Razorpay purchases.
//!
//! Request bodies use optional fields so that absent values reach the
//! services and produce "Missing Details" rather than a decoding error.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::db::{TransactionRepository, UserRepository};
use crate::error::{Result, add_breadcrumb};
use crate::middleware::AuthUser;
use crate::models::{PublicProfile, Transaction};
use crate::routes::ApiJson;
use crate::services::auth::{AuthService, AuthSession};
use crate::services::credits::{CreditService, CreditSummary};
use crate::services::payment::{GatewayOrder, PaymentService, VerifyOrder};
use crate::services::razorpay::RazorpayClient;
use crate::state::AppState;

// =============================================================================
// Request / response bodies
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayRequest {
    #[serde(default)]
    pub plan_id: Option<String>,
}

/// Fields posted back from the Razorpay checkout handler.
#[derive(Debug, Default, Deserialize)]
pub struct VerifyRequest {
    #[serde(default)]
    pub razorpay_order_id: Option<String>,
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub razorpay_payment_id: Option<String>,
    #[serde(default)]
    pub razorpay_signature: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub user: PublicProfile,
}

impl From<AuthSession> for AuthResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            success: true,
            user: session.user.profile(),
            token: session.token,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreditsResponse {
    pub success: bool,
    pub credits: i64,
    pub user: PublicProfile,
}

impl From<CreditSummary> for CreditsResponse {
    fn from(summary: CreditSummary) -> Self {
        Self {
            success: true,
            credits: summary.credits,
            user: summary.user,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub success: bool,
    pub order: GatewayOrder,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: &'static str,
}

impl MessageResponse {
    const fn credits_added() -> Self {
        Self {
            success: true,
            message: "Credits Added",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TransactionsResponse {
    pub success: bool,
    pub transactions: Vec<Transaction>,
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /api/user/register`
pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<Json<AuthResponse>> {
    let users = UserRepository::new(state.pool());
    let session = AuthService::new(&users, state.tokens())
        .register(
            body.name.as_deref().unwrap_or_default(),
            body.email.as_deref().unwrap_or_default(),
            body.password.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok(Json(session.into()))
}

/// `POST /api/user/login`
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let users = UserRepository::new(state.pool());
    let session = AuthService::new(&users, state.tokens())
        .login(
            body.email.as_deref().unwrap_or_default(),
            body.password.as_deref().unwrap_or_default(),
        )
        .await?;

    tracing::info!(user_id = %session.user.id, "user logged in");

    Ok(Json(session.into()))
}

/// `GET /api/user/credits`
pub async fn credits(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<CreditsResponse>> {
    let users = UserRepository::new(state.pool());
    let summary = CreditService::new(&users).get_credits(user_id).await?;

    Ok(Json(summary.into()))
}

/// `POST /api/user/pay-razor`
pub async fn pay_razor(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(body): ApiJson<PayRequest>,
) -> Result<Json<OrderResponse>> {
    let users = UserRepository::new(state.pool());
    let transactions = TransactionRepository::new(state.pool());
    let order = payments(&state, &users, &transactions)
        .create_order(user_id, body.plan_id.as_deref())
        .await?;

    add_breadcrumb("payment", "Order created", Some(&[("order_id", order.id.as_str())]));

    Ok(Json(OrderResponse {
        success: true,
        order,
    }))
}

/// `POST /api/user/verify-razor`
pub async fn verify_razor(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(body): ApiJson<VerifyRequest>,
) -> Result<Json<MessageResponse>> {
    let request = VerifyOrder {
        order_id: body.razorpay_order_id.unwrap_or_default(),
        receipt: body.receipt.unwrap_or_default(),
        payment_id: body.razorpay_payment_id,
        signature: body.razorpay_signature,
    };

    let users = UserRepository::new(state.pool());
    let transactions = TransactionRepository::new(state.pool());
    payments(&state, &users, &transactions)
        .verify_order(user_id, &request)
        .await?;

    add_breadcrumb(
        "payment",
        "Payment verified",
        Some(&[("order_id", request.order_id.as_str())]),
    );

    Ok(Json(MessageResponse::credits_added()))
}

/// `GET /api/user/transactions`
pub async fn transactions(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<TransactionsResponse>> {
    let users = UserRepository::new(state.pool());
    let transactions = TransactionRepository::new(state.pool());
    let history = payments(&state, &users, &transactions)
        .history(user_id)
        .await?;

    Ok(Json(TransactionsResponse {
        success: true,
        transactions: history,
    }))
}

fn payments<'a>(
    state: &'a AppState,
    users: &'a UserRepository<'a>,
    transactions: &'a TransactionRepository<'a>,
) -> PaymentService<'a, UserRepository<'a>, TransactionRepository<'a>, RazorpayClient> {
    let config = state.config();
    PaymentService::new(users, transactions, state.razorpay(), config.currency)
        .require_signature(config.razorpay.require_signature)
}
