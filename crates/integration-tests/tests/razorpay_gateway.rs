//! The Razorpay client wired into the payment service, against a mock API.

#![allow(clippy::unwrap_used)]

use secrecy::SecretString;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use imagify_core::CurrencyCode;
use imagify_integration_tests::{TEST_KEY_SECRET, sign, store, token_keys};
use imagify_server::config::RazorpayConfig;
use imagify_server::services::auth::AuthService;
use imagify_server::services::payment::{PaymentError, PaymentService, VerifyOrder};
use imagify_server::services::razorpay::RazorpayClient;

fn client(api_base: &str) -> RazorpayClient {
    RazorpayClient::new(&RazorpayConfig {
        key_id: "rzp_test_key".to_owned(),
        key_secret: SecretString::from(TEST_KEY_SECRET.to_owned()),
        api_base: api_base.to_owned(),
        require_signature: true,
    })
    .unwrap()
}

#[tokio::test]
async fn test_purchase_through_razorpay_client() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orders"))
        .and(body_partial_json(serde_json::json!({
            "amount": 5000,
            "currency": "INR",
            "receipt": "1",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "order_RZP1",
            "entity": "order",
            "amount": 5000,
            "amount_paid": 0,
            "amount_due": 5000,
            "currency": "INR",
            "receipt": "1",
            "status": "created",
            "attempts": 0,
            "notes": [],
            "created_at": 1_700_000_000
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = store();
    let keys = token_keys();
    let user_id = AuthService::new(&store, &keys)
        .register("Asha", "asha@example.com", "pw")
        .await
        .unwrap()
        .user
        .id;

    let razorpay = client(&server.uri());
    let payments =
        PaymentService::new(&store, &store, &razorpay, CurrencyCode::INR).require_signature(true);

    let order = payments.create_order(user_id, Some("Advanced")).await.unwrap();
    assert_eq!(order.id, "order_RZP1");

    let unsigned = VerifyOrder {
        order_id: order.id.clone(),
        receipt: "1".to_owned(),
        ..VerifyOrder::default()
    };
    assert!(matches!(
        payments.verify_order(user_id, &unsigned).await,
        Err(PaymentError::SignatureRequired)
    ));

    let signed = VerifyOrder {
        payment_id: Some("pay_RZP9".to_owned()),
        signature: Some(sign("order_RZP1", "pay_RZP9")),
        ..unsigned
    };
    let settlement = payments.verify_order(user_id, &signed).await.unwrap();
    assert_eq!(settlement.credits, 500);
    assert_eq!(settlement.balance, 505);
}

#[tokio::test]
async fn test_gateway_rejection_surfaces_as_gateway_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orders"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": {"code": "BAD_REQUEST_ERROR", "description": "amount exceeds maximum"}
        })))
        .mount(&server)
        .await;

    let store = store();
    let keys = token_keys();
    let user_id = AuthService::new(&store, &keys)
        .register("Asha", "asha@example.com", "pw")
        .await
        .unwrap()
        .user
        .id;

    let razorpay = client(&server.uri());
    let payments = PaymentService::new(&store, &store, &razorpay, CurrencyCode::INR);

    assert!(matches!(
        payments.create_order(user_id, Some("Business")).await,
        Err(PaymentError::Gateway(_))
    ));
}
