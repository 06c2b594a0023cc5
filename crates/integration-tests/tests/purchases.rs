//! Order creation, verification and settlement tests.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use imagify_core::{CurrencyCode, Plan, UserId};
use imagify_integration_tests::{SigningGateway, sign, store, token_keys};
use imagify_server::db::{MemoryStore, UserStore};
use imagify_server::services::auth::AuthService;
use imagify_server::services::credits::CreditService;
use imagify_server::services::payment::{PaymentError, PaymentService, VerifyOrder};

async fn register(store: &MemoryStore, email: &str) -> UserId {
    let keys = token_keys();
    AuthService::new(store, &keys)
        .register("Buyer", email, "pw")
        .await
        .unwrap()
        .user
        .id
}

async fn balance(store: &MemoryStore, user_id: UserId) -> i64 {
    CreditService::new(store)
        .get_credits(user_id)
        .await
        .unwrap()
        .credits
}

#[tokio::test]
async fn test_each_plan_credits_its_bundle() {
    for plan in Plan::ALL {
        let store = store();
        let gateway = SigningGateway::default();
        let user_id = register(&store, "buyer@example.com").await;
        let payments = PaymentService::new(&store, &store, &gateway, CurrencyCode::INR);

        let order = payments
            .create_order(user_id, Some(plan.as_str()))
            .await
            .unwrap();
        assert_eq!(order.amount, plan.amount() * 100);

        let settlement = payments
            .verify_order(
                user_id,
                &VerifyOrder {
                    payment_id: Some("pay_1".to_owned()),
                    signature: Some(sign(&order.id, "pay_1")),
                    order_id: order.id,
                    receipt: order.receipt.unwrap(),
                },
            )
            .await
            .unwrap();

        assert_eq!(settlement.credits, plan.credits());
        assert_eq!(balance(&store, user_id).await, 5 + plan.credits());
    }
}

#[tokio::test]
async fn test_unknown_plan_creates_nothing() {
    let store = store();
    let gateway = SigningGateway::default();
    let user_id = register(&store, "buyer@example.com").await;
    let payments = PaymentService::new(&store, &store, &gateway, CurrencyCode::INR);

    assert!(matches!(
        payments.create_order(user_id, Some("Platinum")).await,
        Err(PaymentError::InvalidPlan(_))
    ));
    assert_eq!(gateway.issued(), 0);
    assert_eq!(store.transaction_count().await, 0);
}

#[tokio::test]
async fn test_second_verification_is_rejected() {
    let store = store();
    let gateway = SigningGateway::default();
    let user_id = register(&store, "buyer@example.com").await;
    let payments = PaymentService::new(&store, &store, &gateway, CurrencyCode::USD);

    let order = payments.create_order(user_id, Some("Basic")).await.unwrap();
    assert_eq!(order.currency, "USD");
    let request = VerifyOrder {
        order_id: order.id.clone(),
        receipt: order.receipt.clone().unwrap(),
        ..VerifyOrder::default()
    };

    payments.verify_order(user_id, &request).await.unwrap();
    assert!(matches!(
        payments.verify_order(user_id, &request).await,
        Err(PaymentError::AlreadyPaid)
    ));
    assert_eq!(balance(&store, user_id).await, 105);

    let history = payments.history(user_id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert!(history[0].payment);
    assert!(history[0].paid_at.is_some());
}

#[tokio::test]
async fn test_forged_signature_leaves_transaction_unpaid() {
    let store = store();
    let gateway = SigningGateway::default();
    let user_id = register(&store, "buyer@example.com").await;
    let payments = PaymentService::new(&store, &store, &gateway, CurrencyCode::INR);

    let order = payments.create_order(user_id, Some("Business")).await.unwrap();
    let forged = VerifyOrder {
        order_id: order.id.clone(),
        receipt: order.receipt.clone().unwrap(),
        payment_id: Some("pay_1".to_owned()),
        signature: Some(sign(&order.id, "pay_2")),
    };

    assert!(matches!(
        payments.verify_order(user_id, &forged).await,
        Err(PaymentError::InvalidSignature)
    ));
    assert_eq!(balance(&store, user_id).await, 5);
    assert!(!payments.history(user_id).await.unwrap()[0].payment);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_verifications_credit_exactly_once() {
    let store = store();
    let gateway = Arc::new(SigningGateway::default());
    let user_id = register(&store, "buyer@example.com").await;

    let order = PaymentService::new(&store, &store, gateway.as_ref(), CurrencyCode::INR)
        .create_order(user_id, Some("Advanced"))
        .await
        .unwrap();

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let store = store.clone();
            let gateway = Arc::clone(&gateway);
            let request = VerifyOrder {
                order_id: order.id.clone(),
                receipt: order.receipt.clone().unwrap(),
                ..VerifyOrder::default()
            };
            tokio::spawn(async move {
                PaymentService::new(&store, &store, gateway.as_ref(), CurrencyCode::INR)
                    .verify_order(user_id, &request)
                    .await
            })
        })
        .collect();

    let mut settled = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => settled += 1,
            Err(PaymentError::AlreadyPaid) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(settled, 1);
    let user = store.get_user(user_id).await.unwrap().unwrap();
    assert_eq!(user.credit_balance, 505);
}

#[tokio::test]
async fn test_cannot_settle_someone_elses_order() {
    let store = store();
    let gateway = SigningGateway::default();
    let buyer = register(&store, "buyer@example.com").await;
    let other = register(&store, "other@example.com").await;
    let payments = PaymentService::new(&store, &store, &gateway, CurrencyCode::INR);

    let order = payments.create_order(buyer, Some("Basic")).await.unwrap();
    let request = VerifyOrder {
        order_id: order.id.clone(),
        receipt: order.receipt.clone().unwrap(),
        ..VerifyOrder::default()
    };

    assert!(matches!(
        payments.verify_order(other, &request).await,
        Err(PaymentError::TransactionNotFound)
    ));
    assert_eq!(balance(&store, other).await, 5);
    assert_eq!(balance(&store, buyer).await, 5);
}
