mod common;

use common::{FakeGateway, TestApp, sign, test_app, test_app_with};
use http::{HeaderValue, StatusCode};
use serde_json::{Value, json};

/// Order with an issued invoice; returns the order id
async fn invoiced_order(t: &TestApp) -> String {
    let order = t.create_order().await;
    let id = order["id"].as_str().unwrap().to_string();
    let (status, _) = t
        .post("/api/pay/crypto/create-invoice", json!({ "amount": 20, "orderId": id }))
        .await;
    assert_eq!(status, StatusCode::OK);
    id
}

async fn all_orders(t: &TestApp) -> Value {
    t.get("/api/orders").await.1
}

#[tokio::test]
async fn valid_signature_applies_status_and_logs_event() {
    let t = test_app().await;
    let id = invoiced_order(&t).await;

    let (status, body) = t
        .signed_webhook(&json!({
            "order_id": id,
            "payment_status": "CONFIRMING",
            "pay_currency": "usdttrc20",
            "payment_id": "pay-1",
            "price_amount": 20
        }))
        .await;
    assert_eq!((status, body.as_str()), (StatusCode::OK, "ok"));

    let order = t.order(&id).await;
    assert_eq!(order["payment"]["status"], "processing");
    assert_eq!(order["payment"]["gatewayStatus"], "confirming");
    assert_eq!(order["payment"]["raw"]["payment_id"], "pay-1");

    let (status, events) = t.get(&format!("/api/orders/{id}/payment-events")).await;
    assert_eq!(status, StatusCode::OK);
    let events = events.as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["paymentId"], "pay-1");
    assert_eq!(events[0]["status"], "processing");
    assert_eq!(events[0]["payCurrency"], "usdttrc20");
    assert_eq!(events[0]["amount"], 20.0);
}

#[tokio::test]
async fn any_body_bit_flip_is_rejected_without_mutation() {
    let t = test_app().await;
    let id = invoiced_order(&t).await;
    let before = all_orders(&t).await;

    let body = json!({ "order_id": id, "payment_status": "finished" })
        .to_string()
        .into_bytes();
    let sig = HeaderValue::from_str(&sign(&body)).unwrap();

    for i in 0..body.len() {
        for bit in 0..8 {
            let mut tampered = body.clone();
            tampered[i] ^= 1 << bit;
            let (status, text) = t.webhook(&tampered, Some(sig.clone())).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(text, "invalid signature");
        }
    }

    assert_eq!(all_orders(&t).await, before);
    assert_eq!(t.event_count().await, 0);
}

#[tokio::test]
async fn any_signature_bit_flip_is_rejected_without_mutation() {
    let t = test_app().await;
    let id = invoiced_order(&t).await;
    let before = all_orders(&t).await;

    let body = json!({ "order_id": id, "payment_status": "finished" })
        .to_string()
        .into_bytes();
    let sig = sign(&body).into_bytes();

    let mut sent = 0;
    for i in 0..sig.len() {
        for bit in 0..8 {
            let mut tampered = sig.clone();
            tampered[i] ^= 1 << bit;
            // Some flips produce bytes that cannot travel in a header at all
            let Ok(header) = HeaderValue::from_bytes(&tampered) else {
                continue;
            };
            let (status, _) = t.webhook(&body, Some(header)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            sent += 1;
        }
    }
    assert!(sent > sig.len());

    assert_eq!(all_orders(&t).await, before);
    assert_eq!(t.event_count().await, 0);
}

#[tokio::test]
async fn missing_signature_or_secret_is_rejected() {
    let t = test_app().await;
    let id = invoiced_order(&t).await;
    let body = json!({ "order_id": id, "payment_status": "finished" }).to_string();

    let (status, text) = t.webhook(body.as_bytes(), None).await;
    assert_eq!((status, text.as_str()), (StatusCode::BAD_REQUEST, "invalid signature"));

    let unsecured = test_app_with(FakeGateway::issuing("inv_1", "https://pay/inv_1"), None).await;
    let sig = HeaderValue::from_str(&sign(body.as_bytes())).unwrap();
    let (status, _) = unsecured.webhook(body.as_bytes(), Some(sig)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(t.order(&id).await["payment"]["status"], "processing");
}

#[tokio::test]
async fn unmatched_reference_is_acknowledged_with_zero_writes() {
    let t = test_app().await;
    invoiced_order(&t).await;
    let before = all_orders(&t).await;

    let (status, text) = t
        .signed_webhook(&json!({ "order_id": "inv_unknown", "payment_status": "finished" }))
        .await;
    assert_eq!((status, text.as_str()), (StatusCode::OK, "ok"));

    assert_eq!(all_orders(&t).await, before);
    assert_eq!(t.event_count().await, 0);
}

#[tokio::test]
async fn unusable_verified_bodies_are_acknowledged() {
    let t = test_app().await;
    invoiced_order(&t).await;
    let before = all_orders(&t).await;

    for raw in [
        &b"not json"[..],
        &br#"{"payment_status":"finished"}"#[..],
        &br#"{"order_id":""}"#[..],
    ] {
        let sig = HeaderValue::from_str(&sign(raw)).unwrap();
        let (status, text) = t.webhook(raw, Some(sig)).await;
        assert_eq!((status, text.as_str()), (StatusCode::OK, "ok"));
    }

    assert_eq!(all_orders(&t).await, before);
    assert_eq!(t.event_count().await, 0);
}

#[tokio::test]
async fn last_processed_callback_wins() {
    let t = test_app().await;
    let id = invoiced_order(&t).await;

    // Delivered in reverse chronological order
    t.signed_webhook(&json!({ "order_id": id, "payment_status": "finished", "payment_id": 2 }))
        .await;
    t.signed_webhook(&json!({ "order_id": id, "payment_status": "waiting", "payment_id": 1 }))
        .await;

    let order = t.order(&id).await;
    assert_eq!(order["payment"]["status"], "processing");
    assert_eq!(order["payment"]["gatewayStatus"], "waiting");
    assert_eq!(order["payment"]["txHash"], "1");
    assert_eq!(order["status"], "pending");

    let (_, events) = t.get(&format!("/api/orders/{id}/payment-events")).await;
    let statuses: Vec<_> = events
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["gatewayStatus"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(statuses, ["finished", "waiting"]);
}

#[tokio::test]
async fn local_id_matches_without_invoice() {
    let t = test_app().await;
    let order = t.create_order().await;
    let id = order["id"].as_str().unwrap();

    let (status, _) = t
        .signed_webhook(&json!({ "order_id": id, "transaction_status": "expired" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(t.order(id).await["payment"]["status"], "expired");
}

#[tokio::test]
async fn external_reference_matches_generated_invoice_id() {
    let t = test_app().await;
    let order = t.create_order().await;
    let id = order["id"].as_str().unwrap();

    // Attach an invoice whose external reference differs from the local id
    cardhavi_api::db::orders::attach_invoice(
        &t.pool,
        id,
        &cardhavi_api::db::orders::InvoiceLink {
            invoice_id: "inv_9",
            external_order_id: "inv_1700000000000",
            raw: &json!({}),
        },
        1,
    )
    .await
    .unwrap();

    let (status, _) = t
        .signed_webhook(&json!({ "order_id": "inv_1700000000000", "payment_status": "failed" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(t.order(id).await["payment"]["status"], "failed");
}

#[tokio::test]
async fn store_failure_asks_gateway_to_retry() {
    let t = test_app().await;
    let id = invoiced_order(&t).await;
    t.pool.close().await;

    let (status, text) = t
        .signed_webhook(&json!({ "order_id": id, "payment_status": "finished" }))
        .await;
    assert_eq!((status, text.as_str()), (StatusCode::INTERNAL_SERVER_ERROR, "error"));
}
