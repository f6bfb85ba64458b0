//! Concurrent writers against a file-backed WAL store

use std::collections::HashSet;

use serde_json::json;
use shared::models::{FulfillmentStatus, Order, OrderUser, Payment, PaymentStatus};
use shared::util::now_millis;
use sqlx::SqlitePool;
use tempfile::TempDir;

use cardhavi_api::db::{self, cards, orders, payment_events};
use cardhavi_api::reconcile::{self, Outcome};

const CALLBACKS: usize = 40;

async fn file_pool() -> (TempDir, SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("store.db").display());
    let pool = db::connect(&url).await.unwrap();
    db::migrate(&pool).await.unwrap();
    (dir, pool)
}

async fn insert_order(pool: &SqlitePool, id: &str, external_order_id: &str) {
    let now = now_millis();
    let order = Order {
        id: id.to_string(),
        user: OrderUser {
            id: "u-1".into(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
        },
        items: Vec::new(),
        total: 20.0,
        address: String::new(),
        status: FulfillmentStatus::Pending,
        payment: Payment {
            external_order_id: external_order_id.to_string(),
            ..Payment::default()
        },
        created_at: now,
        updated_at: now,
    };
    orders::insert(pool, &order).await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_callbacks_are_all_applied() {
    let (_dir, pool) = file_pool().await;
    insert_order(&pool, "o1", "").await;
    insert_order(&pool, "o2", "ext-2").await;

    let mut handles = Vec::with_capacity(CALLBACKS);
    for i in 0..CALLBACKS {
        let pool = pool.clone();
        let (reference, status) = match i % 4 {
            0 => ("o1", "confirming"),
            1 => ("o1", "finished"),
            2 => ("ext-2", "waiting"),
            _ => ("ext-2", "expired"),
        };
        let body = serde_json::to_vec(&json!({
            "order_id": reference,
            "payment_id": i,
            "payment_status": status,
            "pay_currency": "btc",
        }))
        .unwrap();
        handles.push(tokio::spawn(async move {
            reconcile::reconcile(&pool, &body, now_millis()).await
        }));
    }

    let mut matched = HashSet::new();
    for handle in handles {
        match handle.await.unwrap() {
            Ok(Outcome::Applied { order_id, .. }) => {
                matched.insert(order_id);
            }
            other => panic!("callback not applied: {other:?}"),
        }
    }
    assert_eq!(matched, HashSet::from(["o1".to_string(), "o2".to_string()]));
    assert_eq!(payment_events::count(&pool).await.unwrap(), CALLBACKS as i64);
    assert_eq!(
        payment_events::find_by_order(&pool, "o1").await.unwrap().len(),
        CALLBACKS / 2
    );

    let o1 = orders::find_by_id(&pool, "o1").await.unwrap().unwrap();
    assert!(matches!(
        o1.payment.status,
        PaymentStatus::Processing | PaymentStatus::Finished
    ));
    assert_eq!(o1.status, FulfillmentStatus::Pending);

    let o2 = orders::find_by_id(&pool, "o2").await.unwrap().unwrap();
    assert!(matches!(
        o2.payment.status,
        PaymentStatus::Processing | PaymentStatus::Expired
    ));

    pool.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn unmatched_callbacks_write_nothing_under_load() {
    let (_dir, pool) = file_pool().await;
    insert_order(&pool, "o1", "").await;

    let mut handles = Vec::new();
    for i in 0..10 {
        let pool = pool.clone();
        let body = serde_json::to_vec(&json!({
            "order_id": format!("missing-{i}"),
            "payment_status": "finished",
        }))
        .unwrap();
        handles.push(tokio::spawn(async move {
            reconcile::reconcile(&pool, &body, now_millis()).await
        }));
    }
    for handle in handles {
        assert!(matches!(
            handle.await.unwrap(),
            Ok(Outcome::Unmatched { .. })
        ));
    }

    assert_eq!(payment_events::count(&pool).await.unwrap(), 0);
    let o1 = orders::find_by_id(&pool, "o1").await.unwrap().unwrap();
    assert_eq!(o1.payment.status, PaymentStatus::Unpaid);

    pool.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_first_listings_seed_once() {
    let (_dir, pool) = file_pool().await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            cards::seed_if_empty(&pool, now_millis()).await
        }));
    }

    let mut seeded = 0;
    for handle in handles {
        seeded += handle.await.unwrap().unwrap();
    }
    assert_eq!(seeded, 8);
    assert_eq!(cards::find_all(&pool).await.unwrap().len(), 8);

    pool.close().await;
}
