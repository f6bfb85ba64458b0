//! Payment Event Repository (append-only)

use super::{RepoError, RepoResult};
use serde_json::Value;
use shared::models::{PaymentEvent, PaymentStatus};
use sqlx::SqlitePool;
use sqlx::types::Json;

#[derive(sqlx::FromRow)]
struct PaymentEventRow {
    id: i64,
    order_id: String,
    external_order_id: String,
    payment_id: String,
    status: String,
    gateway_status: String,
    pay_currency: String,
    amount: Option<f64>,
    payload: Json<Value>,
    received_at: i64,
}

impl TryFrom<PaymentEventRow> for PaymentEvent {
    type Error = RepoError;

    fn try_from(row: PaymentEventRow) -> Result<Self, Self::Error> {
        let status = PaymentStatus::from_db(&row.status).ok_or_else(|| {
            RepoError::Corrupt(format!("payment event {} status {}", row.id, row.status))
        })?;
        Ok(PaymentEvent {
            id: row.id,
            order_id: row.order_id,
            external_order_id: row.external_order_id,
            payment_id: row.payment_id,
            status,
            gateway_status: row.gateway_status,
            pay_currency: row.pay_currency,
            amount: row.amount,
            payload: row.payload.0,
            received_at: row.received_at,
        })
    }
}

/// New event to append
#[derive(Debug)]
pub struct NewPaymentEvent<'a> {
    pub order_id: &'a str,
    pub external_order_id: &'a str,
    pub payment_id: &'a str,
    pub status: PaymentStatus,
    pub gateway_status: &'a str,
    pub pay_currency: &'a str,
    pub amount: Option<f64>,
    pub payload: &'a Value,
    pub received_at: i64,
}

pub async fn append(
    conn: impl sqlx::Executor<'_, Database = sqlx::Sqlite>,
    event: &NewPaymentEvent<'_>,
) -> RepoResult<i64> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO payment_events (order_id, external_order_id, payment_id, status, \
         gateway_status, pay_currency, amount, payload, received_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(event.order_id)
    .bind(event.external_order_id)
    .bind(event.payment_id)
    .bind(event.status.as_db())
    .bind(event.gateway_status)
    .bind(event.pay_currency)
    .bind(event.amount)
    .bind(Json(event.payload))
    .bind(event.received_at)
    .fetch_one(conn)
    .await?;
    Ok(id)
}

/// Events for one order in arrival order
pub async fn find_by_order(pool: &SqlitePool, order_id: &str) -> RepoResult<Vec<PaymentEvent>> {
    let rows = sqlx::query_as::<_, PaymentEventRow>(
        "SELECT id, order_id, external_order_id, payment_id, status, gateway_status, \
         pay_currency, amount, payload, received_at \
         FROM payment_events WHERE order_id = ? ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(PaymentEvent::try_from).collect()
}

/// Total number of logged events (all orders)
pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM payment_events")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
