//! Order Repository
//!
//! Every mutation is a single-row UPDATE, so each order document changes
//! atomically. Concurrent writers to the same order resolve last-write-wins.

use super::{RepoError, RepoResult};
use serde_json::Value;
use shared::models::{
    FulfillmentStatus, Order, OrderItem, OrderUser, Payment, PaymentMethod, PaymentStatus,
};
use sqlx::SqlitePool;
use sqlx::types::Json;

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: String,
    user_snapshot: Json<OrderUser>,
    items: Json<Vec<OrderItem>>,
    total: f64,
    address: String,
    status: String,
    payment_method: String,
    payment_status: String,
    payment_currency: String,
    invoice_id: String,
    external_order_id: String,
    tx_hash: String,
    gateway_status: String,
    payment_raw: Json<Value>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepoError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let corrupt = |field: &str, value: &str| {
            RepoError::Corrupt(format!("order {} {field} {value}", row.id))
        };
        let status = FulfillmentStatus::from_db(&row.status)
            .ok_or_else(|| corrupt("status", &row.status))?;
        let method = PaymentMethod::from_db(&row.payment_method)
            .ok_or_else(|| corrupt("payment_method", &row.payment_method))?;
        let payment_status = PaymentStatus::from_db(&row.payment_status)
            .ok_or_else(|| corrupt("payment_status", &row.payment_status))?;

        Ok(Order {
            id: row.id,
            user: row.user_snapshot.0,
            items: row.items.0,
            total: row.total,
            address: row.address,
            status,
            payment: Payment {
                method,
                status: payment_status,
                currency: row.payment_currency,
                invoice_id: row.invoice_id,
                external_order_id: row.external_order_id,
                tx_hash: row.tx_hash,
                gateway_status: row.gateway_status,
                raw: row.payment_raw.0,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SELECT_ORDER: &str = "SELECT id, user_snapshot, items, total, address, status, \
     payment_method, payment_status, payment_currency, invoice_id, external_order_id, \
     tx_hash, gateway_status, payment_raw, created_at, updated_at FROM orders";

/// Payment fields written by a gateway callback
#[derive(Debug)]
pub struct CallbackWrite<'a> {
    pub status: PaymentStatus,
    pub gateway_status: &'a str,
    pub currency: &'a str,
    pub tx_hash: &'a str,
    pub raw: &'a Value,
}

/// Invoice reference written after a successful invoice creation
#[derive(Debug)]
pub struct InvoiceLink<'a> {
    pub invoice_id: &'a str,
    pub external_order_id: &'a str,
    pub raw: &'a Value,
}

pub async fn insert(pool: &SqlitePool, order: &Order) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO orders (id, user_id, user_snapshot, items, total, address, status, \
         payment_method, payment_status, payment_currency, invoice_id, external_order_id, \
         tx_hash, gateway_status, payment_raw, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&order.id)
    .bind(&order.user.id)
    .bind(Json(&order.user))
    .bind(Json(&order.items))
    .bind(order.total)
    .bind(&order.address)
    .bind(order.status.as_db())
    .bind(order.payment.method.as_db())
    .bind(order.payment.status.as_db())
    .bind(&order.payment.currency)
    .bind(&order.payment.invoice_id)
    .bind(&order.payment.external_order_id)
    .bind(&order.payment.tx_hash)
    .bind(&order.payment.gateway_status)
    .bind(Json(&order.payment.raw))
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// All orders, newest first
pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Order>> {
    let rows = sqlx::query_as::<_, OrderRow>(&format!(
        "{SELECT_ORDER} ORDER BY created_at DESC, rowid DESC"
    ))
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(Order::try_from).collect()
}

/// Orders whose user snapshot carries `user_id`, newest first
pub async fn find_by_user(pool: &SqlitePool, user_id: &str) -> RepoResult<Vec<Order>> {
    let rows = sqlx::query_as::<_, OrderRow>(&format!(
        "{SELECT_ORDER} WHERE user_id = ? ORDER BY created_at DESC, rowid DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(Order::try_from).collect()
}

pub async fn find_by_id(
    conn: impl sqlx::Executor<'_, Database = sqlx::Sqlite>,
    id: &str,
) -> RepoResult<Option<Order>> {
    let row = sqlx::query_as::<_, OrderRow>(&format!("{SELECT_ORDER} WHERE id = ?"))
        .bind(id)
        .fetch_optional(conn)
        .await?;
    row.map(Order::try_from).transpose()
}

/// Overwrite the fulfillment status (no transition guard)
pub async fn update_status(
    pool: &SqlitePool,
    id: &str,
    status: FulfillmentStatus,
    now: i64,
) -> RepoResult<Option<Order>> {
    let rows = sqlx::query("UPDATE orders SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status.as_db())
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Ok(None);
    }
    find_by_id(pool, id).await
}

/// Record an issued invoice: method crypto, status processing.
///
/// Returns `false` when no order had this id.
pub async fn attach_invoice(
    pool: &SqlitePool,
    id: &str,
    link: &InvoiceLink<'_>,
    now: i64,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE orders SET payment_method = ?, payment_status = ?, invoice_id = ?, \
         external_order_id = ?, payment_raw = ?, updated_at = ? WHERE id = ?",
    )
    .bind(PaymentMethod::Crypto.as_db())
    .bind(PaymentStatus::Processing.as_db())
    .bind(link.invoice_id)
    .bind(link.external_order_id)
    .bind(Json(link.raw))
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Overwrite the payment fields of the order matching a gateway reference
/// (last write wins).
///
/// The reference matches the local id or the stored external order id; the
/// oldest order wins when both match. Lookup and write are one statement, so
/// the write lock is taken before anything is read. Returns the matched order
/// id, `None` when nothing matched. Empty references never match.
pub async fn apply_callback(
    conn: impl sqlx::Executor<'_, Database = sqlx::Sqlite>,
    reference: &str,
    write: &CallbackWrite<'_>,
    now: i64,
) -> RepoResult<Option<String>> {
    if reference.is_empty() {
        return Ok(None);
    }
    let id: Option<String> = sqlx::query_scalar(
        "UPDATE orders SET payment_status = ?1, gateway_status = ?2, payment_currency = ?3, \
         tx_hash = ?4, payment_raw = ?5, updated_at = ?6 \
         WHERE id = (SELECT id FROM orders WHERE id = ?7 OR external_order_id = ?7 \
         ORDER BY rowid LIMIT 1) \
         RETURNING id",
    )
    .bind(write.status.as_db())
    .bind(write.gateway_status)
    .bind(write.currency)
    .bind(write.tx_hash)
    .bind(Json(write.raw))
    .bind(now)
    .bind(reference)
    .fetch_optional(conn)
    .await?;
    Ok(id)
}
