//! Card Repository

use super::{RepoError, RepoResult};
use shared::models::{Card, CardUpdate, Rarity};
use sqlx::SqlitePool;

#[derive(sqlx::FromRow)]
struct CardRow {
    id: String,
    name: String,
    category: String,
    price: f64,
    rarity: String,
    rating: f64,
    in_stock: bool,
    stock: i64,
    description: Option<String>,
    image_url: Option<String>,
    promo_active: bool,
    promo_buy_qty: i64,
    promo_get_qty: i64,
    promo_get_amount: f64,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<CardRow> for Card {
    type Error = RepoError;

    fn try_from(row: CardRow) -> Result<Self, Self::Error> {
        let rarity = Rarity::from_db(&row.rarity)
            .ok_or_else(|| RepoError::Corrupt(format!("card {} rarity {}", row.id, row.rarity)))?;
        Ok(Card {
            id: row.id,
            name: row.name,
            category: row.category,
            price: row.price,
            rarity,
            rating: row.rating,
            in_stock: row.in_stock,
            stock: row.stock,
            description: row.description,
            image_url: row.image_url,
            promo_active: row.promo_active,
            promo_buy_qty: row.promo_buy_qty,
            promo_get_qty: row.promo_get_qty,
            promo_get_amount: row.promo_get_amount,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SELECT_CARD: &str = "SELECT id, name, category, price, rarity, rating, in_stock, stock, \
     description, image_url, promo_active, promo_buy_qty, promo_get_qty, promo_get_amount, \
     created_at, updated_at FROM cards";

/// Newest first
pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Card>> {
    let rows = sqlx::query_as::<_, CardRow>(&format!(
        "{SELECT_CARD} ORDER BY created_at DESC, rowid DESC"
    ))
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(Card::try_from).collect()
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> RepoResult<Option<Card>> {
    let row = sqlx::query_as::<_, CardRow>(&format!("{SELECT_CARD} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(Card::try_from).transpose()
}

const INSERT_CARD: &str = "INSERT INTO cards (id, name, category, price, rarity, rating, \
     in_stock, stock, description, image_url, promo_active, promo_buy_qty, promo_get_qty, \
     promo_get_amount, created_at, updated_at)";

type SqliteQuery<'q> = sqlx::query::Query<'q, sqlx::Sqlite, <sqlx::Sqlite as sqlx::Database>::Arguments<'q>>;

fn bind_card<'q>(query: SqliteQuery<'q>, card: &'q Card) -> SqliteQuery<'q> {
    query
        .bind(&card.id)
        .bind(&card.name)
        .bind(&card.category)
        .bind(card.price)
        .bind(card.rarity.as_db())
        .bind(card.rating)
        .bind(card.in_stock)
        .bind(card.stock)
        .bind(&card.description)
        .bind(&card.image_url)
        .bind(card.promo_active)
        .bind(card.promo_buy_qty)
        .bind(card.promo_get_qty)
        .bind(card.promo_get_amount)
        .bind(card.created_at)
        .bind(card.updated_at)
}

pub async fn insert(
    conn: impl sqlx::Executor<'_, Database = sqlx::Sqlite>,
    card: &Card,
) -> RepoResult<()> {
    let sql = format!("{INSERT_CARD} VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)");
    bind_card(sqlx::query(&sql), card).execute(conn).await?;
    Ok(())
}

/// Insert only while the table is empty; `false` when it already had rows
async fn insert_into_empty(
    conn: impl sqlx::Executor<'_, Database = sqlx::Sqlite>,
    card: &Card,
) -> RepoResult<bool> {
    let sql = format!(
        "{INSERT_CARD} SELECT ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ? \
         WHERE NOT EXISTS (SELECT 1 FROM cards)"
    );
    let rows = bind_card(sqlx::query(&sql), card).execute(conn).await?;
    Ok(rows.rows_affected() > 0)
}

/// Partial update; `None` fields keep their stored value.
///
/// `rarity` must already be validated. Returns `None` for an unknown id.
pub async fn update(
    pool: &SqlitePool,
    id: &str,
    data: &CardUpdate,
    rarity: Option<Rarity>,
    now: i64,
) -> RepoResult<Option<Card>> {
    let rows = sqlx::query(
        "UPDATE cards SET \
         name = COALESCE(?1, name), \
         category = COALESCE(?2, category), \
         price = COALESCE(?3, price), \
         rarity = COALESCE(?4, rarity), \
         rating = COALESCE(?5, rating), \
         stock = COALESCE(?6, stock), \
         in_stock = COALESCE(?7, in_stock), \
         description = COALESCE(?8, description), \
         image_url = COALESCE(?9, image_url), \
         promo_active = COALESCE(?10, promo_active), \
         promo_buy_qty = COALESCE(?11, promo_buy_qty), \
         promo_get_qty = COALESCE(?12, promo_get_qty), \
         promo_get_amount = COALESCE(?13, promo_get_amount), \
         updated_at = ?14 \
         WHERE id = ?15",
    )
    .bind(&data.name)
    .bind(&data.category)
    .bind(data.price)
    .bind(rarity.map(|r| r.as_db()))
    .bind(data.rating)
    .bind(data.stock)
    .bind(data.effective_in_stock())
    .bind(&data.description)
    .bind(&data.image_url)
    .bind(data.promo_active)
    .bind(data.promo_buy_qty)
    .bind(data.promo_get_qty)
    .bind(data.promo_get_amount)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Ok(None);
    }
    find_by_id(pool, id).await
}

/// Returns `false` when no card had this id
pub async fn delete(pool: &SqlitePool, id: &str) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM cards WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Insert the default catalog when the table is empty.
///
/// Returns the number of cards inserted.
pub async fn seed_if_empty(pool: &SqlitePool, now: i64) -> RepoResult<usize> {
    let defaults = default_catalog(now);
    let Some((first, rest)) = defaults.split_first() else {
        return Ok(0);
    };

    // The guarded insert is the first statement so the transaction starts as a writer
    let mut tx = pool.begin().await?;
    if !insert_into_empty(&mut *tx, first).await? {
        return Ok(0);
    }
    for card in rest {
        insert(&mut *tx, card).await?;
    }
    tx.commit().await?;

    tracing::info!(count = defaults.len(), "Seeded default catalog");
    Ok(defaults.len())
}

fn default_catalog(now: i64) -> Vec<Card> {
    const DEFAULTS: [(&str, &str, f64, Rarity, f64, bool); 8] = [
        ("Lightning Dragon", "Mythic", 149.99, Rarity::Legendary, 4.8, true),
        ("Shadow Assassin", "Rare", 79.99, Rarity::Rare, 4.6, true),
        ("Crystal Phoenix", "Mythic", 299.99, Rarity::Legendary, 5.0, true),
        ("Storm Wizard", "Common", 29.99, Rarity::Common, 4.2, true),
        ("Ancient Golem", "Rare", 99.99, Rarity::Rare, 4.5, false),
        ("Mystic Fairy", "Uncommon", 49.99, Rarity::Uncommon, 4.3, true),
        ("Fire Elemental", "Rare", 89.99, Rarity::Rare, 4.7, true),
        ("Ice Queen", "Mythic", 199.99, Rarity::Legendary, 4.9, true),
    ];

    DEFAULTS
        .iter()
        .map(|&(name, category, price, rarity, rating, in_stock)| Card {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            category: category.to_string(),
            price,
            rarity,
            rating,
            in_stock,
            stock: 0,
            description: None,
            image_url: None,
            promo_active: false,
            promo_buy_qty: 0,
            promo_get_qty: 0,
            promo_get_amount: 0.0,
            created_at: now,
            updated_at: now,
        })
        .collect()
}
