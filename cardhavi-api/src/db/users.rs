use super::{RepoError, RepoResult};
use shared::models::User;
use sqlx::SqlitePool;

#[derive(sqlx::FromRow)]
pub struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: i64,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            email: row.email,
            created_at: row.created_at,
        }
    }
}

/// Insert a new account; the email must already be lower-cased
pub async fn create(
    pool: &SqlitePool,
    id: &str,
    name: &str,
    email: &str,
    password_hash: &str,
    now: i64,
) -> RepoResult<User> {
    let result = sqlx::query(
        "INSERT INTO users (id, name, email, password_hash, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
    )
    .bind(id)
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(now)
    .execute(pool)
    .await;

    match result {
        Ok(_) => Ok(User {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            created_at: now,
        }),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            Err(RepoError::Duplicate("Email".into()))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<UserRow>> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, name, email, password_hash, created_at FROM users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}
