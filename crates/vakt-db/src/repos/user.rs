use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

pub struct UserRepo;

impl UserRepo {
    /// Insert a new user and return its id.
    ///
    /// Returns the raw sqlx error so the caller can classify unique-constraint
    /// violations (username vs email) from the database error detail.
    pub async fn insert(
        pool: &SqlitePool,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> std::result::Result<i64, sqlx::Error> {
        let result =
            sqlx::query(r#"INSERT INTO users (username, email, password_hash) VALUES (?, ?, ?)"#)
                .bind(username)
                .bind(email)
                .bind(password_hash)
                .execute(pool)
                .await?;
        Ok(result.last_insert_rowid())
    }

    /// Look up an active user by username or email (exact, case-sensitive).
    /// Deactivated users are not found: is_active gates authentication.
    pub async fn find_active_by_identifier(
        pool: &SqlitePool,
        identifier: &str,
    ) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"SELECT id, username, email, password_hash, created_at, is_active
               FROM users WHERE (username = ? OR email = ?) AND is_active = 1"#,
        )
        .bind(identifier)
        .bind(identifier)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by identifier")?;
        Ok(row)
    }

    pub async fn get_by_id(pool: &SqlitePool, id: i64) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"SELECT id, username, email, password_hash, created_at, is_active
               FROM users WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by id")?;
        Ok(row)
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM users"#)
            .fetch_one(pool)
            .await
            .context("Failed to count users")?;
        Ok(count)
    }

    /// Activate or deactivate an account. Users are never deleted.
    pub async fn set_active(pool: &SqlitePool, id: i64, is_active: bool) -> Result<()> {
        sqlx::query(r#"UPDATE users SET is_active = ? WHERE id = ?"#)
            .bind(is_active)
            .bind(id)
            .execute(pool)
            .await
            .context("Failed to update is_active")?;
        Ok(())
    }
}
