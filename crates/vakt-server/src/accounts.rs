use crate::auth::hash_password;
use anyhow::Context;
use serde::Serialize;
use sqlx::SqlitePool;
use vakt_common::error::AuthError;
use vakt_db::UserRepo;

/// Seed account created on an empty store. A first-deployment convenience,
/// not a credential to keep: the operator must rotate it immediately.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@vakt.local";

/// Freshly created account identity. Never carries the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedUser {
    pub id: i64,
    pub username: String,
    pub email: String,
}

/// Hash the password and insert the user, translating unique-constraint
/// violations into field-specific conflict errors.
pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    email: &str,
    password: &str,
) -> Result<CreatedUser, AuthError> {
    let password_hash = hash_password(password)?;
    match UserRepo::insert(pool, username, email, &password_hash).await {
        Ok(id) => Ok(CreatedUser {
            id,
            username: username.to_string(),
            email: email.to_string(),
        }),
        Err(e) => Err(classify_insert_error(e)),
    }
}

/// Map a failed insert to a conflict error naming the colliding field.
/// SQLite reports unique violations as "UNIQUE constraint failed:
/// users.<column>"; when the column cannot be determined the generic
/// creation-failure error is returned instead.
fn classify_insert_error(e: sqlx::Error) -> AuthError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            let message = db_err.message();
            if message.contains("users.username") {
                return AuthError::UsernameConflict;
            }
            if message.contains("users.email") {
                return AuthError::EmailConflict;
            }
            return AuthError::UserCreationFailed;
        }
    }
    AuthError::Internal(anyhow::Error::new(e).context("Failed to insert user"))
}

/// Seed the default admin account if the user table is empty.
///
/// Idempotent: a no-op whenever any user exists, including the case where a
/// concurrent bootstrap won the insert race. Returns whether a row was
/// created.
pub async fn bootstrap_default_admin(pool: &SqlitePool) -> Result<bool, AuthError> {
    let count = UserRepo::count(pool)
        .await
        .context("Failed to check for existing users")?;
    if count > 0 {
        return Ok(false);
    }

    match create_user(
        pool,
        DEFAULT_ADMIN_USERNAME,
        DEFAULT_ADMIN_EMAIL,
        DEFAULT_ADMIN_PASSWORD,
    )
    .await
    {
        Ok(created) => {
            tracing::warn!(
                "Created default admin user '{}' (id {}) -- rotate this well-known password immediately",
                created.username,
                created.id
            );
            Ok(true)
        }
        // Lost the race to another bootstrap: the store is seeded either way
        Err(AuthError::UsernameConflict) | Err(AuthError::EmailConflict) => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_password;
    use anyhow::Result;
    use vakt_db::{create_pool, init_schema};

    async fn setup_db() -> Result<SqlitePool> {
        let pool = create_pool("sqlite::memory:").await?;
        init_schema(&pool).await?;
        Ok(pool)
    }

    #[tokio::test]
    async fn test_create_user_returns_identity_not_hash() -> Result<()> {
        let pool = setup_db().await?;

        let created = create_user(&pool, "alice", "alice@example.com", "pw1")
            .await
            .unwrap();
        assert!(created.id > 0);
        assert_eq!(created.username, "alice");
        assert_eq!(created.email, "alice@example.com");

        // The stored hash verifies the plaintext but is not the plaintext
        let row = UserRepo::find_active_by_identifier(&pool, "alice")
            .await?
            .unwrap();
        assert_ne!(row.password_hash, "pw1");
        assert!(verify_password("pw1", &row.password_hash)?);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_user_username_conflict() -> Result<()> {
        let pool = setup_db().await?;

        create_user(&pool, "alice", "alice@example.com", "pw1")
            .await
            .unwrap();
        let err = create_user(&pool, "alice", "other@example.com", "pw2")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UsernameConflict));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_user_email_conflict() -> Result<()> {
        let pool = setup_db().await?;

        create_user(&pool, "alice", "a@x.com", "pw1").await.unwrap();
        let err = create_user(&pool, "bob", "a@x.com", "pw2")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailConflict));

        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_create_same_username_one_wins() -> Result<()> {
        let pool = setup_db().await?;

        let (a, b) = tokio::join!(
            create_user(&pool, "alice", "a1@example.com", "pw1"),
            create_user(&pool, "alice", "a2@example.com", "pw2"),
        );

        let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
        assert_eq!(successes, 1, "Exactly one signup must win");
        let err = if a.is_err() {
            a.unwrap_err()
        } else {
            b.unwrap_err()
        };
        assert!(matches!(err, AuthError::UsernameConflict));
        assert_eq!(UserRepo::count(&pool).await?, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_bootstrap_creates_admin_once() -> Result<()> {
        let pool = setup_db().await?;

        assert!(bootstrap_default_admin(&pool).await.unwrap());
        assert!(!bootstrap_default_admin(&pool).await.unwrap());
        assert_eq!(UserRepo::count(&pool).await?, 1);

        let admin = UserRepo::find_active_by_identifier(&pool, DEFAULT_ADMIN_USERNAME)
            .await?
            .expect("Admin should exist");
        assert_eq!(admin.email, DEFAULT_ADMIN_EMAIL);
        assert!(verify_password(DEFAULT_ADMIN_PASSWORD, &admin.password_hash)?);

        Ok(())
    }

    #[tokio::test]
    async fn test_bootstrap_noop_when_any_user_exists() -> Result<()> {
        let pool = setup_db().await?;

        create_user(&pool, "alice", "alice@example.com", "pw1")
            .await
            .unwrap();
        assert!(!bootstrap_default_admin(&pool).await.unwrap());

        // No admin row was added
        assert!(
            UserRepo::find_active_by_identifier(&pool, DEFAULT_ADMIN_USERNAME)
                .await?
                .is_none()
        );
        assert_eq!(UserRepo::count(&pool).await?, 1);

        Ok(())
    }
}
