use crate::models::user::{NewUser, User};
use async_trait::async_trait;
use sqlx::SqlitePool;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("User not found")]
    NotFound,
    #[error("User {0} already exists")]
    AlreadyExists(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

const SELECT_USER: &str = r#"
    SELECT
        id,
        email,
        password_hash,
        email_verified,
        created_at,
        updated_at
    FROM users
"#;

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;
    /// Insert a pre-verified account unless the email is already taken.
    async fn create_verified_user(&self, user: &NewUser) -> RepositoryResult<User>;
    /// Replace the hash of an existing account and mark it verified.
    async fn reset_password(
        &self,
        email: &str,
        password_hash: &str,
        updated_at: &str,
    ) -> RepositoryResult<User>;
}

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn map_unique_violation(err: sqlx::Error, email: &str) -> RepositoryError {
    let is_unique = err
        .as_database_error()
        .map(|db_err| db_err.is_unique_violation())
        .unwrap_or(false);

    if is_unique {
        RepositoryError::AlreadyExists(email.to_string())
    } else {
        RepositoryError::Database(err)
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let query = format!("{SELECT_USER} WHERE email = ?");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn create_verified_user(&self, user: &NewUser) -> RepositoryResult<User> {
        let mut tx = self.pool.begin().await?;

        let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE email = ?")
            .bind(&user.email)
            .fetch_optional(&mut *tx)
            .await?;

        if existing.is_some() {
            // Dropping the transaction rolls it back; nothing was written.
            return Err(RepositoryError::AlreadyExists(user.email.clone()));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO users (email, password_hash, email_verified, created_at, updated_at)
            VALUES (?, ?, 1, ?, ?)
            "#,
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.timestamp)
        .bind(&user.timestamp)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, &user.email))?;

        let query = format!("{SELECT_USER} WHERE id = ?");
        let created = sqlx::query_as::<_, User>(&query)
            .bind(result.last_insert_rowid())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        tx.commit().await?;

        Ok(created)
    }

    async fn reset_password(
        &self,
        email: &str,
        password_hash: &str,
        updated_at: &str,
    ) -> RepositoryResult<User> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = ?, email_verified = 1, updated_at = ? WHERE email = ?",
        )
        .bind(password_hash)
        .bind(updated_at)
        .bind(email)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.find_by_email(email)
            .await?
            .ok_or(RepositoryError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_helpers;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            password_hash: "$2b$04$placeholderplaceholderplaceholderplaceholde".to_string(),
            timestamp: "2026-01-01T00:00:00.000000+00:00".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_verified_user_sets_flag_and_timestamps() {
        let (pool, _file) = test_helpers::create_test_db_file().await.unwrap();
        let repo = SqliteUserRepository::new(pool);

        let user = repo
            .create_verified_user(&new_user("repo@example.com"))
            .await
            .unwrap();

        assert!(user.id > 0);
        assert!(user.email_verified);
        assert_eq!(
            user.created_at.as_deref(),
            Some("2026-01-01T00:00:00.000000+00:00")
        );
        assert_eq!(user.created_at, user.updated_at);
    }

    #[tokio::test]
    async fn test_create_verified_user_rejects_existing_email() {
        let (pool, _file) = test_helpers::create_test_db_file().await.unwrap();
        let repo = SqliteUserRepository::new(pool.clone());

        repo.create_verified_user(&new_user("taken@example.com"))
            .await
            .unwrap();
        let second = repo.create_verified_user(&new_user("taken@example.com")).await;

        assert!(matches!(second, Err(RepositoryError::AlreadyExists(ref e)) if e == "taken@example.com"));
        assert_eq!(
            test_helpers::count_users_with_email(&pool, "taken@example.com")
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_find_by_email_is_case_sensitive() {
        let pool = test_helpers::create_test_db().await.unwrap();
        let repo = SqliteUserRepository::new(pool);

        repo.create_verified_user(&new_user("Case@example.com"))
            .await
            .unwrap();

        assert!(repo.find_by_email("Case@example.com").await.unwrap().is_some());
        assert!(repo.find_by_email("case@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reset_password_missing_user() {
        let (pool, _file) = test_helpers::create_test_db_file().await.unwrap();
        let repo = SqliteUserRepository::new(pool);

        let result = repo
            .reset_password("ghost@example.com", "hash", "2026-01-01T00:00:00+00:00")
            .await;
        assert!(matches!(result, Err(RepositoryError::NotFound)));
    }

    #[test]
    fn test_non_database_error_is_not_a_duplicate() {
        let err = map_unique_violation(sqlx::Error::PoolTimedOut, "x@example.com");
        assert!(matches!(err, RepositoryError::Database(_)));
    }
}
