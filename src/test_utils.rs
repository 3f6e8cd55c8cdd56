pub mod test_helpers {
    use crate::models::user::User;
    use argon2::{password_hash::PasswordHash, Argon2, PasswordVerifier};
    use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
    use tempfile::NamedTempFile;

    /// `users` table as created by the application that owns the store.
    pub const USERS_SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
      id             INTEGER PRIMARY KEY AUTOINCREMENT,
      email          TEXT NOT NULL UNIQUE,
      password_hash  TEXT NOT NULL,
      email_verified INTEGER NOT NULL DEFAULT 0,
      created_at     TEXT,
      updated_at     TEXT
    );
    "#;

    /// Create a new in-memory SQLite database for testing
    pub async fn create_test_db() -> Result<SqlitePool, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await?;

        create_users_table(&pool).await?;

        Ok(pool)
    }

    /// Create a temporary file-based SQLite database for testing
    /// The file outlives the pool, so the CLI binary can be pointed at it.
    pub async fn create_test_db_file() -> Result<(SqlitePool, NamedTempFile), sqlx::Error> {
        let temp_file = NamedTempFile::new().map_err(sqlx::Error::Io)?;
        let database_url = database_url_for(&temp_file)?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(&database_url)
            .await?;

        create_users_table(&pool).await?;

        Ok((pool, temp_file))
    }

    pub fn database_url_for(temp_file: &NamedTempFile) -> Result<String, sqlx::Error> {
        let db_path = temp_file
            .path()
            .to_str()
            .ok_or_else(|| sqlx::Error::Configuration("Invalid database path".into()))?;
        Ok(format!("sqlite://{}", db_path))
    }

    pub async fn create_users_table(pool: &SqlitePool) -> Result<(), sqlx::Error> {
        sqlx::query(USERS_SCHEMA).execute(pool).await?;
        Ok(())
    }

    /// Insert a user directly, bypassing the provisioning flow
    pub async fn insert_test_user(
        pool: &SqlitePool,
        email: &str,
        password_hash: &str,
        verified: bool,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (email, password_hash, email_verified, created_at, updated_at)
            VALUES (?, ?, ?, datetime('now'), datetime('now'))
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(verified)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn count_users(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await
    }

    pub async fn count_users_with_email(
        pool: &SqlitePool,
        email: &str,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(pool)
            .await
    }

    pub async fn find_user_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, email_verified, created_at, updated_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Check a password against a stored bcrypt or argon2 hash, the way the
    /// consuming login flow would.
    pub fn verify_password(password: &str, password_hash: &str) -> bool {
        if password_hash.starts_with("$argon2") {
            match PasswordHash::new(password_hash) {
                Ok(parsed_hash) => Argon2::default()
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok(),
                Err(_) => false,
            }
        } else {
            bcrypt::verify(password, password_hash).unwrap_or(false)
        }
    }
}
