use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub email_verified: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Values written for a freshly provisioned account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    /// ISO-8601 instant used for both `created_at` and `updated_at`.
    pub timestamp: String,
}
