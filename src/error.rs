use crate::repositories::user_repository::RepositoryError;
use thiserror::Error;

// Type alias for Result with our ProvisionError
pub type Result<T> = std::result::Result<T, ProvisionError>;

/// Exit status for invalid invocations and duplicate accounts.
pub const EXIT_USER_ERROR: i32 = 1;

/// Exit status for failures of the store or the hashing backend.
pub const EXIT_INFRASTRUCTURE: i32 = 2;

/// Every way a provisioning run can fail.
///
/// Usage and duplicate errors are "designed" outcomes and share exit status 1.
/// Anything coming from the store or the password hasher is an infrastructure
/// fault and gets its own exit status so scripts can tell the two apart.
#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("{0}")]
    Usage(String),

    #[error("user {0} already exists")]
    AlreadyExists(String),

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ProvisionError {
    pub fn exit_code(&self) -> i32 {
        match self {
            ProvisionError::Usage(_) | ProvisionError::AlreadyExists(_) => EXIT_USER_ERROR,
            ProvisionError::Hashing(_) | ProvisionError::Database(_) => EXIT_INFRASTRUCTURE,
        }
    }

    pub fn is_infrastructure(&self) -> bool {
        self.exit_code() == EXIT_INFRASTRUCTURE
    }
}

impl From<RepositoryError> for ProvisionError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::AlreadyExists(email) => ProvisionError::AlreadyExists(email),
            RepositoryError::Database(e) => ProvisionError::Database(e),
            RepositoryError::NotFound => ProvisionError::Database(sqlx::Error::RowNotFound),
        }
    }
}
