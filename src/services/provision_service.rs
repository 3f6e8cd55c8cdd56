use crate::error::{ProvisionError, Result};
use crate::models::user::{NewUser, User};
use crate::password::{self, HashScheme};
use crate::repositories::user_repository::{RepositoryError, UserRepository};
use chrono::{Local, SecondsFormat};
use std::sync::Arc;

/// Credentials checked and hashed before the store is touched.
///
/// Holding only the hash keeps the plaintext out of everything downstream.
#[derive(Debug, Clone)]
pub struct PreparedAccount {
    pub email: String,
    pub password_hash: String,
}

impl PreparedAccount {
    /// No policy is applied to either value; any password, even an empty
    /// one, is hashed as given.
    pub fn new(email: &str, password: &str, scheme: HashScheme) -> Result<Self> {
        let password_hash = password::hash_password(scheme, password)?;
        tracing::debug!("Hashed password for {} with {}", email, scheme);

        Ok(PreparedAccount {
            email: email.to_string(),
            password_hash,
        })
    }
}

#[derive(Debug, Clone)]
pub enum ProvisionOutcome {
    Created(User),
    PasswordReset(User),
}

impl ProvisionOutcome {
    pub fn user(&self) -> &User {
        match self {
            ProvisionOutcome::Created(user) | ProvisionOutcome::PasswordReset(user) => user,
        }
    }
}

pub struct ProvisionService {
    repository: Arc<dyn UserRepository>,
    reset_existing: bool,
}

impl ProvisionService {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self {
            repository,
            reset_existing: false,
        }
    }

    /// Overwrite the password of an existing account instead of failing.
    pub fn with_reset_existing(mut self, reset_existing: bool) -> Self {
        self.reset_existing = reset_existing;
        self
    }

    pub async fn provision(&self, account: PreparedAccount) -> Result<ProvisionOutcome> {
        let now = current_timestamp();

        if self.reset_existing {
            if let Some(existing) = self.repository.find_by_email(&account.email).await? {
                tracing::info!("Resetting password for existing user {}", existing.id);
                let user = self
                    .repository
                    .reset_password(&account.email, &account.password_hash, &now)
                    .await?;
                return Ok(ProvisionOutcome::PasswordReset(user));
            }
        }

        let new_user = NewUser {
            email: account.email,
            password_hash: account.password_hash,
            timestamp: now,
        };

        match self.repository.create_verified_user(&new_user).await {
            Ok(user) => {
                tracing::info!("Created verified user {} ({})", user.id, user.email);
                Ok(ProvisionOutcome::Created(user))
            }
            Err(RepositoryError::AlreadyExists(email)) => {
                tracing::warn!("User {} already exists, nothing written", email);
                Err(ProvisionError::AlreadyExists(email))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Local wall-clock time as ISO-8601 with offset.
pub fn current_timestamp() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}
