use std::env;

use crate::password::HashScheme;

/// Store used when neither `--database-url` nor `DATABASE_URL` is given.
/// Relative to the working directory, like the application that owns it.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/app.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionConfig {
    pub database_url: String,
    pub hash_scheme: HashScheme,
    pub reset_password: bool,
}

impl ProvisionConfig {
    /// Resolve the store location: explicit flag, then `DATABASE_URL`, then
    /// the fixed default.
    pub fn resolve(
        database_url: Option<String>,
        hash_scheme: HashScheme,
        reset_password: bool,
    ) -> Self {
        let raw = database_url
            .filter(|url| !url.trim().is_empty())
            .or_else(database_url_from_env)
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        ProvisionConfig {
            database_url: normalize_database_url(&raw),
            hash_scheme,
            reset_password,
        }
    }
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        ProvisionConfig {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            hash_scheme: HashScheme::default(),
            reset_password: false,
        }
    }
}

fn database_url_from_env() -> Option<String> {
    env::var("DATABASE_URL")
        .ok()
        .filter(|url| !url.trim().is_empty())
}

/// Accept bare file paths as well as `sqlite:` URLs.
pub fn normalize_database_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("sqlite:") {
        trimmed.to_string()
    } else {
        format!("sqlite://{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_normalize_keeps_sqlite_urls() {
        assert_eq!(
            normalize_database_url("sqlite://data/app.db"),
            "sqlite://data/app.db"
        );
        assert_eq!(normalize_database_url("sqlite::memory:"), "sqlite::memory:");
    }

    #[test]
    fn test_normalize_prefixes_bare_paths() {
        assert_eq!(
            normalize_database_url("/tmp/users.db"),
            "sqlite:///tmp/users.db"
        );
        assert_eq!(normalize_database_url(" data/app.db "), "sqlite://data/app.db");
    }

    #[test]
    #[serial]
    fn test_explicit_url_wins_over_env() {
        env::set_var("DATABASE_URL", "sqlite://from-env.db");
        let config = ProvisionConfig::resolve(
            Some("sqlite://explicit.db".to_string()),
            HashScheme::Bcrypt,
            false,
        );
        env::remove_var("DATABASE_URL");

        assert_eq!(config.database_url, "sqlite://explicit.db");
    }

    #[test]
    #[serial]
    fn test_env_used_when_flag_missing() {
        env::set_var("DATABASE_URL", "sqlite://from-env.db");
        let config = ProvisionConfig::resolve(None, HashScheme::Argon2, true);
        env::remove_var("DATABASE_URL");

        assert_eq!(config.database_url, "sqlite://from-env.db");
        assert_eq!(config.hash_scheme, HashScheme::Argon2);
        assert!(config.reset_password);
    }

    #[test]
    #[serial]
    fn test_default_when_nothing_set() {
        env::remove_var("DATABASE_URL");
        let config = ProvisionConfig::resolve(Some("  ".to_string()), HashScheme::Bcrypt, false);

        assert_eq!(config, ProvisionConfig::default());
    }
}
