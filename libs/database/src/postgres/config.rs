use sea_orm::ConnectOptions;
use std::time::Duration;

#[cfg(feature = "config")]
use core_config::{ConfigError, FromEnv, env_parse_or, env_required};

/// PostgreSQL pool settings.
///
/// Built by hand in tests, or from the environment with the `config` feature:
///
/// ```ignore
/// use core_config::FromEnv;
/// use database::postgres::PostgresConfig;
///
/// let options = PostgresConfig::from_env()?.into_connect_options();
/// ```
#[derive(Clone, Debug)]
pub struct PostgresConfig {
    /// Database connection URL (required)
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    /// Log every statement through sqlx
    pub sqlx_logging: bool,
}

impl PostgresConfig {
    /// Default pool settings for `url`
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_pool_size(url: impl Into<String>, max_connections: u32, min_connections: u32) -> Self {
        Self {
            url: url.into(),
            max_connections,
            min_connections,
            ..Self::default()
        }
    }

    /// Convert this config into SeaORM ConnectOptions
    pub fn into_connect_options(self) -> ConnectOptions {
        let mut opt = ConnectOptions::new(&self.url);
        opt.max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .acquire_timeout(Duration::from_secs(self.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(self.idle_timeout_secs))
            .sqlx_logging(self.sqlx_logging);
        opt
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 20,
            min_connections: 2,
            connect_timeout_secs: 8,
            acquire_timeout_secs: 8,
            idle_timeout_secs: 300,
            sqlx_logging: false,
        }
    }
}

/// Environment variables:
/// - `DATABASE_URL` (required)
/// - `DB_MAX_CONNECTIONS` (default: 20)
/// - `DB_MIN_CONNECTIONS` (default: 2)
/// - `DB_CONNECT_TIMEOUT_SECS` (default: 8)
/// - `DB_ACQUIRE_TIMEOUT_SECS` (default: 8)
/// - `DB_IDLE_TIMEOUT_SECS` (default: 300)
/// - `DB_SQLX_LOGGING` (default: false)
#[cfg(feature = "config")]
impl FromEnv for PostgresConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            url: env_required("DATABASE_URL")?,
            max_connections: env_parse_or("DB_MAX_CONNECTIONS", defaults.max_connections)?,
            min_connections: env_parse_or("DB_MIN_CONNECTIONS", defaults.min_connections)?,
            connect_timeout_secs: env_parse_or(
                "DB_CONNECT_TIMEOUT_SECS",
                defaults.connect_timeout_secs,
            )?,
            acquire_timeout_secs: env_parse_or(
                "DB_ACQUIRE_TIMEOUT_SECS",
                defaults.acquire_timeout_secs,
            )?,
            idle_timeout_secs: env_parse_or("DB_IDLE_TIMEOUT_SECS", defaults.idle_timeout_secs)?,
            sqlx_logging: env_parse_or("DB_SQLX_LOGGING", defaults.sqlx_logging)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgres_config_new() {
        let config = PostgresConfig::new("postgresql://localhost/agenda");
        assert_eq!(config.url(), "postgresql://localhost/agenda");
        assert_eq!(config.max_connections, 20);
        assert_eq!(config.min_connections, 2);
        assert!(!config.sqlx_logging);
    }

    #[test]
    fn test_postgres_config_with_pool_size() {
        let config = PostgresConfig::with_pool_size("postgresql://localhost/agenda", 50, 10);
        assert_eq!(config.max_connections, 50);
        assert_eq!(config.min_connections, 10);
        assert_eq!(config.connect_timeout_secs, 8);
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_postgres_config_from_env_minimal() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", Some("postgresql://localhost/agenda")),
                ("DB_MAX_CONNECTIONS", None),
                ("DB_MIN_CONNECTIONS", None),
                ("DB_SQLX_LOGGING", None),
            ],
            || {
                let config = PostgresConfig::from_env().unwrap();
                assert_eq!(config.url, "postgresql://localhost/agenda");
                assert_eq!(config.max_connections, 20);
                assert_eq!(config.min_connections, 2);
                assert!(!config.sqlx_logging);
            },
        );
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_postgres_config_from_env_custom() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", Some("postgresql://localhost/agenda")),
                ("DB_MAX_CONNECTIONS", Some("50")),
                ("DB_MIN_CONNECTIONS", Some("10")),
                ("DB_CONNECT_TIMEOUT_SECS", Some("15")),
                ("DB_SQLX_LOGGING", Some("true")),
            ],
            || {
                let config = PostgresConfig::from_env().unwrap();
                assert_eq!(config.max_connections, 50);
                assert_eq!(config.min_connections, 10);
                assert_eq!(config.connect_timeout_secs, 15);
                assert!(config.sqlx_logging);
            },
        );
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_postgres_config_from_env_missing_url() {
        temp_env::with_var_unset("DATABASE_URL", || {
            let err = PostgresConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("DATABASE_URL"));
        });
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_postgres_config_from_env_invalid_number() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", Some("postgresql://localhost/agenda")),
                ("DB_MAX_CONNECTIONS", Some("lots")),
            ],
            || {
                let err = PostgresConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("DB_MAX_CONNECTIONS"));
            },
        );
    }
}
