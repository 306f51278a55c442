//! JWT configuration loaded through `core_config::FromEnv`.

use core_config::{ConfigError, FromEnv, env_parse_or, env_required};

const MIN_SECRET_LEN: usize = 32;

/// Default access token lifetime: 8 hours
pub const DEFAULT_TTL_SECS: i64 = 8 * 60 * 60;

/// JWT authentication configuration.
///
/// Environment variables:
/// - `JWT_SECRET` (required, at least 32 characters)
/// - `JWT_TTL_SECS` (default: 28800)
#[derive(Clone, Debug)]
pub struct JwtConfig {
    /// HMAC signing secret
    pub secret: String,
    /// Access token lifetime in seconds
    pub ttl_secs: i64,
}

impl JwtConfig {
    /// Build a config with the default lifetime, rejecting short secrets
    pub fn new(secret: impl Into<String>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        check_secret(&secret)?;
        Ok(Self {
            secret,
            ttl_secs: DEFAULT_TTL_SECS,
        })
    }
}

fn check_secret(secret: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_SECRET_LEN {
        return Err(ConfigError::ParseError {
            key: "JWT_SECRET".to_string(),
            details: format!(
                "must be at least {} characters (got {}). Generate one with: openssl rand -base64 32",
                MIN_SECRET_LEN,
                secret.len()
            ),
        });
    }
    Ok(())
}

impl FromEnv for JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = env_required("JWT_SECRET")?;
        check_secret(&secret)?;

        let ttl_secs = env_parse_or("JWT_TTL_SECS", DEFAULT_TTL_SECS)?;
        if ttl_secs <= 0 {
            return Err(ConfigError::ParseError {
                key: "JWT_TTL_SECS".to_string(),
                details: "must be positive".to_string(),
            });
        }

        Ok(Self { secret, ttl_secs })
    }
}
