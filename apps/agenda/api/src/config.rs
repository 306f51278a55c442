use axum_helpers::JwtConfig;
use core_config::{
    AppInfo, ConfigError, FromEnv, app_info, env_list, env_parse_or, server::ServerConfig,
};

// Import database configs from the database library
use database::postgres::PostgresConfig;

// Re-export Environment for use in other modules
pub use core_config::Environment;

/// Application-specific configuration
/// Composes shared config components from the `config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub database: PostgresConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub auth: AuthConfig,
    pub environment: Environment,
    /// Apply pending migrations before serving
    pub run_migrations: bool,
}

/// Account bootstrap settings
#[derive(Clone, Debug, Default)]
pub struct AuthConfig {
    /// Emails that register as supervisors (`AUTH_SUPERVISOR_EMAILS`)
    pub supervisor_emails: Vec<String>,
}

impl FromEnv for AuthConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            supervisor_emails: env_list("AUTH_SUPERVISOR_EMAILS"),
        })
    }
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let database = PostgresConfig::from_env()?; // Required - will fail if not set
        let server = ServerConfig::from_env()?; // Uses defaults: HOST=0.0.0.0, PORT=8080
        let jwt = JwtConfig::from_env()?; // Required - JWT_SECRET must be set
        let auth = AuthConfig::from_env()?;
        let run_migrations = env_parse_or("RUN_MIGRATIONS", true)?;

        Ok(Self {
            app: app_info!(),
            database,
            server,
            jwt,
            auth,
            environment,
            run_migrations,
        })
    }
}
