use std::path::PathBuf;

use dbt_core::settings::{
    WorkflowSettings, DEFAULT_COMPENSATION_AMOUNT, DEFAULT_MARRIAGE_GRANT_AMOUNT,
    DEFAULT_MIN_BRIDE_AGE, DEFAULT_MIN_GROOM_AGE,
};

use crate::auth::jwt::JwtConfig;

/// Process configuration. Everything except the JWT secret has a local
/// development default.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for the pool to drain (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Directory the local document store writes to (default: `uploads`).
    pub upload_dir: PathBuf,
    /// JWT verification settings.
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    /// | `UPLOAD_DIR`           | `uploads`                  |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port = env_or("PORT", 3000u16);

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs = env_or("REQUEST_TIMEOUT_SECS", 30u64);
        let shutdown_timeout_secs = env_or("SHUTDOWN_TIMEOUT_SECS", 30u64);

        let upload_dir = std::env::var("UPLOAD_DIR")
            .unwrap_or_else(|_| "uploads".into())
            .into();

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            upload_dir,
            jwt,
        }
    }
}

/// Parse `name` from the environment, falling back to `default` when unset.
/// Panics on a value that does not parse.
fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|_| panic!("{name} must be a valid number, got '{raw}'")),
        Err(_) => default,
    }
}

/// Load workflow amounts and thresholds from the environment.
///
/// | Env Var                       | Default   |
/// |-------------------------------|-----------|
/// | `MARRIAGE_GRANT_AMOUNT`       | `250000`  |
/// | `DEFAULT_COMPENSATION_AMOUNT` | `85000`   |
/// | `MIN_GROOM_AGE`               | `21`      |
/// | `MIN_BRIDE_AGE`               | `18`      |
///
/// # Panics
///
/// Panics if a value does not parse or an amount is not positive.
pub fn workflow_settings_from_env() -> WorkflowSettings {
    let settings = WorkflowSettings {
        marriage_grant_amount: env_or("MARRIAGE_GRANT_AMOUNT", DEFAULT_MARRIAGE_GRANT_AMOUNT),
        default_compensation_amount: env_or(
            "DEFAULT_COMPENSATION_AMOUNT",
            DEFAULT_COMPENSATION_AMOUNT,
        ),
        min_groom_age: env_or("MIN_GROOM_AGE", DEFAULT_MIN_GROOM_AGE),
        min_bride_age: env_or("MIN_BRIDE_AGE", DEFAULT_MIN_BRIDE_AGE),
    };
    if let Err(e) = settings.validate() {
        panic!("Invalid workflow settings: {e}");
    }
    settings
}
