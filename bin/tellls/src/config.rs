/// Configuration management for Tellls
///
/// Settings come from environment variables (a `.env` file is loaded first by
/// `main`). Every value except the session secret has a development default.
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set when APP_ENV=production")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    /// Signs session cookies. `None` means a throwaway secret per process.
    pub session_secret: Option<String>,
    /// Top-level tellls per feed page
    pub feed_page_size: u32,
    pub cors_allowed_origins: Vec<String>,
}

/// Application settings
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Application environment (development, production)
    pub env: String,
    pub host: String,
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let env = get("APP_ENV", "development");
        let session_secret = lookup("SESSION_SECRET").filter(|s| !s.is_empty());
        if env == "production" && session_secret.is_none() {
            return Err(ConfigError::Missing("SESSION_SECRET"));
        }

        Ok(Config {
            app: AppConfig {
                host: get("TELLLS_HOST", "127.0.0.1"),
                port: parse("TELLLS_PORT", get("TELLLS_PORT", "8080"))?,
                env,
            },
            database: DatabaseConfig {
                url: get("DATABASE_URL", "sqlite:tellls.db?mode=rwc"),
                max_connections: parse(
                    "DATABASE_MAX_CONNECTIONS",
                    get("DATABASE_MAX_CONNECTIONS", "5"),
                )?,
            },
            session_secret,
            feed_page_size: match parse("FEED_PAGE_SIZE", get("FEED_PAGE_SIZE", "20"))? {
                0 => {
                    return Err(ConfigError::Invalid {
                        key: "FEED_PAGE_SIZE",
                        value: "0".into(),
                    })
                }
                n => n,
            },
            cors_allowed_origins: get("CORS_ALLOWED_ORIGINS", "*")
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),
        })
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value })
}
