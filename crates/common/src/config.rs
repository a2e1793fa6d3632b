//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Anonymous session configuration.
    #[serde(default)]
    pub session: SessionConfig,
    /// Listing pagination configuration.
    #[serde(default)]
    pub pagination: PaginationConfig,
    /// Administrator created at startup when missing.
    #[serde(default)]
    pub admin: Option<AdminConfig>,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Anonymous session configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Name of the cookie carrying the session key.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Session lifetime in days.
    #[serde(default = "default_ttl_days")]
    pub ttl_days: i64,
    /// Whether the cookie is marked `Secure`.
    #[serde(default)]
    pub secure_cookie: bool,
}

/// Pagination limits for list endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationConfig {
    /// Page size when the request gives none.
    #[serde(default = "default_limit")]
    pub default_limit: u64,
    /// Largest page size a request may ask for.
    #[serde(default = "default_max_limit")]
    pub max_limit: u64,
}

/// Bootstrap administrator credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    pub username: String,
    pub password: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            ttl_days: default_ttl_days(),
            secure_cookie: false,
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

impl PaginationConfig {
    /// Resolve a requested page size against the configured bounds.
    #[must_use]
    pub fn clamp(&self, requested: Option<u64>) -> u64 {
        requested
            .unwrap_or(self.default_limit)
            .max(1)
            .min(self.max_limit)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

fn default_cookie_name() -> String {
    "sessionid".to_string()
}

const fn default_ttl_days() -> i64 {
    14
}

const fn default_limit() -> u64 {
    20
}

const fn default_max_limit() -> u64 {
    100
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `SURVEY_ENV`)
    /// 3. Environment variables with `SURVEY_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("SURVEY_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("SURVEY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("SURVEY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
