//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `EMPORIUM_TOKEN_SECRET` - Bearer token signing secret (min 32 chars, high entropy)
//! - `EMPORIUM_MONGODB_URL` - MongoDB connection string, falls back to
//!   `MONGODB_URL` (only when `EMPORIUM_STORE=mongodb`)
//!
//! ## Optional
//! - `EMPORIUM_HOST` - Bind address (default: 127.0.0.1)
//! - `EMPORIUM_PORT` - Listen port (default: 8000)
//! - `EMPORIUM_STORE` - `mongodb` or `memory` (default: mongodb)
//! - `EMPORIUM_DATABASE` - Database name (default: Ecommerce)
//! - `EMPORIUM_STORE_TIMEOUT_SECS` - Per-call store timeout, 1-60 (default: 5)
//! - `EMPORIUM_ACCESS_TOKEN_TTL_HOURS` - Access token lifetime, 1-8760 (default: 24)
//! - `EMPORIUM_REFRESH_TOKEN_TTL_HOURS` - Refresh token lifetime, 1-8760 (default: 168)
//! - `EMPORIUM_LOG_FORMAT` - `pretty` or `json` (default: pretty)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_TOKEN_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const MAX_STORE_TIMEOUT_SECS: u64 = 60;
const MAX_TOKEN_TTL_HOURS: u64 = 8760;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Which document store backs the API
    pub store: StoreConfig,
    /// HS256 signing secret for bearer tokens
    pub token_secret: SecretString,
    /// Lifetimes of issued tokens
    pub token_ttl: TokenTtl,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag (e.g. "production")
    pub sentry_environment: Option<String>,
}

/// Document store selection.
#[derive(Debug, Clone)]
pub enum StoreConfig {
    /// MongoDB deployment.
    MongoDb(MongoConfig),
    /// In-process store; data is lost on restart.
    Memory,
}

/// MongoDB connection settings.
///
/// Implements `Debug` manually to redact the connection string, which
/// usually embeds credentials.
#[derive(Clone)]
pub struct MongoConfig {
    /// Connection string
    pub url: SecretString,
    /// Database holding the `Users` and `Products` collections
    pub database: String,
    /// Upper bound on every individual store call
    pub timeout: Duration,
}

impl std::fmt::Debug for MongoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MongoConfig")
            .field("url", &"[REDACTED]")
            .field("database", &self.database)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Lifetimes of the access/refresh pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenTtl {
    pub access: Duration,
    pub refresh: Duration,
}

impl Default for TokenTtl {
    fn default() -> Self {
        Self {
            access: Duration::from_secs(24 * 3600),
            refresh: Duration::from_secs(168 * 3600),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, for terminals.
    #[default]
    Pretty,
    /// One JSON object per line, for log shippers.
    Json,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(&lookup);

        let host = env
            .or_default("EMPORIUM_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("EMPORIUM_HOST".to_string(), e.to_string()))?;
        let port = env
            .or_default("EMPORIUM_PORT", "8000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("EMPORIUM_PORT".to_string(), e.to_string()))?;

        let store = StoreConfig::from_env(&env)?;

        let token_secret = env.validated_secret("EMPORIUM_TOKEN_SECRET")?;
        validate_secret_length(&token_secret, "EMPORIUM_TOKEN_SECRET")?;

        let token_ttl = TokenTtl {
            access: env.hours("EMPORIUM_ACCESS_TOKEN_TTL_HOURS", 24)?,
            refresh: env.hours("EMPORIUM_REFRESH_TOKEN_TTL_HOURS", 168)?,
        };

        let log_format = match env.or_default("EMPORIUM_LOG_FORMAT", "pretty").as_str() {
            "pretty" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "EMPORIUM_LOG_FORMAT".to_string(),
                    format!("expected 'pretty' or 'json', got '{other}'"),
                ));
            }
        };

        Ok(Self {
            host,
            port,
            store,
            token_secret,
            token_ttl,
            log_format,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl StoreConfig {
    fn from_env(env: &Env<'_>) -> Result<Self, ConfigError> {
        match env.or_default("EMPORIUM_STORE", "mongodb").as_str() {
            "memory" => Ok(Self::Memory),
            "mongodb" => {
                let url = env
                    .optional("EMPORIUM_MONGODB_URL")
                    .or_else(|| env.optional("MONGODB_URL"))
                    .map(SecretString::from)
                    .ok_or_else(|| ConfigError::MissingEnvVar("EMPORIUM_MONGODB_URL".to_string()))?;

                let timeout_secs = env
                    .or_default("EMPORIUM_STORE_TIMEOUT_SECS", "5")
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| (1..=MAX_STORE_TIMEOUT_SECS).contains(secs))
                    .ok_or_else(|| {
                        ConfigError::InvalidEnvVar(
                            "EMPORIUM_STORE_TIMEOUT_SECS".to_string(),
                            format!("must be an integer between 1 and {MAX_STORE_TIMEOUT_SECS}"),
                        )
                    })?;

                Ok(Self::MongoDb(MongoConfig {
                    url,
                    database: env.or_default("EMPORIUM_DATABASE", "Ecommerce"),
                    timeout: Duration::from_secs(timeout_secs),
                }))
            }
            other => Err(ConfigError::InvalidEnvVar(
                "EMPORIUM_STORE".to_string(),
                format!("expected 'mongodb' or 'memory', got '{other}'"),
            )),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable source used while loading.
struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    /// Get an optional variable; empty values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.is_empty())
    }

    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Get a lifetime given in whole hours.
    fn hours(&self, key: &str, default: u64) -> Result<Duration, ConfigError> {
        match self.optional(key) {
            None => Ok(Duration::from_secs(default * 3600)),
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|hours| (1..=MAX_TOKEN_TTL_HOURS).contains(hours))
                .map(|hours| Duration::from_secs(hours * 3600))
                .ok_or_else(|| {
                    ConfigError::InvalidEnvVar(
                        key.to_string(),
                        format!("must be an integer between 1 and {MAX_TOKEN_TTL_HOURS}"),
                    )
                }),
        }
    }

    /// Load and validate a secret.
    fn validated_secret(&self, key: &str) -> Result<SecretString, ConfigError> {
        let value = self.required(key)?;
        validate_secret_strength(&value, key)?;
        Ok(SecretString::from(value))
    }
}

/// Validate that a secret meets minimum length requirements.
fn validate_secret_length(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_TOKEN_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_TOKEN_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}
