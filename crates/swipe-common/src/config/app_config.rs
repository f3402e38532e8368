//! Application configuration structs
//!
//! Loaded from environment variables (and a `.env` file when present).

use serde::Deserialize;
use std::time::Duration;

use crate::retry::RetryPolicy;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub store: StoreBackend,
    /// Required when `store` is [`StoreBackend::Postgres`]
    pub database: Option<DatabaseConfig>,
    pub feed: FeedBackend,
    /// Required when `feed` is [`FeedBackend::Redis`]
    pub redis: Option<RedisConfig>,
    pub jwt: JwtConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub snowflake: SnowflakeConfig,
    pub engine: EngineConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Where rooms, swipes and matches live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Postgres,
    /// Process-local store; state is lost on restart
    Memory,
}

/// How change notifications travel between server processes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FeedBackend {
    #[default]
    Redis,
    /// In-process broadcast; only correct with a single server process
    Local,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Apply pending migrations at start-up
    #[serde(default)]
    pub run_migrations: bool,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    #[serde(default = "default_redis_max_connections")]
    pub max_connections: u32,
}

/// JWT verification settings
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    /// Clock skew tolerated when checking `exp`, in seconds
    #[serde(default = "default_jwt_leeway")]
    pub leeway_secs: u64,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    #[serde(default = "default_burst")]
    pub burst: u32,
}

/// CORS configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Snowflake ID generator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SnowflakeConfig {
    #[serde(default)]
    pub worker_id: u16,
}

/// Matching engine tuning
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// PIN draws before room creation gives up
    pub pin_max_attempts: u32,
    /// Size of the match window delivered to clients
    pub match_list_limit: i64,
    /// Window during which repeated match queries for a room are coalesced
    pub match_query_throttle: Duration,
    /// Backoff for transient store failures
    pub retry: RetryPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pin_max_attempts: default_pin_max_attempts(),
            match_list_limit: default_match_list_limit(),
            match_query_throttle: Duration::from_secs(default_match_query_throttle_secs()),
            retry: RetryPolicy::default(),
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "swipe-server".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_redis_max_connections() -> u32 {
    10
}

fn default_jwt_leeway() -> u64 {
    30
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_burst() -> u32 {
    50
}

fn default_pin_max_attempts() -> u32 {
    5
}

fn default_match_list_limit() -> i64 {
    50
}

fn default_match_query_throttle_secs() -> u64 {
    20
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key-value source
    ///
    /// # Errors
    /// Returns an error if a required key is missing or a value does not parse
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);

        let store = match vars.get("STORE_BACKEND") {
            None => StoreBackend::default(),
            Some(s) => match s.to_lowercase().as_str() {
                "postgres" => StoreBackend::Postgres,
                "memory" => StoreBackend::Memory,
                _ => return Err(ConfigError::InvalidValue("STORE_BACKEND", s)),
            },
        };

        let feed = match vars.get("FEED_BACKEND") {
            None => FeedBackend::default(),
            Some(s) => match s.to_lowercase().as_str() {
                "redis" => FeedBackend::Redis,
                "local" => FeedBackend::Local,
                _ => return Err(ConfigError::InvalidValue("FEED_BACKEND", s)),
            },
        };

        let database = match (store, vars.get("DATABASE_URL")) {
            (_, Some(url)) => Some(DatabaseConfig {
                url,
                max_connections: vars.parse_or("DATABASE_MAX_CONNECTIONS", default_max_connections)?,
                min_connections: vars.parse_or("DATABASE_MIN_CONNECTIONS", default_min_connections)?,
                run_migrations: vars.parse_or("DATABASE_RUN_MIGRATIONS", || false)?,
            }),
            (StoreBackend::Postgres, None) => return Err(ConfigError::MissingVar("DATABASE_URL")),
            (StoreBackend::Memory, None) => None,
        };

        let redis = match (feed, vars.get("REDIS_URL")) {
            (_, Some(url)) => Some(RedisConfig {
                url,
                max_connections: vars
                    .parse_or("REDIS_MAX_CONNECTIONS", default_redis_max_connections)?,
            }),
            (FeedBackend::Redis, None) => return Err(ConfigError::MissingVar("REDIS_URL")),
            (FeedBackend::Local, None) => None,
        };

        let retry_defaults = RetryPolicy::default();
        let retry = RetryPolicy {
            max_attempts: vars.parse_or("RETRY_MAX_ATTEMPTS", || retry_defaults.max_attempts)?,
            initial: Duration::from_millis(vars.parse_or("RETRY_INITIAL_DELAY_MS", || {
                retry_defaults.initial.as_millis() as u64
            })?),
            max: Duration::from_millis(vars.parse_or("RETRY_MAX_DELAY_MS", || {
                retry_defaults.max.as_millis() as u64
            })?),
            multiplier: retry_defaults.multiplier,
        };
        if retry.max_attempts == 0 {
            return Err(ConfigError::InvalidValue("RETRY_MAX_ATTEMPTS", "0".to_string()));
        }

        let pin_max_attempts = vars.parse_or("PIN_MAX_ATTEMPTS", default_pin_max_attempts)?;
        if pin_max_attempts == 0 {
            return Err(ConfigError::InvalidValue("PIN_MAX_ATTEMPTS", "0".to_string()));
        }

        let worker_id: u16 = vars.parse_or("WORKER_ID", || 0)?;
        if worker_id >= 1024 {
            return Err(ConfigError::InvalidValue("WORKER_ID", worker_id.to_string()));
        }

        Ok(Self {
            app: AppSettings {
                name: vars.get("APP_NAME").unwrap_or_else(default_app_name),
                env: vars
                    .get("APP_ENV")
                    .and_then(|s| match s.to_lowercase().as_str() {
                        "production" => Some(Environment::Production),
                        "staging" => Some(Environment::Staging),
                        "development" => Some(Environment::Development),
                        _ => None,
                    })
                    .unwrap_or_default(),
            },
            api: ServerConfig {
                host: vars.get("API_HOST").unwrap_or_else(default_host),
                port: vars.parse_or("API_PORT", default_port)?,
            },
            store,
            database,
            feed,
            redis,
            jwt: JwtConfig {
                secret: vars.get("JWT_SECRET").ok_or(ConfigError::MissingVar("JWT_SECRET"))?,
                leeway_secs: vars.parse_or("JWT_LEEWAY_SECS", default_jwt_leeway)?,
            },
            rate_limit: RateLimitConfig {
                requests_per_second: vars
                    .parse_or("RATE_LIMIT_REQUESTS_PER_SECOND", default_requests_per_second)?,
                burst: vars.parse_or("RATE_LIMIT_BURST", default_burst)?,
            },
            cors: CorsConfig {
                allowed_origins: vars
                    .get("CORS_ALLOWED_ORIGINS")
                    .map(|s| {
                        s.split(',')
                            .map(str::trim)
                            .filter(|o| !o.is_empty())
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            snowflake: SnowflakeConfig { worker_id },
            engine: EngineConfig {
                pin_max_attempts,
                match_list_limit: vars.parse_or("MATCH_LIST_LIMIT", default_match_list_limit)?,
                match_query_throttle: Duration::from_secs(vars.parse_or(
                    "MATCH_QUERY_THROTTLE_SECS",
                    default_match_query_throttle_secs,
                )?),
                retry,
            },
        })
    }
}

/// Typed access to a key-value source
struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn parse_or<T, D>(&self, key: &'static str, default: D) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        D: FnOnce() -> T,
    {
        match self.get(key) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key, raw)),
            None => Ok(default()),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_memory_backends_need_no_urls() {
        let config = load(&[
            ("STORE_BACKEND", "memory"),
            ("FEED_BACKEND", "local"),
            ("JWT_SECRET", "secret"),
        ])
        .unwrap();

        assert_eq!(config.store, StoreBackend::Memory);
        assert_eq!(config.feed, FeedBackend::Local);
        assert!(config.database.is_none());
        assert!(config.redis.is_none());
        assert_eq!(config.api.address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_postgres_requires_database_url() {
        let err = load(&[("FEED_BACKEND", "local"), ("JWT_SECRET", "s")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("DATABASE_URL")));
    }

    #[test]
    fn test_redis_requires_url() {
        let err = load(&[("STORE_BACKEND", "memory"), ("JWT_SECRET", "s")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("REDIS_URL")));
    }

    #[test]
    fn test_engine_defaults() {
        let config = load(&[
            ("STORE_BACKEND", "memory"),
            ("FEED_BACKEND", "local"),
            ("JWT_SECRET", "s"),
        ])
        .unwrap();

        assert_eq!(config.engine.pin_max_attempts, 5);
        assert_eq!(config.engine.match_list_limit, 50);
        assert_eq!(config.engine.match_query_throttle, Duration::from_secs(20));
        assert_eq!(config.engine.retry.max_attempts, 3);
    }

    #[test]
    fn test_engine_overrides() {
        let config = load(&[
            ("STORE_BACKEND", "postgres"),
            ("DATABASE_URL", "postgres://localhost/swipe"),
            ("DATABASE_RUN_MIGRATIONS", "true"),
            ("FEED_BACKEND", "local"),
            ("JWT_SECRET", "s"),
            ("PIN_MAX_ATTEMPTS", "8"),
            ("MATCH_QUERY_THROTTLE_SECS", "0"),
            ("RETRY_INITIAL_DELAY_MS", "5"),
        ])
        .unwrap();

        let db = config.database.unwrap();
        assert!(db.run_migrations);
        assert_eq!(db.max_connections, 20);
        assert_eq!(config.engine.pin_max_attempts, 8);
        assert_eq!(config.engine.match_query_throttle, Duration::ZERO);
        assert_eq!(config.engine.retry.initial, Duration::from_millis(5));
    }

    #[test]
    fn test_invalid_values_are_reported() {
        let err = load(&[
            ("STORE_BACKEND", "mongo"),
            ("JWT_SECRET", "s"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("STORE_BACKEND", _)));

        let err = load(&[
            ("STORE_BACKEND", "memory"),
            ("FEED_BACKEND", "local"),
            ("JWT_SECRET", "s"),
            ("WORKER_ID", "4096"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("WORKER_ID", _)));
    }

    #[test]
    fn test_environment_flags() {
        assert!(Environment::Production.is_production());
        assert!(!Environment::Staging.is_production());
        assert!(Environment::Development.is_development());
    }
}
