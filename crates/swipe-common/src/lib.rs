//! # swipe-common
//!
//! Shared utilities: configuration, the application error type, JWT
//! verification, retry with backoff, and tracing setup.

pub mod auth;
pub mod config;
pub mod error;
pub mod retry;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{Claims, JwtService};
pub use config::{
    AppConfig, AppSettings, ConfigError, CorsConfig, DatabaseConfig, EngineConfig, Environment,
    FeedBackend, JwtConfig, RateLimitConfig, RedisConfig, ServerConfig, SnowflakeConfig,
    StoreBackend,
};
pub use error::{AppError, AppResult, ErrorResponse, TRY_AGAIN_MESSAGE};
pub use retry::{retry, RetryPolicy};
pub use telemetry::{
    init_tracing, init_tracing_with_config, try_init_tracing, try_init_tracing_with_config,
    TracingConfig, TracingError,
};
