//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, ConfigError, CorsConfig, DatabaseConfig, EngineConfig, Environment,
    FeedBackend, JwtConfig, RateLimitConfig, RedisConfig, ServerConfig, SnowflakeConfig,
    StoreBackend,
};
