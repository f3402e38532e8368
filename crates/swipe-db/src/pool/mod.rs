//! Database connection pool management

mod postgres;

pub use postgres::{create_pool, default_migrations_dir, run_migrations, DatabaseConfig};
pub use sqlx::PgPool;
