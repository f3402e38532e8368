//! # swipe-db
//!
//! Storage layer implementing the swipe-core repository traits.
//!
//! ## Overview
//!
//! - PostgreSQL connection pool and schema migrations
//! - Database models with SQLx `FromRow` derives
//! - Model -> entity mappers
//! - PostgreSQL repositories (`Pg*Repository`)
//! - [`MemoryStore`], an in-process implementation of the same contracts
//!
//! ## Usage
//!
//! ```rust,ignore
//! use swipe_db::{create_pool, DatabaseConfig, PgRoomRepository};
//! use swipe_core::RoomRepository;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&DatabaseConfig::default()).await?;
//!     let rooms = PgRoomRepository::new(pool);
//!     let room = rooms.find_by_id(swipe_core::Snowflake::new(1)).await?;
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use memory::MemoryStore;
pub use pool::{create_pool, default_migrations_dir, run_migrations, DatabaseConfig, PgPool};
pub use repositories::{PgMatchRepository, PgRoomRepository, PgSwipeRepository};
