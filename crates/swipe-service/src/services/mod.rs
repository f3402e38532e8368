//! Business logic services
//!
//! This module contains all service layer implementations that handle
//! business logic, validation, and orchestration of domain operations.

pub mod context;
pub mod error;
pub mod match_cache;
pub mod matcher;
pub mod room;
pub mod room_match;
pub mod swipe;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;

// Re-export all services for convenience
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use match_cache::MatchQueryCache;
pub use matcher::MatchDetector;
pub use room::RoomService;
pub use room_match::MatchService;
pub use swipe::{SwipeReceipt, SwipeService};
pub use sync::{Subscription, SyncService};
