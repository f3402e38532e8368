//! # swipe-core
//!
//! Domain layer for group swipe matching: rooms and their members, the swipe
//! ledger, matches, domain events, and the repository ports the storage
//! adapters implement. Nothing in here knows about PostgreSQL, Redis, or HTTP.

pub mod entities;
pub mod error;
pub mod events;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{consensus_reached, Candidate, CurrentSwipe, Match, Member, Room, SwipeRecord};
pub use error::DomainError;
pub use events::DomainEvent;
pub use traits::{
    CandidateProvider, MatchRepository, MembershipUpdate, RepoResult, RoomRepository,
    SwipeRepository,
};
pub use value_objects::{
    CandidateId, DisplayName, RoomName, RoomPin, Snowflake, SnowflakeGenerator,
    SnowflakeParseError, SwipeAction, UserId,
};
