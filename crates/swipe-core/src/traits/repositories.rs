//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer states what it needs from the persistent store and the
//! infrastructure layer provides it. Implementations must classify their
//! failures into [`DomainError`] variants: unique-constraint races become the
//! conflict variants, availability problems become
//! [`DomainError::TransientStore`].

use async_trait::async_trait;

use crate::entities::{Candidate, Match, Member, Room, SwipeRecord};
use crate::error::DomainError;
use crate::value_objects::{CandidateId, RoomPin, Snowflake, UserId};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

/// Outcome of a transactional membership change
#[derive(Debug, Clone)]
pub struct MembershipUpdate {
    /// Room as committed
    pub room: Room,
    /// `false` when the call was a no-op (already a member, or not a member)
    pub changed: bool,
}

// ============================================================================
// Room Repository
// ============================================================================

#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Find a room by ID, active or not
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Room>>;

    /// Find the active room currently holding a PIN
    async fn find_active_by_pin(&self, pin: &RoomPin) -> RepoResult<Option<Room>>;

    /// Check whether an active room holds the PIN
    async fn pin_in_use(&self, pin: &RoomPin) -> RepoResult<bool>;

    /// Insert a new room together with its members.
    ///
    /// Fails with [`DomainError::PinCollision`] if another active room took
    /// the PIN in the meantime.
    async fn create(&self, room: &Room) -> RepoResult<()>;

    /// Append a member under a room-level lock.
    ///
    /// Fails with [`DomainError::RoomNotFound`] if the room is missing or no
    /// longer active. Adding an existing member is a no-op.
    async fn add_member(&self, room_id: Snowflake, member: &Member) -> RepoResult<MembershipUpdate>;

    /// Remove a member under a room-level lock, deactivating the room when
    /// its last member leaves. Removing a non-member is a no-op.
    async fn remove_member(&self, room_id: Snowflake, user_id: &UserId)
        -> RepoResult<MembershipUpdate>;
}

// ============================================================================
// Swipe Repository
// ============================================================================

#[async_trait]
pub trait SwipeRepository: Send + Sync {
    /// Check whether a vote exists for the key
    async fn exists(
        &self,
        room_id: Snowflake,
        user_id: &UserId,
        candidate_id: &CandidateId,
    ) -> RepoResult<bool>;

    /// Insert the record and update the member's `current_swipe` in one
    /// transaction.
    ///
    /// Fails with [`DomainError::DuplicateSwipe`] if the key already exists,
    /// [`DomainError::NotRoomMember`] if the voter is not an active member, or
    /// [`DomainError::RoomNotFound`] if the room is gone or inactive.
    async fn record(&self, swipe: &SwipeRecord) -> RepoResult<()>;

    /// All votes on one candidate in a room
    async fn find_by_candidate(
        &self,
        room_id: Snowflake,
        candidate_id: &CandidateId,
    ) -> RepoResult<Vec<SwipeRecord>>;

    /// Full vote history of a room, oldest first
    async fn find_by_room(&self, room_id: Snowflake) -> RepoResult<Vec<SwipeRecord>>;
}

// ============================================================================
// Match Repository
// ============================================================================

#[async_trait]
pub trait MatchRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Match>>;

    /// Find the match for a candidate, if the room already converged on it
    async fn find_by_candidate(
        &self,
        room_id: Snowflake,
        candidate_id: &CandidateId,
    ) -> RepoResult<Option<Match>>;

    /// Insert a match.
    ///
    /// Fails with [`DomainError::MatchAlreadyExists`] if one exists for the
    /// same `(room_id, candidate_id)`.
    async fn create(&self, m: &Match) -> RepoResult<()>;

    /// Most recent matches first, at most `limit`
    async fn list_recent(&self, room_id: Snowflake, limit: i64) -> RepoResult<Vec<Match>>;

    /// Set `is_viewed`; returns `false` if it was already set
    async fn mark_viewed(&self, id: Snowflake) -> RepoResult<bool>;
}

// ============================================================================
// Candidate Provider
// ============================================================================

/// Source of the ordered candidate queue for a room.
///
/// Ranking and filtering happen on the provider's side; the engine consumes
/// the sequence as given.
#[async_trait]
pub trait CandidateProvider: Send + Sync {
    async fn candidates(&self, room_id: Snowflake) -> RepoResult<Vec<Candidate>>;
}
