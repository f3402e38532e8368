//! Domain events - emitted after a state change commits
//!
//! Events carry identifiers only. Subscribers treat them as "something
//! changed" signals and re-read the store, so a lost or duplicated event
//! never corrupts a client's view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{CandidateId, Snowflake, SwipeAction, UserId};

/// All possible domain events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DomainEvent {
    // =========================================================================
    // Room Events
    // =========================================================================
    RoomCreated(RoomCreatedEvent),
    MemberJoined(MemberJoinedEvent),
    MemberLeft(MemberLeftEvent),
    RoomDeactivated(RoomDeactivatedEvent),
    SwipeRecorded(SwipeRecordedEvent),

    // =========================================================================
    // Match Events
    // =========================================================================
    MatchCreated(MatchCreatedEvent),
    MatchViewed(MatchViewedEvent),
}

impl DomainEvent {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::RoomCreated(_) => "ROOM_CREATED",
            Self::MemberJoined(_) => "MEMBER_JOINED",
            Self::MemberLeft(_) => "MEMBER_LEFT",
            Self::RoomDeactivated(_) => "ROOM_DEACTIVATED",
            Self::SwipeRecorded(_) => "SWIPE_RECORDED",
            Self::MatchCreated(_) => "MATCH_CREATED",
            Self::MatchViewed(_) => "MATCH_VIEWED",
        }
    }

    /// Room the event belongs to; every event is scoped to exactly one
    pub fn room_id(&self) -> Snowflake {
        match self {
            Self::RoomCreated(e) => e.room_id,
            Self::MemberJoined(e) => e.room_id,
            Self::MemberLeft(e) => e.room_id,
            Self::RoomDeactivated(e) => e.room_id,
            Self::SwipeRecorded(e) => e.room_id,
            Self::MatchCreated(e) => e.room_id,
            Self::MatchViewed(e) => e.room_id,
        }
    }

    /// Get the timestamp of the event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::RoomCreated(e) => e.timestamp,
            Self::MemberJoined(e) => e.timestamp,
            Self::MemberLeft(e) => e.timestamp,
            Self::RoomDeactivated(e) => e.timestamp,
            Self::SwipeRecorded(e) => e.timestamp,
            Self::MatchCreated(e) => e.timestamp,
            Self::MatchViewed(e) => e.timestamp,
        }
    }

    /// Whether the room document (membership, active flag, swipe caches) changed
    pub fn touches_room(&self) -> bool {
        !self.touches_matches()
    }

    /// Whether the room's match list changed
    pub fn touches_matches(&self) -> bool {
        matches!(self, Self::MatchCreated(_) | Self::MatchViewed(_))
    }

    pub fn room_created(room_id: Snowflake, owner_id: UserId) -> Self {
        Self::RoomCreated(RoomCreatedEvent {
            room_id,
            owner_id,
            timestamp: Utc::now(),
        })
    }

    pub fn member_joined(room_id: Snowflake, user_id: UserId) -> Self {
        Self::MemberJoined(MemberJoinedEvent {
            room_id,
            user_id,
            timestamp: Utc::now(),
        })
    }

    pub fn member_left(room_id: Snowflake, user_id: UserId) -> Self {
        Self::MemberLeft(MemberLeftEvent {
            room_id,
            user_id,
            timestamp: Utc::now(),
        })
    }

    pub fn room_deactivated(room_id: Snowflake) -> Self {
        Self::RoomDeactivated(RoomDeactivatedEvent {
            room_id,
            timestamp: Utc::now(),
        })
    }

    pub fn swipe_recorded(
        room_id: Snowflake,
        user_id: UserId,
        candidate_id: CandidateId,
        action: SwipeAction,
    ) -> Self {
        Self::SwipeRecorded(SwipeRecordedEvent {
            room_id,
            user_id,
            candidate_id,
            action,
            timestamp: Utc::now(),
        })
    }

    pub fn match_created(room_id: Snowflake, match_id: Snowflake, candidate_id: CandidateId) -> Self {
        Self::MatchCreated(MatchCreatedEvent {
            room_id,
            match_id,
            candidate_id,
            timestamp: Utc::now(),
        })
    }

    pub fn match_viewed(room_id: Snowflake, match_id: Snowflake, user_id: UserId) -> Self {
        Self::MatchViewed(MatchViewedEvent {
            room_id,
            match_id,
            user_id,
            timestamp: Utc::now(),
        })
    }
}

// ============================================================================
// Event Structs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomCreatedEvent {
    pub room_id: Snowflake,
    pub owner_id: UserId,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberJoinedEvent {
    pub room_id: Snowflake,
    pub user_id: UserId,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberLeftEvent {
    pub room_id: Snowflake,
    pub user_id: UserId,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomDeactivatedEvent {
    pub room_id: Snowflake,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwipeRecordedEvent {
    pub room_id: Snowflake,
    pub user_id: UserId,
    pub candidate_id: CandidateId,
    pub action: SwipeAction,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCreatedEvent {
    pub room_id: Snowflake,
    pub match_id: Snowflake,
    pub candidate_id: CandidateId,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchViewedEvent {
    pub room_id: Snowflake,
    pub match_id: Snowflake,
    pub user_id: UserId,
    pub timestamp: DateTime<Utc>,
}
