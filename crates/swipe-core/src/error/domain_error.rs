//! Domain errors - error types for the domain layer
//!
//! Storage adapters classify their failures into these variants before they
//! reach the services, so callers never see driver-specific errors.

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Room not found: {0}")]
    RoomNotFound(Snowflake),

    #[error("No active room with PIN {0}")]
    PinNotFound(String),

    #[error("Match not found: {0}")]
    MatchNotFound(Snowflake),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("PIN must be exactly 6 digits")]
    InvalidPin,

    #[error("Invalid room name: {0}")]
    InvalidRoomName(String),

    #[error("Invalid display name: {0}")]
    InvalidDisplayName(String),

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Not a member of this room")]
    NotRoomMember,

    #[error("Not a participant of this match")]
    NotMatchParticipant,

    // =========================================================================
    // Conflict Errors (unique-constraint races)
    // =========================================================================
    #[error("PIN already held by an active room")]
    PinCollision,

    #[error("Swipe already recorded")]
    DuplicateSwipe,

    #[error("Match already exists for this candidate")]
    MatchAlreadyExists,

    // =========================================================================
    // Availability Errors
    // =========================================================================
    #[error("Could not allocate a free room PIN after {attempts} attempts")]
    PinSpaceExhausted { attempts: u32 },

    #[error("Store temporarily unavailable: {0}")]
    TransientStore(String),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::RoomNotFound(_) => "UNKNOWN_ROOM",
            Self::PinNotFound(_) => "UNKNOWN_PIN",
            Self::MatchNotFound(_) => "UNKNOWN_MATCH",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidPin => "INVALID_PIN",
            Self::InvalidRoomName(_) => "INVALID_ROOM_NAME",
            Self::InvalidDisplayName(_) => "INVALID_DISPLAY_NAME",

            // Authorization
            Self::NotRoomMember => "NOT_ROOM_MEMBER",
            Self::NotMatchParticipant => "NOT_MATCH_PARTICIPANT",

            // Conflict
            Self::PinCollision => "PIN_COLLISION",
            Self::DuplicateSwipe => "DUPLICATE_SWIPE",
            Self::MatchAlreadyExists => "MATCH_ALREADY_EXISTS",

            // Availability
            Self::PinSpaceExhausted { .. } => "PIN_SPACE_EXHAUSTED",
            Self::TransientStore(_) => "SERVICE_UNAVAILABLE",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::RoomNotFound(_) | Self::PinNotFound(_) | Self::MatchNotFound(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::InvalidPin
                | Self::InvalidRoomName(_)
                | Self::InvalidDisplayName(_)
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::NotRoomMember | Self::NotMatchParticipant)
    }

    /// Check if this is a unique-constraint conflict
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::PinCollision | Self::DuplicateSwipe | Self::MatchAlreadyExists
        )
    }

    /// Store-level availability failure; safe to retry on idempotent paths
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransientStore(_))
    }

    /// The caller may retry the whole request later
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientStore(_) | Self::PinSpaceExhausted { .. })
    }
}
