//! Request DTOs for API endpoints
//!
//! Field checks here are coarse shape checks. Trimming, PIN format and
//! display-name sanitizing happen in the domain parsers.

use serde::Deserialize;
use swipe_core::SwipeAction;
use validator::Validate;

// ============================================================================
// Room Requests
// ============================================================================

/// Create room request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRoomRequest {
    #[validate(length(min = 1, max = 100, message = "Room name must be 1-100 characters"))]
    pub name: String,

    /// Name the owner shows up under
    #[validate(length(min = 1, max = 100, message = "Display name must be 1-100 characters"))]
    pub display_name: String,
}

/// Join room by PIN request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct JoinRoomRequest {
    #[validate(length(min = 1, max = 16, message = "PIN is required"))]
    pub pin: String,

    #[validate(length(min = 1, max = 100, message = "Display name must be 1-100 characters"))]
    pub display_name: String,
}

// ============================================================================
// Swipe Requests
// ============================================================================

/// Vote on a candidate. The candidate id travels in the path.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SwipeRequest {
    pub action: SwipeAction,
}
