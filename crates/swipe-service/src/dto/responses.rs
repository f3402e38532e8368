//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output.
//! Snowflake IDs are serialized as strings for JavaScript compatibility.

use chrono::{DateTime, Utc};
use serde::Serialize;
use swipe_common::ErrorResponse;
use swipe_core::SwipeAction;

// ============================================================================
// Common Response Types
// ============================================================================

/// Generic API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

// ============================================================================
// Room Responses
// ============================================================================

/// Room with its full member list
#[derive(Debug, Clone, Serialize)]
pub struct RoomResponse {
    pub id: String,
    pub pin: String,
    pub name: String,
    pub owner_id: String,
    pub members: Vec<MemberResponse>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberResponse {
    pub user_id: String,
    pub display_name: String,
    pub joined_at: DateTime<Utc>,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_swipe: Option<CurrentSwipeResponse>,
}

/// Member's latest vote
#[derive(Debug, Clone, Serialize)]
pub struct CurrentSwipeResponse {
    pub candidate_id: String,
    pub action: SwipeAction,
    pub swiped_at: DateTime<Utc>,
}

// ============================================================================
// Swipe / Match Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct SwipeResponse {
    pub room_id: String,
    pub candidate_id: String,
    pub action: SwipeAction,
    /// False when the vote already existed
    pub recorded: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchResponse {
    pub id: String,
    pub room_id: String,
    pub candidate_id: String,
    pub matched_at: DateTime<Utc>,
    pub member_ids: Vec<String>,
    pub is_viewed: bool,
}

// ============================================================================
// Feed Frames
// ============================================================================

/// Frame pushed over the room feed WebSocket
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedFrame {
    RoomUpdate(RoomResponse),
    MatchesUpdate(Vec<MatchResponse>),
    Error(ErrorResponse),
}

// ============================================================================
// Health Responses
// ============================================================================

/// Basic health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

/// Status of each backing service
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub store: String,
    pub feed: String,
}

impl ReadinessResponse {
    pub fn ready(store_healthy: bool, feed_healthy: bool) -> Self {
        let label = |healthy: bool| if healthy { "healthy" } else { "unhealthy" }.to_string();
        Self {
            status: if store_healthy && feed_healthy { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                store: label(store_healthy),
                feed: label(feed_healthy),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}
