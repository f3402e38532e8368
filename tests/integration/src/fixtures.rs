//! Test fixtures and wire types
//!
//! Request bodies the tests send and the response shapes they read back.

use serde::{Deserialize, Serialize};

/// A user id nobody else in the test run will use
pub fn unique_user(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4().simple())
}

/// `{"data": ...}` envelope around every successful response
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// `{"error": {...}}` body of every failed response
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// Create room request
#[derive(Debug, Serialize)]
pub struct CreateRoomRequest {
    pub name: String,
    pub display_name: String,
}

impl CreateRoomRequest {
    pub fn new(name: &str, display_name: &str) -> Self {
        Self {
            name: name.to_string(),
            display_name: display_name.to_string(),
        }
    }
}

/// Join room request
#[derive(Debug, Serialize)]
pub struct JoinRoomRequest {
    pub pin: String,
    pub display_name: String,
}

impl JoinRoomRequest {
    pub fn new(pin: &str, display_name: &str) -> Self {
        Self {
            pin: pin.to_string(),
            display_name: display_name.to_string(),
        }
    }
}

/// Swipe request
#[derive(Debug, Serialize)]
pub struct SwipeRequest {
    pub action: String,
}

impl SwipeRequest {
    pub fn like() -> Self {
        Self::action("like")
    }

    pub fn dislike() -> Self {
        Self::action("dislike")
    }

    pub fn action(action: &str) -> Self {
        Self {
            action: action.to_string(),
        }
    }
}

/// Room response
#[derive(Debug, Deserialize)]
pub struct RoomResponse {
    pub id: String,
    pub pin: String,
    pub name: String,
    pub owner_id: String,
    pub members: Vec<MemberResponse>,
    pub is_active: bool,
}

impl RoomResponse {
    pub fn active_member_ids(&self) -> Vec<&str> {
        self.members
            .iter()
            .filter(|m| m.is_active)
            .map(|m| m.user_id.as_str())
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct MemberResponse {
    pub user_id: String,
    pub display_name: String,
    pub is_active: bool,
    pub current_swipe: Option<CurrentSwipeResponse>,
}

#[derive(Debug, Deserialize)]
pub struct CurrentSwipeResponse {
    pub candidate_id: String,
    pub action: String,
}

/// Swipe response
#[derive(Debug, Deserialize)]
pub struct SwipeResponse {
    pub room_id: String,
    pub candidate_id: String,
    pub action: String,
    pub recorded: bool,
}

/// Match response
#[derive(Debug, Deserialize)]
pub struct MatchResponse {
    pub id: String,
    pub room_id: String,
    pub candidate_id: String,
    pub member_ids: Vec<String>,
    pub is_viewed: bool,
}
