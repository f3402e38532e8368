//! Room database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for rooms table
#[derive(Debug, Clone, FromRow)]
pub struct RoomModel {
    pub id: i64,
    pub pin: String,
    pub name: String,
    pub owner_id: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database model for room_members table.
///
/// The three `current_*` columns are either all set or all null.
#[derive(Debug, Clone, FromRow)]
pub struct RoomMemberModel {
    pub room_id: i64,
    pub user_id: String,
    pub display_name: String,
    pub joined_at: DateTime<Utc>,
    pub is_active: bool,
    pub current_candidate_id: Option<String>,
    pub current_action: Option<String>,
    pub current_swiped_at: Option<DateTime<Utc>>,
}
