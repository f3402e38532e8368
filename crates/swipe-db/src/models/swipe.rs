//! Swipe database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for swipes table
#[derive(Debug, Clone, FromRow)]
pub struct SwipeModel {
    pub room_id: i64,
    pub user_id: String,
    pub candidate_id: String,
    pub action: String,
    pub created_at: DateTime<Utc>,
}
