//! Match database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for matches table
#[derive(Debug, Clone, FromRow)]
pub struct MatchModel {
    pub id: i64,
    pub room_id: i64,
    pub candidate_id: String,
    pub member_ids: Vec<String>,
    pub matched_at: DateTime<Utc>,
    pub is_viewed: bool,
}
