//! Swipe record - the immutable ledger entry for one vote

use chrono::{DateTime, Utc};

use crate::entities::CurrentSwipe;
use crate::value_objects::{CandidateId, Snowflake, SwipeAction, UserId};

/// One member's vote on one candidate.
///
/// At most one record exists per `(room_id, user_id, candidate_id)`; a record
/// is never updated once written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwipeRecord {
    pub room_id: Snowflake,
    pub user_id: UserId,
    pub candidate_id: CandidateId,
    pub action: SwipeAction,
    pub created_at: DateTime<Utc>,
}

impl SwipeRecord {
    pub fn new(
        room_id: Snowflake,
        user_id: UserId,
        candidate_id: CandidateId,
        action: SwipeAction,
    ) -> Self {
        Self {
            room_id,
            user_id,
            candidate_id,
            action,
            created_at: Utc::now(),
        }
    }

    /// The member-level cache entry this record produces
    pub fn as_current_swipe(&self) -> CurrentSwipe {
        CurrentSwipe {
            candidate_id: self.candidate_id.clone(),
            action: self.action,
            swiped_at: self.created_at,
        }
    }
}
