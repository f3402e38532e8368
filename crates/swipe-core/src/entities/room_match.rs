//! Match entity - the group converged on a candidate

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::value_objects::{CandidateId, Snowflake, SwipeAction, UserId};

/// At most one exists per `(room_id, candidate_id)`. `is_viewed` is the only
/// field that changes after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub id: Snowflake,
    pub room_id: Snowflake,
    pub candidate_id: CandidateId,
    pub matched_at: DateTime<Utc>,
    /// Active members at evaluation time, in join order
    pub member_ids: Vec<UserId>,
    pub is_viewed: bool,
}

impl Match {
    pub fn new(
        id: Snowflake,
        room_id: Snowflake,
        candidate_id: CandidateId,
        member_ids: Vec<UserId>,
    ) -> Self {
        Self {
            id,
            room_id,
            candidate_id,
            matched_at: Utc::now(),
            member_ids,
            is_viewed: false,
        }
    }

    #[inline]
    pub fn includes(&self, user_id: &UserId) -> bool {
        self.member_ids.contains(user_id)
    }
}

/// Decide whether a candidate is a match for the given active membership.
///
/// True iff there is more than one active member, every one of them has
/// voted, and every vote is positive. Votes from users outside
/// `active_members` are ignored.
pub fn consensus_reached(active_members: &[UserId], votes: &HashMap<UserId, SwipeAction>) -> bool {
    active_members.len() > 1
        && active_members
            .iter()
            .all(|user| votes.get(user).is_some_and(|action| action.is_positive()))
}
