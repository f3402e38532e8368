//! SwipeRecord entity <-> model mapper

use swipe_core::{CandidateId, DomainError, Snowflake, SwipeAction, SwipeRecord, UserId};

use super::corrupt_row;
use crate::models::SwipeModel;

impl TryFrom<SwipeModel> for SwipeRecord {
    type Error = DomainError;

    fn try_from(model: SwipeModel) -> Result<Self, Self::Error> {
        let fail = |e| corrupt_row("swipes", e);
        Ok(SwipeRecord {
            room_id: Snowflake::new(model.room_id),
            user_id: UserId::parse(model.user_id).map_err(fail)?,
            candidate_id: CandidateId::parse(model.candidate_id).map_err(fail)?,
            action: model.action.parse::<SwipeAction>().map_err(fail)?,
            created_at: model.created_at,
        })
    }
}
