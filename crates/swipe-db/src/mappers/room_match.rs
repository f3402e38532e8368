//! Match entity <-> model mapper

use swipe_core::{CandidateId, DomainError, Match, Snowflake, UserId};

use super::corrupt_row;
use crate::models::MatchModel;

impl TryFrom<MatchModel> for Match {
    type Error = DomainError;

    fn try_from(model: MatchModel) -> Result<Self, Self::Error> {
        let fail = |e| corrupt_row("matches", e);
        Ok(Match {
            id: Snowflake::new(model.id),
            room_id: Snowflake::new(model.room_id),
            candidate_id: CandidateId::parse(model.candidate_id).map_err(fail)?,
            matched_at: model.matched_at,
            member_ids: model
                .member_ids
                .into_iter()
                .map(UserId::parse)
                .collect::<Result<_, _>>()
                .map_err(fail)?,
            is_viewed: model.is_viewed,
        })
    }
}
