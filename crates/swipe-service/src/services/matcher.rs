//! Match detector
//!
//! Runs after a vote commits and decides whether the room has converged on
//! the candidate. Safe to run any number of times for the same candidate,
//! concurrently or not: the persisted match and the store's
//! (room, candidate) uniqueness are the only dedup.

use std::collections::HashMap;

use swipe_common::retry;
use swipe_core::{
    consensus_reached, CandidateId, DomainError, DomainEvent, Match, Snowflake, SwipeAction, UserId,
};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Match detector
pub struct MatchDetector<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MatchDetector<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Evaluate in the background
    pub fn spawn(
        ctx: ServiceContext,
        room_id: Snowflake,
        candidate_id: CandidateId,
    ) -> JoinHandle<ServiceResult<Option<Match>>> {
        tokio::spawn(async move {
            let outcome = MatchDetector::new(&ctx).evaluate(room_id, &candidate_id).await;
            if let Err(e) = &outcome {
                warn!(
                    error = %e,
                    room_id = %room_id,
                    candidate_id = %candidate_id,
                    "Match evaluation failed"
                );
            }
            outcome
        })
    }

    /// Create the match for `candidate_id` if every current active member
    /// voted positively and there is more than one of them.
    ///
    /// Returns the match only when this call wrote it.
    #[instrument(skip(self))]
    pub async fn evaluate(
        &self,
        room_id: Snowflake,
        candidate_id: &CandidateId,
    ) -> ServiceResult<Option<Match>> {
        let policy = &self.ctx.engine().retry;

        let Some(room) = retry(policy, DomainError::is_transient, || {
            self.ctx.room_repo().find_by_id(room_id)
        })
        .await?
        else {
            return Ok(None);
        };
        let members = room.active_member_ids();

        let votes: HashMap<UserId, SwipeAction> = retry(policy, DomainError::is_transient, || {
            self.ctx.swipe_repo().find_by_candidate(room_id, candidate_id)
        })
        .await?
        .into_iter()
        .map(|swipe| (swipe.user_id, swipe.action))
        .collect();

        if !consensus_reached(&members, &votes) {
            debug!(members = members.len(), votes = votes.len(), "No consensus");
            return Ok(None);
        }

        let existing = retry(policy, DomainError::is_transient, || {
            self.ctx.match_repo().find_by_candidate(room_id, candidate_id)
        })
        .await?;
        if existing.is_some() {
            debug!("Already matched");
            return Ok(None);
        }

        let created = Match::new(self.ctx.generate_id(), room_id, candidate_id.clone(), members);
        match retry(policy, DomainError::is_transient, || {
            self.ctx.match_repo().create(&created)
        })
        .await
        {
            Ok(()) => {}
            Err(DomainError::MatchAlreadyExists) => {
                debug!("Matched by a concurrent evaluation");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        }

        info!(
            room_id = %room_id,
            candidate_id = %candidate_id,
            match_id = %created.id,
            members = created.member_ids.len(),
            "Match created"
        );
        self.ctx.match_cache().evict(room_id);
        self.ctx
            .publish(DomainEvent::match_created(room_id, created.id, candidate_id.clone()))
            .await;

        Ok(Some(created))
    }
}
