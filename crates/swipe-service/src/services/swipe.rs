//! Swipe service
//!
//! Writes votes to the ledger at most once per (room, user, candidate) and
//! hands every first write to the match detector.

use swipe_common::retry;
use swipe_core::{CandidateId, DomainError, DomainEvent, Match, Snowflake, SwipeAction, SwipeRecord, UserId};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::matcher::MatchDetector;

/// Outcome of [`SwipeService::submit_swipe`]
#[derive(Debug)]
pub struct SwipeReceipt {
    recorded: bool,
    evaluation: Option<JoinHandle<ServiceResult<Option<Match>>>>,
}

impl SwipeReceipt {
    fn already_recorded() -> Self {
        Self {
            recorded: false,
            evaluation: None,
        }
    }

    /// `false` when the vote already existed and nothing was written
    pub fn recorded(&self) -> bool {
        self.recorded
    }

    /// Wait for the match evaluation this swipe triggered, if any.
    /// Yields the match only if this evaluation created it.
    pub async fn evaluated(self) -> ServiceResult<Option<Match>> {
        match self.evaluation {
            None => Ok(None),
            Some(handle) => handle
                .await
                .map_err(|e| ServiceError::internal(format!("match evaluation task failed: {e}")))?,
        }
    }
}

/// Swipe service
pub struct SwipeService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> SwipeService<'a> {
    /// Create a new SwipeService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Record a vote. Idempotent: repeating a vote, with any action, leaves
    /// the first one in place and succeeds.
    ///
    /// The write runs on its own task, so dropping the returned future does
    /// not abort a write that already started.
    #[instrument(skip(self, candidate_id))]
    pub async fn submit_swipe(
        &self,
        room_id: Snowflake,
        user_id: UserId,
        candidate_id: &str,
        action: SwipeAction,
    ) -> ServiceResult<SwipeReceipt> {
        let candidate_id = CandidateId::parse(candidate_id)?;
        let swipe = SwipeRecord::new(room_id, user_id, candidate_id, action);

        let ctx = self.ctx.clone();
        tokio::spawn(async move { SwipeService::new(&ctx).write(swipe).await })
            .await
            .map_err(|e| ServiceError::internal(format!("swipe task failed: {e}")))?
    }

    async fn write(&self, swipe: SwipeRecord) -> ServiceResult<SwipeReceipt> {
        let policy = &self.ctx.engine().retry;

        let room = retry(policy, DomainError::is_transient, || {
            self.ctx.room_repo().find_by_id(swipe.room_id)
        })
        .await?
        .filter(|room| room.is_active)
        .ok_or(DomainError::RoomNotFound(swipe.room_id))?;
        if !room.is_member(&swipe.user_id) {
            return Err(DomainError::NotRoomMember.into());
        }

        let exists = retry(policy, DomainError::is_transient, || {
            self.ctx
                .swipe_repo()
                .exists(swipe.room_id, &swipe.user_id, &swipe.candidate_id)
        })
        .await?;
        if exists {
            debug!(candidate_id = %swipe.candidate_id, "Swipe already recorded");
            return Ok(SwipeReceipt::already_recorded());
        }

        let recorded = match retry(policy, DomainError::is_transient, || {
            self.ctx.swipe_repo().record(&swipe)
        })
        .await
        {
            Ok(()) => true,
            // A racing duplicate, or our own earlier attempt whose commit
            // outlived its connection
            Err(DomainError::DuplicateSwipe) => {
                debug!(candidate_id = %swipe.candidate_id, "Swipe recorded concurrently");
                false
            }
            Err(e) => return Err(e.into()),
        };

        if recorded {
            info!(
                room_id = %swipe.room_id,
                user_id = %swipe.user_id,
                candidate_id = %swipe.candidate_id,
                action = %swipe.action,
                "Swipe recorded"
            );
            self.ctx
                .publish(DomainEvent::swipe_recorded(
                    swipe.room_id,
                    swipe.user_id.clone(),
                    swipe.candidate_id.clone(),
                    swipe.action,
                ))
                .await;
        }

        let evaluation = MatchDetector::spawn(self.ctx.clone(), swipe.room_id, swipe.candidate_id);
        Ok(SwipeReceipt {
            recorded,
            evaluation: Some(evaluation),
        })
    }
}
