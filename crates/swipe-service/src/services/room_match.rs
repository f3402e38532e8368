//! Match service
//!
//! Reading a room's matches and marking them as seen.

use swipe_common::retry;
use swipe_core::{DomainError, DomainEvent, Match, Snowflake, UserId};
use tracing::{debug, instrument};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::room::RoomService;

/// Match service
pub struct MatchService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MatchService<'a> {
    /// Create a new MatchService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Most recent matches first, at most `match_list_limit` of them.
    ///
    /// Throttled per room: within the query window every caller gets the
    /// list read by the first one. A new match closes the window early on
    /// the node that wrote it and on every node holding a match
    /// subscription for the room; elsewhere the list can lag by up to one
    /// window.
    ///
    /// The access check is not throttled. It reads the room on every call,
    /// so a member who left loses access at once.
    #[instrument(skip(self))]
    pub async fn get_matches(&self, room_id: Snowflake, viewer: &UserId) -> ServiceResult<Vec<Match>> {
        RoomService::new(self.ctx).get_room(room_id, viewer).await?;

        let matches = self
            .ctx
            .match_cache()
            .get_or_load(room_id, || self.load_recent(room_id))
            .await?;
        Ok(matches.to_vec())
    }

    /// Uncached read of the match window
    pub(crate) async fn load_recent(&self, room_id: Snowflake) -> Result<Vec<Match>, DomainError> {
        let limit = self.ctx.engine().match_list_limit;
        retry(&self.ctx.engine().retry, DomainError::is_transient, || {
            self.ctx.match_repo().list_recent(room_id, limit)
        })
        .await
    }

    /// Mark a match as seen. Allowed for anyone the match was made for and
    /// for current room members. Idempotent.
    #[instrument(skip(self))]
    pub async fn mark_match_viewed(&self, match_id: Snowflake, user_id: UserId) -> ServiceResult<Match> {
        let policy = &self.ctx.engine().retry;

        let mut found = retry(policy, DomainError::is_transient, || {
            self.ctx.match_repo().find_by_id(match_id)
        })
        .await?
        .ok_or(DomainError::MatchNotFound(match_id))?;

        if !found.includes(&user_id) {
            let room = RoomService::new(self.ctx).find_room(found.room_id).await?;
            if !room.is_member(&user_id) {
                return Err(DomainError::NotMatchParticipant.into());
            }
        }

        let changed = retry(policy, DomainError::is_transient, || {
            self.ctx.match_repo().mark_viewed(match_id)
        })
        .await?;
        found.is_viewed = true;

        if changed {
            self.ctx.match_cache().evict(found.room_id);
            self.ctx
                .publish(DomainEvent::match_viewed(found.room_id, match_id, user_id))
                .await;
        } else {
            debug!("Match already viewed");
        }

        Ok(found)
    }
}
