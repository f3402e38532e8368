//! Room service
//!
//! Creating rooms under a fresh PIN, joining by PIN, leaving, and reading a
//! room as one of its members.

use swipe_common::retry;
use swipe_core::{
    DisplayName, DomainError, DomainEvent, Member, Room, RoomName, RoomPin, Snowflake, UserId,
};
use tracing::{debug, info, instrument};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Room service
pub struct RoomService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> RoomService<'a> {
    /// Create a new RoomService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create a room owned by `owner_id`, who becomes its first member.
    ///
    /// A PIN held by another active room is never reused; after
    /// `pin_max_attempts` draws the call fails with
    /// [`DomainError::PinSpaceExhausted`].
    #[instrument(skip(self, name, display_name))]
    pub async fn create_room(
        &self,
        owner_id: UserId,
        name: &str,
        display_name: &str,
    ) -> ServiceResult<Room> {
        let name = RoomName::parse(name)?;
        let display_name = DisplayName::parse(display_name)?;
        let engine = self.ctx.engine();

        for attempt in 1..=engine.pin_max_attempts {
            let pin = RoomPin::generate();

            // Cheap pre-check; the partial unique index is the real guard
            let in_use = retry(&engine.retry, DomainError::is_transient, || {
                self.ctx.room_repo().pin_in_use(&pin)
            })
            .await?;
            if in_use {
                debug!(attempt, "PIN held by an active room, drawing again");
                continue;
            }

            let owner = Member::new(owner_id.clone(), display_name.clone());
            let room = Room::new(self.ctx.generate_id(), pin, name.clone(), owner);

            match self.ctx.room_repo().create(&room).await {
                Ok(()) => {
                    info!(room_id = %room.id, owner_id = %owner_id, "Room created");
                    self.ctx
                        .publish(DomainEvent::room_created(room.id, owner_id))
                        .await;
                    return Ok(room);
                }
                Err(DomainError::PinCollision) => {
                    debug!(attempt, "PIN taken concurrently, drawing again");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(DomainError::PinSpaceExhausted {
            attempts: engine.pin_max_attempts,
        }
        .into())
    }

    /// Join the active room holding `pin`. Joining twice is a no-op that
    /// returns the room as it is.
    #[instrument(skip(self, pin, display_name))]
    pub async fn join_room(
        &self,
        pin: &str,
        user_id: UserId,
        display_name: &str,
    ) -> ServiceResult<Room> {
        let pin = RoomPin::parse(pin)?;
        let display_name = DisplayName::parse(display_name)?;
        let policy = &self.ctx.engine().retry;

        let room = retry(policy, DomainError::is_transient, || {
            self.ctx.room_repo().find_active_by_pin(&pin)
        })
        .await?
        .ok_or_else(|| DomainError::PinNotFound(pin.to_string()))?;

        let member = Member::new(user_id.clone(), display_name);
        let update = retry(policy, DomainError::is_transient, || {
            self.ctx.room_repo().add_member(room.id, &member)
        })
        .await?;

        if update.changed {
            info!(room_id = %room.id, user_id = %user_id, "Member joined room");
            self.ctx
                .publish(DomainEvent::member_joined(room.id, user_id))
                .await;
        } else {
            debug!(room_id = %room.id, "Already a member");
        }

        Ok(update.room)
    }

    /// Leave a room. The room is deactivated once its last member is gone;
    /// its swipes and matches stay readable. Leaving a room one is not in is
    /// a no-op.
    #[instrument(skip(self))]
    pub async fn leave_room(&self, room_id: Snowflake, user_id: UserId) -> ServiceResult<()> {
        let update = retry(&self.ctx.engine().retry, DomainError::is_transient, || {
            self.ctx.room_repo().remove_member(room_id, &user_id)
        })
        .await?;

        if !update.changed {
            debug!("Not a member, nothing to leave");
            return Ok(());
        }

        info!(room_id = %room_id, user_id = %user_id, "Member left room");
        self.ctx
            .publish(DomainEvent::member_left(room_id, user_id))
            .await;

        if !update.room.is_active {
            info!(room_id = %room_id, "Last member left, room deactivated");
            self.ctx
                .publish(DomainEvent::room_deactivated(room_id))
                .await;
        }

        Ok(())
    }

    /// Read a room as `viewer`, who must be its owner or a member
    #[instrument(skip(self))]
    pub async fn get_room(&self, room_id: Snowflake, viewer: &UserId) -> ServiceResult<Room> {
        let room = self.find_room(room_id).await?;
        if !room.can_view(viewer) {
            return Err(DomainError::NotRoomMember.into());
        }
        Ok(room)
    }

    /// Read a room without an access check
    pub(crate) async fn find_room(&self, room_id: Snowflake) -> ServiceResult<Room> {
        let room = retry(&self.ctx.engine().retry, DomainError::is_transient, || {
            self.ctx.room_repo().find_by_id(room_id)
        })
        .await?
        .ok_or(DomainError::RoomNotFound(room_id))?;
        Ok(room)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{context, uid, RecordingFeed};
    use std::collections::HashSet;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_create_room_makes_owner_the_first_member() {
        let ctx = context();
        let room = RoomService::new(&ctx)
            .create_room(uid("alice"), "Dinner", "Alice")
            .await
            .unwrap();

        assert!(room.is_active);
        assert_eq!(room.owner_id, uid("alice"));
        assert_eq!(room.active_member_ids(), vec![uid("alice")]);
        assert_eq!(room.pin.as_str().len(), RoomPin::LEN);
    }

    #[tokio::test]
    async fn test_create_room_validates_before_writing() {
        let ctx = context();
        let service = RoomService::new(&ctx);

        let err = service.create_room(uid("alice"), "   ", "Alice").await.unwrap_err();
        assert_eq!(err.status_code(), 400);

        let err = service.create_room(uid("alice"), "Dinner", "!!!").await.unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_join_is_idempotent() {
        let ctx = context();
        let service = RoomService::new(&ctx);
        let room = service.create_room(uid("alice"), "Dinner", "Alice").await.unwrap();

        service.join_room(room.pin.as_str(), uid("bob"), "Bob").await.unwrap();
        let again = service.join_room(room.pin.as_str(), uid("bob"), "Bob").await.unwrap();
        let owner_again = service
            .join_room(room.pin.as_str(), uid("alice"), "Alice")
            .await
            .unwrap();

        assert_eq!(again.members.len(), 2);
        assert_eq!(owner_again.active_member_ids(), vec![uid("alice"), uid("bob")]);
    }

    #[tokio::test]
    async fn test_join_trims_pin_input() {
        let ctx = context();
        let service = RoomService::new(&ctx);
        let room = service.create_room(uid("alice"), "Dinner", "Alice").await.unwrap();

        let padded = format!("  {}\n", room.pin);
        let joined = service.join_room(&padded, uid("bob"), "Bob").await.unwrap();
        assert_eq!(joined.id, room.id);
    }

    #[tokio::test]
    async fn test_join_unknown_or_malformed_pin() {
        let ctx = context();
        let service = RoomService::new(&ctx);

        let err = service.join_room("12345", uid("bob"), "Bob").await.unwrap_err();
        assert_eq!(err.error_code(), "INVALID_PIN");

        let err = service.join_room("000000", uid("bob"), "Bob").await.unwrap_err();
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.error_code(), "UNKNOWN_PIN");
    }

    #[tokio::test]
    async fn test_last_leave_deactivates_and_frees_pin() {
        let ctx = context();
        let service = RoomService::new(&ctx);
        let room = service.create_room(uid("alice"), "Dinner", "Alice").await.unwrap();
        service.join_room(room.pin.as_str(), uid("bob"), "Bob").await.unwrap();

        service.leave_room(room.id, uid("alice")).await.unwrap();
        let still_open = service.get_room(room.id, &uid("bob")).await.unwrap();
        assert!(still_open.is_active);

        service.leave_room(room.id, uid("bob")).await.unwrap();
        let closed = service.get_room(room.id, &uid("alice")).await.unwrap();
        assert!(!closed.is_active);
        assert!(closed.members.is_empty());

        let err = service.join_room(room.pin.as_str(), uid("carol"), "Carol").await.unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_PIN");
    }

    #[tokio::test]
    async fn test_leave_as_non_member_is_noop() {
        let ctx = context();
        let service = RoomService::new(&ctx);
        let room = service.create_room(uid("alice"), "Dinner", "Alice").await.unwrap();

        service.leave_room(room.id, uid("mallory")).await.unwrap();
        let room = service.get_room(room.id, &uid("alice")).await.unwrap();
        assert!(room.is_active);

        let err = service.leave_room(Snowflake::new(42), uid("alice")).await.unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_get_room_requires_membership() {
        let ctx = context();
        let service = RoomService::new(&ctx);
        let room = service.create_room(uid("alice"), "Dinner", "Alice").await.unwrap();

        let err = service.get_room(room.id, &uid("mallory")).await.unwrap_err();
        assert_eq!(err.status_code(), 403);
    }

    #[tokio::test]
    async fn test_membership_changes_are_published() {
        let feed = Arc::new(RecordingFeed::default());
        let ctx = crate::services::testing::context_with_feed(feed.clone());
        let service = RoomService::new(&ctx);

        let room = service.create_room(uid("alice"), "Dinner", "Alice").await.unwrap();
        service.join_room(room.pin.as_str(), uid("bob"), "Bob").await.unwrap();
        service.join_room(room.pin.as_str(), uid("bob"), "Bob").await.unwrap();
        service.leave_room(room.id, uid("bob")).await.unwrap();
        service.leave_room(room.id, uid("alice")).await.unwrap();

        assert_eq!(
            feed.event_types(),
            vec![
                "ROOM_CREATED",
                "MEMBER_JOINED",
                "MEMBER_LEFT",
                "MEMBER_LEFT",
                "ROOM_DEACTIVATED"
            ]
        );
    }

    #[tokio::test]
    async fn test_concurrent_creates_never_share_an_active_pin() {
        let ctx = context();

        let mut handles = Vec::new();
        for i in 0..50 {
            let ctx = ctx.clone();
            handles.push(tokio::spawn(async move {
                RoomService::new(&ctx)
                    .create_room(uid(&format!("owner-{i}")), "Room", "Owner")
                    .await
            }));
        }

        let mut pins = HashSet::new();
        for handle in handles {
            let room = handle.await.unwrap().unwrap();
            assert!(pins.insert(room.pin.to_string()), "duplicate active PIN");
        }
        assert_eq!(pins.len(), 50);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_joins_keep_every_member() {
        let ctx = context();
        let room = RoomService::new(&ctx)
            .create_room(uid("owner"), "Party", "Owner")
            .await
            .unwrap();

        let mut handles = Vec::new();
        for i in 0..30 {
            let ctx = ctx.clone();
            let pin = room.pin.to_string();
            handles.push(tokio::spawn(async move {
                RoomService::new(&ctx)
                    .join_room(&pin, uid(&format!("guest-{i}")), "Guest")
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let room = RoomService::new(&ctx).get_room(room.id, &uid("owner")).await.unwrap();
        let ids: HashSet<_> = room.members.iter().map(|m| m.user_id.clone()).collect();
        assert_eq!(room.members.len(), 31);
        assert_eq!(ids.len(), 31, "duplicate member");
        for i in 0..30 {
            assert!(room.is_member(&uid(&format!("guest-{i}"))));
        }
    }
}
