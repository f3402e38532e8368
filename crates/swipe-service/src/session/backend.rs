//! The port a client session talks to

use async_trait::async_trait;
use swipe_core::{CandidateId, Match, Room, Snowflake, SwipeAction, UserId};

use crate::services::{
    MatchService, RoomService, ServiceContext, ServiceError, ServiceResult, Subscription,
    SwipeService, SyncService,
};

pub type ChangeCallback<T> = Box<dyn FnMut(T) + Send>;
pub type ErrorCallback = Box<dyn FnMut(ServiceError) + Send>;

/// Engine operations as seen by one client
#[async_trait]
pub trait SessionBackend: Send + Sync {
    async fn create_room(&self, owner_id: &UserId, name: &str, display_name: &str) -> ServiceResult<Room>;

    async fn join_room(&self, pin: &str, user_id: &UserId, display_name: &str) -> ServiceResult<Room>;

    async fn leave_room(&self, room_id: Snowflake, user_id: &UserId) -> ServiceResult<()>;

    /// `true` if this call wrote the vote, `false` if it already existed
    async fn submit_swipe(
        &self,
        room_id: Snowflake,
        user_id: &UserId,
        candidate_id: &CandidateId,
        action: SwipeAction,
    ) -> ServiceResult<bool>;

    async fn get_matches(&self, room_id: Snowflake, user_id: &UserId) -> ServiceResult<Vec<Match>>;

    fn subscribe_room(
        &self,
        room_id: Snowflake,
        on_change: ChangeCallback<Room>,
        on_error: ErrorCallback,
    ) -> Subscription;

    fn subscribe_matches(
        &self,
        room_id: Snowflake,
        on_change: ChangeCallback<Vec<Match>>,
        on_error: ErrorCallback,
    ) -> Subscription;
}

/// Backend that calls the services directly, in this process
#[derive(Debug, Clone)]
pub struct InProcessBackend {
    ctx: ServiceContext,
}

impl InProcessBackend {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &ServiceContext {
        &self.ctx
    }
}

#[async_trait]
impl SessionBackend for InProcessBackend {
    async fn create_room(&self, owner_id: &UserId, name: &str, display_name: &str) -> ServiceResult<Room> {
        RoomService::new(&self.ctx)
            .create_room(owner_id.clone(), name, display_name)
            .await
    }

    async fn join_room(&self, pin: &str, user_id: &UserId, display_name: &str) -> ServiceResult<Room> {
        RoomService::new(&self.ctx)
            .join_room(pin, user_id.clone(), display_name)
            .await
    }

    async fn leave_room(&self, room_id: Snowflake, user_id: &UserId) -> ServiceResult<()> {
        RoomService::new(&self.ctx).leave_room(room_id, user_id.clone()).await
    }

    async fn submit_swipe(
        &self,
        room_id: Snowflake,
        user_id: &UserId,
        candidate_id: &CandidateId,
        action: SwipeAction,
    ) -> ServiceResult<bool> {
        let receipt = SwipeService::new(&self.ctx)
            .submit_swipe(room_id, user_id.clone(), candidate_id.as_str(), action)
            .await?;
        Ok(receipt.recorded())
    }

    async fn get_matches(&self, room_id: Snowflake, user_id: &UserId) -> ServiceResult<Vec<Match>> {
        MatchService::new(&self.ctx).get_matches(room_id, user_id).await
    }

    fn subscribe_room(
        &self,
        room_id: Snowflake,
        on_change: ChangeCallback<Room>,
        on_error: ErrorCallback,
    ) -> Subscription {
        SyncService::new(&self.ctx).subscribe_room(room_id, on_change, on_error)
    }

    fn subscribe_matches(
        &self,
        room_id: Snowflake,
        on_change: ChangeCallback<Vec<Match>>,
        on_error: ErrorCallback,
    ) -> Subscription {
        SyncService::new(&self.ctx).subscribe_matches(room_id, on_change, on_error)
    }
}
