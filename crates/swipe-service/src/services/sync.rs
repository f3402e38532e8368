//! Synchronization layer
//!
//! Push subscriptions over the change feed. Each stream listens first, then
//! reads, then re-reads after every relevant notice, so nothing committed
//! after the subscription started can be missed. Notices are only hints;
//! what gets delivered always comes from the store.

use std::future::Future;
use swipe_cache::FeedNotice;
use swipe_common::retry;
use swipe_core::{DomainError, Match, Room, Snowflake};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, instrument};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::room_match::MatchService;

/// Live subscription handle. Delivery stops on [`Subscription::unsubscribe`]
/// or when the handle is dropped.
#[derive(Debug)]
pub struct Subscription {
    room_id: Snowflake,
    task: JoinHandle<()>,
}

impl Subscription {
    pub fn room_id(&self) -> Snowflake {
        self.room_id
    }

    /// `false` once the stream ended, e.g. after the feed closed
    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// What a stream re-reads and how it decides a read is worth delivering
trait SyncStream: Send + 'static {
    type Item: Send;

    fn wants(notice: &FeedNotice) -> bool;

    fn read(
        &self,
        ctx: &ServiceContext,
        room_id: Snowflake,
    ) -> impl Future<Output = ServiceResult<Self::Item>> + Send;

    /// Advance the stream position; `false` suppresses delivery
    fn accept(&mut self, item: &Self::Item) -> bool;
}

/// Room documents, never older than the last one delivered
#[derive(Default)]
struct RoomStream {
    last: Option<Room>,
}

impl SyncStream for RoomStream {
    type Item = Room;

    fn wants(notice: &FeedNotice) -> bool {
        match notice {
            FeedNotice::Changed(event) => event.touches_room(),
            FeedNotice::Resync => true,
        }
    }

    async fn read(&self, ctx: &ServiceContext, room_id: Snowflake) -> ServiceResult<Room> {
        let room = retry(&ctx.engine().retry, DomainError::is_transient, || {
            ctx.room_repo().find_by_id(room_id)
        })
        .await?
        .ok_or(DomainError::RoomNotFound(room_id))?;
        Ok(room)
    }

    fn accept(&mut self, room: &Room) -> bool {
        if let Some(last) = &self.last {
            if room.updated_at < last.updated_at || room == last {
                return false;
            }
        }
        self.last = Some(room.clone());
        true
    }
}

/// Match windows, never shorter than the last one delivered
#[derive(Default)]
struct MatchStream {
    last: Option<Vec<Match>>,
}

impl SyncStream for MatchStream {
    type Item = Vec<Match>;

    fn wants(notice: &FeedNotice) -> bool {
        match notice {
            FeedNotice::Changed(event) => event.touches_matches(),
            FeedNotice::Resync => true,
        }
    }

    async fn read(&self, ctx: &ServiceContext, room_id: Snowflake) -> ServiceResult<Vec<Match>> {
        // Matches may have been written on another node; close this node's
        // query window too
        ctx.match_cache().evict(room_id);
        Ok(MatchService::new(ctx).load_recent(room_id).await?)
    }

    fn accept(&mut self, matches: &Vec<Match>) -> bool {
        if let Some(last) = &self.last {
            if matches.len() < last.len() || matches == last {
                return false;
            }
        }
        self.last = Some(matches.clone());
        true
    }
}

/// Synchronization service
pub struct SyncService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> SyncService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Deliver the room now and after every change to it.
    ///
    /// Errors go to `on_error`; the stream keeps running after a failed read
    /// and ends only when the feed closes ([`ServiceError::FeedClosed`]).
    /// Access control is the caller's job.
    #[instrument(skip(self, on_change, on_error))]
    pub fn subscribe_room<C, E>(&self, room_id: Snowflake, on_change: C, on_error: E) -> Subscription
    where
        C: FnMut(Room) + Send + 'static,
        E: FnMut(ServiceError) + Send + 'static,
    {
        self.spawn(room_id, RoomStream::default(), on_change, on_error)
    }

    /// Deliver the match window (newest first) now and after every change
    /// to it. Same delivery rules as [`Self::subscribe_room`].
    #[instrument(skip(self, on_change, on_error))]
    pub fn subscribe_matches<C, E>(&self, room_id: Snowflake, on_change: C, on_error: E) -> Subscription
    where
        C: FnMut(Vec<Match>) + Send + 'static,
        E: FnMut(ServiceError) + Send + 'static,
    {
        self.spawn(room_id, MatchStream::default(), on_change, on_error)
    }

    fn spawn<S, C, E>(&self, room_id: Snowflake, stream: S, on_change: C, on_error: E) -> Subscription
    where
        S: SyncStream,
        C: FnMut(S::Item) + Send + 'static,
        E: FnMut(ServiceError) + Send + 'static,
    {
        let ctx = self.ctx.clone();
        let task = tokio::spawn(run(ctx, room_id, stream, on_change, on_error));
        Subscription { room_id, task }
    }
}

async fn run<S, C, E>(ctx: ServiceContext, room_id: Snowflake, mut stream: S, mut on_change: C, mut on_error: E)
where
    S: SyncStream,
    C: FnMut(S::Item),
    E: FnMut(ServiceError),
{
    let mut notices = match ctx.feed().listen(room_id).await {
        Ok(rx) => rx,
        Err(e) => {
            on_error(e.into());
            return;
        }
    };

    loop {
        match stream.read(&ctx, room_id).await {
            Ok(item) => {
                if stream.accept(&item) {
                    on_change(item);
                }
            }
            Err(e) => on_error(e),
        }

        if !next_relevant::<S>(&mut notices).await {
            debug!(room_id = %room_id, "Feed closed, ending subscription");
            on_error(ServiceError::FeedClosed);
            return;
        }
    }
}

/// Wait for a notice the stream cares about, then swallow whatever else is
/// already queued so one read covers a burst. `false` once the feed closed.
async fn next_relevant<S: SyncStream>(notices: &mut broadcast::Receiver<FeedNotice>) -> bool {
    loop {
        match notices.recv().await {
            Ok(notice) if S::wants(&notice) => break,
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                debug!(skipped, "Subscription lagged, re-reading");
                break;
            }
            Err(RecvError::Closed) => return false,
        }
    }

    loop {
        match notices.try_recv() {
            Ok(_) | Err(broadcast::error::TryRecvError::Lagged(_)) => {}
            Err(broadcast::error::TryRecvError::Empty) => return true,
            Err(broadcast::error::TryRecvError::Closed) => return false,
        }
    }
}
