//! In-process feed: one broadcast channel per watched room

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use swipe_core::{DomainEvent, Snowflake};
use tokio::sync::broadcast;

use super::{ChangeFeed, FeedError, FeedNotice};

/// Single-node change feed. Also the fan-out stage behind [`super::RedisFeed`].
#[derive(Debug, Clone)]
pub struct LocalFeed {
    rooms: Arc<DashMap<Snowflake, broadcast::Sender<FeedNotice>>>,
    capacity: usize,
}

impl Default for LocalFeed {
    fn default() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }
}

impl LocalFeed {
    /// Notices buffered per room before a slow listener starts lagging
    pub const DEFAULT_CAPACITY: usize = 256;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rooms: Arc::new(DashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Register a listener for a room
    pub fn subscribe(&self, room_id: Snowflake) -> broadcast::Receiver<FeedNotice> {
        self.rooms
            .entry(room_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Hand a notice to this node's listeners of a room. Returns `false` if
    /// there were none; the room's channel is then dropped.
    pub fn deliver(&self, room_id: Snowflake, notice: FeedNotice) -> bool {
        let delivered = self
            .rooms
            .get(&room_id)
            .is_some_and(|tx| tx.send(notice).is_ok());

        if !delivered {
            self.rooms.remove_if(&room_id, |_, tx| tx.receiver_count() == 0);
        }
        delivered
    }

    /// Tell every listener on this node to re-read
    pub fn resync_all(&self) {
        for entry in self.rooms.iter() {
            let _ = entry.value().send(FeedNotice::Resync);
        }
    }

    /// Rooms with at least one registered channel on this node
    pub fn watched_rooms(&self) -> usize {
        self.rooms.len()
    }
}

#[async_trait]
impl ChangeFeed for LocalFeed {
    async fn publish(&self, event: &DomainEvent) -> Result<(), FeedError> {
        let delivered = self.deliver(event.room_id(), FeedNotice::Changed(event.clone()));
        tracing::trace!(
            room_id = %event.room_id(),
            event_type = event.event_type(),
            delivered,
            "Published event"
        );
        Ok(())
    }

    async fn listen(&self, room_id: Snowflake) -> Result<broadcast::Receiver<FeedNotice>, FeedError> {
        Ok(self.subscribe(room_id))
    }
}
