//! Change feed
//!
//! Carries "room X changed" signals from the node that committed a change to
//! every node with a client watching room X. Delivery is at-most-once and
//! best-effort; listeners re-read the store on every notice, and a
//! [`FeedNotice::Resync`] tells them notices may have been lost.

mod local;
mod distributed;

pub use self::local::LocalFeed;
pub use self::distributed::RedisFeed;

use async_trait::async_trait;
use swipe_core::{DomainEvent, Snowflake};
use tokio::sync::broadcast;

use crate::pool::RedisPoolError;
use crate::pubsub::SubscriberError;

/// What a room listener receives
#[derive(Debug, Clone, PartialEq)]
pub enum FeedNotice {
    /// A change to the room committed
    Changed(DomainEvent),
    /// Notices may have been dropped; re-read everything
    Resync,
}

/// Change feed errors
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("Redis error: {0}")]
    Redis(#[from] RedisPoolError),

    #[error("Subscriber error: {0}")]
    Subscriber(#[from] SubscriberError),

    #[error("Timed out subscribing to room feed")]
    SubscribeTimeout,
}

/// Fan-out of committed changes, per room
#[async_trait]
pub trait ChangeFeed: Send + Sync {
    /// Announce a committed change to every listener of its room
    async fn publish(&self, event: &DomainEvent) -> Result<(), FeedError>;

    /// Start receiving notices for a room.
    ///
    /// Once this returns, every later `publish` for the room reaches the
    /// receiver (or produces a `Resync`/lag on it).
    async fn listen(&self, room_id: Snowflake) -> Result<broadcast::Receiver<FeedNotice>, FeedError>;
}
