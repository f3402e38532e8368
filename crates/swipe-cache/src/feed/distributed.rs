//! Cross-node feed over Redis pub/sub
//!
//! Every node publishes to `room:{id}` and subscribes to the rooms its own
//! clients watch. Incoming messages are handed to a [`LocalFeed`] for the
//! per-client fan-out.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use swipe_core::{DomainEvent, Snowflake};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use super::{ChangeFeed, FeedError, FeedNotice, LocalFeed};
use crate::pool::RedisPool;
use crate::pubsub::{PubSubChannel, Publisher, Subscriber, SubscriberConfig, SubscriberEvent};

/// Longest `listen` waits for Redis to confirm a subscription
const SUBSCRIBE_TIMEOUT: Duration = Duration::from_secs(5);

pub struct RedisFeed {
    pool: RedisPool,
    publisher: Publisher,
    subscriber: Arc<Subscriber>,
    local: LocalFeed,
    forwarder: JoinHandle<()>,
}

impl RedisFeed {
    pub fn new(pool: RedisPool, subscriber_config: SubscriberConfig) -> Self {
        let subscriber = Arc::new(Subscriber::new(subscriber_config));
        let local = LocalFeed::new();

        // Take the receiver before spawning so nothing slips past
        let incoming = subscriber.receiver();
        let forwarder = tokio::spawn(forward(incoming, subscriber.clone(), local.clone()));

        Self {
            publisher: Publisher::new(pool.clone()),
            pool,
            subscriber,
            local,
            forwarder,
        }
    }

    pub fn from_config(config: &swipe_common::RedisConfig) -> Result<Self, FeedError> {
        let pool = RedisPool::from_config(config)?;
        let subscriber_config = SubscriberConfig {
            redis_url: config.url.clone(),
            ..SubscriberConfig::default()
        };
        Ok(Self::new(pool, subscriber_config))
    }

    /// Ping Redis through the publishing pool
    pub async fn health_check(&self) -> Result<(), FeedError> {
        self.pool.health_check().await?;
        Ok(())
    }
}

impl Drop for RedisFeed {
    fn drop(&mut self) {
        self.forwarder.abort();
    }
}

impl std::fmt::Debug for RedisFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisFeed")
            .field("pool", &self.pool)
            .field("watched_rooms", &self.local.watched_rooms())
            .finish_non_exhaustive()
    }
}

/// Move messages from the Redis subscriber into the local fan-out
async fn forward(
    mut incoming: broadcast::Receiver<SubscriberEvent>,
    subscriber: Arc<Subscriber>,
    local: LocalFeed,
) {
    loop {
        match incoming.recv().await {
            Ok(SubscriberEvent::Message(msg)) => {
                let Some(room_id) = msg.channel.room_id() else {
                    continue;
                };
                let event = match msg.decode::<DomainEvent>() {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::warn!(channel = %msg.channel, error = %e, "Dropping undecodable feed message");
                        continue;
                    }
                };

                let deactivated = matches!(event, DomainEvent::RoomDeactivated(_));
                local.deliver(room_id, FeedNotice::Changed(event));

                // Nothing more will happen in this room
                if deactivated {
                    if let Err(e) = subscriber.unsubscribe(&[PubSubChannel::room(room_id)]).await {
                        tracing::warn!(room_id = %room_id, error = %e, "Failed to unsubscribe");
                    }
                }
            }
            Ok(SubscriberEvent::Reconnected) => {
                tracing::warn!("Feed reconnected, asking listeners to resync");
                local.resync_all();
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Feed forwarder lagged, asking listeners to resync");
                local.resync_all();
            }
            Err(RecvError::Closed) => break,
        }
    }
}

#[async_trait]
impl ChangeFeed for RedisFeed {
    async fn publish(&self, event: &DomainEvent) -> Result<(), FeedError> {
        self.publisher.publish(event).await?;
        Ok(())
    }

    async fn listen(&self, room_id: Snowflake) -> Result<broadcast::Receiver<FeedNotice>, FeedError> {
        let rx = self.local.subscribe(room_id);
        tokio::time::timeout(
            SUBSCRIBE_TIMEOUT,
            self.subscriber.subscribe(&[PubSubChannel::room(room_id)]),
        )
        .await
        .map_err(|_| FeedError::SubscribeTimeout)??;
        Ok(rx)
    }
}
