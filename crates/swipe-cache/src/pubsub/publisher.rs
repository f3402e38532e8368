//! Redis Pub/Sub publisher.

use redis::AsyncCommands;
use swipe_core::DomainEvent;

use crate::pool::{RedisPool, RedisResult};
use crate::pubsub::PubSubChannel;

/// Redis Pub/Sub publisher
#[derive(Clone)]
pub struct Publisher {
    pool: RedisPool,
}

impl Publisher {
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    /// Publish a domain event on its room's channel. Returns the number of
    /// nodes that received it.
    pub async fn publish(&self, event: &DomainEvent) -> RedisResult<u32> {
        let channel = PubSubChannel::room(event.room_id());
        let payload = serde_json::to_string(event)?;
        self.publish_raw(&channel, &payload, event.event_type()).await
    }

    async fn publish_raw(&self, channel: &PubSubChannel, payload: &str, event_type: &str) -> RedisResult<u32> {
        let mut conn = self.pool.get().await?;
        let channel_name = channel.name();

        let receivers: u32 = conn.publish(&channel_name, payload).await?;

        tracing::debug!(
            channel = %channel_name,
            event_type = %event_type,
            receivers = receivers,
            "Published event"
        );

        Ok(receivers)
    }
}
