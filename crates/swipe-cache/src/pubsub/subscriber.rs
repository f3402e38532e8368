//! Redis Pub/Sub subscriber.
//!
//! One dedicated connection per node. A background task owns it, applies
//! subscribe/unsubscribe commands, and re-establishes every subscription
//! after a dropped connection.

use futures_util::StreamExt;
use redis::Client;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot, RwLock};

use crate::pool::redact_url;
use crate::pubsub::PubSubChannel;

/// Error type for subscriber operations
#[derive(Debug, thiserror::Error)]
pub enum SubscriberError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Subscriber task stopped")]
    ChannelClosed,
}

/// Result type for subscriber operations
pub type SubscriberResult<T> = Result<T, SubscriberError>;

/// Raw message received on a subscribed channel
#[derive(Debug, Clone)]
pub struct ReceivedMessage {
    pub channel: PubSubChannel,
    pub payload: String,
}

impl ReceivedMessage {
    fn from_redis(channel_name: &str, payload: String) -> Self {
        Self {
            channel: PubSubChannel::parse(channel_name),
            payload,
        }
    }

    /// Decode the payload as JSON
    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.payload)
    }
}

/// What the subscriber hands to its listeners
#[derive(Debug, Clone)]
pub enum SubscriberEvent {
    Message(ReceivedMessage),
    /// The connection dropped and came back; anything published in between
    /// was lost
    Reconnected,
}

/// Subscriber configuration
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    /// Redis connection URL
    pub redis_url: String,
    /// Channel buffer size for broadcast
    pub broadcast_buffer: usize,
    /// Pause between reconnection attempts
    pub reconnect_delay: Duration,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".to_string(),
            broadcast_buffer: 1024,
            reconnect_delay: Duration::from_secs(1),
        }
    }
}

/// Commands for subscription management
#[derive(Debug)]
enum SubscriberCommand {
    /// The ack fires once Redis confirmed the subscription
    Subscribe(Vec<String>, oneshot::Sender<()>),
    Unsubscribe(Vec<String>),
}

/// Redis Pub/Sub subscriber. The background task stops once this handle is
/// dropped.
pub struct Subscriber {
    /// Channels to restore after a reconnect
    subscribed: Arc<RwLock<HashSet<String>>>,
    broadcast_tx: broadcast::Sender<SubscriberEvent>,
    control_tx: mpsc::Sender<SubscriberCommand>,
}

impl Subscriber {
    /// Create a new subscriber and start the background listener
    pub fn new(config: SubscriberConfig) -> Self {
        let (broadcast_tx, _) = broadcast::channel(config.broadcast_buffer);
        let (control_tx, control_rx) = mpsc::channel(32);
        let subscribed = Arc::new(RwLock::new(HashSet::new()));

        tokio::spawn(Self::listener_loop(
            config,
            subscribed.clone(),
            broadcast_tx.clone(),
            control_rx,
        ));

        Self {
            subscribed,
            broadcast_tx,
            control_tx,
        }
    }

    /// Background listener loop
    async fn listener_loop(
        config: SubscriberConfig,
        subscribed: Arc<RwLock<HashSet<String>>>,
        broadcast_tx: broadcast::Sender<SubscriberEvent>,
        mut control_rx: mpsc::Receiver<SubscriberCommand>,
    ) {
        let mut connected_before = false;
        loop {
            let outcome = Self::run_listener(
                &config,
                &subscribed,
                &broadcast_tx,
                &mut control_rx,
                &mut connected_before,
            )
            .await;
            match outcome {
                Ok(true) => {
                    tracing::info!("Subscriber shutting down");
                    break;
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::error!(error = %e, "Subscriber error, reconnecting...");
                    tokio::time::sleep(config.reconnect_delay).await;
                }
            }
        }
    }

    /// Run the listener until error or shutdown. `Ok(true)` means stop.
    async fn run_listener(
        config: &SubscriberConfig,
        subscribed: &Arc<RwLock<HashSet<String>>>,
        broadcast_tx: &broadcast::Sender<SubscriberEvent>,
        control_rx: &mut mpsc::Receiver<SubscriberCommand>,
        connected_before: &mut bool,
    ) -> SubscriberResult<bool> {
        let client = Client::open(config.redis_url.as_str())?;
        let mut pubsub = client.get_async_pubsub().await?;

        {
            let channels = subscribed.read().await;
            for channel in channels.iter() {
                pubsub.subscribe(channel).await?;
            }
        }

        tracing::info!(url = %redact_url(&config.redis_url), "Subscriber connected to Redis");
        if *connected_before {
            let _ = broadcast_tx.send(SubscriberEvent::Reconnected);
        }
        *connected_before = true;

        let mut stream = pubsub.on_message();

        loop {
            tokio::select! {
                msg = stream.next() => {
                    let Some(msg) = msg else {
                        tracing::warn!("Pub/Sub stream ended");
                        return Ok(false);
                    };
                    let channel_name = msg.get_channel_name().to_string();
                    let payload: String = msg.get_payload().unwrap_or_default();

                    tracing::trace!(channel = %channel_name, "Received Pub/Sub message");

                    // No receivers is fine
                    let _ = broadcast_tx.send(SubscriberEvent::Message(
                        ReceivedMessage::from_redis(&channel_name, payload),
                    ));
                }

                cmd = control_rx.recv() => {
                    match cmd {
                        Some(SubscriberCommand::Subscribe(channels, ack)) => {
                            // The stream borrows the connection
                            drop(stream);
                            for channel in &channels {
                                pubsub.subscribe(channel).await?;
                                subscribed.write().await.insert(channel.clone());
                                tracing::debug!(channel = %channel, "Subscribed to channel");
                            }
                            let _ = ack.send(());
                            stream = pubsub.on_message();
                        }
                        Some(SubscriberCommand::Unsubscribe(channels)) => {
                            drop(stream);
                            for channel in &channels {
                                subscribed.write().await.remove(channel);
                                pubsub.unsubscribe(channel).await?;
                                tracing::debug!(channel = %channel, "Unsubscribed from channel");
                            }
                            stream = pubsub.on_message();
                        }
                        // Every handle is gone
                        None => return Ok(true),
                    }
                }
            }
        }
    }

    /// Subscribe to channels and wait until Redis confirmed it.
    ///
    /// If the connection drops first, the channels are still registered and
    /// get subscribed on reconnect, but this call fails.
    pub async fn subscribe(&self, channels: &[PubSubChannel]) -> SubscriberResult<()> {
        let channel_names: Vec<String> = channels.iter().map(PubSubChannel::name).collect();
        self.subscribed.write().await.extend(channel_names.iter().cloned());

        let (ack_tx, ack_rx) = oneshot::channel();
        self.control_tx
            .send(SubscriberCommand::Subscribe(channel_names, ack_tx))
            .await
            .map_err(|_| SubscriberError::ChannelClosed)?;
        ack_rx.await.map_err(|_| SubscriberError::ChannelClosed)
    }

    pub async fn unsubscribe(&self, channels: &[PubSubChannel]) -> SubscriberResult<()> {
        let channel_names: Vec<String> = channels.iter().map(PubSubChannel::name).collect();

        self.control_tx
            .send(SubscriberCommand::Unsubscribe(channel_names))
            .await
            .map_err(|_| SubscriberError::ChannelClosed)
    }

    /// Get a receiver for incoming messages
    #[must_use]
    pub fn receiver(&self) -> broadcast::Receiver<SubscriberEvent> {
        self.broadcast_tx.subscribe()
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use swipe_core::Snowflake;

    #[test]
    fn test_received_message_parsing() {
        let msg = ReceivedMessage::from_redis("room:12345", r#"{"n":1}"#.to_string());

        assert_eq!(msg.channel, PubSubChannel::Room(Snowflake::new(12345)));
        let value: serde_json::Value = msg.decode().unwrap();
        assert_eq!(value["n"], 1);
    }

    #[test]
    fn test_received_message_invalid_json() {
        let msg = ReceivedMessage::from_redis("room:1", "invalid".to_string());
        assert!(msg.decode::<serde_json::Value>().is_err());
        assert_eq!(msg.payload, "invalid");
    }

    #[test]
    fn test_subscriber_config_default() {
        let config = SubscriberConfig::default();
        assert_eq!(config.redis_url, "redis://127.0.0.1:6379");
        assert_eq!(config.broadcast_buffer, 1024);
        assert_eq!(config.reconnect_delay, Duration::from_secs(1));
    }
}
