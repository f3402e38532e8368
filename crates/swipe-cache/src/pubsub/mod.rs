//! Redis Pub/Sub module.

mod channels;
mod publisher;
mod subscriber;

pub use channels::{PubSubChannel, ROOM_CHANNEL_PREFIX};
pub use publisher::Publisher;
pub use subscriber::{
    ReceivedMessage, Subscriber, SubscriberConfig, SubscriberError, SubscriberEvent,
    SubscriberResult,
};
