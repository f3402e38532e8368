//! # swipe-cache
//!
//! Change feed for room and match updates.
//!
//! ## Features
//!
//! - **Connection Pool**: Managed Redis connection pool with deadpool
//! - **Pub/Sub**: One Redis channel per room, shared by every server node
//! - **Feed**: [`ChangeFeed`] with an in-process [`LocalFeed`] and a
//!   cross-node [`RedisFeed`]
//!
//! ## Example
//!
//! ```ignore
//! use swipe_cache::{ChangeFeed, RedisFeed};
//!
//! let feed = RedisFeed::from_config(&config.redis)?;
//! let mut notices = feed.listen(room_id).await?;
//! feed.publish(&DomainEvent::member_joined(room_id, user_id)).await?;
//! ```

pub mod feed;
pub mod pool;
pub mod pubsub;

pub use feed::{ChangeFeed, FeedError, FeedNotice, LocalFeed, RedisFeed};
pub use pool::{RedisPool, RedisPoolConfig, RedisPoolError, RedisResult};
pub use pubsub::{
    PubSubChannel, Publisher, ReceivedMessage, Subscriber, SubscriberConfig, SubscriberError,
    SubscriberEvent, SubscriberResult, ROOM_CHANNEL_PREFIX,
};
