//! Pub/Sub channel naming.
//!
//! Every room gets its own channel, so a node only receives traffic for
//! rooms somebody on it is watching.

use swipe_core::Snowflake;

/// Channel prefix for room events
pub const ROOM_CHANNEL_PREFIX: &str = "room:";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PubSubChannel {
    /// Changes to one room, its votes, and its matches
    Room(Snowflake),
    /// Anything that does not follow the naming scheme
    Custom(String),
}

impl PubSubChannel {
    #[must_use]
    pub fn room(room_id: Snowflake) -> Self {
        Self::Room(room_id)
    }

    /// Get the Redis channel name
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Room(id) => format!("{ROOM_CHANNEL_PREFIX}{id}"),
            Self::Custom(name) => name.clone(),
        }
    }

    /// Parse a channel name back to a `PubSubChannel`
    #[must_use]
    pub fn parse(name: &str) -> Self {
        name.strip_prefix(ROOM_CHANNEL_PREFIX)
            .and_then(|id| id.parse::<i64>().ok())
            .map_or_else(|| Self::Custom(name.to_string()), |id| Self::Room(Snowflake::new(id)))
    }

    /// Room this channel carries, if any
    #[must_use]
    pub fn room_id(&self) -> Option<Snowflake> {
        match self {
            Self::Room(id) => Some(*id),
            Self::Custom(_) => None,
        }
    }
}

impl std::fmt::Display for PubSubChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
