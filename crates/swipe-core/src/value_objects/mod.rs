//! Value objects - immutable types that represent domain concepts

mod ids;
mod names;
mod pin;
mod snowflake;
mod swipe_action;

pub use ids::{CandidateId, UserId, MAX_ID_LEN};
pub use names::{DisplayName, RoomName, MAX_NAME_LEN};
pub use pin::RoomPin;
pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
pub use swipe_action::SwipeAction;
