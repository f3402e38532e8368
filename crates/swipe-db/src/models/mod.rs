//! Database models with SQLx `FromRow` derives

mod room;
mod room_match;
mod swipe;

pub use room::{RoomMemberModel, RoomModel};
pub use room_match::MatchModel;
pub use swipe::SwipeModel;
