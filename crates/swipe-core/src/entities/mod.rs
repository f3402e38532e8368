//! Domain entities - core business objects

mod candidate;
mod room;
mod room_match;
mod swipe;

pub use candidate::Candidate;
pub use room::{CurrentSwipe, Member, Room};
pub use room_match::{consensus_reached, Match};
pub use swipe::SwipeRecord;
