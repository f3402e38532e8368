//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in swipe-core.
//! Multi-row changes run in a transaction that first locks the room row, so
//! membership changes and votes on the same room never interleave.

mod error;
mod room;
mod room_match;
mod swipe;

pub use room::PgRoomRepository;
pub use room_match::PgMatchRepository;
pub use swipe::PgSwipeRepository;
