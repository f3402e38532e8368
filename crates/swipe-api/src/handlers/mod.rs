//! Route handlers
//!
//! All HTTP and WebSocket request handlers organized by resource.

pub mod feed;
pub mod health;
pub mod matches;
pub mod rooms;
pub mod swipes;
