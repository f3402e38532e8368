//! Integration test utilities for the swipe server
//!
//! This crate provides helpers for running end-to-end tests against
//! the REST API and the room feed WebSocket.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
