//! Route definitions
//!
//! All API routes organized by resource and mounted under /api/v1.

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers::{feed, health, matches, rooms, swipes};
use crate::state::AppState;

/// Create the main API router (health routes are separate so they bypass
/// rate limiting)
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/api/v1", api_v1_routes())
}

/// Health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

/// API v1 routes
fn api_v1_routes() -> Router<AppState> {
    Router::new().merge(room_routes()).merge(match_routes())
}

/// Room routes
fn room_routes() -> Router<AppState> {
    Router::new()
        .route("/rooms", post(rooms::create_room))
        .route("/rooms/join", post(rooms::join_room))
        .route("/rooms/:room_id", get(rooms::get_room))
        .route("/rooms/:room_id/members/@me", delete(rooms::leave_room))
        // Swipes
        .route("/rooms/:room_id/swipes/:candidate_id", put(swipes::submit_swipe))
        // Matches
        .route("/rooms/:room_id/matches", get(matches::get_matches))
        // Live updates
        .route("/rooms/:room_id/feed", get(feed::room_feed))
}

/// Match routes
fn match_routes() -> Router<AppState> {
    Router::new().route("/matches/:match_id/viewed", post(matches::mark_viewed))
}
