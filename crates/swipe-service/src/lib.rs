//! # swipe-service
//!
//! Application layer: the room, swipe, match and sync services, the
//! background match detector, the per-room client session, and the DTOs the
//! HTTP layer serializes.

pub mod dto;
pub mod services;
pub mod session;

pub use services::{
    MatchDetector, MatchQueryCache, MatchService, RoomService, ServiceContext,
    ServiceContextBuilder, ServiceError, ServiceResult, Subscription, SwipeReceipt, SwipeService,
    SyncService,
};
pub use session::{
    InProcessBackend, RoomSession, SessionBackend, StaticCandidates, SwipeAttempt,
    SwipeRejection, SwipeSettlement, SwipeTicket,
};
