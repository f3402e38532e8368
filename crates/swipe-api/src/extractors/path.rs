//! Path parameter extractors
//!
//! Parse Snowflake IDs out of path segments, rejecting bad ones with 400.

use serde::Deserialize;
use swipe_core::{CandidateId, Snowflake};

use crate::response::ApiError;

fn parse_id(raw: &str, name: &str) -> Result<Snowflake, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::invalid_path(format!("Invalid {name} format")))
}

/// Path parameters with room_id
#[derive(Debug, Deserialize)]
pub struct RoomIdPath {
    pub room_id: String,
}

impl RoomIdPath {
    pub fn room_id(&self) -> Result<Snowflake, ApiError> {
        parse_id(&self.room_id, "room_id")
    }
}

/// Path parameters with room_id and candidate_id
#[derive(Debug, Deserialize)]
pub struct SwipePath {
    pub room_id: String,
    pub candidate_id: String,
}

impl SwipePath {
    pub fn room_id(&self) -> Result<Snowflake, ApiError> {
        parse_id(&self.room_id, "room_id")
    }

    pub fn candidate_id(&self) -> Result<CandidateId, ApiError> {
        CandidateId::parse(self.candidate_id.as_str())
            .map_err(|e| ApiError::invalid_path(e.to_string()))
    }
}

/// Path parameters with match_id
#[derive(Debug, Deserialize)]
pub struct MatchIdPath {
    pub match_id: String,
}

impl MatchIdPath {
    pub fn match_id(&self) -> Result<Snowflake, ApiError> {
        parse_id(&self.match_id, "match_id")
    }
}
