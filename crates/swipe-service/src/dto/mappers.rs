//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs.

use swipe_core::{CurrentSwipe, Match, Member, Room};

use super::responses::{CurrentSwipeResponse, MatchResponse, MemberResponse, RoomResponse};

// ============================================================================
// Room Mappers
// ============================================================================

impl From<&Room> for RoomResponse {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id.to_string(),
            pin: room.pin.to_string(),
            name: room.name.to_string(),
            owner_id: room.owner_id.to_string(),
            members: room.members.iter().map(MemberResponse::from).collect(),
            is_active: room.is_active,
            created_at: room.created_at,
            updated_at: room.updated_at,
        }
    }
}

impl From<Room> for RoomResponse {
    fn from(room: Room) -> Self {
        Self::from(&room)
    }
}

impl From<&Member> for MemberResponse {
    fn from(member: &Member) -> Self {
        Self {
            user_id: member.user_id.to_string(),
            display_name: member.display_name.to_string(),
            joined_at: member.joined_at,
            is_active: member.is_active,
            current_swipe: member.current_swipe.as_ref().map(CurrentSwipeResponse::from),
        }
    }
}

impl From<&CurrentSwipe> for CurrentSwipeResponse {
    fn from(swipe: &CurrentSwipe) -> Self {
        Self {
            candidate_id: swipe.candidate_id.to_string(),
            action: swipe.action,
            swiped_at: swipe.swiped_at,
        }
    }
}

// ============================================================================
// Match Mappers
// ============================================================================

impl From<&Match> for MatchResponse {
    fn from(m: &Match) -> Self {
        Self {
            id: m.id.to_string(),
            room_id: m.room_id.to_string(),
            candidate_id: m.candidate_id.to_string(),
            matched_at: m.matched_at,
            member_ids: m.member_ids.iter().map(ToString::to_string).collect(),
            is_viewed: m.is_viewed,
        }
    }
}

impl From<Match> for MatchResponse {
    fn from(m: Match) -> Self {
        Self::from(&m)
    }
}
