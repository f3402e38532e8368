//! Room and Member entity <-> model mappers

use swipe_core::{
    CandidateId, CurrentSwipe, DisplayName, DomainError, Member, Room, RoomName, RoomPin,
    Snowflake, SwipeAction, UserId,
};

use super::corrupt_row;
use crate::models::{RoomMemberModel, RoomModel};

impl TryFrom<RoomMemberModel> for Member {
    type Error = DomainError;

    fn try_from(model: RoomMemberModel) -> Result<Self, Self::Error> {
        let fail = |e| corrupt_row("room_members", e);

        let current_swipe = match (
            model.current_candidate_id,
            model.current_action,
            model.current_swiped_at,
        ) {
            (Some(candidate_id), Some(action), Some(swiped_at)) => Some(CurrentSwipe {
                candidate_id: CandidateId::parse(candidate_id).map_err(fail)?,
                action: action.parse::<SwipeAction>().map_err(fail)?,
                swiped_at,
            }),
            _ => None,
        };

        Ok(Member {
            user_id: UserId::parse(model.user_id).map_err(fail)?,
            display_name: DisplayName::parse(&model.display_name).map_err(fail)?,
            joined_at: model.joined_at,
            is_active: model.is_active,
            current_swipe,
        })
    }
}

/// Assemble a room from its row and its member rows (already in join order)
pub fn room_with_members(
    model: RoomModel,
    members: Vec<RoomMemberModel>,
) -> Result<Room, DomainError> {
    let fail = |e| corrupt_row("rooms", e);

    Ok(Room {
        id: Snowflake::new(model.id),
        pin: RoomPin::parse(&model.pin).map_err(fail)?,
        name: RoomName::parse(&model.name).map_err(fail)?,
        owner_id: UserId::parse(model.owner_id).map_err(fail)?,
        members: members
            .into_iter()
            .map(Member::try_from)
            .collect::<Result<_, _>>()?,
        is_active: model.is_active,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}
