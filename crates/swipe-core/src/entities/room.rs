//! Room entity - an ephemeral group session and its members

use chrono::{DateTime, Utc};

use crate::value_objects::{CandidateId, DisplayName, RoomName, RoomPin, Snowflake, SwipeAction, UserId};

/// Last vote cast by a member, kept on the room for the UI.
///
/// This is a convenience cache only; the swipe ledger is authoritative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentSwipe {
    pub candidate_id: CandidateId,
    pub action: SwipeAction,
    pub swiped_at: DateTime<Utc>,
}

/// Room member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub user_id: UserId,
    pub display_name: DisplayName,
    pub joined_at: DateTime<Utc>,
    pub is_active: bool,
    pub current_swipe: Option<CurrentSwipe>,
}

impl Member {
    pub fn new(user_id: UserId, display_name: DisplayName) -> Self {
        Self {
            user_id,
            display_name,
            joined_at: Utc::now(),
            is_active: true,
            current_swipe: None,
        }
    }
}

/// Room entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: Snowflake,
    pub pin: RoomPin,
    pub name: RoomName,
    pub owner_id: UserId,
    /// Insertion-ordered, unique by `user_id`
    pub members: Vec<Member>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Room {
    /// Create an active room whose only member is its owner
    pub fn new(id: Snowflake, pin: RoomPin, name: RoomName, owner: Member) -> Self {
        let now = Utc::now();
        Self {
            id,
            pin,
            name,
            owner_id: owner.user_id.clone(),
            members: vec![owner],
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn member(&self, user_id: &UserId) -> Option<&Member> {
        self.members.iter().find(|m| &m.user_id == user_id)
    }

    /// Check if the user is an active member
    pub fn is_member(&self, user_id: &UserId) -> bool {
        self.member(user_id).is_some_and(|m| m.is_active)
    }

    #[inline]
    pub fn is_owner(&self, user_id: &UserId) -> bool {
        &self.owner_id == user_id
    }

    /// Members and the owner may read a room, even after it went inactive
    pub fn can_view(&self, user_id: &UserId) -> bool {
        self.is_owner(user_id) || self.is_member(user_id)
    }

    pub fn active_members(&self) -> impl Iterator<Item = &Member> {
        self.members.iter().filter(|m| m.is_active)
    }

    /// Active member IDs in join order
    pub fn active_member_ids(&self) -> Vec<UserId> {
        self.active_members().map(|m| m.user_id.clone()).collect()
    }

    /// Append a member. Returns `false` and leaves the room untouched if the
    /// user is already present.
    pub fn add_member(&mut self, member: Member) -> bool {
        if self.member(&member.user_id).is_some() {
            return false;
        }
        self.members.push(member);
        self.updated_at = Utc::now();
        true
    }

    /// Remove a member; the room is deactivated once nobody is left.
    /// Returns `false` if the user was not a member.
    pub fn remove_member(&mut self, user_id: &UserId) -> bool {
        let Some(pos) = self.members.iter().position(|m| &m.user_id == user_id) else {
            return false;
        };
        self.members.remove(pos);
        if self.active_members().next().is_none() {
            self.is_active = false;
        }
        self.updated_at = Utc::now();
        true
    }

    /// Update a member's last-vote cache
    pub fn set_current_swipe(&mut self, user_id: &UserId, swipe: CurrentSwipe) -> bool {
        match self.members.iter_mut().find(|m| &m.user_id == user_id) {
            Some(member) => {
                member.current_swipe = Some(swipe);
                self.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }
}
