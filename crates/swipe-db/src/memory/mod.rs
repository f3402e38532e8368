//! In-process store
//!
//! Implements the same repository contracts as the PostgreSQL adapters with
//! a single mutex standing in for row locks and unique indexes. Used for
//! single-node deployments (`STORE_BACKEND=memory`) and by the service tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use swipe_core::{
    CandidateId, DomainError, Match, MatchRepository, Member, MembershipUpdate, RepoResult, Room,
    RoomPin, RoomRepository, Snowflake, SwipeRecord, SwipeRepository, UserId,
};

type SwipeKey = (Snowflake, UserId, CandidateId);

#[derive(Debug, Default)]
struct State {
    rooms: HashMap<Snowflake, Room>,
    swipes: Vec<SwipeRecord>,
    swipe_keys: HashSet<SwipeKey>,
    matches: Vec<Match>,
}

impl State {
    fn active_room_with_pin(&self, pin: &RoomPin) -> Option<&Room> {
        self.rooms.values().find(|r| r.is_active && &r.pin == pin)
    }
}

/// Shared in-memory store; clones see the same data
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Room>> {
        Ok(self.state.lock().rooms.get(&id).cloned())
    }

    async fn find_active_by_pin(&self, pin: &RoomPin) -> RepoResult<Option<Room>> {
        Ok(self.state.lock().active_room_with_pin(pin).cloned())
    }

    async fn pin_in_use(&self, pin: &RoomPin) -> RepoResult<bool> {
        Ok(self.state.lock().active_room_with_pin(pin).is_some())
    }

    async fn create(&self, room: &Room) -> RepoResult<()> {
        let mut state = self.state.lock();
        if room.is_active && state.active_room_with_pin(&room.pin).is_some() {
            return Err(DomainError::PinCollision);
        }
        if state.rooms.contains_key(&room.id) {
            return Err(DomainError::DatabaseError(format!("duplicate room id {}", room.id)));
        }
        state.rooms.insert(room.id, room.clone());
        Ok(())
    }

    async fn add_member(&self, room_id: Snowflake, member: &Member) -> RepoResult<MembershipUpdate> {
        let mut state = self.state.lock();
        let room = state
            .rooms
            .get_mut(&room_id)
            .filter(|r| r.is_active)
            .ok_or(DomainError::RoomNotFound(room_id))?;

        let changed = room.add_member(member.clone());
        Ok(MembershipUpdate {
            room: room.clone(),
            changed,
        })
    }

    async fn remove_member(&self, room_id: Snowflake, user_id: &UserId) -> RepoResult<MembershipUpdate> {
        let mut state = self.state.lock();
        let room = state
            .rooms
            .get_mut(&room_id)
            .ok_or(DomainError::RoomNotFound(room_id))?;

        let changed = room.remove_member(user_id);
        Ok(MembershipUpdate {
            room: room.clone(),
            changed,
        })
    }
}

#[async_trait]
impl SwipeRepository for MemoryStore {
    async fn exists(
        &self,
        room_id: Snowflake,
        user_id: &UserId,
        candidate_id: &CandidateId,
    ) -> RepoResult<bool> {
        let key = (room_id, user_id.clone(), candidate_id.clone());
        Ok(self.state.lock().swipe_keys.contains(&key))
    }

    async fn record(&self, swipe: &SwipeRecord) -> RepoResult<()> {
        let mut state = self.state.lock();
        let State {
            rooms,
            swipes,
            swipe_keys,
            ..
        } = &mut *state;

        let room = rooms
            .get_mut(&swipe.room_id)
            .filter(|r| r.is_active)
            .ok_or(DomainError::RoomNotFound(swipe.room_id))?;
        if !room.is_member(&swipe.user_id) {
            return Err(DomainError::NotRoomMember);
        }

        let key = (swipe.room_id, swipe.user_id.clone(), swipe.candidate_id.clone());
        if !swipe_keys.insert(key) {
            return Err(DomainError::DuplicateSwipe);
        }
        swipes.push(swipe.clone());
        room.set_current_swipe(&swipe.user_id, swipe.as_current_swipe());
        Ok(())
    }

    async fn find_by_candidate(
        &self,
        room_id: Snowflake,
        candidate_id: &CandidateId,
    ) -> RepoResult<Vec<SwipeRecord>> {
        let state = self.state.lock();
        Ok(state
            .swipes
            .iter()
            .filter(|s| s.room_id == room_id && &s.candidate_id == candidate_id)
            .cloned()
            .collect())
    }

    async fn find_by_room(&self, room_id: Snowflake) -> RepoResult<Vec<SwipeRecord>> {
        let state = self.state.lock();
        Ok(state.swipes.iter().filter(|s| s.room_id == room_id).cloned().collect())
    }
}

#[async_trait]
impl MatchRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Match>> {
        Ok(self.state.lock().matches.iter().find(|m| m.id == id).cloned())
    }

    async fn find_by_candidate(
        &self,
        room_id: Snowflake,
        candidate_id: &CandidateId,
    ) -> RepoResult<Option<Match>> {
        let state = self.state.lock();
        Ok(state
            .matches
            .iter()
            .find(|m| m.room_id == room_id && &m.candidate_id == candidate_id)
            .cloned())
    }

    async fn create(&self, m: &Match) -> RepoResult<()> {
        let mut state = self.state.lock();
        if state
            .matches
            .iter()
            .any(|existing| existing.room_id == m.room_id && existing.candidate_id == m.candidate_id)
        {
            return Err(DomainError::MatchAlreadyExists);
        }
        state.matches.push(m.clone());
        Ok(())
    }

    async fn list_recent(&self, room_id: Snowflake, limit: i64) -> RepoResult<Vec<Match>> {
        let state = self.state.lock();
        let mut matches: Vec<Match> = state
            .matches
            .iter()
            .filter(|m| m.room_id == room_id)
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.matched_at.cmp(&a.matched_at).then(b.id.cmp(&a.id)));
        matches.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(matches)
    }

    async fn mark_viewed(&self, id: Snowflake) -> RepoResult<bool> {
        let mut state = self.state.lock();
        let m = state
            .matches
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(DomainError::MatchNotFound(id))?;
        let changed = !m.is_viewed;
        m.is_viewed = true;
        Ok(changed)
    }
}
