//! Client session store
//!
//! A [`RoomSession`] is one user's view of one room: mirrors of the room and
//! its matches kept current by push subscriptions, plus the candidate queue
//! and a cursor into it. Swipes are optimistic. The cursor moves as soon as
//! local checks pass and never moves back; the write settles in the
//! background and failures land in the session's error list.

mod backend;
mod candidates;

pub use backend::{ChangeCallback, ErrorCallback, InProcessBackend, SessionBackend};
pub use candidates::StaticCandidates;

use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use swipe_core::{Candidate, CandidateProvider, Match, Room, Snowflake, SwipeAction, UserId};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::services::{ServiceError, ServiceResult, Subscription};

/// Why a swipe never left the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SwipeRejection {
    #[error("Session is closed")]
    SessionClosed,

    #[error("Room is no longer active")]
    RoomInactive,

    #[error("No longer a member of this room")]
    NotMember,

    #[error("No candidates left")]
    QueueExhausted,
}

/// Result of [`RoomSession::swipe`]
#[derive(Debug)]
#[must_use]
pub enum SwipeAttempt {
    /// Local checks failed; the cursor did not move
    Rejected(SwipeRejection),
    /// The cursor moved past `candidate`; the write is in flight
    Advanced { candidate: Candidate, ticket: SwipeTicket },
}

/// How an optimistic swipe ended on the server
#[derive(Debug, Clone)]
pub enum SwipeSettlement {
    Recorded,
    /// The vote existed already; nothing changed
    AlreadyRecorded,
    /// The write failed and will not be retried. The same error is on the
    /// session's error list.
    Failed(Arc<ServiceError>),
}

/// Handle on an in-flight swipe. Dropping it does not cancel the write.
#[derive(Debug)]
pub struct SwipeTicket {
    task: JoinHandle<SwipeSettlement>,
}

impl SwipeTicket {
    pub async fn settled(self) -> SwipeSettlement {
        match self.task.await {
            Ok(settlement) => settlement,
            Err(e) => SwipeSettlement::Failed(Arc::new(ServiceError::internal(format!(
                "swipe task failed: {e}"
            )))),
        }
    }
}

struct SessionState {
    open: bool,
    room: Room,
    matches: Vec<Match>,
    /// Match ids already surfaced (or known when the session opened)
    seen: HashSet<Snowflake>,
    unseen: Vec<Match>,
    queue: Vec<Candidate>,
    cursor: usize,
    errors: Vec<Arc<ServiceError>>,
}

impl SessionState {
    fn rejection(&self, user_id: &UserId) -> Option<SwipeRejection> {
        if !self.open {
            Some(SwipeRejection::SessionClosed)
        } else if !self.room.is_active {
            Some(SwipeRejection::RoomInactive)
        } else if !self.room.is_member(user_id) {
            Some(SwipeRejection::NotMember)
        } else if self.cursor >= self.queue.len() {
            Some(SwipeRejection::QueueExhausted)
        } else {
            None
        }
    }

    fn apply_room(&mut self, room: Room) {
        if room.updated_at >= self.room.updated_at {
            self.room = room;
        }
    }

    fn apply_matches(&mut self, matches: Vec<Match>) {
        // Oldest first, so take_new_matches reads in arrival order
        for m in matches.iter().rev() {
            if self.seen.insert(m.id) {
                self.unseen.push(m.clone());
            }
        }
        if matches.len() >= self.matches.len() {
            self.matches = matches;
        }
    }
}

/// One user's session in one room
pub struct RoomSession {
    backend: Arc<dyn SessionBackend>,
    user_id: UserId,
    room_id: Snowflake,
    state: Arc<Mutex<SessionState>>,
    subscriptions: Vec<Subscription>,
}

impl RoomSession {
    /// Create a room and open a session in it as its owner
    pub async fn create(
        backend: Arc<dyn SessionBackend>,
        candidates: &dyn CandidateProvider,
        user_id: UserId,
        name: &str,
        display_name: &str,
    ) -> ServiceResult<Self> {
        let room = backend.create_room(&user_id, name, display_name).await?;
        Self::open(backend, candidates, user_id, room).await
    }

    /// Join a room by PIN and open a session in it
    pub async fn join(
        backend: Arc<dyn SessionBackend>,
        candidates: &dyn CandidateProvider,
        user_id: UserId,
        pin: &str,
        display_name: &str,
    ) -> ServiceResult<Self> {
        let room = backend.join_room(pin, &user_id, display_name).await?;
        Self::open(backend, candidates, user_id, room).await
    }

    async fn open(
        backend: Arc<dyn SessionBackend>,
        candidates: &dyn CandidateProvider,
        user_id: UserId,
        room: Room,
    ) -> ServiceResult<Self> {
        let room_id = room.id;
        let queue = candidates.candidates(room_id).await?;
        let matches = backend.get_matches(room_id, &user_id).await?;

        let state = Arc::new(Mutex::new(SessionState {
            open: true,
            room,
            seen: matches.iter().map(|m| m.id).collect(),
            matches,
            unseen: Vec::new(),
            queue,
            cursor: 0,
            errors: Vec::new(),
        }));

        let subscriptions = vec![
            backend.subscribe_room(
                room_id,
                {
                    let state = Arc::clone(&state);
                    Box::new(move |room| state.lock().apply_room(room))
                },
                error_sink(&state),
            ),
            backend.subscribe_matches(
                room_id,
                {
                    let state = Arc::clone(&state);
                    Box::new(move |matches| state.lock().apply_matches(matches))
                },
                error_sink(&state),
            ),
        ];

        debug!(room_id = %room_id, user_id = %user_id, "Session opened");
        Ok(Self {
            backend,
            user_id,
            room_id,
            state,
            subscriptions,
        })
    }

    pub fn room_id(&self) -> Snowflake {
        self.room_id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn is_open(&self) -> bool {
        self.state.lock().open
    }

    /// Latest room snapshot
    pub fn room(&self) -> Room {
        self.state.lock().room.clone()
    }

    /// Latest match window, newest first
    pub fn matches(&self) -> Vec<Match> {
        self.state.lock().matches.clone()
    }

    /// Candidate the next swipe applies to
    pub fn current_candidate(&self) -> Option<Candidate> {
        let state = self.state.lock();
        state.queue.get(state.cursor).cloned()
    }

    /// Index of the current candidate in the queue
    pub fn position(&self) -> usize {
        self.state.lock().cursor
    }

    pub fn remaining(&self) -> usize {
        let state = self.state.lock();
        state.queue.len().saturating_sub(state.cursor)
    }

    /// Vote on the current candidate and move on without waiting for the
    /// server.
    pub fn swipe(&self, action: SwipeAction) -> SwipeAttempt {
        let candidate = {
            let mut state = self.state.lock();
            if let Some(reason) = state.rejection(&self.user_id) {
                return SwipeAttempt::Rejected(reason);
            }
            let candidate = state.queue[state.cursor].clone();
            state.cursor += 1;
            candidate
        };

        let backend = Arc::clone(&self.backend);
        let state = Arc::clone(&self.state);
        let user_id = self.user_id.clone();
        let room_id = self.room_id;
        let candidate_id = candidate.id.clone();

        let task = tokio::spawn(async move {
            match backend.submit_swipe(room_id, &user_id, &candidate_id, action).await {
                Ok(true) => SwipeSettlement::Recorded,
                Ok(false) => SwipeSettlement::AlreadyRecorded,
                Err(e) => {
                    warn!(error = %e, room_id = %room_id, candidate_id = %candidate_id, "Swipe failed");
                    let e = Arc::new(e);
                    state.lock().errors.push(Arc::clone(&e));
                    SwipeSettlement::Failed(e)
                }
            }
        });

        SwipeAttempt::Advanced {
            candidate,
            ticket: SwipeTicket { task },
        }
    }

    /// Errors collected since the last call, oldest first
    pub fn take_errors(&self) -> Vec<Arc<ServiceError>> {
        std::mem::take(&mut self.state.lock().errors)
    }

    /// Matches that appeared since the last call, each reported once
    pub fn take_new_matches(&self) -> Vec<Match> {
        std::mem::take(&mut self.state.lock().unseen)
    }

    /// Pull the match list instead of waiting for a push
    pub async fn refresh_matches(&self) -> ServiceResult<()> {
        let matches = self.backend.get_matches(self.room_id, &self.user_id).await?;
        self.state.lock().apply_matches(matches);
        Ok(())
    }

    /// Stop listening. Swipes already in flight still settle.
    pub fn close(&mut self) {
        self.state.lock().open = false;
        self.subscriptions.clear();
        debug!(room_id = %self.room_id, "Session closed");
    }

    /// Leave the room and close the session
    pub async fn leave(&mut self) -> ServiceResult<()> {
        self.close();
        self.backend.leave_room(self.room_id, &self.user_id).await
    }
}

impl std::fmt::Debug for RoomSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomSession")
            .field("room_id", &self.room_id)
            .field("user_id", &self.user_id)
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

fn error_sink(state: &Arc<Mutex<SessionState>>) -> ErrorCallback {
    let state = Arc::clone(state);
    Box::new(move |e| state.lock().errors.push(Arc::new(e)))
}
