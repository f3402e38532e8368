//! Shared fixtures for service tests

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use swipe_cache::{ChangeFeed, FeedError, FeedNotice, LocalFeed};
use swipe_common::{EngineConfig, RetryPolicy};
use swipe_core::{
    CandidateId, DomainError, DomainEvent, Match, MatchRepository, RepoResult, Room, Snowflake,
    SnowflakeGenerator, SwipeRecord, SwipeRepository, UserId,
};
use swipe_db::MemoryStore;
use tokio::sync::broadcast;

use super::context::{ServiceContext, ServiceContextBuilder};
use super::room::RoomService;

pub(crate) fn uid(name: &str) -> UserId {
    UserId::parse(name).unwrap()
}

/// Engine defaults with millisecond backoff
pub(crate) fn fast_engine() -> EngineConfig {
    EngineConfig {
        retry: RetryPolicy {
            max_attempts: 3,
            initial: Duration::from_millis(1),
            max: Duration::from_millis(5),
            multiplier: 2.0,
        },
        ..EngineConfig::default()
    }
}

fn builder(store: MemoryStore, feed: Arc<dyn ChangeFeed>, engine: EngineConfig) -> ServiceContextBuilder {
    ServiceContextBuilder::new()
        .memory_store(store)
        .feed(feed)
        .snowflake_generator(Arc::new(SnowflakeGenerator::new(1)))
        .engine(engine)
}

pub(crate) fn context() -> ServiceContext {
    context_with_engine(fast_engine())
}

pub(crate) fn context_with_engine(engine: EngineConfig) -> ServiceContext {
    builder(MemoryStore::new(), Arc::new(LocalFeed::new()), engine)
        .build()
        .unwrap()
}

pub(crate) fn context_with_feed(feed: Arc<dyn ChangeFeed>) -> ServiceContext {
    builder(MemoryStore::new(), feed, fast_engine()).build().unwrap()
}

/// Rooms and matches from `store`, swipes through `swipes`
pub(crate) fn context_with_store(store: MemoryStore, swipes: Arc<dyn SwipeRepository>) -> ServiceContext {
    builder(store, Arc::new(LocalFeed::new()), fast_engine())
        .swipe_repo(swipes)
        .build()
        .unwrap()
}

/// Rooms and swipes from `store`, matches through `matches`
pub(crate) fn context_with_matches(store: MemoryStore, matches: Arc<dyn MatchRepository>) -> ServiceContext {
    builder(store, Arc::new(LocalFeed::new()), fast_engine())
        .match_repo(matches)
        .build()
        .unwrap()
}

/// Active room owned by `users[0]` with the others joined in order
pub(crate) async fn room_with(ctx: &ServiceContext, users: &[&str]) -> Room {
    let service = RoomService::new(ctx);
    let mut room = service
        .create_room(uid(users[0]), "Test room", users[0])
        .await
        .unwrap();
    for user in &users[1..] {
        room = service.join_room(room.pin.as_str(), uid(user), user).await.unwrap();
    }
    room
}

/// Local feed that also remembers what was published
#[derive(Default)]
pub(crate) struct RecordingFeed {
    inner: LocalFeed,
    events: Mutex<Vec<DomainEvent>>,
}

impl RecordingFeed {
    pub(crate) fn event_types(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(DomainEvent::event_type).collect()
    }
}

#[async_trait]
impl ChangeFeed for RecordingFeed {
    async fn publish(&self, event: &DomainEvent) -> Result<(), FeedError> {
        self.events.lock().push(event.clone());
        self.inner.publish(event).await
    }

    async fn listen(&self, room_id: Snowflake) -> Result<broadcast::Receiver<FeedNotice>, FeedError> {
        self.inner.listen(room_id).await
    }
}

/// Swipe ledger whose first `failures` writes fail as unavailable
pub(crate) struct FlakySwipes {
    inner: MemoryStore,
    failures: AtomicU32,
}

impl FlakySwipes {
    pub(crate) fn new(inner: MemoryStore, failures: u32) -> Self {
        Self {
            inner,
            failures: AtomicU32::new(failures),
        }
    }

    pub(crate) fn failures_left(&self) -> u32 {
        self.failures.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SwipeRepository for FlakySwipes {
    async fn exists(&self, room_id: Snowflake, user_id: &UserId, candidate_id: &CandidateId) -> RepoResult<bool> {
        self.inner.exists(room_id, user_id, candidate_id).await
    }

    async fn record(&self, swipe: &SwipeRecord) -> RepoResult<()> {
        let failed = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(DomainError::TransientStore("connection reset".into()));
        }
        self.inner.record(swipe).await
    }

    async fn find_by_candidate(&self, room_id: Snowflake, candidate_id: &CandidateId) -> RepoResult<Vec<SwipeRecord>> {
        SwipeRepository::find_by_candidate(&self.inner, room_id, candidate_id).await
    }

    async fn find_by_room(&self, room_id: Snowflake) -> RepoResult<Vec<SwipeRecord>> {
        self.inner.find_by_room(room_id).await
    }
}

/// Match store whose candidate lookups always miss, so every evaluation
/// reaches the insert and only the unique key decides
pub(crate) struct BlindMatchLookups {
    inner: MemoryStore,
}

impl BlindMatchLookups {
    pub(crate) fn new(inner: MemoryStore) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl MatchRepository for BlindMatchLookups {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Match>> {
        MatchRepository::find_by_id(&self.inner, id).await
    }

    async fn find_by_candidate(&self, _room_id: Snowflake, _candidate_id: &CandidateId) -> RepoResult<Option<Match>> {
        Ok(None)
    }

    async fn create(&self, m: &Match) -> RepoResult<()> {
        MatchRepository::create(&self.inner, m).await
    }

    async fn list_recent(&self, room_id: Snowflake, limit: i64) -> RepoResult<Vec<Match>> {
        self.inner.list_recent(room_id, limit).await
    }

    async fn mark_viewed(&self, id: Snowflake) -> RepoResult<bool> {
        self.inner.mark_viewed(id).await
    }
}
