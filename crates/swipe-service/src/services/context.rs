//! Service context - dependency container for services
//!
//! Holds the repositories, the change feed, and engine settings needed by
//! services.

use std::sync::Arc;

use swipe_cache::ChangeFeed;
use swipe_common::EngineConfig;
use swipe_core::traits::{MatchRepository, RoomRepository, SwipeRepository};
use swipe_core::{DomainEvent, Snowflake, SnowflakeGenerator};
use swipe_db::MemoryStore;

use super::error::{ServiceError, ServiceResult};
use super::match_cache::MatchQueryCache;

/// Service context containing all dependencies
///
/// Cheap to clone; background tasks (match evaluation, subscriptions) take
/// their own copy.
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    room_repo: Arc<dyn RoomRepository>,
    swipe_repo: Arc<dyn SwipeRepository>,
    match_repo: Arc<dyn MatchRepository>,

    // Change feed
    feed: Arc<dyn ChangeFeed>,

    // Engine
    snowflake_generator: Arc<SnowflakeGenerator>,
    engine: Arc<EngineConfig>,
    match_cache: Arc<MatchQueryCache>,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    pub fn new(
        room_repo: Arc<dyn RoomRepository>,
        swipe_repo: Arc<dyn SwipeRepository>,
        match_repo: Arc<dyn MatchRepository>,
        feed: Arc<dyn ChangeFeed>,
        snowflake_generator: Arc<SnowflakeGenerator>,
        engine: EngineConfig,
    ) -> Self {
        let match_cache = Arc::new(MatchQueryCache::new(engine.match_query_throttle));

        Self {
            room_repo,
            swipe_repo,
            match_repo,
            feed,
            snowflake_generator,
            engine: Arc::new(engine),
            match_cache,
        }
    }

    // === Repositories ===

    /// Get the room repository
    pub fn room_repo(&self) -> &dyn RoomRepository {
        self.room_repo.as_ref()
    }

    /// Get the swipe ledger
    pub fn swipe_repo(&self) -> &dyn SwipeRepository {
        self.swipe_repo.as_ref()
    }

    /// Get the match repository
    pub fn match_repo(&self) -> &dyn MatchRepository {
        self.match_repo.as_ref()
    }

    // === Change Feed ===

    pub fn feed(&self) -> &dyn ChangeFeed {
        self.feed.as_ref()
    }

    /// Announce a committed change. The commit already happened, so a feed
    /// failure is logged and otherwise ignored; listeners catch up on their
    /// next read.
    pub async fn publish(&self, event: DomainEvent) {
        if let Err(e) = self.feed.publish(&event).await {
            tracing::warn!(
                error = %e,
                room_id = %event.room_id(),
                event_type = event.event_type(),
                "Failed to publish change"
            );
        }
    }

    // === Engine ===

    pub fn engine(&self) -> &EngineConfig {
        &self.engine
    }

    pub fn match_cache(&self) -> &MatchQueryCache {
        &self.match_cache
    }

    /// Get the snowflake ID generator
    pub fn snowflake_generator(&self) -> &SnowflakeGenerator {
        self.snowflake_generator.as_ref()
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("feed", &"dyn ChangeFeed")
            .field("engine", &self.engine)
            .field("match_cache", &self.match_cache)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
pub struct ServiceContextBuilder {
    room_repo: Option<Arc<dyn RoomRepository>>,
    swipe_repo: Option<Arc<dyn SwipeRepository>>,
    match_repo: Option<Arc<dyn MatchRepository>>,
    feed: Option<Arc<dyn ChangeFeed>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
    engine: EngineConfig,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self {
            room_repo: None,
            swipe_repo: None,
            match_repo: None,
            feed: None,
            snowflake_generator: None,
            engine: EngineConfig::default(),
        }
    }

    pub fn room_repo(mut self, repo: Arc<dyn RoomRepository>) -> Self {
        self.room_repo = Some(repo);
        self
    }

    pub fn swipe_repo(mut self, repo: Arc<dyn SwipeRepository>) -> Self {
        self.swipe_repo = Some(repo);
        self
    }

    pub fn match_repo(mut self, repo: Arc<dyn MatchRepository>) -> Self {
        self.match_repo = Some(repo);
        self
    }

    /// Use one in-memory store for rooms, swipes and matches
    pub fn memory_store(self, store: MemoryStore) -> Self {
        let store = Arc::new(store);
        self.room_repo(store.clone())
            .swipe_repo(store.clone())
            .match_repo(store)
    }

    pub fn feed(mut self, feed: Arc<dyn ChangeFeed>) -> Self {
        self.feed = Some(feed);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    pub fn engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.room_repo.ok_or_else(|| ServiceError::validation("room_repo is required"))?,
            self.swipe_repo.ok_or_else(|| ServiceError::validation("swipe_repo is required"))?,
            self.match_repo.ok_or_else(|| ServiceError::validation("match_repo is required"))?,
            self.feed.ok_or_else(|| ServiceError::validation("feed is required"))?,
            self.snowflake_generator
                .ok_or_else(|| ServiceError::validation("snowflake_generator is required"))?,
            self.engine,
        ))
    }
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
