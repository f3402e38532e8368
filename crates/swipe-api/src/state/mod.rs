//! Application state
//!
//! Holds the shared state for the Axum application: the service context,
//! JWT verification, configuration, and handles used by the readiness probe.

use std::sync::Arc;

use swipe_cache::RedisFeed;
use swipe_common::{AppConfig, JwtService};
use swipe_db::PgPool;
use swipe_service::ServiceContext;

/// Store the server was started with, as seen by health checks
#[derive(Debug, Clone)]
pub enum StoreHandle {
    Postgres(PgPool),
    Memory,
}

impl StoreHandle {
    pub async fn is_healthy(&self) -> bool {
        match self {
            Self::Postgres(pool) => pool.acquire().await.is_ok(),
            Self::Memory => true,
        }
    }
}

/// Feed the server was started with, as seen by health checks
#[derive(Debug, Clone)]
pub enum FeedHandle {
    Redis(Arc<RedisFeed>),
    Local,
}

impl FeedHandle {
    pub async fn is_healthy(&self) -> bool {
        match self {
            Self::Redis(feed) => feed.health_check().await.is_ok(),
            Self::Local => true,
        }
    }
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    service_context: Arc<ServiceContext>,
    jwt_service: Arc<JwtService>,
    config: Arc<AppConfig>,
    store: StoreHandle,
    feed: FeedHandle,
}

impl AppState {
    pub fn new(
        service_context: ServiceContext,
        jwt_service: JwtService,
        config: AppConfig,
        store: StoreHandle,
        feed: FeedHandle,
    ) -> Self {
        Self {
            service_context: Arc::new(service_context),
            jwt_service: Arc::new(jwt_service),
            config: Arc::new(config),
            store,
            feed,
        }
    }

    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    pub fn store(&self) -> &StoreHandle {
        &self.store
    }

    pub fn feed(&self) -> &FeedHandle {
        &self.feed
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &"ServiceContext")
            .field("store", &self.store)
            .field("feed", &self.feed)
            .finish()
    }
}
