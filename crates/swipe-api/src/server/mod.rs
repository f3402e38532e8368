//! Server setup and initialization
//!
//! Wires the configured store and feed into a service context, builds the
//! router and runs it.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use swipe_cache::{ChangeFeed, LocalFeed, RedisFeed};
use swipe_common::{AppConfig, AppError, FeedBackend, JwtService, StoreBackend};
use swipe_core::SnowflakeGenerator;
use swipe_db::{
    create_pool, default_migrations_dir, run_migrations, MemoryStore, PgMatchRepository,
    PgRoomRepository, PgSwipeRepository,
};
use swipe_service::ServiceContextBuilder;
use tokio::net::TcpListener;
use tracing::info;

use crate::middleware::apply_middleware_with_config;
use crate::routes::{create_router, health_routes};
use crate::state::{AppState, FeedHandle, StoreHandle};

/// Build the complete Axum application with all routes and middleware
pub fn create_app(state: AppState) -> Result<Router, AppError> {
    let config = state.config();
    let api = apply_middleware_with_config(
        create_router(),
        &config.rate_limit,
        &config.cors,
        config.app.env.is_production(),
    )?;

    Ok(health_routes().merge(api).with_state(state))
}

/// Initialize all dependencies and create AppState
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    let mut builder = ServiceContextBuilder::new()
        .snowflake_generator(Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id)))
        .engine(config.engine.clone());

    let store = match config.store {
        StoreBackend::Postgres => {
            let db = config
                .database
                .as_ref()
                .ok_or_else(|| AppError::Config("DATABASE_URL is required for the postgres store".to_string()))?;

            info!("Connecting to PostgreSQL...");
            let pool = create_pool(&swipe_db::DatabaseConfig::from(db))
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            info!("PostgreSQL connection established");

            if db.run_migrations {
                run_migrations(&pool, &default_migrations_dir())
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
            }

            builder = builder
                .room_repo(Arc::new(PgRoomRepository::new(pool.clone())))
                .swipe_repo(Arc::new(PgSwipeRepository::new(pool.clone())))
                .match_repo(Arc::new(PgMatchRepository::new(pool.clone())));
            StoreHandle::Postgres(pool)
        }
        StoreBackend::Memory => {
            info!("Using in-memory store; state is lost on restart");
            builder = builder.memory_store(MemoryStore::new());
            StoreHandle::Memory
        }
    };

    let (feed, feed_handle): (Arc<dyn ChangeFeed>, FeedHandle) = match config.feed {
        FeedBackend::Redis => {
            let redis = config
                .redis
                .as_ref()
                .ok_or_else(|| AppError::Config("REDIS_URL is required for the redis feed".to_string()))?;

            info!("Connecting to Redis...");
            let feed = Arc::new(RedisFeed::from_config(redis).map_err(|e| AppError::Cache(e.to_string()))?);
            info!("Redis feed ready");
            (feed.clone(), FeedHandle::Redis(feed))
        }
        FeedBackend::Local => (Arc::new(LocalFeed::new()), FeedHandle::Local),
    };

    let service_context = builder
        .feed(feed)
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    let jwt_service = JwtService::from_config(&config.jwt);

    Ok(AppState::new(service_context, jwt_service, config, store, feed_handle))
}

/// Serve `app` on an already bound listener
pub async fn serve(listener: TcpListener, app: Router) -> Result<(), AppError> {
    let addr = listener
        .local_addr()
        .map_err(|e| AppError::Config(format!("Listener has no address: {e}")))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = config.api.address();

    let state = create_app_state(config).await?;
    let app = create_app(state)?;

    info!("Starting HTTP server on {}", addr);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    serve(listener, app).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
