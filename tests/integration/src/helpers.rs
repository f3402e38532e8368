//! Test helpers for integration tests
//!
//! Provides utilities for spawning test servers, minting tokens, making
//! HTTP requests and waiting on asynchronous effects.

use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use swipe_api::{create_app, create_app_state, serve};
use swipe_common::{AppConfig, JwtService};
use swipe_core::UserId;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// How long [`eventually`] keeps probing
pub const EVENTUALLY_TIMEOUT: Duration = Duration::from_secs(3);

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    jwt: JwtService,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server on the in-memory store and local feed
    pub async fn start() -> Result<Self> {
        Self::start_with_config(test_config()?).await
    }

    /// Start a test server with custom config
    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        let jwt = JwtService::from_config(&config.jwt);

        let state = create_app_state(config).await?;
        let app = create_app(state)?;

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            serve(listener, app).await.ok();
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            jwt,
            handle,
        })
    }

    /// Bearer token for `user_id`, valid for an hour
    pub fn token(&self, user_id: &str) -> Result<String> {
        Ok(self.jwt.issue(&UserId::parse(user_id)?, 3600)?)
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// WebSocket URL with the token in the query string
    pub fn ws_url(&self, path: &str, token: &str) -> String {
        format!("ws://{}{}?access_token={}", self.addr, path, token)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).send().await?)
    }

    /// Make a GET request with auth token
    pub async fn get_auth(&self, path: &str, token: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).bearer_auth(token).send().await?)
    }

    /// Make a POST request with auth token and JSON body
    pub async fn post_auth<T: Serialize>(&self, path: &str, token: &str, body: &T) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.post(&url).bearer_auth(token).json(body).send().await?)
    }

    /// Make a POST request with auth token and no body
    pub async fn post_empty_auth(&self, path: &str, token: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.post(&url).bearer_auth(token).send().await?)
    }

    /// Make a PUT request with auth token and JSON body
    pub async fn put_auth<T: Serialize>(&self, path: &str, token: &str, body: &T) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.put(&url).bearer_auth(token).json(body).send().await?)
    }

    /// Make a DELETE request with auth token
    pub async fn delete_auth(&self, path: &str, token: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.delete(&url).bearer_auth(token).send().await?)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Configuration for an in-memory, single-process server
pub fn test_config() -> Result<AppConfig> {
    config_with(&[])
}

/// [`test_config`] with some variables replaced
pub fn config_with(overrides: &[(&str, &str)]) -> Result<AppConfig> {
    let mut vars: HashMap<&str, String> = [
        ("STORE_BACKEND", "memory"),
        ("FEED_BACKEND", "local"),
        ("JWT_SECRET", "integration-test-secret"),
        ("RATE_LIMIT_REQUESTS_PER_SECOND", "1000"),
        ("RATE_LIMIT_BURST", "10000"),
        ("RETRY_INITIAL_DELAY_MS", "1"),
        ("RETRY_MAX_DELAY_MS", "10"),
    ]
    .into_iter()
    .map(|(k, v)| (k, v.to_string()))
    .collect();

    for &(key, value) in overrides {
        vars.insert(key, value.to_string());
    }

    AppConfig::from_lookup(|key| vars.get(key).cloned()).map_err(|e| anyhow::anyhow!("Config error: {e}"))
}

/// PostgreSQL-backed configuration, when `DATABASE_URL` is set
pub fn postgres_config() -> Option<AppConfig> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return None;
    };

    config_with(&[
        ("STORE_BACKEND", "postgres"),
        ("DATABASE_URL", &url),
        ("DATABASE_RUN_MIGRATIONS", "true"),
    ])
    .ok()
}

/// Probe until it yields a value or [`EVENTUALLY_TIMEOUT`] passes
pub async fn eventually<T, F, Fut>(mut probe: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let deadline = tokio::time::Instant::now() + EVENTUALLY_TIMEOUT;
    loop {
        if let Some(value) = probe().await? {
            return Ok(value);
        }
        if tokio::time::Instant::now() >= deadline {
            anyhow::bail!("condition not met within {:?}", EVENTUALLY_TIMEOUT);
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(response: Response, expected_status: StatusCode) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {}, got {}. Body: {}", expected_status, status, body);
    }
    Ok(response.json().await?)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {}, got {}. Body: {}", expected_status, status, body);
    }
    Ok(())
}
