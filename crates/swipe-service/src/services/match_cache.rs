//! Coalescing window for match list queries
//!
//! Every caller asking for a room's matches within the window shares the
//! result of the first read, including callers that arrive while that read
//! is still in flight. Not authoritative: a new match evicts the room.

use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use swipe_core::{Match, Snowflake};
use tokio::sync::OnceCell;

struct Slot {
    opened_at: Instant,
    cell: Arc<OnceCell<Arc<[Match]>>>,
}

/// Per-room throttle for [`super::MatchService::get_matches`]
pub struct MatchQueryCache {
    window: Duration,
    slots: DashMap<Snowflake, Slot>,
}

impl MatchQueryCache {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            slots: DashMap::new(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Return the room's list from the current window, or run `load` to
    /// open a new window. A failed load leaves the window empty so the next
    /// caller tries again.
    pub async fn get_or_load<F, Fut, E>(&self, room_id: Snowflake, load: F) -> Result<Arc<[Match]>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Match>, E>>,
    {
        let cell = self.slot(room_id);
        let matches = cell
            .get_or_try_init(|| async { load().await.map(Arc::from) })
            .await?;
        Ok(Arc::clone(matches))
    }

    /// Drop the room's window so the next query reads the store
    pub fn evict(&self, room_id: Snowflake) {
        self.slots.remove(&room_id);
    }

    /// Rooms with an open window
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn slot(&self, room_id: Snowflake) -> Arc<OnceCell<Arc<[Match]>>> {
        if let Some(slot) = self.slots.get(&room_id) {
            if slot.opened_at.elapsed() < self.window {
                return Arc::clone(&slot.cell);
            }
        }

        let window = self.window;
        self.slots
            .retain(|_, slot| slot.opened_at.elapsed() < window);

        let mut entry = self.slots.entry(room_id).or_insert_with(|| Slot {
            opened_at: Instant::now(),
            cell: Arc::new(OnceCell::new()),
        });
        // Another caller may have raced us to an expired slot
        if entry.opened_at.elapsed() >= window {
            *entry = Slot {
                opened_at: Instant::now(),
                cell: Arc::new(OnceCell::new()),
            };
        }
        Arc::clone(&entry.cell)
    }
}

impl std::fmt::Debug for MatchQueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchQueryCache")
            .field("window", &self.window)
            .field("rooms", &self.slots.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    async fn load(calls: &AtomicU32) -> Result<Vec<Match>, String> {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(Vec::new())
    }

    #[tokio::test]
    async fn test_repeated_queries_share_one_read() {
        let cache = MatchQueryCache::new(Duration::from_secs(20));
        let calls = AtomicU32::new(0);
        let room = Snowflake::new(1);

        for _ in 0..5 {
            cache.get_or_load(room, || load(&calls)).await.unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_rooms_have_separate_windows() {
        let cache = MatchQueryCache::new(Duration::from_secs(20));
        let calls = AtomicU32::new(0);

        cache.get_or_load(Snowflake::new(1), || load(&calls)).await.unwrap();
        cache.get_or_load(Snowflake::new(2), || load(&calls)).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_evict_forces_a_fresh_read() {
        let cache = MatchQueryCache::new(Duration::from_secs(20));
        let calls = AtomicU32::new(0);
        let room = Snowflake::new(1);

        cache.get_or_load(room, || load(&calls)).await.unwrap();
        cache.evict(room);
        cache.get_or_load(room, || load(&calls)).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_zero_window_never_caches() {
        let cache = MatchQueryCache::new(Duration::ZERO);
        let calls = AtomicU32::new(0);
        let room = Snowflake::new(1);

        cache.get_or_load(room, || load(&calls)).await.unwrap();
        cache.get_or_load(room, || load(&calls)).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_load_is_not_cached() {
        let cache = MatchQueryCache::new(Duration::from_secs(20));
        let room = Snowflake::new(1);

        let failed: Result<_, String> = cache
            .get_or_load(room, || async { Err("store down".to_string()) })
            .await;
        assert!(failed.is_err());

        let calls = AtomicU32::new(0);
        cache.get_or_load(room, || load(&calls)).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_callers_coalesce() {
        let cache = Arc::new(MatchQueryCache::new(Duration::from_secs(20)));
        let calls = Arc::new(AtomicU32::new(0));
        let room = Snowflake::new(1);

        let mut handles = Vec::new();
        for _ in 0..10 {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_load(room, || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok::<_, String>(Vec::new())
                    })
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
