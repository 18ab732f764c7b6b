use crate::cache::entry::CacheEntry;
use crate::cache::stats::{CacheStats, TierStats};
use crate::workspace::Workspace;
use dashmap::DashMap;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::time::Duration;
use tracing::debug;

pub const WORKSPACE_TTL: Duration = Duration::from_secs(300);
pub const BOARD_OVERVIEW_TTL: Duration = Duration::from_secs(180);
pub const ENTITY_DETAIL_TTL: Duration = Duration::from_secs(60);
/// Card detail entries kept before the oldest is evicted.
pub const ENTITY_DETAIL_CAPACITY: usize = 100;

const WORKSPACE_KEY: &str = "workspace";

/// Which of the three cache scopes an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKey<'a> {
    Workspace,
    BoardOverview(&'a str),
    EntityDetail(&'a str),
}

/// One scope: keyed entries sharing a TTL, plus lookup counters.
struct Tier<T> {
    name: &'static str,
    ttl: Duration,
    capacity: Option<usize>,
    entries: DashMap<String, CacheEntry<T>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<T: Clone> Tier<T> {
    fn new(name: &'static str, ttl: Duration, capacity: Option<usize>) -> Self {
        Self {
            name,
            ttl,
            capacity,
            entries: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Clone a still-valid entry out. The shard guard is released on return.
    fn lookup(&self, key: &str) -> Option<T> {
        let entry = self.entries.get(key)?;
        entry.is_valid().then(|| entry.data().clone())
    }

    async fn get_or_fetch<F, Fut, E>(&self, key: &str, fetch: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(data) = self.lookup(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(tier = self.name, key, "cache hit");
            return Ok(data);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(tier = self.name, key, "cache miss");

        let data = fetch().await?;
        self.store(key, data.clone());
        Ok(data)
    }

    fn store(&self, key: &str, data: T) {
        self.entries
            .insert(key.to_string(), CacheEntry::new(data, self.ttl));
        if let Some(capacity) = self.capacity {
            self.evict_oldest(capacity);
        }
    }

    fn evict_oldest(&self, capacity: usize) {
        while self.entries.len() > capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|entry| entry.created())
                .map(|entry| entry.key().clone());
            match oldest {
                Some(key) => {
                    debug!(tier = self.name, key = %key, "evicting oldest entry");
                    self.entries.remove(&key);
                }
                None => break,
            }
        }
    }

    fn peek(&self, key: &str) -> Option<T> {
        self.lookup(key)
    }

    fn invalidate(&self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            debug!(tier = self.name, key, "invalidated");
        }
        removed
    }

    fn invalidate_where(&self, predicate: impl Fn(&T) -> bool) -> usize {
        let keys: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| predicate(entry.data()))
            .map(|entry| entry.key().clone())
            .collect();
        for key in &keys {
            self.invalidate(key);
        }
        keys.len()
    }

    fn stats(&self) -> TierStats {
        TierStats::new(
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
            self.entries.len(),
        )
    }
}

/// Multi-tier TTL cache sitting in front of the remote API.
///
/// - workspace structure: one entry, 5 minutes
/// - board overviews: keyed by board id, 3 minutes
/// - card details: keyed by card id, 1 minute, at most 100 entries
///
/// A failed fetch stores nothing. Concurrent misses on the same key may
/// each fetch; the last writer wins.
pub struct Cache {
    workspace: Tier<Arc<Workspace>>,
    boards: Tier<Arc<Value>>,
    cards: Tier<Arc<Value>>,
}

impl Default for Cache {
    fn default() -> Self {
        Self::new()
    }
}

impl Cache {
    pub fn new() -> Self {
        Self {
            workspace: Tier::new("workspace", WORKSPACE_TTL, None),
            boards: Tier::new("board_overview", BOARD_OVERVIEW_TTL, None),
            cards: Tier::new(
                "entity_detail",
                ENTITY_DETAIL_TTL,
                Some(ENTITY_DETAIL_CAPACITY),
            ),
        }
    }

    pub async fn workspace<F, Fut, E>(&self, fetch: F) -> Result<Arc<Workspace>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Workspace, E>>,
    {
        self.workspace
            .get_or_fetch(WORKSPACE_KEY, || async move { fetch().await.map(Arc::new) })
            .await
    }

    pub async fn board_overview<F, Fut, E>(&self, board_id: &str, fetch: F) -> Result<Arc<Value>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, E>>,
    {
        self.boards
            .get_or_fetch(board_id, || async move { fetch().await.map(Arc::new) })
            .await
    }

    pub async fn card<F, Fut, E>(&self, card_id: &str, fetch: F) -> Result<Arc<Value>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, E>>,
    {
        self.cards
            .get_or_fetch(card_id, || async move { fetch().await.map(Arc::new) })
            .await
    }

    /// Cached workspace, if present and fresh. Does not touch the counters.
    pub fn peek_workspace(&self) -> Option<Arc<Workspace>> {
        self.workspace.peek(WORKSPACE_KEY)
    }

    /// Cached card detail, if present and fresh. Does not touch the counters.
    pub fn peek_card(&self, card_id: &str) -> Option<Arc<Value>> {
        self.cards.peek(card_id)
    }

    /// Drop one entry. Returns whether anything was removed.
    pub fn invalidate(&self, key: CacheKey<'_>) -> bool {
        match key {
            CacheKey::Workspace => self.workspace.invalidate(WORKSPACE_KEY),
            CacheKey::BoardOverview(board_id) => self.boards.invalidate(board_id),
            CacheKey::EntityDetail(card_id) => self.cards.invalidate(card_id),
        }
    }

    /// Drop every card detail entry whose payload matches `predicate`.
    pub fn invalidate_cards_where(&self, predicate: impl Fn(&Value) -> bool) -> usize {
        self.cards.invalidate_where(|card| predicate(&**card))
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            workspace: self.workspace.stats(),
            board_overview: self.boards.stats(),
            entity_detail: self.cards.stats(),
        }
    }
}
