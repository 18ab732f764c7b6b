use tokio::time::{Duration, Instant};

/// A cached payload stamped with its creation time and TTL.
///
/// Entries are never refreshed in place: a refetch replaces the entry.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    data: T,
    created: Instant,
    ttl: Duration,
}

impl<T> CacheEntry<T> {
    pub fn new(data: T, ttl: Duration) -> Self {
        Self {
            data,
            created: Instant::now(),
            ttl,
        }
    }

    /// `true` while less than `ttl` has elapsed since creation.
    pub fn is_valid(&self) -> bool {
        self.created.elapsed() < self.ttl
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn created(&self) -> Instant {
        self.created
    }
}
