use serde::Serialize;

/// Hit/miss counters for one cache scope at the moment of the snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TierStats {
    pub hits: u64,
    pub misses: u64,
    /// Entries currently stored, valid or not.
    pub entries: usize,
    /// `hits / (hits + misses)`, `0.0` before any lookup.
    pub hit_rate: f64,
}

impl TierStats {
    pub fn new(hits: u64, misses: u64, entries: usize) -> Self {
        let total = hits + misses;
        let hit_rate = if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        };
        Self {
            hits,
            misses,
            entries,
            hit_rate,
        }
    }
}

/// Read-only snapshot of all three scopes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CacheStats {
    pub workspace: TierStats,
    pub board_overview: TierStats,
    pub entity_detail: TierStats,
}
