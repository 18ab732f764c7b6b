//! In-memory TTL cache for workspace structure, board overviews and card
//! details.

mod entry;
mod stats;
mod store;


pub use entry::CacheEntry;
pub use stats::{CacheStats, TierStats};
pub use store::{
    BOARD_OVERVIEW_TTL, Cache, CacheKey, ENTITY_DETAIL_CAPACITY, ENTITY_DETAIL_TTL, WORKSPACE_TTL,
};
