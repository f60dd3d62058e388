//! Cache Module
//!
//! Provides in-memory memoization with TTL expiration and per-key exclusion.

mod clock;
mod entry;
mod gate;
mod key;
mod stats;
mod store;
mod typed;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use key::{compose_key, CacheKeyParameter, KeyValue, PARAMETER_SEPARATOR, VALUE_SEPARATOR};
pub use stats::CacheStats;
pub use store::MemoizingCache;
pub use typed::TypedCache;
