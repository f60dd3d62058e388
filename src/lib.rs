//! memocache - An in-process memoizing cache
//!
//! Returns previously computed values while they are fresh, or runs a
//! producer (sync or async) exactly once per key and TTL window.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheKeyParameter, MemoizingCache, TypedCache};
pub use config::Config;
pub use tasks::spawn_sweep_task;
