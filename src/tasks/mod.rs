//! Background Tasks Module
//!
//! Contains background tasks that run periodically alongside the cache.
//!
//! # Tasks
//! - Expiry sweep: reclaims memory held by expired entries at configured intervals

mod sweep;

pub use sweep::spawn_sweep_task;
