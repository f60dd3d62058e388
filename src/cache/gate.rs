//! Key Gate Module
//!
//! Per-key exclusion used around the "check miss, compute, store" sequence.
//!
//! Every composite key under computation owns one `tokio::sync::Mutex<()>`.
//! Synchronous callers block on it, asynchronous callers await it, so both
//! variants share a single exclusion domain per key. Callers racing on
//! unrelated keys never contend. A gate is dropped from the table as soon as
//! its last holder or waiter lets go, including when a waiting future is
//! cancelled.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::{Mutex, OwnedMutexGuard};

type Gate = Arc<Mutex<()>>;

// == Key Gates ==
/// Table of exclusion gates keyed by composite key.
#[derive(Debug, Default)]
pub struct KeyGates {
    gates: DashMap<String, Gate>,
}

impl KeyGates {
    /// Creates an empty gate table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers interest in `key`, creating its gate if needed.
    fn handle(&self, key: &str) -> GateHandle<'_> {
        let gate = self.gates.entry(key.to_string()).or_default().value().clone();
        GateHandle {
            gates: self,
            key: key.to_string(),
            gate,
        }
    }

    // == Acquire (blocking) ==
    /// Blocks the current thread until the gate for `key` is held.
    ///
    /// A free gate is taken without blocking, so uncontended callers work
    /// from any thread. A held gate is waited on with `block_in_place` when
    /// the caller runs on a multi-thread runtime.
    ///
    /// # Panics
    /// Panics if the gate is held and the caller runs on a current-thread
    /// runtime, where waiting would stall the holder.
    pub fn acquire_blocking(&self, key: &str) -> GateLease<'_> {
        let handle = self.handle(key);
        let guard = match handle.gate.clone().try_lock_owned() {
            Ok(guard) => guard,
            Err(_) => wait_blocking(handle.gate.clone()),
        };
        GateLease {
            _guard: guard,
            _handle: handle,
        }
    }

    // == Acquire (async) ==
    /// Waits until the gate for `key` is held.
    ///
    /// Dropping the returned future before it resolves releases the caller's
    /// interest in the gate.
    pub async fn acquire(&self, key: &str) -> GateLease<'_> {
        let handle = self.handle(key);
        let guard = handle.gate.clone().lock_owned().await;
        GateLease {
            _guard: guard,
            _handle: handle,
        }
    }

    /// Number of keys that currently have a holder or waiters.
    pub fn active(&self) -> usize {
        self.gates.len()
    }
}

/// Waits for a held gate from synchronous code.
fn wait_blocking(gate: Gate) -> OwnedMutexGuard<()> {
    match Handle::try_current() {
        Ok(runtime) if runtime.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(|| gate.blocking_lock_owned())
        }
        _ => gate.blocking_lock_owned(),
    }
}

// == Gate Handle ==
/// A caller's reference to a gate, removed from the table when unused.
struct GateHandle<'a> {
    gates: &'a KeyGates,
    key: String,
    gate: Gate,
}

impl Drop for GateHandle<'_> {
    fn drop(&mut self) {
        // The table and this handle are the only owners left.
        self.gates.gates.remove_if(&self.key, |_, gate| {
            Arc::ptr_eq(gate, &self.gate) && Arc::strong_count(gate) == 2
        });
    }
}

// == Gate Lease ==
/// Exclusive hold on a key's gate, released on drop.
pub struct GateLease<'a> {
    // Field order matters: the guard is released before the handle drops.
    _guard: OwnedMutexGuard<()>,
    _handle: GateHandle<'a>,
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_gate_removed_after_release() {
        let gates = KeyGates::new();
        {
            let _lease = gates.acquire_blocking("k");
            assert_eq!(gates.active(), 1);
        }
        assert_eq!(gates.active(), 0);
    }

    #[tokio::test]
    async fn test_free_gate_taken_inside_current_thread_runtime() {
        let gates = KeyGates::new();
        {
            let _lease = gates.acquire_blocking("k");
            assert_eq!(gates.active(), 1);
        }
        let _again = gates.acquire_blocking("k");
        assert_eq!(gates.active(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_held_gate_waited_on_worker_thread() {
        let gates = Arc::new(KeyGates::new());
        let lease = gates.acquire("k").await;

        let waiter = {
            let gates = gates.clone();
            tokio::spawn(async move {
                let _lease = gates.acquire_blocking("k");
            })
        };

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(!waiter.is_finished(), "Sync caller must wait while the gate is held");

        drop(lease);
        waiter.await.unwrap();
        assert_eq!(gates.active(), 0);
    }

    #[tokio::test]
    async fn test_async_gate_removed_after_release() {
        let gates = KeyGates::new();
        {
            let _a = gates.acquire("a").await;
            let _b = gates.acquire("b").await;
            assert_eq!(gates.active(), 2);
        }
        assert_eq!(gates.active(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_waiter_releases_interest() {
        let gates = KeyGates::new();
        let lease = gates.acquire("k").await;

        let waited = tokio::time::timeout(Duration::from_millis(20), gates.acquire("k")).await;
        assert!(waited.is_err(), "Second caller must wait while the gate is held");

        drop(lease);
        assert_eq!(gates.active(), 0);
    }

    #[test]
    fn test_same_key_is_exclusive() {
        let gates = Arc::new(KeyGates::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));

        let threads: Vec<_> = (0..8)
            .map(|_| {
                let gates = gates.clone();
                let inside = inside.clone();
                let max_inside = max_inside.clone();
                std::thread::spawn(move || {
                    let _lease = gates.acquire_blocking("shared");
                    let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                    max_inside.fetch_max(now, Ordering::SeqCst);
                    std::thread::sleep(Duration::from_millis(5));
                    inside.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();

        for t in threads {
            t.join().unwrap();
        }

        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
        assert_eq!(gates.active(), 0);
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_contend() {
        let gates = KeyGates::new();
        let _a = gates.acquire("a").await;

        let b = tokio::time::timeout(Duration::from_millis(50), gates.acquire("b")).await;
        assert!(b.is_ok(), "Unrelated key must not wait");
    }
}
