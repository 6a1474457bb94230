//! Single-flight request deduplication
//!
//! Two concurrent misses on the same key would both call the generator.
//! This guard serializes work per key inside one process: the second caller
//! waits for the first to finish, then re-checks the cache and gets a hit.
//! Best-effort only; correctness never depends on it (the store's
//! uniqueness constraint catches duplicates across processes).

use std::{collections::HashMap, future::Future, sync::Arc};

use parking_lot::Mutex;

/// Per-key in-process execution guard
#[derive(Debug, Default)]
pub struct SingleFlight {
    inflight: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl SingleFlight {
    /// Create an empty guard table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the guard for `key`
    ///
    /// Callers with the same key execute one at a time, in arrival order.
    pub async fn run<F, Fut, T>(&self, key: &str, f: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let gate = {
            let mut inflight = self.inflight.lock();
            Arc::clone(
                inflight
                    .entry(key.to_string())
                    .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
            )
        };

        let result = {
            let _permit = gate.lock().await;
            f().await
        };

        let mut inflight = self.inflight.lock();
        if let Some(existing) = inflight.get(key) {
            // Two strong refs means only the table and this call still hold
            // the gate; nobody is waiting.
            if Arc::strong_count(existing) <= 2 {
                inflight.remove(key);
            }
        }
        result
    }

    /// Number of keys currently tracked
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.inflight.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn runs_the_closure_and_returns_its_value() {
        let flight = SingleFlight::new();
        let value = flight.run("key", || async { 42 }).await;
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn guard_table_drains_after_completion() {
        let flight = SingleFlight::new();
        flight.run("key", || async {}).await;
        assert_eq!(flight.in_flight(), 0);
    }

    #[tokio::test]
    async fn same_key_never_runs_concurrently() {
        let flight = Arc::new(SingleFlight::new());
        let running = Arc::new(AtomicU32::new(0));
        let overlapped = Arc::new(AtomicU32::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let flight = Arc::clone(&flight);
            let running = Arc::clone(&running);
            let overlapped = Arc::clone(&overlapped);
            handles.push(tokio::spawn(async move {
                flight
                    .run("shared", || async {
                        if running.fetch_add(1, Ordering::SeqCst) > 0 {
                            overlapped.fetch_add(1, Ordering::SeqCst);
                        }
                        tokio::time::sleep(Duration::from_millis(5)).await;
                        running.fetch_sub(1, Ordering::SeqCst);
                    })
                    .await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(overlapped.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn different_keys_run_independently() {
        let flight = Arc::new(SingleFlight::new());
        let a = flight.run("a", || async { 1 });
        let b = flight.run("b", || async { 2 });
        let (ra, rb) = tokio::join!(a, b);
        assert_eq!((ra, rb), (1, 2));
    }
}
