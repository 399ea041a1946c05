//! De-duplication of concurrent requests for the same resource.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;

use fleetwatch_adapters::ApiError;

use crate::MonitorError;

/// Shared handle to an in-flight request.
pub type InFlight<T> = Shared<BoxFuture<'static, Result<T, MonitorError>>>;

/// At most one request per key is in flight; later callers join it.
///
/// The request runs on its own task, so dropping every waiter does not
/// cancel it. The key is released when the request settles, whether it
/// succeeded or failed.
pub struct SingleFlight<K, T> {
    in_flight: Arc<Mutex<HashMap<K, InFlight<T>>>>,
}

impl<K, T> SingleFlight<K, T>
where
    K: Eq + Hash + Clone + Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Join the request for `key`, or start one with `start` if none is
    /// running. The flag is true when this call started the request.
    pub fn join_or_start<S, F>(&self, key: K, start: S) -> (InFlight<T>, bool)
    where
        S: FnOnce() -> F,
        F: Future<Output = Result<T, MonitorError>> + Send + 'static,
    {
        let mut in_flight = self.in_flight.lock();
        if let Some(existing) = in_flight.get(&key) {
            return (existing.clone(), false);
        }

        let slots = Arc::clone(&self.in_flight);
        let task_key = key.clone();
        let request = start();
        let handle = tokio::spawn(async move {
            let result = request.await;
            slots.lock().remove(&task_key);
            result
        });

        let shared = async move {
            match handle.await {
                Ok(result) => result,
                Err(e) => Err(MonitorError::Fetch(ApiError::Http(format!(
                    "request task failed: {}",
                    e
                )))),
            }
        }
        .boxed()
        .shared();

        in_flight.insert(key, shared.clone());
        (shared, true)
    }

    /// Number of requests currently in flight.
    pub fn len(&self) -> usize {
        self.in_flight.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.in_flight.lock().is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.in_flight.lock().contains_key(key)
    }
}

impl<K, T> Default for SingleFlight<K, T>
where
    K: Eq + Hash + Clone + Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, T> fmt::Debug for SingleFlight<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<_> = self.in_flight.lock().keys().map(|k| format!("{:?}", k)).collect();
        f.debug_struct("SingleFlight").field("in_flight", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_share_one_request() {
        let flight: SingleFlight<&'static str, u32> = SingleFlight::new();
        let started = Arc::new(AtomicUsize::new(0));

        let start = |started: Arc<AtomicUsize>| {
            move || async move {
                started.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok(7)
            }
        };

        let (a, first) = flight.join_or_start("fleet", start(Arc::clone(&started)));
        let (b, second) = flight.join_or_start("fleet", start(Arc::clone(&started)));
        assert!(first);
        assert!(!second);
        assert_eq!(flight.len(), 1);

        let (ra, rb) = tokio::join!(a, b);
        assert_eq!(ra, Ok(7));
        assert_eq!(rb, Ok(7));
        assert_eq!(started.load(Ordering::SeqCst), 1);

        tokio::task::yield_now().await;
        assert!(flight.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_distinct_keys_run_independently() {
        let flight: SingleFlight<String, u32> = SingleFlight::new();
        let (a, _) = flight.join_or_start("EC-AAA".to_string(), || async { Ok(1) });
        let (b, _) = flight.join_or_start("EC-BBB".to_string(), || async { Ok(2) });
        assert_eq!(flight.len(), 2);
        assert_eq!(a.await, Ok(1));
        assert_eq!(b.await, Ok(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_key_released_after_failure() {
        let flight: SingleFlight<&'static str, u32> = SingleFlight::new();
        let (fut, _) = flight.join_or_start("fleet", || async {
            Err(MonitorError::Fetch(ApiError::Timeout))
        });
        assert!(fut.await.is_err());
        tokio::task::yield_now().await;
        assert!(!flight.contains(&"fleet"));

        let (fut, started) = flight.join_or_start("fleet", || async { Ok(3) });
        assert!(started);
        assert_eq!(fut.await, Ok(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_survives_dropped_waiters() {
        let flight: SingleFlight<&'static str, u32> = SingleFlight::new();
        let done = Arc::new(AtomicUsize::new(0));
        let marker = Arc::clone(&done);

        let (fut, _) = flight.join_or_start("fleet", move || async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            marker.fetch_add(1, Ordering::SeqCst);
            Ok(1)
        });
        drop(fut);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(done.load(Ordering::SeqCst), 1);
        assert!(flight.is_empty());
    }
}
