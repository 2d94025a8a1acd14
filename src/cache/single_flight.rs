//! Per-key de-duplication of concurrent loads.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;

use futures::future::{BoxFuture, FutureExt, Shared};

type Flight<V> = Shared<BoxFuture<'static, V>>;

/// Registry of in-flight loads keyed by cache key.
///
/// Concurrent callers for the same key await one shared future instead of
/// each issuing their own upstream fetch. The entry is removed by whichever
/// caller leaves the flight first, whether the load completed, panicked or
/// the caller was cancelled, so a failed load is never joined again.
pub struct SingleFlight<V: Clone> {
    in_flight: Mutex<HashMap<String, Flight<V>>>,
}

/// Removes its flight from the registry when dropped, unless the key has
/// already moved on to a newer flight.
struct Departure<'a, V: Clone> {
    registry: &'a Mutex<HashMap<String, Flight<V>>>,
    key: &'a str,
    flight: Flight<V>,
}

impl<V: Clone> Drop for Departure<'_, V> {
    fn drop(&mut self) {
        let mut in_flight = self.registry.lock().unwrap_or_else(|e| e.into_inner());
        if in_flight
            .get(self.key)
            .is_some_and(|current| current.ptr_eq(&self.flight))
        {
            in_flight.remove(self.key);
        }
    }
}

impl<V: Clone> Default for SingleFlight<V> {
    fn default() -> Self {
        Self {
            in_flight: Mutex::new(HashMap::new()),
        }
    }
}

impl<V> SingleFlight<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `load` for `key` unless a load for that key is already running,
    /// in which case join it.
    pub async fn run<F, Fut>(&self, key: &str, load: F) -> V
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V> + Send + 'static,
    {
        let flight = {
            let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
            match in_flight.get(key) {
                Some(existing) => {
                    tracing::debug!(key, "joining in-flight load");
                    existing.clone()
                }
                None => {
                    let flight = load().boxed().shared();
                    in_flight.insert(key.to_string(), flight.clone());
                    flight
                }
            }
        };

        let departure = Departure {
            registry: &self.in_flight,
            key,
            flight,
        };
        departure.flight.clone().await
    }

    /// Detach the running load for `key`, if any. Callers already waiting on
    /// it still get its result; the next caller starts a fresh load.
    pub fn forget(&self, key: &str) {
        self.in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
    }

    /// Number of loads currently registered.
    pub fn in_flight(&self) -> usize {
        self.in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_concurrent_callers_share_one_load() {
        let flights = Arc::new(SingleFlight::<u32>::new());
        let loads = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..5 {
            let flights = flights.clone();
            let loads = loads.clone();
            handles.push(tokio::spawn(async move {
                flights
                    .run("eips", move || async move {
                        loads.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        7
                    })
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), 7);
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(flights.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_sequential_calls_load_again() {
        let flights = SingleFlight::<u32>::new();
        let loads = Arc::new(AtomicUsize::new(0));

        for expected in 1..=3 {
            let loads = loads.clone();
            let value = flights
                .run("eips", move || async move {
                    loads.fetch_add(1, Ordering::SeqCst) as u32 + 1
                })
                .await;
            assert_eq!(value, expected);
        }
        assert_eq!(loads.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_panicking_load_is_not_joined_again() {
        let flights = Arc::new(SingleFlight::<u32>::new());

        let first = {
            let flights = flights.clone();
            tokio::spawn(async move {
                flights
                    .run("eips", || async {
                        let missing: Option<u32> = None;
                        missing.expect("source exploded")
                    })
                    .await
            })
        };
        assert!(first.await.unwrap_err().is_panic());
        assert_eq!(flights.in_flight(), 0);

        let value = flights.run("eips", || async { 9 }).await;
        assert_eq!(value, 9);
        assert_eq!(flights.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_caller_releases_key() {
        let flights = Arc::new(SingleFlight::<u32>::new());

        let stuck = {
            let flights = flights.clone();
            tokio::spawn(async move {
                flights
                    .run("eips", || async {
                        tokio::time::sleep(Duration::from_secs(3600)).await;
                        1
                    })
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(flights.in_flight(), 1);

        stuck.abort();
        assert!(stuck.await.unwrap_err().is_cancelled());
        assert_eq!(flights.in_flight(), 0);
        assert_eq!(flights.run("eips", || async { 2 }).await, 2);
    }

    #[tokio::test]
    async fn test_forget_starts_a_fresh_load() {
        let flights = Arc::new(SingleFlight::<u32>::new());

        let slow = {
            let flights = flights.clone();
            tokio::spawn(async move {
                flights
                    .run("eips", || async {
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        1
                    })
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        flights.forget("eips");
        let fresh = flights.run("eips", || async { 2 }).await;

        assert_eq!(fresh, 2);
        assert_eq!(slow.await.unwrap(), 1);
        assert_eq!(flights.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_different_keys_do_not_share() {
        let flights = SingleFlight::<String>::new();
        let a = flights.run("a", || async { "a".to_string() });
        let b = flights.run("b", || async { "b".to_string() });
        let (a, b) = tokio::join!(a, b);
        assert_eq!(a, "a");
        assert_eq!(b, "b");
    }
}
