//! Query hooks: observable fetch state bound to a data service.
//!
//! A [`QueryHook`] wraps a fetch function and exposes its `loading / error /
//! data` triple through a `tokio::sync::watch` channel. Every fetch is tagged
//! with a sequence number; only the response to the latest issued fetch is
//! applied, so a slow response can never overwrite a newer one. After
//! [`QueryHook::unmount`] the polling task is aborted and any response still
//! in flight is dropped without touching the state.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::cache::Clock;
use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStatus {
    Idle,
    Loading,
    Success,
    Error,
}

/// Snapshot of a hook's state.
///
/// `data` keeps the last successful value while a refetch is loading or after
/// it failed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryState<T> {
    pub status: QueryStatus,
    pub data: Option<T>,
    pub error: Option<String>,
    pub sequence: u64,
    pub updated_at: Option<DateTime<Utc>>,
}

impl<T> QueryState<T> {
    fn idle() -> Self {
        Self {
            status: QueryStatus::Idle,
            data: None,
            error: None,
            sequence: 0,
            updated_at: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading
    }
}

pub type Fetcher<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T, AppError>> + Send + Sync>;

/// Wrap an async closure as a [`Fetcher`].
pub fn fetcher<T, F, Fut>(f: F) -> Fetcher<T>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, AppError>> + Send + 'static,
{
    Arc::new(move || f().boxed())
}

struct HookInner<T> {
    name: &'static str,
    fetcher: Fetcher<T>,
    state: watch::Sender<QueryState<T>>,
    issued: AtomicU64,
    mounted: AtomicBool,
    clock: Arc<dyn Clock>,
}

impl<T> HookInner<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn fetch(&self) {
        if !self.mounted.load(Ordering::SeqCst) {
            tracing::debug!(hook = self.name, "fetch skipped, hook not mounted");
            return;
        }

        let sequence = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let started = self.state.send_if_modified(|state| {
            if !self.mounted.load(Ordering::SeqCst) {
                return false;
            }
            state.status = QueryStatus::Loading;
            state.sequence = sequence;
            true
        });
        if !started {
            return;
        }

        let fetcher = self.fetcher.clone();
        let outcome = AssertUnwindSafe(async move { fetcher().await })
            .catch_unwind()
            .await;
        let result = match outcome {
            Ok(result) => result,
            Err(panic) => {
                let reason = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                tracing::error!(hook = self.name, sequence, %reason, "fetch panicked");
                Err(AppError::Internal(format!("fetch panicked: {reason}")))
            }
        };

        if !self.mounted.load(Ordering::SeqCst) {
            tracing::debug!(hook = self.name, sequence, "response after unmount discarded");
            return;
        }
        if sequence != self.issued.load(Ordering::SeqCst) {
            tracing::debug!(hook = self.name, sequence, "stale response discarded");
            return;
        }

        let now = self.clock.now();
        self.state.send_modify(|state| {
            match result {
                Ok(data) => {
                    state.status = QueryStatus::Success;
                    state.data = Some(data);
                    state.error = None;
                }
                Err(e) => {
                    state.status = QueryStatus::Error;
                    state.error = Some(e.message());
                }
            }
            state.updated_at = Some(now);
        });
    }
}

/// A mounted query with optional interval polling.
pub struct QueryHook<T> {
    inner: Arc<HookInner<T>>,
    poller: Mutex<Option<JoinHandle<()>>>,
}

impl<T> QueryHook<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(name: &'static str, fetcher: Fetcher<T>, clock: Arc<dyn Clock>) -> Self {
        let (state, _) = watch::channel(QueryState::idle());
        Self {
            inner: Arc::new(HookInner {
                name,
                fetcher,
                state,
                issued: AtomicU64::new(0),
                mounted: AtomicBool::new(false),
                clock,
            }),
            poller: Mutex::new(None),
        }
    }

    /// Mount the hook and run the initial fetch.
    pub async fn mount(&self) {
        self.inner.mounted.store(true, Ordering::SeqCst);
        tracing::debug!(hook = self.inner.name, "mounted");
        self.inner.fetch().await;
    }

    /// Fetch again, returning the state once this fetch has settled.
    pub async fn refetch(&self) -> QueryState<T> {
        self.inner.fetch().await;
        self.snapshot()
    }

    /// Refetch every `period` while mounted, replacing any previous poller.
    ///
    /// # Panics
    ///
    /// Panics if `period` is zero.
    pub fn poll_every(&self, period: Duration) {
        assert!(!period.is_zero(), "poll interval must be greater than zero");

        let inner = self.inner.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if !inner.mounted.load(Ordering::SeqCst) {
                    break;
                }
                inner.fetch().await;
            }
        });

        let previous = self
            .poller
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    pub fn is_polling(&self) -> bool {
        self.poller
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stop polling and ignore responses still in flight. A fetch cut off
    /// mid-flight leaves the hook `Idle` with its last data.
    pub fn unmount(&self) {
        self.inner.mounted.store(false, Ordering::SeqCst);
        self.stop_polling();
        self.inner.state.send_if_modified(|state| {
            if state.status != QueryStatus::Loading {
                return false;
            }
            state.status = QueryStatus::Idle;
            true
        });
        tracing::debug!(hook = self.inner.name, "unmounted");
    }

    fn stop_polling(&self) {
        if let Some(handle) = self
            .poller
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            handle.abort();
        }
    }

    pub fn snapshot(&self) -> QueryState<T> {
        self.inner.state.borrow().clone()
    }

    /// Every state write, in order. Only tests observe transitions directly.
    #[cfg(test)]
    pub fn subscribe(&self) -> watch::Receiver<QueryState<T>> {
        self.inner.state.subscribe()
    }
}

impl<T> Drop for QueryHook<T> {
    fn drop(&mut self) {
        if let Some(handle) = self
            .poller
            .get_mut()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{SystemClock, TimedCache};
    use crate::data::fallback_eips;
    use crate::models::Eip;
    use crate::services::{DatasetService, EipService};
    use crate::sources::{DataSource, SourceError, StaticDataset};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    struct Unreachable;

    #[async_trait]
    impl DataSource<Eip> for Unreachable {
        fn name(&self) -> &str {
            "unreachable"
        }

        async fn load(&self) -> Result<Vec<Eip>, SourceError> {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Err(SourceError::Http("connection timed out".to_string()))
        }
    }

    fn clock() -> Arc<dyn Clock> {
        Arc::new(SystemClock)
    }

    /// Hook whose n-th fetch (0-based) sleeps `delays[n]` and returns `n`.
    fn counting_hook(delays: Vec<u64>) -> (Arc<QueryHook<usize>>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let hook = QueryHook::new(
            "counting",
            fetcher(move || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                let delay = delays.get(n).copied().unwrap_or(0);
                async move {
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    Ok::<_, AppError>(n)
                }
            }),
            clock(),
        );
        (Arc::new(hook), calls)
    }

    #[tokio::test(start_paused = true)]
    async fn test_cold_start_reaches_success_through_loading() {
        let eips = Arc::new(EipService::new(
            DatasetService::new(
                "eips",
                TimedCache::new(Duration::from_secs(300), clock()),
                Arc::new(Unreachable),
                StaticDataset::new(fallback_eips()),
            ),
            clock(),
        ));
        let hook = Arc::new(QueryHook::new(
            "catalog",
            fetcher(move || {
                let eips = eips.clone();
                async move { Ok::<_, AppError>(eips.get_all().await) }
            }),
            clock(),
        ));
        let mut rx = hook.subscribe();
        assert_eq!(rx.borrow_and_update().status, QueryStatus::Idle);

        let mounting = hook.clone();
        let task = tokio::spawn(async move { mounting.mount().await });

        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_loading());

        rx.changed().await.unwrap();
        let state = rx.borrow_and_update().clone();
        assert_eq!(state.status, QueryStatus::Success);
        assert!(state.error.is_none());
        let data = state.data.unwrap();
        assert_eq!(data.len(), 8);
        assert!(data.iter().any(|e| e.number == 1559));
        assert!(data.iter().any(|e| e.number == 721));

        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_refetch_before_mount_is_ignored() {
        let (hook, calls) = counting_hook(vec![]);

        let state = hook.refetch().await;

        assert_eq!(state.status, QueryStatus::Idle);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_is_discarded() {
        // mount, then a slow refetch overtaken by a fast one
        let (hook, _) = counting_hook(vec![0, 200, 10]);
        hook.mount().await;

        let (slow, fast) = tokio::join!(hook.refetch(), hook.refetch());

        assert_eq!(fast.data, Some(2));
        assert_eq!(fast.sequence, 3);
        // The slow call settles last but leaves the newer data in place.
        assert_eq!(slow.data, Some(2));
        let state = hook.snapshot();
        assert_eq!(state.status, QueryStatus::Success);
        assert_eq!(state.data, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_polling_refetches_on_interval() {
        let (hook, calls) = counting_hook(vec![]);
        hook.mount().await;
        hook.poll_every(Duration::from_secs(30));
        assert!(hook.is_polling());

        tokio::time::sleep(Duration::from_secs(95)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(hook.snapshot().data, Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmount_during_poll_stops_writes() {
        let (hook, calls) = counting_hook(vec![]);
        let mut rx = hook.subscribe();
        hook.mount().await;
        hook.poll_every(Duration::from_secs(30));

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        rx.borrow_and_update();

        hook.unmount();
        assert!(!hook.is_polling());
        tokio::time::sleep(Duration::from_secs(300)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_response_after_unmount_is_dropped() {
        let (hook, _) = counting_hook(vec![0, 50]);
        hook.mount().await;

        let refetching = hook.clone();
        let task = tokio::spawn(async move { refetching.refetch().await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(hook.snapshot().is_loading());
        hook.unmount();

        let state = hook.snapshot();
        assert_eq!(state.status, QueryStatus::Idle);
        assert_eq!(state.data, Some(0));

        let mut rx = hook.subscribe();
        task.await.unwrap();
        assert!(!rx.has_changed().unwrap());
        assert_eq!(hook.snapshot().status, QueryStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmount_when_settled_keeps_state() {
        let (hook, _) = counting_hook(vec![0]);
        hook.mount().await;
        let mut rx = hook.subscribe();
        rx.borrow_and_update();

        hook.unmount();
        assert!(!rx.has_changed().unwrap());
        assert_eq!(hook.snapshot().status, QueryStatus::Success);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_then_retry() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();
        let hook = QueryHook::new(
            "flaky",
            fetcher(move || {
                let attempt = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt == 0 {
                        Err(AppError::Internal("analytics unavailable".to_string()))
                    } else {
                        Ok::<_, AppError>("ok")
                    }
                }
            }),
            clock(),
        );

        hook.mount().await;
        let failed = hook.snapshot();
        assert_eq!(failed.status, QueryStatus::Error);
        assert_eq!(failed.error.as_deref(), Some("analytics unavailable"));

        let retried = hook.refetch().await;
        assert_eq!(retried.status, QueryStatus::Success);
        assert_eq!(retried.data, Some("ok"));
        assert!(retried.error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_fetch_surfaces_as_error() {
        let hook: QueryHook<u32> = QueryHook::new(
            "panicky",
            fetcher(|| async {
                let missing: Option<u32> = None;
                Ok(missing.expect("fallback dataset missing"))
            }),
            clock(),
        );

        hook.mount().await;

        let state = hook.snapshot();
        assert_eq!(state.status, QueryStatus::Error);
        assert!(state
            .error
            .unwrap()
            .contains("fallback dataset missing"));
    }

    #[test]
    #[should_panic(expected = "poll interval must be greater than zero")]
    fn test_zero_poll_interval_panics() {
        let (hook, _) = counting_hook(vec![]);
        hook.poll_every(Duration::ZERO);
    }
}
