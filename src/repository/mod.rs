//! Cached, retrying, de-duplicated access to the monitoring API.
//!
//! ## Submodules
//!
//! - [`cache`]: Single-entry TTL cache and the clock it is checked against
//! - [`retry`]: Exponential backoff for transient API failures
//! - [`single_flight`]: One in-flight request per resource
//! - [`debounce`]: Delayed, collapsible task scheduling
//! - [`state`]: [`FleetState`] as seen by consumers
//! - [`subscription`]: Consumer-facing subscription with auto-refresh
//!
//! ## Request Flow
//!
//! ```text
//! get_fleet_summary(force)
//!        │
//!        ├── fresh cache hit ──▶ FleetState::ready
//!        │
//!        ▼
//! SingleFlight (join or start)
//!        │
//!        ▼
//! RetryPolicy::run ──▶ FleetApi::fetch_fleet_summary
//!        │
//!        ├── Ok  ──▶ cache.set ──▶ FleetState::ready
//!        └── Err ──▶ stale cache? ──▶ FleetState::stale / FleetState::failed
//! ```

pub mod cache;
pub mod debounce;
pub mod retry;
pub mod single_flight;
pub mod state;
pub mod subscription;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{debug, error, info, warn};

use fleetwatch_adapters::FleetApi;
use fleetwatch_types::{AircraftDetail, FleetSummary};

use crate::MonitorError;

pub use cache::{CacheEntry, Clock, FleetCache, MemoryCache, TokioClock};
pub use debounce::Debouncer;
pub use retry::{RetryPolicy, Sleeper, TokioSleeper};
pub use single_flight::SingleFlight;
pub use state::{DataStatus, FleetState};
pub use subscription::{FleetSubscription, SubscriptionOptions};

/// Default time a fetched fleet summary stays fresh.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_millis(30_000);

const FLEET_KEY: &str = "monitoreo/flota";

/// Entry point for fleet data.
///
/// Cloning is cheap and every clone shares the same cache and in-flight
/// requests.
#[derive(Clone)]
pub struct FleetRepository {
    inner: Arc<Inner>,
}

struct Inner {
    api: Arc<dyn FleetApi>,
    cache: Arc<dyn FleetCache>,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn Sleeper>,
    ttl: Duration,
    retry: RetryPolicy,
    fleet_requests: SingleFlight<&'static str, Arc<FleetSummary>>,
    aircraft_requests: SingleFlight<String, Arc<AircraftDetail>>,
    last_error: RwLock<Option<MonitorError>>,
}

impl FleetRepository {
    /// Create a repository with default cache, clock and retry settings.
    pub fn new(api: Arc<dyn FleetApi>) -> Self {
        Self::builder(api).build()
    }

    pub fn builder(api: Arc<dyn FleetApi>) -> FleetRepositoryBuilder {
        FleetRepositoryBuilder::new(api)
    }

    pub fn description(&self) -> String {
        self.inner.api.description()
    }

    /// Get the fleet summary, fetching only when the cache is not fresh.
    ///
    /// With `force_refresh` the cache is bypassed, but a request already in
    /// flight is still joined. A failed fetch falls back to the cached
    /// summary, however old, and reports the error alongside it.
    pub async fn get_fleet_summary(&self, force_refresh: bool) -> FleetState {
        if !force_refresh {
            if let Some(entry) = self.inner.cache.get() {
                let now = self.inner.clock.now();
                if entry.is_fresh(now) {
                    debug!(
                        age_ms = entry.age(now).as_millis() as u64,
                        "fleet summary served from cache"
                    );
                    return FleetState::ready(entry.data);
                }
            }
        }

        let inner = Arc::clone(&self.inner);
        let (request, started) = self
            .inner
            .fleet_requests
            .join_or_start(FLEET_KEY, move || async move { inner.fetch_fleet().await });
        if !started {
            debug!("joining in-flight fleet summary request");
        }

        match request.await {
            Ok(data) => FleetState::ready(data),
            Err(err) => match self.inner.cache.get() {
                Some(entry) => {
                    warn!(
                        code = err.code(),
                        age_ms = entry.age(self.inner.clock.now()).as_millis() as u64,
                        "serving stale fleet summary after failed refresh"
                    );
                    FleetState::stale(entry.data, err)
                }
                None => FleetState::failed(err),
            },
        }
    }

    /// Fetch the detail of one aircraft.
    ///
    /// Retried and de-duplicated per registration like the fleet summary,
    /// but never cached.
    pub async fn get_aircraft_detail(
        &self,
        registration: &str,
    ) -> Result<Arc<AircraftDetail>, MonitorError> {
        let registration = registration.trim().to_string();
        if registration.is_empty() {
            return Err(MonitorError::validation("registration must not be empty"));
        }

        let inner = Arc::clone(&self.inner);
        let key = registration.to_uppercase();
        let (request, _) = self
            .inner
            .aircraft_requests
            .join_or_start(key, move || async move {
                let what = format!("aircraft {}", registration);
                inner
                    .retry
                    .run(&what, inner.sleeper.as_ref(), || {
                        inner.api.fetch_aircraft(&registration)
                    })
                    .await
                    .map(Arc::new)
            });
        request.await
    }

    /// Current state without fetching: cached data, last error, and whether
    /// a fleet request is in flight.
    pub fn peek(&self) -> FleetState {
        FleetState {
            data: self.inner.cache.get().map(|e| e.data),
            loading: self.is_fetching(),
            error: self.last_error(),
        }
    }

    pub fn cached(&self) -> Option<CacheEntry> {
        self.inner.cache.get()
    }

    /// Drop the cached summary so the next call fetches.
    pub fn invalidate(&self) {
        self.inner.cache.invalidate();
    }

    pub fn is_fetching(&self) -> bool {
        !self.inner.fleet_requests.is_empty()
    }

    /// Error of the most recent fleet fetch, cleared by the next success.
    pub fn last_error(&self) -> Option<MonitorError> {
        self.inner.last_error.read().clone()
    }
}

impl Inner {
    async fn fetch_fleet(&self) -> Result<Arc<FleetSummary>, MonitorError> {
        let result = self
            .retry
            .run("fleet summary", self.sleeper.as_ref(), || {
                self.api.fetch_fleet_summary()
            })
            .await;

        match result {
            Ok(summary) => {
                let data = Arc::new(summary);
                self.cache
                    .set(CacheEntry::new(Arc::clone(&data), self.clock.now(), self.ttl));
                *self.last_error.write() = None;
                info!(aircraft = data.aircraft.len(), "fleet summary refreshed");
                Ok(data)
            }
            Err(err) => {
                error!(code = err.code(), error = %err, "fleet summary refresh failed");
                *self.last_error.write() = Some(err.clone());
                Err(err)
            }
        }
    }
}

impl fmt::Debug for FleetRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FleetRepository")
            .field("api", &self.inner.api.description())
            .field("ttl", &self.inner.ttl)
            .field("retry", &self.inner.retry)
            .finish()
    }
}

/// Builder for [`FleetRepository`].
pub struct FleetRepositoryBuilder {
    api: Arc<dyn FleetApi>,
    cache: Option<Arc<dyn FleetCache>>,
    clock: Option<Arc<dyn Clock>>,
    sleeper: Option<Arc<dyn Sleeper>>,
    ttl: Duration,
    retry: RetryPolicy,
}

impl FleetRepositoryBuilder {
    pub fn new(api: Arc<dyn FleetApi>) -> Self {
        Self {
            api,
            cache: None,
            clock: None,
            sleeper: None,
            ttl: DEFAULT_CACHE_TTL,
            retry: RetryPolicy::default(),
        }
    }

    pub fn cache(mut self, cache: Arc<dyn FleetCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = Some(sleeper);
        self
    }

    /// How long a fetched summary stays fresh (default: 30 seconds).
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn build(self) -> FleetRepository {
        FleetRepository {
            inner: Arc::new(Inner {
                api: self.api,
                cache: self.cache.unwrap_or_else(|| Arc::new(MemoryCache::new())),
                clock: self.clock.unwrap_or_else(|| Arc::new(TokioClock)),
                sleeper: self.sleeper.unwrap_or_else(|| Arc::new(TokioSleeper)),
                ttl: self.ttl,
                retry: self.retry,
                fleet_requests: SingleFlight::new(),
                aircraft_requests: SingleFlight::new(),
                last_error: RwLock::new(None),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ManualClock, MockApi, RecordingSleeper};
    use fleetwatch_adapters::ApiError;

    fn repository(api: &Arc<MockApi>, clock: &Arc<ManualClock>) -> FleetRepository {
        FleetRepository::builder(Arc::clone(api) as Arc<dyn FleetApi>)
            .clock(Arc::clone(clock) as Arc<dyn Clock>)
            .sleeper(Arc::new(RecordingSleeper::default()))
            .build()
    }

    #[tokio::test]
    async fn test_cache_hit_within_ttl() {
        let api = Arc::new(MockApi::new());
        let clock = Arc::new(ManualClock::new());
        let repo = repository(&api, &clock);

        let first = repo.get_fleet_summary(false).await;
        clock.advance(Duration::from_secs(10));
        let second = repo.get_fleet_summary(false).await;

        assert_eq!(api.fleet_calls(), 1);
        assert_eq!(first.status(), DataStatus::Fresh);
        assert!(Arc::ptr_eq(
            first.data.as_ref().unwrap(),
            second.data.as_ref().unwrap()
        ));
    }

    #[tokio::test]
    async fn test_expired_cache_refetches() {
        let api = Arc::new(MockApi::new());
        let clock = Arc::new(ManualClock::new());
        let repo = repository(&api, &clock);

        repo.get_fleet_summary(false).await;
        clock.advance(DEFAULT_CACHE_TTL);
        repo.get_fleet_summary(false).await;
        assert_eq!(api.fleet_calls(), 2);
    }

    #[tokio::test]
    async fn test_force_refresh_bypasses_cache() {
        let api = Arc::new(MockApi::new());
        let clock = Arc::new(ManualClock::new());
        let repo = repository(&api, &clock);

        repo.get_fleet_summary(false).await;
        repo.get_fleet_summary(true).await;
        assert_eq!(api.fleet_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_share_one_request() {
        let api = Arc::new(MockApi::new().with_latency(Duration::from_millis(200)));
        let clock = Arc::new(ManualClock::new());
        let repo = repository(&api, &clock);

        let (a, b, c) = tokio::join!(
            repo.get_fleet_summary(false),
            repo.get_fleet_summary(false),
            repo.get_fleet_summary(true),
        );

        assert_eq!(api.fleet_calls(), 1);
        for state in [&a, &b, &c] {
            assert_eq!(state.status(), DataStatus::Fresh);
        }
        assert!(Arc::ptr_eq(a.data.as_ref().unwrap(), c.data.as_ref().unwrap()));
        assert!(!repo.is_fetching());
    }

    #[tokio::test]
    async fn test_retries_rate_limit_then_succeeds() {
        let api = Arc::new(MockApi::new());
        api.push_fleet(Err(ApiError::RateLimited));
        api.push_fleet(Err(ApiError::RateLimited));
        let sleeper = Arc::new(RecordingSleeper::default());
        let repo = FleetRepository::builder(Arc::clone(&api) as Arc<dyn FleetApi>)
            .sleeper(Arc::clone(&sleeper) as Arc<dyn Sleeper>)
            .build();

        let state = repo.get_fleet_summary(false).await;

        assert_eq!(state.status(), DataStatus::Fresh);
        assert_eq!(api.fleet_calls(), 3);
        assert_eq!(
            sleeper.delays(),
            vec![Duration::from_millis(1000), Duration::from_millis(2000)]
        );
    }

    #[tokio::test]
    async fn test_rate_limit_exhausted_without_cache() {
        let api = Arc::new(MockApi::new());
        for _ in 0..4 {
            api.push_fleet(Err(ApiError::RateLimited));
        }
        let clock = Arc::new(ManualClock::new());
        let repo = repository(&api, &clock);

        let state = repo.get_fleet_summary(false).await;
        assert_eq!(state.status(), DataStatus::Unavailable);
        assert_eq!(state.error, Some(MonitorError::RateLimit { attempts: 4 }));
        assert_eq!(repo.last_error().map(|e| e.code()), Some("RATE_LIMIT_ERROR"));
    }

    #[tokio::test]
    async fn test_failed_refresh_serves_stale_data() {
        let api = Arc::new(MockApi::new());
        let clock = Arc::new(ManualClock::new());
        let repo = repository(&api, &clock);

        let first = repo.get_fleet_summary(false).await;
        clock.advance(Duration::from_secs(120));
        api.push_fleet(Err(ApiError::from_status(500, "boom")));

        let state = repo.get_fleet_summary(false).await;
        assert_eq!(state.status(), DataStatus::Stale);
        assert!(Arc::ptr_eq(
            state.data.as_ref().unwrap(),
            first.data.as_ref().unwrap()
        ));
        assert_eq!(state.error.as_ref().map(|e| e.code()), Some("FETCH_ERROR"));
    }

    #[tokio::test]
    async fn test_permanent_error_is_not_retried() {
        let api = Arc::new(MockApi::new());
        api.push_fleet(Err(ApiError::from_status(401, "unauthorized")));
        let clock = Arc::new(ManualClock::new());
        let repo = repository(&api, &clock);

        let state = repo.get_fleet_summary(false).await;
        assert_eq!(api.fleet_calls(), 1);
        assert!(matches!(
            state.error,
            Some(MonitorError::Fetch(ApiError::Status { status: 401, .. }))
        ));
    }

    #[tokio::test]
    async fn test_success_clears_last_error() {
        let api = Arc::new(MockApi::new());
        api.push_fleet(Err(ApiError::Parse("eof".into())));
        let clock = Arc::new(ManualClock::new());
        let repo = repository(&api, &clock);

        repo.get_fleet_summary(false).await;
        assert!(repo.last_error().is_some());
        repo.get_fleet_summary(false).await;
        assert!(repo.last_error().is_none());
        assert_eq!(repo.peek().status(), DataStatus::Fresh);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_survives_dropped_caller() {
        let api = Arc::new(MockApi::new().with_latency(Duration::from_secs(1)));
        let repo = FleetRepository::new(Arc::clone(&api) as Arc<dyn FleetApi>);

        let pending = tokio::time::timeout(Duration::from_millis(100), repo.get_fleet_summary(false)).await;
        assert!(pending.is_err());
        assert!(repo.is_fetching());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(repo.cached().is_some());
        assert_eq!(api.fleet_calls(), 1);
    }

    #[tokio::test]
    async fn test_aircraft_detail() {
        let api = Arc::new(MockApi::new());
        let clock = Arc::new(ManualClock::new());
        let repo = repository(&api, &clock);

        let detail = repo.get_aircraft_detail("ec-mka").await.unwrap();
        assert_eq!(detail.summary.registration, "EC-MKA");

        let missing = repo.get_aircraft_detail("EC-ZZZ").await.unwrap_err();
        assert!(matches!(
            missing,
            MonitorError::Fetch(ApiError::Status { status: 404, .. })
        ));

        let empty = repo.get_aircraft_detail("  ").await.unwrap_err();
        assert_eq!(empty.code(), "VALIDATION_ERROR");
        assert_eq!(api.aircraft_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_aircraft_detail_deduplicated() {
        let api = Arc::new(MockApi::new().with_latency(Duration::from_millis(50)));
        let repo = FleetRepository::new(Arc::clone(&api) as Arc<dyn FleetApi>);

        let (a, b) = tokio::join!(
            repo.get_aircraft_detail("EC-MKA"),
            repo.get_aircraft_detail("ec-mka"),
        );
        assert!(a.is_ok() && b.is_ok());
        assert_eq!(api.aircraft_calls(), 1);
    }
}
