//! Live subscription to fleet data for long-lived consumers.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use super::{Debouncer, FleetRepository, FleetState};

/// Timing of a subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionOptions {
    /// Delay before the first fetch, collapsing near-simultaneous starts.
    pub debounce: Duration,
    /// Period of background refreshes; `None` disables them.
    pub auto_refresh: Option<Duration>,
}

impl Default for SubscriptionOptions {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(100),
            auto_refresh: Some(Duration::from_secs(300)),
        }
    }
}

/// Publishes [`FleetState`] updates to any number of receivers.
///
/// Disposing (or dropping) the subscription stops its timers but never
/// cancels a fetch that is already running: other consumers may be
/// waiting on it, and its result still lands in the shared cache.
#[derive(Debug)]
pub struct FleetSubscription {
    repository: FleetRepository,
    options: SubscriptionOptions,
    state: Arc<watch::Sender<FleetState>>,
    debouncer: Debouncer,
    auto_refresh: Option<JoinHandle<()>>,
}

impl FleetSubscription {
    /// Start a subscription: publish any cached data right away, fetch
    /// after the debounce delay, then refresh periodically.
    pub fn start(repository: FleetRepository, options: SubscriptionOptions) -> Self {
        let initial = repository.peek().with_loading(true);
        let (state, _) = watch::channel(initial);

        let mut subscription = Self {
            repository,
            options,
            state: Arc::new(state),
            debouncer: Debouncer::new(),
            auto_refresh: None,
        };
        subscription.schedule_fetch();
        subscription.start_auto_refresh();
        subscription
    }

    /// A new receiver of state updates.
    pub fn receiver(&self) -> watch::Receiver<FleetState> {
        self.state.subscribe()
    }

    pub fn current(&self) -> FleetState {
        self.state.borrow().clone()
    }

    pub fn repository(&self) -> &FleetRepository {
        &self.repository
    }

    /// Debounced fetch; repeated calls within the delay collapse into one.
    pub fn schedule_fetch(&mut self) {
        let fetch = publish_fetch(self.repository.clone(), Arc::clone(&self.state), false);
        self.debouncer.schedule(self.options.debounce, fetch);
    }

    /// Force a fetch now, bypassing the debounce and the cache.
    pub fn refresh(&mut self) {
        self.debouncer.cancel();
        debug!("manual fleet refresh");
        tokio::spawn(publish_fetch(
            self.repository.clone(),
            Arc::clone(&self.state),
            true,
        ));
    }

    /// Stop the debounce timer and background refreshes.
    pub fn dispose(&mut self) {
        self.debouncer.cancel();
        if let Some(handle) = self.auto_refresh.take() {
            handle.abort();
        }
    }

    pub fn is_active(&self) -> bool {
        self.debouncer.is_pending() || self.auto_refresh.is_some()
    }

    fn start_auto_refresh(&mut self) {
        let Some(period) = self.options.auto_refresh.filter(|p| !p.is_zero()) else {
            return;
        };
        let repository = self.repository.clone();
        let state = Arc::clone(&self.state);

        self.auto_refresh = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                debug!(period_secs = period.as_secs(), "auto refresh");
                publish_fetch(repository.clone(), Arc::clone(&state), false).await;
            }
        }));
    }
}

impl Drop for FleetSubscription {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn publish_fetch(
    repository: FleetRepository,
    state: Arc<watch::Sender<FleetState>>,
    force_refresh: bool,
) -> impl Future<Output = ()> + Send + 'static {
    async move {
        state.send_modify(|s| s.loading = true);
        let next = repository.get_fleet_summary(force_refresh).await;
        state.send_replace(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::DataStatus;
    use crate::test_support::MockApi;
    use fleetwatch_adapters::FleetApi;

    fn setup(api: &Arc<MockApi>) -> FleetRepository {
        FleetRepository::new(Arc::clone(api) as Arc<dyn FleetApi>)
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_fetch_is_debounced() {
        let api = Arc::new(MockApi::new());
        let sub = FleetSubscription::start(setup(&api), SubscriptionOptions::default());
        assert!(sub.current().loading);

        tokio::time::sleep(ms(50)).await;
        assert_eq!(api.fleet_calls(), 0);

        tokio::time::sleep(ms(100)).await;
        assert_eq!(api.fleet_calls(), 1);
        let state = sub.current();
        assert_eq!(state.status(), DataStatus::Fresh);
        assert!(!state.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_simultaneous_starts_collapse() {
        let api = Arc::new(MockApi::new());
        let repository = setup(&api);
        let a = FleetSubscription::start(repository.clone(), SubscriptionOptions::default());
        let b = FleetSubscription::start(repository, SubscriptionOptions::default());

        tokio::time::sleep(ms(300)).await;
        assert_eq!(api.fleet_calls(), 1);
        assert_eq!(a.current().status(), DataStatus::Fresh);
        assert_eq!(b.current().status(), DataStatus::Fresh);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_schedule_collapses() {
        let api = Arc::new(MockApi::new());
        let mut sub = FleetSubscription::start(setup(&api), SubscriptionOptions::default());
        for _ in 0..3 {
            tokio::time::sleep(ms(40)).await;
            sub.schedule_fetch();
        }
        tokio::time::sleep(ms(300)).await;
        assert_eq!(api.fleet_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_refresh_bypasses_debounce() {
        let api = Arc::new(MockApi::new());
        let mut sub = FleetSubscription::start(setup(&api), SubscriptionOptions::default());
        let mut rx = sub.receiver();

        sub.refresh();
        tokio::time::sleep(ms(10)).await;
        assert_eq!(api.fleet_calls(), 1);

        rx.changed().await.unwrap();
        tokio::time::sleep(ms(500)).await;
        // the cancelled debounce never fires
        assert_eq!(api.fleet_calls(), 1);
        assert_eq!(rx.borrow().status(), DataStatus::Fresh);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_refresh() {
        let api = Arc::new(MockApi::new());
        let mut sub = FleetSubscription::start(setup(&api), SubscriptionOptions::default());

        tokio::time::sleep(ms(150)).await;
        assert_eq!(api.fleet_calls(), 1);

        tokio::time::sleep(Duration::from_secs(301)).await;
        assert_eq!(api.fleet_calls(), 2);

        sub.dispose();
        assert!(!sub.is_active());
        tokio::time::sleep(Duration::from_secs(900)).await;
        assert_eq!(api.fleet_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_refresh_disabled() {
        let api = Arc::new(MockApi::new());
        let options = SubscriptionOptions {
            auto_refresh: None,
            ..SubscriptionOptions::default()
        };
        let _sub = FleetSubscription::start(setup(&api), options);
        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert_eq!(api.fleet_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_does_not_cancel_running_fetch() {
        let api = Arc::new(MockApi::new().with_latency(Duration::from_secs(1)));
        let repository = setup(&api);
        let sub = FleetSubscription::start(repository.clone(), SubscriptionOptions::default());

        tokio::time::sleep(ms(150)).await;
        assert!(repository.is_fetching());
        drop(sub);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(repository.cached().is_some());
        assert_eq!(api.fleet_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_starts_with_cached_data() {
        let api = Arc::new(MockApi::new());
        let repository = setup(&api);
        repository.get_fleet_summary(false).await;

        let sub = FleetSubscription::start(repository, SubscriptionOptions::default());
        let state = sub.current();
        assert!(state.data.is_some());
        assert!(state.loading);

        tokio::time::sleep(ms(150)).await;
        // still fresh, served from cache
        assert_eq!(api.fleet_calls(), 1);
    }
}
