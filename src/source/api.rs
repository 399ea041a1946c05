//! Live API data source.
//!
//! Receives fleet state from a [`FleetSubscription`] over its watch channel.

use std::sync::Arc;

use tokio::sync::watch;

use fleetwatch_types::FleetSummary;

use super::DataSource;
use crate::repository::{
    DataStatus, FleetRepository, FleetState, FleetSubscription, SubscriptionOptions,
};

/// A data source backed by the monitoring API.
///
/// Must be created inside a tokio runtime: the subscription it owns spawns
/// the fetch and auto-refresh tasks.
#[derive(Debug)]
pub struct ApiSource {
    subscription: FleetSubscription,
    receiver: watch::Receiver<FleetState>,
    description: String,
    last_error: Option<String>,
    loading: bool,
    last_data: Option<Arc<FleetSummary>>,
}

impl ApiSource {
    pub fn start(repository: FleetRepository, options: SubscriptionOptions) -> Self {
        let description = repository.description();
        let subscription = FleetSubscription::start(repository, options);
        let mut receiver = subscription.receiver();
        // Report whatever the subscription started with on the first poll
        receiver.mark_changed();
        Self {
            subscription,
            receiver,
            description,
            last_error: None,
            loading: true,
            last_data: None,
        }
    }
}

impl DataSource for ApiSource {
    fn poll(&mut self) -> Option<Arc<FleetSummary>> {
        if !self.receiver.has_changed().unwrap_or(false) {
            return None;
        }

        let state = self.receiver.borrow_and_update().clone();
        self.loading = state.loading;
        self.last_error = state.error.as_ref().map(|e| match state.status() {
            DataStatus::Stale => format!("{} (showing cached data)", e),
            _ => e.to_string(),
        });

        // Only hand out data the caller has not seen yet
        let data = state.data?;
        if self
            .last_data
            .as_ref()
            .is_some_and(|seen| Arc::ptr_eq(seen, &data))
        {
            return None;
        }
        self.last_data = Some(Arc::clone(&data));
        Some(data)
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn is_loading(&self) -> bool {
        self.loading
    }

    fn refresh(&mut self) {
        self.subscription.refresh();
    }
}
