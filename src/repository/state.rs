//! What a consumer sees of the fleet data at a point in time.

use std::sync::Arc;

use fleetwatch_types::FleetSummary;

use crate::MonitorError;

/// Availability of the fleet data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataStatus {
    /// Nothing fetched yet.
    Loading,
    /// Data from the last successful fetch.
    Fresh,
    /// Last fetch failed; showing older data.
    Stale,
    /// Last fetch failed and there is nothing cached.
    Unavailable,
}

/// Fleet data plus the request status that produced it.
#[derive(Debug, Clone, Default)]
pub struct FleetState {
    pub data: Option<Arc<FleetSummary>>,
    pub loading: bool,
    pub error: Option<MonitorError>,
}

impl FleetState {
    pub fn loading() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }

    pub fn ready(data: Arc<FleetSummary>) -> Self {
        Self {
            data: Some(data),
            loading: false,
            error: None,
        }
    }

    /// A failed refresh that fell back to cached data.
    pub fn stale(data: Arc<FleetSummary>, error: MonitorError) -> Self {
        Self {
            data: Some(data),
            loading: false,
            error: Some(error),
        }
    }

    pub fn failed(error: MonitorError) -> Self {
        Self {
            data: None,
            loading: false,
            error: Some(error),
        }
    }

    pub fn with_loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    pub fn status(&self) -> DataStatus {
        match (&self.data, &self.error) {
            (Some(_), None) => DataStatus::Fresh,
            (Some(_), Some(_)) => DataStatus::Stale,
            (None, Some(_)) => DataStatus::Unavailable,
            (None, None) => DataStatus::Loading,
        }
    }

    pub fn is_stale(&self) -> bool {
        self.status() == DataStatus::Stale
    }
}
