//! Shared fixtures and fakes for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use tokio::time::Instant;

use fleetwatch_adapters::{ApiError, FleetApi};
use fleetwatch_types::{AircraftDetail, FleetSummary, Priority};

use crate::data::{evaluate, AlertThresholds, MonitoredItem};
use crate::repository::{Clock, Sleeper};

/// Three aircraft: one overdue, one upcoming, one all current.
pub fn fleet() -> FleetSummary {
    let thresholds = AlertThresholds::default();
    let engine = MonitoredItem::new("ENG-100 Engine borescope", 3000.0, 6000.0)
        .with_type("COMPONENTE")
        .with_priority(Priority::High);
    let gear = MonitoredItem::new("LDG-200 Landing gear overhaul", 0.0, 10000.0)
        .with_type("INSPECCION");
    let updated = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();

    FleetSummary::builder()
        .generated_at(updated)
        .aircraft("EC-MKA", |a| {
            a.id(1)
                .flight_hours(5700.0)
                .alert(evaluate(&engine, 5700.0, &thresholds))
                .alert(evaluate(&gear, 5700.0, &thresholds))
                .last_updated(updated)
        })
        .aircraft("EC-NVB", |a| {
            a.id(2)
                .flight_hours(6200.0)
                .alert(evaluate(&engine, 6200.0, &thresholds))
                .alert(evaluate(&gear, 6200.0, &thresholds))
                .last_updated(updated)
        })
        .aircraft("EC-LAX", |a| {
            a.id(3)
                .flight_hours(1200.0)
                .alert(evaluate(&gear, 1200.0, &thresholds))
                .last_updated(updated)
        })
        .build()
}

/// Scripted monitoring API.
///
/// Fleet requests pop queued responses first and fall back to [`fleet`].
#[derive(Debug)]
pub struct MockApi {
    fleet: FleetSummary,
    responses: Mutex<VecDeque<Result<FleetSummary, ApiError>>>,
    fleet_calls: AtomicUsize,
    aircraft_calls: AtomicUsize,
    latency: Duration,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            fleet: fleet(),
            responses: Mutex::new(VecDeque::new()),
            fleet_calls: AtomicUsize::new(0),
            aircraft_calls: AtomicUsize::new(0),
            latency: Duration::ZERO,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn push_fleet(&self, response: Result<FleetSummary, ApiError>) {
        self.responses.lock().push_back(response);
    }

    pub fn fleet_calls(&self) -> usize {
        self.fleet_calls.load(Ordering::SeqCst)
    }

    pub fn aircraft_calls(&self) -> usize {
        self.aircraft_calls.load(Ordering::SeqCst)
    }

    async fn wait(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl FleetApi for MockApi {
    async fn fetch_fleet_summary(&self) -> Result<FleetSummary, ApiError> {
        self.fleet_calls.fetch_add(1, Ordering::SeqCst);
        self.wait().await;
        let queued = self.responses.lock().pop_front();
        queued.unwrap_or_else(|| Ok(self.fleet.clone()))
    }

    async fn fetch_aircraft(&self, registration: &str) -> Result<AircraftDetail, ApiError> {
        self.aircraft_calls.fetch_add(1, Ordering::SeqCst);
        self.wait().await;
        self.fleet
            .get(registration)
            .map(|a| AircraftDetail {
                alerts: a.alerts.clone(),
                summary: a.clone(),
            })
            .ok_or_else(|| ApiError::from_status(404, format!("{} not found", registration)))
    }

    fn description(&self) -> String {
        "mock".to_string()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.offset.lock() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.offset.lock()
    }
}

/// Sleeper that returns immediately and records what it was asked to wait.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().push(duration);
    }
}
