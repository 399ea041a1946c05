//! Per-aircraft monitoring summary.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{Alert, AlertState, Timestamp};

/// Monitoring summary for one aircraft.
///
/// Fetched as a unit from the API and never mutated in place: each refresh
/// produces a new summary. `total_alerts == critical_alerts + upcoming_alerts
/// + ok_alerts == alerts.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AircraftMonitoringSummary {
    #[serde(rename = "aeronaveId")]
    pub aircraft_id: i64,

    /// Registration mark (e.g. "EC-MKA").
    #[serde(rename = "matricula")]
    pub registration: String,

    /// Current cumulative flight hours.
    #[serde(rename = "horasVueloActuales")]
    pub flight_hours: f64,

    #[serde(rename = "alertas", default)]
    pub alerts: Vec<Alert>,

    #[serde(rename = "totalAlertas", default)]
    pub total_alerts: u32,

    /// Overdue alert count.
    #[serde(rename = "alertasCriticas", default)]
    pub critical_alerts: u32,

    /// Upcoming alert count.
    #[serde(rename = "alertasProximas", default)]
    pub upcoming_alerts: u32,

    #[serde(rename = "alertasOk", default)]
    pub ok_alerts: u32,

    #[serde(rename = "ultimaActualizacion")]
    pub last_updated: Timestamp,
}

impl AircraftMonitoringSummary {
    /// Build a summary whose counts are derived from `alerts`.
    pub fn from_alerts(
        aircraft_id: i64,
        registration: impl Into<String>,
        flight_hours: f64,
        alerts: Vec<Alert>,
        last_updated: Timestamp,
    ) -> Self {
        let count = |state: AlertState| alerts.iter().filter(|a| a.state == state).count() as u32;
        let critical_alerts = count(AlertState::Overdue);
        let upcoming_alerts = count(AlertState::Upcoming);
        let ok_alerts = count(AlertState::Current);

        Self {
            aircraft_id,
            registration: registration.into(),
            flight_hours,
            total_alerts: alerts.len() as u32,
            critical_alerts,
            upcoming_alerts,
            ok_alerts,
            alerts,
            last_updated,
        }
    }

    /// Create a builder for an aircraft summary.
    pub fn builder(registration: impl Into<String>) -> AircraftBuilder {
        AircraftBuilder::new(registration)
    }

    /// True when the aircraft has at least one overdue or upcoming alert.
    pub fn has_active_alerts(&self) -> bool {
        self.critical_alerts + self.upcoming_alerts > 0
    }

    /// Check the count invariant against the alert list.
    pub fn counts_consistent(&self) -> bool {
        let n = self.alerts.len() as u32;
        self.total_alerts == n
            && self.critical_alerts + self.upcoming_alerts + self.ok_alerts == n
    }

    /// Alerts in the given state.
    pub fn alerts_in(&self, state: AlertState) -> impl Iterator<Item = &Alert> {
        self.alerts.iter().filter(move |a| a.state == state)
    }
}

/// Response of the per-aircraft endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AircraftDetail {
    #[serde(rename = "alertas", default)]
    pub alerts: Vec<Alert>,

    #[serde(rename = "resumen")]
    pub summary: AircraftMonitoringSummary,
}

/// Builder for [`AircraftMonitoringSummary`].
///
/// Counts are always derived from the added alerts.
#[derive(Debug, Clone)]
pub struct AircraftBuilder {
    aircraft_id: i64,
    registration: String,
    flight_hours: f64,
    alerts: Vec<Alert>,
    last_updated: Option<Timestamp>,
}

impl AircraftBuilder {
    pub fn new(registration: impl Into<String>) -> Self {
        Self {
            aircraft_id: 0,
            registration: registration.into(),
            flight_hours: 0.0,
            alerts: Vec::new(),
            last_updated: None,
        }
    }

    pub fn id(mut self, aircraft_id: i64) -> Self {
        self.aircraft_id = aircraft_id;
        self
    }

    pub fn flight_hours(mut self, hours: f64) -> Self {
        self.flight_hours = hours;
        self
    }

    pub fn alert(mut self, alert: Alert) -> Self {
        self.alerts.push(alert);
        self
    }

    pub fn alerts(mut self, alerts: impl IntoIterator<Item = Alert>) -> Self {
        self.alerts.extend(alerts);
        self
    }

    pub fn last_updated(mut self, at: Timestamp) -> Self {
        self.last_updated = Some(at);
        self
    }

    pub fn build(self) -> AircraftMonitoringSummary {
        AircraftMonitoringSummary::from_alerts(
            self.aircraft_id,
            self.registration,
            self.flight_hours,
            self.alerts,
            self.last_updated.unwrap_or_else(Utc::now),
        )
    }
}
