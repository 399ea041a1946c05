//! Per-aircraft health aggregation.

use fleetwatch_types::{AircraftMonitoringSummary, Alert, AlertState};

/// Aggregated health of one aircraft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AircraftHealth {
    /// Worst state among all alerts (OK when there are none).
    pub overall: AlertState,
    /// Mean alert weight, 0-100.
    pub health_percent: u8,
    pub summary_text: String,
    pub critical: usize,
    pub upcoming: usize,
    pub ok: usize,
}

impl AircraftHealth {
    /// Health of an aircraft computed from its alert list.
    pub fn of(aircraft: &AircraftMonitoringSummary) -> Self {
        aggregate(&aircraft.alerts)
    }
}

/// Contribution of one alert to the health percentage.
pub fn state_weight(state: AlertState) -> u32 {
    match state {
        AlertState::Current => 100,
        AlertState::Upcoming => 50,
        AlertState::Overdue => 0,
    }
}

/// Worst state among the alerts; OK for an empty list.
pub fn worst_state(alerts: &[Alert]) -> AlertState {
    alerts
        .iter()
        .map(|a| a.state)
        .max()
        .unwrap_or(AlertState::Current)
}

/// Aggregate an aircraft's alerts into an overall status.
pub fn aggregate(alerts: &[Alert]) -> AircraftHealth {
    let count = |state: AlertState| alerts.iter().filter(|a| a.state == state).count();
    let critical = count(AlertState::Overdue);
    let upcoming = count(AlertState::Upcoming);
    let ok = count(AlertState::Current);

    let health_percent = if alerts.is_empty() {
        100
    } else {
        let total: u32 = alerts.iter().map(|a| state_weight(a.state)).sum();
        (total as f64 / alerts.len() as f64).round() as u8
    };

    AircraftHealth {
        overall: worst_state(alerts),
        health_percent,
        summary_text: summary_text(critical, upcoming),
        critical,
        upcoming,
        ok,
    }
}

fn summary_text(critical: usize, upcoming: usize) -> String {
    if critical > 0 {
        format!("{} critical alert{}", critical, plural(critical))
    } else if upcoming > 0 {
        format!("{} approaching due", upcoming)
    } else {
        "all controls current".to_string()
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}
