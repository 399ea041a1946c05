//! Alert evaluation from flight-hour windows.
//!
//! Alert state is a pure function of the aircraft's current hours and the
//! item's hour window. Nothing here keeps state between evaluations.

use fleetwatch_types::{
    AircraftMonitoringSummary, Alert, AlertState, FleetSummary, Priority, Timestamp,
};

/// Thresholds for alert classification.
///
/// The proximity band is the slice of the hour window, just below the due
/// hour, in which an item is reported as upcoming.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertThresholds {
    /// Band width as a percentage of the window `due - start`.
    pub proximity_percent: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            proximity_percent: 10.0,
        }
    }
}

impl AlertThresholds {
    pub fn new(proximity_percent: f64) -> Self {
        Self { proximity_percent }
    }

    /// Width of the proximity band, in hours, for the given window.
    pub fn band_width(&self, start_hours: f64, due_hours: f64) -> f64 {
        (due_hours - start_hours).max(0.0) * self.proximity_percent / 100.0
    }
}

/// A maintenance item monitored against flight hours.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitoredItem {
    pub code_description: String,
    pub start_hours: f64,
    pub due_hours: f64,
    pub alert_type: String,
    pub priority: Priority,
    pub next_due_date: Option<Timestamp>,
}

impl MonitoredItem {
    pub fn new(code_description: impl Into<String>, start_hours: f64, due_hours: f64) -> Self {
        Self {
            code_description: code_description.into(),
            start_hours,
            due_hours,
            alert_type: String::new(),
            priority: Priority::default(),
            next_due_date: None,
        }
    }

    pub fn with_type(mut self, alert_type: impl Into<String>) -> Self {
        self.alert_type = alert_type.into();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_next_due_date(mut self, date: Timestamp) -> Self {
        self.next_due_date = Some(date);
        self
    }

    /// Recover the monitored item an alert was evaluated from.
    pub fn from_alert(alert: &Alert) -> Self {
        Self {
            code_description: alert.code_description.clone(),
            start_hours: alert.start_hours,
            due_hours: alert.due_hours,
            alert_type: alert.alert_type.clone(),
            priority: alert.priority,
            next_due_date: alert.next_due_date,
        }
    }
}

/// Classify an item's state for the given hours.
pub fn classify(
    start_hours: f64,
    due_hours: f64,
    current_hours: f64,
    thresholds: &AlertThresholds,
) -> AlertState {
    if current_hours > due_hours {
        AlertState::Overdue
    } else if current_hours >= due_hours - thresholds.band_width(start_hours, due_hours) {
        AlertState::Upcoming
    } else {
        AlertState::Current
    }
}

/// Completion of the hour window in whole percent, never negative.
///
/// A zero-width window counts as complete once its start is reached.
pub fn completion_percent(start_hours: f64, due_hours: f64, current_hours: f64) -> f64 {
    let window = due_hours - start_hours;
    if window <= 0.0 {
        return if current_hours >= start_hours { 100.0 } else { 0.0 };
    }
    ((current_hours - start_hours) / window * 100.0).max(0.0).round()
}

/// Evaluate one monitored item at the given flight hours.
pub fn evaluate(item: &MonitoredItem, current_hours: f64, thresholds: &AlertThresholds) -> Alert {
    let state = classify(item.start_hours, item.due_hours, current_hours, thresholds);

    let (hours_remaining, hours_overdue) = match state {
        AlertState::Overdue => (None, Some((current_hours - item.due_hours).max(0.0))),
        _ => (Some((item.due_hours - current_hours).max(0.0)), None),
    };

    Alert {
        code_description: item.code_description.clone(),
        start_hours: item.start_hours,
        due_hours: item.due_hours,
        current_hours,
        state,
        alert_type: item.alert_type.clone(),
        hours_remaining,
        hours_overdue,
        percent_complete: completion_percent(item.start_hours, item.due_hours, current_hours),
        next_due_date: item.next_due_date,
        priority: item.priority,
    }
}

/// Re-evaluate every alert of an aircraft against its current flight hours.
///
/// Counts are rebuilt from the new alert states.
pub fn rederive_summary(
    summary: &AircraftMonitoringSummary,
    thresholds: &AlertThresholds,
) -> AircraftMonitoringSummary {
    let alerts = summary
        .alerts
        .iter()
        .map(|alert| evaluate(&MonitoredItem::from_alert(alert), summary.flight_hours, thresholds))
        .collect();

    AircraftMonitoringSummary::from_alerts(
        summary.aircraft_id,
        summary.registration.clone(),
        summary.flight_hours,
        alerts,
        summary.last_updated,
    )
}

/// Re-evaluate a whole fleet. Fleet totals are rebuilt as well.
pub fn rederive_fleet(fleet: &FleetSummary, thresholds: &AlertThresholds) -> FleetSummary {
    let aircraft = fleet
        .aircraft
        .iter()
        .map(|a| rederive_summary(a, thresholds))
        .collect();
    FleetSummary::from_aircraft(aircraft, fleet.generated_at)
}
