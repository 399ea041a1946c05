//! Filtering, sorting and statistics over a fleet summary.
//!
//! Every function here is pure: it borrows the summary and never mutates it.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::str::FromStr;

use serde::Serialize;

use fleetwatch_types::{AircraftMonitoringSummary, Alert, AlertState, FleetSummary};

use super::health::{aggregate, worst_state};
use crate::MonitorError;

/// Number of alerts shown per aircraft in compact views.
pub const DEFAULT_TOP_ALERTS: usize = 3;

/// Criteria an aircraft must satisfy to be listed.
///
/// All set criteria are combined with AND. An empty set places no
/// restriction on that dimension.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    /// Keep only aircraft with at least one overdue or upcoming alert.
    pub only_with_alerts: bool,
    /// Keep aircraft whose worst alert state is one of these.
    pub allowed_states: BTreeSet<AlertState>,
    /// Keep aircraft having at least one alert of one of these types.
    pub allowed_alert_types: BTreeSet<String>,
    /// Inclusive lower bound on flight hours.
    pub min_hours: Option<f64>,
    /// Inclusive upper bound on flight hours.
    pub max_hours: Option<f64>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn only_with_alerts(mut self, only: bool) -> Self {
        self.only_with_alerts = only;
        self
    }

    pub fn states(mut self, states: impl IntoIterator<Item = AlertState>) -> Self {
        self.allowed_states = states.into_iter().collect();
        self
    }

    pub fn alert_types<S: Into<String>>(mut self, types: impl IntoIterator<Item = S>) -> Self {
        self.allowed_alert_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn hours_between(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_hours = min;
        self.max_hours = max;
        self
    }

    /// True when no criterion is set.
    pub fn is_empty(&self) -> bool {
        !self.only_with_alerts
            && self.allowed_states.is_empty()
            && self.allowed_alert_types.is_empty()
            && self.min_hours.is_none()
            && self.max_hours.is_none()
    }

    /// Reject criteria that can never be satisfied or are malformed.
    pub fn validate(&self) -> Result<(), MonitorError> {
        for (name, bound) in [("min_hours", self.min_hours), ("max_hours", self.max_hours)] {
            if let Some(value) = bound {
                if !value.is_finite() || value < 0.0 {
                    return Err(MonitorError::validation(format!(
                        "{} must be a non-negative number, got {}",
                        name, value
                    )));
                }
            }
        }
        if let (Some(min), Some(max)) = (self.min_hours, self.max_hours) {
            if min > max {
                return Err(MonitorError::validation(format!(
                    "min_hours ({}) is greater than max_hours ({})",
                    min, max
                )));
            }
        }
        if self.allowed_alert_types.iter().any(|t| t.trim().is_empty()) {
            return Err(MonitorError::validation("alert type must not be empty"));
        }
        Ok(())
    }

    /// Whether an aircraft satisfies every set criterion.
    pub fn matches(&self, aircraft: &AircraftMonitoringSummary) -> bool {
        if self.only_with_alerts && !aircraft.has_active_alerts() {
            return false;
        }
        if !self.allowed_states.is_empty()
            && !self.allowed_states.contains(&worst_state(&aircraft.alerts))
        {
            return false;
        }
        if !self.allowed_alert_types.is_empty()
            && !aircraft.alerts.iter().any(|a| {
                self.allowed_alert_types
                    .iter()
                    .any(|t| t.eq_ignore_ascii_case(&a.alert_type))
            })
        {
            return false;
        }
        if self.min_hours.is_some_and(|min| aircraft.flight_hours < min) {
            return false;
        }
        if self.max_hours.is_some_and(|max| aircraft.flight_hours > max) {
            return false;
        }
        true
    }
}

/// Sort order for aircraft lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    /// By registration.
    #[default]
    Alphabetic,
    /// Most severe first, then by number of critical alerts.
    Criticality,
    /// Highest flight hours first.
    Hours,
}

impl SortKey {
    /// Cycle to the next sort key.
    pub fn next(self) -> Self {
        match self {
            SortKey::Alphabetic => SortKey::Criticality,
            SortKey::Criticality => SortKey::Hours,
            SortKey::Hours => SortKey::Alphabetic,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Alphabetic => "registration",
            SortKey::Criticality => "criticality",
            SortKey::Hours => "hours",
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "alphabetic" | "alfabetico" | "alfabético" | "registration" | "name" => {
                Ok(SortKey::Alphabetic)
            }
            "criticality" | "criticidad" | "status" => Ok(SortKey::Criticality),
            "hours" | "horas" => Ok(SortKey::Hours),
            other => Err(format!(
                "unknown sort key '{}' (expected alphabetic, criticality or hours)",
                other
            )),
        }
    }
}

/// Aircraft matching the criteria, in fleet order.
pub fn filter<'a>(
    summary: &'a FleetSummary,
    criteria: &FilterCriteria,
) -> Result<Vec<&'a AircraftMonitoringSummary>, MonitorError> {
    criteria.validate()?;
    Ok(summary
        .aircraft
        .iter()
        .filter(|a| criteria.matches(a))
        .collect())
}

/// Compare two registrations: case-insensitive first, then exact.
fn compare_registration(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Ordering of two aircraft under a sort key.
pub fn compare(
    a: &AircraftMonitoringSummary,
    b: &AircraftMonitoringSummary,
    key: SortKey,
) -> Ordering {
    let by_registration = || compare_registration(&a.registration, &b.registration);
    match key {
        SortKey::Alphabetic => by_registration(),
        SortKey::Criticality => worst_state(&a.alerts)
            .severity_rank()
            .cmp(&worst_state(&b.alerts).severity_rank())
            .then_with(|| b.critical_alerts.cmp(&a.critical_alerts))
            .then_with(by_registration),
        SortKey::Hours => b
            .flight_hours
            .total_cmp(&a.flight_hours)
            .then_with(by_registration),
    }
}

/// Sort a list of aircraft in place. The sort is stable.
pub fn sort(aircraft: &mut [&AircraftMonitoringSummary], key: SortKey) {
    aircraft.sort_by(|a, b| compare(a, b, key));
}

/// Filter then sort in one call.
pub fn filter_and_sort<'a>(
    summary: &'a FleetSummary,
    criteria: &FilterCriteria,
    key: SortKey,
) -> Result<Vec<&'a AircraftMonitoringSummary>, MonitorError> {
    let mut aircraft = filter(summary, criteria)?;
    sort(&mut aircraft, key);
    Ok(aircraft)
}

/// Fleet-level statistics over a (possibly filtered) list of aircraft.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetStatistics {
    pub total_aircraft: usize,
    pub aircraft_with_issues: usize,
    /// Share of aircraft with issues, rounded percent.
    pub issue_percent: u8,
    pub total_critical_alerts: u32,
    pub total_upcoming_alerts: u32,
    /// Mean aircraft health, rounded percent.
    pub average_health: u8,
}

/// Compute statistics. An empty list yields all zeros.
pub fn statistics(aircraft: &[&AircraftMonitoringSummary]) -> FleetStatistics {
    if aircraft.is_empty() {
        return FleetStatistics::default();
    }

    let total = aircraft.len();
    let with_issues = aircraft.iter().filter(|a| a.has_active_alerts()).count();
    let health_sum: u32 = aircraft
        .iter()
        .map(|a| u32::from(aggregate(&a.alerts).health_percent))
        .sum();

    FleetStatistics {
        total_aircraft: total,
        aircraft_with_issues: with_issues,
        issue_percent: (with_issues as f64 / total as f64 * 100.0).round() as u8,
        total_critical_alerts: aircraft.iter().map(|a| a.critical_alerts).sum(),
        total_upcoming_alerts: aircraft.iter().map(|a| a.upcoming_alerts).sum(),
        average_health: (health_sum as f64 / total as f64).round() as u8,
    }
}

/// Orders alerts most urgent first: severity, then priority, then the
/// hours that matter for the state (least remaining or most overdue).
fn compare_urgency(a: &Alert, b: &Alert) -> Ordering {
    a.state
        .severity_rank()
        .cmp(&b.state.severity_rank())
        .then_with(|| a.priority.cmp(&b.priority))
        .then_with(|| match a.state {
            AlertState::Overdue => b
                .hours_overdue
                .unwrap_or(0.0)
                .total_cmp(&a.hours_overdue.unwrap_or(0.0)),
            _ => a
                .hours_remaining
                .unwrap_or(f64::MAX)
                .total_cmp(&b.hours_remaining.unwrap_or(f64::MAX)),
        })
}

/// The `n` most urgent overdue or upcoming alerts of an aircraft.
pub fn top_alerts(aircraft: &AircraftMonitoringSummary, n: usize) -> Vec<&Alert> {
    let mut alerts: Vec<&Alert> = aircraft.alerts.iter().filter(|a| a.is_actionable()).collect();
    alerts.sort_by(|a, b| compare_urgency(a, b));
    alerts.truncate(n);
    alerts
}

/// Every overdue or upcoming alert across the given aircraft, most urgent
/// first, paired with its aircraft.
pub fn actionable_alerts<'a>(
    aircraft: &[&'a AircraftMonitoringSummary],
) -> Vec<(&'a AircraftMonitoringSummary, &'a Alert)> {
    let mut alerts: Vec<_> = aircraft
        .iter()
        .flat_map(|a| a.alerts.iter().filter(|al| al.is_actionable()).map(move |al| (*a, al)))
        .collect();
    alerts.sort_by(|(a1, x), (a2, y)| {
        compare_urgency(x, y).then_with(|| compare_registration(&a1.registration, &a2.registration))
    });
    alerts
}
