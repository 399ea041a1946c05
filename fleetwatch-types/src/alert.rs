//! Alert types - the derived judgment for one monitored maintenance item.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Timestamp;

/// Three-valued maintenance state of a monitored item.
///
/// Ordered by severity so that `max()` over a set of states yields the
/// worst case: `Current < Upcoming < Overdue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AlertState {
    /// Maintenance action is not yet due.
    #[serde(rename = "OK")]
    Current,
    /// Within the proximity band below the due hour.
    #[serde(rename = "PROXIMO")]
    Upcoming,
    /// Flight hours are past the due hour.
    #[serde(rename = "VENCIDO")]
    Overdue,
}

impl AlertState {
    /// All states, most severe first.
    pub const ALL: [AlertState; 3] = [AlertState::Overdue, AlertState::Upcoming, AlertState::Current];

    /// Severity rank used for ordering: overdue 0, upcoming 1, current 2.
    pub fn severity_rank(self) -> u8 {
        match self {
            AlertState::Overdue => 0,
            AlertState::Upcoming => 1,
            AlertState::Current => 2,
        }
    }

    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            AlertState::Current => "OK",
            AlertState::Upcoming => "DUE",
            AlertState::Overdue => "OVER",
        }
    }

    /// Returns a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            AlertState::Current => "Current",
            AlertState::Upcoming => "Approaching due",
            AlertState::Overdue => "Overdue",
        }
    }

    /// The name used on the wire.
    pub fn wire_name(&self) -> &'static str {
        match self {
            AlertState::Current => "OK",
            AlertState::Upcoming => "PROXIMO",
            AlertState::Overdue => "VENCIDO",
        }
    }
}

impl fmt::Display for AlertState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for AlertState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ok" | "current" => Ok(AlertState::Current),
            "proximo" | "próximo" | "upcoming" | "due" => Ok(AlertState::Upcoming),
            "vencido" | "overdue" => Ok(AlertState::Overdue),
            other => Err(format!(
                "unknown alert state '{}' (expected ok, proximo or vencido)",
                other
            )),
        }
    }
}

/// Priority assigned externally per item type. Lower number is more urgent.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum Priority {
    High = 1,
    #[default]
    Medium = 2,
    Low = 3,
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl TryFrom<u8> for Priority {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Priority::High),
            2 => Ok(Priority::Medium),
            3 => Ok(Priority::Low),
            other => Err(format!("priority must be 1, 2 or 3, got {}", other)),
        }
    }
}

impl From<Priority> for u8 {
    fn from(p: Priority) -> Self {
        p as u8
    }
}

/// A maintenance alert for one monitored item on one aircraft.
///
/// Alerts are derived and ephemeral: they are recomputed whenever the
/// aircraft's flight hours change and are never persisted client side.
/// Exactly one of `hours_remaining` / `hours_overdue` is meaningful,
/// depending on `state`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Item code and description (e.g. "ENG-100 Engine borescope").
    #[serde(rename = "descripcionCodigo")]
    pub code_description: String,

    /// Start of the hour window.
    #[serde(rename = "horaInicial")]
    pub start_hours: f64,

    /// Hour at which the maintenance action is due.
    #[serde(rename = "horaFinal")]
    pub due_hours: f64,

    /// Aircraft flight hours at evaluation time.
    #[serde(rename = "horasActuales")]
    pub current_hours: f64,

    #[serde(rename = "estado")]
    pub state: AlertState,

    /// Item category (component, inspection, ...), used by type filters.
    #[serde(rename = "tipoAlerta", default)]
    pub alert_type: String,

    #[serde(rename = "horasRestantes", default, skip_serializing_if = "Option::is_none")]
    pub hours_remaining: Option<f64>,

    #[serde(rename = "horasVencidas", default, skip_serializing_if = "Option::is_none")]
    pub hours_overdue: Option<f64>,

    /// Completion of the hour window, in percent. May exceed 100.
    #[serde(rename = "porcentajeCompletado")]
    pub percent_complete: f64,

    #[serde(
        rename = "fechaProximoVencimiento",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub next_due_date: Option<Timestamp>,

    #[serde(rename = "prioridad", default)]
    pub priority: Priority,
}

impl Alert {
    /// Create a builder for an alert.
    pub fn builder(code_description: impl Into<String>) -> AlertBuilder {
        AlertBuilder::new(code_description)
    }

    /// Completion percentage clamped to `[0, 100]` for display.
    pub fn display_percent(&self) -> f64 {
        self.percent_complete.clamp(0.0, 100.0)
    }

    /// True for upcoming and overdue alerts.
    pub fn is_actionable(&self) -> bool {
        self.state != AlertState::Current
    }

    /// Hours that are meaningful for the current state: overdue hours for
    /// overdue alerts, remaining hours otherwise.
    pub fn relevant_hours(&self) -> Option<f64> {
        match self.state {
            AlertState::Overdue => self.hours_overdue,
            _ => self.hours_remaining,
        }
    }
}

/// Builder for [`Alert`].
#[derive(Debug, Clone)]
pub struct AlertBuilder {
    alert: Alert,
}

impl AlertBuilder {
    pub fn new(code_description: impl Into<String>) -> Self {
        Self {
            alert: Alert {
                code_description: code_description.into(),
                start_hours: 0.0,
                due_hours: 0.0,
                current_hours: 0.0,
                state: AlertState::Current,
                alert_type: String::new(),
                hours_remaining: None,
                hours_overdue: None,
                percent_complete: 0.0,
                next_due_date: None,
                priority: Priority::default(),
            },
        }
    }

    /// Set the hour window `[start, due]`.
    pub fn window(mut self, start: f64, due: f64) -> Self {
        self.alert.start_hours = start;
        self.alert.due_hours = due;
        self
    }

    pub fn current_hours(mut self, hours: f64) -> Self {
        self.alert.current_hours = hours;
        self
    }

    pub fn state(mut self, state: AlertState) -> Self {
        self.alert.state = state;
        self
    }

    pub fn alert_type(mut self, alert_type: impl Into<String>) -> Self {
        self.alert.alert_type = alert_type.into();
        self
    }

    pub fn hours_remaining(mut self, hours: f64) -> Self {
        self.alert.hours_remaining = Some(hours);
        self
    }

    pub fn hours_overdue(mut self, hours: f64) -> Self {
        self.alert.hours_overdue = Some(hours);
        self
    }

    pub fn percent_complete(mut self, percent: f64) -> Self {
        self.alert.percent_complete = percent;
        self
    }

    pub fn next_due_date(mut self, date: Timestamp) -> Self {
        self.alert.next_due_date = Some(date);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.alert.priority = priority;
        self
    }

    pub fn build(self) -> Alert {
        self.alert
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_ordering_is_by_severity() {
        assert!(AlertState::Overdue > AlertState::Upcoming);
        assert!(AlertState::Upcoming > AlertState::Current);
        let worst = [AlertState::Current, AlertState::Overdue, AlertState::Upcoming]
            .into_iter()
            .max();
        assert_eq!(worst, Some(AlertState::Overdue));
    }

    #[test]
    fn test_severity_rank() {
        assert_eq!(AlertState::Overdue.severity_rank(), 0);
        assert_eq!(AlertState::Upcoming.severity_rank(), 1);
        assert_eq!(AlertState::Current.severity_rank(), 2);
    }

    #[test]
    fn test_state_from_str() {
        assert_eq!("VENCIDO".parse::<AlertState>(), Ok(AlertState::Overdue));
        assert_eq!("proximo".parse::<AlertState>(), Ok(AlertState::Upcoming));
        assert_eq!(" ok ".parse::<AlertState>(), Ok(AlertState::Current));
        assert!("late".parse::<AlertState>().is_err());
    }

    #[test]
    fn test_priority_wire_format() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "1");
        let p: Priority = serde_json::from_str("3").unwrap();
        assert_eq!(p, Priority::Low);
        assert!(serde_json::from_str::<Priority>("7").is_err());
        assert!(Priority::High < Priority::Low);
    }

    #[test]
    fn test_deserialize_alert() {
        let json = r#"{
            "descripcionCodigo": "ENG-100 Engine borescope",
            "horaInicial": 3000,
            "horaFinal": 6000,
            "horasActuales": 6200,
            "estado": "VENCIDO",
            "tipoAlerta": "COMPONENTE",
            "horasVencidas": 200,
            "porcentajeCompletado": 106.67,
            "fechaProximoVencimiento": "2024-05-01T00:00:00Z",
            "prioridad": 1
        }"#;

        let alert: Alert = serde_json::from_str(json).unwrap();
        assert_eq!(alert.state, AlertState::Overdue);
        assert_eq!(alert.hours_overdue, Some(200.0));
        assert_eq!(alert.hours_remaining, None);
        assert_eq!(alert.relevant_hours(), Some(200.0));
        assert_eq!(alert.priority, Priority::High);
        assert_eq!(alert.display_percent(), 100.0);
        assert!(alert.next_due_date.is_some());
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let json = r#"{
            "descripcionCodigo": "AVI-7",
            "horaInicial": 0,
            "horaFinal": 100,
            "horasActuales": 10,
            "estado": "OK",
            "porcentajeCompletado": 10
        }"#;

        let alert: Alert = serde_json::from_str(json).unwrap();
        assert_eq!(alert.priority, Priority::Medium);
        assert!(alert.alert_type.is_empty());
        assert!(!alert.is_actionable());
    }
}
