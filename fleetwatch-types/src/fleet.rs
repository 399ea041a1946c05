//! Fleet summary - the full-fleet view served by the monitoring API.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{AircraftBuilder, AircraftMonitoringSummary, Timestamp};

/// Point-in-time summary of every monitored aircraft.
///
/// This is the unit the client caches. Consumers receive it behind a shared
/// pointer and never mutate it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetSummary {
    #[serde(rename = "totalAeronaves", default)]
    pub total_aircraft: u32,

    #[serde(rename = "aeronavesConAlertas", default)]
    pub aircraft_with_alerts: u32,

    #[serde(rename = "totalAlertasCriticas", default)]
    pub total_critical_alerts: u32,

    #[serde(rename = "totalAlertasProximas", default)]
    pub total_upcoming_alerts: u32,

    #[serde(rename = "aeronaves", default)]
    pub aircraft: Vec<AircraftMonitoringSummary>,

    #[serde(rename = "generadoEn")]
    pub generated_at: Timestamp,
}

impl FleetSummary {
    /// Build a fleet summary whose totals are derived from `aircraft`.
    pub fn from_aircraft(aircraft: Vec<AircraftMonitoringSummary>, generated_at: Timestamp) -> Self {
        Self {
            total_aircraft: aircraft.len() as u32,
            aircraft_with_alerts: aircraft.iter().filter(|a| a.has_active_alerts()).count() as u32,
            total_critical_alerts: aircraft.iter().map(|a| a.critical_alerts).sum(),
            total_upcoming_alerts: aircraft.iter().map(|a| a.upcoming_alerts).sum(),
            aircraft,
            generated_at,
        }
    }

    /// Create a builder for constructing fleet summaries.
    pub fn builder() -> FleetSummaryBuilder {
        FleetSummaryBuilder::new()
    }

    /// Check if the fleet is empty.
    pub fn is_empty(&self) -> bool {
        self.aircraft.is_empty()
    }

    /// Number of aircraft in the summary.
    pub fn len(&self) -> usize {
        self.aircraft.len()
    }

    /// Look up an aircraft by registration (case-insensitive).
    pub fn get(&self, registration: &str) -> Option<&AircraftMonitoringSummary> {
        self.aircraft
            .iter()
            .find(|a| a.registration.eq_ignore_ascii_case(registration))
    }
}

/// Builder for constructing [`FleetSummary`] instances.
#[derive(Debug, Default)]
pub struct FleetSummaryBuilder {
    generated_at: Option<Timestamp>,
    aircraft: Vec<AircraftMonitoringSummary>,
}

impl FleetSummaryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the generation timestamp.
    pub fn generated_at(mut self, at: Timestamp) -> Self {
        self.generated_at = Some(at);
        self
    }

    /// Add an aircraft using a builder function.
    pub fn aircraft<F>(mut self, registration: &str, f: F) -> Self
    where
        F: FnOnce(AircraftBuilder) -> AircraftBuilder,
    {
        let builder = f(AircraftBuilder::new(registration));
        self.aircraft.push(builder.build());
        self
    }

    /// Add a pre-built aircraft summary.
    pub fn summary(mut self, summary: AircraftMonitoringSummary) -> Self {
        self.aircraft.push(summary);
        self
    }

    pub fn build(self) -> FleetSummary {
        FleetSummary::from_aircraft(self.aircraft, self.generated_at.unwrap_or_else(Utc::now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Alert, AlertState};

    #[test]
    fn test_builder_derives_totals() {
        let fleet = FleetSummary::builder()
            .aircraft("EC-AAA", |a| {
                a.alert(Alert::builder("A").state(AlertState::Overdue).build())
                    .alert(Alert::builder("B").state(AlertState::Upcoming).build())
            })
            .aircraft("EC-BBB", |a| a.alert(Alert::builder("C").build()))
            .aircraft("EC-CCC", |a| a)
            .build();

        assert_eq!(fleet.len(), 3);
        assert_eq!(fleet.total_aircraft, 3);
        assert_eq!(fleet.aircraft_with_alerts, 1);
        assert_eq!(fleet.total_critical_alerts, 1);
        assert_eq!(fleet.total_upcoming_alerts, 1);
        assert!(fleet.get("ec-bbb").is_some());
        assert!(fleet.get("EC-ZZZ").is_none());
    }

    #[test]
    fn test_deserialize_fleet() {
        let json = r#"{
            "totalAeronaves": 1,
            "aeronavesConAlertas": 1,
            "totalAlertasCriticas": 0,
            "totalAlertasProximas": 1,
            "aeronaves": [{
                "aeronaveId": 1,
                "matricula": "EC-MKA",
                "horasVueloActuales": 5700,
                "alertas": [{
                    "descripcionCodigo": "ENG-100",
                    "horaInicial": 3000,
                    "horaFinal": 6000,
                    "horasActuales": 5700,
                    "estado": "PROXIMO",
                    "tipoAlerta": "COMPONENTE",
                    "horasRestantes": 300,
                    "porcentajeCompletado": 90,
                    "prioridad": 1
                }],
                "totalAlertas": 1,
                "alertasCriticas": 0,
                "alertasProximas": 1,
                "alertasOk": 0,
                "ultimaActualizacion": "2024-03-01T12:00:00Z"
            }],
            "generadoEn": "2024-03-01T12:00:05Z"
        }"#;

        let fleet: FleetSummary = serde_json::from_str(json).unwrap();
        assert_eq!(fleet.len(), 1);
        let aircraft = &fleet.aircraft[0];
        assert_eq!(aircraft.registration, "EC-MKA");
        assert_eq!(aircraft.alerts[0].state, AlertState::Upcoming);
        assert_eq!(aircraft.alerts[0].hours_remaining, Some(300.0));
        assert!(aircraft.counts_consistent());
    }
}
