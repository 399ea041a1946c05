//! CSV and JSON export of aircraft lists.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::SecondsFormat;

use fleetwatch_types::AircraftMonitoringSummary;

use super::health::AircraftHealth;
use super::query::{statistics, top_alerts, DEFAULT_TOP_ALERTS};

/// Column header of the CSV export.
pub const CSV_HEADER: [&str; 8] = [
    "Matrícula",
    "Horas de Vuelo",
    "Total Alertas",
    "Críticas",
    "Próximas",
    "OK",
    "Porcentaje Salud",
    "Última Actualización",
];

/// Render aircraft as CSV, one row per aircraft in the given order.
pub fn to_csv(aircraft: &[&AircraftMonitoringSummary]) -> String {
    let mut out = CSV_HEADER.join(",");
    out.push('\n');

    for a in aircraft {
        let health = AircraftHealth::of(a);
        let row = [
            csv_field(&a.registration),
            a.flight_hours.to_string(),
            a.total_alerts.to_string(),
            a.critical_alerts.to_string(),
            a.upcoming_alerts.to_string(),
            a.ok_alerts.to_string(),
            health.health_percent.to_string(),
            a.last_updated.to_rfc3339_opts(SecondsFormat::Secs, true),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

// Quote a field only when it contains a separator, quote or line break
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Write the CSV export to a file.
pub fn write_csv(path: &Path, aircraft: &[&AircraftMonitoringSummary]) -> Result<()> {
    std::fs::write(path, to_csv(aircraft))
        .with_context(|| format!("Failed to write CSV export to {}", path.display()))
}

/// Build the JSON export: fleet statistics plus per-aircraft health.
pub fn to_json(aircraft: &[&AircraftMonitoringSummary]) -> serde_json::Value {
    let stats = statistics(aircraft);

    let rows: Vec<serde_json::Value> = aircraft
        .iter()
        .map(|a| {
            let health = AircraftHealth::of(a);
            let top: Vec<serde_json::Value> = top_alerts(a, DEFAULT_TOP_ALERTS)
                .into_iter()
                .map(|alert| {
                    serde_json::json!({
                        "item": alert.code_description,
                        "state": alert.state.wire_name(),
                        "type": alert.alert_type,
                        "hoursRemaining": alert.hours_remaining,
                        "hoursOverdue": alert.hours_overdue,
                        "percentComplete": alert.display_percent(),
                    })
                })
                .collect();

            serde_json::json!({
                "registration": a.registration,
                "flightHours": a.flight_hours,
                "status": health.overall.wire_name(),
                "healthPercent": health.health_percent,
                "summary": health.summary_text,
                "totalAlerts": a.total_alerts,
                "criticalAlerts": a.critical_alerts,
                "upcomingAlerts": a.upcoming_alerts,
                "okAlerts": a.ok_alerts,
                "lastUpdated": a.last_updated,
                "topAlerts": top,
            })
        })
        .collect();

    serde_json::json!({
        "statistics": stats,
        "aircraft": rows,
    })
}

/// Write the JSON export to a file.
pub fn write_json(path: &Path, aircraft: &[&AircraftMonitoringSummary]) -> Result<()> {
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let json = serde_json::to_string_pretty(&to_json(aircraft))?;
    file.write_all(json.as_bytes())?;
    Ok(())
}
