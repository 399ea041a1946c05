//! # fleetwatch-types
//!
//! Wire types for aircraft fleet maintenance monitoring. These are the shapes
//! served by the monitoring REST API and consumed by the fleetwatch engine
//! and dashboard.
//!
//! ## Design Goals
//!
//! - **Wire compatible**: field names serialize to the API's camelCase
//!   Spanish names (`matricula`, `horasVueloActuales`, `estado`, ...)
//! - **Invariant-keeping constructors**: [`AircraftMonitoringSummary::from_alerts`]
//!   and [`FleetSummary::from_aircraft`] derive every count from the alert list
//! - **Ergonomic builders**: fluent API for constructing fleets in tests and
//!   embedded tools
//!
//! ## Example
//!
//! ```rust
//! use fleetwatch_types::{Alert, AlertState, FleetSummary, Priority};
//!
//! let fleet = FleetSummary::builder()
//!     .aircraft("EC-MKA", |a| {
//!         a.id(1).flight_hours(5700.0).alert(
//!             Alert::builder("ENG-100 Engine borescope")
//!                 .window(3000.0, 6000.0)
//!                 .current_hours(5700.0)
//!                 .state(AlertState::Upcoming)
//!                 .hours_remaining(300.0)
//!                 .percent_complete(90.0)
//!                 .priority(Priority::High)
//!                 .build(),
//!         )
//!     })
//!     .aircraft("EC-MKB", |a| a.id(2).flight_hours(1200.0))
//!     .build();
//!
//! assert_eq!(fleet.total_aircraft, 2);
//! assert_eq!(fleet.aircraft_with_alerts, 1);
//! assert_eq!(fleet.total_upcoming_alerts, 1);
//! ```

mod aircraft;
mod alert;
mod fleet;

pub use aircraft::{AircraftBuilder, AircraftDetail, AircraftMonitoringSummary};
pub use alert::{Alert, AlertBuilder, AlertState, Priority};
pub use fleet::{FleetSummary, FleetSummaryBuilder};

/// Timestamp type used on the wire (RFC 3339, UTC).
pub type Timestamp = chrono::DateTime<chrono::Utc>;
