//! # fleetwatch-adapters
//!
//! Client adapters for the fleet maintenance monitoring REST API.
//!
//! The [`FleetApi`] trait is the seam between the monitoring engine and the
//! network: the engine's repository only ever talks to a `FleetApi`, so tests
//! and embedded tools can substitute their own implementation.
//!
//! ## Endpoints
//!
//! - `GET /monitoreo/flota` - full fleet summary
//! - `GET /monitoreo/aeronave/{matricula}` - alerts and summary for one aircraft
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fleetwatch_adapters::{http::HttpFleetClient, FleetApi};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HttpFleetClient::builder()
//!         .endpoint("http://localhost:3000/api")
//!         .build()?;
//!
//!     let fleet = client.fetch_fleet_summary().await?;
//!     println!("Fetched {} aircraft", fleet.aircraft.len());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod error;

#[cfg(feature = "http")]
pub mod http;

pub use api::FleetApi;
pub use error::ApiError;

// Re-export types for convenience
pub use fleetwatch_types::{AircraftDetail, AircraftMonitoringSummary, Alert, FleetSummary};
