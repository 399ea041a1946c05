//! The fetch seam between the monitoring engine and the REST API.

use async_trait::async_trait;

use fleetwatch_types::{AircraftDetail, FleetSummary};

use crate::ApiError;

/// Source of fleet monitoring data.
///
/// Implementations perform exactly one request per call; retries, caching
/// and de-duplication are layered on top by the caller.
#[async_trait]
pub trait FleetApi: Send + Sync {
    /// `GET /monitoreo/flota`
    async fn fetch_fleet_summary(&self) -> Result<FleetSummary, ApiError>;

    /// `GET /monitoreo/aeronave/{matricula}`
    async fn fetch_aircraft(&self, registration: &str) -> Result<AircraftDetail, ApiError>;

    /// Returns a human-readable description of the API endpoint.
    fn description(&self) -> String;
}
