//! # fleetwatch
//!
//! Maintenance alerting for an aircraft fleet: a library and terminal
//! dashboard on top of a maintenance-monitoring API.
//!
//! Every monitored item (component, inspection, directive) has an hour
//! window. Comparing an aircraft's flight hours against that window gives
//! the item a state: OK, PROXIMO (upcoming) or VENCIDO (overdue). This crate
//! evaluates those states, rolls them up per aircraft and fleet, and keeps
//! a cached, retrying connection to the API that many consumers can share.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│ │
//! │  │ (state) │    │ (queries)│    │(render) │    │         │ │
//! │  └────┬────┘    └──────────┘    └─────────┘    └─────────┘ │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  ┌─────────┐    ┌────────────┐    ┌──────────┐             │
//! │  │ source  │◀───│ repository │◀───│ FleetApi │             │
//! │  │ (input) │    │(cache/retry)    │  (HTTP)  │             │
//! │  └─────────┘    └────────────┘    └──────────┘             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`data`]**: Alert evaluation, health aggregation, filtering, sorting,
//!   statistics and CSV/JSON export. Pure functions only.
//! - **[`repository`]**: [`FleetRepository`] with a TTL cache, exponential
//!   backoff on transient failures, request de-duplication and a
//!   [`FleetSubscription`] for long-lived consumers.
//! - **[`source`]**: The [`DataSource`] trait the TUI polls, with
//!   [`ApiSource`] (live) and [`FileSource`] (offline) implementations.
//! - **[`app`]**, **[`events`]**, **[`ui`]**: The terminal dashboard.
//! - **[`config`]**: Layered [`Settings`](config::Settings).
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Live dashboard against the API
//! fleetwatch --api-url http://mro.example/api
//!
//! # Offline, from a saved summary
//! fleetwatch --file fleet.json
//!
//! # Overdue aircraft to CSV, most critical first
//! fleetwatch --state vencido --sort criticality --export-csv overdue.csv
//! ```
//!
//! ### Evaluating alerts
//!
//! ```
//! use fleetwatch::data::{evaluate, AlertThresholds, MonitoredItem};
//! use fleetwatch_types::AlertState;
//!
//! let item = MonitoredItem::new("Engine borescope", 3000.0, 6000.0);
//! let alert = evaluate(&item, 5700.0, &AlertThresholds::default());
//!
//! assert_eq!(alert.state, AlertState::Upcoming);
//! assert_eq!(alert.hours_remaining, Some(300.0));
//! ```
//!
//! ### Sharing one repository
//!
//! ```no_run
//! use std::sync::Arc;
//! use fleetwatch::FleetRepository;
//! use fleetwatch_adapters::http::HttpFleetClient;
//!
//! # tokio_test::block_on(async {
//! let client = HttpFleetClient::builder()
//!     .endpoint("http://localhost:3000/api")
//!     .build()
//!     .unwrap();
//! let repository = FleetRepository::new(Arc::new(client));
//!
//! // Served from cache for the next 30 seconds
//! let state = repository.get_fleet_summary(false).await;
//! if let Some(fleet) = state.data {
//!     println!("{} aircraft", fleet.len());
//! }
//! # });
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod repository;
pub mod source;
pub mod ui;

#[cfg(test)]
mod test_support;

// Re-export main types for convenience
pub use app::{App, View};
pub use data::{AircraftHealth, AlertThresholds, FilterCriteria, FleetStatistics, SortKey};
pub use error::MonitorError;
pub use repository::{FleetRepository, FleetState, FleetSubscription, SubscriptionOptions};
pub use source::{ApiSource, DataSource, FileSource};
pub use ui::Theme;
