//! Alert evaluation and fleet queries.
//!
//! Everything in this module is pure: it takes fetched summaries and
//! produces new values without touching the network or shared state.
//!
//! ## Submodules
//!
//! - [`alert`]: Alert state evaluation from hour windows ([`evaluate`], [`AlertThresholds`])
//! - [`health`]: Per-aircraft aggregation ([`aggregate`], [`AircraftHealth`])
//! - [`query`]: Filtering, sorting, statistics and top alerts
//! - [`export`]: CSV and JSON export
//!
//! ## Data Flow
//!
//! ```text
//! FleetSummary (fetched)
//!        │
//!        ├──▶ rederive_fleet() (optional, re-evaluates alerts locally)
//!        │
//!        ▼
//! filter_and_sort(criteria, key)
//!        │
//!        ├──▶ statistics()
//!        ├──▶ aggregate() per aircraft
//!        └──▶ to_csv() / to_json()
//! ```

pub mod alert;
pub mod export;
pub mod health;
pub mod query;

pub use alert::{evaluate, rederive_fleet, rederive_summary, AlertThresholds, MonitoredItem};
pub use health::{aggregate, AircraftHealth};
pub use query::{
    filter, filter_and_sort, statistics, top_alerts, FilterCriteria, FleetStatistics, SortKey,
};
