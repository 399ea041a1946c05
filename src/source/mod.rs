//! Data source abstraction for receiving fleet summaries.
//!
//! The TUI polls a [`DataSource`] once per tick. The live API source is fed
//! by a [`FleetSubscription`](crate::repository::FleetSubscription); the file
//! source reads a saved summary for offline use.

mod api;
mod file;

pub use api::ApiSource;
pub use file::FileSource;

use std::fmt::Debug;
use std::sync::Arc;

use fleetwatch_types::FleetSummary;

/// Trait for receiving fleet summaries from various sources.
///
/// # Example
///
/// ```
/// use fleetwatch::{DataSource, FileSource};
///
/// let mut source = FileSource::new("fleet.json");
/// if let Some(fleet) = source.poll() {
///     println!("Got {} aircraft", fleet.len());
/// }
/// ```
pub trait DataSource: Send + Debug {
    /// Poll for the latest summary.
    ///
    /// Returns `Some(summary)` if new data is available, `None` otherwise.
    /// This method should be non-blocking.
    fn poll(&mut self) -> Option<Arc<FleetSummary>>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;

    /// Error of the last update, if it failed.
    fn error(&self) -> Option<&str>;

    /// True while a fetch is running.
    fn is_loading(&self) -> bool {
        false
    }

    /// Ask the source to reload now.
    fn refresh(&mut self) {}
}
