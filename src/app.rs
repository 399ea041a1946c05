//! Application state and navigation logic.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;

use fleetwatch_types::{AircraftMonitoringSummary, Alert, AlertState, FleetSummary};

use crate::data::query::{self, FilterCriteria, FleetStatistics, SortKey};
use crate::data::{export, rederive_fleet, AlertThresholds};
use crate::source::DataSource;
use crate::ui::Theme;

/// The current view/tab in the TUI.
///
/// Aircraft detail is shown as an overlay (controlled by
/// `App::show_detail_overlay`) rather than as a separate view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Every aircraft with its health.
    Fleet,
    /// Overdue and upcoming alerts across the fleet.
    Alerts,
}

impl View {
    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Fleet => View::Alerts,
            View::Alerts => View::Fleet,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Fleet => "Fleet",
            View::Alerts => "Alerts",
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,
    pub show_detail_overlay: bool,

    // Data source
    source: Box<dyn DataSource>,
    pub data: Option<Arc<FleetSummary>>,
    pub last_updated: Option<Instant>,
    pub load_error: Option<String>,
    pub thresholds: AlertThresholds,
    /// Re-evaluate alerts locally instead of trusting the API's states.
    pub rederive: bool,

    // Navigation state
    pub selected_aircraft_index: usize,
    pub selected_alert_index: usize,

    // Query
    pub criteria: FilterCriteria,
    pub sort_key: SortKey,
    pub sort_reversed: bool,

    // Search/filter on registration
    pub filter_text: String,
    pub filter_active: bool,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App with the given data source and thresholds.
    pub fn new(source: Box<dyn DataSource>, thresholds: AlertThresholds) -> Self {
        Self {
            running: true,
            current_view: View::Fleet,
            show_help: false,
            show_detail_overlay: false,
            source,
            data: None,
            last_updated: None,
            load_error: None,
            thresholds,
            rederive: false,
            selected_aircraft_index: 0,
            selected_alert_index: 0,
            criteria: FilterCriteria::default(),
            sort_key: SortKey::default(),
            sort_reversed: false,
            filter_text: String::new(),
            filter_active: false,
            theme: Theme::dark(),
            status_message: None,
        }
    }

    pub fn with_criteria(mut self, criteria: FilterCriteria, sort_key: SortKey) -> Self {
        self.criteria = criteria;
        self.sort_key = sort_key;
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_rederive(mut self, rederive: bool) -> Self {
        self.rederive = rederive;
        self
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    pub fn is_loading(&self) -> bool {
        self.source.is_loading()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    /// Poll the data source for new data.
    ///
    /// Returns true if new data was received. Source errors are kept in
    /// `load_error` alongside whatever data is already shown.
    pub fn reload_data(&mut self) -> bool {
        let received = match self.source.poll() {
            Some(summary) => {
                let summary = if self.rederive {
                    Arc::new(rederive_fleet(&summary, &self.thresholds))
                } else {
                    summary
                };
                self.data = Some(summary);
                self.last_updated = Some(Instant::now());
                self.clamp_selection();
                true
            }
            None => false,
        };
        self.load_error = self.source.error().map(str::to_string);
        received
    }

    /// Ask the source for fresh data now.
    pub fn refresh(&mut self) {
        self.source.refresh();
        self.set_status_message("Refreshing...".to_string());
    }

    /// Aircraft after filtering and sorting, in display order.
    pub fn visible_aircraft(&self) -> Vec<&AircraftMonitoringSummary> {
        let Some(data) = self.data.as_deref() else {
            return Vec::new();
        };
        let mut aircraft = query::filter_and_sort(data, &self.criteria, self.sort_key)
            .unwrap_or_default();
        aircraft.retain(|a| self.matches_filter(&a.registration));
        if self.sort_reversed {
            aircraft.reverse();
        }
        aircraft
    }

    /// Actionable alerts of the visible aircraft, most urgent first.
    pub fn visible_alerts(&self) -> Vec<(&AircraftMonitoringSummary, &Alert)> {
        query::actionable_alerts(&self.visible_aircraft())
    }

    /// Statistics over the visible aircraft.
    pub fn statistics(&self) -> FleetStatistics {
        query::statistics(&self.visible_aircraft())
    }

    /// The aircraft under the cursor in the current view.
    pub fn selected_aircraft(&self) -> Option<&AircraftMonitoringSummary> {
        match self.current_view {
            View::Fleet => self
                .visible_aircraft()
                .get(self.selected_aircraft_index)
                .copied(),
            View::Alerts => self
                .visible_alerts()
                .get(self.selected_alert_index)
                .map(|(a, _)| *a),
        }
    }

    fn item_count(&self) -> usize {
        match self.current_view {
            View::Fleet => self.visible_aircraft().len(),
            View::Alerts => self.visible_alerts().len(),
        }
    }

    fn selection_mut(&mut self) -> &mut usize {
        match self.current_view {
            View::Fleet => &mut self.selected_aircraft_index,
            View::Alerts => &mut self.selected_alert_index,
        }
    }

    fn clamp_selection(&mut self) {
        let aircraft = self.visible_aircraft().len();
        let alerts = self.visible_alerts().len();
        self.selected_aircraft_index = self.selected_aircraft_index.min(aircraft.saturating_sub(1));
        self.selected_alert_index = self.selected_alert_index.min(alerts.saturating_sub(1));
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n items.
    pub fn select_next_n(&mut self, n: usize) {
        let max = self.item_count().saturating_sub(1);
        let selected = self.selection_mut();
        *selected = (*selected + n).min(max);
    }

    /// Move selection up by n items.
    pub fn select_prev_n(&mut self, n: usize) {
        let selected = self.selection_mut();
        *selected = selected.saturating_sub(n);
    }

    /// Jump to the first item in the list.
    pub fn select_first(&mut self) {
        *self.selection_mut() = 0;
    }

    /// Jump to the last item in the list.
    pub fn select_last(&mut self) {
        let last = self.item_count().saturating_sub(1);
        *self.selection_mut() = last;
    }

    /// Open the detail overlay for the selected aircraft.
    pub fn enter_detail(&mut self) {
        if self.selected_aircraft().is_some() {
            self.show_detail_overlay = true;
        }
    }

    /// Navigate back: close overlay first, then return to the fleet view.
    pub fn go_back(&mut self) {
        if self.show_detail_overlay {
            self.show_detail_overlay = false;
        } else {
            self.current_view = View::Fleet;
        }
    }

    /// Close the detail overlay if open.
    pub fn close_overlay(&mut self) {
        self.show_detail_overlay = false;
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Cycle to the next sort key.
    pub fn cycle_sort(&mut self) {
        self.sort_key = self.sort_key.next();
        self.selected_aircraft_index = 0;
    }

    /// Reverse the current sort order.
    pub fn toggle_sort_direction(&mut self) {
        self.sort_reversed = !self.sort_reversed;
    }

    /// Toggle listing only aircraft with overdue or upcoming alerts.
    pub fn toggle_only_with_alerts(&mut self) {
        self.criteria.only_with_alerts = !self.criteria.only_with_alerts;
        self.clamp_selection();
    }

    /// Cycle the worst-state filter: all, then each state from most severe.
    pub fn cycle_state_filter(&mut self) {
        let current = if self.criteria.allowed_states.len() == 1 {
            self.criteria.allowed_states.iter().next().copied()
        } else {
            None
        };
        let next = match current {
            None => Some(AlertState::Overdue),
            Some(AlertState::Overdue) => Some(AlertState::Upcoming),
            Some(AlertState::Upcoming) => Some(AlertState::Current),
            Some(AlertState::Current) => None,
        };
        self.criteria.allowed_states = next.into_iter().collect();
        self.clamp_selection();
    }

    /// Short description of the active state filter.
    pub fn state_filter_label(&self) -> String {
        if self.criteria.allowed_states.is_empty() {
            "all".to_string()
        } else {
            self.criteria
                .allowed_states
                .iter()
                .map(|s| s.wire_name())
                .collect::<Vec<_>>()
                .join("+")
        }
    }

    /// Enter filter input mode (starts capturing keystrokes for search).
    pub fn start_filter(&mut self) {
        self.filter_active = true;
    }

    /// Exit filter input mode without clearing the filter text.
    pub fn cancel_filter(&mut self) {
        self.filter_active = false;
    }

    /// Clear the filter text and exit filter mode.
    pub fn clear_filter(&mut self) {
        self.filter_text.clear();
        self.filter_active = false;
    }

    /// Append a character to the filter text.
    pub fn filter_push(&mut self, c: char) {
        self.filter_text.push(c);
        self.clamp_selection();
    }

    /// Remove the last character from the filter text.
    pub fn filter_pop(&mut self) {
        self.filter_text.pop();
    }

    /// Check if a registration matches the current filter.
    pub fn matches_filter(&self, registration: &str) -> bool {
        if self.filter_text.is_empty() {
            return true;
        }
        registration
            .to_lowercase()
            .contains(&self.filter_text.to_lowercase())
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export the visible aircraft as CSV. Returns the number of rows.
    pub fn export_csv(&self, path: &Path) -> Result<usize> {
        if self.data.is_none() {
            anyhow::bail!("No data to export");
        }
        let aircraft = self.visible_aircraft();
        export::write_csv(path, &aircraft)?;
        Ok(aircraft.len())
    }
}
