//! Fleet view: one row per aircraft with its health.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use fleetwatch_types::AlertState;

use super::common::format_hours;
use crate::app::App;
use crate::data::query::SortKey;
use crate::data::AircraftHealth;

/// Render the Fleet view showing the filtered, sorted aircraft list.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref data) = app.data else {
        return;
    };

    let aircraft = app.visible_aircraft();

    let header = Row::new(vec![
        Cell::from(format_header("Registration", SortKey::Alphabetic, app)),
        Cell::from(format_header("Hours", SortKey::Hours, app)),
        Cell::from("Alerts"),
        Cell::from(format_header("Overdue", SortKey::Criticality, app)),
        Cell::from("Upcoming"),
        Cell::from("OK"),
        Cell::from("Health"),
        Cell::from("Status"),
        Cell::from("Summary"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = aircraft
        .iter()
        .map(|a| {
            let health = AircraftHealth::of(a);
            let dim_if_zero = |n: u32, state: AlertState| {
                if n > 0 {
                    Cell::from(n.to_string()).style(app.theme.status_style(state))
                } else {
                    Cell::from("-").style(Style::default().add_modifier(Modifier::DIM))
                }
            };

            Row::new(vec![
                Cell::from(a.registration.clone()),
                Cell::from(format_hours(a.flight_hours)),
                Cell::from(a.total_alerts.to_string()),
                dim_if_zero(a.critical_alerts, AlertState::Overdue),
                dim_if_zero(a.upcoming_alerts, AlertState::Upcoming),
                Cell::from(a.ok_alerts.to_string()),
                Cell::from(format!("{}%", health.health_percent))
                    .style(app.theme.health_style(health.health_percent)),
                Cell::from(app.theme.badge(health.overall)),
                Cell::from(health.summary_text),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(2),   // Registration
        Constraint::Fill(1),   // Hours
        Constraint::Length(7), // Alerts
        Constraint::Length(8), // Overdue
        Constraint::Length(9), // Upcoming
        Constraint::Length(4), // OK
        Constraint::Length(7), // Health
        Constraint::Length(9), // Status
        Constraint::Fill(3),   // Summary
    ];

    let selected = app
        .selected_aircraft_index
        .min(aircraft.len().saturating_sub(1));

    let sort_dir = if app.sort_reversed { "↑" } else { "↓" };

    let filter_info = if app.filter_active {
        format!(" /{}_", app.filter_text)
    } else if !app.filter_text.is_empty() {
        format!(" /{}/ [c:clear]", app.filter_text)
    } else {
        String::new()
    };

    let alerts_only = if app.criteria.only_with_alerts {
        " [alerts only]"
    } else {
        ""
    };

    let position_info = if !aircraft.is_empty() {
        format!(" [{}/{}]", selected + 1, aircraft.len())
    } else {
        String::new()
    };

    let title = format!(
        " Aircraft ({}/{}) [s:sort {}{}] [f:{}]{}{}{} ",
        aircraft.len(),
        data.aircraft.len(),
        app.sort_key.label(),
        sort_dir,
        app.state_filter_label(),
        alerts_only,
        filter_info,
        position_info
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected));

    frame.render_stateful_widget(table, area, &mut state);
}

fn format_header(name: &str, key: SortKey, app: &App) -> Span<'static> {
    if app.sort_key == key {
        let arrow = if app.sort_reversed { "↑" } else { "↓" };
        Span::raw(format!("{}{}", name, arrow))
    } else {
        Span::raw(name.to_string())
    }
}
