//! Alerts view: every overdue or upcoming alert, most urgent first.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use super::common::{format_hours, hours_note, progress_bar};
use crate::app::App;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    if app.data.is_none() {
        return;
    }

    let alerts = app.visible_alerts();

    let block = Block::default()
        .title(format!(" Alerts needing attention ({}) ", alerts.len()))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if alerts.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from("  No overdue or upcoming maintenance")
                .style(Style::default().add_modifier(Modifier::DIM)),
        ])
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let header = Row::new(vec![
        Cell::from("State"),
        Cell::from("Aircraft"),
        Cell::from("Item"),
        Cell::from("Type"),
        Cell::from("Due at"),
        Cell::from("Remaining"),
        Cell::from("Progress"),
        Cell::from("Prio"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = alerts
        .iter()
        .map(|(aircraft, alert)| {
            let style = app.theme.status_style(alert.state);
            Row::new(vec![
                Cell::from(alert.state.symbol()).style(style),
                Cell::from(aircraft.registration.clone()),
                Cell::from(alert.code_description.clone()),
                Cell::from(alert.alert_type.clone()),
                Cell::from(format_hours(alert.due_hours)),
                Cell::from(hours_note(alert)).style(style),
                Cell::from(progress_bar(alert.display_percent(), 10)),
                Cell::from(alert.priority.label()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(6),  // State
        Constraint::Length(10), // Aircraft
        Constraint::Fill(3),    // Item
        Constraint::Fill(1),    // Type
        Constraint::Length(10), // Due at
        Constraint::Length(14), // Remaining
        Constraint::Length(16), // Progress
        Constraint::Length(7),  // Priority
    ];

    let selected = app.selected_alert_index.min(alerts.len().saturating_sub(1));

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected));

    frame.render_stateful_widget(table, area, &mut state);
}
