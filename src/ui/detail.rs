//! Detail overlay rendering.
//!
//! Displays a modal card for the selected aircraft: health summary, the
//! most urgent alerts, and the full alert list.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};

use super::common::{format_hours, hours_note, progress_bar};
use crate::app::App;
use crate::data::query::{top_alerts, DEFAULT_TOP_ALERTS};
use crate::data::AircraftHealth;

/// Minimum width required for the detail overlay to render properly.
const MIN_OVERLAY_WIDTH: u16 = 50;
/// Minimum height required for the detail overlay to render properly.
const MIN_OVERLAY_HEIGHT: u16 = 16;

/// Render the aircraft detail as a modal overlay.
pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect) {
    if area.width < MIN_OVERLAY_WIDTH || area.height < MIN_OVERLAY_HEIGHT {
        return;
    }

    let Some(aircraft) = app.selected_aircraft() else {
        return;
    };

    let overlay_width = (area.width * 95 / 100).clamp(MIN_OVERLAY_WIDTH, 110);
    let overlay_height = (area.height * 90 / 100).clamp(MIN_OVERLAY_HEIGHT, 50);

    let x = area.x + (area.width.saturating_sub(overlay_width)) / 2;
    let y = area.y + (area.height.saturating_sub(overlay_height)) / 2;
    let overlay_area = Rect::new(x, y, overlay_width, overlay_height);

    frame.render_widget(Clear, overlay_area);

    let top = top_alerts(aircraft, DEFAULT_TOP_ALERTS);

    let chunks = Layout::vertical([
        Constraint::Length(5),                    // Header with aircraft info
        Constraint::Length(top.len() as u16 + 2), // Most urgent
        Constraint::Min(6),                       // All alerts
        Constraint::Length(1),                    // Footer
    ])
    .split(overlay_area);

    // ===== HEADER =====
    let health = AircraftHealth::of(aircraft);
    let status_style = app.theme.status_style(health.overall);

    let header_lines = vec![
        Line::from(vec![
            Span::styled(
                format!(" {} ", aircraft.registration),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            app.theme.badge(health.overall),
            Span::styled(format!(" {}", health.overall.label()), status_style),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::raw(" Flight hours: "),
            Span::styled(
                format_hours(aircraft.flight_hours),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("    Health: "),
            Span::styled(
                format!("{}%", health.health_percent),
                app.theme.health_style(health.health_percent),
            ),
            Span::raw("    "),
            Span::styled(health.summary_text.clone(), status_style),
            Span::styled(
                format!(
                    "    updated {}",
                    aircraft.last_updated.format("%Y-%m-%d %H:%M UTC")
                ),
                Style::default().add_modifier(Modifier::DIM),
            ),
        ]),
    ];

    let header_block = Block::default()
        .title(" Aircraft Detail ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.accent));

    frame.render_widget(Paragraph::new(header_lines).block(header_block), chunks[0]);

    // ===== MOST URGENT =====
    let urgent_lines: Vec<Line> = top
        .iter()
        .map(|alert| {
            let style = app.theme.status_style(alert.state);
            Line::from(vec![
                Span::styled(format!(" {:<5}", alert.state.symbol()), style),
                Span::raw(format!("{}  ", alert.code_description)),
                Span::styled(hours_note(alert), style),
            ])
        })
        .collect();

    let urgent_block = Block::default()
        .title(" Most urgent ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    frame.render_widget(Paragraph::new(urgent_lines).block(urgent_block), chunks[1]);

    // ===== ALL ALERTS =====
    let alerts_block = Block::default()
        .title(format!(" Alerts ({}) ", aircraft.alerts.len()))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if aircraft.alerts.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "  No monitored items",
                Style::default().add_modifier(Modifier::DIM),
            )),
        ])
        .block(alerts_block);
        frame.render_widget(empty, chunks[2]);
    } else {
        let header = Row::new(vec![
            Cell::from("Item"),
            Cell::from("Type"),
            Cell::from("Window"),
            Cell::from("Progress"),
            Cell::from("Remaining"),
            Cell::from("Next due"),
            Cell::from("State"),
        ])
        .height(1)
        .style(app.theme.header);

        let rows: Vec<Row> = aircraft
            .alerts
            .iter()
            .map(|alert| {
                let style = app.theme.status_style(alert.state);
                Row::new(vec![
                    Cell::from(alert.code_description.clone()),
                    Cell::from(alert.alert_type.clone()),
                    Cell::from(format!(
                        "{}-{}",
                        format_hours(alert.start_hours),
                        format_hours(alert.due_hours)
                    )),
                    Cell::from(progress_bar(alert.display_percent(), 10)),
                    Cell::from(hours_note(alert)).style(style),
                    Cell::from(
                        alert
                            .next_due_date
                            .map(|d| d.format("%Y-%m-%d").to_string())
                            .unwrap_or_else(|| "-".to_string()),
                    ),
                    Cell::from(alert.state.symbol()).style(style),
                ])
            })
            .collect();

        let widths = [
            Constraint::Fill(3),    // Item
            Constraint::Fill(1),    // Type
            Constraint::Length(14), // Window
            Constraint::Length(16), // Progress
            Constraint::Length(14), // Remaining
            Constraint::Length(11), // Next due
            Constraint::Length(6),  // State
        ];

        let table = Table::new(rows, widths).header(header).block(alerts_block);
        frame.render_widget(table, chunks[2]);
    }

    // ===== FOOTER =====
    let footer = Paragraph::new(Line::from(vec![Span::styled(
        " Press Esc to close ",
        Style::default().add_modifier(Modifier::DIM),
    )]));
    frame.render_widget(footer, chunks[3]);
}
