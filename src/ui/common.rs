//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, help overlay,
//! and small display helpers.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use fleetwatch_types::{Alert, AlertState};

use crate::app::{App, View};

/// Render the header bar with fleet statistics for the visible aircraft.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    if app.data.is_none() {
        let line = Line::from(vec![
            Span::styled(" FLEETWATCH ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("| Loading..."),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let stats = app.statistics();

    let overall = if stats.total_critical_alerts > 0 {
        AlertState::Overdue
    } else if stats.total_upcoming_alerts > 0 {
        AlertState::Upcoming
    } else {
        AlertState::Current
    };

    let count_span = |n: u32, state: AlertState| {
        if n > 0 {
            Span::styled(n.to_string(), app.theme.status_style(state))
        } else {
            Span::styled("0", Style::default().add_modifier(Modifier::DIM))
        }
    };

    let mut spans = vec![
        Span::styled(" ● ", app.theme.status_style(overall)),
        Span::styled("FLEETWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(
            stats.total_aircraft.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            " aircraft, {} with issues ({}%) │ ",
            stats.aircraft_with_issues, stats.issue_percent
        )),
        count_span(stats.total_critical_alerts, AlertState::Overdue),
        Span::raw(" overdue "),
        count_span(stats.total_upcoming_alerts, AlertState::Upcoming),
        Span::raw(" upcoming │ health "),
        Span::styled(
            format!("{}%", stats.average_health),
            app.theme.health_style(stats.average_health),
        ),
    ];

    if app.is_loading() {
        spans.push(Span::styled(
            " │ refreshing…",
            Style::default().add_modifier(Modifier::DIM),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the tab bar showing available views.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = vec![Line::from(" 1:Fleet "), Line::from(" 2:Alerts ")];

    let selected = match app.current_view {
        View::Fleet => 0,
        View::Alerts => 1,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows the data source, time since last update and available controls.
/// Errors are shown in place of the controls; stale data stays on screen.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.accent));
        frame.render_widget(paragraph, area);
        return;
    }

    if let Some(ref err) = app.load_error {
        let paragraph = Paragraph::new(format!(" Error: {} | r:retry q:quit", err))
            .style(app.theme.status_style(AlertState::Overdue));
        frame.render_widget(paragraph, area);
        return;
    }

    let status = if let Some(updated) = app.last_updated {
        let controls = if app.filter_active {
            "Type to search | Enter:apply Esc:cancel"
        } else {
            "/:search s:sort a:alerts f:state r:refresh Enter:detail ?:help q:quit"
        };

        format!(
            " {} | {} | Updated {}s ago | {}",
            app.source_description(),
            app.current_view.label(),
            updated.elapsed().as_secs(),
            controls,
        )
    } else {
        " Loading... | q:quit".to_string()
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Navigation",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  Tab 1/2     Switch views"),
        Line::from("  ↑/↓ j/k     Navigate list"),
        Line::from("  PgUp/PgDn   Jump 10 items"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from("  Enter       Aircraft detail"),
        Line::from("  Esc         Go back"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Filtering & Sorting",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  /         Search registration"),
        Line::from("  c         Clear search"),
        Line::from("  a         Only aircraft with alerts"),
        Line::from("  f         Cycle state filter"),
        Line::from("  s         Cycle sort key"),
        Line::from("  S         Reverse sort"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " General",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  r         Refresh now"),
        Line::from("  e         Export to CSV"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.accent));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 28u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}

/// Format flight hours for display (e.g., 5700 -> "5,700", 5700.5 -> "5,700.5").
pub fn format_hours(hours: f64) -> String {
    let rounded = (hours * 10.0).round() / 10.0;
    let whole = rounded.trunc().abs() as u64;
    let digits = whole.to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if rounded < 0.0 { "-" } else { "" };
    let tenths = ((rounded.abs() - whole as f64) * 10.0).round() as u64;
    if tenths == 0 {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, tenths)
    }
}

/// Compact text progress bar for a completion percentage.
pub fn progress_bar(percent: f64, width: usize) -> String {
    let clamped = percent.clamp(0.0, 100.0);
    let filled = ((clamped / 100.0) * width as f64).round() as usize;
    format!(
        "{}{} {:>3}%",
        "█".repeat(filled),
        "░".repeat(width.saturating_sub(filled)),
        clamped.round() as u32
    )
}

/// "300 h left" or "200 h over", depending on the alert state.
pub fn hours_note(alert: &Alert) -> String {
    match (alert.state, alert.relevant_hours()) {
        (AlertState::Overdue, Some(h)) => format!("{} h over", format_hours(h)),
        (_, Some(h)) => format!("{} h left", format_hours(h)),
        (_, None) => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_hours() {
        assert_eq!(format_hours(0.0), "0");
        assert_eq!(format_hours(950.0), "950");
        assert_eq!(format_hours(5700.0), "5,700");
        assert_eq!(format_hours(5700.5), "5,700.5");
        assert_eq!(format_hours(1234567.0), "1,234,567");
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(90.0, 10), "█████████░  90%");
        assert_eq!(progress_bar(150.0, 4), "████ 100%");
        assert_eq!(progress_bar(-5.0, 4), "░░░░   0%");
    }

    #[test]
    fn test_hours_note() {
        let overdue = Alert::builder("A")
            .state(AlertState::Overdue)
            .hours_overdue(200.0)
            .build();
        assert_eq!(hours_note(&overdue), "200 h over");

        let upcoming = Alert::builder("B")
            .state(AlertState::Upcoming)
            .hours_remaining(1500.0)
            .build();
        assert_eq!(hours_note(&upcoming), "1,500 h left");
    }
}
