//! Colors for the dashboard.
//!
//! Alert states get one color each from a [`StatePalette`]; everything that
//! reflects maintenance status (badges, counts, health) is derived from it.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::block::BorderType;

use fleetwatch_types::AlertState;

/// Health at or above this is shown in the OK color.
const HEALTHY_FROM: u8 = 80;
/// Health at or above this (and below healthy) is shown in the upcoming color.
const DEGRADED_FROM: u8 = 50;

/// One color per alert state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatePalette {
    pub current: Color,
    pub upcoming: Color,
    pub overdue: Color,
}

impl StatePalette {
    pub fn color(&self, state: AlertState) -> Color {
        match state {
            AlertState::Current => self.current,
            AlertState::Upcoming => self.upcoming,
            AlertState::Overdue => self.overdue,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Theme {
    /// Titles of overlays and transient status messages.
    pub accent: Color,
    pub border: Color,
    pub states: StatePalette,
    pub header: Style,
    pub selected: Style,
    pub tab_active: Style,
    pub tab_inactive: Style,
    pub border_type: BorderType,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            accent: Color::Cyan,
            border: Color::Gray,
            states: StatePalette {
                current: Color::Green,
                upcoming: Color::Yellow,
                overdue: Color::LightRed,
            },
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    pub fn light() -> Self {
        Self {
            accent: Color::Blue,
            border: Color::DarkGray,
            // Yellow is unreadable on white
            states: StatePalette {
                current: Color::Green,
                upcoming: Color::Magenta,
                overdue: Color::Red,
            },
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Pick a theme for a terminal background luma in `[0, 1]`, if known.
    pub fn for_background(luma: Option<f32>) -> Self {
        match luma {
            Some(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Query the terminal background and pick a theme for it.
    pub fn auto_detect() -> Self {
        Self::for_background(terminal_light::luma().ok())
    }

    /// Text style for something in the given alert state.
    pub fn status_style(&self, state: AlertState) -> Style {
        let style = Style::default().fg(self.states.color(state));
        match state {
            AlertState::Overdue => style.add_modifier(Modifier::BOLD),
            _ => style,
        }
    }

    /// Compact state badge, e.g. ` PROXIMO ` on a yellow background.
    pub fn badge(&self, state: AlertState) -> Span<'static> {
        Span::styled(
            format!(" {} ", state.wire_name()),
            Style::default()
                .fg(Color::Black)
                .bg(self.states.color(state))
                .add_modifier(Modifier::BOLD),
        )
    }

    /// Style for a 0-100 health score, colored like the state it suggests.
    pub fn health_style(&self, percent: u8) -> Style {
        let state = if percent >= HEALTHY_FROM {
            AlertState::Current
        } else if percent >= DEGRADED_FROM {
            AlertState::Upcoming
        } else {
            AlertState::Overdue
        };
        self.status_style(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_background() {
        assert_eq!(Theme::for_background(Some(0.9)).accent, Color::Blue);
        assert_eq!(Theme::for_background(Some(0.1)).accent, Color::Cyan);
        assert_eq!(Theme::for_background(None).accent, Color::Cyan);
    }

    #[test]
    fn test_badge_uses_wire_name_and_state_color() {
        let theme = Theme::dark();
        let badge = theme.badge(AlertState::Upcoming);
        assert_eq!(badge.content, " PROXIMO ");
        assert_eq!(badge.style.bg, Some(Color::Yellow));
    }

    #[test]
    fn test_health_style_bands() {
        let theme = Theme::light();
        assert_eq!(theme.health_style(100).fg, Some(Color::Green));
        assert_eq!(theme.health_style(80).fg, Some(Color::Green));
        assert_eq!(theme.health_style(50).fg, Some(Color::Magenta));
        assert_eq!(theme.health_style(49).fg, Some(Color::Red));
    }
}
