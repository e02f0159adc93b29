//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::Status;
use crate::sync::MarkerColor;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Color for highlights and active elements.
    pub highlight: Color,
    /// Sensors without a complete reading.
    pub neutral: Color,
    /// Sensors whose parameters are all within range.
    pub accent: Color,
    /// Sensors with at least one parameter out of range.
    pub alert: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for selected/highlighted rows.
    pub selected: Style,
    /// Style for the active tab.
    pub tab_active: Style,
    /// Style for inactive tabs.
    pub tab_inactive: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
    /// Colors cycled through for chart lines.
    pub series: [Color; 5],
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            neutral: Color::Gray,
            accent: Color::Green,
            alert: Color::Red,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
            series: [
                Color::Cyan,
                Color::LightBlue,
                Color::LightGreen,
                Color::Magenta,
                Color::Yellow,
            ],
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            neutral: Color::DarkGray,
            accent: Color::Green,
            alert: Color::Red,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
            series: [
                Color::Blue,
                Color::Cyan,
                Color::Green,
                Color::Magenta,
                Color::DarkGray,
            ],
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    pub fn marker_color(&self, color: MarkerColor) -> Color {
        match color {
            MarkerColor::Neutral => self.neutral,
            MarkerColor::Accent => self.accent,
            MarkerColor::Alert => self.alert,
        }
    }

    /// Get style for a sensor status
    pub fn status_style(&self, status: Status) -> Style {
        match status {
            Status::NoData => Style::default().fg(self.neutral),
            Status::Normal => Style::default().fg(self.accent),
            Status::Warning => Style::default().fg(self.alert).add_modifier(Modifier::BOLD),
        }
    }

    /// Border color of a metric card.
    pub fn card_style(&self, normal: bool) -> Style {
        if normal {
            Style::default().fg(self.accent)
        } else {
            Style::default().fg(self.alert)
        }
    }

    pub fn series_color(&self, index: usize) -> Color {
        self.series[index % self.series.len()]
    }
}
