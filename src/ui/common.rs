//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, help overlay
//! and the admin confirmation dialog.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::app::{App, View};
use crate::data::Status;

/// Render the header bar with the sensor status overview.
///
/// Displays: overall indicator, sensor counts by status, system counters.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    if app.latest.is_empty() {
        let mut spans = vec![
            Span::styled(" SENSORWATCH ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("| Loading..."),
        ];
        if app.store.is_degraded() {
            spans.push(Span::styled(
                " (built-in config)",
                Style::default().fg(app.theme.alert),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
        return;
    }

    let mut normal = 0;
    let mut warning = 0;
    let mut no_data = 0;
    for status in app.latest.values() {
        match status.status {
            Status::Normal => normal += 1,
            Status::Warning => warning += 1,
            Status::NoData => no_data += 1,
        }
    }

    let overall = if warning > 0 {
        Status::Warning
    } else if normal > 0 {
        Status::Normal
    } else {
        Status::NoData
    };

    let mut spans = vec![
        Span::styled(" ● ", app.theme.status_style(overall)),
        Span::styled("SENSORWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(format!("{}", normal), Style::default().fg(app.theme.accent)),
        Span::raw(" ok "),
        if warning > 0 {
            Span::styled(
                format!("{}", warning),
                Style::default().fg(app.theme.alert).add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled("0", Style::default().add_modifier(Modifier::DIM))
        },
        Span::raw(" attention "),
        Span::styled(format!("{}", no_data), Style::default().fg(app.theme.neutral)),
        Span::raw(" no data │ "),
    ];

    match app.system_stats {
        Some(stats) => spans.push(Span::raw(format!(
            "{} active │ {} records",
            stats.active_sensors,
            format_count(stats.total_records)
        ))),
        None => spans.push(Span::styled("system stats n/a", Style::default().add_modifier(Modifier::DIM))),
    }

    if app.store.is_degraded() {
        spans.push(Span::styled(
            " │ built-in config",
            Style::default().fg(app.theme.alert),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Format a count for display (e.g., 1234 -> "1.2K", 1234567 -> "1.2M").
pub fn format_count(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Render the tab bar showing available views.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = vec![
        Line::from(" 1:Map "),
        Line::from(" 2:Sensors "),
        Line::from(" 3:Detail "),
    ];

    let selected = match app.current_view {
        View::Map => 0,
        View::Sensors => 1,
        View::Detail => 2,
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
/// Shows: selected sensor, last update time, available controls.
/// Also displays temporary status messages and errors.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let selected = match app.selection().sensor_id() {
        Some(id) => app.display_name(id),
        None => "no sensor selected".to_string(),
    };

    let controls = match app.current_view {
        View::Map | View::Sensors => "↑↓:move Enter:select L:live Tab:switch ?:help q:quit",
        View::Detail => "t/p/h/g/n:chart params r:refresh Tab:switch ?:help q:quit",
    };

    let status = if let Some(ref err) = app.load_error {
        format!(" {} | Error: {} | r:retry q:quit", selected, err)
    } else if let Some(updated) = app.last_update {
        format!(
            " {} | Updated {} | {}",
            selected,
            updated.format("%H:%M:%S"),
            controls
        )
    } else {
        format!(" {} | Loading... | q:quit", app.source_description())
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )])
    };

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Navigation"),
        Line::from("  Tab / 1-3   Switch views"),
        Line::from("  ↑/↓ j/k     Move in sensor list"),
        Line::from("  Enter       Select sensor"),
        Line::from("  L           Select live sensor"),
        Line::from("  Click       Select row or marker"),
        Line::from(""),
        section(" Chart"),
        Line::from("  t p h g n   Toggle temperature, pressure,"),
        Line::from("              humidity, CO₂, noise"),
        Line::from(""),
        section(" Data"),
        Line::from("  G           Generate test data"),
        Line::from("  X           Clear all data"),
        Line::from("  R           Clear live sensor data"),
        Line::from(""),
        section(" General"),
        Line::from("  r           Refresh now"),
        Line::from("  e           Export to JSON"),
        Line::from("  q           Quit"),
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
        .border_style(Style::default().fg(app.theme.highlight));

    let help_area = centered_rect(area, 46, 28);
    frame.render_widget(Clear, help_area);
    frame.render_widget(Paragraph::new(help_text).block(block), help_area);
}

/// Render the confirmation dialog for a pending admin action.
pub fn render_confirm(frame: &mut Frame, app: &App, area: Rect) {
    let Some(action) = app.pending_admin else {
        return;
    };

    let text = vec![
        Line::from(action.confirmation_prompt()),
        Line::from(""),
        Line::from(vec![
            Span::styled("y", Style::default().fg(app.theme.alert).add_modifier(Modifier::BOLD)),
            Span::raw(": confirm   "),
            Span::styled("any other key", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(": cancel"),
        ]),
    ];

    let block = Block::default()
        .title(format!(" {} ", action))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.alert));

    let dialog = centered_rect(area, 56, 7);
    frame.render_widget(Clear, dialog);
    frame.render_widget(
        Paragraph::new(text).block(block).wrap(Wrap { trim: true }),
        dialog,
    );
}

/// A `width` x `height` rectangle centered in `area`, shrunk to fit.
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_234), "1.2K");
        assert_eq!(format_count(2_500_000), "2.5M");
    }

    #[test]
    fn test_centered_rect_fits() {
        let area = Rect::new(0, 0, 40, 10);
        let rect = centered_rect(area, 56, 7);
        assert!(rect.width <= 36);
        assert_eq!(rect.height, 7);
        assert_eq!(rect.y, 1);
    }
}
