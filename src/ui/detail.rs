//! Detail view rendering.
//!
//! Shows the selected sensor: a header line, one card per parameter of the
//! latest reading, the history chart and the statistics block.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::{SensorId, SensorStats, Status};
use crate::sync::{ChartPanel, MetricCard, StatsPanel};

use super::chart;
use super::common::format_count;

/// Height of the metric card row (borders + two lines).
const CARD_HEIGHT: u16 = 4;
/// Height of the statistics block.
const STATS_HEIGHT: u16 = 6;

/// Render the Detail view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(sensor_id) = app.selection().sensor_id() else {
        let block = Block::default()
            .title(" Detail ")
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border));
        let paragraph = Paragraph::new("Select a sensor in the Map or Sensors view (Enter)")
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(CARD_HEIGHT),
        Constraint::Min(8),
        Constraint::Length(STATS_HEIGHT),
    ])
    .split(area);

    render_header(frame, app, sensor_id, chunks[0]);
    render_cards(frame, app, sensor_id, chunks[1]);
    render_chart_area(frame, app, chunks[2]);
    render_stats(frame, app, chunks[3]);
}

fn render_header(frame: &mut Frame, app: &App, sensor_id: SensorId, area: Rect) {
    let status = app
        .latest
        .get(&sensor_id)
        .map_or(Status::NoData, |s| s.status);

    let mut spans = vec![
        Span::styled(
            format!(" {} ", app.display_name(sensor_id)),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("│ "),
        Span::styled(
            format!("{} {}", status.symbol(), status.label()),
            app.theme.status_style(status),
        ),
        Span::raw(" │ "),
        Span::raw(match app.sync.cards_updated() {
            Some(ts) => format!("Reading {}", ts),
            None => "No reading".to_string(),
        }),
    ];
    if sensor_id.is_live() {
        spans.push(Span::raw(" │ "));
        spans.push(if app.live_polling() {
            Span::styled("live polling", Style::default().fg(app.theme.accent))
        } else {
            Span::styled("live polling stopped", Style::default().fg(app.theme.alert))
        });
    }

    let block = Block::default()
        .title(" Sensor ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_cards(frame: &mut Frame, app: &App, sensor_id: SensorId, area: Rect) {
    let cards = app.sync.cards();
    if cards.is_empty() {
        let paragraph = Paragraph::new(" No values in the latest reading")
            .style(Style::default().add_modifier(Modifier::DIM));
        frame.render_widget(paragraph, area);
        return;
    }

    let areas = Layout::horizontal(vec![Constraint::Fill(1); cards.len()]).split(area);
    for (card, card_area) in cards.iter().zip(areas.iter()) {
        render_card(frame, app, sensor_id, card, *card_area);
    }
}

fn render_card(frame: &mut Frame, app: &App, sensor_id: SensorId, card: &MetricCard, area: Rect) {
    let style = app.theme.card_style(card.normal);

    let mut value = vec![Span::styled(
        card.value_text(),
        style.add_modifier(Modifier::BOLD),
    )];
    if let Some(delta) = app.history.delta(sensor_id, &card.parameter_key) {
        let arrow = if delta > 0.0 {
            "▲"
        } else if delta < 0.0 {
            "▼"
        } else {
            "="
        };
        value.push(Span::styled(
            format!(" {}", arrow),
            Style::default().add_modifier(Modifier::DIM),
        ));
    }

    let lines = vec![
        Line::from(value),
        Line::from(Span::styled(
            format!("norm {}", card.range_label),
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];

    let block = Block::default()
        .title(format!(" {} ", card.display_name))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(style);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_chart_area(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([Constraint::Length(1), Constraint::Min(3)]).split(area);

    let hours = app.settings().history_hours;
    let mut spans = vec![Span::styled(format!(" History ({}h) ", hours), app.theme.header)];
    spans.extend(chart::legend(app).spans);
    frame.render_widget(Paragraph::new(Line::from(spans)), chunks[0]);

    match app.sync.chart() {
        ChartPanel::Chart(instance) => chart::render(frame, app, instance, chunks[1]),
        panel => chart::render_message(frame, app, &chart_message(panel), chunks[1]),
    }
}

fn chart_message(panel: &ChartPanel) -> String {
    match panel {
        ChartPanel::Empty => "No sensor selected".to_string(),
        ChartPanel::Loading => "Loading history...".to_string(),
        ChartPanel::Prompt => "Select parameters to display (t p h g n)".to_string(),
        ChartPanel::NoData => "No data for this period".to_string(),
        ChartPanel::Disabled => "Charts are not available for the live sensor".to_string(),
        ChartPanel::Unavailable(reason) => format!("History unavailable: {}", reason),
        ChartPanel::Chart(_) => String::new(),
    }
}

fn render_stats(frame: &mut Frame, app: &App, area: Rect) {
    let dim = Style::default().add_modifier(Modifier::DIM);
    let lines = match app.sync.stats() {
        StatsPanel::Empty => vec![Line::from(Span::styled("No sensor selected", dim))],
        StatsPanel::Loading => vec![Line::from(Span::styled("Loading statistics...", dim))],
        StatsPanel::Disabled => vec![Line::from(Span::styled(
            "Statistics are not available for the live sensor",
            dim,
        ))],
        StatsPanel::Unavailable(reason) => vec![Line::from(Span::styled(
            format!("Statistics unavailable: {}", reason),
            Style::default().fg(app.theme.alert),
        ))],
        StatsPanel::Stats(stats) => stats_lines(app, stats),
    };

    let block = Block::default()
        .title(" Statistics ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn stats_lines(app: &App, stats: &SensorStats) -> Vec<Line<'static>> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let when = |ts: Option<chrono::NaiveDateTime>| {
        ts.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string())
    };

    let mut averages = vec![Span::raw(" Averages: ")];
    if stats.averages.is_empty() {
        averages.push(Span::raw("-"));
    }
    for cfg in app.store.parameters() {
        if let Some(avg) = stats.averages.get(&cfg.key) {
            averages.push(Span::raw(format!("{} ", cfg.display_name)));
            averages.push(Span::styled(format!("{:.1}{}  ", avg, unit_suffix(&cfg.unit)), bold));
        }
    }

    vec![
        Line::from(vec![
            Span::raw(" Records: "),
            Span::styled(format_count(stats.total_records), bold),
        ]),
        Line::from(vec![
            Span::raw(" First: "),
            Span::styled(when(stats.first_record), bold),
            Span::raw("   Last: "),
            Span::styled(when(stats.last_record), bold),
        ]),
        Line::from(averages),
    ]
}

fn unit_suffix(unit: &str) -> String {
    if unit.is_empty() {
        String::new()
    } else {
        format!(" {}", unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_messages() {
        assert_eq!(chart_message(&ChartPanel::NoData), "No data for this period");
        assert_eq!(
            chart_message(&ChartPanel::Unavailable("timeout".to_string())),
            "History unavailable: timeout"
        );
        assert!(chart_message(&ChartPanel::Prompt).contains("t p h g n"));
    }

    #[test]
    fn test_unit_suffix() {
        assert_eq!(unit_suffix(""), "");
        assert_eq!(unit_suffix("dB"), " dB");
    }
}
