//! Time-series chart rendering for the detail view.
//!
//! Series on the left axis and series on the right axis are drawn in two
//! stacked panes, each with its own y range.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::model::parse_timestamp;
use crate::sync::{ChartInstance, ChartLine};

/// Toggle key for each chartable parameter.
pub const PARAMETER_KEYS: [(char, &str); 5] = [
    ('t', "temperature"),
    ('p', "pressure"),
    ('h', "humidity"),
    ('g', "gas_composition"),
    ('n', "noise_level"),
];

/// Parameter toggled by `key`, if any.
pub fn parameter_for_key(key: char) -> Option<&'static str> {
    PARAMETER_KEYS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, parameter)| *parameter)
}

/// One line showing each parameter's toggle key and whether it is plotted.
pub fn legend(app: &App) -> Line<'static> {
    let mut spans = vec![Span::raw(" ")];
    for (i, (key, parameter)) in PARAMETER_KEYS.iter().enumerate() {
        let name = app.store.get(parameter).display_name.clone();
        let style = if app.is_parameter_visible(parameter) {
            Style::default()
                .fg(app.theme.series_color(i))
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::DIM)
        };
        spans.push(Span::styled(format!("[{}] ", key), app.theme.header));
        spans.push(Span::styled(name, style));
        spans.push(Span::raw("  "));
    }
    Line::from(spans)
}

/// Render a built chart into `area`.
pub fn render(frame: &mut Frame, app: &App, chart: &ChartInstance, area: Rect) {
    let panes: Vec<(&str, &[ChartLine])> = [("left", &chart.left[..]), ("right", &chart.right[..])]
        .into_iter()
        .filter(|(_, lines)| !lines.is_empty())
        .collect();

    let constraints = vec![Constraint::Fill(1); panes.len()];
    let areas = Layout::vertical(constraints).split(area);

    for ((side, lines), pane_area) in panes.into_iter().zip(areas.iter()) {
        render_pane(frame, app, chart, side, lines, *pane_area);
    }
}

fn render_pane(
    frame: &mut Frame,
    app: &App,
    chart: &ChartInstance,
    side: &str,
    lines: &[ChartLine],
    area: Rect,
) {
    let datasets: Vec<Dataset> = lines
        .iter()
        .map(|line| {
            Dataset::default()
                .name(line.label.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(app.theme.series_color(series_index(&line.parameter_key))))
                .data(&line.points)
        })
        .collect();

    let samples = chart.timestamps.len().max(1);
    let x_max = (samples - 1).max(1) as f64;
    let (y_min, y_max) = y_range(lines);

    let units: Vec<&str> = lines
        .iter()
        .map(|l| l.unit.as_str())
        .filter(|u| !u.is_empty())
        .collect();
    let y_title = if units.is_empty() {
        side.to_string()
    } else {
        units.join(", ")
    };

    let widget = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .x_axis(
            Axis::default()
                .style(Style::default().fg(app.theme.border))
                .bounds([0.0, x_max])
                .labels(time_labels(&chart.timestamps)),
        )
        .y_axis(
            Axis::default()
                .title(y_title)
                .style(Style::default().fg(app.theme.border))
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::raw(format!("{:.1}", y_min)),
                    Span::raw(format!("{:.1}", (y_min + y_max) / 2.0)),
                    Span::raw(format!("{:.1}", y_max)),
                ]),
        );

    frame.render_widget(widget, area);
}

/// Placeholder text drawn where the chart would be.
pub fn render_message(frame: &mut Frame, app: &App, message: &str, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));
    let paragraph = Paragraph::new(Line::from(Span::styled(
        message.to_string(),
        Style::default().add_modifier(Modifier::DIM),
    )))
    .block(block);
    frame.render_widget(paragraph, area);
}

fn series_index(parameter_key: &str) -> usize {
    PARAMETER_KEYS
        .iter()
        .position(|(_, p)| *p == parameter_key)
        .unwrap_or(PARAMETER_KEYS.len())
}

/// Shared y range of `lines`, widened so flat lines are still visible.
fn y_range(lines: &[ChartLine]) -> (f64, f64) {
    let bounds = lines
        .iter()
        .filter_map(ChartLine::y_bounds)
        .reduce(|(lo, hi), (l, h)| (lo.min(l), hi.max(h)));
    match bounds {
        Some((lo, hi)) if hi > lo => {
            let pad = (hi - lo) * 0.05;
            (lo - pad, hi + pad)
        }
        Some((v, _)) => (v - 1.0, v + 1.0),
        None => (0.0, 1.0),
    }
}

/// First, middle and last sample times.
fn time_labels(timestamps: &[String]) -> Vec<Span<'static>> {
    if timestamps.is_empty() {
        return Vec::new();
    }
    let short = |raw: &String| match parse_timestamp(raw) {
        Some(ts) => ts.format("%d.%m %H:%M").to_string(),
        None => raw.clone(),
    };
    let last = timestamps.len() - 1;
    let mut labels = vec![Span::raw(short(&timestamps[0]))];
    if last >= 2 {
        labels.push(Span::raw(short(&timestamps[last / 2])));
    }
    if last >= 1 {
        labels.push(Span::raw(short(&timestamps[last])));
    }
    labels
}
