//! Map view rendering.
//!
//! Sensors are plotted by longitude/latitude on a canvas scaled to the
//! bounding box of the known locations. The popup of the selected marker is
//! shown in a side panel.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Context},
        Block, Borders, Paragraph, Wrap,
    },
    Frame,
};

use crate::app::App;
use crate::data::SensorId;
use crate::sync::{Marker, MarkerColor};

/// Fraction of the span added on each side of the bounding box.
const PADDING: f64 = 0.15;

/// Smallest span in degrees, so a single sensor is still centered.
const MIN_SPAN: f64 = 0.001;

/// How far (in cells) a click may land from a marker and still hit it.
const CLICK_RADIUS: u16 = 2;

/// Width of the popup side panel.
const POPUP_WIDTH: u16 = 34;

/// Longitude and latitude ranges the canvas covers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapBounds {
    pub x: [f64; 2],
    pub y: [f64; 2],
}

impl MapBounds {
    /// Bounding box of `markers`, padded. `None` when there are no markers.
    pub fn around(markers: &[Marker]) -> Option<Self> {
        let first = markers.first()?;
        let (mut x0, mut x1) = (first.longitude, first.longitude);
        let (mut y0, mut y1) = (first.latitude, first.latitude);
        for m in markers {
            x0 = x0.min(m.longitude);
            x1 = x1.max(m.longitude);
            y0 = y0.min(m.latitude);
            y1 = y1.max(m.latitude);
        }
        let pad_x = ((x1 - x0).max(MIN_SPAN)) * PADDING;
        let pad_y = ((y1 - y0).max(MIN_SPAN)) * PADDING;
        let cx = (x0 + x1) / 2.0;
        let cy = (y0 + y1) / 2.0;
        let half_x = (x1 - x0).max(MIN_SPAN) / 2.0 + pad_x;
        let half_y = (y1 - y0).max(MIN_SPAN) / 2.0 + pad_y;
        Some(Self {
            x: [cx - half_x, cx + half_x],
            y: [cy - half_y, cy + half_y],
        })
    }

    /// Terminal cell for a coordinate inside `inner`.
    pub fn cell(&self, inner: Rect, latitude: f64, longitude: f64) -> (u16, u16) {
        let fx = (longitude - self.x[0]) / (self.x[1] - self.x[0]);
        let fy = (self.y[1] - latitude) / (self.y[1] - self.y[0]);
        let col = (fx.clamp(0.0, 1.0) * f64::from(inner.width.saturating_sub(1))).round() as u16;
        let row = (fy.clamp(0.0, 1.0) * f64::from(inner.height.saturating_sub(1))).round() as u16;
        (inner.x + col, inner.y + row)
    }
}

/// Render the Map view.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::horizontal([Constraint::Fill(1), Constraint::Length(POPUP_WIDTH)])
        .split(area);
    let map_area = chunks[0];
    app.map_area = Some(map_area);

    let block = Block::default()
        .title(" Map ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let markers = app.sync.markers();
    match MapBounds::around(markers) {
        None => {
            let paragraph = Paragraph::new("No sensor locations known").block(block);
            frame.render_widget(paragraph, map_area);
        }
        Some(bounds) => {
            let theme = &app.theme;
            let canvas = Canvas::default()
                .block(block)
                .marker(symbols::Marker::Braille)
                .x_bounds(bounds.x)
                .y_bounds(bounds.y)
                .paint(|ctx: &mut Context| {
                    // Emphasized markers are drawn last so they stay on top.
                    for marker in markers.iter().filter(|m| !m.emphasized) {
                        paint_marker(ctx, marker, theme.marker_color(marker.color), false);
                    }
                    for marker in markers.iter().filter(|m| m.emphasized) {
                        paint_marker(ctx, marker, theme.marker_color(marker.color), true);
                    }
                });
            frame.render_widget(canvas, map_area);
        }
    }

    render_popup(frame, app, chunks[1]);
}

fn paint_marker(ctx: &mut Context, marker: &Marker, color: ratatui::style::Color, emphasized: bool) {
    let (x, y) = (marker.longitude, marker.latitude);
    if emphasized {
        let style = Style::default().fg(color).add_modifier(Modifier::BOLD);
        ctx.print(x, y, Line::from(Span::styled("◉", style)));
        ctx.print(
            x,
            y,
            Line::from(vec![
                Span::raw("  "),
                Span::styled(marker.display_name.clone(), style),
            ]),
        );
    } else {
        ctx.print(x, y, Line::from(Span::styled("●", Style::default().fg(color))));
    }
}

fn render_popup(frame: &mut Frame, app: &App, area: Rect) {
    let selected = app.selection().sensor_id();
    let marker = selected.and_then(|id| app.sync.marker(id));

    let mut lines: Vec<Line> = Vec::new();
    let title = match marker {
        Some(marker) => {
            let color = app.theme.marker_color(marker.color);
            for (i, text) in marker.popup.iter().enumerate() {
                let style = if i == 0 {
                    Style::default().fg(color).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                lines.push(Line::from(Span::styled(text.clone(), style)));
            }
            " Selected ".to_string()
        }
        None => {
            let hint = match selected {
                Some(id) => format!("{} has no map location", app.display_name(id)),
                None => "Click a marker or select a sensor".to_string(),
            };
            lines.push(Line::from(Span::styled(
                hint,
                Style::default().add_modifier(Modifier::DIM),
            )));
            " Sensor ".to_string()
        }
    };

    lines.push(Line::from(""));
    for (color, label) in [
        (MarkerColor::Accent, "Normal"),
        (MarkerColor::Alert, "Attention"),
        (MarkerColor::Neutral, "No data"),
    ] {
        lines.push(Line::from(vec![
            Span::styled(" ● ", Style::default().fg(app.theme.marker_color(color))),
            Span::raw(label),
        ]));
    }

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

/// The marker nearest to a click at (`column`, `row`), if one is close
/// enough. Uses the area recorded by the last render.
pub fn marker_at(app: &App, column: u16, row: u16) -> Option<SensorId> {
    let area = app.map_area?;
    nearest_marker(app.sync.markers(), area, column, row)
}

fn nearest_marker(markers: &[Marker], area: Rect, column: u16, row: u16) -> Option<SensorId> {
    let bounds = MapBounds::around(markers)?;
    let inner = Rect::new(
        area.x + 1,
        area.y + 1,
        area.width.saturating_sub(2),
        area.height.saturating_sub(2),
    );
    if column < inner.x
        || row < inner.y
        || column >= inner.x + inner.width
        || row >= inner.y + inner.height
    {
        return None;
    }

    markers
        .iter()
        .map(|m| {
            let (cx, cy) = bounds.cell(inner, m.latitude, m.longitude);
            let distance = cx.abs_diff(column).max(cy.abs_diff(row));
            (distance, m.sensor_id)
        })
        .filter(|(distance, _)| *distance <= CLICK_RADIUS)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, id)| id)
}
