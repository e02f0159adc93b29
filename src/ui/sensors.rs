//! Sensors view rendering.
//!
//! Displays a table of all sensors with their status, latest parameter
//! values and a temperature trend sparkline.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::{SensorId, Status, StatusEvaluator};

/// Sparkline characters (8 levels of height).
const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Parameter whose history drives the trend column.
const TREND_PARAMETER: &str = "temperature";

/// Render the Sensors view.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    app.table_area = Some(area);

    let evaluator = StatusEvaluator::new(&app.store);
    let selected = app.selection().sensor_id();
    let sensors = app.sensor_rows();

    let mut header_cells = vec![Cell::from(""), Cell::from("Sensor"), Cell::from("Status")];
    header_cells.extend(app.store.parameters().iter().map(|p| {
        let title = if p.unit.is_empty() {
            p.display_name.clone()
        } else {
            format!("{} ({})", p.display_name, p.unit)
        };
        Cell::from(title)
    }));
    header_cells.push(Cell::from("Trend"));
    header_cells.push(Cell::from("Updated"));
    let header = Row::new(header_cells).height(1).style(app.theme.header);

    let rows: Vec<Row> = sensors
        .iter()
        .map(|&sensor_id| {
            let status = app.latest.get(&sensor_id);
            let status_kind = status.map_or(Status::NoData, |s| s.status);

            let mut cells = vec![
                Cell::from(if selected == Some(sensor_id) { "●" } else { " " })
                    .style(Style::default().fg(app.theme.highlight)),
                Cell::from(app.display_name(sensor_id)),
                Cell::from(status_kind.label()).style(app.theme.status_style(status_kind)),
            ];

            for cfg in app.store.parameters() {
                let value = status.and_then(|s| s.reading.value(&cfg.key));
                cells.push(match value {
                    Some(v) => {
                        let style = if evaluator.is_parameter_normal(&cfg.key, v) {
                            Style::default()
                        } else {
                            Style::default().fg(app.theme.alert).add_modifier(Modifier::BOLD)
                        };
                        Cell::from(format!("{:.1}", v)).style(style)
                    }
                    None => Cell::from("-").style(Style::default().add_modifier(Modifier::DIM)),
                });
            }

            cells.push(Cell::from(render_sparkline(
                &app.history.sparkline(sensor_id, TREND_PARAMETER),
            )));
            cells.push(Cell::from(
                status
                    .and_then(|s| s.reading.timestamp)
                    .map(|ts| ts.format("%H:%M:%S").to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ));

            Row::new(cells)
        })
        .collect();

    let mut widths = vec![
        Constraint::Length(1),
        Constraint::Fill(3),
        Constraint::Min(9),
    ];
    widths.extend(app.store.parameters().iter().map(|_| Constraint::Fill(1)));
    widths.push(Constraint::Min(8));
    widths.push(Constraint::Min(8));

    let selected_index = app.selected_index.min(sensors.len().saturating_sub(1));
    let title = format!(
        " Sensors ({}) [{}/{}] ",
        sensors.len(),
        selected_index + 1,
        sensors.len()
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
    state.select(Some(selected_index));

    frame.render_stateful_widget(table, area, &mut state);
    app.table_offset = state.offset();
}

/// Map a click inside the table to a sensor.
pub fn sensor_at(app: &App, column: u16, row: u16) -> Option<SensorId> {
    let area = app.table_area?;
    let index = row_index(area, app.table_offset, column, row)?;
    app.sensor_rows().get(index).copied()
}

/// Row index under (`column`, `row`), counting from the first sensor.
///
/// Rows sit between the header (below the top border) and the bottom border.
fn row_index(area: Rect, offset: usize, column: u16, row: u16) -> Option<usize> {
    let first_row = area.y + 2;
    let bottom_border = (area.y + area.height).saturating_sub(1);
    if column <= area.x
        || column + 1 >= area.x + area.width
        || row < first_row
        || row >= bottom_border
    {
        return None;
    }
    Some(offset + usize::from(row - first_row))
}

fn render_sparkline(data: &[u8]) -> String {
    if data.is_empty() {
        return "        ".to_string(); // 8 spaces placeholder
    }

    // Take last 8 values
    let values: Vec<u8> = data.iter().rev().take(8).rev().copied().collect();

    values.iter().map(|&v| SPARKLINE_CHARS[v.min(7) as usize]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_index_skips_header_and_borders() {
        let area = Rect::new(0, 2, 80, 10);

        assert_eq!(row_index(area, 0, 10, 4), Some(0));
        assert_eq!(row_index(area, 0, 10, 10), Some(6));
        assert_eq!(row_index(area, 0, 10, 3), None);
        assert_eq!(row_index(area, 0, 10, 11), None);
        assert_eq!(row_index(area, 0, 0, 5), None);
    }

    #[test]
    fn test_row_index_adds_scroll_offset() {
        let area = Rect::new(0, 2, 80, 10);
        assert_eq!(row_index(area, 4, 10, 4), Some(4));
        assert_eq!(row_index(area, 4, 10, 10), Some(10));
    }

    #[test]
    fn test_render_sparkline_keeps_last_eight() {
        let data: Vec<u8> = (0..10).map(|v| v % 8).collect();
        assert_eq!(render_sparkline(&data), "▃▄▅▆▇█▁▂");
        assert_eq!(render_sparkline(&[]), "        ");
    }
}
