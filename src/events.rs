use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::api::AdminAction;
use crate::app::{App, View};
use crate::data::SensorId;
use crate::ui::{chart, map, sensors};

/// File written by the `e` key.
const EXPORT_FILE: &str = "sensorwatch_export.json";

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // A pending admin action only runs on an explicit `y`
    if app.pending_admin.is_some() {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_admin(),
            _ => app.cancel_admin(),
        }
        return;
    }

    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        // View switching
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_view();
            } else {
                app.next_view();
            }
        }
        KeyCode::BackTab => app.prev_view(),
        KeyCode::Char('1') => app.set_view(View::Map),
        KeyCode::Char('2') => app.set_view(View::Sensors),
        KeyCode::Char('3') => app.set_view(View::Detail),

        // Navigation
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        // Selection
        KeyCode::Enter => {
            app.select_current();
            app.set_view(View::Detail);
        }
        KeyCode::Char('L') => {
            app.select(SensorId::Live);
            app.set_view(View::Detail);
        }

        // Chart parameters
        KeyCode::Char(c) if chart::parameter_for_key(c).is_some() => {
            if let Some(parameter) = chart::parameter_for_key(c) {
                app.toggle_parameter(parameter);
            }
        }

        // Admin actions
        KeyCode::Char('G') => app.request_admin(app.generate_action()),
        KeyCode::Char('X') => app.request_admin(AdminAction::ClearData),
        KeyCode::Char('R') => app.request_admin(AdminAction::ClearLiveData),

        KeyCode::Char('r') => {
            app.refresh();
            app.set_status_message("Refreshing...".to_string());
        }

        KeyCode::Char('?') => app.toggle_help(),

        KeyCode::Char('e') => {
            let export_path = PathBuf::from(EXPORT_FILE);
            match app.export_state(&export_path) {
                Ok(()) => {
                    app.set_status_message(format!("Exported to {}", export_path.display()));
                }
                Err(e) => {
                    app.set_status_message(format!("Export failed: {}", e));
                }
            }
        }

        _ => {}
    }
}

/// Handle mouse events
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    if app.pending_admin.is_some() || app.show_help {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollUp => app.select_prev(),
        MouseEventKind::ScrollDown => app.select_next(),

        MouseEventKind::Down(MouseButton::Left) => {
            // Tabs sit on the second row: " 1:Map | 2:Sensors | 3:Detail "
            if mouse.row == 1 {
                match mouse.column {
                    0..=7 => app.set_view(View::Map),
                    8..=19 => app.set_view(View::Sensors),
                    20..=30 => app.set_view(View::Detail),
                    _ => {}
                }
                return;
            }

            let clicked = match app.current_view {
                View::Map => map::marker_at(app, mouse.column, mouse.row),
                View::Sensors => sensors::sensor_at(app, mouse.column, mouse.row),
                View::Detail => None,
            };
            if let Some(sensor_id) = clicked {
                app.select(sensor_id);
            }
        }

        _ => {}
    }
}
