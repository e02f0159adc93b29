//! Application state and the selection state machine.
//!
//! [`App`] owns every piece of dashboard state. It is mutated only on the UI
//! thread: by user input (`select`, toggles, admin confirmation) and by
//! [`App::on_poll_event`] when a background request completes.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDateTime};
use ratatui::layout::Rect;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::api::{AdminAction, AdminOutcome};
use crate::config::DashboardConfig;
use crate::data::{
    ConfigStore, Reading, ReadingHistory, SensorHistory, SensorId, SensorStatus, StatusEvaluator,
    SystemStats,
};
use crate::error::DashboardError;
use crate::export::ExportReport;
use crate::poll::{PollEvent, Poller, Resource, StaleGuard};
use crate::sync::ViewSync;
use crate::ui::Theme;

/// How long a status message stays in the status bar.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// The current view/tab in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Sensor markers placed by latitude/longitude.
    Map,
    /// Table of sensors with their latest values and trends.
    Sensors,
    /// Metric cards, chart and statistics of the selected sensor.
    Detail,
}

impl View {
    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Map => View::Sensors,
            View::Sensors => View::Detail,
            View::Detail => View::Map,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        match self {
            View::Map => View::Detail,
            View::Sensors => View::Map,
            View::Detail => View::Sensors,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Map => "Map",
            View::Sensors => "Sensors",
            View::Detail => "Detail",
        }
    }
}

/// Which sensor the detail panel belongs to. There is no way back to
/// `Unselected` once a sensor has been chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Unselected,
    SelectedHistorical(u32),
    SelectedLive,
}

impl Selection {
    pub fn sensor_id(&self) -> Option<SensorId> {
        match self {
            Selection::Unselected => None,
            Selection::SelectedHistorical(id) => Some(SensorId::Historical(*id)),
            Selection::SelectedLive => Some(SensorId::Live),
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,

    pub store: ConfigStore,
    pub sync: ViewSync,
    selection: Selection,

    /// Evaluated status of every sensor, from the newest applied poll.
    pub latest: BTreeMap<SensorId, SensorStatus>,
    pub history: ReadingHistory,
    detail_history: Option<SensorHistory>,
    pub visible_parameters: BTreeSet<String>,
    pub system_stats: Option<SystemStats>,
    pub last_update: Option<NaiveDateTime>,
    pub load_error: Option<String>,

    // Navigation state
    pub selected_index: usize,
    pub map_area: Option<Rect>,
    pub table_area: Option<Rect>,
    /// First sensor row visible in the table at the last render.
    pub table_offset: usize,

    // Admin actions
    pub pending_admin: Option<AdminAction>,
    pub running_admin: Option<AdminAction>,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,

    settings: DashboardConfig,
    poller: Poller,
    events: mpsc::Receiver<PollEvent>,
    guard: StaleGuard,
}

impl App {
    /// Create the app around a loaded configuration store and a poller.
    ///
    /// All parameters start visible in the chart. Nothing is polled until
    /// [`App::start`] is called.
    pub fn new(
        store: ConfigStore,
        poller: Poller,
        events: mpsc::Receiver<PollEvent>,
        settings: DashboardConfig,
        theme: Theme,
    ) -> Self {
        let visible_parameters = store.parameter_keys().map(str::to_string).collect();
        Self {
            running: true,
            current_view: View::Map,
            show_help: false,
            sync: ViewSync::new(&store),
            store,
            selection: Selection::Unselected,
            latest: BTreeMap::new(),
            history: ReadingHistory::new(),
            detail_history: None,
            visible_parameters,
            system_stats: None,
            last_update: None,
            load_error: None,
            selected_index: 0,
            map_area: None,
            table_area: None,
            table_offset: 0,
            pending_admin: None,
            running_admin: None,
            theme,
            status_message: None,
            settings,
            poller,
            events,
            guard: StaleGuard::new(),
        }
    }

    /// Start the periodic poll. The first poll is issued immediately.
    pub fn start(&mut self) {
        self.poller.start_periodic(self.settings.poll_interval);
    }

    /// Returns a description of the backend.
    pub fn source_description(&self) -> &str {
        self.poller.backend().description()
    }

    pub fn settings(&self) -> &DashboardConfig {
        &self.settings
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn live_polling(&self) -> bool {
        self.poller.live_running()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < STATUS_MESSAGE_TTL {
                return Some(msg);
            }
        }
        None
    }

    /// Sensors in table order: every known location, then the live sensor.
    pub fn sensor_rows(&self) -> Vec<SensorId> {
        let mut rows: Vec<SensorId> = self.store.locations().iter().map(|l| l.sensor_id).collect();
        if !rows.contains(&SensorId::Live) {
            rows.push(SensorId::Live);
        }
        rows
    }

    pub fn display_name(&self, sensor_id: SensorId) -> String {
        self.store
            .location(sensor_id)
            .map(|l| l.display_name.clone())
            .unwrap_or_else(|| sensor_id.to_string())
    }

    /// Select a sensor for the detail panel.
    pub fn select(&mut self, sensor_id: SensorId) {
        info!(sensor = %sensor_id, "Selecting sensor");
        self.detail_history = None;

        match sensor_id {
            SensorId::Live => {
                self.selection = Selection::SelectedLive;
                self.sync.disable_detail();
                self.apply_cards_from_latest(sensor_id);
                self.poller.start_live(self.settings.live_poll_interval);
            }
            SensorId::Historical(id) => {
                self.poller.stop_live();
                self.selection = Selection::SelectedHistorical(id);
                self.apply_cards_from_latest(sensor_id);
                self.sync.show_chart_loading();
                self.sync.show_stats_loading();
                self.poller.fetch_sensor_detail(sensor_id);
            }
        }

        self.sync.refresh_emphasis(Some(sensor_id));
        if let Some(index) = self.sensor_rows().iter().position(|id| *id == sensor_id) {
            self.selected_index = index;
        }
    }

    /// Select the sensor under the table cursor.
    pub fn select_current(&mut self) {
        if let Some(sensor_id) = self.sensor_rows().get(self.selected_index).copied() {
            self.select(sensor_id);
        }
    }

    fn apply_cards_from_latest(&mut self, sensor_id: SensorId) {
        match self.latest.get(&sensor_id) {
            Some(status) => self.sync.apply_metric_cards(&self.store, &status.reading),
            None => self.sync.clear_metric_cards(),
        }
    }

    /// Apply every completed request waiting in the channel.
    ///
    /// Returns the number of events processed.
    pub fn drain_events(&mut self) -> usize {
        let mut count = 0;
        while let Ok(event) = self.events.try_recv() {
            self.on_poll_event(event);
            count += 1;
        }
        count
    }

    /// Apply one completed request.
    pub fn on_poll_event(&mut self, event: PollEvent) {
        match event {
            PollEvent::Latest { token, result } => {
                if !self.guard.accept(Resource::Latest, token) {
                    warn!(token = token.value(), "Dropping stale latest readings");
                    return;
                }
                match result {
                    Ok(readings) => self.apply_latest(readings),
                    Err(e) => {
                        warn!(error = %e, "Latest readings unavailable");
                        self.load_error = Some(e.to_string());
                    }
                }
            }
            PollEvent::Live { token, result } => {
                if self.selection != Selection::SelectedLive {
                    debug!(token = token.value(), "Dropping live reading, selection changed");
                    return;
                }
                if !self.guard.accept(Resource::Live, token) {
                    warn!(token = token.value(), "Dropping stale live reading");
                    return;
                }
                match result {
                    Ok(reading) => self.apply_live(reading),
                    Err(e) => {
                        warn!(error = %e, "Live reading unavailable");
                        self.set_status_message(format!("Live sensor: {}", e));
                    }
                }
            }
            PollEvent::History {
                token,
                sensor_id,
                result,
            } => {
                if self.selection.sensor_id() != Some(sensor_id) {
                    debug!(sensor = %sensor_id, "Dropping history, selection changed");
                    return;
                }
                if !self.guard.accept(Resource::History, token) {
                    warn!(token = token.value(), "Dropping stale history");
                    return;
                }
                match result {
                    Ok(history) => {
                        self.sync
                            .apply_chart(&self.store, &history, &self.visible_parameters);
                        self.detail_history = Some(history);
                    }
                    Err(e) => {
                        warn!(sensor = %sensor_id, error = %e, "History unavailable");
                        self.sync.show_chart_unavailable(&e);
                    }
                }
            }
            PollEvent::Stats {
                token,
                sensor_id,
                result,
            } => {
                if self.selection.sensor_id() != Some(sensor_id) {
                    debug!(sensor = %sensor_id, "Dropping stats, selection changed");
                    return;
                }
                if !self.guard.accept(Resource::Stats, token) {
                    warn!(token = token.value(), "Dropping stale stats");
                    return;
                }
                if let Err(e) = &result {
                    warn!(sensor = %sensor_id, error = %e, "Stats unavailable");
                }
                self.sync.apply_stats(result);
            }
            PollEvent::SystemStats { token, result } => {
                if !self.guard.accept(Resource::SystemStats, token) {
                    return;
                }
                match result {
                    Ok(stats) => self.system_stats = Some(stats),
                    Err(e) => warn!(error = %e, "System stats unavailable"),
                }
            }
            PollEvent::Admin { action, result } => self.on_admin_result(action, result),
        }
    }

    /// Evaluate every historical sensor against the newest poll.
    ///
    /// Sensors missing from the poll are evaluated from an empty reading,
    /// so they show no data instead of an outdated status.
    fn apply_latest(&mut self, readings: Vec<Reading>) {
        let mut by_sensor: BTreeMap<SensorId, Reading> = BTreeMap::new();
        for reading in readings {
            if reading.sensor_id.is_live() {
                // The live marker is fed by the live poll only.
                continue;
            }
            by_sensor.insert(reading.sensor_id, reading);
        }
        for location in self.store.locations() {
            if !location.sensor_id.is_live() {
                by_sensor
                    .entry(location.sensor_id)
                    .or_insert_with(|| Reading::new(location.sensor_id));
            }
        }

        let evaluator = StatusEvaluator::new(&self.store);
        let selection = self.selection.sensor_id();
        for (sensor_id, reading) in by_sensor {
            let status = evaluator.evaluate(reading);
            self.history.record(&status.reading);
            self.sync.apply_marker_status(&self.store, &status, selection);
            self.latest.insert(sensor_id, status);
        }

        if let Selection::SelectedHistorical(id) = self.selection {
            self.apply_cards_from_latest(SensorId::Historical(id));
        }

        self.last_update = Some(Local::now().naive_local());
        self.load_error = None;
        debug!(sensors = self.latest.len(), "Applied latest readings");
    }

    fn apply_live(&mut self, reading: Reading) {
        let status = StatusEvaluator::new(&self.store).evaluate(reading);
        self.history.record(&status.reading);
        self.sync
            .apply_marker_status(&self.store, &status, self.selection.sensor_id());
        self.sync.apply_metric_cards(&self.store, &status.reading);
        self.latest.insert(SensorId::Live, status);
    }

    /// Re-issue every request the current state depends on.
    pub fn refresh(&mut self) {
        self.poller.fetch_system_stats();
        self.poller.fetch_latest();
        match self.selection {
            Selection::SelectedHistorical(id) => {
                self.poller.fetch_sensor_detail(SensorId::Historical(id))
            }
            Selection::SelectedLive => self.poller.fetch_live(),
            Selection::Unselected => {}
        }
    }

    /// Show or hide a parameter in the chart and redraw it.
    pub fn toggle_parameter(&mut self, parameter_key: &str) {
        if !self.store.is_known(parameter_key) {
            return;
        }
        if !self.visible_parameters.remove(parameter_key) {
            self.visible_parameters.insert(parameter_key.to_string());
        }
        if let Some(history) = &self.detail_history {
            self.sync
                .apply_chart(&self.store, history, &self.visible_parameters);
        }
    }

    pub fn is_parameter_visible(&self, parameter_key: &str) -> bool {
        self.visible_parameters.contains(parameter_key)
    }

    /// Ask for confirmation before running an admin action.
    pub fn request_admin(&mut self, action: AdminAction) {
        if self.running_admin.is_some() {
            self.set_status_message("Another admin action is still running".to_string());
            return;
        }
        self.pending_admin = Some(action);
    }

    pub fn confirm_admin(&mut self) {
        if let Some(action) = self.pending_admin.take() {
            self.set_status_message(format!("{}...", action));
            self.running_admin = Some(action);
            self.poller.run_admin(action);
        }
    }

    pub fn cancel_admin(&mut self) {
        self.pending_admin = None;
    }

    /// Shortcut for the configured test-data generation.
    pub fn generate_action(&self) -> AdminAction {
        AdminAction::GenerateTestData {
            days: self.settings.generate_days,
        }
    }

    fn on_admin_result(&mut self, action: AdminAction, result: Result<AdminOutcome, DashboardError>) {
        self.running_admin = None;
        match result {
            Ok(outcome) => {
                info!(%action, ?outcome, "Admin action finished");
                let message = match (action, outcome.records) {
                    (AdminAction::GenerateTestData { .. }, Some(records)) => {
                        format!("Generated {} records", records)
                    }
                    _ => format!("{}: done", action),
                };
                self.set_status_message(message);
                self.refresh();
            }
            Err(e) => {
                error!(%action, error = %e, "Admin action failed");
                self.set_status_message(format!("{} failed: {}", action, e));
            }
        }
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        let max = self.sensor_rows().len().saturating_sub(1);
        self.selected_index = (self.selected_index + 1).min(max);
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub fn select_first(&mut self) {
        self.selected_index = 0;
    }

    pub fn select_last(&mut self) {
        self.selected_index = self.sensor_rows().len().saturating_sub(1);
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
        self.poller.shutdown();
    }

    /// Export the evaluated state to a file.
    pub fn export_state(&self, path: &Path) -> anyhow::Result<()> {
        if self.latest.is_empty() {
            anyhow::bail!("No data to export");
        }
        ExportReport::build(
            &self.store,
            self.latest.values(),
            self.system_stats,
            self.source_description(),
        )
        .write_to(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use tokio::runtime::Handle;

    use crate::api::testing::ScriptedBackend;
    use crate::data::{Axis, Series, Status};
    use crate::sync::{ChartPanel, MarkerColor, StatsPanel};

    fn complete(id: u32, temperature: f64) -> Reading {
        Reading::new(SensorId::Historical(id))
            .with_value("temperature", temperature)
            .with_value("pressure", 101.0)
            .with_value("humidity", 45.0)
            .with_value("gas_composition", 500.0)
            .with_value("noise_level", 30.0)
    }

    fn history(first: &str) -> SensorHistory {
        SensorHistory {
            timestamps: vec![first.to_string(), "12:05".to_string()],
            series: vec![Series {
                parameter_key: "Temperature".to_string(),
                label: "Temperature".to_string(),
                axis: Axis::Left,
                values: vec![Some(20.0), Some(21.0)],
            }],
        }
    }

    fn app(backend: &Arc<ScriptedBackend>) -> App {
        let (poller, events) = Poller::new(backend.clone(), Handle::current(), 24);
        App::new(
            ConfigStore::builtin(),
            poller,
            events,
            DashboardConfig::default(),
            Theme::dark(),
        )
    }

    async fn settle(app: &mut App) {
        tokio::time::sleep(Duration::from_secs(2)).await;
        app.drain_events();
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_order_latest_keeps_later_poll() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_latest(Duration::from_millis(800), Ok(vec![complete(1, 40.0)]));
        backend.push_latest(Duration::from_millis(10), Ok(vec![complete(1, 21.0)]));
        let mut app = app(&backend);

        app.refresh();
        app.refresh();
        settle(&mut app).await;

        let marker = app.sync.marker(SensorId::Historical(1)).unwrap();
        assert_eq!(marker.status, Status::Normal);
        assert_eq!(app.latest[&SensorId::Historical(1)].reading.value("temperature"), Some(21.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sensors_missing_from_poll_have_no_data() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.set_latest(Ok(vec![complete(1, 21.0)]));
        let mut app = app(&backend);

        app.refresh();
        settle(&mut app).await;

        assert_eq!(app.latest[&SensorId::Historical(1)].status, Status::Normal);
        assert_eq!(app.latest[&SensorId::Historical(2)].status, Status::NoData);
        assert_eq!(app.sync.marker(SensorId::Historical(2)).unwrap().color, MarkerColor::Neutral);
        assert!(app.last_update.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unchanged_reading_adds_one_trend_sample() {
        let backend = Arc::new(ScriptedBackend::new());
        let ts = chrono::NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        backend.set_latest(Ok(vec![complete(1, 21.0).with_timestamp(ts)]));
        let mut app = app(&backend);

        for _ in 0..3 {
            app.refresh();
            settle(&mut app).await;
        }

        assert_eq!(backend.latest_calls(), 3);
        assert_eq!(app.history.len(SensorId::Historical(1), "temperature"), 1);
        assert!(app.history.sparkline(SensorId::Historical(1), "temperature").is_empty());

        backend.set_latest(Ok(vec![complete(1, 22.0).with_timestamp(ts + chrono::Duration::hours(1))]));
        app.refresh();
        settle(&mut app).await;

        assert_eq!(app.history.len(SensorId::Historical(1), "temperature"), 2);
        assert_eq!(app.history.delta(SensorId::Historical(1), "temperature"), Some(1.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_emphasizes_exactly_one_marker() {
        let backend = Arc::new(ScriptedBackend::new());
        let mut app = app(&backend);

        app.select(SensorId::Historical(2));
        assert_eq!(app.sync.emphasized_count(), 1);
        app.select(SensorId::Historical(5));
        assert_eq!(app.sync.emphasized_count(), 1);
        assert!(app.sync.marker(SensorId::Historical(5)).unwrap().emphasized);

        app.select(SensorId::Historical(42));
        assert_eq!(app.sync.emphasized_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cards_and_marker_share_reading() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.set_latest(Ok(vec![complete(3, 30.0)]));
        let mut app = app(&backend);
        app.refresh();
        settle(&mut app).await;

        app.select(SensorId::Historical(3));

        let marker = app.sync.marker(SensorId::Historical(3)).unwrap();
        assert_eq!(marker.color, MarkerColor::Alert);
        let temperature = app
            .sync
            .cards()
            .iter()
            .find(|c| c.parameter_key == "temperature")
            .unwrap();
        assert_eq!(temperature.value, 30.0);
        assert!(!temperature.normal);
    }

    #[tokio::test(start_paused = true)]
    async fn test_live_selection_controls_live_timer() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.set_live(Ok(Reading::new(SensorId::Live).with_value("temperature", 22.0)));
        let mut app = app(&backend);

        app.select(SensorId::Live);
        assert!(app.live_polling());
        assert_eq!(app.selection(), Selection::SelectedLive);
        assert_eq!(app.sync.chart(), &ChartPanel::Disabled);
        assert_eq!(app.sync.stats(), &StatsPanel::Disabled);

        settle(&mut app).await;
        assert_eq!(app.sync.cards().len(), 1);

        app.select(SensorId::Historical(1));
        assert!(!app.live_polling());
        let calls = backend.live_calls();
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(backend.live_calls(), calls);
    }

    #[tokio::test(start_paused = true)]
    async fn test_live_reading_after_deselect_is_dropped() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_live(
            Duration::from_millis(500),
            Ok(Reading::new(SensorId::Live).with_value("temperature", 22.0)),
        );
        let mut app = app(&backend);

        app.select(SensorId::Live);
        tokio::task::yield_now().await;
        app.select(SensorId::Historical(1));
        settle(&mut app).await;

        assert!(!app.latest.contains_key(&SensorId::Live));
    }

    #[tokio::test(start_paused = true)]
    async fn test_history_for_previous_selection_is_dropped() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.set_history_delayed(
            SensorId::Historical(1),
            Duration::from_millis(500),
            Ok(history("11:00")),
        );
        backend.set_history(SensorId::Historical(2), Ok(history("12:00")));
        let mut app = app(&backend);

        app.select(SensorId::Historical(1));
        app.select(SensorId::Historical(2));
        settle(&mut app).await;

        let ChartPanel::Chart(chart) = app.sync.chart() else {
            panic!("expected a chart, got {:?}", app.sync.chart());
        };
        assert_eq!(chart.timestamps[0], "12:00");
        assert_eq!(app.sync.live_chart_instances(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_history_error_shows_unavailable() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.set_history(
            SensorId::Historical(4),
            Err(DashboardError::DataUnavailable("no data".to_string())),
        );
        let mut app = app(&backend);

        app.select(SensorId::Historical(4));
        settle(&mut app).await;

        assert!(matches!(app.sync.chart(), ChartPanel::Unavailable(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_history_error_payload_shows_no_data() {
        let backend = Arc::new(ScriptedBackend::new());
        let empty = crate::api::wire::parse_history(serde_json::json!({"error": "Нет данных"}));
        backend.set_history(SensorId::Historical(3), empty);
        let mut app = app(&backend);

        app.select(SensorId::Historical(3));
        settle(&mut app).await;

        assert_eq!(app.sync.chart(), &ChartPanel::NoData);
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_parameters_redraws_chart() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.set_history(SensorId::Historical(1), Ok(history("12:00")));
        let mut app = app(&backend);
        app.select(SensorId::Historical(1));
        settle(&mut app).await;
        assert!(matches!(app.sync.chart(), ChartPanel::Chart(_)));

        for key in app.store.parameter_keys().map(str::to_string).collect::<Vec<_>>() {
            app.toggle_parameter(&key);
        }
        assert_eq!(app.sync.chart(), &ChartPanel::Prompt);
        assert_eq!(app.sync.live_chart_instances(), 0);

        app.toggle_parameter("temperature");
        assert!(matches!(app.sync.chart(), ChartPanel::Chart(_)));
        assert!(app.is_parameter_visible("temperature"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_admin_requires_confirmation() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.set_admin(Ok(AdminOutcome { records: Some(1200), total_records: Some(1200) }));
        let mut app = app(&backend);

        app.request_admin(app.generate_action());
        settle(&mut app).await;
        assert!(backend.admin_actions().is_empty());

        app.confirm_admin();
        settle(&mut app).await;

        assert_eq!(
            backend.admin_actions(),
            vec![AdminAction::GenerateTestData { days: 1 }]
        );
        assert_eq!(app.get_status_message(), Some("Generated 1200 records"));

        // A successful action refreshes the dashboard.
        settle(&mut app).await;
        assert_eq!(backend.latest_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_admin_leaves_state_unchanged() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.set_latest(Ok(vec![complete(1, 21.0)]));
        backend.set_admin(Err(DashboardError::AdminActionFailed("locked".to_string())));
        let mut app = app(&backend);
        app.refresh();
        settle(&mut app).await;
        let before = app.latest.clone();
        let calls = backend.latest_calls();

        app.request_admin(AdminAction::ClearData);
        app.confirm_admin();
        settle(&mut app).await;

        assert_eq!(app.latest, before);
        assert_eq!(backend.latest_calls(), calls);
        assert!(app.get_status_message().unwrap().contains("failed"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_admin_does_nothing() {
        let backend = Arc::new(ScriptedBackend::new());
        let mut app = app(&backend);

        app.request_admin(AdminAction::ClearLiveData);
        app.cancel_admin();
        app.confirm_admin();
        settle(&mut app).await;

        assert!(backend.admin_actions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_export_state() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.set_latest(Ok(vec![complete(1, 21.0)]));
        let mut app = app(&backend);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        assert!(app.export_state(&path).is_err());

        app.refresh();
        settle(&mut app).await;
        app.export_state(&path).unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_view_cycle() {
        let backend = Arc::new(ScriptedBackend::new());
        let mut app = app(&backend);
        assert_eq!(app.current_view, View::Map);
        app.next_view();
        assert_eq!(app.current_view, View::Sensors);
        app.prev_view();
        app.prev_view();
        assert_eq!(app.current_view, View::Detail);
    }

    #[tokio::test]
    async fn test_navigation_bounds() {
        let backend = Arc::new(ScriptedBackend::new());
        let mut app = app(&backend);
        let rows = app.sensor_rows();
        assert_eq!(rows.last(), Some(&SensorId::Live));

        app.select_prev();
        assert_eq!(app.selected_index, 0);
        for _ in 0..20 {
            app.select_next();
        }
        assert_eq!(app.selected_index, rows.len() - 1);
    }
}
