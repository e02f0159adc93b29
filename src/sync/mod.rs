//! Keeps the map and the detail panel consistent.
//!
//! [`ViewSync`] owns the view models the UI renders: one [`Marker`] per
//! sensor location, the metric cards of the selected sensor, the chart and
//! the statistics panel. Markers and cards are only ever updated from a
//! [`SensorStatus`] or the [`Reading`] inside it, so the two views cannot
//! disagree about a sensor.

mod chart;
mod marker;

pub use chart::{ChartInstance, ChartLine, ChartPanel, StatsPanel};
pub use marker::{Marker, MarkerColor};

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use crate::data::{
    ConfigStore, Reading, SensorHistory, SensorId, SensorStats, SensorStatus, StatusEvaluator,
};
use crate::error::DashboardError;

/// One parameter of the selected sensor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCard {
    pub parameter_key: String,
    pub display_name: String,
    pub value: f64,
    pub unit: String,
    pub range_label: String,
    pub normal: bool,
}

impl MetricCard {
    pub fn value_text(&self) -> String {
        if self.unit.is_empty() {
            format!("{:.1}", self.value)
        } else {
            format!("{:.1} {}", self.value, self.unit)
        }
    }
}

/// View models for the map and the detail panel.
#[derive(Debug)]
pub struct ViewSync {
    markers: Vec<Marker>,
    cards: Vec<MetricCard>,
    cards_updated: Option<String>,
    chart: ChartPanel,
    stats: StatsPanel,
    charts_created: u64,
    charts_released: u64,
}

impl ViewSync {
    /// One neutral marker per known location.
    pub fn new(store: &ConfigStore) -> Self {
        Self {
            markers: store.locations().iter().map(Marker::new).collect(),
            cards: Vec::new(),
            cards_updated: None,
            chart: ChartPanel::Empty,
            stats: StatsPanel::Empty,
            charts_created: 0,
            charts_released: 0,
        }
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn marker(&self, sensor_id: SensorId) -> Option<&Marker> {
        self.markers.iter().find(|m| m.sensor_id == sensor_id)
    }

    /// Update one marker from an evaluated status.
    ///
    /// Applying the same status twice leaves the same state. Statuses of
    /// sensors without a marker are ignored.
    pub fn apply_marker_status(
        &mut self,
        store: &ConfigStore,
        status: &SensorStatus,
        selection: Option<SensorId>,
    ) {
        let sensor_id = status.reading.sensor_id;
        let Some(marker) = self.markers.iter_mut().find(|m| m.sensor_id == sensor_id) else {
            debug!(%sensor_id, "No marker for sensor");
            return;
        };
        marker.apply(store, status);
        marker.emphasized = selection == Some(sensor_id);
    }

    /// Emphasize the selected marker and no other.
    pub fn refresh_emphasis(&mut self, selection: Option<SensorId>) {
        for marker in &mut self.markers {
            marker.emphasized = selection == Some(marker.sensor_id);
        }
    }

    pub fn emphasized_count(&self) -> usize {
        self.markers.iter().filter(|m| m.emphasized).count()
    }

    /// Replace the metric cards with the values of `reading`.
    ///
    /// One card per parameter present in the reading, in display order.
    pub fn apply_metric_cards(&mut self, store: &ConfigStore, reading: &Reading) {
        let evaluator = StatusEvaluator::new(store);
        let mut keys: Vec<&String> = reading.values.keys().collect();
        keys.sort_by_key(|k| {
            store
                .parameters()
                .iter()
                .position(|p| &p.key == *k)
                .unwrap_or(usize::MAX)
        });

        self.cards = keys
            .into_iter()
            .filter_map(|key| {
                let value = reading.value(key)?;
                let cfg = store.get(key);
                Some(MetricCard {
                    parameter_key: key.clone(),
                    display_name: cfg.display_name.clone(),
                    value,
                    unit: cfg.unit.clone(),
                    range_label: cfg.range_label(),
                    normal: evaluator.is_parameter_normal(key, value),
                })
            })
            .collect();
        self.cards_updated = Some(reading.formatted_timestamp());
    }

    pub fn clear_metric_cards(&mut self) {
        self.cards.clear();
        self.cards_updated = None;
    }

    pub fn cards(&self) -> &[MetricCard] {
        &self.cards
    }

    /// Timestamp of the reading the cards were built from.
    pub fn cards_updated(&self) -> Option<&str> {
        self.cards_updated.as_deref()
    }

    /// Rebuild the chart from `history`, restricted to `visible` parameters.
    ///
    /// The previous chart is released before the new one is built.
    pub fn apply_chart(
        &mut self,
        store: &ConfigStore,
        history: &SensorHistory,
        visible: &BTreeSet<String>,
    ) {
        self.release_chart();

        if history.is_empty() {
            self.chart = ChartPanel::NoData;
            return;
        }
        if visible.is_empty() {
            self.chart = ChartPanel::Prompt;
            return;
        }

        let id = self.charts_created + 1;
        self.chart = match ChartInstance::build(id, store, history, visible) {
            Some(chart) => {
                self.charts_created = id;
                ChartPanel::Chart(chart)
            }
            None => ChartPanel::NoData,
        };
    }

    pub fn show_chart_loading(&mut self) {
        self.set_chart(ChartPanel::Loading);
    }

    pub fn show_chart_unavailable(&mut self, error: &DashboardError) {
        self.set_chart(ChartPanel::Unavailable(error.to_string()));
    }

    /// Chart and statistics are not offered for the live sensor.
    pub fn disable_detail(&mut self) {
        self.set_chart(ChartPanel::Disabled);
        self.stats = StatsPanel::Disabled;
    }

    pub fn show_stats_loading(&mut self) {
        self.stats = StatsPanel::Loading;
    }

    pub fn apply_stats(&mut self, result: Result<SensorStats, DashboardError>) {
        self.stats = match result {
            Ok(stats) => StatsPanel::Stats(stats),
            Err(e) => StatsPanel::Unavailable(e.to_string()),
        };
    }

    pub fn chart(&self) -> &ChartPanel {
        &self.chart
    }

    pub fn stats(&self) -> &StatsPanel {
        &self.stats
    }

    /// Number of chart instances currently alive (0 or 1).
    pub fn live_chart_instances(&self) -> u64 {
        self.charts_created - self.charts_released
    }

    fn set_chart(&mut self, panel: ChartPanel) {
        self.release_chart();
        self.chart = panel;
    }

    fn release_chart(&mut self) {
        if let ChartPanel::Chart(old) = std::mem::replace(&mut self.chart, ChartPanel::Empty) {
            debug!(chart = old.id, "Releasing chart");
            self.charts_released += 1;
        }
    }
}
