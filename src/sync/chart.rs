//! Chart panel contents.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::data::{Axis, ConfigStore, SensorHistory, SensorStats};

/// One plotted line. `x` is the sample index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartLine {
    pub parameter_key: String,
    pub label: String,
    pub unit: String,
    pub points: Vec<(f64, f64)>,
}

impl ChartLine {
    /// `(min, max)` of the y values, if there are any.
    pub fn y_bounds(&self) -> Option<(f64, f64)> {
        self.points.iter().fold(None, |acc, &(_, y)| match acc {
            None => Some((y, y)),
            Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
        })
    }
}

/// A built chart. Each instance has a unique id; the panel holds at most one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartInstance {
    pub id: u64,
    pub timestamps: Vec<String>,
    pub left: Vec<ChartLine>,
    pub right: Vec<ChartLine>,
}

impl ChartInstance {
    pub(crate) fn build(
        id: u64,
        store: &ConfigStore,
        history: &SensorHistory,
        visible: &BTreeSet<String>,
    ) -> Option<Self> {
        let mut chart = ChartInstance {
            id,
            timestamps: history.timestamps.clone(),
            left: Vec::new(),
            right: Vec::new(),
        };

        for series in &history.series {
            let key = store
                .key_for_label(&series.parameter_key)
                .or_else(|| store.key_for_label(&series.label))
                .unwrap_or(series.parameter_key.as_str());
            if !visible.contains(key) {
                continue;
            }

            let cfg = store.get(key);
            let line = ChartLine {
                parameter_key: key.to_string(),
                label: cfg.display_name.clone(),
                unit: cfg.unit.clone(),
                points: series
                    .values
                    .iter()
                    .enumerate()
                    .filter_map(|(i, v)| v.map(|v| (i as f64, v)))
                    .collect(),
            };
            match series.axis {
                Axis::Left => chart.left.push(line),
                Axis::Right => chart.right.push(line),
            }
        }

        if chart.left.is_empty() && chart.right.is_empty() {
            None
        } else {
            Some(chart)
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = &ChartLine> {
        self.left.iter().chain(self.right.iter())
    }
}

/// What the chart area currently shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ChartPanel {
    /// No sensor selected.
    Empty,
    /// History requested, not yet received.
    Loading,
    /// No parameter is toggled on.
    Prompt,
    /// The sensor has no history in the requested window.
    NoData,
    /// Charts are not offered for the live sensor.
    Disabled,
    /// The history request failed.
    Unavailable(String),
    Chart(ChartInstance),
}

/// What the statistics area currently shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StatsPanel {
    Empty,
    Loading,
    Disabled,
    Unavailable(String),
    Stats(SensorStats),
}
