//! Map markers.

use serde::Serialize;

use crate::data::{ConfigStore, SensorId, SensorLocation, SensorStatus, Status, StatusEvaluator};

/// Marker color class. The theme maps these onto terminal colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MarkerColor {
    Neutral,
    Accent,
    Alert,
}

impl From<Status> for MarkerColor {
    fn from(status: Status) -> Self {
        match status {
            Status::NoData => MarkerColor::Neutral,
            Status::Normal => MarkerColor::Accent,
            Status::Warning => MarkerColor::Alert,
        }
    }
}

/// One sensor on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub sensor_id: SensorId,
    pub display_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub status: Status,
    pub color: MarkerColor,
    /// Popup lines: values of the reading the status came from.
    pub popup: Vec<String>,
    /// Drawn enlarged. True for the selected sensor only.
    pub emphasized: bool,
}

impl Marker {
    pub(crate) fn new(location: &SensorLocation) -> Self {
        Self {
            sensor_id: location.sensor_id,
            display_name: location.display_name.clone(),
            latitude: location.latitude,
            longitude: location.longitude,
            status: Status::NoData,
            color: MarkerColor::Neutral,
            popup: vec![location.display_name.clone(), "No readings yet".to_string()],
            emphasized: false,
        }
    }

    pub(crate) fn apply(&mut self, store: &ConfigStore, status: &SensorStatus) {
        self.status = status.status;
        self.color = status.status.into();
        self.popup = popup_lines(&self.display_name, store, status);
    }
}

fn popup_lines(title: &str, store: &ConfigStore, status: &SensorStatus) -> Vec<String> {
    let out_of_range = StatusEvaluator::new(store).out_of_range(&status.reading);
    let mut lines = Vec::with_capacity(store.parameters().len() + 3);
    lines.push(title.to_string());
    lines.push(format!("Status: {}", status.status.label()));
    for cfg in store.parameters() {
        let mut value = match status.reading.value(&cfg.key) {
            Some(v) if cfg.unit.is_empty() => format!("{:.1}", v),
            Some(v) => format!("{:.1} {}", v, cfg.unit),
            None => "--".to_string(),
        };
        if out_of_range.contains(&cfg.key) {
            value.push_str(" (!)");
        }
        lines.push(format!("{}: {}", cfg.display_name, value));
    }
    lines.push(format!("Updated: {}", status.reading.formatted_timestamp()));
    lines
}
