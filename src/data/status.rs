//! Normal/abnormal status evaluation.
//!
//! A sensor is judged from a single reading: it is `NoData` unless every
//! known parameter is present, `Normal` when every parameter lies inside its
//! inclusive normal range, and `Warning` otherwise.

use serde::Serialize;

use super::config_store::ConfigStore;
use super::model::Reading;

/// Derived tri-state status of a sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Status {
    NoData,
    Normal,
    Warning,
}

impl Status {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            Status::NoData => "--",
            Status::Normal => "OK",
            Status::Warning => "WARN",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Status::NoData => "No data",
            Status::Normal => "Normal",
            Status::Warning => "Attention",
        }
    }
}

/// A status together with the reading it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorStatus {
    pub status: Status,
    pub reading: Reading,
}

/// Evaluates readings against the normal ranges held by a [`ConfigStore`].
#[derive(Debug, Clone, Copy)]
pub struct StatusEvaluator<'a> {
    store: &'a ConfigStore,
}

impl<'a> StatusEvaluator<'a> {
    pub fn new(store: &'a ConfigStore) -> Self {
        Self { store }
    }

    /// Inclusive range check: `norm_min <= value <= norm_max`.
    pub fn is_parameter_normal(&self, parameter_key: &str, value: f64) -> bool {
        let cfg = self.store.get(parameter_key);
        value >= cfg.norm_min && value <= cfg.norm_max
    }

    /// A reading is complete when it has a value for every known parameter.
    pub fn is_complete(&self, reading: &Reading) -> bool {
        self.store.parameter_keys().all(|key| reading.values.contains_key(key))
    }

    /// Evaluate one reading.
    pub fn evaluate(&self, reading: Reading) -> SensorStatus {
        let status = if !self.is_complete(&reading) {
            Status::NoData
        } else if reading
            .values
            .iter()
            .all(|(key, value)| self.is_parameter_normal(key, *value))
        {
            Status::Normal
        } else {
            Status::Warning
        };

        SensorStatus { status, reading }
    }

    /// Keys of the parameters in `reading` that are outside their range.
    pub fn out_of_range(&self, reading: &Reading) -> Vec<String> {
        reading
            .values
            .iter()
            .filter(|(key, value)| !self.is_parameter_normal(key, **value))
            .map(|(key, _)| key.clone())
            .collect()
    }
}
