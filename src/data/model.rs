//! Core data models: sensor identity, readings, configuration rows and
//! the aggregate payloads shown in the detail view.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Backend id reserved for the live external sensor feed.
///
/// This is the only place the wire id is interpreted; everywhere else the
/// live feed is [`SensorId::Live`].
pub const LIVE_SENSOR_WIRE_ID: u32 = 99;

/// Timestamp format used by the backend for readings and statistics.
pub const WIRE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Timestamp format used for display.
pub const DISPLAY_TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

/// Identity of a sensor.
///
/// Historical sensors have stored (or simulated) history that can be charted.
/// The live sensor is a real external feed polled on its own cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SensorId {
    Historical(u32),
    Live,
}

impl SensorId {
    /// Map a backend id onto a sensor identity.
    pub fn from_wire(id: u32) -> Self {
        if id == LIVE_SENSOR_WIRE_ID {
            SensorId::Live
        } else {
            SensorId::Historical(id)
        }
    }

    /// The id used in backend URLs and payloads.
    pub fn wire_id(&self) -> u32 {
        match self {
            SensorId::Historical(id) => *id,
            SensorId::Live => LIVE_SENSOR_WIRE_ID,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, SensorId::Live)
    }
}

impl FromStr for SensorId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("live") {
            return Ok(SensorId::Live);
        }
        s.parse::<u32>().map(SensorId::from_wire)
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorId::Historical(id) => write!(f, "Sensor {}", id),
            SensorId::Live => write!(f, "Live sensor"),
        }
    }
}

/// Normal-range configuration for one monitored parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterConfig {
    pub key: String,
    pub display_name: String,
    pub unit: String,
    pub norm_min: f64,
    pub norm_max: f64,
    /// Other labels the backend uses for this parameter in chart datasets.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl ParameterConfig {
    pub fn new(key: &str, display_name: &str, unit: &str, norm_min: f64, norm_max: f64) -> Self {
        Self {
            key: key.to_string(),
            display_name: display_name.to_string(),
            unit: unit.to_string(),
            norm_min,
            norm_max,
            aliases: Vec::new(),
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    /// True when `label` is the key, the display name or an alias.
    pub fn answers_to(&self, label: &str) -> bool {
        self.key == label || self.display_name == label || self.aliases.iter().any(|a| a == label)
    }

    /// Config returned for keys the store does not know: `[0, 100]`, no unit.
    pub fn fallback(key: &str) -> Self {
        Self::new(key, key, "", 0.0, 100.0)
    }

    /// Range label such as `18-24 °C`.
    pub fn range_label(&self) -> String {
        let range = format!("{}-{}", self.norm_min, self.norm_max);
        if self.unit.is_empty() {
            range
        } else {
            format!("{} {}", range, self.unit)
        }
    }
}

/// Where a sensor sits on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorLocation {
    pub sensor_id: SensorId,
    pub display_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// One timestamped set of parameter values from one sensor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub sensor_id: SensorId,
    pub timestamp: Option<NaiveDateTime>,
    /// Only finite numeric values are kept; missing or null values are absent.
    pub values: BTreeMap<String, f64>,
}

impl Reading {
    pub fn new(sensor_id: SensorId) -> Self {
        Self {
            sensor_id,
            timestamp: None,
            values: BTreeMap::new(),
        }
    }

    /// Builder-style helper, mostly for tests and fixtures.
    pub fn with_value(mut self, key: &str, value: f64) -> Self {
        self.insert(key, value);
        self
    }

    pub fn with_timestamp(mut self, timestamp: NaiveDateTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Insert a value, ignoring NaN and infinities.
    pub fn insert(&mut self, key: &str, value: f64) {
        if value.is_finite() {
            self.values.insert(key.to_string(), value);
        }
    }

    pub fn value(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    /// Timestamp for display, or `-` when the backend sent none.
    pub fn formatted_timestamp(&self) -> String {
        self.timestamp
            .map(|ts| ts.format(DISPLAY_TIMESTAMP_FORMAT).to_string())
            .unwrap_or_else(|| "-".to_string())
    }
}

/// Parse a backend timestamp (`YYYY-MM-DD HH:MM:SS` or RFC 3339).
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, WIRE_TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_local()))
}

/// Which y-axis a chart series is drawn against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Axis {
    Left,
    Right,
}

/// One parameter's values over time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub parameter_key: String,
    pub label: String,
    pub axis: Axis,
    /// Aligned with [`SensorHistory::timestamps`]; `None` where the value was missing.
    pub values: Vec<Option<f64>>,
}

/// Time series for one sensor, oldest sample first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SensorHistory {
    pub timestamps: Vec<String>,
    pub series: Vec<Series>,
}

impl SensorHistory {
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty() || self.series.iter().all(|s| s.values.is_empty())
    }
}

/// Aggregate statistics for one sensor.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SensorStats {
    pub total_records: u64,
    pub first_record: Option<NaiveDateTime>,
    pub last_record: Option<NaiveDateTime>,
    pub averages: BTreeMap<String, f64>,
}

/// Global counters shown in the header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SystemStats {
    pub active_sensors: u64,
    pub total_records: u64,
}
