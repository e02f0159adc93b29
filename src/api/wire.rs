//! Wire payloads of the backend and their conversion into domain types.
//!
//! Parsing works on already-decoded JSON so it can be tested without a
//! server. Malformed configuration is rejected; malformed readings are
//! tolerated value-by-value (a missing value simply makes the reading
//! incomplete).

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::api::AdminOutcome;
use crate::data::model::parse_timestamp;
use crate::data::{
    Axis, ParameterConfig, Reading, SensorHistory, SensorId, SensorLocation, SensorStats, Series,
    SystemStats,
};
use crate::error::DashboardError;

/// `/api/sensor_config` entry.
#[derive(Debug, Deserialize)]
struct WireParameter {
    norm_min: f64,
    norm_max: f64,
    #[serde(default)]
    unit: String,
    #[serde(default)]
    name: Option<String>,
}

/// `/api/sensor_locations` entry.
#[derive(Debug, Deserialize)]
struct WireLocation {
    lat: f64,
    lng: f64,
    #[serde(default)]
    name: Option<String>,
}

/// `/api/sensor/{id}` payload.
#[derive(Debug, Deserialize)]
struct WireHistory {
    #[serde(default)]
    timestamps: Vec<String>,
    #[serde(default)]
    datasets: Vec<WireDataset>,
}

#[derive(Debug, Deserialize)]
struct WireDataset {
    label: String,
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    data: Vec<Option<f64>>,
    #[serde(default, rename = "yAxisID")]
    y_axis_id: Option<String>,
}

/// `/api/sensor/{id}/stats` payload.
#[derive(Debug, Deserialize)]
struct WireStats {
    #[serde(default)]
    total_records: u64,
    #[serde(default)]
    time_range: Option<WireTimeRange>,
    #[serde(default)]
    averages: BTreeMap<String, Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct WireTimeRange {
    first_record: Option<String>,
    last_record: Option<String>,
}

/// `/api/system_stats` payload.
#[derive(Debug, Deserialize)]
struct WireSystemStats {
    #[serde(default)]
    active_sensors: u64,
    #[serde(default)]
    total_records: u64,
}

/// The `error` message of an error payload, if this is one.
pub fn error_message(value: &Value) -> Option<String> {
    match value.get("error")? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Parse `/api/sensor_config`.
pub fn parse_sensor_config(value: Value) -> Result<Vec<ParameterConfig>, DashboardError> {
    let raw: BTreeMap<String, WireParameter> = serde_json::from_value(value)
        .map_err(|e| DashboardError::ConfigUnavailable(format!("malformed sensor config: {}", e)))?;

    raw.into_iter()
        .map(|(key, p)| {
            if p.norm_min > p.norm_max {
                return Err(DashboardError::ConfigUnavailable(format!(
                    "norm_min > norm_max for {}",
                    key
                )));
            }
            let display_name = p.name.unwrap_or_else(|| key.clone());
            Ok(ParameterConfig {
                key,
                display_name,
                unit: p.unit,
                norm_min: p.norm_min,
                norm_max: p.norm_max,
                aliases: Vec::new(),
            })
        })
        .collect()
}

/// Parse `/api/sensor_locations`.
pub fn parse_sensor_locations(value: Value) -> Result<Vec<SensorLocation>, DashboardError> {
    let raw: BTreeMap<String, WireLocation> = serde_json::from_value(value).map_err(|e| {
        DashboardError::ConfigUnavailable(format!("malformed sensor locations: {}", e))
    })?;

    raw.into_iter()
        .map(|(id, loc)| {
            let sensor_id: SensorId = id.parse().map_err(|_| {
                DashboardError::ConfigUnavailable(format!("invalid sensor id '{}'", id))
            })?;
            Ok(SensorLocation {
                sensor_id,
                display_name: loc.name.unwrap_or_else(|| sensor_id.to_string()),
                latitude: loc.lat,
                longitude: loc.lng,
            })
        })
        .collect()
}

/// Parse `/api/latest`.
pub fn parse_latest(value: Value) -> Result<Vec<Reading>, DashboardError> {
    if let Some(err) = error_message(&value) {
        return Err(DashboardError::DataUnavailable(err));
    }
    let Value::Object(sensors) = value else {
        return Err(DashboardError::DataUnavailable(
            "latest readings payload is not an object".to_string(),
        ));
    };

    let mut readings = Vec::with_capacity(sensors.len());
    for (id, fields) in sensors {
        let Ok(sensor_id) = id.parse::<SensorId>() else {
            warn!(sensor = %id, "Skipping reading with invalid sensor id");
            continue;
        };
        let Value::Object(fields) = fields else {
            warn!(sensor = %id, "Skipping reading that is not an object");
            continue;
        };
        readings.push(reading_from_fields(sensor_id, &fields));
    }
    Ok(readings)
}

/// Parse `/api/real_sensor/latest`.
pub fn parse_live(value: Value) -> Result<Reading, DashboardError> {
    if value.get("success").and_then(Value::as_bool) == Some(false) {
        let reason = error_message(&value).unwrap_or_else(|| "live sensor reported failure".into());
        return Err(DashboardError::DataUnavailable(reason));
    }
    if let Some(err) = error_message(&value) {
        return Err(DashboardError::DataUnavailable(err));
    }
    let Value::Object(fields) = value else {
        return Err(DashboardError::DataUnavailable(
            "live sensor payload is not an object".to_string(),
        ));
    };
    Ok(reading_from_fields(SensorId::Live, &fields))
}

fn reading_from_fields(sensor_id: SensorId, fields: &serde_json::Map<String, Value>) -> Reading {
    let mut reading = Reading::new(sensor_id);
    for (key, value) in fields {
        match (key.as_str(), value) {
            ("timestamp", Value::String(ts)) => reading.timestamp = parse_timestamp(ts),
            ("success" | "error" | "sensor_id" | "id", _) => {}
            (_, Value::Number(n)) => {
                if let Some(v) = n.as_f64() {
                    reading.insert(key, v);
                }
            }
            _ => {}
        }
    }
    reading
}

/// Parse `/api/sensor/{id}?hours=N`.
///
/// The backend lists samples newest first; the result is chronological.
/// An error payload is how the backend reports an empty window, so it
/// yields an empty history rather than an error.
pub fn parse_history(value: Value) -> Result<SensorHistory, DashboardError> {
    if let Some(err) = error_message(&value) {
        debug!(reason = %err, "Backend reported no history");
        return Ok(SensorHistory::default());
    }
    let raw: WireHistory = serde_json::from_value(value)
        .map_err(|e| DashboardError::DataUnavailable(format!("malformed history: {}", e)))?;

    let mut timestamps = raw.timestamps;
    timestamps.reverse();

    let series = raw
        .datasets
        .into_iter()
        .map(|ds| {
            let mut values = ds.data;
            values.reverse();
            Series {
                parameter_key: ds.key.unwrap_or_else(|| ds.label.clone()),
                label: ds.label,
                axis: match ds.y_axis_id.as_deref() {
                    Some("y1") => Axis::Right,
                    _ => Axis::Left,
                },
                values,
            }
        })
        .collect();

    Ok(SensorHistory { timestamps, series })
}

/// Parse `/api/sensor/{id}/stats`.
pub fn parse_stats(value: Value) -> Result<SensorStats, DashboardError> {
    if let Some(err) = error_message(&value) {
        return Err(DashboardError::DataUnavailable(err));
    }
    let raw: WireStats = serde_json::from_value(value)
        .map_err(|e| DashboardError::DataUnavailable(format!("malformed stats: {}", e)))?;

    let (first_record, last_record) = match raw.time_range {
        Some(range) => (
            range.first_record.as_deref().and_then(parse_timestamp),
            range.last_record.as_deref().and_then(parse_timestamp),
        ),
        None => (None, None),
    };

    Ok(SensorStats {
        total_records: raw.total_records,
        first_record,
        last_record,
        averages: raw
            .averages
            .into_iter()
            .filter_map(|(k, v)| v.filter(|v| v.is_finite()).map(|v| (k, v)))
            .collect(),
    })
}

/// Parse `/api/system_stats`.
pub fn parse_system_stats(value: Value) -> Result<SystemStats, DashboardError> {
    if let Some(err) = error_message(&value) {
        return Err(DashboardError::DataUnavailable(err));
    }
    let raw: WireSystemStats = serde_json::from_value(value)
        .map_err(|e| DashboardError::DataUnavailable(format!("malformed system stats: {}", e)))?;
    Ok(SystemStats {
        active_sensors: raw.active_sensors,
        total_records: raw.total_records,
    })
}

/// Parse the response of an admin endpoint.
pub fn parse_admin(value: Value) -> Result<AdminOutcome, DashboardError> {
    if value.get("success").and_then(Value::as_bool) == Some(true) {
        return Ok(AdminOutcome {
            records: value.get("records").and_then(Value::as_u64),
            total_records: value.get("total_records").and_then(Value::as_u64),
        });
    }
    let reason = error_message(&value).unwrap_or_else(|| "backend reported failure".to_string());
    Err(DashboardError::AdminActionFailed(reason))
}
