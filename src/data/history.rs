//! Per-sensor value history for sparklines.

use std::collections::{BTreeMap, HashMap, VecDeque};

use chrono::NaiveDateTime;

use super::model::{Reading, SensorId};

/// Maximum number of samples to keep per sensor and parameter.
const MAX_HISTORY_SIZE: usize = 60;

/// Tracks the latest value of every parameter across polls.
///
/// Fed from every applied `/api/latest` result, so the trend shown in the
/// sensors table comes from the same readings as the marker status. A poll
/// that returns the reading already recorded adds no sample.
#[derive(Debug, Clone, Default)]
pub struct ReadingHistory {
    values: HashMap<(SensorId, String), VecDeque<f64>>,
    last: HashMap<SensorId, LastSample>,
}

#[derive(Debug, Clone)]
struct LastSample {
    timestamp: Option<NaiveDateTime>,
    values: BTreeMap<String, f64>,
}

impl LastSample {
    /// Whether `reading` is a different sample from this one.
    ///
    /// With timestamps on both sides only a newer one counts; otherwise the
    /// values decide.
    fn is_superseded_by(&self, reading: &Reading) -> bool {
        match (self.timestamp, reading.timestamp) {
            (Some(previous), Some(current)) => current > previous,
            (None, Some(_)) => true,
            (_, None) => self.values != reading.values,
        }
    }
}

impl ReadingHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record every value of a reading.
    ///
    /// Empty readings and repeats of the last recorded reading are skipped.
    /// Returns whether a sample was added.
    pub fn record(&mut self, reading: &Reading) -> bool {
        if reading.values.is_empty() {
            return false;
        }
        if let Some(last) = self.last.get(&reading.sensor_id) {
            if !last.is_superseded_by(reading) {
                return false;
            }
        }
        self.last.insert(
            reading.sensor_id,
            LastSample {
                timestamp: reading.timestamp,
                values: reading.values.clone(),
            },
        );

        for (key, value) in &reading.values {
            let samples = self.values.entry((reading.sensor_id, key.clone())).or_default();
            samples.push_back(*value);
            if samples.len() > MAX_HISTORY_SIZE {
                samples.pop_front();
            }
        }
        true
    }

    /// Number of samples held for a sensor parameter.
    pub fn len(&self, sensor_id: SensorId, parameter_key: &str) -> usize {
        self.values
            .get(&(sensor_id, parameter_key.to_string()))
            .map_or(0, VecDeque::len)
    }

    /// Get sparkline data (normalized to 0-7 for 8 bar levels).
    ///
    /// Returns an empty Vec if there's not enough history.
    pub fn sparkline(&self, sensor_id: SensorId, parameter_key: &str) -> Vec<u8> {
        let Some(values) = self.values.get(&(sensor_id, parameter_key.to_string())) else {
            return Vec::new();
        };

        if values.len() < 2 {
            return Vec::new();
        }

        let max = values.iter().copied().fold(f64::MIN, f64::max);
        let min = values.iter().copied().fold(f64::MAX, f64::min);
        let range = max - min;

        values
            .iter()
            .map(|&v| {
                if range <= f64::EPSILON {
                    3
                } else {
                    (((v - min) / range) * 7.0).round().clamp(0.0, 7.0) as u8
                }
            })
            .collect()
    }

    /// Change between the last two samples, if there are two.
    pub fn delta(&self, sensor_id: SensorId, parameter_key: &str) -> Option<f64> {
        let values = self.values.get(&(sensor_id, parameter_key.to_string()))?;
        let current = *values.back()?;
        let previous = *values.get(values.len().checked_sub(2)?)?;
        Some(current - previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(temp: f64) -> Reading {
        Reading::new(SensorId::Historical(1)).with_value("temperature", temp)
    }

    fn at(hour: u32) -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_sparkline_needs_two_samples() {
        let mut history = ReadingHistory::new();
        history.record(&reading(20.0));
        assert!(history.sparkline(SensorId::Historical(1), "temperature").is_empty());
    }

    #[test]
    fn test_sparkline_normalizes() {
        let mut history = ReadingHistory::new();
        for t in [18.0, 21.0, 24.0] {
            history.record(&reading(t));
        }
        assert_eq!(history.sparkline(SensorId::Historical(1), "temperature"), vec![0, 4, 7]);
    }

    #[test]
    fn test_flat_series_sits_mid_height() {
        let mut history = ReadingHistory::new();
        history.record(&reading(20.0).with_timestamp(at(10)));
        history.record(&reading(20.0).with_timestamp(at(11)));
        assert_eq!(history.sparkline(SensorId::Historical(1), "temperature"), vec![3, 3]);
    }

    #[test]
    fn test_repeated_reading_is_recorded_once() {
        let mut history = ReadingHistory::new();
        let sample = reading(21.5).with_timestamp(at(10));

        assert!(history.record(&sample));
        assert!(!history.record(&sample));
        assert!(!history.record(&sample));

        assert_eq!(history.len(SensorId::Historical(1), "temperature"), 1);
        assert!(history.sparkline(SensorId::Historical(1), "temperature").is_empty());
        assert_eq!(history.delta(SensorId::Historical(1), "temperature"), None);
    }

    #[test]
    fn test_older_timestamp_is_not_recorded() {
        let mut history = ReadingHistory::new();
        history.record(&reading(20.0).with_timestamp(at(11)));

        assert!(!history.record(&reading(25.0).with_timestamp(at(10))));
        assert!(history.record(&reading(22.0).with_timestamp(at(12))));
        assert_eq!(history.delta(SensorId::Historical(1), "temperature"), Some(2.0));
    }

    #[test]
    fn test_untimed_readings_compare_values() {
        let mut history = ReadingHistory::new();
        assert!(history.record(&reading(20.0)));
        assert!(!history.record(&reading(20.0)));
        assert!(history.record(&reading(20.5)));
        assert_eq!(history.len(SensorId::Historical(1), "temperature"), 2);
    }

    #[test]
    fn test_empty_reading_adds_nothing() {
        let mut history = ReadingHistory::new();
        assert!(!history.record(&Reading::new(SensorId::Historical(1))));
        assert_eq!(history.len(SensorId::Historical(1), "temperature"), 0);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut history = ReadingHistory::new();
        for i in 0..100 {
            history.record(&reading(i as f64));
        }
        assert_eq!(history.len(SensorId::Historical(1), "temperature"), MAX_HISTORY_SIZE);
        assert_eq!(history.delta(SensorId::Historical(1), "temperature"), Some(1.0));
    }
}
