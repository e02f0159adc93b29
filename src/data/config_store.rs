//! Parameter normal ranges and sensor locations.
//!
//! Fetched once at startup; everything else in the session reads the cached
//! snapshot. When the backend cannot provide either table the store keeps a
//! built-in copy so the dashboard stays usable in degraded mode.

use std::borrow::Cow;

use tracing::{info, warn};

use super::model::{ParameterConfig, SensorId, SensorLocation};
use crate::api::Backend;
use crate::error::DashboardError;

/// Display order of the well-known parameters. Unknown keys sort after these.
pub const CANONICAL_PARAMETERS: [&str; 5] =
    ["temperature", "pressure", "humidity", "gas_composition", "noise_level"];

/// Authoritative per-parameter configuration and sensor metadata.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    parameters: Vec<ParameterConfig>,
    locations: Vec<SensorLocation>,
    degraded: bool,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ConfigStore {
    /// Build a store from explicit tables.
    pub fn new(parameters: Vec<ParameterConfig>, locations: Vec<SensorLocation>) -> Self {
        let mut store = Self {
            parameters: Vec::new(),
            locations: Vec::new(),
            degraded: false,
        };
        store.set_parameters(parameters);
        store.set_locations(locations);
        store
    }

    /// The tables the dashboard falls back to when the backend is unavailable.
    pub fn builtin() -> Self {
        Self::new(builtin_parameters(), builtin_locations())
    }

    /// Fetch parameter configuration and sensor locations from the backend.
    ///
    /// Both requests run concurrently. Each table is replaced wholesale; a
    /// table whose fetch failed is reset to the built-in default and the
    /// whole load reports [`DashboardError::ConfigUnavailable`].
    pub async fn load(&mut self, backend: &dyn Backend) -> Result<(), DashboardError> {
        let (parameters, locations) =
            tokio::join!(backend.sensor_config(), backend.sensor_locations());

        let mut failures = Vec::new();

        match parameters {
            Ok(parameters) if !parameters.is_empty() => self.set_parameters(parameters),
            Ok(_) => {
                failures.push("sensor config is empty".to_string());
                self.set_parameters(builtin_parameters());
            }
            Err(e) => {
                failures.push(e.to_string());
                self.set_parameters(builtin_parameters());
            }
        }

        match locations {
            Ok(locations) if !locations.is_empty() => self.set_locations(locations),
            Ok(_) => {
                failures.push("sensor locations are empty".to_string());
                self.set_locations(builtin_locations());
            }
            Err(e) => {
                failures.push(e.to_string());
                self.set_locations(builtin_locations());
            }
        }

        self.degraded = !failures.is_empty();

        if failures.is_empty() {
            info!(
                parameters = self.parameters.len(),
                locations = self.locations.len(),
                "Loaded sensor configuration from {}",
                backend.description()
            );
            Ok(())
        } else {
            let reason = failures.join("; ");
            warn!(%reason, "Using built-in sensor configuration");
            Err(DashboardError::ConfigUnavailable(reason))
        }
    }

    /// Look up the configuration for a parameter.
    ///
    /// Unknown keys get `[0, 100]` with no unit. This never fails because
    /// callers run inside view updates.
    pub fn get(&self, parameter_key: &str) -> Cow<'_, ParameterConfig> {
        match self.parameters.iter().find(|p| p.key == parameter_key) {
            Some(cfg) => Cow::Borrowed(cfg),
            None => {
                warn!(parameter = parameter_key, "Unknown parameter, using default range");
                Cow::Owned(ParameterConfig::fallback(parameter_key))
            }
        }
    }

    /// All known parameters in display order.
    pub fn parameters(&self) -> &[ParameterConfig] {
        &self.parameters
    }

    /// Keys of all known parameters in display order.
    pub fn parameter_keys(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().map(|p| p.key.as_str())
    }

    pub fn is_known(&self, parameter_key: &str) -> bool {
        self.parameters.iter().any(|p| p.key == parameter_key)
    }

    /// All sensor locations, ordered by sensor id.
    pub fn locations(&self) -> &[SensorLocation] {
        &self.locations
    }

    pub fn location(&self, sensor_id: SensorId) -> Option<&SensorLocation> {
        self.locations.iter().find(|l| l.sensor_id == sensor_id)
    }

    /// Resolve a chart dataset label (display name, alias or raw key) to a
    /// parameter key.
    pub fn key_for_label(&self, label: &str) -> Option<&str> {
        let label = label.trim();
        self.parameters
            .iter()
            .find(|p| p.answers_to(label))
            .map(|p| p.key.as_str())
    }

    /// True when at least one table is the built-in fallback.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    fn set_parameters(&mut self, mut parameters: Vec<ParameterConfig>) {
        parameters.sort_by(|a, b| {
            canonical_rank(&a.key)
                .cmp(&canonical_rank(&b.key))
                .then_with(|| a.key.cmp(&b.key))
        });
        self.parameters = parameters;
    }

    fn set_locations(&mut self, mut locations: Vec<SensorLocation>) {
        locations.sort_by_key(|l| l.sensor_id);
        self.locations = locations;
    }
}

fn canonical_rank(key: &str) -> usize {
    CANONICAL_PARAMETERS
        .iter()
        .position(|k| *k == key)
        .unwrap_or(CANONICAL_PARAMETERS.len())
}

fn builtin_parameters() -> Vec<ParameterConfig> {
    vec![
        ParameterConfig::new("temperature", "Temperature", "°C", 18.0, 24.0)
            .with_alias("Температура"),
        ParameterConfig::new("pressure", "Pressure", "kPa", 98.0, 105.0).with_alias("Давление"),
        ParameterConfig::new("humidity", "Humidity", "%", 30.0, 60.0).with_alias("Влажность"),
        ParameterConfig::new("gas_composition", "CO₂ level", "ppm", 400.0, 600.0)
            .with_alias("Уровень CO₂"),
        ParameterConfig::new("noise_level", "Noise level", "dB", 0.0, 60.0)
            .with_alias("Уровень шума"),
    ]
}

fn builtin_locations() -> Vec<SensorLocation> {
    [
        (1, "Sensor #1 - Main building", 43.414283, 39.950436),
        (2, "Sensor #2 - Laboratory", 43.4145, 39.951),
        (3, "Sensor #3 - Warehouse", 43.4138, 39.9498),
        (4, "Sensor #4 - Parking", 43.415, 39.9508),
        (5, "Sensor #5 - Office", 43.414, 39.9512),
    ]
    .into_iter()
    .map(|(id, name, latitude, longitude)| SensorLocation {
        sensor_id: SensorId::Historical(id),
        display_name: name.to_string(),
        latitude,
        longitude,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::ScriptedBackend;

    #[test]
    fn test_builtin_has_five_parameters_in_order() {
        let store = ConfigStore::builtin();
        let keys: Vec<&str> = store.parameter_keys().collect();
        assert_eq!(keys, CANONICAL_PARAMETERS.to_vec());
        assert_eq!(store.locations().len(), 5);
        assert!(!store.is_degraded());
    }

    #[test]
    fn test_get_unknown_key_returns_default_range() {
        let store = ConfigStore::builtin();
        let cfg = store.get("radiation");
        assert_eq!(cfg.norm_min, 0.0);
        assert_eq!(cfg.norm_max, 100.0);
        assert_eq!(cfg.unit, "");
    }

    #[test]
    fn test_parameters_sorted_canonically() {
        let store = ConfigStore::new(
            vec![
                ParameterConfig::new("zeta", "Zeta", "", 0.0, 1.0),
                ParameterConfig::new("noise_level", "Noise", "dB", 0.0, 60.0),
                ParameterConfig::new("alpha", "Alpha", "", 0.0, 1.0),
                ParameterConfig::new("temperature", "Temp", "°C", 18.0, 24.0),
            ],
            Vec::new(),
        );
        let keys: Vec<&str> = store.parameter_keys().collect();
        assert_eq!(keys, vec!["temperature", "noise_level", "alpha", "zeta"]);
    }

    #[test]
    fn test_key_for_label() {
        let store = ConfigStore::builtin();
        assert_eq!(store.key_for_label("Humidity"), Some("humidity"));
        assert_eq!(store.key_for_label("gas_composition"), Some("gas_composition"));
        assert_eq!(store.key_for_label("Altitude"), None);
    }

    #[test]
    fn test_builtin_resolves_deployment_labels() {
        let store = ConfigStore::builtin();
        assert_eq!(store.key_for_label("Температура"), Some("temperature"));
        assert_eq!(store.key_for_label(" Давление "), Some("pressure"));
        assert_eq!(store.key_for_label("Влажность"), Some("humidity"));
        assert_eq!(store.key_for_label("Уровень CO₂"), Some("gas_composition"));
        assert_eq!(store.key_for_label("Уровень шума"), Some("noise_level"));
    }

    #[tokio::test]
    async fn test_load_replaces_tables() {
        let backend = ScriptedBackend::new();
        backend.set_config(Ok(vec![ParameterConfig::new(
            "temperature",
            "Temperature",
            "°C",
            10.0,
            30.0,
        )]));

        let mut store = ConfigStore::builtin();
        store.load(&backend).await.unwrap();

        assert_eq!(store.parameters().len(), 1);
        assert_eq!(store.get("temperature").norm_max, 30.0);
        assert!(!store.is_degraded());
    }

    #[tokio::test]
    async fn test_load_failure_falls_back_to_builtin() {
        let backend = ScriptedBackend::new();
        backend.set_config(Err(DashboardError::ConfigUnavailable(
            "missing norm_max for humidity".to_string(),
        )));

        let mut store = ConfigStore::new(Vec::new(), Vec::new());
        let err = store.load(&backend).await.unwrap_err();

        assert!(matches!(err, DashboardError::ConfigUnavailable(_)));
        assert!(store.is_degraded());
        assert_eq!(store.parameters().len(), 5);
        assert_eq!(store.get("humidity").norm_max, 60.0);
        // Locations came back fine and are kept.
        assert_eq!(store.locations().len(), backend.locations_len());
    }
}
