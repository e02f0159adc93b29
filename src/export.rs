//! JSON export of the evaluated dashboard state.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;
use tracing::{info, warn};

use crate::api::Backend;
use crate::data::{ConfigStore, Reading, SensorId, SensorStatus, Status, StatusEvaluator, SystemStats};

/// Counts of sensors per status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    pub total_sensors: usize,
    pub normal: usize,
    pub warning: usize,
    pub no_data: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportSensor {
    pub sensor_id: u32,
    pub live: bool,
    pub display_name: String,
    pub status: Status,
    pub timestamp: Option<String>,
    pub values: BTreeMap<String, f64>,
    pub out_of_range: Vec<String>,
}

/// Snapshot written by `--export` and the `e` key.
#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    pub generated_at: String,
    pub backend: String,
    pub degraded_config: bool,
    pub summary: ExportSummary,
    pub system: Option<SystemStats>,
    pub sensors: Vec<ExportSensor>,
}

impl ExportReport {
    pub fn build<'a>(
        store: &ConfigStore,
        statuses: impl IntoIterator<Item = &'a SensorStatus>,
        system: Option<SystemStats>,
        backend: &str,
    ) -> Self {
        let evaluator = StatusEvaluator::new(store);
        let mut summary = ExportSummary::default();

        let sensors: Vec<ExportSensor> = statuses
            .into_iter()
            .map(|s| {
                summary.total_sensors += 1;
                match s.status {
                    Status::Normal => summary.normal += 1,
                    Status::Warning => summary.warning += 1,
                    Status::NoData => summary.no_data += 1,
                }
                let id = s.reading.sensor_id;
                ExportSensor {
                    sensor_id: id.wire_id(),
                    live: id.is_live(),
                    display_name: store
                        .location(id)
                        .map(|l| l.display_name.clone())
                        .unwrap_or_else(|| id.to_string()),
                    status: s.status,
                    timestamp: s.reading.timestamp.map(|ts| ts.to_string()),
                    values: s.reading.values.clone(),
                    out_of_range: evaluator.out_of_range(&s.reading),
                }
            })
            .collect();

        Self {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            backend: backend.to_string(),
            degraded_config: store.is_degraded(),
            summary,
            system,
            sensors,
        }
    }

    /// Write as pretty-printed JSON.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write export to {}", path.display()))?;
        Ok(())
    }
}

/// Fetch configuration and latest readings once, evaluate them, and write
/// the report. Used by `--export`; no terminal UI is started.
pub async fn export_once(backend: &dyn Backend, path: &Path) -> Result<ExportReport> {
    let mut store = ConfigStore::builtin();
    if let Err(e) = store.load(backend).await {
        warn!(error = %e, "Exporting with built-in configuration");
    }

    let (latest, system) = tokio::join!(backend.latest(), backend.system_stats());
    let latest = latest.context("Failed to fetch latest readings")?;
    let system = match system {
        Ok(stats) => Some(stats),
        Err(e) => {
            warn!(error = %e, "System stats unavailable");
            None
        }
    };

    let evaluator = StatusEvaluator::new(&store);
    let mut by_sensor: BTreeMap<SensorId, Reading> =
        latest.into_iter().map(|r| (r.sensor_id, r)).collect();
    let statuses: Vec<SensorStatus> = store
        .locations()
        .iter()
        .filter(|l| !l.sensor_id.is_live())
        .map(|l| {
            let reading = by_sensor
                .remove(&l.sensor_id)
                .unwrap_or_else(|| Reading::new(l.sensor_id));
            evaluator.evaluate(reading)
        })
        .collect();

    let report = ExportReport::build(&store, &statuses, system, backend.description());
    report.write_to(path)?;
    info!(path = %path.display(), sensors = report.sensors.len(), "Exported dashboard state");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::ScriptedBackend;

    fn complete(id: u32, temperature: f64) -> Reading {
        Reading::new(SensorId::Historical(id))
            .with_value("temperature", temperature)
            .with_value("pressure", 101.0)
            .with_value("humidity", 45.0)
            .with_value("gas_composition", 500.0)
            .with_value("noise_level", 30.0)
    }

    #[test]
    fn test_summary_counts() {
        let store = ConfigStore::builtin();
        let eval = StatusEvaluator::new(&store);
        let statuses = vec![
            eval.evaluate(complete(1, 21.0)),
            eval.evaluate(complete(2, 40.0)),
            eval.evaluate(Reading::new(SensorId::Historical(3))),
        ];

        let report = ExportReport::build(&store, &statuses, None, "test");

        assert_eq!(
            report.summary,
            ExportSummary { total_sensors: 3, normal: 1, warning: 1, no_data: 1 }
        );
        assert_eq!(report.sensors[1].out_of_range, vec!["temperature".to_string()]);
        assert_eq!(report.sensors[0].display_name, "Sensor #1 - Main building");
    }

    #[tokio::test]
    async fn test_export_once_writes_file() {
        let backend = ScriptedBackend::new();
        backend.set_latest(Ok(vec![complete(1, 21.0), complete(4, 10.0)]));
        backend.set_system_stats(Ok(SystemStats { active_sensors: 2, total_records: 96 }));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");

        let report = export_once(&backend, &path).await.unwrap();

        assert_eq!(report.summary.total_sensors, 5);
        assert_eq!(report.summary.normal, 1);
        assert_eq!(report.summary.warning, 1);
        assert_eq!(report.summary.no_data, 3);

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["system"]["total_records"], 96);
        assert_eq!(written["sensors"][0]["status"], "Normal");
    }

    #[tokio::test]
    async fn test_export_once_fails_without_readings() {
        let backend = ScriptedBackend::new();
        backend.set_latest(Err(crate::error::DashboardError::DataUnavailable(
            "backend down".to_string(),
        )));
        let dir = tempfile::tempdir().unwrap();

        assert!(export_once(&backend, &dir.path().join("export.json")).await.is_err());
    }
}
