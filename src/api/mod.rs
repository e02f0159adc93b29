//! Backend REST API abstraction.
//!
//! The dashboard talks to its backend exclusively through the [`Backend`]
//! trait. [`HttpBackend`] is the real implementation; tests use an in-memory
//! scripted backend.
//!
//! | Endpoint | Method |
//! |---|---|
//! | `/api/sensor_config` | [`Backend::sensor_config`] |
//! | `/api/sensor_locations` | [`Backend::sensor_locations`] |
//! | `/api/latest` | [`Backend::latest`] |
//! | `/api/sensor/{id}?hours=N` | [`Backend::sensor_history`] |
//! | `/api/sensor/{id}/stats` | [`Backend::sensor_stats`] |
//! | `/api/real_sensor/latest` | [`Backend::live_latest`] |
//! | `/api/system_stats` | [`Backend::system_stats`] |
//! | `/api/generate_test_data`, `/api/clear_data`, `/api/clear_real_sensor_data` | [`Backend::admin`] |

mod http;
pub mod wire;

#[cfg(test)]
pub(crate) mod testing;

pub use http::{HttpBackend, HttpBackendBuilder};

use std::fmt::{self, Debug};

use async_trait::async_trait;

use crate::data::{
    ParameterConfig, Reading, SensorHistory, SensorId, SensorLocation, SensorStats, SystemStats,
};
use crate::error::DashboardError;

/// Destructive administrative actions. Each one needs user confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction {
    /// Seed the backend with `days` of simulated readings.
    GenerateTestData { days: u32 },
    /// Delete all stored readings.
    ClearData,
    /// Delete stored readings of the live sensor.
    ClearLiveData,
}

impl AdminAction {
    /// Question shown in the confirmation dialog.
    pub fn confirmation_prompt(&self) -> String {
        match self {
            AdminAction::GenerateTestData { days } => {
                format!("Generate {} day(s) of test data? This may take a few seconds.", days)
            }
            AdminAction::ClearData => "WARNING: this deletes all stored readings.".to_string(),
            AdminAction::ClearLiveData => {
                "WARNING: this deletes all stored live sensor readings.".to_string()
            }
        }
    }
}

impl fmt::Display for AdminAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminAction::GenerateTestData { .. } => write!(f, "Generate test data"),
            AdminAction::ClearData => write!(f, "Clear data"),
            AdminAction::ClearLiveData => write!(f, "Clear live sensor data"),
        }
    }
}

/// Result of a successful admin action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdminOutcome {
    /// Records created (for generation).
    pub records: Option<u64>,
    /// Total records stored after the action, when reported.
    pub total_records: Option<u64>,
}

/// Trait for the sensor backend.
///
/// Every method maps one endpoint onto domain types. Implementations report
/// failures with the [`DashboardError`] variant the caller degrades on:
/// configuration endpoints use `ConfigUnavailable`, admin endpoints use
/// `AdminActionFailed`, everything else uses `DataUnavailable`.
#[async_trait]
pub trait Backend: Send + Sync + Debug {
    /// Returns a human-readable description of the backend.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;

    async fn sensor_config(&self) -> Result<Vec<ParameterConfig>, DashboardError>;

    async fn sensor_locations(&self) -> Result<Vec<SensorLocation>, DashboardError>;

    /// Latest reading of every sensor that has one.
    async fn latest(&self) -> Result<Vec<Reading>, DashboardError>;

    /// Time series of the last `hours` hours, oldest sample first.
    async fn sensor_history(
        &self,
        sensor_id: SensorId,
        hours: u32,
    ) -> Result<SensorHistory, DashboardError>;

    async fn sensor_stats(&self, sensor_id: SensorId) -> Result<SensorStats, DashboardError>;

    /// Latest reading of the live external sensor.
    async fn live_latest(&self) -> Result<Reading, DashboardError>;

    async fn system_stats(&self) -> Result<SystemStats, DashboardError>;

    async fn admin(&self, action: AdminAction) -> Result<AdminOutcome, DashboardError>;
}
