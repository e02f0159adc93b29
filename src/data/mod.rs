//! Data models and status evaluation for sensor readings.
//!
//! ## Submodules
//!
//! - [`config_store`]: Normal ranges and sensor locations ([`ConfigStore`])
//! - [`duration`]: Parsing and formatting of interval strings (e.g., "30s", "500ms")
//! - [`history`]: Per-sensor value history for sparklines
//! - [`model`]: Core types ([`SensorId`], [`Reading`], [`ParameterConfig`], ...)
//! - [`status`]: Normal/abnormal evaluation ([`StatusEvaluator`], [`Status`])
//!
//! ## Data Flow
//!
//! ```text
//! /api/latest payload
//!        │
//!        ▼
//! Reading (one per sensor)
//!        │
//!        ▼
//! StatusEvaluator::evaluate()  ◀── ConfigStore (norm ranges)
//!        │
//!        ├──▶ SensorStatus (NoData | Normal | Warning + reading)
//!        │
//!        └──▶ ReadingHistory::record() (for sparklines)
//! ```

pub mod config_store;
pub mod duration;
pub mod history;
pub mod model;
pub mod status;

pub use config_store::{ConfigStore, CANONICAL_PARAMETERS};
pub use history::ReadingHistory;
pub use model::{
    Axis, ParameterConfig, Reading, SensorHistory, SensorId, SensorLocation, SensorStats, Series,
    SystemStats, LIVE_SENSOR_WIRE_ID,
};
pub use status::{SensorStatus, Status, StatusEvaluator};
