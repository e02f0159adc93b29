//! # sensorwatch
//!
//! A terminal dashboard for environmental sensors served by a monitoring
//! backend over HTTP.
//!
//! Sensors report temperature, pressure, humidity, gas composition and
//! noise level. Each reading is evaluated against per-parameter normal
//! ranges and shown as a colored marker on a map, a row in the sensors
//! table, and metric cards plus a history chart in the detail view.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌──────────┐  │
//! │  │  app    │───▶│   sync   │───▶│   ui    │───▶│ Terminal │  │
//! │  │ (state) │    │ (views)  │    │(render) │    │          │  │
//! │  └────┬────┘    └──────────┘    └─────────┘    └──────────┘  │
//! │       │ PollEvent ▲                                          │
//! │       ▼           │                                          │
//! │  ┌─────────┐    ┌─┴───────┐                                  │
//! │  │  poll   │───▶│   api   │◀── HttpBackend | ScriptedBackend │
//! │  │(timers) │    │(Backend)│                                  │
//! │  └─────────┘    └─────────┘                                  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`api`]**: The [`Backend`] trait and its HTTP implementation
//! - **[`poll`]**: Timers and request tokens; results arrive as [`PollEvent`]s
//! - **[`data`]**: Readings, configuration tables and status evaluation
//! - **[`sync`]**: Markers, metric cards, chart and statistics view models
//! - **[`app`]**: Selection state machine and event application
//! - **[`ui`]**: Terminal rendering using ratatui
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Watch a local backend
//! sensorwatch --backend http://127.0.0.1:5000
//!
//! # Write one evaluated snapshot and exit
//! sensorwatch --export state.json
//! ```
//!
//! ### Evaluating readings
//!
//! ```
//! use sensorwatch::{ConfigStore, Reading, SensorId, Status, StatusEvaluator};
//!
//! let store = ConfigStore::builtin();
//! let evaluator = StatusEvaluator::new(&store);
//!
//! let partial = Reading::new(SensorId::Historical(1)).with_value("temperature", 21.0);
//! assert_eq!(evaluator.evaluate(partial).status, Status::NoData);
//! ```
//!
//! ### Exporting from a backend
//!
//! ```no_run
//! use std::path::Path;
//! use sensorwatch::{export, HttpBackend};
//!
//! # tokio_test::block_on(async {
//! let backend = HttpBackend::builder()
//!     .endpoint("http://127.0.0.1:5000")
//!     .build()?;
//! let report = export::export_once(&backend, Path::new("state.json")).await?;
//! println!("{} sensors", report.summary.total_sensors);
//! # Ok::<(), anyhow::Error>(())
//! # }).unwrap();
//! ```

pub mod api;
pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod export;
pub mod logging;
pub mod poll;
pub mod sync;
pub mod ui;

// Re-export main types for convenience
pub use api::{AdminAction, Backend, HttpBackend};
pub use app::{App, Selection, View};
pub use config::DashboardConfig;
pub use data::{
    ConfigStore, ParameterConfig, Reading, SensorId, SensorLocation, SensorStatus, Status,
    StatusEvaluator,
};
pub use error::{DashboardError, TransportError};
pub use poll::{PollEvent, Poller};
