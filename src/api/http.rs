//! HTTP implementation of [`Backend`] using the dashboard REST API.
//!
//! ## Example
//!
//! ```rust,no_run
//! use sensorwatch::api::{Backend, HttpBackend};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = HttpBackend::builder()
//!         .endpoint("http://127.0.0.1:5000")
//!         .build()?;
//!
//!     for reading in backend.latest().await? {
//!         println!("{}: {} values", reading.sensor_id, reading.values.len());
//!     }
//!
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::wire;
use super::{AdminAction, AdminOutcome, Backend};
use crate::data::{
    ParameterConfig, Reading, SensorHistory, SensorId, SensorLocation, SensorStats, SystemStats,
};
use crate::error::{DashboardError, TransportError};

/// Backend reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    endpoint: String,
    description: String,
}

impl HttpBackend {
    /// Create a new builder for configuring the backend.
    pub fn builder() -> HttpBackendBuilder {
        HttpBackendBuilder::default()
    }

    /// Base URL requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, TransportError> {
        let url = format!("{}{}", self.endpoint, path);
        debug!(%url, "GET");

        let response = self.client.get(&url).query(query).send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.json::<Value>().await?);
        }

        // Error payloads carry a readable reason even on non-2xx responses.
        match response.json::<Value>().await {
            Ok(body) if wire::error_message(&body).is_some() => Ok(body),
            _ => Err(TransportError::Http(format!("API returned status {}", status))),
        }
    }

    async fn fetch(
        &self,
        path: &str,
        query: &[(&str, String)],
        classify: fn(String) -> DashboardError,
    ) -> Result<Value, DashboardError> {
        self.get_json(path, query)
            .await
            .map_err(|e| classify(format!("{}: {}", path, e)))
    }
}

#[async_trait]
impl Backend for HttpBackend {
    fn description(&self) -> &str {
        &self.description
    }

    async fn sensor_config(&self) -> Result<Vec<ParameterConfig>, DashboardError> {
        let body = self
            .fetch("/api/sensor_config", &[], DashboardError::ConfigUnavailable)
            .await?;
        wire::parse_sensor_config(body)
    }

    async fn sensor_locations(&self) -> Result<Vec<SensorLocation>, DashboardError> {
        let body = self
            .fetch("/api/sensor_locations", &[], DashboardError::ConfigUnavailable)
            .await?;
        wire::parse_sensor_locations(body)
    }

    async fn latest(&self) -> Result<Vec<Reading>, DashboardError> {
        let body = self
            .fetch("/api/latest", &[], DashboardError::DataUnavailable)
            .await?;
        wire::parse_latest(body)
    }

    async fn sensor_history(
        &self,
        sensor_id: SensorId,
        hours: u32,
    ) -> Result<SensorHistory, DashboardError> {
        let path = format!("/api/sensor/{}", sensor_id.wire_id());
        let body = self
            .fetch(
                &path,
                &[("hours", hours.to_string())],
                DashboardError::DataUnavailable,
            )
            .await?;
        wire::parse_history(body)
    }

    async fn sensor_stats(&self, sensor_id: SensorId) -> Result<SensorStats, DashboardError> {
        let path = format!("/api/sensor/{}/stats", sensor_id.wire_id());
        let body = self
            .fetch(&path, &[], DashboardError::DataUnavailable)
            .await?;
        wire::parse_stats(body)
    }

    async fn live_latest(&self) -> Result<Reading, DashboardError> {
        let body = self
            .fetch("/api/real_sensor/latest", &[], DashboardError::DataUnavailable)
            .await?;
        wire::parse_live(body)
    }

    async fn system_stats(&self) -> Result<SystemStats, DashboardError> {
        let body = self
            .fetch("/api/system_stats", &[], DashboardError::DataUnavailable)
            .await?;
        wire::parse_system_stats(body)
    }

    async fn admin(&self, action: AdminAction) -> Result<AdminOutcome, DashboardError> {
        let (path, query) = match action {
            AdminAction::GenerateTestData { days } => {
                ("/api/generate_test_data", vec![("days", days.to_string())])
            }
            AdminAction::ClearData => ("/api/clear_data", Vec::new()),
            AdminAction::ClearLiveData => ("/api/clear_real_sensor_data", Vec::new()),
        };
        let body = self
            .fetch(path, &query, DashboardError::AdminActionFailed)
            .await?;
        wire::parse_admin(body)
    }
}

/// Builder for HttpBackend.
#[derive(Debug, Default)]
pub struct HttpBackendBuilder {
    endpoint: Option<String>,
    timeout: Option<Duration>,
}

impl HttpBackendBuilder {
    /// Set the backend base URL (e.g., "http://127.0.0.1:5000").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the backend.
    pub fn build(self) -> Result<HttpBackend, TransportError> {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(10));

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        let endpoint = self
            .endpoint
            .unwrap_or_else(|| "http://127.0.0.1:5000".to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(HttpBackend {
            client,
            description: format!("http: {}", endpoint),
            endpoint,
        })
    }
}
