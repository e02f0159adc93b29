//! Error types for the dashboard.

use thiserror::Error;

/// Errors surfaced to the dashboard, classified by how the UI degrades.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DashboardError {
    /// Sensor configuration or locations could not be fetched or were malformed.
    ///
    /// The store falls back to its built-in tables.
    #[error("Sensor configuration unavailable: {0}")]
    ConfigUnavailable(String),

    /// A per-sensor or per-poll fetch failed or returned an error payload.
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    /// An administrative action (generate/clear data) reported failure.
    #[error("Admin action failed: {0}")]
    AdminActionFailed(String),
}

/// Low-level failures talking to the backend.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed or returned a non-success status.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Failed to decode the response body.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connection(err.to_string())
        } else if err.is_decode() {
            TransportError::Parse(err.to_string())
        } else {
            TransportError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        TransportError::Parse(err.to_string())
    }
}

impl DashboardError {
    /// Short label used in the status bar.
    pub fn kind(&self) -> &'static str {
        match self {
            DashboardError::ConfigUnavailable(_) => "config",
            DashboardError::DataUnavailable(_) => "data",
            DashboardError::AdminActionFailed(_) => "admin",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_detail() {
        let err = DashboardError::DataUnavailable("sensor 3 returned an error".to_string());
        assert_eq!(err.to_string(), "Data unavailable: sensor 3 returned an error");
        assert_eq!(err.kind(), "data");
    }

    #[test]
    fn test_json_error_maps_to_parse() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(TransportError::from(err), TransportError::Parse(_)));
    }
}
