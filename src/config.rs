//! Layered dashboard settings.
//!
//! Sources, lowest priority first:
//!
//! 1. built-in defaults
//! 2. a TOML file (`--config`, or `sensorwatch.toml` in the working directory if present)
//! 3. environment variables prefixed with `SENSORWATCH_` (e.g. `SENSORWATCH_BACKEND_URL`)
//! 4. command-line flags
//!
//! ```toml
//! backend_url = "http://127.0.0.1:5000"
//! poll_interval = "30s"
//! live_poll_interval = "5s"
//! history_hours = 24
//! request_timeout = "10s"
//! generate_days = 1
//! log_file = "sensorwatch.log"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::data::duration;

const ENV_PREFIX: &str = "SENSORWATCH";
const DEFAULT_FILE: &str = "sensorwatch";

/// Effective settings for one dashboard session.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DashboardConfig {
    /// Base URL of the backend REST API.
    pub backend_url: String,
    /// Period of the latest-readings and system-stats poll.
    #[serde(with = "duration::serde_str")]
    pub poll_interval: Duration,
    /// Period of the live sensor poll while it is selected.
    #[serde(with = "duration::serde_str")]
    pub live_poll_interval: Duration,
    /// Window of history shown in the chart.
    pub history_hours: u32,
    #[serde(with = "duration::serde_str")]
    pub request_timeout: Duration,
    /// Days of readings created by "generate test data".
    pub generate_days: u32,
    pub log_file: PathBuf,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:5000".to_string(),
            poll_interval: Duration::from_secs(30),
            live_poll_interval: Duration::from_secs(5),
            history_hours: 24,
            request_timeout: Duration::from_secs(10),
            generate_days: 1,
            log_file: PathBuf::from("sensorwatch.log"),
        }
    }
}

/// Values given on the command line. `None` leaves the lower layers alone.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub backend_url: Option<String>,
    pub poll_interval: Option<String>,
    pub live_poll_interval: Option<String>,
    pub history_hours: Option<u32>,
    pub log_file: Option<PathBuf>,
}

impl DashboardConfig {
    /// Load settings from every layer.
    ///
    /// An explicit `file` must exist; the default file is optional.
    pub fn load(file: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        Self::load_with_prefix(file, overrides, ENV_PREFIX)
    }

    fn load_with_prefix(
        file: Option<&Path>,
        overrides: &ConfigOverrides,
        env_prefix: &str,
    ) -> Result<Self> {
        let defaults = Self::default();

        let file_source = match file {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_FILE).required(false),
        };

        let settings = Config::builder()
            .set_default("backend_url", defaults.backend_url)?
            .set_default(
                "poll_interval",
                duration::format_duration(defaults.poll_interval),
            )?
            .set_default(
                "live_poll_interval",
                duration::format_duration(defaults.live_poll_interval),
            )?
            .set_default("history_hours", defaults.history_hours)?
            .set_default(
                "request_timeout",
                duration::format_duration(defaults.request_timeout),
            )?
            .set_default("generate_days", defaults.generate_days)?
            .set_default("log_file", defaults.log_file.to_string_lossy().into_owned())?
            .add_source(file_source)
            .add_source(Environment::with_prefix(env_prefix).try_parsing(true))
            .set_override_option("backend_url", overrides.backend_url.clone())?
            .set_override_option("poll_interval", overrides.poll_interval.clone())?
            .set_override_option("live_poll_interval", overrides.live_poll_interval.clone())?
            .set_override_option("history_hours", overrides.history_hours)?
            .set_override_option(
                "log_file",
                overrides
                    .log_file
                    .as_ref()
                    .map(|p| p.to_string_lossy().into_owned()),
            )?
            .build()
            .context("Failed to read configuration")?;

        let config: DashboardConfig = settings
            .try_deserialize()
            .context("Invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(self.backend_url.starts_with("http://") || self.backend_url.starts_with("https://")) {
            bail!("backend_url must be an http(s) URL, got '{}'", self.backend_url);
        }
        if self.poll_interval.is_zero() || self.live_poll_interval.is_zero() {
            bail!("Poll intervals must be greater than zero");
        }
        if self.history_hours == 0 {
            bail!("history_hours must be at least 1");
        }
        if self.generate_days == 0 {
            bail!("generate_days must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn toml_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config =
            DashboardConfig::load_with_prefix(None, &ConfigOverrides::default(), "SWTEST_DEFAULTS")
                .unwrap();
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn test_file_layer() {
        let file = toml_file(
            r#"
            backend_url = "http://sensors.local:8080"
            poll_interval = "1m"
            history_hours = 6
            "#,
        );

        let config = DashboardConfig::load_with_prefix(
            Some(file.path()),
            &ConfigOverrides::default(),
            "SWTEST_FILE",
        )
        .unwrap();

        assert_eq!(config.backend_url, "http://sensors.local:8080");
        assert_eq!(config.poll_interval, Duration::from_secs(60));
        assert_eq!(config.history_hours, 6);
        assert_eq!(config.live_poll_interval, Duration::from_secs(5));
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = toml_file("poll_interval = \"1m\"\nhistory_hours = 6\n");
        let overrides = ConfigOverrides {
            poll_interval: Some("10s".to_string()),
            history_hours: Some(48),
            ..Default::default()
        };

        let config =
            DashboardConfig::load_with_prefix(Some(file.path()), &overrides, "SWTEST_CLI").unwrap();

        assert_eq!(config.poll_interval, Duration::from_secs(10));
        assert_eq!(config.history_hours, 48);
    }

    #[test]
    fn test_env_layer() {
        std::env::set_var("SWTEST_ENV_BACKEND_URL", "http://10.0.0.5:5000");
        std::env::set_var("SWTEST_ENV_GENERATE_DAYS", "3");

        let config =
            DashboardConfig::load_with_prefix(None, &ConfigOverrides::default(), "SWTEST_ENV")
                .unwrap();

        assert_eq!(config.backend_url, "http://10.0.0.5:5000");
        assert_eq!(config.generate_days, 3);
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let err = DashboardConfig::load_with_prefix(
            Some(Path::new("/nonexistent/sensorwatch.toml")),
            &ConfigOverrides::default(),
            "SWTEST_MISSING",
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let overrides = ConfigOverrides {
            backend_url: Some("sensors.local".to_string()),
            ..Default::default()
        };
        assert!(DashboardConfig::load_with_prefix(None, &overrides, "SWTEST_URL").is_err());

        let overrides = ConfigOverrides {
            poll_interval: Some("soon".to_string()),
            ..Default::default()
        };
        assert!(DashboardConfig::load_with_prefix(None, &overrides, "SWTEST_DUR").is_err());
    }
}
