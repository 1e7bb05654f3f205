//! Agent configuration

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use wellness_engine::anomaly::ChannelCoverage;
use wellness_engine::providers::InferenceConfig;
use wellness_engine::SessionSettings;

/// Agent configuration
///
/// Read from an optional `wellness-agent.toml` in the working directory, then
/// `WELLNESS_*` environment variables (e.g. `WELLNESS_API_PORT=9000`).
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    /// API server port for the presentation API, health and metrics
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Directory holding persisted baseline and settings
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Room-sensor feed URL; a URL persisted at runtime takes precedence
    #[serde(default)]
    pub sensor_feed_url: Option<String>,

    #[serde(default = "default_sensor_poll_interval")]
    pub sensor_poll_interval_secs: u64,

    /// Seed the session with an hour of synthetic history
    #[serde(default)]
    pub demo_data: bool,

    /// Score every emotion and environmental sub-metric, not only sadness
    /// and humidity
    #[serde(default)]
    pub monitor_all_sub_metrics: bool,

    #[serde(default)]
    pub inference_emotion_url: Option<String>,

    #[serde(default)]
    pub inference_redness_url: Option<String>,

    #[serde(default)]
    pub inference_api_key: Option<String>,

    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
}

fn default_api_port() -> u16 {
    8080
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_sensor_poll_interval() -> u64 {
    5
}

fn default_http_timeout() -> u64 {
    10
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            api_port: default_api_port(),
            data_dir: default_data_dir(),
            sensor_feed_url: None,
            sensor_poll_interval_secs: default_sensor_poll_interval(),
            demo_data: false,
            monitor_all_sub_metrics: false,
            inference_emotion_url: None,
            inference_redness_url: None,
            inference_api_key: None,
            http_timeout_secs: default_http_timeout(),
        }
    }
}

impl AgentConfig {
    /// Load configuration from the config file and environment
    pub fn load() -> Result<Self> {
        Self::load_from("wellness-agent")
    }

    /// Load from `<name>.toml` (optional) plus `WELLNESS_*` variables
    pub fn load_from(name: &str) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(name).required(false))
            .add_source(config::Environment::with_prefix("WELLNESS"))
            .build()
            .context("Failed to read agent configuration")?;

        config
            .try_deserialize()
            .context("Invalid agent configuration")
    }

    pub fn session_settings(&self) -> SessionSettings {
        let coverage = if self.monitor_all_sub_metrics {
            ChannelCoverage::all()
        } else {
            ChannelCoverage::default()
        };
        SessionSettings {
            coverage,
            ..SessionSettings::default()
        }
    }

    pub fn sensor_poll_interval(&self) -> Duration {
        Duration::from_secs(self.sensor_poll_interval_secs.max(1))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.max(1))
    }

    /// Detection endpoints, when both URLs are configured
    pub fn inference_config(&self) -> Option<InferenceConfig> {
        let emotion_url = self.inference_emotion_url.clone()?;
        let redness_url = self.inference_redness_url.clone()?;
        Some(InferenceConfig {
            emotion_url,
            redness_url,
            api_key: self.inference_api_key.clone().unwrap_or_default(),
            timeout: self.http_timeout(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_values_override_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("agent.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "api_port = 9100").unwrap();
        writeln!(file, "demo_data = true").unwrap();
        writeln!(file, "monitor_all_sub_metrics = true").unwrap();
        writeln!(file, "sensor_feed_url = \"http://sensors.local/data\"").unwrap();

        let name = dir.path().join("agent");
        let config = AgentConfig::load_from(name.to_str().unwrap()).unwrap();
        assert_eq!(config.api_port, 9100);
        assert!(config.demo_data);
        assert_eq!(config.sensor_poll_interval_secs, 5);
        assert_eq!(
            config.sensor_feed_url.as_deref(),
            Some("http://sensors.local/data")
        );
        assert_eq!(config.session_settings().coverage, ChannelCoverage::all());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let name = dir.path().join("absent");
        let config = AgentConfig::load_from(name.to_str().unwrap()).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert!(config.inference_config().is_none());
    }

    #[test]
    fn test_inference_requires_both_urls() {
        let config = AgentConfig {
            inference_emotion_url: Some("http://models/emotion".to_string()),
            ..AgentConfig::default()
        };
        assert!(config.inference_config().is_none());

        let config = AgentConfig {
            inference_redness_url: Some("http://models/redness".to_string()),
            ..config
        };
        let inference = config.inference_config().unwrap();
        assert_eq!(inference.api_key, "");
        assert_eq!(inference.timeout, Duration::from_secs(10));
    }
}
