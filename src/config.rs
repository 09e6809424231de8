//! Configuration types for live-prices

use crate::feed::DEFAULT_FEED_URL;
use crate::telemetry::LogFormat;
use crate::ws::WsConfig;
use serde::Deserialize;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Feed endpoint and reconnection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// WebSocket endpoint
    #[serde(default = "default_url")]
    pub url: String,

    /// Delay before reconnecting after a close (seconds)
    #[serde(default = "default_reconnect_delay_secs")]
    pub reconnect_delay_secs: f64,

    /// Maximum reconnection attempts (0 = unlimited)
    #[serde(default)]
    pub max_reconnect_attempts: u32,

    /// Delay growth per attempt (1.0 = fixed delay)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Cap on the reconnection delay (seconds)
    #[serde(default = "default_max_reconnect_delay_secs")]
    pub max_reconnect_delay_secs: f64,

    /// How often the server pushes prices; shown in the dashboard footer
    #[serde(default = "default_expected_update_interval_secs")]
    pub expected_update_interval_secs: u64,
}

fn default_url() -> String {
    DEFAULT_FEED_URL.to_string()
}
fn default_reconnect_delay_secs() -> f64 {
    5.0
}
fn default_backoff_multiplier() -> f64 {
    1.0
}
fn default_max_reconnect_delay_secs() -> f64 {
    60.0
}
fn default_expected_update_interval_secs() -> u64 {
    60
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            reconnect_delay_secs: default_reconnect_delay_secs(),
            max_reconnect_attempts: 0,
            backoff_multiplier: default_backoff_multiplier(),
            max_reconnect_delay_secs: default_max_reconnect_delay_secs(),
            expected_update_interval_secs: default_expected_update_interval_secs(),
        }
    }
}

impl FeedConfig {
    /// Build the WebSocket client configuration
    pub fn ws_config(&self) -> anyhow::Result<WsConfig> {
        let delay = Duration::try_from_secs_f64(self.reconnect_delay_secs).map_err(|e| {
            anyhow::anyhow!("invalid reconnect_delay_secs {}: {}", self.reconnect_delay_secs, e)
        })?;
        let max_delay = Duration::try_from_secs_f64(self.max_reconnect_delay_secs).map_err(|e| {
            anyhow::anyhow!(
                "invalid max_reconnect_delay_secs {}: {}",
                self.max_reconnect_delay_secs,
                e
            )
        })?;

        Ok(WsConfig::new(&self.url)
            .reconnect_delay(delay)
            .max_reconnects(self.max_reconnect_attempts)
            .backoff(self.backoff_multiplier)
            .max_delay(max_delay))
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            metrics_port: None,
        }
    }
}

/// Fallback used when no config file can be loaded
pub const EXAMPLE_CONFIG: &str = include_str!("../config.toml.example");

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// The bundled `config.toml.example`
    pub fn example() -> anyhow::Result<Self> {
        Ok(toml::from_str(EXAMPLE_CONFIG)?)
    }
}
