//! Configuration types for halving-sentinel

use crate::feed::{ticker_url, BINANCE_WS_URL, DEFAULT_SYMBOL};
use crate::flash::DEFAULT_FLASH_RESET;
use crate::project::Projection;
use crate::telemetry::LogFormat;
use crate::ws::{BackoffPolicy, WsConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub reconnect: ReconnectConfig,
    #[serde(default)]
    pub flash: FlashConfig,
    #[serde(default = "default_widgets")]
    pub widgets: Vec<WidgetConfig>,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Upstream ticker stream configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// WebSocket base URL; the stream path is appended
    #[serde(default = "default_feed_url")]
    pub url: String,
    #[serde(default = "default_symbol")]
    pub symbol: String,
}

fn default_feed_url() -> String {
    BINANCE_WS_URL.to_string()
}
fn default_symbol() -> String {
    DEFAULT_SYMBOL.to_string()
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_feed_url(),
            symbol: default_symbol(),
        }
    }
}

impl FeedConfig {
    /// Full stream URL, e.g. `wss://.../ws/btcusdt@ticker`
    pub fn stream_url(&self) -> String {
        ticker_url(&self.url, &self.symbol)
    }
}

/// Reconnect schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffStrategy {
    #[default]
    Fixed,
    Exponential,
}

/// Reconnection and keepalive configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconnectConfig {
    #[serde(default)]
    pub strategy: BackoffStrategy,

    /// Delay before a reconnect (initial delay for exponential)
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Cap for exponential backoff
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Consecutive failures before giving up (0 = never)
    #[serde(default)]
    pub max_attempts: u32,

    /// Keepalive ping interval (0 disables pings)
    #[serde(default = "default_ping_interval_secs")]
    pub ping_interval_secs: u64,
}

fn default_delay_ms() -> u64 {
    3000
}
fn default_max_delay_ms() -> u64 {
    60_000
}
fn default_ping_interval_secs() -> u64 {
    30
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            strategy: BackoffStrategy::Fixed,
            delay_ms: default_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            max_attempts: 0,
            ping_interval_secs: default_ping_interval_secs(),
        }
    }
}

impl ReconnectConfig {
    pub fn backoff_policy(&self) -> BackoffPolicy {
        let delay = Duration::from_millis(self.delay_ms);
        match self.strategy {
            BackoffStrategy::Fixed => BackoffPolicy::Fixed(delay),
            BackoffStrategy::Exponential => BackoffPolicy::Exponential {
                initial: delay,
                max: Duration::from_millis(self.max_delay_ms).max(delay),
            },
        }
    }
}

/// Direction flash configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlashConfig {
    #[serde(default = "default_reset_ms")]
    pub reset_ms: u64,
}

fn default_reset_ms() -> u64 {
    DEFAULT_FLASH_RESET.as_millis() as u64
}

impl Default for FlashConfig {
    fn default() -> Self {
        Self {
            reset_ms: default_reset_ms(),
        }
    }
}

impl FlashConfig {
    pub fn reset_after(&self) -> Duration {
        Duration::from_millis(self.reset_ms)
    }
}

/// One dashboard widget fed by the shared connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetConfig {
    pub name: String,
    #[serde(default)]
    pub projection: Projection,
}

fn default_widgets() -> Vec<WidgetConfig> {
    vec![WidgetConfig {
        name: "btc".to_string(),
        projection: Projection::Identity,
    }]
}

/// Telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Prometheus exporter port; no exporter when unset
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

impl Default for Config {
    fn default() -> Self {
        Self {
            feed: FeedConfig::default(),
            reconnect: ReconnectConfig::default(),
            flash: FlashConfig::default(),
            widgets: default_widgets(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// WebSocket settings for the shared feed connection
    pub fn ws_config(&self) -> WsConfig {
        let ws = WsConfig::new(self.feed.stream_url())
            .max_reconnects(self.reconnect.max_attempts)
            .backoff(self.reconnect.backoff_policy());

        match self.reconnect.ping_interval_secs {
            0 => ws.without_ping(),
            secs => ws.ping_interval(Duration::from_secs(secs)),
        }
    }
}
