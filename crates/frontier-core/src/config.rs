//! Configuration loading and typed config structures.
//!
//! The canonical configuration lives in `frontier-config.yaml` at the
//! project root. Every field has a default, so an empty or missing file
//! yields a working engine that polls `http://localhost:8000` and falls
//! back to the built-in tower layout.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is out of range.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level engine configuration, mirroring `frontier-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TowerConfig {
    /// Pulse polling and degraded-mode settings.
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Camera transition timing.
    #[serde(default)]
    pub camera: CameraConfig,

    /// Layout resource location.
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Activity-pulse API endpoint.
    #[serde(default)]
    pub pulse: PulseConfig,

    /// Optional push channel.
    #[serde(default)]
    pub push: PushConfig,

    /// Snapshot API server.
    #[serde(default)]
    pub observer: ObserverConfig,

    /// Logging output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TowerConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `PULSE_API_URL` overrides `pulse.base_url`
    /// - `NATS_URL` overrides `push.nats_url`
    /// - `LAYOUT_PATH` overrides `layout.path`
    /// - `OBSERVER_PORT` overrides `observer.port`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, applying env overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Override endpoint settings with environment variables when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("PULSE_API_URL") {
            self.pulse.base_url = val;
        }
        if let Ok(val) = std::env::var("NATS_URL") {
            self.push.nats_url = val;
        }
        if let Ok(val) = std::env::var("LAYOUT_PATH") {
            self.layout.path = Some(val);
        }
        if let Ok(val) = std::env::var("OBSERVER_PORT") {
            match val.parse() {
                Ok(port) => self.observer.port = port,
                Err(e) => tracing::warn!(value = val, error = %e, "ignoring invalid OBSERVER_PORT"),
            }
        }
    }

    /// Check value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| {
            Err(ConfigError::Invalid {
                reason: reason.to_owned(),
            })
        };
        if self.scheduler.poll_interval_ms == 0 {
            return invalid("scheduler.poll_interval_ms must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.scheduler.synthetic_delta) {
            return invalid("scheduler.synthetic_delta must be within [0, 1]");
        }
        if !matches!(
            self.scheduler.synthetic_mode.as_str(),
            "random" | "seeded" | "frozen"
        ) {
            return invalid("scheduler.synthetic_mode must be random, seeded, or frozen");
        }
        if self.camera.focus_duration_ms == 0 || self.camera.overview_duration_ms == 0 {
            return invalid("camera transition durations must be at least 1 ms");
        }
        if self.camera.frame_interval_ms == 0 {
            return invalid("camera.frame_interval_ms must be at least 1");
        }
        if self.camera.orbit_period_ms == 0 {
            return invalid("camera.orbit_period_ms must be at least 1");
        }
        Ok(())
    }
}

/// Pulse polling configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SchedulerConfig {
    /// Milliseconds between polling cycles.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Generate synthetic activity when the pulse API is unreachable.
    #[serde(default = "default_true")]
    pub synthetic_fallback: bool,

    /// Largest per-cycle change applied to a room in degraded mode.
    #[serde(default = "default_synthetic_delta")]
    pub synthetic_delta: f64,

    /// Randomness mode for degraded mode: `random`, `seeded`, or `frozen`.
    #[serde(default = "default_synthetic_mode")]
    pub synthetic_mode: String,

    /// Seed used when `synthetic_mode` is `seeded`.
    #[serde(default)]
    pub synthetic_seed: u64,
}

impl SchedulerConfig {
    /// Polling interval as a [`Duration`].
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            synthetic_fallback: true,
            synthetic_delta: default_synthetic_delta(),
            synthetic_mode: default_synthetic_mode(),
            synthetic_seed: 0,
        }
    }
}

/// Camera transition timing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CameraConfig {
    /// Duration of a transition into a focused floor.
    #[serde(default = "default_focus_duration_ms")]
    pub focus_duration_ms: u64,

    /// Duration of a transition back to the overview.
    #[serde(default = "default_overview_duration_ms")]
    pub overview_duration_ms: u64,

    /// Frame clock period.
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,

    /// Time for one full orbit in orbital mode.
    #[serde(default = "default_orbit_period_ms")]
    pub orbit_period_ms: u64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            focus_duration_ms: default_focus_duration_ms(),
            overview_duration_ms: default_overview_duration_ms(),
            frame_interval_ms: default_frame_interval_ms(),
            orbit_period_ms: default_orbit_period_ms(),
        }
    }
}

/// Layout resource location.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LayoutConfig {
    /// Path to the room layout JSON. `None` uses the built-in layout.
    #[serde(default = "default_layout_path")]
    pub path: Option<String>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            path: default_layout_path(),
        }
    }
}

/// Activity-pulse API endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PulseConfig {
    /// Base URL; floors are fetched from `{base_url}/api/floors/{key}/pulse`.
    #[serde(default = "default_pulse_base_url")]
    pub base_url: String,

    /// Per-request timeout.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            base_url: default_pulse_base_url(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// Optional push channel over NATS.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PushConfig {
    /// Whether to subscribe at all.
    #[serde(default)]
    pub enabled: bool,

    /// NATS server URL.
    #[serde(default = "default_nats_url")]
    pub nats_url: String,

    /// Subject carrying `room_activity` messages.
    #[serde(default = "default_push_subject")]
    pub subject: String,

    /// Fixed delay before reconnecting after a connection loss.
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            nats_url: default_nats_url(),
            subject: default_push_subject(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
        }
    }
}

/// Snapshot API server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObserverConfig {
    /// Bind host.
    #[serde(default = "default_observer_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_observer_port")]
    pub port: u16,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            host: default_observer_host(),
            port: default_observer_port(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: `pretty` or `json`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

const fn default_poll_interval_ms() -> u64 {
    5_000
}

const fn default_synthetic_delta() -> f64 {
    0.1
}

fn default_synthetic_mode() -> String {
    "random".to_owned()
}

const fn default_focus_duration_ms() -> u64 {
    1_500
}

const fn default_overview_duration_ms() -> u64 {
    2_000
}

const fn default_frame_interval_ms() -> u64 {
    16
}

const fn default_orbit_period_ms() -> u64 {
    60_000
}

#[allow(clippy::unnecessary_wraps)]
fn default_layout_path() -> Option<String> {
    Some("data/rooms.json".to_owned())
}

fn default_pulse_base_url() -> String {
    "http://localhost:8000".to_owned()
}

const fn default_request_timeout_ms() -> u64 {
    3_000
}

fn default_nats_url() -> String {
    "nats://localhost:4222".to_owned()
}

fn default_push_subject() -> String {
    "tower.room_activity".to_owned()
}

const fn default_reconnect_delay_ms() -> u64 {
    3_000
}

fn default_observer_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_observer_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_log_format() -> String {
    "pretty".to_owned()
}

const fn default_true() -> bool {
    true
}
