/// Runtime configuration for the flood dashboard.
///
/// Settings come from three layers, later layers winning:
///   1. built-in defaults (the public HiveMQ broker and the `enchente/nivel` topic),
///   2. an optional TOML file (`flood_dashboard.toml` unless another path is given),
///   3. `FLOOD_*` environment variables, which may also be set in a `.env` file.
///
/// Example file:
///
/// ```toml
/// broker_host = "broker.hivemq.com"
/// broker_port = 1883
/// topic = "enchente/nivel"
/// tick_interval_seconds = 5
/// history_capacity = 50
///
/// [alerts]
/// warning_cm = 150.0
/// critical_cm = 250.0
///
/// [logging]
/// level = "info"
/// file = "flood_dashboard.log"
/// ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::alert::thresholds::AlertThresholds;
use crate::logging::LogLevel;

/// Config file looked up when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "flood_dashboard.toml";

// ---------------------------------------------------------------------------
// Config types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub broker_host: String,
    pub broker_port: u16,
    pub topic: String,
    /// MQTT client identifier; a per-process id is generated when unset.
    pub client_id: Option<String>,
    pub keep_alive_secs: u64,
    pub tick_interval_seconds: u64,
    pub history_capacity: usize,
    /// Seconds without an accepted payload before the dashboard flags the sensor as silent.
    pub stale_after_seconds: u64,
    pub alerts: AlertThresholds,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    pub timestamps: bool,
}

/// Connection settings handed to the ingest listener.
#[derive(Debug, Clone, PartialEq)]
pub struct BrokerConfig {
    pub host: String,
    pub port: u16,
    pub topic: String,
    pub client_id: String,
    pub keep_alive: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            broker_host: "broker.hivemq.com".to_string(),
            broker_port: 1883,
            topic: "enchente/nivel".to_string(),
            client_id: None,
            keep_alive_secs: 60,
            tick_interval_seconds: 5,
            history_capacity: 50,
            stale_after_seconds: 60,
            alerts: AlertThresholds::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            timestamps: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    Io { path: String, message: String },
    /// The file is not valid TOML or has wrongly typed keys.
    Parse(String),
    /// A value is out of range or inconsistent with another.
    InvalidValue { key: String, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, message } => {
                write!(f, "Failed to read config file {}: {}", path, message)
            }
            ConfigError::Parse(msg) => write!(f, "Failed to parse config: {}", msg),
            ConfigError::InvalidValue { key, message } => {
                write!(f, "Invalid value for {}: {}", key, message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

fn invalid(key: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Config {
    /// Parses a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Loads a config file that must exist.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Full startup load: file, then environment overrides, then validation.
    ///
    /// A missing file falls back to defaults only when `explicit` is false,
    /// i.e. for the implicit `flood_dashboard.toml`. A path the user named
    /// must exist. Returns the config and whether a file was actually read.
    pub fn load_with_env<P: AsRef<Path>>(
        path: P,
        explicit: bool,
    ) -> Result<(Self, bool), ConfigError> {
        let path = path.as_ref();
        let from_file = explicit || path.exists();
        let mut config = if from_file {
            Self::load(path)?
        } else {
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok((config, from_file))
    }

    /// Applies `FLOOD_*` overrides using `lookup` to resolve variable names.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("FLOOD_BROKER_HOST") {
            self.broker_host = host;
        }
        if let Some(port) = lookup("FLOOD_BROKER_PORT") {
            self.broker_port = parse_override("FLOOD_BROKER_PORT", &port)?;
        }
        if let Some(topic) = lookup("FLOOD_TOPIC") {
            self.topic = topic;
        }
        if let Some(secs) = lookup("FLOOD_TICK_INTERVAL_SECONDS") {
            self.tick_interval_seconds = parse_override("FLOOD_TICK_INTERVAL_SECONDS", &secs)?;
        }
        if let Some(cap) = lookup("FLOOD_HISTORY_CAPACITY") {
            self.history_capacity = parse_override("FLOOD_HISTORY_CAPACITY", &cap)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.broker_host.trim().is_empty() {
            return Err(invalid("broker_host", "must not be empty"));
        }
        if self.broker_port == 0 {
            return Err(invalid("broker_port", "must be between 1 and 65535"));
        }
        if self.topic.trim().is_empty() {
            return Err(invalid("topic", "must not be empty"));
        }
        if self.topic.contains('+') || self.topic.contains('#') {
            return Err(invalid("topic", "wildcards are not supported, name a single topic"));
        }
        if self.tick_interval_seconds == 0 {
            return Err(invalid("tick_interval_seconds", "must be at least 1"));
        }
        if self.history_capacity == 0 {
            return Err(invalid("history_capacity", "must be at least 1"));
        }
        if self.keep_alive_secs < 5 {
            return Err(invalid("keep_alive_secs", "must be at least 5"));
        }
        self.alerts
            .validate()
            .map_err(|message| invalid("alerts", message))?;
        self.log_level()?;
        Ok(())
    }

    pub fn log_level(&self) -> Result<LogLevel, ConfigError> {
        self.logging
            .level
            .parse()
            .map_err(|message: String| invalid("logging.level", message))
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_seconds)
    }

    pub fn broker(&self) -> BrokerConfig {
        BrokerConfig {
            host: self.broker_host.clone(),
            port: self.broker_port,
            topic: self.topic.clone(),
            client_id: self
                .client_id
                .clone()
                .unwrap_or_else(|| format!("flood-dashboard-{}", std::process::id())),
            keep_alive: Duration::from_secs(self.keep_alive_secs),
        }
    }

    /// Print configuration summary
    pub fn print_summary(&self, source: &str) {
        println!("═══════════════════════════════════════════════════════════");
        println!("Flood dashboard configuration ({})", source);
        println!("  Broker:         {}:{}", self.broker_host, self.broker_port);
        println!("  Topic:          {}", self.topic);
        println!("  Tick interval:  {}s", self.tick_interval_seconds);
        println!("  History:        {} samples", self.history_capacity);
        println!(
            "  Alerts:         warning >= {} cm, critical >= {} cm",
            self.alerts.warning_cm, self.alerts.critical_cm
        );
        println!("═══════════════════════════════════════════════════════════");
    }
}

fn parse_override<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| invalid(key, format!("'{}' is not a valid number", raw)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
