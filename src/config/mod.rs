//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/pickup-radar/config.toml

pub mod defaults;

use crate::error::{Error, Result};
use defaults::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Places/geocoding gateway settings
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Location search client settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Tracking poller settings
    #[serde(default)]
    pub tracking: TrackingConfig,

    /// Demo gateway server settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Gateway settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Base URL the endpoint paths are appended to
    #[serde(default = "default_gateway_url")]
    pub base_url: String,

    /// Per-call timeout in milliseconds
    #[serde(default = "default_gateway_timeout")]
    pub timeout_ms: u64,
}

/// Search client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Quiet period before a search fires
    #[serde(default = "default_debounce")]
    pub debounce_ms: u64,

    /// Maximum number of offline fallback matches
    #[serde(default = "default_fallback_limit")]
    pub fallback_limit: usize,
}

/// Tracking settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Position update period in milliseconds
    #[serde(default = "default_tick")]
    pub tick_ms: u64,

    /// Arrival radius in kilometers
    #[serde(default = "default_arrival_threshold")]
    pub arrival_threshold_km: f64,

    /// Average speed used for ETA estimates
    #[serde(default = "default_average_speed")]
    pub average_speed_kmh: f64,

    /// Maximum number of route trace points kept
    #[serde(default = "default_max_trace_len")]
    pub max_trace_len: usize,

    /// Position source: "simulated" or "gateway"
    #[serde(default = "default_position_source")]
    pub position_source: String,

    /// Simulator random jitter per tick, in degrees
    #[serde(default = "default_jitter")]
    pub jitter_degrees: f64,

    /// Simulator approach fraction per tick (0 = pure random walk)
    #[serde(default = "default_approach_fraction")]
    pub approach_fraction: f64,

    /// Optional simulator seed for reproducible runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

// Default value functions for serde
fn default_gateway_url() -> String {
    DEFAULT_GATEWAY_URL.to_string()
}
fn default_gateway_timeout() -> u64 {
    DEFAULT_GATEWAY_TIMEOUT_MS
}
fn default_debounce() -> u64 {
    DEFAULT_DEBOUNCE_MS
}
fn default_fallback_limit() -> usize {
    DEFAULT_FALLBACK_LIMIT
}
fn default_tick() -> u64 {
    DEFAULT_TICK_MS
}
fn default_arrival_threshold() -> f64 {
    DEFAULT_ARRIVAL_THRESHOLD_KM
}
fn default_average_speed() -> f64 {
    DEFAULT_AVERAGE_SPEED_KMH
}
fn default_max_trace_len() -> usize {
    DEFAULT_MAX_TRACE_LEN
}
fn default_position_source() -> String {
    DEFAULT_POSITION_SOURCE.to_string()
}
fn default_jitter() -> f64 {
    DEFAULT_JITTER_DEGREES
}
fn default_approach_fraction() -> f64 {
    DEFAULT_APPROACH_FRACTION
}
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_gateway_url(),
            timeout_ms: default_gateway_timeout(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce(),
            fallback_limit: default_fallback_limit(),
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick(),
            arrival_threshold_km: default_arrival_threshold(),
            average_speed_kmh: default_average_speed(),
            max_trace_len: default_max_trace_len(),
            position_source: default_position_source(),
            jitter_degrees: default_jitter(),
            approach_fraction: default_approach_fraction(),
            seed: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from a specific path, writing defaults if missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("Failed to read config file: {}", e))
            })?;

            toml::from_str(&content).map_err(|e| {
                Error::Config(format!("Failed to parse config file: {}", e))
            })
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            Error::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, content).map_err(|e| {
            Error::Config(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["gateway", "base_url"] => Some(self.gateway.base_url.clone()),
            ["gateway", "timeout_ms"] => Some(self.gateway.timeout_ms.to_string()),

            ["search", "debounce_ms"] => Some(self.search.debounce_ms.to_string()),
            ["search", "fallback_limit"] => Some(self.search.fallback_limit.to_string()),

            ["tracking", "tick_ms"] => Some(self.tracking.tick_ms.to_string()),
            ["tracking", "arrival_threshold_km"] => {
                Some(self.tracking.arrival_threshold_km.to_string())
            }
            ["tracking", "average_speed_kmh"] => Some(self.tracking.average_speed_kmh.to_string()),
            ["tracking", "max_trace_len"] => Some(self.tracking.max_trace_len.to_string()),
            ["tracking", "position_source"] => Some(self.tracking.position_source.clone()),
            ["tracking", "jitter_degrees"] => Some(self.tracking.jitter_degrees.to_string()),
            ["tracking", "approach_fraction"] => Some(self.tracking.approach_fraction.to_string()),
            ["tracking", "seed"] => Some(
                self.tracking
                    .seed
                    .map(|s| s.to_string())
                    .unwrap_or_default(),
            ),

            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["gateway", "base_url"] => {
                self.gateway.base_url = value.trim_end_matches('/').to_string();
            }
            ["gateway", "timeout_ms"] => {
                self.gateway.timeout_ms = parse_value(key, value)?;
            }

            ["search", "debounce_ms"] => {
                self.search.debounce_ms = parse_value(key, value)?;
            }
            ["search", "fallback_limit"] => {
                self.search.fallback_limit = parse_value(key, value)?;
            }

            ["tracking", "tick_ms"] => {
                let tick: u64 = parse_value(key, value)?;
                if tick == 0 {
                    return Err(Error::Config("tracking.tick_ms must be positive".to_string()));
                }
                self.tracking.tick_ms = tick;
            }
            ["tracking", "arrival_threshold_km"] => {
                self.tracking.arrival_threshold_km = parse_value(key, value)?;
            }
            ["tracking", "average_speed_kmh"] => {
                let speed: f64 = parse_value(key, value)?;
                if speed <= 0.0 {
                    return Err(Error::Config(
                        "tracking.average_speed_kmh must be positive".to_string(),
                    ));
                }
                self.tracking.average_speed_kmh = speed;
            }
            ["tracking", "max_trace_len"] => {
                self.tracking.max_trace_len = parse_value(key, value)?;
            }
            ["tracking", "position_source"] => {
                let kind: crate::tracking::source::SourceKind = value.parse().map_err(Error::Config)?;
                self.tracking.position_source = kind.to_string();
            }
            ["tracking", "jitter_degrees"] => {
                self.tracking.jitter_degrees = parse_value(key, value)?;
            }
            ["tracking", "approach_fraction"] => {
                self.tracking.approach_fraction = parse_value(key, value)?;
            }
            ["tracking", "seed"] => {
                self.tracking.seed = if value.is_empty() {
                    None
                } else {
                    Some(parse_value(key, value)?)
                };
            }

            ["server", "host"] => {
                self.server.host = value.to_string();
            }
            ["server", "port"] => {
                self.server.port = parse_value(key, value)?;
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "gateway.base_url",
            "gateway.timeout_ms",
            "search.debounce_ms",
            "search.fallback_limit",
            "tracking.tick_ms",
            "tracking.arrival_threshold_km",
            "tracking.average_speed_kmh",
            "tracking.max_trace_len",
            "tracking.position_source",
            "tracking.jitter_degrees",
            "tracking.approach_fraction",
            "tracking.seed",
            "server.host",
            "server.port",
        ]
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("Invalid value for {}: {}", key, value)))
}
