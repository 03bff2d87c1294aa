//! Default configuration values
//!
//! Named constants for all tunable parameters

use crate::constants::{geo, timing};

/// Default gateway base URL (the bundled demo gateway)
pub const DEFAULT_GATEWAY_URL: &str = "http://127.0.0.1:7979/api";

/// Default per-call gateway timeout in milliseconds
pub const DEFAULT_GATEWAY_TIMEOUT_MS: u64 = timing::GATEWAY_TIMEOUT_MS;

/// Default search debounce window in milliseconds
pub const DEFAULT_DEBOUNCE_MS: u64 = timing::SEARCH_DEBOUNCE_MS;

/// Maximum number of catalog matches returned by the offline fallback
pub const DEFAULT_FALLBACK_LIMIT: usize = 8;

/// Default tracking tick period in milliseconds
pub const DEFAULT_TICK_MS: u64 = timing::TRACKING_TICK_MS;

/// Default arrival radius in kilometers
pub const DEFAULT_ARRIVAL_THRESHOLD_KM: f64 = geo::ARRIVAL_THRESHOLD_KM;

/// Default average speed for ETA estimates
pub const DEFAULT_AVERAGE_SPEED_KMH: f64 = geo::AVERAGE_SPEED_KMH;

/// Default cap on the number of route trace points kept
pub const DEFAULT_MAX_TRACE_LEN: usize = 500;

/// Default position source
pub const DEFAULT_POSITION_SOURCE: &str = "simulated";

/// Default random jitter (degrees) applied by the simulator per tick
pub const DEFAULT_JITTER_DEGREES: f64 = 0.0005;

/// Default fraction of the remaining distance the simulator covers per tick
pub const DEFAULT_APPROACH_FRACTION: f64 = 0.25;

/// Default demo server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default demo server port
pub const DEFAULT_PORT: u16 = 7979;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "pickup-radar";
