//! Centralized constants for the pickup-radar crate
//!
//! Values shared across the search client, the tracking poller and the
//! demo gateway live here so the numbers stay in one place.

/// Geographic constants
pub mod geo {
    /// Mean Earth radius in kilometers
    pub const EARTH_RADIUS_KM: f64 = 6371.0;

    /// Distance below which a recycler counts as arrived
    pub const ARRIVAL_THRESHOLD_KM: f64 = 0.05;

    /// Assumed average recycler speed for ETA estimates
    pub const AVERAGE_SPEED_KMH: f64 = 30.0;

    /// Reverse geocoding only names a catalog place within this radius
    pub const REVERSE_GEOCODE_RADIUS_KM: f64 = 2.0;
}

/// Gateway endpoint paths (relative to the configured base URL)
pub mod api {
    pub const SEARCH_PATH: &str = "/locations/search";
    pub const DETAILS_PATH: &str = "/locations/details";
    pub const REVERSE_GEOCODE_PATH: &str = "/locations/reverse-geocode";
    pub const COLLECTIONS_PATH: &str = "/waste-collections";

    /// Sentinel label returned when reverse geocoding fails
    pub const UNKNOWN_LOCATION: &str = "Unknown Location";
}

/// Timing settings
pub mod timing {
    /// Quiet period before a search actually fires
    pub const SEARCH_DEBOUNCE_MS: u64 = 300;

    /// Tracking position update period
    pub const TRACKING_TICK_MS: u64 = 3000;

    /// Upper bound on a single gateway round trip
    pub const GATEWAY_TIMEOUT_MS: u64 = 8000;
}
