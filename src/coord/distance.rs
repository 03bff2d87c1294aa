//! Distance and ETA estimates
//!
//! Straight-line only: no road network awareness.

use crate::constants::geo::EARTH_RADIUS_KM;
use crate::coord::Coordinate;

/// Calculate the distance between two points in kilometers (Haversine formula)
///
/// # Arguments
/// * `p1` - First point
/// * `p2` - Second point
///
/// # Returns
/// Distance in kilometers on a sphere of radius 6371 km
pub fn haversine_km(p1: Coordinate, p2: Coordinate) -> f64 {
    let lat1 = p1.latitude.to_radians();
    let lat2 = p2.latitude.to_radians();
    let delta_lat = (p2.latitude - p1.latitude).to_radians();
    let delta_lng = (p2.longitude - p1.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Linear ETA in whole minutes: `round(distance / speed * 60)`
pub fn eta_minutes(distance_km: f64, average_speed_kmh: f64) -> u32 {
    if average_speed_kmh <= 0.0 || !distance_km.is_finite() {
        return 0;
    }
    (distance_km / average_speed_kmh * 60.0).round().max(0.0) as u32
}

/// Check if a point lies within `radius_km` of `center`
pub fn is_within(point: Coordinate, center: Coordinate, radius_km: f64) -> bool {
    haversine_km(point, center) <= radius_km
}
