//! Geographic distance and midpoint math.
//!
//! Provides the great-circle distance used by the proximity filter and a
//! midpoint helper used for meetup-point suggestions. Distances are in
//! statute miles throughout the engine.

mod types;

pub use types::{Coordinate, GeoError, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};

use std::f64::consts::PI;

/// Earth's mean radius in statute miles.
pub const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Degrees to radians conversion factor.
const DEG_TO_RAD: f64 = PI / 180.0;

/// Great-circle distance between two coordinates in statute miles.
///
/// Uses the haversine formula on a spherical earth. Symmetric in its
/// arguments (within floating-point tolerance), and zero exactly when
/// both coordinates are equal.
pub fn distance_miles(a: Coordinate, b: Coordinate) -> f64 {
    let lat1_rad = a.latitude() * DEG_TO_RAD;
    let lat2_rad = b.latitude() * DEG_TO_RAD;
    let delta_lat = (b.latitude() - a.latitude()) * DEG_TO_RAD;
    let delta_lon = (b.longitude() - a.longitude()) * DEG_TO_RAD;

    // Haversine formula
    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().asin();

    EARTH_RADIUS_MILES * c
}

/// Approximate midpoint of two coordinates.
///
/// This is the arithmetic mean of latitude and longitude, not a geodesic
/// midpoint. It is adequate for the short distances involved in meetup
/// suggestions, but drifts for antipodal points and pairs straddling the
/// antimeridian.
pub fn midpoint(a: Coordinate, b: Coordinate) -> Coordinate {
    let latitude = (a.latitude() + b.latitude()) / 2.0;
    let longitude = (a.longitude() + b.longitude()) / 2.0;

    // Averaging two in-range values cannot leave the valid range.
    Coordinate::new(latitude, longitude).unwrap_or(a)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    // ==================== distance_miles tests ====================

    #[test]
    fn test_distance_zero_for_identical_points() {
        let a = coord(40.7128, -74.0060);
        assert_eq!(distance_miles(a, a), 0.0);
    }

    #[test]
    fn test_distance_symmetry() {
        let a = coord(40.7128, -74.0060);
        let b = coord(34.0522, -118.2437);

        let ab = distance_miles(a, b);
        let ba = distance_miles(b, a);

        assert!(
            (ab - ba).abs() < 1e-9,
            "Distance should be symmetric: {} vs {}",
            ab,
            ba
        );
    }

    #[test]
    fn test_distance_nonzero_for_distinct_points() {
        let a = coord(0.0, 0.0);
        let b = coord(0.0, 0.001);
        assert!(distance_miles(a, b) > 0.0);
    }

    #[test]
    fn test_distance_manhattan_short_hop() {
        // Lower Manhattan to the Flatiron district: about 1.8 miles
        let origin = coord(40.7128, -74.0060);
        let flatiron = coord(40.7360, -73.9911);

        let dist = distance_miles(origin, flatiron);
        assert!(
            (dist - 1.78).abs() < 0.05,
            "Expected ~1.78 miles, got {}",
            dist
        );
    }

    #[test]
    fn test_distance_nyc_to_la() {
        // New York to Los Angeles is about 2,445 miles
        let nyc = coord(40.7128, -74.0060);
        let la = coord(34.0522, -118.2437);

        let dist = distance_miles(nyc, la);
        assert!(
            (dist - 2445.0).abs() < 15.0,
            "Expected ~2445 miles, got {}",
            dist
        );
    }

    #[test]
    fn test_distance_one_degree_latitude() {
        // One degree of latitude is roughly 69 miles
        let dist = distance_miles(coord(0.0, 0.0), coord(1.0, 0.0));
        assert!(
            (dist - 69.1).abs() < 0.5,
            "1 degree of latitude should be ~69 miles, got {}",
            dist
        );
    }

    #[test]
    fn test_distance_symmetry_across_hemispheres() {
        let north = coord(45.0, 10.0);
        let south = coord(-45.0, 10.0);

        let dist = distance_miles(north, south);
        let reversed = distance_miles(south, north);
        assert!((dist - reversed).abs() < 1e-9);
    }

    // ==================== midpoint tests ====================

    #[test]
    fn test_midpoint_simple_average() {
        let a = coord(40.0, -74.0);
        let b = coord(42.0, -72.0);

        let mid = midpoint(a, b);
        assert_eq!(mid.latitude(), 41.0);
        assert_eq!(mid.longitude(), -73.0);
    }

    #[test]
    fn test_midpoint_identical_points() {
        let a = coord(40.7128, -74.0060);
        let mid = midpoint(a, a);
        assert_eq!(mid, a);
    }

    #[test]
    fn test_midpoint_stays_in_range() {
        let a = coord(89.0, 179.0);
        let b = coord(-89.0, -179.0);

        let mid = midpoint(a, b);
        assert!(mid.latitude().abs() <= 90.0);
        assert!(mid.longitude().abs() <= 180.0);
    }

    #[test]
    fn test_midpoint_closer_to_both_than_they_are_to_each_other() {
        // Sanity check for the short-range use case the helper serves
        let a = coord(40.7128, -74.0060);
        let b = coord(40.7360, -73.9911);

        let mid = midpoint(a, b);
        let full = distance_miles(a, b);
        assert!(distance_miles(a, mid) < full);
        assert!(distance_miles(b, mid) < full);
    }
}
