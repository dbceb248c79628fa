//! Coordinate type definitions.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Valid latitude range in degrees.
pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;

/// Valid longitude range in degrees.
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Errors raised when rejecting malformed coordinates at the boundary.
///
/// Out-of-range or non-finite values are rejected, never clamped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    /// Latitude is non-finite or outside [-90, 90].
    #[error("invalid latitude: {0} (must be finite and between {MIN_LAT} and {MAX_LAT})")]
    InvalidLatitude(f64),

    /// Longitude is non-finite or outside [-180, 180].
    #[error("invalid longitude: {0} (must be finite and between {MIN_LON} and {MAX_LON})")]
    InvalidLongitude(f64),
}

/// A validated geographic position in decimal degrees.
///
/// Construction goes through [`Coordinate::new`], which rejects
/// non-finite or out-of-range values with [`GeoError`]. Deserialization
/// routes through the same validation, so a `Coordinate` held anywhere
/// in the engine is always in range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Null Island; a neutral fallback for results of arithmetic that
    /// is already known to be in range.
    pub const ORIGIN: Coordinate = Coordinate {
        latitude: 0.0,
        longitude: 0.0,
    };

    /// Create a coordinate, validating both components.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        if !latitude.is_finite() || !(MIN_LAT..=MAX_LAT).contains(&latitude) {
            return Err(GeoError::InvalidLatitude(latitude));
        }
        if !longitude.is_finite() || !(MIN_LON..=MAX_LON).contains(&longitude) {
            return Err(GeoError::InvalidLongitude(longitude));
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in decimal degrees.
    #[inline]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in decimal degrees.
    #[inline]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Unvalidated wire form; [`Coordinate`] deserializes through this.
#[derive(Debug, Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = GeoError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Coordinate::new(raw.latitude, raw.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_coordinate() {
        let coord = Coordinate::new(40.7128, -74.0060).unwrap();
        assert_eq!(coord.latitude(), 40.7128);
        assert_eq!(coord.longitude(), -74.0060);
    }

    #[test]
    fn test_boundary_values_accepted() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
        assert!(Coordinate::new(0.0, 0.0).is_ok());
    }

    #[test]
    fn test_latitude_out_of_range() {
        let result = Coordinate::new(90.1, 0.0);
        assert!(matches!(result, Err(GeoError::InvalidLatitude(_))));

        let result = Coordinate::new(-91.0, 0.0);
        assert!(matches!(result, Err(GeoError::InvalidLatitude(_))));
    }

    #[test]
    fn test_longitude_out_of_range() {
        let result = Coordinate::new(0.0, 180.5);
        assert!(matches!(result, Err(GeoError::InvalidLongitude(_))));

        let result = Coordinate::new(0.0, -181.0);
        assert!(matches!(result, Err(GeoError::InvalidLongitude(_))));
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::NAN).is_err());
        assert!(Coordinate::new(f64::INFINITY, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_display_format() {
        let coord = Coordinate::new(40.7128, -74.0060).unwrap();
        assert_eq!(coord.to_string(), "40.7128, -74.0060");
    }

    #[test]
    fn test_deserialization_validates() {
        let valid: Result<Coordinate, _> =
            serde_json::from_str(r#"{"latitude": 40.7, "longitude": -74.0}"#);
        assert!(valid.is_ok());

        let invalid: Result<Coordinate, _> =
            serde_json::from_str(r#"{"latitude": 95.0, "longitude": 0.0}"#);
        assert!(invalid.is_err());
    }

    #[test]
    fn test_serialization_roundtrip() {
        let coord = Coordinate::new(51.5074, -0.1278).unwrap();
        let json = serde_json::to_string(&coord).unwrap();
        let back: Coordinate = serde_json::from_str(&json).unwrap();
        assert_eq!(coord, back);
    }
}
