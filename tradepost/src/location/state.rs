//! Core state types for the location provider.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::geo::Coordinate;

/// Whether the user has allowed automatic location acquisition.
///
/// Transitions: `Unknown -> (request) -> Granted | Denied`. `Denied` is
/// only left through an explicit user retry, never by a silent
/// re-request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionState {
    /// The user has not been asked yet.
    #[default]
    Unknown,
    /// The user allowed acquisition; refreshes may run.
    Granted,
    /// The user refused; no automatic attempts may follow.
    Denied,
}

impl fmt::Display for PermissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Granted => write!(f, "granted"),
            Self::Denied => write!(f, "denied"),
        }
    }
}

/// How the current location was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationSource {
    /// Platform geolocation fix.
    Gps,
    /// User-entered coordinate.
    Manual,
}

/// The user's current position.
///
/// Created whole on successful acquisition or manual entry and replaced
/// whole on the next change; fields are never individually mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct UserLocation {
    coordinate: Coordinate,
    label: String,
    source: LocationSource,
    acquired_at: DateTime<Utc>,
}

impl UserLocation {
    /// Build a location from a platform GPS fix.
    pub fn from_gps(coordinate: Coordinate, label: String) -> Self {
        Self {
            coordinate,
            label,
            source: LocationSource::Gps,
            acquired_at: Utc::now(),
        }
    }

    /// Build a location from manual coordinate entry.
    pub fn from_manual(coordinate: Coordinate, label: String) -> Self {
        Self {
            coordinate,
            label,
            source: LocationSource::Manual,
            acquired_at: Utc::now(),
        }
    }

    /// The position itself.
    #[inline]
    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    /// Human-readable label ("Current location", an address, ...).
    pub fn label(&self) -> &str {
        &self.label
    }

    /// How this location was obtained.
    #[inline]
    pub fn source(&self) -> LocationSource {
        self.source
    }

    /// When this location was acquired or entered.
    #[inline]
    pub fn acquired_at(&self) -> DateTime<Utc> {
        self.acquired_at
    }
}
