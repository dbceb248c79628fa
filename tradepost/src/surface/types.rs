//! Map surface types and events.

use thiserror::Error;
use tokio::sync::broadcast;

use crate::catalog::ItemId;
use crate::geo::Coordinate;

/// Errors that can occur in a map surface backend.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SurfaceError {
    /// The backend failed to initialize (script load, network, ...).
    ///
    /// Callers degrade to list-only operation rather than crash.
    #[error("map backend failed to initialize: {0}")]
    BackendInitFailed(String),

    /// A marker handle was not (or is no longer) known to the backend.
    #[error("unknown marker for {0}")]
    UnknownMarker(ItemId),
}

/// Handle to a marker placed on a surface.
///
/// Owned by the surface and keyed by item id; the map controller owns
/// the *set* of live handles and removes stale ones before placing
/// replacements, so no handle outlives the filter pass that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MarkerHandle {
    item_id: ItemId,
    slot: u64,
}

impl MarkerHandle {
    pub(crate) fn new(item_id: ItemId, slot: u64) -> Self {
        Self { item_id, slot }
    }

    /// The catalog item this marker represents.
    #[inline]
    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    /// Backend-internal slot number.
    #[inline]
    pub(crate) fn slot(&self) -> u64 {
        self.slot
    }
}

/// Icon asset name used when placing a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerIcon(pub &'static str);

/// Map a catalog category to its marker icon.
///
/// Lives beside the trait so every backend shares one category policy.
/// Unrecognized categories fall back to the generic pin.
pub fn icon_for(category: &str) -> MarkerIcon {
    match category.to_ascii_lowercase().as_str() {
        "electronics" => MarkerIcon("pin-electronics"),
        "furniture" => MarkerIcon("pin-furniture"),
        "clothing" => MarkerIcon("pin-clothing"),
        "books" => MarkerIcon("pin-books"),
        "tools" => MarkerIcon("pin-tools"),
        "sports" => MarkerIcon("pin-sports"),
        _ => MarkerIcon("pin-generic"),
    }
}

/// Clustering behavior a backend applies to overlapping markers.
///
/// Opaque to callers: the only guarantees are that overlapping markers
/// group visually and that activating a cluster zooms to its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterStrategy {
    /// No grouping; every marker renders individually.
    Disabled,
    /// Grid clustering with the given cell size in screen pixels.
    Grid { cell_px: u32 },
}

impl Default for ClusterStrategy {
    fn default() -> Self {
        Self::Grid { cell_px: 64 }
    }
}

/// Geographic bounding box of a marker group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl GeoBounds {
    /// A degenerate box containing a single point.
    pub fn from_point(coord: Coordinate) -> Self {
        Self {
            south: coord.latitude(),
            west: coord.longitude(),
            north: coord.latitude(),
            east: coord.longitude(),
        }
    }

    /// Grow the box to contain `coord`.
    pub fn include(&mut self, coord: Coordinate) {
        self.south = self.south.min(coord.latitude());
        self.west = self.west.min(coord.longitude());
        self.north = self.north.max(coord.latitude());
        self.east = self.east.max(coord.longitude());
    }

    /// Center of the box.
    pub fn center(&self) -> Coordinate {
        // Both corners are validated coordinates, so the mean is too.
        Coordinate::new(
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
        .unwrap_or(Coordinate::ORIGIN)
    }

    /// Extent in degrees as (latitude span, longitude span).
    pub fn span(&self) -> (f64, f64) {
        (self.north - self.south, self.east - self.west)
    }
}

/// A transient, backend-computed grouping of markers.
///
/// Recomputed on every render pass; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    /// Items whose markers were grouped.
    pub members: Vec<ItemId>,
    /// Geographic extent of the group.
    pub bounds: GeoBounds,
}

/// Events a surface reports back to its controller.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    /// The user clicked an individual marker.
    MarkerClicked(ItemId),
    /// The user activated a cluster; the backend has already zoomed to
    /// its bounds.
    ClusterActivated { bounds: GeoBounds },
    /// The draggable marker was released; the coordinate comes from the
    /// backend's own projection, not a caller-side approximation.
    DragEnded(Coordinate),
}

/// Broadcast channel pair used by backends to publish [`SurfaceEvent`]s.
pub(crate) fn event_channel() -> (
    broadcast::Sender<SurfaceEvent>,
    broadcast::Receiver<SurfaceEvent>,
) {
    broadcast::channel(32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    #[test]
    fn test_icon_for_known_categories() {
        assert_eq!(icon_for("tools"), MarkerIcon("pin-tools"));
        assert_eq!(icon_for("Electronics"), MarkerIcon("pin-electronics"));
    }

    #[test]
    fn test_icon_for_unknown_category_falls_back() {
        assert_eq!(icon_for("houseboats"), MarkerIcon("pin-generic"));
    }

    #[test]
    fn test_bounds_grow_to_include() {
        let mut bounds = GeoBounds::from_point(coord(40.0, -74.0));
        bounds.include(coord(41.0, -73.0));
        bounds.include(coord(39.5, -74.5));

        assert_eq!(bounds.south, 39.5);
        assert_eq!(bounds.west, -74.5);
        assert_eq!(bounds.north, 41.0);
        assert_eq!(bounds.east, -73.0);
    }

    #[test]
    fn test_bounds_center() {
        let mut bounds = GeoBounds::from_point(coord(40.0, -74.0));
        bounds.include(coord(42.0, -72.0));

        let center = bounds.center();
        assert_eq!(center.latitude(), 41.0);
        assert_eq!(center.longitude(), -73.0);
    }

    #[test]
    fn test_default_cluster_strategy_is_grid() {
        assert_eq!(
            ClusterStrategy::default(),
            ClusterStrategy::Grid { cell_px: 64 }
        );
    }
}
