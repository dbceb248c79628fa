//! Controller output events and map status.

use std::fmt;

use crate::filter::FilteredItem;
use crate::geo::Coordinate;

/// Whether the map surface is usable.
#[derive(Debug, Clone, PartialEq)]
pub enum MapStatus {
    /// The backend initialized; markers are being rendered.
    Ready,
    /// The backend failed to initialize. Filtered results keep
    /// flowing so list views still work; only the map is dark.
    Unavailable { reason: String },
}

impl fmt::Display for MapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready => write!(f, "ready"),
            Self::Unavailable { reason } => write!(f, "map unavailable: {}", reason),
        }
    }
}

/// Events the controller publishes to the surrounding UI.
#[derive(Debug, Clone)]
pub enum ControllerEvent {
    /// A filter pass completed; this is the new result set.
    FilteredItemsChanged(Vec<FilteredItem>),
    /// The selected item changed. `Some` opens the detail overlay,
    /// `None` closes it.
    SelectionChanged(Option<FilteredItem>),
    /// The map surface became ready or unavailable.
    MapStatusChanged(MapStatus),
    /// The draggable marker settled on a new coordinate
    /// (location-picking flow).
    LocationPicked(Coordinate),
}
