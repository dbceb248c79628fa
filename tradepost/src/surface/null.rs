//! Placeholder backend for environments without a real map.

use tokio::sync::broadcast;
use tracing::debug;

use crate::catalog::Item;
use crate::geo::Coordinate;

use super::types::{event_channel, ClusterStrategy, MarkerHandle, MarkerIcon, SurfaceEvent};
use super::{MapSurface, SurfaceError};

/// A no-op surface: every operation succeeds, nothing is drawn, and no
/// interaction events ever fire.
pub struct NullSurface {
    next_slot: u64,
    events_tx: broadcast::Sender<SurfaceEvent>,
}

impl NullSurface {
    pub fn new() -> Self {
        let (events_tx, _) = event_channel();
        Self {
            next_slot: 0,
            events_tx,
        }
    }
}

impl Default for NullSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl MapSurface for NullSurface {
    fn name(&self) -> &str {
        "null"
    }

    fn place_marker(
        &mut self,
        item: &Item,
        _icon: MarkerIcon,
    ) -> Result<MarkerHandle, SurfaceError> {
        self.next_slot += 1;
        debug!(item = %item.id, "null surface placed marker");
        Ok(MarkerHandle::new(item.id, self.next_slot))
    }

    fn remove_marker(&mut self, _handle: &MarkerHandle) -> Result<(), SurfaceError> {
        Ok(())
    }

    fn set_cluster(&mut self, _strategy: ClusterStrategy) {}

    fn set_center(&mut self, _center: Coordinate) {}

    fn set_zoom(&mut self, _zoom: u8) {}

    fn set_draggable_marker(&mut self, _at: Coordinate) {}

    fn clear_draggable_marker(&mut self) {}

    fn subscribe_events(&self) -> broadcast::Receiver<SurfaceEvent> {
        self.events_tx.subscribe()
    }
}
