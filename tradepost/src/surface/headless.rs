//! In-memory map backend with real projection math.
//!
//! `HeadlessSurface` implements the full [`MapSurface`] contract
//! without drawing anything: markers live in a table, the view is a
//! center/zoom pair over a Web Mercator pixel plane, and grid
//! clustering is computed from projected positions. It backs tests,
//! demos, and the CLI cluster view, and doubles as the reference for
//! what a tiled-map adapter must do.
//!
//! [`HeadlessRemote`] is the "user's hand": it injects clicks and
//! drags and inspects backend state, the way a real map's DOM events
//! would come in from outside.

use std::collections::HashMap;
use std::f64::consts::PI;
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use tracing::debug;

use crate::catalog::{Item, ItemId};
use crate::geo::Coordinate;

use super::types::{
    event_channel, Cluster, ClusterStrategy, GeoBounds, MarkerHandle, MarkerIcon, SurfaceEvent,
};
use super::{MapSurface, SurfaceError};

/// Pixel size of one Web Mercator tile.
const TILE_PX: f64 = 256.0;

/// Configuration for the headless backend.
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    /// Viewport size in pixels (width, height).
    pub viewport_px: (u32, u32),
    /// Zoom level at startup.
    pub initial_zoom: u8,
    /// Highest zoom the backend will go to.
    pub max_zoom: u8,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            viewport_px: (1024, 768),
            initial_zoom: 12,
            max_zoom: 18,
        }
    }
}

/// A marker held by the backend.
struct MarkerRecord {
    slot: u64,
    coordinate: Coordinate,
    icon: MarkerIcon,
}

struct HeadlessState {
    markers: HashMap<ItemId, MarkerRecord>,
    next_slot: u64,
    center: Coordinate,
    zoom: u8,
    strategy: ClusterStrategy,
    draggable: Option<Coordinate>,
}

/// The fully in-memory map surface. See the module docs.
pub struct HeadlessSurface {
    state: Arc<Mutex<HeadlessState>>,
    events_tx: broadcast::Sender<SurfaceEvent>,
    config: HeadlessConfig,
}

impl HeadlessSurface {
    pub fn new(config: HeadlessConfig) -> Self {
        let (events_tx, _) = event_channel();
        let zoom = config.initial_zoom.min(config.max_zoom);
        Self {
            state: Arc::new(Mutex::new(HeadlessState {
                markers: HashMap::new(),
                next_slot: 0,
                center: Coordinate::ORIGIN,
                zoom,
                strategy: ClusterStrategy::default(),
                draggable: None,
            })),
            events_tx,
            config,
        }
    }

    /// Input-injection and inspection handle, usable after the surface
    /// has been boxed and handed to a controller.
    pub fn remote(&self) -> HeadlessRemote {
        HeadlessRemote {
            state: Arc::clone(&self.state),
            events_tx: self.events_tx.clone(),
            config: self.config.clone(),
        }
    }
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new(HeadlessConfig::default())
    }
}

impl MapSurface for HeadlessSurface {
    fn name(&self) -> &str {
        "headless"
    }

    fn place_marker(&mut self, item: &Item, icon: MarkerIcon) -> Result<MarkerHandle, SurfaceError> {
        let mut state = self.state.lock().unwrap();
        state.next_slot += 1;
        let slot = state.next_slot;
        state.markers.insert(
            item.id,
            MarkerRecord {
                slot,
                coordinate: item.coordinate,
                icon,
            },
        );
        debug!(item = %item.id, slot, "placed marker");
        Ok(MarkerHandle::new(item.id, slot))
    }

    fn remove_marker(&mut self, handle: &MarkerHandle) -> Result<(), SurfaceError> {
        let mut state = self.state.lock().unwrap();
        match state.markers.get(&handle.item_id()) {
            Some(record) if record.slot == handle.slot() => {
                state.markers.remove(&handle.item_id());
                debug!(item = %handle.item_id(), "removed marker");
                Ok(())
            }
            _ => Err(SurfaceError::UnknownMarker(handle.item_id())),
        }
    }

    fn set_cluster(&mut self, strategy: ClusterStrategy) {
        self.state.lock().unwrap().strategy = strategy;
    }

    fn set_center(&mut self, center: Coordinate) {
        self.state.lock().unwrap().center = center;
    }

    fn set_zoom(&mut self, zoom: u8) {
        let clamped = zoom.min(self.config.max_zoom);
        self.state.lock().unwrap().zoom = clamped;
    }

    fn set_draggable_marker(&mut self, at: Coordinate) {
        self.state.lock().unwrap().draggable = Some(at);
    }

    fn clear_draggable_marker(&mut self) {
        self.state.lock().unwrap().draggable = None;
    }

    fn subscribe_events(&self) -> broadcast::Receiver<SurfaceEvent> {
        self.events_tx.subscribe()
    }
}

/// Injects user interaction into a [`HeadlessSurface`] and inspects
/// its state.
#[derive(Clone)]
pub struct HeadlessRemote {
    state: Arc<Mutex<HeadlessState>>,
    events_tx: broadcast::Sender<SurfaceEvent>,
    config: HeadlessConfig,
}

impl HeadlessRemote {
    /// Number of placed markers.
    pub fn marker_count(&self) -> usize {
        self.state.lock().unwrap().markers.len()
    }

    /// Whether a marker exists for the item.
    pub fn has_marker(&self, id: ItemId) -> bool {
        self.state.lock().unwrap().markers.contains_key(&id)
    }

    /// Backend slot of the item's marker, if placed.
    pub fn marker_slot(&self, id: ItemId) -> Option<u64> {
        self.state.lock().unwrap().markers.get(&id).map(|r| r.slot)
    }

    /// Icon the item's marker was placed with, if placed.
    pub fn marker_icon(&self, id: ItemId) -> Option<MarkerIcon> {
        self.state.lock().unwrap().markers.get(&id).map(|r| r.icon)
    }

    /// Current view center.
    pub fn center(&self) -> Coordinate {
        self.state.lock().unwrap().center
    }

    /// Current zoom level.
    pub fn zoom(&self) -> u8 {
        self.state.lock().unwrap().zoom
    }

    /// Position of the draggable marker, if shown.
    pub fn draggable_position(&self) -> Option<Coordinate> {
        self.state.lock().unwrap().draggable
    }

    /// Compute the cluster view at the current zoom.
    ///
    /// Groups of two or more markers whose projected positions share a
    /// grid cell; recomputed from scratch on every call.
    pub fn clusters(&self) -> Vec<Cluster> {
        let state = self.state.lock().unwrap();
        let cell_px = match state.strategy {
            ClusterStrategy::Disabled => return Vec::new(),
            ClusterStrategy::Grid { cell_px } => cell_px as f64,
        };

        // Slot order keeps the grouping deterministic.
        let mut records: Vec<(ItemId, u64, Coordinate)> = state
            .markers
            .iter()
            .map(|(id, r)| (*id, r.slot, r.coordinate))
            .collect();
        records.sort_by_key(|(_, slot, _)| *slot);

        let mut cell_index: HashMap<(i64, i64), usize> = HashMap::new();
        let mut groups: Vec<Vec<(ItemId, Coordinate)>> = Vec::new();
        for (id, _, coordinate) in records {
            let (x, y) = project(coordinate, state.zoom);
            let cell = ((x / cell_px).floor() as i64, (y / cell_px).floor() as i64);
            let group = *cell_index.entry(cell).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[group].push((id, coordinate));
        }

        groups
            .into_iter()
            .filter(|members| members.len() >= 2)
            .map(|members| {
                let mut bounds = GeoBounds::from_point(members[0].1);
                for (_, coordinate) in &members[1..] {
                    bounds.include(*coordinate);
                }
                Cluster {
                    members: members.into_iter().map(|(id, _)| id).collect(),
                    bounds,
                }
            })
            .collect()
    }

    /// Click the marker of `id`. Returns false when no such marker.
    pub fn click_marker(&self, id: ItemId) -> bool {
        if !self.has_marker(id) {
            return false;
        }
        let _ = self.events_tx.send(SurfaceEvent::MarkerClicked(id));
        true
    }

    /// Activate the `index`th cluster: zoom to its bounds and emit the
    /// activation event. Returns the cluster, or None when out of range.
    pub fn activate_cluster(&self, index: usize) -> Option<Cluster> {
        let cluster = self.clusters().into_iter().nth(index)?;

        let zoom = self.fit_zoom(&cluster.bounds);
        {
            let mut state = self.state.lock().unwrap();
            state.center = cluster.bounds.center();
            state.zoom = zoom;
        }
        debug!(members = cluster.members.len(), zoom, "cluster activated");
        let _ = self.events_tx.send(SurfaceEvent::ClusterActivated {
            bounds: cluster.bounds,
        });
        Some(cluster)
    }

    /// Release a drag of the draggable marker at viewport pixel (x, y).
    ///
    /// The pixel is unprojected through the backend's own projection at
    /// the current center/zoom; the resulting coordinate moves the
    /// marker and is emitted as [`SurfaceEvent::DragEnded`]. Returns
    /// None when no draggable marker is shown.
    pub fn end_drag_at(&self, x: f64, y: f64) -> Option<Coordinate> {
        let mut state = self.state.lock().unwrap();
        state.draggable?;

        let (w, h) = self.config.viewport_px;
        let (center_x, center_y) = project(state.center, state.zoom);
        let world_x = center_x + x - w as f64 / 2.0;
        let world_y = center_y + y - h as f64 / 2.0;
        let coordinate = unproject(world_x, world_y, state.zoom);

        state.draggable = Some(coordinate);
        drop(state);

        let _ = self.events_tx.send(SurfaceEvent::DragEnded(coordinate));
        Some(coordinate)
    }

    /// Highest zoom at which `bounds` still fits the viewport.
    fn fit_zoom(&self, bounds: &GeoBounds) -> u8 {
        let (w, h) = self.config.viewport_px;
        let nw = Coordinate::new(bounds.north, bounds.west).unwrap_or(Coordinate::ORIGIN);
        let se = Coordinate::new(bounds.south, bounds.east).unwrap_or(Coordinate::ORIGIN);

        for zoom in (0..=self.config.max_zoom).rev() {
            let (x1, y1) = project(nw, zoom);
            let (x2, y2) = project(se, zoom);
            if (x2 - x1).abs() <= w as f64 && (y2 - y1).abs() <= h as f64 {
                return zoom;
            }
        }
        0
    }
}

/// Geographic coordinate to Web Mercator world pixel at `zoom`.
fn project(coord: Coordinate, zoom: u8) -> (f64, f64) {
    let n = TILE_PX * (1u64 << zoom.min(31)) as f64;
    let x = (coord.longitude() + 180.0) / 360.0 * n;
    let lat_rad = coord.latitude().to_radians();
    let y = (1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n;
    (x, y)
}

/// Web Mercator world pixel back to a geographic coordinate.
///
/// Pixels beyond the world edge clamp to it; this is view math, not
/// input validation.
fn unproject(x: f64, y: f64, zoom: u8) -> Coordinate {
    let n = TILE_PX * (1u64 << zoom.min(31)) as f64;
    let lon = (x / n * 360.0 - 180.0).clamp(-180.0, 180.0);
    let lat = (PI * (1.0 - 2.0 * y / n))
        .sinh()
        .atan()
        .to_degrees()
        .clamp(-90.0, 90.0);
    Coordinate::new(lat, lon).unwrap_or(Coordinate::ORIGIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::icon_for;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    fn item(id: u64, lat: f64, lon: f64) -> Item {
        Item {
            id: ItemId(id),
            title: format!("Item {}", id),
            category: "tools".into(),
            coordinate: coord(lat, lon),
            value: 10,
        }
    }

    fn place(surface: &mut HeadlessSurface, it: &Item) -> MarkerHandle {
        surface.place_marker(it, icon_for(&it.category)).unwrap()
    }

    // ==================== projection tests ====================

    #[test]
    fn test_projection_roundtrip() {
        let original = coord(40.7128, -74.0060);
        let (x, y) = project(original, 15);
        let back = unproject(x, y, 15);

        assert!((back.latitude() - original.latitude()).abs() < 1e-6);
        assert!((back.longitude() - original.longitude()).abs() < 1e-6);
    }

    #[test]
    fn test_projection_origin_is_world_center() {
        let (x, y) = project(Coordinate::ORIGIN, 10);
        let n = TILE_PX * 1024.0;
        assert!((x - n / 2.0).abs() < 1e-6);
        assert!((y - n / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_unproject_clamps_world_edge() {
        let c = unproject(-100.0, 0.0, 0);
        assert!(c.longitude() >= -180.0);
    }

    // ==================== marker tests ====================

    #[test]
    fn test_place_and_remove_marker() {
        let mut surface = HeadlessSurface::default();
        let remote = surface.remote();

        let handle = place(&mut surface, &item(1, 40.7, -74.0));
        assert!(remote.has_marker(ItemId(1)));

        surface.remove_marker(&handle).unwrap();
        assert!(!remote.has_marker(ItemId(1)));
    }

    #[test]
    fn test_remove_unknown_marker_fails() {
        let mut surface = HeadlessSurface::default();
        let handle = MarkerHandle::new(ItemId(9), 99);

        let result = surface.remove_marker(&handle);
        assert_eq!(result, Err(SurfaceError::UnknownMarker(ItemId(9))));
    }

    #[test]
    fn test_replacing_marker_invalidates_old_handle() {
        let mut surface = HeadlessSurface::default();
        let it = item(1, 40.7, -74.0);

        let old = place(&mut surface, &it);
        let new = place(&mut surface, &it);
        assert_ne!(old, new);

        // The stale handle no longer removes anything
        assert!(surface.remove_marker(&old).is_err());
        assert!(surface.remove_marker(&new).is_ok());
    }

    // ==================== clustering tests ====================

    #[test]
    fn test_overlapping_markers_cluster() {
        let mut surface = HeadlessSurface::default();
        let remote = surface.remote();

        // Two markers at the same spot, one across the river
        place(&mut surface, &item(1, 40.7360, -73.9911));
        place(&mut surface, &item(2, 40.7360, -73.9911));
        place(&mut surface, &item(3, 40.7178, -74.0431));

        let clusters = remote.clusters();
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].members, vec![ItemId(1), ItemId(2)]);
    }

    #[test]
    fn test_distant_markers_do_not_cluster_at_high_zoom() {
        let mut surface = HeadlessSurface::default();
        let remote = surface.remote();
        surface.set_zoom(12);

        // ~0.04 degrees of longitude apart: well over one 64px cell at
        // zoom 12
        place(&mut surface, &item(1, 40.7360, -73.9911));
        place(&mut surface, &item(2, 40.7360, -74.0300));

        assert!(remote.clusters().is_empty());
    }

    #[test]
    fn test_disabled_strategy_yields_no_clusters() {
        let mut surface = HeadlessSurface::default();
        let remote = surface.remote();
        surface.set_cluster(ClusterStrategy::Disabled);

        place(&mut surface, &item(1, 40.7360, -73.9911));
        place(&mut surface, &item(2, 40.7360, -73.9911));

        assert!(remote.clusters().is_empty());
    }

    #[test]
    fn test_cluster_activation_zooms_to_bounds() {
        let mut surface = HeadlessSurface::default();
        let remote = surface.remote();
        let mut events = surface.subscribe_events();

        place(&mut surface, &item(1, 40.7360, -73.9911));
        place(&mut surface, &item(2, 40.7361, -73.9912));

        let cluster = remote.activate_cluster(0).expect("one cluster");

        // View recentered on the cluster
        let center = remote.center();
        assert!((center.latitude() - cluster.bounds.center().latitude()).abs() < 1e-9);

        let event = events.try_recv().unwrap();
        assert!(matches!(event, SurfaceEvent::ClusterActivated { .. }));
    }

    #[test]
    fn test_activate_out_of_range_cluster() {
        let surface = HeadlessSurface::default();
        assert!(surface.remote().activate_cluster(0).is_none());
    }

    // ==================== interaction tests ====================

    #[test]
    fn test_click_marker_emits_event() {
        let mut surface = HeadlessSurface::default();
        let remote = surface.remote();
        let mut events = surface.subscribe_events();

        place(&mut surface, &item(1, 40.7, -74.0));

        assert!(remote.click_marker(ItemId(1)));
        assert_eq!(
            events.try_recv().unwrap(),
            SurfaceEvent::MarkerClicked(ItemId(1))
        );

        assert!(!remote.click_marker(ItemId(42)));
    }

    #[test]
    fn test_drag_reports_unprojected_coordinate() {
        let mut surface = HeadlessSurface::default();
        let remote = surface.remote();
        let mut events = surface.subscribe_events();

        let start = coord(40.7128, -74.0060);
        surface.set_center(start);
        surface.set_draggable_marker(start);

        // Releasing in the middle of the viewport is the center itself
        let (w, h) = HeadlessConfig::default().viewport_px;
        let released = remote
            .end_drag_at(w as f64 / 2.0, h as f64 / 2.0)
            .expect("draggable marker is shown");

        assert!((released.latitude() - start.latitude()).abs() < 1e-6);
        assert!((released.longitude() - start.longitude()).abs() < 1e-6);
        assert!(matches!(
            events.try_recv().unwrap(),
            SurfaceEvent::DragEnded(_)
        ));
    }

    #[test]
    fn test_drag_moves_east_of_center() {
        let mut surface = HeadlessSurface::default();
        let remote = surface.remote();

        let start = coord(40.7128, -74.0060);
        surface.set_center(start);
        surface.set_draggable_marker(start);

        let (w, h) = HeadlessConfig::default().viewport_px;
        let released = remote
            .end_drag_at(w as f64 / 2.0 + 100.0, h as f64 / 2.0)
            .unwrap();

        assert!(released.longitude() > start.longitude());
        assert_eq!(remote.draggable_position(), Some(released));
    }

    #[test]
    fn test_drag_without_draggable_marker() {
        let surface = HeadlessSurface::default();
        assert!(surface.remote().end_drag_at(10.0, 10.0).is_none());
    }
}
