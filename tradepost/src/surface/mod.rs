//! Map surface abstraction.
//!
//! [`MapSurface`] is the interface between the map controller and
//! whatever actually draws the map. Concrete backends are
//! interchangeable adapters: swapping one for another must not change
//! filter or controller behavior, and callers may not depend on any
//! backend behavior beyond this interface.
//!
//! # Backends
//!
//! - [`HeadlessSurface`] - a fully in-memory backend with real Web
//!   Mercator projection and grid clustering; drives tests, demos, and
//!   the CLI cluster view.
//! - [`NullSurface`] - the placeholder for environments without a map;
//!   accepts every operation and draws nothing.
//!
//! Backend initialization is asynchronous and may fail (script load,
//! network); see [`factory::create`]. On failure the controller keeps
//! serving filtered results and reports the map as unavailable.

pub mod factory;
mod headless;
mod null;
mod types;

pub use factory::{create, SurfaceConfig};
pub use headless::{HeadlessConfig, HeadlessRemote, HeadlessSurface};
pub use null::NullSurface;
pub use types::{
    icon_for, Cluster, ClusterStrategy, GeoBounds, MarkerHandle, MarkerIcon, SurfaceError,
    SurfaceEvent,
};

use tokio::sync::broadcast;

use crate::catalog::Item;
use crate::geo::Coordinate;

/// A rendering backend able to place, remove, and cluster markers and
/// report interaction events back.
pub trait MapSurface: Send {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Place a marker for `item`, returning its handle.
    ///
    /// Placing an item that already has a marker replaces it.
    fn place_marker(&mut self, item: &Item, icon: MarkerIcon) -> Result<MarkerHandle, SurfaceError>;

    /// Remove a previously placed marker.
    fn remove_marker(&mut self, handle: &MarkerHandle) -> Result<(), SurfaceError>;

    /// Set the clustering behavior. The backend owns how grouping
    /// works; callers only rely on overlap grouping and zoom-to-bounds
    /// on activation.
    fn set_cluster(&mut self, strategy: ClusterStrategy);

    /// Pan the view to `center`.
    fn set_center(&mut self, center: Coordinate);

    /// Set the zoom level.
    fn set_zoom(&mut self, zoom: u8);

    /// Show the single optional draggable marker (location picking).
    fn set_draggable_marker(&mut self, at: Coordinate);

    /// Hide the draggable marker.
    fn clear_draggable_marker(&mut self);

    /// Subscribe to interaction events.
    fn subscribe_events(&self) -> broadcast::Receiver<SurfaceEvent>;
}
