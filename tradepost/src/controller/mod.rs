//! Map controller.
//!
//! Orchestrates the location provider, the proximity filter, and the
//! map surface: any change to the search origin, radius, or catalog
//! re-runs the filter (debounced) and reconciles the marker set, and
//! surface interaction flows back out as selection and location-pick
//! events.
//!
//! # Lifecycle
//!
//! 1. **Creation**: [`MapController::new`] takes the outcome of surface
//!    initialization and a location subscription, and spawns the daemon.
//! 2. **Operation**: feed changes through the [`ControllerHandle`],
//!    observe results via [`MapController::subscribe`].
//! 3. **Shutdown**: [`MapController::shutdown`] cancels the daemon,
//!    releases every marker, and detaches surface subscriptions so no
//!    callback fires after teardown.
//!
//! # Degraded mode
//!
//! When surface initialization failed, the controller still runs every
//! filter pass and emits `FilteredItemsChanged`, but reports
//! [`MapStatus::Unavailable`] instead of touching a map.

mod config;
mod daemon;
mod events;
mod handle;
mod reconcile;

pub use config::ControllerConfig;
pub use events::{ControllerEvent, MapStatus};
pub use handle::{ControllerError, ControllerHandle};

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::filter::SearchRadius;
use crate::location::UserLocation;
use crate::surface::{MapSurface, SurfaceError};

use daemon::{ControllerDaemon, DaemonChannels};

/// Owns the controller daemon task and its channels.
pub struct MapController {
    handle: ControllerHandle,
    events_tx: broadcast::Sender<ControllerEvent>,
    daemon_task: Option<JoinHandle<()>>,
    shutdown: CancellationToken,
}

impl MapController {
    /// Spawn the controller.
    ///
    /// `surface` is the outcome of backend initialization; pass the
    /// `Err` through rather than aborting, and the controller runs in
    /// degraded, list-only mode. `location_rx` comes from
    /// [`crate::location::LocationService::subscribe`].
    pub fn new(
        surface: Result<Box<dyn MapSurface>, SurfaceError>,
        location_rx: broadcast::Receiver<UserLocation>,
        radius: SearchRadius,
        config: ControllerConfig,
    ) -> Self {
        let (events_tx, _) = broadcast::channel(config.event_capacity);
        let (commands_tx, commands_rx) = mpsc::channel(config.command_capacity);

        let (daemon, surface_events) =
            ControllerDaemon::new(surface, radius, events_tx.clone(), config);

        let shutdown = CancellationToken::new();
        let channels = DaemonChannels {
            commands_rx,
            location_rx,
            surface_events,
        };
        let daemon_token = shutdown.clone();
        let daemon_task = Some(tokio::spawn(async move {
            daemon.run(channels, daemon_token).await;
        }));

        Self {
            handle: ControllerHandle::new(commands_tx),
            events_tx,
            daemon_task,
            shutdown,
        }
    }

    /// Handle for feeding catalog, radius, selection, and
    /// location-pick changes.
    pub fn handle(&self) -> ControllerHandle {
        self.handle.clone()
    }

    /// Subscribe to controller output events.
    pub fn subscribe(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events_tx.subscribe()
    }

    /// Stop the daemon and wait for it to finish tearing down.
    pub async fn shutdown(mut self) {
        info!("shutting down map controller");
        self.shutdown.cancel();
        if let Some(task) = self.daemon_task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for MapController {
    fn drop(&mut self) {
        // Shutdown not awaited; make sure the daemon cannot outlive us.
        self.shutdown.cancel();
        if let Some(task) = self.daemon_task.take() {
            task.abort();
        }
    }
}
