//! Controller daemon - the event loop behind [`super::MapController`].
//!
//! Owns the live marker set and all orchestration state. Everything
//! flows through one loop, so every rebuild observes the most recent
//! location, radius, and catalog: the debounce timer defers work while
//! changes keep arriving, and anything that raced the timer is folded
//! in before the filter runs.

use std::collections::HashMap;

use tokio::sync::{broadcast, mpsc};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::catalog::{Item, ItemId};
use crate::filter::{filter, FilteredItem, SearchRadius};
use crate::location::UserLocation;
use crate::surface::{icon_for, MapSurface, MarkerHandle, SurfaceError, SurfaceEvent};

use super::config::ControllerConfig;
use super::events::{ControllerEvent, MapStatus};
use super::handle::Command;
use super::reconcile::diff_markers;

/// Input channels the daemon drains.
pub(crate) struct DaemonChannels {
    pub commands_rx: mpsc::Receiver<Command>,
    pub location_rx: broadcast::Receiver<UserLocation>,
    pub surface_events: Option<broadcast::Receiver<SurfaceEvent>>,
}

pub(crate) struct ControllerDaemon {
    surface: Option<Box<dyn MapSurface>>,
    status: MapStatus,
    markers: HashMap<ItemId, MarkerHandle>,
    catalog: Vec<Item>,
    radius: SearchRadius,
    origin: Option<UserLocation>,
    selected: Option<ItemId>,
    last_result: Vec<FilteredItem>,
    events_tx: broadcast::Sender<ControllerEvent>,
    config: ControllerConfig,
    rebuild_due: Option<Instant>,
}

impl ControllerDaemon {
    /// Build the daemon around an already-initialized (or failed)
    /// surface. Returns the daemon and the surface event subscription
    /// to wire into [`DaemonChannels`].
    pub(crate) fn new(
        surface: Result<Box<dyn MapSurface>, SurfaceError>,
        radius: SearchRadius,
        events_tx: broadcast::Sender<ControllerEvent>,
        config: ControllerConfig,
    ) -> (Self, Option<broadcast::Receiver<SurfaceEvent>>) {
        let (surface, status) = match surface {
            Ok(surface) => (Some(surface), MapStatus::Ready),
            Err(e) => {
                warn!(error = %e, "map surface unavailable, continuing list-only");
                (
                    None,
                    MapStatus::Unavailable {
                        reason: e.to_string(),
                    },
                )
            }
        };
        let surface_events = surface.as_ref().map(|s| s.subscribe_events());

        let daemon = Self {
            surface,
            status,
            markers: HashMap::new(),
            catalog: Vec::new(),
            radius,
            origin: None,
            selected: None,
            last_result: Vec::new(),
            events_tx,
            config,
            rebuild_due: None,
        };
        (daemon, surface_events)
    }

    pub(crate) async fn run(mut self, mut channels: DaemonChannels, shutdown: CancellationToken) {
        info!(status = %self.status, "map controller daemon started");
        self.emit(ControllerEvent::MapStatusChanged(self.status.clone()));

        let mut location_open = true;
        loop {
            let rebuild_due = self.rebuild_due;

            tokio::select! {
                _ = shutdown.cancelled() => break,

                command = channels.commands_rx.recv() => match command {
                    Some(command) => self.on_command(command),
                    None => break,
                },

                update = channels.location_rx.recv(), if location_open => match update {
                    Ok(location) => self.on_location(location),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "location updates lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => location_open = false,
                },

                // Pends forever once the surface side is gone.
                event = recv_surface_event(&mut channels.surface_events) => match event {
                    Some(event) => self.on_surface_event(event),
                    None => channels.surface_events = None,
                },

                _ = sleep_until_due(rebuild_due), if rebuild_due.is_some() => {
                    self.drain_raced_inputs(&mut channels, &mut location_open);
                    self.rebuild();
                }
            }
        }

        self.teardown();
    }

    /// Fold in inputs that arrived while the debounce timer was firing
    /// so the rebuild sees the newest state.
    fn drain_raced_inputs(&mut self, channels: &mut DaemonChannels, location_open: &mut bool) {
        loop {
            match channels.location_rx.try_recv() {
                Ok(location) => self.on_location(location),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(broadcast::error::TryRecvError::Closed) => {
                    *location_open = false;
                    break;
                }
                Err(broadcast::error::TryRecvError::Empty) => break,
            }
        }
        while let Ok(command) = channels.commands_rx.try_recv() {
            self.on_command(command);
        }
    }

    fn on_command(&mut self, command: Command) {
        match command {
            Command::SetCatalog(items) => {
                debug!(items = items.len(), "catalog replaced");
                self.catalog = items;
                self.schedule_rebuild();
            }
            Command::SetRadius(radius) => {
                debug!(miles = radius.miles(), "radius changed");
                self.radius = radius;
                self.schedule_rebuild();
            }
            Command::Select(selection) => self.apply_selection(selection),
            Command::BeginLocationPick(at) => {
                if let Some(surface) = self.surface.as_mut() {
                    surface.set_draggable_marker(at);
                }
            }
            Command::EndLocationPick => {
                if let Some(surface) = self.surface.as_mut() {
                    surface.clear_draggable_marker();
                }
            }
        }
    }

    fn on_location(&mut self, location: UserLocation) {
        debug!(coordinate = %location.coordinate(), "search origin moved");
        self.origin = Some(location);
        self.schedule_rebuild();
    }

    fn on_surface_event(&mut self, event: SurfaceEvent) {
        match event {
            SurfaceEvent::MarkerClicked(id) => self.apply_selection(Some(id)),
            SurfaceEvent::ClusterActivated { bounds } => {
                debug!(?bounds, "cluster activated, backend zoomed to bounds");
            }
            SurfaceEvent::DragEnded(coordinate) => {
                info!(%coordinate, "location pick settled");
                self.emit(ControllerEvent::LocationPicked(coordinate));
            }
        }
    }

    /// Move the single selection slot. Selecting an item not present
    /// in the current result clears the slot instead.
    fn apply_selection(&mut self, selection: Option<ItemId>) {
        let detail = selection.and_then(|id| {
            let found = self.last_result.iter().find(|f| f.item.id == id).cloned();
            if found.is_none() {
                warn!(item = %id, "selection not in current results");
            }
            found
        });

        let new_selected = detail.as_ref().map(|f| f.item.id);
        if new_selected == self.selected {
            return;
        }
        self.selected = new_selected;
        self.emit(ControllerEvent::SelectionChanged(detail));
    }

    /// Push the rebuild deadline out to the end of the settling period.
    fn schedule_rebuild(&mut self) {
        self.rebuild_due = Some(Instant::now() + self.config.debounce);
    }

    /// Run the filter and reconcile markers against the result.
    fn rebuild(&mut self) {
        self.rebuild_due = None;

        let Some(origin) = self.origin.clone() else {
            debug!("no origin yet, deferring first filter pass");
            return;
        };

        let result = filter(&self.catalog, &origin, &self.radius);
        info!(
            items = result.len(),
            radius = self.radius.miles(),
            "filter pass complete"
        );

        if let Some(surface) = self.surface.as_mut() {
            let diff = diff_markers(&self.markers, &result);
            for id in &diff.to_remove {
                if let Some(handle) = self.markers.remove(id) {
                    if let Err(e) = surface.remove_marker(&handle) {
                        warn!(error = %e, "failed to remove stale marker");
                    }
                }
            }
            for filtered in result.iter().filter(|f| diff.to_place.contains(&f.item.id)) {
                match surface.place_marker(&filtered.item, icon_for(&filtered.item.category)) {
                    Ok(handle) => {
                        self.markers.insert(filtered.item.id, handle);
                    }
                    Err(e) => warn!(error = %e, item = %filtered.item.id, "failed to place marker"),
                }
            }
            if self.config.follow_origin {
                surface.set_center(origin.coordinate());
            }
        }

        // A selection that fell out of the result closes the overlay.
        if let Some(selected) = self.selected {
            if !result.iter().any(|f| f.item.id == selected) {
                self.selected = None;
                self.emit(ControllerEvent::SelectionChanged(None));
            }
        }

        self.last_result = result.clone();
        self.emit(ControllerEvent::FilteredItemsChanged(result));
    }

    /// Release every marker and detach from the surface.
    fn teardown(&mut self) {
        debug!("map controller daemon stopping");
        if let Some(surface) = self.surface.as_mut() {
            for (_, handle) in self.markers.drain() {
                let _ = surface.remove_marker(&handle);
            }
            surface.clear_draggable_marker();
        }
    }

    fn emit(&self, event: ControllerEvent) {
        // Nobody listening is fine; events are fire-and-forget.
        let _ = self.events_tx.send(event);
    }
}

/// Receive the next surface event, skipping lag gaps; resolves `None`
/// when the surface side closed.
async fn recv_surface_event(
    rx: &mut Option<broadcast::Receiver<SurfaceEvent>>,
) -> Option<SurfaceEvent> {
    match rx {
        Some(rx) => loop {
            match rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "surface events lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        },
        None => std::future::pending().await,
    }
}

/// Sleep until the debounce deadline; pends forever when none is set.
async fn sleep_until_due(due: Option<Instant>) {
    match due {
        Some(due) => tokio::time::sleep_until(due).await,
        None => std::future::pending().await,
    }
}
