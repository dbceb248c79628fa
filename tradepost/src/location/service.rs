//! Location service - permission state machine and acquisition.
//!
//! [`LocationService`] owns the single current [`UserLocation`] and the
//! permission workflow around it. Position fixes come from a
//! [`GeolocationSource`]; subscribers (the map controller, list views)
//! receive location changes over a broadcast channel.
//!
//! # Single-flight acquisition
//!
//! At most one acquisition is in flight. A second `acquire_location`
//! call while one is pending cancels the first, which resolves with
//! [`LocationError::Superseded`]; nothing about the superseded attempt
//! is broadcast. The same token fan-out lets `shutdown` abandon a
//! pending acquisition at teardown.

use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::geo::Coordinate;

use super::error::LocationError;
use super::source::GeolocationSource;
use super::state::{PermissionState, UserLocation};

/// Label attached to GPS-acquired locations.
const GPS_LABEL: &str = "Current location";

/// Configuration for the location service.
#[derive(Debug, Clone)]
pub struct LocationConfig {
    /// Deadline for the acquisition triggered right after a grant.
    pub acquire_timeout: Duration,

    /// Capacity of the location update broadcast channel.
    pub update_capacity: usize,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            acquire_timeout: Duration::from_secs(10),
            update_capacity: 16,
        }
    }
}

/// Mutable service state behind one lock.
struct ServiceState {
    permission: PermissionState,
    current: Option<UserLocation>,
}

/// Tracks the in-flight acquisition for single-flight supersession.
struct Inflight {
    generation: u64,
    token: Option<CancellationToken>,
}

/// Holds the user's current location and manages the permission
/// workflow. See the module docs for the acquisition semantics.
pub struct LocationService<S> {
    source: S,
    state: Arc<RwLock<ServiceState>>,
    inflight: Arc<Mutex<Inflight>>,
    updates_tx: broadcast::Sender<UserLocation>,
    config: LocationConfig,
}

impl<S: GeolocationSource> LocationService<S> {
    /// Create a service with default configuration.
    pub fn new(source: S) -> Self {
        Self::with_config(source, LocationConfig::default())
    }

    /// Create a service with custom configuration.
    pub fn with_config(source: S, config: LocationConfig) -> Self {
        let (updates_tx, _) = broadcast::channel(config.update_capacity);
        Self {
            source,
            state: Arc::new(RwLock::new(ServiceState {
                permission: PermissionState::Unknown,
                current: None,
            })),
            inflight: Arc::new(Mutex::new(Inflight {
                generation: 0,
                token: None,
            })),
            updates_tx,
            config,
        }
    }

    /// Subscribe to location changes.
    ///
    /// Each successful change is delivered exactly once; updates that
    /// repeat the held coordinate are not delivered at all.
    pub fn subscribe(&self) -> broadcast::Receiver<UserLocation> {
        self.updates_tx.subscribe()
    }

    /// Current permission state.
    pub fn permission_state(&self) -> PermissionState {
        self.state.read().unwrap().permission
    }

    /// The held location, if any.
    pub fn current_location(&self) -> Option<UserLocation> {
        self.state.read().unwrap().current.clone()
    }

    /// Ask the user for location permission.
    ///
    /// On grant, transitions to `Granted` and immediately attempts one
    /// acquisition; an acquisition failure is logged but does not undo
    /// the grant. On refusal, transitions to `Denied`.
    ///
    /// Calling while already `Denied` fails immediately with
    /// [`LocationError::PermissionDenied`] and does not prompt the
    /// platform again - leaving `Denied` requires [`Self::retry_permission`].
    pub async fn request_permission(&self) -> Result<(), LocationError> {
        match self.permission_state() {
            PermissionState::Granted => return Ok(()),
            PermissionState::Denied => return Err(LocationError::PermissionDenied),
            PermissionState::Unknown => {}
        }

        if self.source.request_permission().await {
            self.state.write().unwrap().permission = PermissionState::Granted;
            info!(source = self.source.name(), "location permission granted");

            if let Err(e) = self.acquire_location(self.config.acquire_timeout).await {
                warn!(error = %e, "acquisition after permission grant failed");
            }
            Ok(())
        } else {
            self.state.write().unwrap().permission = PermissionState::Denied;
            info!(source = self.source.name(), "location permission denied");
            Err(LocationError::PermissionDenied)
        }
    }

    /// Explicit user retry after a refusal.
    ///
    /// Resets `Denied` back to `Unknown` and re-runs the permission
    /// request. This is the only path out of `Denied`.
    pub async fn retry_permission(&self) -> Result<(), LocationError> {
        {
            let mut state = self.state.write().unwrap();
            if state.permission == PermissionState::Denied {
                state.permission = PermissionState::Unknown;
                debug!("permission reset for explicit retry");
            }
        }
        self.request_permission().await
    }

    /// Acquire a fresh GPS location within `timeout`.
    ///
    /// Fails immediately with [`LocationError::PermissionDenied`] when
    /// permission is not `Granted` - the platform is never prompted from
    /// here. A newer call supersedes this one (see module docs).
    pub async fn acquire_location(&self, timeout: Duration) -> Result<UserLocation, LocationError> {
        if self.permission_state() != PermissionState::Granted {
            return Err(LocationError::PermissionDenied);
        }

        let (token, generation) = self.begin_flight();

        let outcome = tokio::select! {
            _ = token.cancelled() => {
                debug!("acquisition superseded");
                Err(LocationError::Superseded)
            }
            _ = tokio::time::sleep(timeout) => {
                warn!(?timeout, "acquisition timed out");
                Err(LocationError::AcquisitionTimeout(timeout))
            }
            fix = self.source.position_fix() => fix.and_then(|fix| {
                let coordinate = Coordinate::new(fix.latitude, fix.longitude)
                    .map_err(|e| LocationError::PositionUnavailable(e.to_string()))?;
                Ok(UserLocation::from_gps(coordinate, GPS_LABEL.to_string()))
            }),
        };

        self.end_flight(generation);

        let location = outcome?;
        self.apply_location(location.clone());
        Ok(location)
    }

    /// Overwrite the held location with a manually entered coordinate.
    ///
    /// Always succeeds. Cancels any pending acquisition so a slow GPS
    /// fix cannot overwrite what the user just typed. Returns whether
    /// subscribers were notified (false for a no-op update that repeats
    /// the held coordinate).
    pub fn set_manual_location(&self, coordinate: Coordinate, label: impl Into<String>) -> bool {
        self.cancel_pending();
        self.apply_location(UserLocation::from_manual(coordinate, label.into()))
    }

    /// Cancel any in-flight acquisition, e.g. at teardown.
    pub fn cancel_pending(&self) {
        let mut inflight = self.inflight.lock().unwrap();
        if let Some(token) = inflight.token.take() {
            token.cancel();
        }
    }

    /// Register a new in-flight acquisition, superseding any previous one.
    fn begin_flight(&self) -> (CancellationToken, u64) {
        let mut inflight = self.inflight.lock().unwrap();
        if let Some(previous) = inflight.token.take() {
            previous.cancel();
        }
        inflight.generation += 1;
        let token = CancellationToken::new();
        inflight.token = Some(token.clone());
        (token, inflight.generation)
    }

    /// Clear the in-flight slot if it still belongs to this acquisition.
    fn end_flight(&self, generation: u64) {
        let mut inflight = self.inflight.lock().unwrap();
        if inflight.generation == generation {
            inflight.token = None;
        }
    }

    /// Store a new location and notify subscribers once per real change.
    ///
    /// The stored value is always replaced whole (fresh timestamp and
    /// source), but subscribers only hear about it when the coordinate
    /// actually moved.
    fn apply_location(&self, location: UserLocation) -> bool {
        let changed = {
            let mut state = self.state.write().unwrap();
            let changed = state
                .current
                .as_ref()
                .map(|current| current.coordinate() != location.coordinate())
                .unwrap_or(true);
            state.current = Some(location.clone());
            changed
        };

        if changed {
            info!(
                coordinate = %location.coordinate(),
                source = ?location.source(),
                "location changed"
            );
            let _ = self.updates_tx.send(location);
        } else {
            debug!("location update repeats held coordinate, not notifying");
        }
        changed
    }
}
