//! Platform geolocation seam.
//!
//! [`GeolocationSource`] is the boundary between the location provider
//! and whatever actually produces position fixes — a browser geolocation
//! bridge, a mobile OS API, or the scripted [`StaticSource`] used in
//! tests and headless demos. The service layer owns permission policy,
//! timeouts, and single-flight semantics; sources only prompt and fix.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::error::LocationError;

/// A raw position fix as reported by the platform.
///
/// Values are unvalidated platform output; the service rejects
/// out-of-range fixes before they become a [`super::UserLocation`].
#[derive(Debug, Clone, PartialEq)]
pub struct PositionFix {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Estimated accuracy radius in meters.
    pub accuracy_meters: f64,
}

/// Trait for platform geolocation backends.
///
/// Both operations suspend until the platform responds; the service
/// applies its own deadline and cancellation on top.
pub trait GeolocationSource: Send + Sync {
    /// Prompt the user for location permission.
    ///
    /// Resolves `true` when the user granted access. The service never
    /// calls this while permission is already decided.
    fn request_permission(&self) -> impl Future<Output = bool> + Send;

    /// Produce one position fix.
    fn position_fix(&self) -> impl Future<Output = Result<PositionFix, LocationError>> + Send;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

/// Scripted geolocation source for tests and headless demos.
///
/// Responds to permission prompts and fix requests with configured
/// values after an optional artificial delay, and counts how many times
/// the platform prompt was shown so tests can assert it is never
/// re-prompted silently.
#[derive(Clone)]
pub struct StaticSource {
    inner: Arc<StaticSourceInner>,
}

struct StaticSourceInner {
    grant: Mutex<bool>,
    fix: Mutex<Result<PositionFix, LocationError>>,
    delay: Mutex<Duration>,
    prompts: AtomicUsize,
}

impl StaticSource {
    /// A source that grants permission and reports the given position.
    pub fn granting(latitude: f64, longitude: f64) -> Self {
        Self {
            inner: Arc::new(StaticSourceInner {
                grant: Mutex::new(true),
                fix: Mutex::new(Ok(PositionFix {
                    latitude,
                    longitude,
                    accuracy_meters: 10.0,
                })),
                delay: Mutex::new(Duration::ZERO),
                prompts: AtomicUsize::new(0),
            }),
        }
    }

    /// A source whose permission prompt is refused.
    pub fn denying() -> Self {
        let source = Self::granting(0.0, 0.0);
        *source.inner.grant.lock().unwrap() = false;
        source
    }

    /// Change how the next permission prompt is answered.
    pub fn set_grant(&self, grant: bool) {
        *self.inner.grant.lock().unwrap() = grant;
    }

    /// Replace the reported fix.
    pub fn set_fix(&self, latitude: f64, longitude: f64) {
        *self.inner.fix.lock().unwrap() = Ok(PositionFix {
            latitude,
            longitude,
            accuracy_meters: 10.0,
        });
    }

    /// Make every fix request fail as unavailable.
    pub fn set_unavailable(&self, reason: &str) {
        *self.inner.fix.lock().unwrap() =
            Err(LocationError::PositionUnavailable(reason.to_string()));
    }

    /// Delay applied before answering fix requests.
    pub fn set_delay(&self, delay: Duration) {
        *self.inner.delay.lock().unwrap() = delay;
    }

    /// How many times the permission prompt has been shown.
    pub fn permission_prompts(&self) -> usize {
        self.inner.prompts.load(Ordering::SeqCst)
    }
}

impl GeolocationSource for StaticSource {
    async fn request_permission(&self) -> bool {
        self.inner.prompts.fetch_add(1, Ordering::SeqCst);
        *self.inner.grant.lock().unwrap()
    }

    async fn position_fix(&self) -> Result<PositionFix, LocationError> {
        let delay = *self.inner.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.inner.fix.lock().unwrap().clone()
    }

    fn name(&self) -> &str {
        "static"
    }
}
