//! Location provider.
//!
//! Acquires and holds the user's current position and manages the
//! permission workflow around automatic acquisition.
//!
//! # Permission state machine
//!
//! ```text
//! Unknown --request--> Granted --refresh--> Granted
//!    |                    ^
//!    +------refusal-------|---> Denied --explicit retry--> Unknown
//! ```
//!
//! `Denied` is sticky: nothing in this module re-prompts the platform
//! on its own, and acquisition calls fail fast until the user retries.
//!
//! # Components
//!
//! - [`state`] - `UserLocation`, `LocationSource`, `PermissionState`
//! - [`source`] - `GeolocationSource` platform seam and the scripted
//!   `StaticSource` used by tests and headless demos
//! - [`service`] - `LocationService`: state machine, single-flight
//!   acquisition, change broadcasts
//! - [`error`] - `LocationError`

mod error;
mod service;
mod source;
mod state;

pub use error::LocationError;
pub use service::{LocationConfig, LocationService};
pub use source::{GeolocationSource, PositionFix, StaticSource};
pub use state::{LocationSource, PermissionState, UserLocation};
