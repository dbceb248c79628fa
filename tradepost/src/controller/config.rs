//! Controller configuration.

use std::time::Duration;

/// Tuning knobs for the map controller.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Settling period for radius/location/catalog changes. A burst of
    /// changes inside this window triggers a single rebuild using the
    /// final values.
    pub debounce: Duration,

    /// Re-center the view on the search origin after each rebuild.
    pub follow_origin: bool,

    /// Capacity of the output event broadcast channel.
    pub event_capacity: usize,

    /// Capacity of the command channel feeding the daemon.
    pub command_capacity: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(250),
            follow_origin: true,
            event_capacity: 32,
            command_capacity: 32,
        }
    }
}
