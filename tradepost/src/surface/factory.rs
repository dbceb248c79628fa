//! Surface backend selection and initialization.
//!
//! Backend startup is the one asynchronous, fallible step of the map
//! layer: a real tiled backend loads scripts and tiles over the
//! network. Callers hand the `Result` to the map controller, which
//! degrades to list-only operation on failure instead of crashing.

use tracing::info;

use super::headless::{HeadlessConfig, HeadlessSurface};
use super::null::NullSurface;
use super::{MapSurface, SurfaceError};

/// Which backend to initialize.
#[derive(Debug, Clone)]
pub enum SurfaceConfig {
    /// No-op placeholder for environments without a map.
    Null,
    /// In-memory backend with real projection and clustering.
    Headless(HeadlessConfig),
}

/// Initialize the configured backend.
pub async fn create(config: &SurfaceConfig) -> Result<Box<dyn MapSurface>, SurfaceError> {
    let surface: Box<dyn MapSurface> = match config {
        SurfaceConfig::Null => Box::new(NullSurface::new()),
        SurfaceConfig::Headless(headless) => Box::new(HeadlessSurface::new(headless.clone())),
    };
    info!(backend = surface.name(), "map surface initialized");
    Ok(surface)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_creates_null_backend() {
        let surface = create(&SurfaceConfig::Null).await.unwrap();
        assert_eq!(surface.name(), "null");
    }

    #[tokio::test]
    async fn test_creates_headless_backend() {
        let surface = create(&SurfaceConfig::Headless(HeadlessConfig::default()))
            .await
            .unwrap();
        assert_eq!(surface.name(), "headless");
    }
}
