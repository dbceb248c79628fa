//! Tradepost - geospatial proximity search and map engine for a
//! peer-to-peer trading marketplace.
//!
//! The engine takes a user's location, a catalog of tradeable items,
//! and a search radius, and produces a distance-sorted,
//! category-balanced result set plus a marker/cluster view kept in
//! sync across a pluggable map backend.
//!
//! # High-Level Flow
//!
//! ```ignore
//! use tradepost::controller::{ControllerConfig, MapController};
//! use tradepost::filter::SearchRadius;
//! use tradepost::location::{LocationService, StaticSource};
//! use tradepost::surface::{self, SurfaceConfig};
//!
//! let location = LocationService::new(StaticSource::granting(40.71, -74.00));
//! let surface = surface::create(&SurfaceConfig::Null).await;
//!
//! let controller = MapController::new(
//!     surface,
//!     location.subscribe(),
//!     SearchRadius::new(5.0)?,
//!     ControllerConfig::default(),
//! );
//!
//! controller.handle().set_catalog(catalog).await?;
//! location.request_permission().await?;
//! // controller.subscribe() now yields FilteredItemsChanged events
//! ```

pub mod catalog;
pub mod controller;
pub mod filter;
pub mod geo;
pub mod location;
pub mod logging;
pub mod surface;

/// Version of the Tradepost library and CLI.
///
/// Synchronized across the workspace; injected from `Cargo.toml` at
/// compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
