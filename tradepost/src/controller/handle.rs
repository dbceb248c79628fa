//! Client handle for the controller daemon.

use thiserror::Error;
use tokio::sync::mpsc;

use crate::catalog::{Item, ItemId};
use crate::filter::SearchRadius;
use crate::geo::Coordinate;

/// Error returned when the controller has been shut down.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControllerError {
    #[error("map controller has shut down")]
    Closed,
}

/// Commands accepted by the daemon.
#[derive(Debug)]
pub(crate) enum Command {
    SetCatalog(Vec<Item>),
    SetRadius(SearchRadius),
    Select(Option<ItemId>),
    BeginLocationPick(Coordinate),
    EndLocationPick,
}

/// Cloneable handle for feeding the map controller.
///
/// All methods enqueue a command for the daemon; rebuild-triggering
/// changes are debounced there, not here.
#[derive(Clone)]
pub struct ControllerHandle {
    commands_tx: mpsc::Sender<Command>,
}

impl ControllerHandle {
    pub(crate) fn new(commands_tx: mpsc::Sender<Command>) -> Self {
        Self { commands_tx }
    }

    /// Replace the catalog.
    pub async fn set_catalog(&self, items: Vec<Item>) -> Result<(), ControllerError> {
        self.send(Command::SetCatalog(items)).await
    }

    /// Change the search radius.
    pub async fn set_radius(&self, radius: SearchRadius) -> Result<(), ControllerError> {
        self.send(Command::SetRadius(radius)).await
    }

    /// Select an item (opens the detail overlay) or clear the
    /// selection with `None` (closes it).
    pub async fn select(&self, selection: Option<ItemId>) -> Result<(), ControllerError> {
        self.send(Command::Select(selection)).await
    }

    /// Show the draggable location-picking marker at `at`.
    pub async fn begin_location_pick(&self, at: Coordinate) -> Result<(), ControllerError> {
        self.send(Command::BeginLocationPick(at)).await
    }

    /// Hide the location-picking marker.
    pub async fn end_location_pick(&self) -> Result<(), ControllerError> {
        self.send(Command::EndLocationPick).await
    }

    async fn send(&self, command: Command) -> Result<(), ControllerError> {
        self.commands_tx
            .send(command)
            .await
            .map_err(|_| ControllerError::Closed)
    }
}
