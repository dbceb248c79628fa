//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent
//! formatting and a nonzero exit code.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process;

use tradepost::filter::FilterError;
use tradepost::geo::GeoError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(io::Error),
    /// Failed to read the catalog file
    CatalogRead { path: PathBuf, error: io::Error },
    /// Catalog file is not valid JSON for a list of items
    CatalogParse {
        path: PathBuf,
        error: serde_json::Error,
    },
    /// An origin or meetup coordinate is out of range
    Coordinate(GeoError),
    /// The search radius is not a positive number of miles
    Radius(FilterError),
}

impl CliError {
    /// Exit the process with an error message and code 1.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        if let CliError::CatalogParse { .. } = self {
            eprintln!();
            eprintln!("A catalog is a JSON array of items, for example:");
            eprintln!(
                "  [{{\"id\": 1, \"title\": \"Cordless drill\", \"category\": \"tools\","
            );
            eprintln!(
                "    \"coordinate\": {{\"latitude\": 40.73, \"longitude\": -73.99}}, \"value\": 45}}]"
            );
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(e) => write!(f, "Failed to initialize logging: {}", e),
            CliError::CatalogRead { path, error } => {
                write!(f, "Failed to read catalog {}: {}", path.display(), error)
            }
            CliError::CatalogParse { path, error } => {
                write!(f, "Failed to parse catalog {}: {}", path.display(), error)
            }
            CliError::Coordinate(e) => write!(f, "{}", e),
            CliError::Radius(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::LoggingInit(e) => Some(e),
            CliError::CatalogRead { error, .. } => Some(error),
            CliError::CatalogParse { error, .. } => Some(error),
            CliError::Coordinate(e) => Some(e),
            CliError::Radius(e) => Some(e),
        }
    }
}

impl From<GeoError> for CliError {
    fn from(e: GeoError) -> Self {
        CliError::Coordinate(e)
    }
}

impl From<FilterError> for CliError {
    fn from(e: FilterError) -> Self {
        CliError::Radius(e)
    }
}
