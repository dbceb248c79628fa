//! `search` - filter and rank a catalog around an origin.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use tracing::info;

use tradepost::catalog::Item;
use tradepost::filter::{filter, FilteredItem, SearchRadius};
use tradepost::geo::Coordinate;
use tradepost::location::UserLocation;
use tradepost::surface::{icon_for, HeadlessConfig, HeadlessSurface, MapSurface};

use crate::error::CliError;

#[derive(Args)]
pub struct SearchArgs {
    /// Path to the catalog JSON file (array of items)
    #[arg(long)]
    pub catalog: PathBuf,

    /// Origin latitude in decimal degrees
    #[arg(long)]
    pub lat: f64,

    /// Origin longitude in decimal degrees
    #[arg(long)]
    pub lon: f64,

    /// Search radius in miles
    #[arg(long, default_value = "5.0")]
    pub radius: f64,

    /// Include every item regardless of distance
    #[arg(long)]
    pub include_beyond: bool,

    /// Also print the marker cluster view at the given zoom
    #[arg(long)]
    pub cluster_zoom: Option<u8>,
}

pub fn run(args: &SearchArgs) -> Result<(), CliError> {
    let catalog = load_catalog(&args.catalog)?;
    let origin = UserLocation::from_manual(
        Coordinate::new(args.lat, args.lon)?,
        format!("{}, {}", args.lat, args.lon),
    );
    let radius = SearchRadius::new(args.radius)?.with_include_beyond(args.include_beyond);

    info!(
        catalog = %args.catalog.display(),
        items = catalog.len(),
        radius = radius.miles(),
        "running proximity search"
    );
    let results = filter(&catalog, &origin, &radius);

    println!(
        "{} of {} items within {} miles of {}:",
        results.len(),
        catalog.len(),
        radius.miles(),
        origin.coordinate()
    );
    println!();
    println!("{:>8}  {:<28} {:<12} {:>7}", "MILES", "TITLE", "CATEGORY", "VALUE");
    for f in &results {
        let beyond = if f.distance_miles > radius.miles() {
            "  (category fallback)"
        } else {
            ""
        };
        println!(
            "{:>8.1}  {:<28} {:<12} {:>7}{}",
            f.distance_miles, f.item.title, f.item.category, f.item.value, beyond
        );
    }

    if let Some(zoom) = args.cluster_zoom {
        print_clusters(&results, zoom);
    }

    Ok(())
}

fn load_catalog(path: &PathBuf) -> Result<Vec<Item>, CliError> {
    let raw = fs::read_to_string(path).map_err(|error| CliError::CatalogRead {
        path: path.clone(),
        error,
    })?;
    serde_json::from_str(&raw).map_err(|error| CliError::CatalogParse {
        path: path.clone(),
        error,
    })
}

/// Render the result set through the headless backend and print its
/// cluster view.
fn print_clusters(results: &[FilteredItem], zoom: u8) {
    let mut surface = HeadlessSurface::new(HeadlessConfig::default());
    let remote = surface.remote();

    for f in results {
        // Placement only fails on backend loss, which the headless
        // backend cannot experience.
        let _ = surface.place_marker(&f.item, icon_for(&f.item.category));
    }
    surface.set_zoom(zoom);

    let clusters = remote.clusters();
    println!();
    if clusters.is_empty() {
        println!("No marker clusters at zoom {}.", zoom);
        return;
    }
    println!("Marker clusters at zoom {}:", zoom);
    for (i, cluster) in clusters.iter().enumerate() {
        println!(
            "  #{}: {} markers around {}",
            i + 1,
            cluster.members.len(),
            cluster.bounds.center()
        );
    }
}
