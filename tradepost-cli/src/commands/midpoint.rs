//! `midpoint` - approximate meetup point between two coordinates.

use clap::Args;

use tradepost::geo::{self, Coordinate};

use crate::error::CliError;

#[derive(Args)]
pub struct MidpointArgs {
    /// First party's latitude
    #[arg(long)]
    pub lat_a: f64,

    /// First party's longitude
    #[arg(long)]
    pub lon_a: f64,

    /// Second party's latitude
    #[arg(long)]
    pub lat_b: f64,

    /// Second party's longitude
    #[arg(long)]
    pub lon_b: f64,
}

pub fn run(args: &MidpointArgs) -> Result<(), CliError> {
    let a = Coordinate::new(args.lat_a, args.lon_a)?;
    let b = Coordinate::new(args.lat_b, args.lon_b)?;

    let distance = geo::distance_miles(a, b);
    let midpoint = geo::midpoint(a, b);

    println!("Parties are {:.1} miles apart.", distance);
    println!("Suggested meetup point (approximate): {}", midpoint);
    Ok(())
}
