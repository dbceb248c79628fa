//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and a
//! `run` handler.
//!
//! # Command Modules
//!
//! - [`search`] - Filter and rank a catalog around an origin
//! - [`midpoint`] - Approximate meetup point between two coordinates

pub mod midpoint;
pub mod search;
