//! Proximity filter.
//!
//! Turns a catalog, a user location, and a search radius into the
//! distance-sorted result set shown on the map and in list views. The
//! result is a deterministic function of exactly those inputs.
//!
//! The one non-obvious rule lives here: the category-inclusion
//! fallback. A plain filter-then-sort would show users in sparse areas
//! an empty category even though the catalog has items of it somewhere;
//! instead, every category present in the catalog is guaranteed at
//! least one representative in the result, radius or not.

use std::collections::HashSet;

use thiserror::Error;
use tracing::debug;

use crate::catalog::Item;
use crate::geo::distance_miles;
use crate::location::UserLocation;

/// Errors raised when constructing filter inputs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    /// Radius must be a positive, finite number of miles.
    #[error("invalid search radius: {0} (must be a positive, finite number of miles)")]
    InvalidRadius(f64),
}

/// Search radius in statute miles, with the "show everything" override.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchRadius {
    miles: f64,
    include_beyond_radius: bool,
}

impl SearchRadius {
    /// Create a radius; non-positive or non-finite miles are rejected.
    pub fn new(miles: f64) -> Result<Self, FilterError> {
        if !miles.is_finite() || miles <= 0.0 {
            return Err(FilterError::InvalidRadius(miles));
        }
        Ok(Self {
            miles,
            include_beyond_radius: false,
        })
    }

    /// Toggle the override that includes every item regardless of
    /// distance.
    pub fn with_include_beyond(mut self, include: bool) -> Self {
        self.include_beyond_radius = include;
        self
    }

    /// Radius in miles.
    #[inline]
    pub fn miles(&self) -> f64 {
        self.miles
    }

    /// Whether items beyond the radius are included anyway.
    #[inline]
    pub fn include_beyond_radius(&self) -> bool {
        self.include_beyond_radius
    }
}

/// A catalog item paired with its distance from the search origin.
///
/// `distance_miles` is derived at filter time and is not part of the
/// item's identity: equality compares the underlying item only.
#[derive(Debug, Clone)]
pub struct FilteredItem {
    /// The catalog entry.
    pub item: Item,
    /// Great-circle distance from the search origin, in miles.
    pub distance_miles: f64,
}

impl PartialEq for FilteredItem {
    fn eq(&self, other: &Self) -> bool {
        self.item == other.item
    }
}

/// Filter and order a catalog around the user's location.
///
/// 1. Every item's distance from `origin` is computed.
/// 2. Items within `radius` are included (all items, when the
///    include-beyond override is set).
/// 3. For each category present in the catalog but absent from that
///    primary set, its single nearest item is added regardless of
///    distance (ties broken by catalog order).
/// 4. The result is sorted ascending by distance; equidistant items
///    keep catalog order.
pub fn filter(catalog: &[Item], origin: &UserLocation, radius: &SearchRadius) -> Vec<FilteredItem> {
    let origin_coord = origin.coordinate();

    let distances: Vec<f64> = catalog
        .iter()
        .map(|item| distance_miles(origin_coord, item.coordinate))
        .collect();

    // Primary inclusion by radius (or the override).
    let mut included: Vec<usize> = (0..catalog.len())
        .filter(|&i| radius.include_beyond_radius() || distances[i] <= radius.miles())
        .collect();

    // Category-inclusion fallback: any category with catalog presence
    // but no primary hit contributes its nearest item.
    let covered: HashSet<&str> = included
        .iter()
        .map(|&i| catalog[i].category.as_str())
        .collect();

    let mut seen = HashSet::new();
    for item in catalog {
        let category = item.category.as_str();
        if !seen.insert(category) || covered.contains(category) {
            continue;
        }

        // Strict less-than keeps the earliest catalog entry on ties.
        let mut nearest: Option<usize> = None;
        for i in (0..catalog.len()).filter(|&i| catalog[i].category == category) {
            match nearest {
                Some(n) if distances[i] >= distances[n] => {}
                _ => nearest = Some(i),
            }
        }

        if let Some(i) = nearest {
            debug!(
                category,
                item = %catalog[i].id,
                distance = distances[i],
                "category fallback included item beyond radius"
            );
            included.push(i);
        }
    }

    // Ascending by distance, equidistant items in catalog order.
    included.sort_by(|&a, &b| {
        distances[a]
            .partial_cmp(&distances[b])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });

    included
        .into_iter()
        .map(|i| FilteredItem {
            item: catalog[i].clone(),
            distance_miles: distances[i],
        })
        .collect()
}
