//! Catalog item types.
//!
//! Items are owned by an external data source and treated as read-only
//! here: the engine receives them as an ordered sequence per filter pass
//! and never mutates them. Catalog order is significant — it is the
//! tie-breaker for equidistant results.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// Identifier of a catalog item.
///
/// Also keys the marker set on the map surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item#{}", self.0)
    }
}

/// An immutable tradeable item in the marketplace catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Stable identifier, unique within a catalog.
    pub id: ItemId,
    /// Listing title shown to users.
    pub title: String,
    /// Free-form category tag ("tools", "electronics", ...).
    pub category: String,
    /// Where the item is offered.
    pub coordinate: Coordinate,
    /// Asking value in whole currency units.
    pub value: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_id_display() {
        assert_eq!(ItemId(42).to_string(), "item#42");
    }

    #[test]
    fn test_item_deserializes_from_catalog_json() {
        let json = r#"{
            "id": 7,
            "title": "Cordless drill",
            "category": "tools",
            "coordinate": {"latitude": 40.73, "longitude": -73.99},
            "value": 45
        }"#;

        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, ItemId(7));
        assert_eq!(item.category, "tools");
        assert_eq!(item.value, 45);
    }

    #[test]
    fn test_item_with_invalid_coordinate_rejected() {
        let json = r#"{
            "id": 7,
            "title": "Cordless drill",
            "category": "tools",
            "coordinate": {"latitude": 91.0, "longitude": 0.0},
            "value": 45
        }"#;

        let result: Result<Item, _> = serde_json::from_str(json);
        assert!(result.is_err(), "Out-of-range coordinate should fail");
    }
}
