//! Marker reconciliation.
//!
//! A filter pass does not rebuild the whole marker set: handles for
//! items still in the result are left untouched, so unchanged markers
//! never flicker. This diff is pure so it can be tested without a
//! surface.

use std::collections::{HashMap, HashSet};

use crate::catalog::ItemId;
use crate::filter::FilteredItem;
use crate::surface::MarkerHandle;

/// The changes needed to bring the live marker set in line with a
/// filter result.
#[derive(Debug, PartialEq)]
pub(crate) struct MarkerDiff {
    /// Markers whose items dropped out of the result.
    pub to_remove: Vec<ItemId>,
    /// Result items that have no marker yet, in result order.
    pub to_place: Vec<ItemId>,
}

/// Diff the live marker set against a fresh filter result.
pub(crate) fn diff_markers(
    current: &HashMap<ItemId, MarkerHandle>,
    next: &[FilteredItem],
) -> MarkerDiff {
    let next_ids: HashSet<ItemId> = next.iter().map(|f| f.item.id).collect();

    let mut to_remove: Vec<ItemId> = current
        .keys()
        .filter(|id| !next_ids.contains(id))
        .copied()
        .collect();
    to_remove.sort();

    let to_place: Vec<ItemId> = next
        .iter()
        .map(|f| f.item.id)
        .filter(|id| !current.contains_key(id))
        .collect();

    MarkerDiff {
        to_remove,
        to_place,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Item;
    use crate::geo::Coordinate;

    fn filtered(id: u64) -> FilteredItem {
        FilteredItem {
            item: Item {
                id: ItemId(id),
                title: format!("Item {}", id),
                category: "tools".into(),
                coordinate: Coordinate::new(40.0, -74.0).unwrap(),
                value: 1,
            },
            distance_miles: 1.0,
        }
    }

    fn live(ids: &[u64]) -> HashMap<ItemId, MarkerHandle> {
        ids.iter()
            .map(|&id| (ItemId(id), MarkerHandle::new(ItemId(id), id)))
            .collect()
    }

    #[test]
    fn test_empty_to_empty() {
        let diff = diff_markers(&HashMap::new(), &[]);
        assert!(diff.to_remove.is_empty());
        assert!(diff.to_place.is_empty());
    }

    #[test]
    fn test_all_new_markers_placed_in_result_order() {
        let next = vec![filtered(3), filtered(1), filtered(2)];
        let diff = diff_markers(&HashMap::new(), &next);

        assert!(diff.to_remove.is_empty());
        assert_eq!(diff.to_place, vec![ItemId(3), ItemId(1), ItemId(2)]);
    }

    #[test]
    fn test_stale_markers_removed() {
        let current = live(&[1, 2, 3]);
        let next = vec![filtered(2)];
        let diff = diff_markers(&current, &next);

        assert_eq!(diff.to_remove, vec![ItemId(1), ItemId(3)]);
        assert!(diff.to_place.is_empty());
    }

    #[test]
    fn test_unchanged_markers_left_alone() {
        let current = live(&[1, 2]);
        let next = vec![filtered(2), filtered(5)];
        let diff = diff_markers(&current, &next);

        assert_eq!(diff.to_remove, vec![ItemId(1)]);
        assert_eq!(diff.to_place, vec![ItemId(5)]);
        // ItemId(2) appears in neither list: its handle survives
        assert!(!diff.to_remove.contains(&ItemId(2)));
        assert!(!diff.to_place.contains(&ItemId(2)));
    }
}
