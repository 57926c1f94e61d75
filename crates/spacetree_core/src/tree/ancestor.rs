//! Nearest ancestor lookup by page type.

use crate::model::page::{PageNode, PageType};
use crate::model::PageId;
use std::collections::{HashMap, HashSet};

/// Walks up from `page_id` and returns the first ancestor of `page_type`.
///
/// The starting page itself is not considered. Returns `None` when the chain
/// ends, leaves the map, or loops back on itself.
pub fn find_parent_of_type(
    page_id: PageId,
    page_type: PageType,
    page_map: &HashMap<PageId, PageNode>,
) -> Option<PageId> {
    let mut current = page_map.get(&page_id)?;
    let mut visited = HashSet::from([page_id]);
    loop {
        let parent = page_map.get(&current.parent_id?)?;
        if parent.kind == page_type {
            return Some(parent.id);
        }
        if !visited.insert(parent.id) {
            return None;
        }
        current = parent;
    }
}

/// Same lookup over an already-resolved ancestor list (nearest first).
pub fn find_parent_of_type_in_chain<N: AsRef<PageNode>>(
    parents: &[N],
    page_type: PageType,
) -> Option<PageId> {
    parents
        .iter()
        .map(AsRef::as_ref)
        .find(|parent| parent.kind == page_type)
        .map(|parent| parent.id)
}

/// Whether any ancestor of `page_id` has one of `page_types`.
pub fn has_parent_of_type(
    page_id: PageId,
    page_types: &[PageType],
    page_map: &HashMap<PageId, PageNode>,
) -> bool {
    page_types
        .iter()
        .any(|page_type| find_parent_of_type(page_id, *page_type, page_map).is_some())
}
