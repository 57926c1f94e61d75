//! Pure page-tree algorithms.
//!
//! # Responsibility
//! - Build parent -> children forests from flat page lists.
//! - Resolve one page's ancestor chain and subtree.
//! - Find the nearest ancestor of a given page type.
//!
//! # Invariants
//! - Functions here never touch storage and hold no shared state.
//! - Siblings are ordered by `order_index ASC, created_at ASC`; negative
//!   indexes sort after all non-negative ones, by `created_at` only.
//! - Deleted pages are excluded unless `include_deleted` is requested.

use crate::model::PageId;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod ancestor;
pub mod map;
pub mod resolve;

pub use ancestor::{find_parent_of_type, find_parent_of_type_in_chain, has_parent_of_type};
pub use map::{
    compare_siblings, flatten_tree, map_page_tree, reduce_pages_to_tree, MapPageTreeOptions,
    PageTreeNode, ReducedPageTree,
};
pub use resolve::{map_target_page_tree, multi_map_target_page_tree, TargetPageTree};

/// Errors from tree resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// Target page is absent from the input (or filtered out as deleted).
    PageNotFound(PageId),
    /// The upward parent walk from `page_id` revisited a page.
    CycleDetected { page_id: PageId },
}

impl Display for TreeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PageNotFound(id) => write!(f, "page not found: {id}"),
            Self::CycleDetected { page_id } => {
                write!(f, "parent cycle detected above page {page_id}")
            }
        }
    }
}

impl Error for TreeError {}
