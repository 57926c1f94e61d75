//! Single-page resolution: ancestor chain plus full subtree.

use super::map::{reduce_pages_to_tree, MapPageTreeOptions, PageTreeNode, ReducedPageTree};
use super::TreeError;
use crate::model::page::PageNode;
use crate::model::PageId;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Ancestors of a page plus its full subtree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetPageTree {
    /// Nearest ancestor first, root-level page last. Each ancestor carries
    /// only the child continuing the chain towards the target.
    pub parents: Vec<PageTreeNode>,
    pub target_page: PageTreeNode,
}

impl TargetPageTree {
    pub fn root(&self) -> &PageTreeNode {
        self.parents.last().unwrap_or(&self.target_page)
    }
}

/// Resolves `target_page_id` within a flat page list.
pub fn map_target_page_tree(
    target_page_id: PageId,
    items: &[PageNode],
    include_deleted: bool,
) -> Result<TargetPageTree, TreeError> {
    let reduced = reduce_pages_to_tree(
        items,
        &MapPageTreeOptions {
            root_page_ids: None,
            include_deleted,
        },
    );
    resolve_target(target_page_id, &reduced)
}

/// Resolves several targets over one shared page list.
///
/// Targets that are absent map to `None`; a parent cycle aborts the whole call.
pub fn multi_map_target_page_tree(
    target_page_ids: &[PageId],
    items: &[PageNode],
    include_deleted: bool,
) -> Result<HashMap<PageId, Option<TargetPageTree>>, TreeError> {
    let reduced = reduce_pages_to_tree(
        items,
        &MapPageTreeOptions {
            root_page_ids: None,
            include_deleted,
        },
    );
    let mut resolved = HashMap::with_capacity(target_page_ids.len());
    for target_page_id in target_page_ids {
        let tree = match resolve_target(*target_page_id, &reduced) {
            Ok(tree) => Some(tree),
            Err(TreeError::PageNotFound(_)) => None,
            Err(err) => return Err(err),
        };
        resolved.insert(*target_page_id, tree);
    }
    Ok(resolved)
}

fn resolve_target(
    target_page_id: PageId,
    reduced: &ReducedPageTree,
) -> Result<TargetPageTree, TreeError> {
    let chain = ancestor_chain(target_page_id, &reduced.item_map)?;
    let not_found = || TreeError::PageNotFound(target_page_id);

    let (root_id, below_root) = chain.split_first().ok_or_else(not_found)?;
    let mut current = reduced
        .root_nodes
        .iter()
        .find(|node| node.id() == *root_id)
        .ok_or_else(not_found)?;
    let mut ancestors = Vec::with_capacity(below_root.len());
    for next_id in below_root {
        ancestors.push(&current.page);
        current = current
            .children
            .iter()
            .find(|node| node.id() == *next_id)
            .ok_or_else(not_found)?;
    }

    let target_page = current.clone();
    let mut parents = Vec::with_capacity(ancestors.len());
    let mut continuing = target_page.clone();
    for ancestor in ancestors.into_iter().rev() {
        let pruned = PageTreeNode {
            page: ancestor.clone(),
            children: vec![continuing],
        };
        parents.push(pruned.clone());
        continuing = pruned;
    }

    Ok(TargetPageTree {
        parents,
        target_page,
    })
}

/// Root-first id chain ending at the target.
fn ancestor_chain(
    target_page_id: PageId,
    item_map: &HashMap<PageId, PageNode>,
) -> Result<Vec<PageId>, TreeError> {
    let target = item_map
        .get(&target_page_id)
        .ok_or(TreeError::PageNotFound(target_page_id))?;

    let mut chain = vec![target_page_id];
    let mut visited = HashSet::from([target_page_id]);
    let mut cursor = target.parent_id;
    while let Some(parent_id) = cursor {
        let Some(parent) = item_map.get(&parent_id) else {
            break;
        };
        if !visited.insert(parent_id) {
            return Err(TreeError::CycleDetected {
                page_id: target_page_id,
            });
        }
        chain.push(parent_id);
        cursor = parent.parent_id;
    }
    chain.reverse();
    Ok(chain)
}
