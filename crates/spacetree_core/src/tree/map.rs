//! Flat page list -> ordered forest.

use crate::model::page::PageNode;
use crate::model::PageId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// One page with its ordered children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageTreeNode {
    #[serde(flatten)]
    pub page: PageNode,
    #[serde(default)]
    pub children: Vec<PageTreeNode>,
}

impl PageTreeNode {
    pub fn leaf(page: PageNode) -> Self {
        Self {
            page,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> PageId {
        self.page.id
    }

    /// Number of pages in this subtree, including this one.
    pub fn page_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(PageTreeNode::page_count)
            .sum::<usize>()
    }
}

impl AsRef<PageNode> for PageTreeNode {
    fn as_ref(&self) -> &PageNode {
        &self.page
    }
}

impl AsRef<PageNode> for PageNode {
    fn as_ref(&self) -> &PageNode {
        self
    }
}

/// Forest construction options.
#[derive(Debug, Clone, Copy, Default)]
pub struct MapPageTreeOptions<'a> {
    /// When set, only these pages are emitted as roots (each with its subtree).
    pub root_page_ids: Option<&'a [PageId]>,
    pub include_deleted: bool,
}

/// Forest plus an index of every page that took part in it.
#[derive(Debug, Clone, Default)]
pub struct ReducedPageTree {
    pub root_nodes: Vec<PageTreeNode>,
    pub item_map: HashMap<PageId, PageNode>,
}

/// Builds the forest and keeps the page index used to build it.
///
/// A page whose parent is missing, filtered out, itself, or would close a
/// parent cycle becomes a root instead of being dropped.
pub fn reduce_pages_to_tree(
    items: &[PageNode],
    options: &MapPageTreeOptions<'_>,
) -> ReducedPageTree {
    let mut seen = HashSet::new();
    let visible: Vec<&PageNode> = items
        .iter()
        .filter(|page| options.include_deleted || !page.is_deleted())
        .filter(|page| seen.insert(page.id))
        .collect();
    let index: HashMap<PageId, &PageNode> = visible.iter().map(|page| (page.id, *page)).collect();

    let mut attached_to: HashMap<PageId, PageId> = HashMap::new();
    let mut children: HashMap<PageId, Vec<&PageNode>> = HashMap::new();
    let mut unresolved: Vec<&PageNode> = Vec::new();

    for page in &visible {
        let parent_id = page
            .parent_id
            .filter(|parent_id| *parent_id != page.id && index.contains_key(parent_id));
        match parent_id {
            Some(parent_id) if !closes_cycle(page.id, parent_id, &attached_to) => {
                attached_to.insert(page.id, parent_id);
                children.entry(parent_id).or_default().push(page);
            }
            _ => unresolved.push(page),
        }
    }

    for siblings in children.values_mut() {
        siblings.sort_by(|a, b| compare_siblings(a, b));
    }

    let mut roots: Vec<&PageNode> = match options.root_page_ids {
        Some(allowed) => visible
            .iter()
            .copied()
            .filter(|page| allowed.contains(&page.id))
            .collect(),
        None => unresolved,
    };
    roots.sort_by(|a, b| compare_siblings(a, b));

    ReducedPageTree {
        root_nodes: roots
            .into_iter()
            .map(|root| build_node(root, &children))
            .collect(),
        item_map: visible
            .into_iter()
            .map(|page| (page.id, page.clone()))
            .collect(),
    }
}

/// Maps a flat page list to its ordered root nodes.
pub fn map_page_tree(items: &[PageNode], options: &MapPageTreeOptions<'_>) -> Vec<PageTreeNode> {
    reduce_pages_to_tree(items, options).root_nodes
}

/// Sibling ordering shared by every tree producer.
pub fn compare_siblings(a: &PageNode, b: &PageNode) -> Ordering {
    let by_position = match (a.order_index < 0, b.order_index < 0) {
        (false, false) => a
            .order_index
            .cmp(&b.order_index)
            .then(a.created_at.cmp(&b.created_at)),
        (true, true) => a.created_at.cmp(&b.created_at),
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
    };
    by_position.then_with(|| a.id.cmp(&b.id))
}

/// Pre-order listing of every page in `node`'s subtree.
pub fn flatten_tree(node: &PageTreeNode) -> Vec<&PageNode> {
    let mut pages = Vec::with_capacity(node.page_count());
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        pages.push(&current.page);
        stack.extend(current.children.iter().rev());
    }
    pages
}

fn closes_cycle(
    page_id: PageId,
    parent_id: PageId,
    attached_to: &HashMap<PageId, PageId>,
) -> bool {
    let mut visited = HashSet::new();
    let mut cursor = Some(parent_id);
    while let Some(current) = cursor {
        if current == page_id || !visited.insert(current) {
            return true;
        }
        cursor = attached_to.get(&current).copied();
    }
    false
}

fn build_node(page: &PageNode, children: &HashMap<PageId, Vec<&PageNode>>) -> PageTreeNode {
    let nested = children
        .get(&page.id)
        .map(|siblings| {
            siblings
                .iter()
                .map(|child| build_node(child, children))
                .collect()
        })
        .unwrap_or_default();
    PageTreeNode {
        page: page.clone(),
        children: nested,
    }
}
