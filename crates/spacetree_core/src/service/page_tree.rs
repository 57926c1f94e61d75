//! Store-backed page tree resolution.
//!
//! # Responsibility
//! - Fetch one space's pages once and hand them to the pure resolver.
//! - Project page content out of results unless the full page is requested.

use crate::model::{PageId, SpaceId};
use crate::repo::store::{PageListQuery, StoreError, WorkspaceStore};
use crate::tree::{
    map_target_page_tree, multi_map_target_page_tree, PageTreeNode, TargetPageTree, TreeError,
};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from page tree resolution.
#[derive(Debug)]
pub enum ResolveError {
    /// Target page does not exist.
    PageNotFound(PageId),
    /// Pure resolution failure (missing target, parent cycle).
    Tree(TreeError),
    /// Store-level failure.
    Store(StoreError),
}

impl Display for ResolveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PageNotFound(id) => write!(f, "page not found: {id}"),
            Self::Tree(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ResolveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::PageNotFound(_) => None,
            Self::Tree(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<TreeError> for ResolveError {
    fn from(value: TreeError) -> Self {
        match value {
            TreeError::PageNotFound(id) => Self::PageNotFound(id),
            other => Self::Tree(other),
        }
    }
}

impl From<StoreError> for ResolveError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Resolution flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    pub include_deleted: bool,
    /// Keep the `content` document on every returned node.
    pub full_page: bool,
}

/// Resolves ancestors and subtree of one page.
pub fn resolve_page_tree<S: WorkspaceStore + ?Sized>(
    store: &S,
    page_id: PageId,
    options: ResolveOptions,
) -> Result<TargetPageTree, ResolveError> {
    let page = store
        .find_page(page_id)?
        .ok_or(ResolveError::PageNotFound(page_id))?;
    let pages = store.list_pages(&PageListQuery::Space {
        space_id: page.space_id,
        include_deleted: options.include_deleted,
    })?;

    let mut tree = map_target_page_tree(page_id, &pages, options.include_deleted)?;
    if !options.full_page {
        strip_target_tree(&mut tree);
    }
    Ok(tree)
}

/// Resolves several pages of one space over a single page fetch.
///
/// Unknown page ids map to `None`.
pub fn multi_resolve_page_tree<S: WorkspaceStore + ?Sized>(
    store: &S,
    space_id: SpaceId,
    page_ids: &[PageId],
    options: ResolveOptions,
) -> Result<HashMap<PageId, Option<TargetPageTree>>, ResolveError> {
    let pages = store.list_pages(&PageListQuery::Space {
        space_id,
        include_deleted: options.include_deleted,
    })?;

    let mut trees = multi_map_target_page_tree(page_ids, &pages, options.include_deleted)?;
    if !options.full_page {
        trees.values_mut().flatten().for_each(strip_target_tree);
    }
    Ok(trees)
}

fn strip_target_tree(tree: &mut TargetPageTree) {
    strip_content(&mut tree.target_page);
    tree.parents.iter_mut().for_each(strip_content);
}

fn strip_content(node: &mut PageTreeNode) {
    node.page.content = None;
    node.children.iter_mut().for_each(strip_content);
}
