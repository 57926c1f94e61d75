//! Single page duplication.
//!
//! # Responsibility
//! - Deep-clone one page under a fresh id, including the board/view/card
//!   sub-graph of board-like pages and the card block of card pages.
//! - Derive the copy's grants from its new parent.
//!
//! # Invariants
//! - Sources are never mutated.
//! - A board-like copy shares its id with its new board block; each copied
//!   card page shares its id with its new card block.
//! - Every row is written in one transaction.

use super::block_relink::{clone_block, relink_block_references, BlockCloneScope};
use crate::model::block::{BlockType, ContainerBlock};
use crate::model::now_epoch_ms;
use crate::model::page::{generate_page_path, PageNode};
use crate::model::permission::{PagePermission, PermissionAssignee, PermissionLevel};
use crate::model::{PageId, UserId};
use crate::repo::store::{BlockListQuery, PageListQuery, StoreError, WorkspaceStore};
use crate::repo::write_batch::WriteBatch;
use log::{error, info};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;
use uuid::Uuid;

/// Errors from page duplication.
#[derive(Debug)]
pub enum DuplicateError {
    /// Source page does not exist or is deleted.
    PageNotFound(PageId),
    /// Requested parent does not exist in the source page's space.
    ParentNotFound(PageId),
    /// Store-level failure.
    Store(StoreError),
}

impl Display for DuplicateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PageNotFound(id) => write!(f, "page not found: {id}"),
            Self::ParentNotFound(id) => write!(f, "parent page not found: {id}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DuplicateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for DuplicateError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Input of [`duplicate_page`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicatePageRequest {
    pub page_id: PageId,
    /// Acting user; owns every created row.
    pub user_id: UserId,
    /// Overrides the source page's own parent.
    pub parent_id: Option<PageId>,
}

/// Duplicates one page and returns the created page.
///
/// # Side effects
/// - Emits `page_duplicate` logging events.
pub fn duplicate_page<S: WorkspaceStore + ?Sized>(
    store: &S,
    request: &DuplicatePageRequest,
) -> Result<PageNode, DuplicateError> {
    let started_at = Instant::now();
    info!(
        "event=page_duplicate module=service status=start page_id={}",
        request.page_id
    );

    match duplicate_inner(store, request) {
        Ok(page) => {
            info!(
                "event=page_duplicate module=service status=ok page_id={} new_page_id={} duration_ms={}",
                request.page_id,
                page.id,
                started_at.elapsed().as_millis()
            );
            Ok(page)
        }
        Err(err) => {
            error!(
                "event=page_duplicate module=service status=error page_id={} duration_ms={} error={err}",
                request.page_id,
                started_at.elapsed().as_millis()
            );
            Err(err)
        }
    }
}

fn duplicate_inner<S: WorkspaceStore + ?Sized>(
    store: &S,
    request: &DuplicatePageRequest,
) -> Result<PageNode, DuplicateError> {
    let source = store
        .find_page(request.page_id)?
        .filter(|page| !page.is_deleted())
        .ok_or(DuplicateError::PageNotFound(request.page_id))?;

    let parent_id = resolve_parent(store, &source, request.parent_id)?;
    let now = now_epoch_ms();
    let new_id = Uuid::new_v4();

    let mut page = copy_page_row(&source, new_id, parent_id, request.user_id, now);
    page.title = format!("{} (copy)", source.title);

    let mut batch = WriteBatch::new();
    let page_permissions = derive_permissions(store, new_id, parent_id, &source)?;

    let scope = BlockCloneScope {
        space_id: source.space_id,
        created_by: request.user_id,
        now,
    };

    let mut card_pages = Vec::new();
    if source.kind.is_board_like() {
        let blocks = store.list_blocks(&BlockListQuery::BoardSubgraph(source.id))?;
        let (board_blocks, copied_cards) =
            clone_board_subgraph(store, &source, new_id, &blocks, &scope)?;
        page.board_id = board_blocks
            .iter()
            .any(|block| block.id == new_id)
            .then_some(new_id);
        batch.blocks = board_blocks;
        card_pages = copied_cards;
    } else if source.kind.is_card() {
        let card_blocks = store.list_blocks(&BlockListQuery::Ids(vec![source.id]))?;
        if let Some(card) = card_blocks
            .iter()
            .find(|block| block.kind == BlockType::Card)
        {
            batch
                .blocks
                .push(clone_block(card, new_id, card.root_id, &scope));
            page.card_id = Some(new_id);
        }
    }

    let card_permissions: Vec<PagePermission> = card_pages
        .iter()
        .flat_map(|card_page| {
            page_permissions
                .iter()
                .map(move |permission| permission.inherited_by(card_page.id))
        })
        .collect();
    batch.page_permissions = page_permissions;
    batch.page_permissions.extend(card_permissions);
    batch.pages.push(page);
    batch.pages.extend(card_pages);

    store.commit(&batch)?;

    store
        .find_page(new_id)?
        .ok_or(DuplicateError::PageNotFound(new_id))
}

fn resolve_parent<S: WorkspaceStore + ?Sized>(
    store: &S,
    source: &PageNode,
    requested: Option<PageId>,
) -> Result<Option<PageId>, DuplicateError> {
    if let Some(parent_id) = requested {
        let parent = store
            .find_page(parent_id)?
            .filter(|parent| !parent.is_deleted() && parent.space_id == source.space_id)
            .ok_or(DuplicateError::ParentNotFound(parent_id))?;
        return Ok(Some(parent.id));
    }

    match source.parent_id {
        Some(parent_id) => {
            let live = store
                .find_page(parent_id)?
                .is_some_and(|parent| !parent.is_deleted());
            Ok(live.then_some(parent_id))
        }
        None => Ok(None),
    }
}

fn copy_page_row(
    source: &PageNode,
    new_id: PageId,
    parent_id: Option<PageId>,
    created_by: UserId,
    now: i64,
) -> PageNode {
    PageNode {
        id: new_id,
        parent_id,
        path: generate_page_path(),
        bounty_id: None,
        proposal_id: None,
        board_id: None,
        card_id: None,
        created_by,
        created_at: now,
        updated_at: now,
        deleted_at: None,
        ..source.clone()
    }
}

/// Grants of the copy: inherited from the new parent, or one space-wide
/// grant for a root-level copy.
fn derive_permissions<S: WorkspaceStore + ?Sized>(
    store: &S,
    new_id: PageId,
    parent_id: Option<PageId>,
    source: &PageNode,
) -> Result<Vec<PagePermission>, DuplicateError> {
    let inherited: Vec<PagePermission> = match parent_id {
        Some(parent_id) => store
            .list_page_permissions(&[parent_id])?
            .iter()
            .map(|permission| permission.inherited_by(new_id))
            .collect(),
        None => Vec::new(),
    };
    if !inherited.is_empty() {
        return Ok(inherited);
    }
    Ok(vec![PagePermission::direct(
        new_id,
        PermissionLevel::FullAccess,
        PermissionAssignee::Space(source.space_id),
    )])
}

/// Clones board, views and cards; returns the new blocks and card pages.
fn clone_board_subgraph<S: WorkspaceStore + ?Sized>(
    store: &S,
    source: &PageNode,
    new_board_id: PageId,
    blocks: &[ContainerBlock],
    scope: &BlockCloneScope,
) -> Result<(Vec<ContainerBlock>, Vec<PageNode>), DuplicateError> {
    let board = blocks
        .iter()
        .find(|block| block.id == source.id && block.kind == BlockType::Board);
    let views = child_blocks(blocks, source.id, BlockType::View);
    let all_cards = child_blocks(blocks, source.id, BlockType::Card);
    let card_ids: Vec<Uuid> = all_cards.iter().map(|card| card.id).collect();
    let live_card_pages: Vec<PageNode> = store
        .list_pages(&PageListQuery::Ids(card_ids))?
        .into_iter()
        .filter(|card_page| !card_page.is_deleted())
        .collect();
    // Card blocks without a live card page are left behind.
    let cards: Vec<&ContainerBlock> = all_cards
        .into_iter()
        .filter(|card| live_card_pages.iter().any(|page| page.id == card.id))
        .collect();

    let mut ids: HashMap<Uuid, Uuid> = HashMap::from([(source.id, new_board_id)]);
    for block in views.iter().chain(cards.iter()) {
        ids.insert(block.id, Uuid::new_v4());
    }

    let mut cloned = Vec::with_capacity(1 + views.len() + cards.len());
    if let Some(board) = board {
        cloned.push(clone_block(board, new_board_id, new_board_id, scope));
    }
    for block in views.iter().chain(cards.iter()) {
        if let Some(new_id) = ids.get(&block.id) {
            cloned.push(clone_block(block, *new_id, new_board_id, scope));
        }
    }
    for block in &mut cloned {
        relink_block_references(block, &ids);
    }

    let card_pages = live_card_pages
        .into_iter()
        .filter_map(|card_page| {
            let new_card_id = *ids.get(&card_page.id)?;
            let mut copy = copy_page_row(
                &card_page,
                new_card_id,
                Some(new_board_id),
                scope.created_by,
                scope.now,
            );
            copy.card_id = Some(new_card_id);
            Some(copy)
        })
        .collect();

    Ok((cloned, card_pages))
}

fn child_blocks(
    blocks: &[ContainerBlock],
    board_id: PageId,
    kind: BlockType,
) -> Vec<&ContainerBlock> {
    blocks
        .iter()
        .filter(|block| block.kind == kind && block.parent_id == Some(board_id))
        .collect()
}
