//! Workspace page export.
//!
//! # Responsibility
//! - Load one space's live pages as a forest and attach every specialized
//!   payload a later import needs.
//! - Optionally persist the result as a named snapshot file.

use super::snapshot::{
    write_snapshot, ExportedBlocks, ExportedPage, ExportedRole, WorkspacePagesExport,
};
use super::{TemplateError, TemplateResult};
use crate::model::block::BlockType;
use crate::model::page::PageNode;
use crate::model::permission::PagePermission;
use crate::model::{PageId, SpaceId};
use crate::repo::store::{BlockListQuery, PageListQuery, WorkspaceStore};
use crate::tree::{map_page_tree, MapPageTreeOptions, PageTreeNode};
use log::{error, info};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;

/// Export flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportOptions {
    /// Writes the snapshot to `<export_dir>/<snapshot_name>` when set.
    pub snapshot_name: Option<String>,
    pub export_dir: Option<PathBuf>,
}

/// Snapshot plus the file it was written to, if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportWorkspacePagesResult {
    pub data: WorkspacePagesExport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Exports every live page forest of a space.
///
/// # Errors
/// - `InvalidInput` for a blank space key, or a snapshot name without an
///   export directory.
/// - `NotFound` when no space matches the id or domain.
///
/// # Side effects
/// - Emits `workspace_export` logging events.
pub fn export_workspace_pages<S: WorkspaceStore + ?Sized>(
    store: &S,
    space_id_or_domain: &str,
    options: &ExportOptions,
) -> TemplateResult<ExportWorkspacePagesResult> {
    let started_at = Instant::now();
    info!(
        "event=workspace_export module=templates status=start space={}",
        space_id_or_domain
    );

    match export_inner(store, space_id_or_domain, options) {
        Ok(result) => {
            info!(
                "event=workspace_export module=templates status=ok space={} page_count={} written={} duration_ms={}",
                space_id_or_domain,
                result.data.page_count(),
                result.path.is_some(),
                started_at.elapsed().as_millis()
            );
            Ok(result)
        }
        Err(err) => {
            error!(
                "event=workspace_export module=templates status=error space={} duration_ms={} error={err}",
                space_id_or_domain,
                started_at.elapsed().as_millis()
            );
            Err(err)
        }
    }
}

fn export_inner<S: WorkspaceStore + ?Sized>(
    store: &S,
    space_id_or_domain: &str,
    options: &ExportOptions,
) -> TemplateResult<ExportWorkspacePagesResult> {
    let key = space_id_or_domain.trim();
    if key.is_empty() {
        return Err(TemplateError::InvalidInput(
            "space id or domain is required".to_string(),
        ));
    }
    let space = store
        .find_space(key)?
        .ok_or_else(|| TemplateError::NotFound(format!("space `{key}`")))?;

    let data = export_space(store, space.id)?;

    let path = match &options.snapshot_name {
        Some(name) => {
            let dir = options.export_dir.as_deref().ok_or_else(|| {
                TemplateError::InvalidInput(
                    "an export directory is required to write a snapshot".to_string(),
                )
            })?;
            Some(write_snapshot(dir, name, &data)?)
        }
        None => None,
    };

    Ok(ExportWorkspacePagesResult { data, path })
}

fn export_space<S: WorkspaceStore + ?Sized>(
    store: &S,
    space_id: SpaceId,
) -> TemplateResult<WorkspacePagesExport> {
    let pages = store.list_pages(&PageListQuery::Space {
        space_id,
        include_deleted: false,
    })?;
    let forest = map_page_tree(&pages, &MapPageTreeOptions::default());

    let page_ids: Vec<PageId> = pages.iter().map(|page| page.id).collect();
    let mut permissions: HashMap<PageId, Vec<PagePermission>> = HashMap::new();
    for permission in store.list_page_permissions(&page_ids)? {
        permissions
            .entry(permission.page_id)
            .or_default()
            .push(permission);
    }

    let exported = forest
        .into_iter()
        .map(|root| export_node(store, root, &mut permissions))
        .collect::<TemplateResult<Vec<_>>>()?;

    let roles = store
        .list_roles(space_id)?
        .into_iter()
        .map(|role| ExportedRole {
            id: role.id,
            name: role.name,
        })
        .collect();

    Ok(WorkspacePagesExport {
        pages: exported,
        roles,
    })
}

fn export_node<S: WorkspaceStore + ?Sized>(
    store: &S,
    node: PageTreeNode,
    permissions: &mut HashMap<PageId, Vec<PagePermission>>,
) -> TemplateResult<ExportedPage> {
    let PageTreeNode { page, children } = node;
    let mut exported = ExportedPage::new(page);
    let page = &exported.page;

    exported.permissions = permissions.remove(&page.id).unwrap_or_default();
    exported.blocks = export_blocks(store, page)?;
    exported.proposal = match page.proposal_id {
        Some(proposal_id) => store.find_proposal(proposal_id)?,
        None => None,
    };
    exported.bounty = match page.bounty_id {
        Some(bounty_id) => store.find_bounty(bounty_id)?,
        None => None,
    };
    exported.votes = store.list_votes(page.id)?;

    exported.children = children
        .into_iter()
        .map(|child| export_node(store, child, permissions))
        .collect::<TemplateResult<Vec<_>>>()?;
    Ok(exported)
}

fn export_blocks<S: WorkspaceStore + ?Sized>(
    store: &S,
    page: &PageNode,
) -> TemplateResult<Option<ExportedBlocks>> {
    if page.kind.is_board_like() {
        let board_id = page.board_id.unwrap_or(page.id);
        let blocks = store.list_blocks(&BlockListQuery::BoardSubgraph(board_id))?;
        let mut exported = ExportedBlocks::default();
        for block in blocks {
            match block.kind {
                BlockType::Board if block.id == board_id => exported.board = Some(block),
                BlockType::View => exported.views.push(block),
                _ => {}
            }
        }
        if exported.board.is_none() && exported.views.is_empty() {
            return Ok(None);
        }
        return Ok(Some(exported));
    }

    if page.kind.is_card() {
        let card_id = page.card_id.unwrap_or(page.id);
        let card = store
            .list_blocks(&BlockListQuery::Ids(vec![card_id]))?
            .into_iter()
            .find(|block| block.kind == BlockType::Card);
        return Ok(card.map(|card| ExportedBlocks {
            card: Some(card),
            ..Default::default()
        }));
    }

    Ok(None)
}
