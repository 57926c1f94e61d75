//! Workspace page import.
//!
//! # Responsibility
//! - Rebuild a snapshot's page forests under a target space and optional
//!   parent page.
//! - Resolve every cross-reference through one run-wide id map, then write
//!   everything in a single transaction.
//!
//! # Invariants
//! - Each source page is visited at most once per run.
//! - Board `viewIds`, view `cardOrder`, `linkedSourceId` and evaluation
//!   `vote_id` are rewritten only after the traversal; references outside
//!   the run are dropped.
//! - Without `include_permissions`, every created page has exactly one
//!   grant, chained from a space-wide grant on its import root.
//! - A failed run writes nothing.

use super::cloners::clone_payloads;
use super::cloners::page::clone_page_row;
use super::cloners::permission::clone_page_permissions;
use super::context::{CloneContext, CloneOptions};
use super::roles::import_roles;
use super::snapshot::{parse_snapshot, read_snapshot, ExportedPage, WorkspacePagesExport};
use super::{TemplateError, TemplateResult};
use crate::model::page::PageNode;
use crate::model::permission::PagePermission;
use crate::model::space::Space;
use crate::model::{now_epoch_ms, PageId, RoleId};
use crate::repo::store::WorkspaceStore;
use crate::repo::write_batch::WriteBatch;
use crate::service::block_relink::relink_block_references;
use log::{error, info};
use serde::Serialize;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;
use uuid::Uuid;

/// Where the snapshot of an import comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotSource {
    /// Raw snapshot document, validated before use.
    Inline(Value),
    /// Already parsed snapshot.
    Parsed(WorkspacePagesExport),
    /// Named snapshot file inside the request's export directory.
    Named(String),
}

/// Input of [`import_workspace_pages`].
#[derive(Debug, Clone, PartialEq)]
pub struct ImportWorkspacePagesRequest {
    pub target_space_id_or_domain: String,
    pub source: SnapshotSource,
    /// Directory holding named snapshots.
    pub export_dir: Option<PathBuf>,
    /// Existing page of the target space to import under.
    pub parent_id: Option<PageId>,
    /// Appends " (copy)" to the title of each imported root.
    pub update_title: bool,
    /// Carries the snapshot's grants instead of synthesizing new ones.
    pub include_permissions: bool,
    /// Assigns fresh paths to every created page.
    pub reset_paths: bool,
    /// Source role id -> target role id; overrides name matching.
    pub role_id_map: HashMap<RoleId, RoleId>,
    /// Source workflow id -> target workflow id.
    pub proposal_workflow_id_map: HashMap<Uuid, Uuid>,
}

impl ImportWorkspacePagesRequest {
    pub fn new(target_space_id_or_domain: impl Into<String>, source: SnapshotSource) -> Self {
        Self {
            target_space_id_or_domain: target_space_id_or_domain.into(),
            source,
            export_dir: None,
            parent_id: None,
            update_title: false,
            include_permissions: false,
            reset_paths: false,
            role_id_map: HashMap::new(),
            proposal_workflow_id_map: HashMap::new(),
        }
    }
}

/// Outcome of one import run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportWorkspacePagesResult {
    pub pages: Vec<PageNode>,
    pub total_pages: usize,
    pub total_blocks: usize,
    pub root_page_ids: Vec<PageId>,
    /// Every source id of the run -> the id it was created under.
    pub old_new_record_id_hash_map: HashMap<Uuid, Uuid>,
}

/// Imports a snapshot into the target space.
///
/// # Errors
/// - `InvalidInput` for a blank target key or a malformed snapshot.
/// - `NotFound` when the target space, the parent page or a named snapshot
///   does not exist.
/// - `DataNotFound` when the snapshot has no `pages` collection.
///
/// # Side effects
/// - Emits `workspace_import` logging events.
pub fn import_workspace_pages<S: WorkspaceStore + ?Sized>(
    store: &S,
    request: &ImportWorkspacePagesRequest,
) -> TemplateResult<ImportWorkspacePagesResult> {
    let started_at = Instant::now();
    info!(
        "event=workspace_import module=templates status=start space={} parent_id={:?}",
        request.target_space_id_or_domain, request.parent_id
    );

    match import_inner(store, request) {
        Ok(result) => {
            info!(
                "event=workspace_import module=templates status=ok space={} total_pages={} total_blocks={} duration_ms={}",
                request.target_space_id_or_domain,
                result.total_pages,
                result.total_blocks,
                started_at.elapsed().as_millis()
            );
            Ok(result)
        }
        Err(err) => {
            error!(
                "event=workspace_import module=templates status=error space={} duration_ms={} error={err}",
                request.target_space_id_or_domain,
                started_at.elapsed().as_millis()
            );
            Err(err)
        }
    }
}

fn import_inner<S: WorkspaceStore + ?Sized>(
    store: &S,
    request: &ImportWorkspacePagesRequest,
) -> TemplateResult<ImportWorkspacePagesResult> {
    let key = request.target_space_id_or_domain.trim();
    if key.is_empty() {
        return Err(TemplateError::InvalidInput(
            "target space id or domain is required".to_string(),
        ));
    }
    let target = store
        .find_space(key)?
        .ok_or_else(|| TemplateError::NotFound(format!("space `{key}`")))?;

    let snapshot = load_snapshot(request)?;
    ensure_parent_in_space(store, &target, request.parent_id)?;

    let mut role_batch = WriteBatch::new();
    let mut role_id_map = import_roles(store, &target, &snapshot.roles, &mut role_batch)?;
    role_id_map.extend(
        request
            .role_id_map
            .iter()
            .map(|(source, mapped)| (*source, *mapped)),
    );

    let source_space_id = snapshot.pages.first().map(|root| root.page.space_id);
    let options = CloneOptions {
        include_permissions: request.include_permissions,
        reset_paths: request.reset_paths,
        update_title: request.update_title,
        role_id_map,
        proposal_workflow_id_map: request.proposal_workflow_id_map.clone(),
    };
    let taken_paths = store.list_page_paths(target.id)?;
    let mut ctx = CloneContext::new(
        target,
        source_space_id,
        options,
        taken_paths,
        now_epoch_ms(),
    );

    let mut root_page_ids = Vec::with_capacity(snapshot.pages.len());
    for root in &snapshot.pages {
        if let Some(new_id) = clone_node(&mut ctx, root, request.parent_id, &[], true) {
            root_page_ids.push(new_id);
        }
    }

    let (mut batch, ids) = ctx.into_parts();
    batch.roles = role_batch.roles;
    relink_references(&mut batch, &ids);

    store.commit(&batch)?;

    Ok(ImportWorkspacePagesResult {
        total_pages: batch.pages.len(),
        total_blocks: batch.blocks.len(),
        pages: batch.pages,
        root_page_ids,
        old_new_record_id_hash_map: ids,
    })
}

fn load_snapshot(
    request: &ImportWorkspacePagesRequest,
) -> TemplateResult<Cow<'_, WorkspacePagesExport>> {
    match &request.source {
        SnapshotSource::Inline(document) => Ok(Cow::Owned(parse_snapshot(document.clone())?)),
        SnapshotSource::Parsed(snapshot) => Ok(Cow::Borrowed(snapshot)),
        SnapshotSource::Named(name) => {
            let dir = request.export_dir.as_deref().ok_or_else(|| {
                TemplateError::InvalidInput(
                    "an export directory is required to read a named snapshot".to_string(),
                )
            })?;
            Ok(Cow::Owned(read_snapshot(dir, name)?))
        }
    }
}

/// The import parent must be a live page of the target space.
fn ensure_parent_in_space<S: WorkspaceStore + ?Sized>(
    store: &S,
    target: &Space,
    parent_id: Option<PageId>,
) -> TemplateResult<()> {
    let Some(parent_id) = parent_id else {
        return Ok(());
    };
    store
        .find_page(parent_id)?
        .filter(|parent| !parent.is_deleted() && parent.space_id == target.id)
        .map(|_| ())
        .ok_or_else(|| TemplateError::NotFound(format!("parent page `{parent_id}`")))
}

/// Clones one snapshot page and its subtree; returns the new page id.
///
/// Deleted and already visited pages are skipped with their subtrees.
fn clone_node(
    ctx: &mut CloneContext,
    node: &ExportedPage,
    new_parent_id: Option<PageId>,
    parent_grants: &[PagePermission],
    is_entry: bool,
) -> Option<PageId> {
    if node.page.is_deleted() || !ctx.mark_processed(node.page.id) {
        return None;
    }

    let new_id = ctx.new_id_for(node.page.id);
    let mut page = clone_page_row(ctx, &node.page, new_id, new_parent_id, is_entry);
    let grants = clone_page_permissions(ctx, &node.permissions, new_id, parent_grants);
    clone_payloads(ctx, node, &mut page, new_parent_id);
    ctx.batch.pages.push(page);

    for child in &node.children {
        clone_node(ctx, child, Some(new_id), &grants, false);
    }
    Some(new_id)
}

fn relink_references(batch: &mut WriteBatch, ids: &HashMap<Uuid, Uuid>) {
    for block in &mut batch.blocks {
        relink_block_references(block, ids);
    }
    for evaluation in &mut batch.evaluations {
        evaluation.vote_id = evaluation
            .vote_id
            .and_then(|vote_id| ids.get(&vote_id).copied());
    }
}
