//! Page grant cloner.
//!
//! # Invariants
//! - A cloned grant's `source_permission_id` is either the remapped id of
//!   its source grant or absent.
//! - One page never receives two grants for the same subject.

use crate::model::permission::{PagePermission, PermissionAssignee, PermissionLevel};
use crate::model::PageId;
use crate::templates::context::CloneContext;
use uuid::Uuid;

/// Creates the grants of one cloned page and returns them.
///
/// With `include_permissions`, source grants are rebound and their
/// inheritance edges remapped. Otherwise exactly one grant is synthesized:
/// a space-wide grant at the entry page (`parent_grants` empty), or one
/// inherited from the parent's synthesized grant below it.
pub fn clone_page_permissions(
    ctx: &mut CloneContext,
    source: &[PagePermission],
    new_page_id: PageId,
    parent_grants: &[PagePermission],
) -> Vec<PagePermission> {
    let created = if ctx.options().include_permissions {
        clone_source_grants(ctx, source, new_page_id)
    } else {
        synthesize_grants(ctx, new_page_id, parent_grants)
    };
    ctx.batch.page_permissions.extend(created.iter().cloned());
    created
}

/// Grants that collapse onto one rebound subject merge into the first of
/// them, keeping the strongest level.
fn clone_source_grants(
    ctx: &mut CloneContext,
    source: &[PagePermission],
    new_page_id: PageId,
) -> Vec<PagePermission> {
    let mut created: Vec<PagePermission> = Vec::with_capacity(source.len());
    for grant in source {
        let Some(assignee) = ctx.map_permission_assignee(&grant.assignee) else {
            continue;
        };
        if let Some(existing) = created.iter_mut().find(|other| other.assignee == assignee) {
            if grant.level.rank() > existing.level.rank() {
                existing.level = grant.level;
            }
            existing.allow_discovery |= grant.allow_discovery;
            let existing_id = existing.id;
            ctx.register_permission(grant.id, existing_id);
            continue;
        }

        let new_id = Uuid::new_v4();
        let source_permission_id = grant
            .source_permission_id
            .and_then(|source_id| ctx.mapped_permission(source_id));
        ctx.register_permission(grant.id, new_id);
        created.push(PagePermission {
            id: new_id,
            page_id: new_page_id,
            level: grant.level,
            assignee,
            allow_discovery: grant.allow_discovery,
            source_permission_id,
        });
    }
    created
}

fn synthesize_grants(
    ctx: &CloneContext,
    new_page_id: PageId,
    parent_grants: &[PagePermission],
) -> Vec<PagePermission> {
    let grant = match parent_grants.first() {
        Some(parent) => parent.inherited_by(new_page_id),
        None => PagePermission::direct(
            new_page_id,
            PermissionLevel::FullAccess,
            PermissionAssignee::Space(ctx.target_space().id),
        ),
    };
    vec![grant]
}
