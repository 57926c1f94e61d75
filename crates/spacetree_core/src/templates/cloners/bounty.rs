//! Bounty cloner.

use crate::model::bounty::{Bounty, BountyPermission, BountyWithPermissions};
use crate::model::page::PageNode;
use crate::templates::context::{CloneContext, PayloadKind};

pub fn clone_bounty(ctx: &mut CloneContext, source: &BountyWithPermissions, page: &mut PageNode) {
    if !ctx.mark_payload_processed(PayloadKind::Bounty, source.bounty.id) {
        page.bounty_id = ctx.mapped(source.bounty.id);
        return;
    }

    let new_bounty_id = ctx.new_id_for(source.bounty.id);
    ctx.batch.bounties.push(Bounty {
        id: new_bounty_id,
        space_id: ctx.target_space().id,
        created_by: ctx.owner_for(source.bounty.created_by),
        created_at: ctx.now(),
        ..source.bounty.clone()
    });

    let mut created: Vec<BountyPermission> = Vec::with_capacity(source.permissions.len());
    for permission in &source.permissions {
        let Some(assignee) = ctx.map_permission_assignee(&permission.assignee) else {
            continue;
        };
        let duplicate = created.iter().any(|other| {
            other.permission_level == permission.permission_level && other.assignee == assignee
        });
        if duplicate {
            continue;
        }
        created.push(BountyPermission {
            id: ctx.new_id_for(permission.id),
            bounty_id: new_bounty_id,
            permission_level: permission.permission_level,
            assignee,
        });
    }
    ctx.batch.bounty_permissions.extend(created);
    page.bounty_id = Some(new_bounty_id);
}
