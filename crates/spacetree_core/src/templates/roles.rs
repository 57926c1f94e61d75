//! Role reconciliation for imports.
//!
//! Exported roles are matched to target roles by exact name; names with no
//! counterpart are created in the target space.

use super::snapshot::ExportedRole;
use super::TemplateResult;
use crate::model::now_epoch_ms;
use crate::model::space::{Role, Space};
use crate::model::RoleId;
use crate::repo::store::WorkspaceStore;
use crate::repo::write_batch::WriteBatch;
use log::debug;
use std::collections::HashMap;
use uuid::Uuid;

/// Maps every exported role onto a target role, queueing missing roles in
/// `batch`.
///
/// Returns source role id -> target role id. Empty input touches nothing.
pub fn import_roles<S: WorkspaceStore + ?Sized>(
    store: &S,
    target: &Space,
    roles: &[ExportedRole],
    batch: &mut WriteBatch,
) -> TemplateResult<HashMap<RoleId, RoleId>> {
    let mut mapping = HashMap::new();
    if roles.is_empty() {
        return Ok(mapping);
    }

    let mut by_name: HashMap<String, RoleId> = store
        .list_roles(target.id)?
        .into_iter()
        .map(|role| (role.name, role.id))
        .collect();
    let now = now_epoch_ms();

    for exported in roles {
        let target_id = match by_name.get(&exported.name) {
            Some(existing) => *existing,
            None => {
                let role = Role {
                    id: Uuid::new_v4(),
                    space_id: target.id,
                    name: exported.name.clone(),
                    created_by: target.created_by,
                    created_at: now,
                };
                debug!(
                    "event=role_import module=templates status=create space_id={} role={}",
                    target.id, role.name
                );
                by_name.insert(role.name.clone(), role.id);
                let id = role.id;
                batch.roles.push(role);
                id
            }
        };
        mapping.insert(exported.id, target_id);
    }
    Ok(mapping)
}
