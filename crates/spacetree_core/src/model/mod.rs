//! Workspace domain model.
//!
//! # Responsibility
//! - Define the records stored per workspace: pages, container blocks,
//!   permission grants, proposals, bounties, votes, spaces and roles.
//! - Keep the serialized (snapshot) shape next to the record definitions.
//!
//! # Invariants
//! - Every record is identified by a stable `Uuid`.
//! - Page deletion is a soft-delete marker (`deleted_at`), never a hard delete.

use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

pub mod block;
pub mod bounty;
pub mod page;
pub mod permission;
pub mod proposal;
pub mod space;
pub mod vote;

pub type PageId = Uuid;
pub type BlockId = Uuid;
pub type SpaceId = Uuid;
pub type UserId = Uuid;
pub type RoleId = Uuid;
pub type PermissionId = Uuid;

/// Current wall-clock time in epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or_default()
}
