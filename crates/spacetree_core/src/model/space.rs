//! Spaces (workspaces) and their roles.

use super::{RoleId, SpaceId, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Space {
    pub id: SpaceId,
    pub domain: String,
    pub name: String,
    /// Owner; receives user-bound grants rebound during cross-space imports.
    pub created_by: UserId,
}

impl Space {
    pub fn new(domain: impl Into<String>, name: impl Into<String>, created_by: UserId) -> Self {
        Self {
            id: Uuid::new_v4(),
            domain: domain.into(),
            name: name.into(),
            created_by,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: RoleId,
    pub space_id: SpaceId,
    pub name: String,
    pub created_by: UserId,
    pub created_at: i64,
}
