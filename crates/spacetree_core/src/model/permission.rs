//! Page permission grants and their inheritance links.
//!
//! # Invariants
//! - Exactly one assignee per grant (user, role, space or public).
//! - `source_permission_id`, when set, points at the grant this one defers to;
//!   grants form a DAG since several grants may share one source.

use super::{PageId, PermissionId, RoleId, SpaceId, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Subject of a grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "group", content = "id", rename_all = "snake_case")]
pub enum PermissionAssignee {
    User(UserId),
    Role(RoleId),
    Space(SpaceId),
    Public,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionLevel {
    FullAccess,
    Editor,
    ViewComment,
    View,
    Custom,
}

impl PermissionLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FullAccess => "full_access",
            Self::Editor => "editor",
            Self::ViewComment => "view_comment",
            Self::View => "view",
            Self::Custom => "custom",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "full_access" => Some(Self::FullAccess),
            "editor" => Some(Self::Editor),
            "view_comment" => Some(Self::ViewComment),
            "view" => Some(Self::View),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }

    /// Strength of the level; `Custom` grants nothing implicitly.
    pub fn rank(self) -> u8 {
        match self {
            Self::FullAccess => 4,
            Self::Editor => 3,
            Self::ViewComment => 2,
            Self::View => 1,
            Self::Custom => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagePermission {
    pub id: PermissionId,
    pub page_id: PageId,
    #[serde(rename = "permissionLevel")]
    pub level: PermissionLevel,
    pub assignee: PermissionAssignee,
    #[serde(default)]
    pub allow_discovery: bool,
    #[serde(default)]
    pub source_permission_id: Option<PermissionId>,
}

impl PagePermission {
    /// Direct (non-inherited) grant.
    pub fn direct(page_id: PageId, level: PermissionLevel, assignee: PermissionAssignee) -> Self {
        Self {
            id: Uuid::new_v4(),
            page_id,
            level,
            assignee,
            allow_discovery: false,
            source_permission_id: None,
        }
    }

    /// Creates the grant a child page receives from this one.
    ///
    /// The new grant defers to the root of this grant's chain, so chains never
    /// grow deeper than one hop.
    pub fn inherited_by(&self, page_id: PageId) -> Self {
        Self {
            id: Uuid::new_v4(),
            page_id,
            level: self.level,
            assignee: self.assignee,
            allow_discovery: self.allow_discovery,
            source_permission_id: Some(self.source_permission_id.unwrap_or(self.id)),
        }
    }

    pub fn is_inherited(&self) -> bool {
        self.source_permission_id.is_some()
    }
}
