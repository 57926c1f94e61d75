//! Bounty (reward) records and their permission grants.

use super::permission::PermissionAssignee;
use super::{SpaceId, UserId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounty {
    pub id: Uuid,
    pub space_id: SpaceId,
    pub created_by: UserId,
    pub status: String,
    #[serde(default)]
    pub reward_amount: Option<f64>,
    #[serde(default)]
    pub reward_token: Option<String>,
    #[serde(default)]
    pub chain_id: Option<i64>,
    #[serde(default)]
    pub max_submissions: Option<i64>,
    #[serde(default)]
    pub approve_submitters: bool,
    #[serde(default)]
    pub fields: Value,
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BountyPermissionLevel {
    Reviewer,
    Creator,
    Submitter,
    Viewer,
}

impl BountyPermissionLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reviewer => "reviewer",
            Self::Creator => "creator",
            Self::Submitter => "submitter",
            Self::Viewer => "viewer",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "reviewer" => Some(Self::Reviewer),
            "creator" => Some(Self::Creator),
            "submitter" => Some(Self::Submitter),
            "viewer" => Some(Self::Viewer),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BountyPermission {
    pub id: Uuid,
    pub bounty_id: Uuid,
    pub permission_level: BountyPermissionLevel,
    pub assignee: PermissionAssignee,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BountyWithPermissions {
    #[serde(flatten)]
    pub bounty: Bounty,
    #[serde(default)]
    pub permissions: Vec<BountyPermission>,
}
