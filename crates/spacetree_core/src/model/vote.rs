//! Votes attached to pages, with their options.

use super::{PageId, SpaceId, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub id: Uuid,
    pub space_id: SpaceId,
    pub page_id: PageId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: String,
    #[serde(default = "default_threshold")]
    pub threshold: i64,
    pub vote_type: String,
    #[serde(default)]
    pub deadline: Option<i64>,
    pub created_by: UserId,
    pub created_at: i64,
}

fn default_threshold() -> i64 {
    50
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteOption {
    pub vote_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub index: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteWithOptions {
    #[serde(flatten)]
    pub vote: Vote,
    #[serde(default)]
    pub options: Vec<VoteOption>,
}
