//! Proposal records: proposal, evaluations and their reviewers, rubric
//! criteria and evaluation permissions.

use super::{RoleId, SpaceId, UserId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Subject of a reviewer slot or evaluation permission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "group", content = "id", rename_all = "snake_case")]
pub enum ProposalAssignee {
    User(UserId),
    Role(RoleId),
    /// Built-in role such as `author`, `current_reviewer` or `space_member`.
    System(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationType {
    Feedback,
    PassFail,
    Rubric,
    Vote,
}

impl EvaluationType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Feedback => "feedback",
            Self::PassFail => "pass_fail",
            Self::Rubric => "rubric",
            Self::Vote => "vote",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "feedback" => Some(Self::Feedback),
            "pass_fail" => Some(Self::PassFail),
            "rubric" => Some(Self::Rubric),
            "vote" => Some(Self::Vote),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: Uuid,
    pub space_id: SpaceId,
    pub created_by: UserId,
    pub status: String,
    #[serde(default)]
    pub workflow_id: Option<Uuid>,
    #[serde(default)]
    pub fields: Value,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalEvaluation {
    pub id: Uuid,
    pub proposal_id: Uuid,
    pub index: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: EvaluationType,
    #[serde(default)]
    pub vote_id: Option<Uuid>,
    #[serde(default = "default_required_reviews")]
    pub required_reviews: i64,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub completed_at: Option<i64>,
}

fn default_required_reviews() -> i64 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalReviewer {
    pub id: Uuid,
    pub proposal_id: Uuid,
    pub evaluation_id: Uuid,
    pub assignee: ProposalAssignee,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalEvaluationPermission {
    pub id: Uuid,
    pub evaluation_id: Uuid,
    pub operation: String,
    pub assignee: ProposalAssignee,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalRubricCriteria {
    pub id: Uuid,
    pub proposal_id: Uuid,
    pub evaluation_id: Uuid,
    #[serde(default)]
    pub index: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: Value,
}

/// Evaluation together with the rows hanging off it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationWithRelations {
    #[serde(flatten)]
    pub evaluation: ProposalEvaluation,
    #[serde(default)]
    pub reviewers: Vec<ProposalReviewer>,
    #[serde(default)]
    pub rubric_criteria: Vec<ProposalRubricCriteria>,
    #[serde(default)]
    pub permissions: Vec<ProposalEvaluationPermission>,
}

/// Proposal with evaluations ordered by `index`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalWithEvaluations {
    #[serde(flatten)]
    pub proposal: Proposal,
    #[serde(default)]
    pub evaluations: Vec<EvaluationWithRelations>,
}
