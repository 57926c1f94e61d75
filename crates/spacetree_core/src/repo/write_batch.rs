//! Batched, dependency-ordered writes.
//!
//! # Responsibility
//! - Collect every row produced by one duplicate/import call.
//! - Insert them inside one IMMEDIATE transaction.
//!
//! # Invariants
//! - Insert order: roles, blocks, bounties, bounty permissions, proposals,
//!   evaluations, evaluation permissions, reviewers, rubric criteria, pages,
//!   page permissions, votes, vote options.
//! - Any failing statement rolls back the whole batch; the error is
//!   returned unmodified.

use super::store::{StoreError, StoreResult};
use crate::model::block::ContainerBlock;
use crate::model::bounty::{Bounty, BountyPermission};
use crate::model::page::PageNode;
use crate::model::permission::{PagePermission, PermissionAssignee};
use crate::model::proposal::{
    Proposal, ProposalAssignee, ProposalEvaluation, ProposalEvaluationPermission,
    ProposalReviewer, ProposalRubricCriteria,
};
use crate::model::space::Role;
use crate::model::vote::{Vote, VoteOption};
use log::{error, info};
use rusqlite::{params, Connection, Transaction, TransactionBehavior};
use serde_json::Value;
use std::time::Instant;

/// Rows to create in one atomic commit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    pub roles: Vec<Role>,
    pub blocks: Vec<ContainerBlock>,
    pub bounties: Vec<Bounty>,
    pub bounty_permissions: Vec<BountyPermission>,
    pub proposals: Vec<Proposal>,
    pub evaluations: Vec<ProposalEvaluation>,
    pub evaluation_permissions: Vec<ProposalEvaluationPermission>,
    pub reviewers: Vec<ProposalReviewer>,
    pub rubric_criteria: Vec<ProposalRubricCriteria>,
    pub pages: Vec<PageNode>,
    pub page_permissions: Vec<PagePermission>,
    pub votes: Vec<Vote>,
    pub vote_options: Vec<VoteOption>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of rows across all tables.
    pub fn row_count(&self) -> usize {
        self.roles.len()
            + self.blocks.len()
            + self.bounties.len()
            + self.bounty_permissions.len()
            + self.proposals.len()
            + self.evaluations.len()
            + self.evaluation_permissions.len()
            + self.reviewers.len()
            + self.rubric_criteria.len()
            + self.pages.len()
            + self.page_permissions.len()
            + self.votes.len()
            + self.vote_options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }
}

/// Commits `batch` atomically on `conn`.
///
/// # Side effects
/// - Emits `store_commit` logging events with row counts and duration.
pub(crate) fn commit_batch(conn: &Connection, batch: &WriteBatch) -> StoreResult<()> {
    let started_at = Instant::now();
    info!(
        "event=store_commit module=repo status=start rows={} pages={} blocks={}",
        batch.row_count(),
        batch.pages.len(),
        batch.blocks.len()
    );

    match write_all(conn, batch) {
        Ok(()) => {
            info!(
                "event=store_commit module=repo status=ok rows={} duration_ms={}",
                batch.row_count(),
                started_at.elapsed().as_millis()
            );
            Ok(())
        }
        Err(err) => {
            error!(
                "event=store_commit module=repo status=error duration_ms={} error_code=commit_failed error={err}",
                started_at.elapsed().as_millis()
            );
            Err(err)
        }
    }
}

fn write_all(conn: &Connection, batch: &WriteBatch) -> StoreResult<()> {
    if batch.is_empty() {
        return Ok(());
    }

    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;

    for role in &batch.roles {
        tx.execute(
            "INSERT INTO roles (id, space_id, name, created_by, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                role.id.to_string(),
                role.space_id.to_string(),
                role.name,
                role.created_by.to_string(),
                role.created_at,
            ],
        )?;
    }

    for block in &batch.blocks {
        tx.execute(
            "INSERT INTO blocks (
                id, space_id, root_id, parent_id, type, title, fields, schema,
                created_by, created_at, updated_at, deleted_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12);",
            params![
                block.id.to_string(),
                block.space_id.to_string(),
                block.root_id.to_string(),
                block.parent_id.map(|id| id.to_string()),
                block.kind.as_str(),
                block.title,
                encode_json(&block.fields, "blocks.fields")?,
                block.schema,
                block.created_by.to_string(),
                block.created_at,
                block.updated_at,
                block.deleted_at,
            ],
        )?;
    }

    for bounty in &batch.bounties {
        tx.execute(
            "INSERT INTO bounties (
                id, space_id, created_by, status, reward_amount, reward_token, chain_id,
                max_submissions, approve_submitters, fields, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
            params![
                bounty.id.to_string(),
                bounty.space_id.to_string(),
                bounty.created_by.to_string(),
                bounty.status,
                bounty.reward_amount,
                bounty.reward_token,
                bounty.chain_id,
                bounty.max_submissions,
                bounty.approve_submitters,
                encode_json(&bounty.fields, "bounties.fields")?,
                bounty.created_at,
            ],
        )?;
    }

    for permission in &batch.bounty_permissions {
        let (user_id, role_id, space_id, public) = assignee_columns(&permission.assignee);
        tx.execute(
            "INSERT INTO bounty_permissions (
                id, bounty_id, permission_level, user_id, role_id, space_id, public
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                permission.id.to_string(),
                permission.bounty_id.to_string(),
                permission.permission_level.as_str(),
                user_id,
                role_id,
                space_id,
                public,
            ],
        )?;
    }

    for proposal in &batch.proposals {
        tx.execute(
            "INSERT INTO proposals (id, space_id, created_by, status, workflow_id, fields, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                proposal.id.to_string(),
                proposal.space_id.to_string(),
                proposal.created_by.to_string(),
                proposal.status,
                proposal.workflow_id.map(|id| id.to_string()),
                encode_json(&proposal.fields, "proposals.fields")?,
                proposal.created_at,
            ],
        )?;
    }

    for evaluation in &batch.evaluations {
        tx.execute(
            "INSERT INTO proposal_evaluations (
                id, proposal_id, eval_index, title, type, vote_id, required_reviews, result,
                completed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                evaluation.id.to_string(),
                evaluation.proposal_id.to_string(),
                evaluation.index,
                evaluation.title,
                evaluation.kind.as_str(),
                evaluation.vote_id.map(|id| id.to_string()),
                evaluation.required_reviews,
                evaluation.result,
                evaluation.completed_at,
            ],
        )?;
    }

    for permission in &batch.evaluation_permissions {
        let (user_id, role_id, system_role) = proposal_assignee_columns(&permission.assignee);
        tx.execute(
            "INSERT INTO proposal_evaluation_permissions (
                id, evaluation_id, operation, user_id, role_id, system_role
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                permission.id.to_string(),
                permission.evaluation_id.to_string(),
                permission.operation,
                user_id,
                role_id,
                system_role,
            ],
        )?;
    }

    for reviewer in &batch.reviewers {
        let (user_id, role_id, system_role) = proposal_assignee_columns(&reviewer.assignee);
        tx.execute(
            "INSERT INTO proposal_reviewers (
                id, proposal_id, evaluation_id, user_id, role_id, system_role
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                reviewer.id.to_string(),
                reviewer.proposal_id.to_string(),
                reviewer.evaluation_id.to_string(),
                user_id,
                role_id,
                system_role,
            ],
        )?;
    }

    for criteria in &batch.rubric_criteria {
        tx.execute(
            "INSERT INTO proposal_rubric_criteria (
                id, proposal_id, evaluation_id, criteria_index, title, description, parameters
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                criteria.id.to_string(),
                criteria.proposal_id.to_string(),
                criteria.evaluation_id.to_string(),
                criteria.index,
                criteria.title,
                criteria.description,
                encode_json(&criteria.parameters, "proposal_rubric_criteria.parameters")?,
            ],
        )?;
    }

    for page in &batch.pages {
        let content = page
            .content
            .as_ref()
            .map(|content| encode_json(content, "pages.content"))
            .transpose()?;
        tx.execute(
            "INSERT INTO pages (
                id, space_id, parent_id, type, title, path, page_index, content, content_text,
                icon, header_image, board_id, card_id, bounty_id, proposal_id, is_template,
                created_by, created_at, updated_at, deleted_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20
            );",
            params![
                page.id.to_string(),
                page.space_id.to_string(),
                page.parent_id.map(|id| id.to_string()),
                page.kind.as_str(),
                page.title,
                page.path,
                page.order_index,
                content,
                page.content_text,
                page.icon,
                page.header_image,
                page.board_id.map(|id| id.to_string()),
                page.card_id.map(|id| id.to_string()),
                page.bounty_id.map(|id| id.to_string()),
                page.proposal_id.map(|id| id.to_string()),
                page.is_template,
                page.created_by.to_string(),
                page.created_at,
                page.updated_at,
                page.deleted_at,
            ],
        )?;
    }

    for permission in &batch.page_permissions {
        let (user_id, role_id, space_id, public) = assignee_columns(&permission.assignee);
        tx.execute(
            "INSERT INTO page_permissions (
                id, page_id, permission_level, user_id, role_id, space_id, public,
                allow_discovery, source_permission_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                permission.id.to_string(),
                permission.page_id.to_string(),
                permission.level.as_str(),
                user_id,
                role_id,
                space_id,
                public,
                permission.allow_discovery,
                permission.source_permission_id.map(|id| id.to_string()),
            ],
        )?;
    }

    for vote in &batch.votes {
        tx.execute(
            "INSERT INTO votes (
                id, space_id, page_id, title, description, status, threshold, vote_type,
                deadline, created_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
            params![
                vote.id.to_string(),
                vote.space_id.to_string(),
                vote.page_id.to_string(),
                vote.title,
                vote.description,
                vote.status,
                vote.threshold,
                vote.vote_type,
                vote.deadline,
                vote.created_by.to_string(),
                vote.created_at,
            ],
        )?;
    }

    for option in &batch.vote_options {
        tx.execute(
            "INSERT INTO vote_options (vote_id, name, option_index)
             VALUES (?1, ?2, ?3);",
            params![option.vote_id.to_string(), option.name, option.index],
        )?;
    }

    tx.commit()?;
    Ok(())
}

fn assignee_columns(
    assignee: &PermissionAssignee,
) -> (Option<String>, Option<String>, Option<String>, bool) {
    match assignee {
        PermissionAssignee::User(id) => (Some(id.to_string()), None, None, false),
        PermissionAssignee::Role(id) => (None, Some(id.to_string()), None, false),
        PermissionAssignee::Space(id) => (None, None, Some(id.to_string()), false),
        PermissionAssignee::Public => (None, None, None, true),
    }
}

fn proposal_assignee_columns(
    assignee: &ProposalAssignee,
) -> (Option<String>, Option<String>, Option<String>) {
    match assignee {
        ProposalAssignee::User(id) => (Some(id.to_string()), None, None),
        ProposalAssignee::Role(id) => (None, Some(id.to_string()), None),
        ProposalAssignee::System(role) => (None, None, Some(role.clone())),
    }
}

fn encode_json(value: &Value, label: &str) -> StoreResult<String> {
    serde_json::to_string(value)
        .map_err(|err| StoreError::InvalidData(format!("cannot encode {label}: {err}")))
}
