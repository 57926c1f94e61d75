//! Workspace store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the read queries used by tree resolution, duplication, export
//!   and import.
//! - Commit one [`WriteBatch`] atomically.
//!
//! # Invariants
//! - Reads never mutate; every write goes through `commit`.
//! - Page listings carry no ordering guarantee; sibling order is owned by
//!   `tree::compare_siblings`.
//! - Live block listings exclude soft-deleted blocks.

use super::write_batch::{commit_batch, WriteBatch};
use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::block::{BlockType, ContainerBlock};
use crate::model::bounty::{
    Bounty, BountyPermission, BountyPermissionLevel, BountyWithPermissions,
};
use crate::model::page::{PageNode, PageType};
use crate::model::permission::{PagePermission, PermissionAssignee, PermissionLevel};
use crate::model::proposal::{
    EvaluationType, EvaluationWithRelations, Proposal, ProposalAssignee, ProposalEvaluation,
    ProposalEvaluationPermission, ProposalReviewer, ProposalRubricCriteria,
    ProposalWithEvaluations,
};
use crate::model::space::{Role, Space};
use crate::model::vote::{Vote, VoteOption, VoteWithOptions};
use crate::model::{BlockId, PageId, SpaceId};
use rusqlite::{params, params_from_iter, Connection, Row};
use serde_json::Value;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Result type used by workspace store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from workspace store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid record.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "workspace store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "workspace store requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "workspace store requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid workspace data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::UninitializedConnection { .. } => None,
            Self::MissingRequiredTable(_) => None,
            Self::MissingRequiredColumn { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Page selection for [`WorkspaceStore::list_pages`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageListQuery {
    /// Every page of one space.
    Space {
        space_id: SpaceId,
        include_deleted: bool,
    },
    /// Exactly these pages, deleted or not.
    Ids(Vec<PageId>),
}

/// Block selection for [`WorkspaceStore::list_blocks`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockListQuery {
    /// The board block plus every live block parented to it.
    BoardSubgraph(BlockId),
    /// Exactly these live blocks.
    Ids(Vec<BlockId>),
}

/// Read and transactional-write contract over workspace records.
pub trait WorkspaceStore {
    /// Loads one space by id or by domain.
    fn find_space(&self, id_or_domain: &str) -> StoreResult<Option<Space>>;
    /// Loads one page by id, including soft-deleted pages.
    fn find_page(&self, page_id: PageId) -> StoreResult<Option<PageNode>>;
    /// Lists pages matching `query`.
    fn list_pages(&self, query: &PageListQuery) -> StoreResult<Vec<PageNode>>;
    /// Lists container blocks matching `query`.
    fn list_blocks(&self, query: &BlockListQuery) -> StoreResult<Vec<ContainerBlock>>;
    /// Lists every grant attached to any of `page_ids`.
    fn list_page_permissions(&self, page_ids: &[PageId]) -> StoreResult<Vec<PagePermission>>;
    /// Loads one proposal with evaluations and their relations.
    fn find_proposal(&self, proposal_id: Uuid) -> StoreResult<Option<ProposalWithEvaluations>>;
    /// Loads one bounty with its permissions.
    fn find_bounty(&self, bounty_id: Uuid) -> StoreResult<Option<BountyWithPermissions>>;
    /// Lists votes attached to one page, with options.
    fn list_votes(&self, page_id: PageId) -> StoreResult<Vec<VoteWithOptions>>;
    /// Lists roles of one space.
    fn list_roles(&self, space_id: SpaceId) -> StoreResult<Vec<Role>>;
    /// Lists every page path in use within one space.
    fn list_page_paths(&self, space_id: SpaceId) -> StoreResult<HashSet<String>>;
    /// Writes the whole batch in one transaction, or nothing.
    fn commit(&self, batch: &WriteBatch) -> StoreResult<()>;
}

/// SQLite-backed workspace store.
pub struct SqliteWorkspaceStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteWorkspaceStore<'conn> {
    /// Creates store from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_store_connection_ready(conn)?;
        Ok(Self { conn })
    }

    /// Inserts one space row.
    pub fn create_space(&self, space: &Space) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO spaces (id, domain, name, created_by)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                space.id.to_string(),
                space.domain,
                space.name,
                space.created_by.to_string(),
            ],
        )?;
        Ok(())
    }
}

const PAGE_COLUMNS: &str = "id, space_id, parent_id, type, title, path, page_index, content,
    content_text, icon, header_image, board_id, card_id, bounty_id, proposal_id, is_template,
    created_by, created_at, updated_at, deleted_at";

const BLOCK_COLUMNS: &str = "id, space_id, root_id, parent_id, type, title, fields, schema,
    created_by, created_at, updated_at, deleted_at";

impl WorkspaceStore for SqliteWorkspaceStore<'_> {
    fn find_space(&self, id_or_domain: &str) -> StoreResult<Option<Space>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, domain, name, created_by
             FROM spaces
             WHERE id = ?1 OR domain = ?1
             LIMIT 1;",
        )?;
        let mut rows = stmt.query([id_or_domain])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_space_row(row)?));
        }
        Ok(None)
    }

    fn find_page(&self, page_id: PageId) -> StoreResult<Option<PageNode>> {
        let sql = format!("SELECT {PAGE_COLUMNS} FROM pages WHERE id = ?1;");
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([page_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_page_row(row)?));
        }
        Ok(None)
    }

    fn list_pages(&self, query: &PageListQuery) -> StoreResult<Vec<PageNode>> {
        let mut pages = Vec::new();
        match query {
            PageListQuery::Space {
                space_id,
                include_deleted,
            } => {
                let sql = if *include_deleted {
                    format!("SELECT {PAGE_COLUMNS} FROM pages WHERE space_id = ?1;")
                } else {
                    format!(
                        "SELECT {PAGE_COLUMNS} FROM pages
                         WHERE space_id = ?1
                           AND deleted_at IS NULL;"
                    )
                };
                let mut stmt = self.conn.prepare(&sql)?;
                let mut rows = stmt.query([space_id.to_string()])?;
                while let Some(row) = rows.next()? {
                    pages.push(parse_page_row(row)?);
                }
            }
            PageListQuery::Ids(ids) => {
                if ids.is_empty() {
                    return Ok(pages);
                }
                let sql = format!(
                    "SELECT {PAGE_COLUMNS} FROM pages WHERE id IN ({});",
                    placeholders(ids.len())
                );
                let mut stmt = self.conn.prepare(&sql)?;
                let mut rows = stmt.query(params_from_iter(ids.iter().map(Uuid::to_string)))?;
                while let Some(row) = rows.next()? {
                    pages.push(parse_page_row(row)?);
                }
            }
        }
        Ok(pages)
    }

    fn list_blocks(&self, query: &BlockListQuery) -> StoreResult<Vec<ContainerBlock>> {
        let mut blocks = Vec::new();
        match query {
            BlockListQuery::BoardSubgraph(board_id) => {
                let sql = format!(
                    "SELECT {BLOCK_COLUMNS} FROM blocks
                     WHERE (id = ?1 OR parent_id = ?1)
                       AND deleted_at IS NULL
                     ORDER BY created_at ASC, id ASC;"
                );
                let mut stmt = self.conn.prepare(&sql)?;
                let mut rows = stmt.query([board_id.to_string()])?;
                while let Some(row) = rows.next()? {
                    blocks.push(parse_block_row(row)?);
                }
            }
            BlockListQuery::Ids(ids) => {
                if ids.is_empty() {
                    return Ok(blocks);
                }
                let sql = format!(
                    "SELECT {BLOCK_COLUMNS} FROM blocks
                     WHERE id IN ({})
                       AND deleted_at IS NULL
                     ORDER BY created_at ASC, id ASC;",
                    placeholders(ids.len())
                );
                let mut stmt = self.conn.prepare(&sql)?;
                let mut rows = stmt.query(params_from_iter(ids.iter().map(Uuid::to_string)))?;
                while let Some(row) = rows.next()? {
                    blocks.push(parse_block_row(row)?);
                }
            }
        }
        Ok(blocks)
    }

    fn list_page_permissions(&self, page_ids: &[PageId]) -> StoreResult<Vec<PagePermission>> {
        if page_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT id, page_id, permission_level, user_id, role_id, space_id, public,
                    allow_discovery, source_permission_id
             FROM page_permissions
             WHERE page_id IN ({});",
            placeholders(page_ids.len())
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(page_ids.iter().map(Uuid::to_string)))?;
        let mut permissions = Vec::new();
        while let Some(row) = rows.next()? {
            permissions.push(parse_page_permission_row(row)?);
        }
        Ok(permissions)
    }

    fn find_proposal(&self, proposal_id: Uuid) -> StoreResult<Option<ProposalWithEvaluations>> {
        let proposal = {
            let mut stmt = self.conn.prepare(
                "SELECT id, space_id, created_by, status, workflow_id, fields, created_at
                 FROM proposals
                 WHERE id = ?1;",
            )?;
            let mut rows = stmt.query([proposal_id.to_string()])?;
            match rows.next()? {
                Some(row) => parse_proposal_row(row)?,
                None => return Ok(None),
            }
        };

        let mut evaluations = Vec::new();
        for evaluation in list_evaluations(self.conn, proposal.id)? {
            evaluations.push(EvaluationWithRelations {
                reviewers: list_reviewers(self.conn, evaluation.id)?,
                rubric_criteria: list_rubric_criteria(self.conn, evaluation.id)?,
                permissions: list_evaluation_permissions(self.conn, evaluation.id)?,
                evaluation,
            });
        }

        Ok(Some(ProposalWithEvaluations {
            proposal,
            evaluations,
        }))
    }

    fn find_bounty(&self, bounty_id: Uuid) -> StoreResult<Option<BountyWithPermissions>> {
        let bounty = {
            let mut stmt = self.conn.prepare(
                "SELECT id, space_id, created_by, status, reward_amount, reward_token, chain_id,
                        max_submissions, approve_submitters, fields, created_at
                 FROM bounties
                 WHERE id = ?1;",
            )?;
            let mut rows = stmt.query([bounty_id.to_string()])?;
            match rows.next()? {
                Some(row) => parse_bounty_row(row)?,
                None => return Ok(None),
            }
        };

        let mut stmt = self.conn.prepare(
            "SELECT id, bounty_id, permission_level, user_id, role_id, space_id, public
             FROM bounty_permissions
             WHERE bounty_id = ?1;",
        )?;
        let mut rows = stmt.query([bounty.id.to_string()])?;
        let mut permissions = Vec::new();
        while let Some(row) = rows.next()? {
            permissions.push(parse_bounty_permission_row(row)?);
        }

        Ok(Some(BountyWithPermissions {
            bounty,
            permissions,
        }))
    }

    fn list_votes(&self, page_id: PageId) -> StoreResult<Vec<VoteWithOptions>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, space_id, page_id, title, description, status, threshold, vote_type,
                    deadline, created_by, created_at
             FROM votes
             WHERE page_id = ?1
             ORDER BY created_at ASC, id ASC;",
        )?;
        let mut rows = stmt.query([page_id.to_string()])?;
        let mut votes = Vec::new();
        while let Some(row) = rows.next()? {
            votes.push(parse_vote_row(row)?);
        }

        let mut result = Vec::with_capacity(votes.len());
        for vote in votes {
            result.push(VoteWithOptions {
                options: list_vote_options(self.conn, vote.id)?,
                vote,
            });
        }
        Ok(result)
    }

    fn list_roles(&self, space_id: SpaceId) -> StoreResult<Vec<Role>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, space_id, name, created_by, created_at
             FROM roles
             WHERE space_id = ?1
             ORDER BY name ASC;",
        )?;
        let mut rows = stmt.query([space_id.to_string()])?;
        let mut roles = Vec::new();
        while let Some(row) = rows.next()? {
            roles.push(Role {
                id: parse_uuid_column(row, "id", "roles.id")?,
                space_id: parse_uuid_column(row, "space_id", "roles.space_id")?,
                name: row.get("name")?,
                created_by: parse_uuid_column(row, "created_by", "roles.created_by")?,
                created_at: row.get("created_at")?,
            });
        }
        Ok(roles)
    }

    fn list_page_paths(&self, space_id: SpaceId) -> StoreResult<HashSet<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT path
             FROM pages
             WHERE space_id = ?1;",
        )?;
        let mut rows = stmt.query([space_id.to_string()])?;
        let mut paths: HashSet<String> = HashSet::new();
        while let Some(row) = rows.next()? {
            paths.insert(row.get(0)?);
        }
        Ok(paths)
    }

    fn commit(&self, batch: &WriteBatch) -> StoreResult<()> {
        commit_batch(self.conn, batch)
    }
}

fn list_evaluations(conn: &Connection, proposal_id: Uuid) -> StoreResult<Vec<ProposalEvaluation>> {
    let mut stmt = conn.prepare(
        "SELECT id, proposal_id, eval_index, title, type, vote_id, required_reviews, result,
                completed_at
         FROM proposal_evaluations
         WHERE proposal_id = ?1
         ORDER BY eval_index ASC, id ASC;",
    )?;
    let mut rows = stmt.query([proposal_id.to_string()])?;
    let mut evaluations = Vec::new();
    while let Some(row) = rows.next()? {
        let kind_text: String = row.get("type")?;
        let kind = EvaluationType::parse(&kind_text).ok_or_else(|| {
            StoreError::InvalidData(format!(
                "invalid evaluation type `{kind_text}` in proposal_evaluations.type"
            ))
        })?;
        evaluations.push(ProposalEvaluation {
            id: parse_uuid_column(row, "id", "proposal_evaluations.id")?,
            proposal_id: parse_uuid_column(row, "proposal_id", "proposal_evaluations.proposal_id")?,
            index: row.get("eval_index")?,
            title: row.get("title")?,
            kind,
            vote_id: parse_optional_uuid_column(row, "vote_id", "proposal_evaluations.vote_id")?,
            required_reviews: row.get("required_reviews")?,
            result: row.get("result")?,
            completed_at: row.get("completed_at")?,
        });
    }
    Ok(evaluations)
}

fn list_reviewers(conn: &Connection, evaluation_id: Uuid) -> StoreResult<Vec<ProposalReviewer>> {
    let mut stmt = conn.prepare(
        "SELECT id, proposal_id, evaluation_id, user_id, role_id, system_role
         FROM proposal_reviewers
         WHERE evaluation_id = ?1;",
    )?;
    let mut rows = stmt.query([evaluation_id.to_string()])?;
    let mut reviewers = Vec::new();
    while let Some(row) = rows.next()? {
        reviewers.push(ProposalReviewer {
            id: parse_uuid_column(row, "id", "proposal_reviewers.id")?,
            proposal_id: parse_uuid_column(row, "proposal_id", "proposal_reviewers.proposal_id")?,
            evaluation_id: parse_uuid_column(
                row,
                "evaluation_id",
                "proposal_reviewers.evaluation_id",
            )?,
            assignee: parse_proposal_assignee(row, "proposal_reviewers")?,
        });
    }
    Ok(reviewers)
}

fn list_rubric_criteria(
    conn: &Connection,
    evaluation_id: Uuid,
) -> StoreResult<Vec<ProposalRubricCriteria>> {
    let mut stmt = conn.prepare(
        "SELECT id, proposal_id, evaluation_id, criteria_index, title, description, parameters
         FROM proposal_rubric_criteria
         WHERE evaluation_id = ?1
         ORDER BY criteria_index ASC, id ASC;",
    )?;
    let mut rows = stmt.query([evaluation_id.to_string()])?;
    let mut criteria = Vec::new();
    while let Some(row) = rows.next()? {
        criteria.push(ProposalRubricCriteria {
            id: parse_uuid_column(row, "id", "proposal_rubric_criteria.id")?,
            proposal_id: parse_uuid_column(
                row,
                "proposal_id",
                "proposal_rubric_criteria.proposal_id",
            )?,
            evaluation_id: parse_uuid_column(
                row,
                "evaluation_id",
                "proposal_rubric_criteria.evaluation_id",
            )?,
            index: row.get("criteria_index")?,
            title: row.get("title")?,
            description: row.get("description")?,
            parameters: parse_json_column(
                row,
                "parameters",
                "proposal_rubric_criteria.parameters",
            )?,
        });
    }
    Ok(criteria)
}

fn list_evaluation_permissions(
    conn: &Connection,
    evaluation_id: Uuid,
) -> StoreResult<Vec<ProposalEvaluationPermission>> {
    let mut stmt = conn.prepare(
        "SELECT id, evaluation_id, operation, user_id, role_id, system_role
         FROM proposal_evaluation_permissions
         WHERE evaluation_id = ?1;",
    )?;
    let mut rows = stmt.query([evaluation_id.to_string()])?;
    let mut permissions = Vec::new();
    while let Some(row) = rows.next()? {
        permissions.push(ProposalEvaluationPermission {
            id: parse_uuid_column(row, "id", "proposal_evaluation_permissions.id")?,
            evaluation_id: parse_uuid_column(
                row,
                "evaluation_id",
                "proposal_evaluation_permissions.evaluation_id",
            )?,
            operation: row.get("operation")?,
            assignee: parse_proposal_assignee(row, "proposal_evaluation_permissions")?,
        });
    }
    Ok(permissions)
}

fn list_vote_options(conn: &Connection, vote_id: Uuid) -> StoreResult<Vec<VoteOption>> {
    let mut stmt = conn.prepare(
        "SELECT vote_id, name, option_index
         FROM vote_options
         WHERE vote_id = ?1
         ORDER BY option_index ASC, name ASC;",
    )?;
    let mut rows = stmt.query([vote_id.to_string()])?;
    let mut options = Vec::new();
    while let Some(row) = rows.next()? {
        options.push(VoteOption {
            vote_id: parse_uuid_column(row, "vote_id", "vote_options.vote_id")?,
            name: row.get("name")?,
            index: row.get("option_index")?,
        });
    }
    Ok(options)
}

fn parse_space_row(row: &Row<'_>) -> StoreResult<Space> {
    Ok(Space {
        id: parse_uuid_column(row, "id", "spaces.id")?,
        domain: row.get("domain")?,
        name: row.get("name")?,
        created_by: parse_uuid_column(row, "created_by", "spaces.created_by")?,
    })
}

fn parse_page_row(row: &Row<'_>) -> StoreResult<PageNode> {
    let kind_text: String = row.get("type")?;
    let kind = PageType::parse(&kind_text).ok_or_else(|| {
        StoreError::InvalidData(format!("invalid page type `{kind_text}` in pages.type"))
    })?;
    let content = row
        .get::<_, Option<String>>("content")?
        .map(|text| parse_json(&text, "pages.content"))
        .transpose()?;

    Ok(PageNode {
        id: parse_uuid_column(row, "id", "pages.id")?,
        space_id: parse_uuid_column(row, "space_id", "pages.space_id")?,
        parent_id: parse_optional_uuid_column(row, "parent_id", "pages.parent_id")?,
        kind,
        title: row.get("title")?,
        path: row.get("path")?,
        order_index: row.get("page_index")?,
        content,
        content_text: row.get("content_text")?,
        icon: row.get("icon")?,
        header_image: row.get("header_image")?,
        board_id: parse_optional_uuid_column(row, "board_id", "pages.board_id")?,
        card_id: parse_optional_uuid_column(row, "card_id", "pages.card_id")?,
        bounty_id: parse_optional_uuid_column(row, "bounty_id", "pages.bounty_id")?,
        proposal_id: parse_optional_uuid_column(row, "proposal_id", "pages.proposal_id")?,
        is_template: parse_flag(row, "is_template", "pages.is_template")?,
        created_by: parse_uuid_column(row, "created_by", "pages.created_by")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        deleted_at: row.get("deleted_at")?,
    })
}

fn parse_block_row(row: &Row<'_>) -> StoreResult<ContainerBlock> {
    let kind_text: String = row.get("type")?;
    let kind = BlockType::parse(&kind_text).ok_or_else(|| {
        StoreError::InvalidData(format!("invalid block type `{kind_text}` in blocks.type"))
    })?;

    Ok(ContainerBlock {
        id: parse_uuid_column(row, "id", "blocks.id")?,
        space_id: parse_uuid_column(row, "space_id", "blocks.space_id")?,
        root_id: parse_uuid_column(row, "root_id", "blocks.root_id")?,
        parent_id: parse_optional_uuid_column(row, "parent_id", "blocks.parent_id")?,
        kind,
        title: row.get("title")?,
        fields: parse_json_column(row, "fields", "blocks.fields")?,
        schema: row.get("schema")?,
        created_by: parse_uuid_column(row, "created_by", "blocks.created_by")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        deleted_at: row.get("deleted_at")?,
    })
}

fn parse_page_permission_row(row: &Row<'_>) -> StoreResult<PagePermission> {
    let level_text: String = row.get("permission_level")?;
    let level = PermissionLevel::parse(&level_text).ok_or_else(|| {
        StoreError::InvalidData(format!(
            "invalid permission level `{level_text}` in page_permissions.permission_level"
        ))
    })?;

    Ok(PagePermission {
        id: parse_uuid_column(row, "id", "page_permissions.id")?,
        page_id: parse_uuid_column(row, "page_id", "page_permissions.page_id")?,
        level,
        assignee: parse_permission_assignee(row, "page_permissions")?,
        allow_discovery: parse_flag(row, "allow_discovery", "page_permissions.allow_discovery")?,
        source_permission_id: parse_optional_uuid_column(
            row,
            "source_permission_id",
            "page_permissions.source_permission_id",
        )?,
    })
}

fn parse_proposal_row(row: &Row<'_>) -> StoreResult<Proposal> {
    Ok(Proposal {
        id: parse_uuid_column(row, "id", "proposals.id")?,
        space_id: parse_uuid_column(row, "space_id", "proposals.space_id")?,
        created_by: parse_uuid_column(row, "created_by", "proposals.created_by")?,
        status: row.get("status")?,
        workflow_id: parse_optional_uuid_column(row, "workflow_id", "proposals.workflow_id")?,
        fields: parse_json_column(row, "fields", "proposals.fields")?,
        created_at: row.get("created_at")?,
    })
}

fn parse_bounty_row(row: &Row<'_>) -> StoreResult<Bounty> {
    Ok(Bounty {
        id: parse_uuid_column(row, "id", "bounties.id")?,
        space_id: parse_uuid_column(row, "space_id", "bounties.space_id")?,
        created_by: parse_uuid_column(row, "created_by", "bounties.created_by")?,
        status: row.get("status")?,
        reward_amount: row.get("reward_amount")?,
        reward_token: row.get("reward_token")?,
        chain_id: row.get("chain_id")?,
        max_submissions: row.get("max_submissions")?,
        approve_submitters: parse_flag(row, "approve_submitters", "bounties.approve_submitters")?,
        fields: parse_json_column(row, "fields", "bounties.fields")?,
        created_at: row.get("created_at")?,
    })
}

fn parse_bounty_permission_row(row: &Row<'_>) -> StoreResult<BountyPermission> {
    let level_text: String = row.get("permission_level")?;
    let permission_level = BountyPermissionLevel::parse(&level_text).ok_or_else(|| {
        StoreError::InvalidData(format!(
            "invalid bounty permission level `{level_text}` in bounty_permissions.permission_level"
        ))
    })?;

    Ok(BountyPermission {
        id: parse_uuid_column(row, "id", "bounty_permissions.id")?,
        bounty_id: parse_uuid_column(row, "bounty_id", "bounty_permissions.bounty_id")?,
        permission_level,
        assignee: parse_permission_assignee(row, "bounty_permissions")?,
    })
}

fn parse_vote_row(row: &Row<'_>) -> StoreResult<Vote> {
    Ok(Vote {
        id: parse_uuid_column(row, "id", "votes.id")?,
        space_id: parse_uuid_column(row, "space_id", "votes.space_id")?,
        page_id: parse_uuid_column(row, "page_id", "votes.page_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        status: row.get("status")?,
        threshold: row.get("threshold")?,
        vote_type: row.get("vote_type")?,
        deadline: row.get("deadline")?,
        created_by: parse_uuid_column(row, "created_by", "votes.created_by")?,
        created_at: row.get("created_at")?,
    })
}

fn parse_permission_assignee(
    row: &Row<'_>,
    table: &'static str,
) -> StoreResult<PermissionAssignee> {
    let user_id = parse_optional_uuid_column(row, "user_id", table)?;
    let role_id = parse_optional_uuid_column(row, "role_id", table)?;
    let space_id = parse_optional_uuid_column(row, "space_id", table)?;
    let public = parse_flag(row, "public", table)?;

    match (user_id, role_id, space_id, public) {
        (Some(id), None, None, false) => Ok(PermissionAssignee::User(id)),
        (None, Some(id), None, false) => Ok(PermissionAssignee::Role(id)),
        (None, None, Some(id), false) => Ok(PermissionAssignee::Space(id)),
        (None, None, None, true) => Ok(PermissionAssignee::Public),
        _ => Err(StoreError::InvalidData(format!(
            "{table} row must have exactly one assignee"
        ))),
    }
}

fn parse_proposal_assignee(row: &Row<'_>, table: &'static str) -> StoreResult<ProposalAssignee> {
    let user_id = parse_optional_uuid_column(row, "user_id", table)?;
    let role_id = parse_optional_uuid_column(row, "role_id", table)?;
    let system_role: Option<String> = row.get("system_role")?;

    match (user_id, role_id, system_role) {
        (Some(id), None, None) => Ok(ProposalAssignee::User(id)),
        (None, Some(id), None) => Ok(ProposalAssignee::Role(id)),
        (None, None, Some(role)) => Ok(ProposalAssignee::System(role)),
        _ => Err(StoreError::InvalidData(format!(
            "{table} row must have exactly one assignee"
        ))),
    }
}

fn parse_uuid_column(row: &Row<'_>, column: &str, label: &str) -> StoreResult<Uuid> {
    let value: String = row.get(column)?;
    parse_uuid(&value, label)
}

fn parse_optional_uuid_column(
    row: &Row<'_>,
    column: &str,
    label: &str,
) -> StoreResult<Option<Uuid>> {
    row.get::<_, Option<String>>(column)?
        .map(|value| parse_uuid(&value, label))
        .transpose()
}

fn parse_uuid(value: &str, label: &str) -> StoreResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| StoreError::InvalidData(format!("invalid uuid `{value}` in {label}")))
}

fn parse_json_column(row: &Row<'_>, column: &str, label: &str) -> StoreResult<Value> {
    let text: String = row.get(column)?;
    parse_json(&text, label)
}

fn parse_json(text: &str, label: &str) -> StoreResult<Value> {
    serde_json::from_str(text)
        .map_err(|err| StoreError::InvalidData(format!("invalid json in {label}: {err}")))
}

fn parse_flag(row: &Row<'_>, column: &str, label: &str) -> StoreResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(StoreError::InvalidData(format!(
            "invalid flag value `{other}` in {label}"
        ))),
    }
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

fn ensure_store_connection_ready(conn: &Connection) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in REQUIRED_TABLES {
        if !table_exists(conn, table)? {
            return Err(StoreError::MissingRequiredTable(table));
        }
    }

    for column in [
        "id",
        "space_id",
        "parent_id",
        "type",
        "path",
        "page_index",
        "deleted_at",
    ] {
        if !table_has_column(conn, "pages", column)? {
            return Err(StoreError::MissingRequiredColumn {
                table: "pages",
                column,
            });
        }
    }

    Ok(())
}

const REQUIRED_TABLES: [&str; 14] = [
    "spaces",
    "roles",
    "blocks",
    "bounties",
    "bounty_permissions",
    "proposals",
    "proposal_evaluations",
    "proposal_evaluation_permissions",
    "proposal_reviewers",
    "proposal_rubric_criteria",
    "pages",
    "page_permissions",
    "votes",
    "vote_options",
];

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> StoreResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
