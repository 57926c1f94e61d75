//! Shared state of one import run.
//!
//! # Responsibility
//! - Own the old -> new id map spanning every entity kind.
//! - Track processed pages and payloads, remapped grant ids and assigned
//!   paths.
//! - Apply the cross-space rules for owners, roles and grants.
//! - Collect created rows into the run's `WriteBatch`.
//!
//! # Invariants
//! - `new_id_for` returns the same new id for the same source id within
//!   one run.
//! - A grant id enters the permission map only after the grant is cloned,
//!   so inherited grants always resolve against an already-remapped source.

use crate::model::page::generate_page_path;
use crate::model::permission::PermissionAssignee;
use crate::model::proposal::ProposalAssignee;
use crate::model::space::Space;
use crate::model::{PageId, PermissionId, RoleId, SpaceId, UserId};
use crate::repo::write_batch::WriteBatch;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Caller flags that shape an import run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloneOptions {
    pub include_permissions: bool,
    pub reset_paths: bool,
    pub update_title: bool,
    /// Source role id -> target role id.
    pub role_id_map: HashMap<RoleId, RoleId>,
    /// Source workflow id -> target workflow id.
    pub proposal_workflow_id_map: HashMap<Uuid, Uuid>,
}

/// Payload rows deduplicated per kind.
///
/// A payload may share its page's id, so a revisit cannot be detected from
/// the id map alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    View,
    Bounty,
    Proposal,
    Vote,
}

/// Mutable state threaded through every cloner call of one run.
#[derive(Debug)]
pub struct CloneContext {
    target_space: Space,
    cross_space: bool,
    options: CloneOptions,
    now: i64,
    ids: HashMap<Uuid, Uuid>,
    processed: HashSet<PageId>,
    processed_payloads: HashSet<(PayloadKind, Uuid)>,
    permission_ids: HashMap<PermissionId, PermissionId>,
    taken_paths: HashSet<String>,
    pub batch: WriteBatch,
}

impl CloneContext {
    /// Starts a run importing into `target_space`.
    ///
    /// `taken_paths` lists paths already used in the target space.
    pub fn new(
        target_space: Space,
        source_space_id: Option<SpaceId>,
        options: CloneOptions,
        taken_paths: HashSet<String>,
        now: i64,
    ) -> Self {
        let cross_space = source_space_id.is_some_and(|source| source != target_space.id);
        Self {
            target_space,
            cross_space,
            options,
            now,
            ids: HashMap::new(),
            processed: HashSet::new(),
            processed_payloads: HashSet::new(),
            permission_ids: HashMap::new(),
            taken_paths,
            batch: WriteBatch::new(),
        }
    }

    pub fn target_space(&self) -> &Space {
        &self.target_space
    }

    pub fn is_cross_space(&self) -> bool {
        self.cross_space
    }

    pub fn options(&self) -> &CloneOptions {
        &self.options
    }

    pub fn now(&self) -> i64 {
        self.now
    }

    /// New id for `source_id`, assigned on first request.
    pub fn new_id_for(&mut self, source_id: Uuid) -> Uuid {
        *self.ids.entry(source_id).or_insert_with(Uuid::new_v4)
    }

    /// Records that `source_id` maps onto an already assigned `new_id`.
    pub fn alias(&mut self, source_id: Uuid, new_id: Uuid) {
        self.ids.entry(source_id).or_insert(new_id);
    }

    pub fn mapped(&self, source_id: Uuid) -> Option<Uuid> {
        self.ids.get(&source_id).copied()
    }

    pub fn id_map(&self) -> &HashMap<Uuid, Uuid> {
        &self.ids
    }

    /// Returns `true` the first time `page_id` is seen in this run.
    pub fn mark_processed(&mut self, page_id: PageId) -> bool {
        self.processed.insert(page_id)
    }

    /// Returns `true` the first time the `kind` payload `source_id` is seen.
    pub fn mark_payload_processed(&mut self, kind: PayloadKind, source_id: Uuid) -> bool {
        self.processed_payloads.insert((kind, source_id))
    }

    /// Owner of created records: the target space owner across spaces.
    pub fn owner_for(&self, source_owner: UserId) -> UserId {
        if self.cross_space {
            self.target_space.created_by
        } else {
            source_owner
        }
    }

    /// Path for a created page, unique within the target space.
    pub fn assign_path(&mut self, source_path: &str) -> String {
        let keep = !self.options.reset_paths
            && !source_path.is_empty()
            && !self.taken_paths.contains(source_path);
        let mut path = if keep {
            source_path.to_string()
        } else {
            generate_page_path()
        };
        while self.taken_paths.contains(&path) {
            path = generate_page_path();
        }
        self.taken_paths.insert(path.clone());
        path
    }

    /// Target role for a source role, if it has a counterpart.
    pub fn map_role(&self, role_id: RoleId) -> Option<RoleId> {
        match self.options.role_id_map.get(&role_id) {
            Some(mapped) => Some(*mapped),
            None if self.cross_space => None,
            None => Some(role_id),
        }
    }

    /// Rebinds a page/bounty grant subject for the target space.
    ///
    /// Across spaces, user grants move to the target owner and unmapped role
    /// grants are dropped (`None`).
    pub fn map_permission_assignee(
        &self,
        assignee: &PermissionAssignee,
    ) -> Option<PermissionAssignee> {
        match assignee {
            PermissionAssignee::User(user_id) => {
                Some(PermissionAssignee::User(self.owner_for(*user_id)))
            }
            PermissionAssignee::Role(role_id) => {
                self.map_role(*role_id).map(PermissionAssignee::Role)
            }
            PermissionAssignee::Space(_) => Some(PermissionAssignee::Space(self.target_space.id)),
            PermissionAssignee::Public => Some(PermissionAssignee::Public),
        }
    }

    /// Rebinds a proposal reviewer/evaluation-permission subject.
    ///
    /// Across spaces, user subjects are dropped and roles are mapped or
    /// dropped; system roles are always kept.
    pub fn map_proposal_assignee(&self, assignee: &ProposalAssignee) -> Option<ProposalAssignee> {
        match assignee {
            ProposalAssignee::User(_) if self.cross_space => None,
            ProposalAssignee::User(user_id) => Some(ProposalAssignee::User(*user_id)),
            ProposalAssignee::Role(role_id) => self.map_role(*role_id).map(ProposalAssignee::Role),
            ProposalAssignee::System(role) => Some(ProposalAssignee::System(role.clone())),
        }
    }

    /// Target workflow for a proposal; cleared across spaces when unmapped.
    pub fn map_workflow(&self, workflow_id: Option<Uuid>) -> Option<Uuid> {
        let workflow_id = workflow_id?;
        match self.options.proposal_workflow_id_map.get(&workflow_id) {
            Some(mapped) => Some(*mapped),
            None if self.cross_space => None,
            None => Some(workflow_id),
        }
    }

    pub fn register_permission(&mut self, source_id: PermissionId, new_id: PermissionId) {
        self.permission_ids.insert(source_id, new_id);
    }

    pub fn mapped_permission(&self, source_id: PermissionId) -> Option<PermissionId> {
        self.permission_ids.get(&source_id).copied()
    }

    /// Ends the run, returning the rows to write and the id map.
    pub fn into_parts(self) -> (WriteBatch, HashMap<Uuid, Uuid>) {
        (self.batch, self.ids)
    }
}
