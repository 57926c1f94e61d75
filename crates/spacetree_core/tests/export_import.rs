mod common;

use common::{create_space, seed_space, SeededSpace};
use serde_json::json;
use spacetree_core::model::block::BlockType;
use spacetree_core::model::permission::{PagePermission, PermissionAssignee, PermissionLevel};
use spacetree_core::model::proposal::ProposalAssignee;
use spacetree_core::repo::{BlockListQuery, PageListQuery};
use spacetree_core::templates::ExportedPage;
use spacetree_core::{
    export_workspace_pages, import_workspace_pages, ExportOptions, ImportWorkspacePagesRequest,
    ImportWorkspacePagesResult, PageNode, SnapshotSource, SqliteWorkspaceStore, TemplateError,
    WorkspacePagesExport, WorkspaceStore, WriteBatch,
};
use std::collections::HashSet;
use uuid::Uuid;

fn export(store: &SqliteWorkspaceStore<'_>, seeded: &SeededSpace) -> WorkspacePagesExport {
    export_workspace_pages(store, &seeded.space.domain, &ExportOptions::default())
        .unwrap()
        .data
}

fn import(
    store: &SqliteWorkspaceStore<'_>,
    target: &str,
    snapshot: WorkspacePagesExport,
) -> ImportWorkspacePagesResult {
    let request = ImportWorkspacePagesRequest::new(target, SnapshotSource::Parsed(snapshot));
    import_workspace_pages(store, &request).unwrap()
}

fn find_node<'a>(nodes: &'a [ExportedPage], id: Uuid) -> Option<&'a ExportedPage> {
    nodes.iter().find_map(|node| {
        if node.page.id == id {
            Some(node)
        } else {
            find_node(&node.children, id)
        }
    })
}

fn find_node_mut(nodes: &mut [ExportedPage], id: Uuid) -> Option<&mut ExportedPage> {
    for node in nodes {
        if node.page.id == id {
            return Some(node);
        }
        if let Some(found) = find_node_mut(&mut node.children, id) {
            return Some(found);
        }
    }
    None
}

fn created(result: &ImportWorkspacePagesResult, source_id: Uuid) -> PageNode {
    let new_id = result.old_new_record_id_hash_map[&source_id];
    result
        .pages
        .iter()
        .find(|page| page.id == new_id)
        .cloned()
        .unwrap()
}

/// Asserts every key of every row written by `result` points at a row of
/// the same run; only import roots may hang under `caller_parent`.
fn assert_referentially_closed(
    store: &SqliteWorkspaceStore<'_>,
    result: &ImportWorkspacePagesResult,
    caller_parent: Option<Uuid>,
) {
    let created: HashSet<Uuid> = result.old_new_record_id_hash_map.values().copied().collect();
    let inside = |id: Uuid| assert!(created.contains(&id), "{id} was not created by the run");

    for page in &result.pages {
        inside(page.id);
        match page.parent_id {
            Some(parent) if result.root_page_ids.contains(&page.id) => {
                assert_eq!(Some(parent), caller_parent)
            }
            Some(parent) => inside(parent),
            None => assert!(result.root_page_ids.contains(&page.id)),
        }
        for key in [page.board_id, page.card_id, page.bounty_id, page.proposal_id]
            .into_iter()
            .flatten()
        {
            inside(key);
        }

        if let Some(proposal_id) = page.proposal_id {
            let proposal = store.find_proposal(proposal_id).unwrap().unwrap();
            for relations in &proposal.evaluations {
                let evaluation = &relations.evaluation;
                inside(evaluation.id);
                assert_eq!(evaluation.proposal_id, proposal_id);
                if let Some(vote_id) = evaluation.vote_id {
                    inside(vote_id);
                }
                for reviewer in &relations.reviewers {
                    inside(reviewer.id);
                    assert_eq!(reviewer.proposal_id, proposal_id);
                    assert_eq!(reviewer.evaluation_id, evaluation.id);
                }
                for criteria in &relations.rubric_criteria {
                    inside(criteria.id);
                    assert_eq!(criteria.proposal_id, proposal_id);
                    assert_eq!(criteria.evaluation_id, evaluation.id);
                }
                for permission in &relations.permissions {
                    inside(permission.id);
                    assert_eq!(permission.evaluation_id, evaluation.id);
                }
            }
        }

        if let Some(bounty_id) = page.bounty_id {
            let bounty = store.find_bounty(bounty_id).unwrap().unwrap();
            for permission in &bounty.permissions {
                inside(permission.id);
                assert_eq!(permission.bounty_id, bounty_id);
            }
        }

        for vote in store.list_votes(page.id).unwrap() {
            inside(vote.vote.id);
            for option in &vote.options {
                assert_eq!(option.vote_id, vote.vote.id);
            }
        }
    }

    let blocks = store
        .list_blocks(&BlockListQuery::Ids(created.iter().copied().collect()))
        .unwrap();
    assert_eq!(blocks.len(), result.total_blocks);
    for block in &blocks {
        inside(block.root_id);
        if let Some(parent) = block.parent_id {
            inside(parent);
        }
        for key in block.view_ids().into_iter().chain(block.card_order()) {
            inside(key);
        }
    }

    let page_ids: Vec<Uuid> = result.pages.iter().map(|page| page.id).collect();
    let grants = store.list_page_permissions(&page_ids).unwrap();
    let grant_ids: HashSet<Uuid> = grants.iter().map(|grant| grant.id).collect();
    for grant in &grants {
        inside(grant.page_id);
        if let Some(source) = grant.source_permission_id {
            assert!(grant_ids.contains(&source));
        }
    }
}

fn space_pages(store: &SqliteWorkspaceStore<'_>, space_id: Uuid) -> Vec<PageNode> {
    store
        .list_pages(&PageListQuery::Space {
            space_id,
            include_deleted: false,
        })
        .unwrap()
}

#[test]
fn export_captures_forest_payloads_and_roles() {
    let conn = spacetree_core::open_db_in_memory().unwrap();
    let store = SqliteWorkspaceStore::try_new(&conn).unwrap();
    let seeded = seed_space(&store, "acme");

    let snapshot = export(&store, &seeded);

    assert_eq!(snapshot.pages.len(), 1);
    assert_eq!(snapshot.page_count(), seeded.live_page_count());
    assert!(find_node(&snapshot.pages, seeded.trashed.id).is_none());
    assert_eq!(snapshot.roles.len(), 1);
    assert_eq!(snapshot.roles[0].name, "Reviewers");

    let board = find_node(&snapshot.pages, seeded.board.id).unwrap();
    let blocks = board.blocks.as_ref().unwrap();
    assert_eq!(blocks.board.as_ref().unwrap().id, seeded.board.id);
    assert_eq!(blocks.views.len(), 1);
    assert!(blocks.card.is_none());

    let card = find_node(&snapshot.pages, seeded.card_a.id).unwrap();
    let card_block = card.blocks.as_ref().unwrap().card.as_ref().unwrap();
    assert_eq!(card_block.kind, BlockType::Card);

    let proposal = find_node(&snapshot.pages, seeded.proposal_page.id).unwrap();
    let exported_proposal = proposal.proposal.as_ref().unwrap();
    assert_eq!(exported_proposal.evaluations.len(), 1);
    assert_eq!(exported_proposal.evaluations[0].reviewers.len(), 2);
    assert_eq!(exported_proposal.evaluations[0].rubric_criteria.len(), 1);
    assert_eq!(proposal.votes.len(), 1);
    assert_eq!(proposal.votes[0].options.len(), 2);
    assert_eq!(proposal.permissions.len(), 2);

    let bounty = find_node(&snapshot.pages, seeded.bounty_page.id).unwrap();
    assert_eq!(bounty.bounty.as_ref().unwrap().permissions.len(), 1);
}

#[test]
fn export_rejects_blank_and_unknown_spaces() {
    let conn = spacetree_core::open_db_in_memory().unwrap();
    let store = SqliteWorkspaceStore::try_new(&conn).unwrap();

    let err = export_workspace_pages(&store, "  ", &ExportOptions::default()).unwrap_err();
    assert!(matches!(err, TemplateError::InvalidInput(_)));

    let err = export_workspace_pages(&store, "missing", &ExportOptions::default()).unwrap_err();
    assert!(matches!(err, TemplateError::NotFound(_)));
}

#[test]
fn same_space_import_rewrites_every_reference() {
    let conn = spacetree_core::open_db_in_memory().unwrap();
    let store = SqliteWorkspaceStore::try_new(&conn).unwrap();
    let seeded = seed_space(&store, "acme");
    let snapshot = export(&store, &seeded);

    let result = import(&store, "acme", snapshot);

    assert_eq!(result.total_pages, seeded.live_page_count());
    assert_eq!(result.total_blocks, 4);
    assert_eq!(result.root_page_ids.len(), 1);
    assert_eq!(space_pages(&store, seeded.space.id).len(), 12);

    let home = created(&result, seeded.home.id);
    assert_eq!(result.root_page_ids[0], home.id);
    assert_eq!(home.parent_id, None);
    assert_eq!(home.title, "Home");
    assert_ne!(home.path, seeded.home.path);
    assert_eq!(home.created_by, seeded.space.created_by);

    let board = created(&result, seeded.board.id);
    let card_a = created(&result, seeded.card_a.id);
    let card_b = created(&result, seeded.card_b.id);
    assert_eq!(board.parent_id, Some(home.id));
    assert_eq!(board.board_id, Some(board.id));
    assert_eq!(card_a.parent_id, Some(board.id));
    assert_eq!(card_a.card_id, Some(card_a.id));

    let blocks = store
        .list_blocks(&BlockListQuery::BoardSubgraph(board.id))
        .unwrap();
    assert_eq!(blocks.len(), 4);
    let board_block = blocks.iter().find(|block| block.id == board.id).unwrap();
    let view = blocks
        .iter()
        .find(|block| block.kind == BlockType::View)
        .unwrap();
    assert_eq!(view.id, result.old_new_record_id_hash_map[&seeded.view_id]);
    assert_eq!(board_block.view_ids(), vec![view.id]);
    assert_eq!(view.card_order(), vec![card_a.id, card_b.id]);
    for block in &blocks {
        assert_eq!(block.root_id, board.id);
    }

    let proposal_page = created(&result, seeded.proposal_page.id);
    let new_proposal_id = proposal_page.proposal_id.unwrap();
    assert_ne!(new_proposal_id, seeded.proposal_id);
    let proposal = store.find_proposal(new_proposal_id).unwrap().unwrap();
    let source_proposal = store.find_proposal(seeded.proposal_id).unwrap().unwrap();
    assert_eq!(
        proposal.proposal.workflow_id,
        source_proposal.proposal.workflow_id
    );
    let evaluation = &proposal.evaluations[0];
    let new_vote_id = result.old_new_record_id_hash_map[&seeded.vote_id];
    assert_eq!(evaluation.evaluation.vote_id, Some(new_vote_id));
    assert_eq!(evaluation.reviewers.len(), 2);
    assert!(evaluation
        .reviewers
        .iter()
        .any(|reviewer| reviewer.assignee == ProposalAssignee::Role(seeded.role.id)));
    assert_eq!(evaluation.rubric_criteria[0].proposal_id, new_proposal_id);

    let votes = store.list_votes(proposal_page.id).unwrap();
    assert_eq!(votes.len(), 1);
    assert_eq!(votes[0].vote.id, new_vote_id);
    assert_eq!(votes[0].options.len(), 2);

    let bounty_page = created(&result, seeded.bounty_page.id);
    let bounty = store
        .find_bounty(bounty_page.bounty_id.unwrap())
        .unwrap()
        .unwrap();
    assert_ne!(bounty.bounty.id, seeded.bounty_id);
    assert_eq!(bounty.permissions.len(), 1);

    let source_view = store
        .list_blocks(&BlockListQuery::Ids(vec![seeded.view_id]))
        .unwrap();
    assert_eq!(
        source_view[0].card_order(),
        vec![seeded.card_a.id, seeded.card_b.id]
    );

    assert_referentially_closed(&store, &result, None);
}

#[test]
fn synthesized_grants_chain_from_the_imported_root() {
    let conn = spacetree_core::open_db_in_memory().unwrap();
    let store = SqliteWorkspaceStore::try_new(&conn).unwrap();
    let seeded = seed_space(&store, "acme");
    let target = create_space(&store, "target");

    let result = import(&store, "target", export(&store, &seeded));

    let home = created(&result, seeded.home.id);
    let card = created(&result, seeded.card_b.id);
    let home_grants = store.list_page_permissions(&[home.id]).unwrap();
    assert_eq!(home_grants.len(), 1);
    assert_eq!(home_grants[0].assignee, PermissionAssignee::Space(target.id));
    assert_eq!(home_grants[0].source_permission_id, None);

    let card_grants = store.list_page_permissions(&[card.id]).unwrap();
    assert_eq!(card_grants.len(), 1);
    assert_eq!(card_grants[0].source_permission_id, Some(home_grants[0].id));
}

#[test]
fn cross_space_import_rebinds_owners_roles_and_grants() {
    let conn = spacetree_core::open_db_in_memory().unwrap();
    let store = SqliteWorkspaceStore::try_new(&conn).unwrap();
    let seeded = seed_space(&store, "acme");
    let target = create_space(&store, "target");

    let mut request = ImportWorkspacePagesRequest::new(
        target.id.to_string(),
        SnapshotSource::Parsed(export(&store, &seeded)),
    );
    request.include_permissions = true;
    let result = import_workspace_pages(&store, &request).unwrap();

    let target_roles = store.list_roles(target.id).unwrap();
    assert_eq!(target_roles.len(), 1);
    let target_role = target_roles[0].id;
    assert_ne!(target_role, seeded.role.id);

    for page in &result.pages {
        assert_eq!(page.space_id, target.id);
        assert_eq!(page.created_by, target.created_by);
    }
    let home = created(&result, seeded.home.id);
    assert_eq!(home.path, seeded.home.path);

    let home_grants = store.list_page_permissions(&[home.id]).unwrap();
    assert_eq!(home_grants[0].assignee, PermissionAssignee::Space(target.id));
    assert_ne!(home_grants[0].id, seeded.home_grant.id);

    let proposal_page = created(&result, seeded.proposal_page.id);
    let proposal_grants = store.list_page_permissions(&[proposal_page.id]).unwrap();
    assert_eq!(proposal_grants.len(), 2);
    assert!(proposal_grants
        .iter()
        .any(|grant| grant.assignee == PermissionAssignee::Role(target_role)));
    assert!(proposal_grants
        .iter()
        .any(|grant| grant.source_permission_id == Some(home_grants[0].id)));

    let proposal = store
        .find_proposal(proposal_page.proposal_id.unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(proposal.proposal.space_id, target.id);
    assert_eq!(proposal.proposal.created_by, target.created_by);
    assert_eq!(proposal.proposal.workflow_id, None);
    let reviewers = &proposal.evaluations[0].reviewers;
    assert_eq!(reviewers.len(), 1);
    assert_eq!(reviewers[0].assignee, ProposalAssignee::Role(target_role));

    let bounty = store
        .find_bounty(created(&result, seeded.bounty_page.id).bounty_id.unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(bounty.bounty.space_id, target.id);
    assert_eq!(
        bounty.permissions[0].assignee,
        PermissionAssignee::Space(target.id)
    );

    assert_referentially_closed(&store, &result, None);
}

#[test]
fn caller_mappings_override_role_and_workflow_resolution() {
    let conn = spacetree_core::open_db_in_memory().unwrap();
    let store = SqliteWorkspaceStore::try_new(&conn).unwrap();
    let seeded = seed_space(&store, "acme");
    let other = seed_space(&store, "other");
    let workflow = Uuid::new_v4();

    let snapshot = export(&store, &seeded);
    let source_workflow = find_node(&snapshot.pages, seeded.proposal_page.id)
        .and_then(|node| node.proposal.as_ref())
        .and_then(|proposal| proposal.proposal.workflow_id)
        .unwrap();
    let mut request = ImportWorkspacePagesRequest::new("other", SnapshotSource::Parsed(snapshot));
    request.role_id_map.insert(seeded.role.id, other.role.id);
    request
        .proposal_workflow_id_map
        .insert(source_workflow, workflow);
    let result = import_workspace_pages(&store, &request).unwrap();

    let proposal = store
        .find_proposal(
            created(&result, seeded.proposal_page.id)
                .proposal_id
                .unwrap(),
        )
        .unwrap()
        .unwrap();
    assert_eq!(proposal.proposal.workflow_id, Some(workflow));
    assert_eq!(
        proposal.evaluations[0].reviewers[0].assignee,
        ProposalAssignee::Role(other.role.id)
    );
    assert_eq!(store.list_roles(other.space.id).unwrap().len(), 1);
}

#[test]
fn repeated_imports_duplicate_pages_but_not_roles() {
    let conn = spacetree_core::open_db_in_memory().unwrap();
    let store = SqliteWorkspaceStore::try_new(&conn).unwrap();
    let seeded = seed_space(&store, "acme");
    let target = create_space(&store, "target");
    let snapshot = export(&store, &seeded);

    let first = import(&store, "target", snapshot.clone());
    let second = import(&store, "target", snapshot);

    assert_eq!(space_pages(&store, target.id).len(), 2 * seeded.live_page_count());
    assert_eq!(store.list_roles(target.id).unwrap().len(), 1);
    let first_home = created(&first, seeded.home.id);
    let second_home = created(&second, seeded.home.id);
    assert_ne!(first_home.id, second_home.id);
    assert_ne!(first_home.path, second_home.path);
}

#[test]
fn import_under_parent_applies_title_and_path_options() {
    let conn = spacetree_core::open_db_in_memory().unwrap();
    let store = SqliteWorkspaceStore::try_new(&conn).unwrap();
    let seeded = seed_space(&store, "acme");
    let other = seed_space(&store, "other");

    let mut request = ImportWorkspacePagesRequest::new(
        "other",
        SnapshotSource::Parsed(export(&store, &seeded)),
    );
    request.parent_id = Some(other.home.id);
    request.update_title = true;
    request.reset_paths = true;
    let result = import_workspace_pages(&store, &request).unwrap();

    let home = created(&result, seeded.home.id);
    let board = created(&result, seeded.board.id);
    assert_eq!(home.parent_id, Some(other.home.id));
    assert_eq!(home.title, "Home (copy)");
    assert_eq!(board.title, "Roadmap");
    assert_ne!(home.path, seeded.home.path);

    let home_grants = store.list_page_permissions(&[home.id]).unwrap();
    assert_eq!(home_grants.len(), 1);
    assert_eq!(home_grants[0].source_permission_id, None);
    assert_eq!(
        home_grants[0].assignee,
        PermissionAssignee::Space(other.space.id)
    );

    assert_referentially_closed(&store, &result, Some(other.home.id));
}

#[test]
fn import_under_parent_with_many_grants_roots_one_grant_chain() {
    let conn = spacetree_core::open_db_in_memory().unwrap();
    let store = SqliteWorkspaceStore::try_new(&conn).unwrap();
    let seeded = seed_space(&store, "acme");
    let other = seed_space(&store, "other");

    let mut extra = WriteBatch::new();
    extra.page_permissions.push(PagePermission::direct(
        other.home.id,
        PermissionLevel::View,
        PermissionAssignee::Public,
    ));
    extra.page_permissions.push(PagePermission::direct(
        other.home.id,
        PermissionLevel::Editor,
        PermissionAssignee::User(Uuid::new_v4()),
    ));
    store.commit(&extra).unwrap();
    assert_eq!(store.list_page_permissions(&[other.home.id]).unwrap().len(), 3);

    let mut request = ImportWorkspacePagesRequest::new(
        "other",
        SnapshotSource::Parsed(export(&store, &seeded)),
    );
    request.parent_id = Some(other.home.id);
    let result = import_workspace_pages(&store, &request).unwrap();

    let home = created(&result, seeded.home.id);
    let home_grants = store.list_page_permissions(&[home.id]).unwrap();
    assert_eq!(home_grants.len(), 1);
    assert_eq!(home_grants[0].source_permission_id, None);
    assert_eq!(
        home_grants[0].assignee,
        PermissionAssignee::Space(other.space.id)
    );

    for page in &result.pages {
        let grants = store.list_page_permissions(&[page.id]).unwrap();
        assert_eq!(grants.len(), 1, "page {} has {} grants", page.title, grants.len());
        if page.id != home.id {
            assert_eq!(grants[0].source_permission_id, Some(home_grants[0].id));
        }
    }
    let card = created(&result, seeded.card_a.id);
    assert_eq!(store.list_page_permissions(&[card.id]).unwrap().len(), 1);
}

#[test]
fn payloads_sharing_their_page_id_are_cloned() {
    let conn = spacetree_core::open_db_in_memory().unwrap();
    let store = SqliteWorkspaceStore::try_new(&conn).unwrap();
    let seeded = seed_space(&store, "acme");
    let target = create_space(&store, "target");

    let mut snapshot = export(&store, &seeded);
    let bounty_node = find_node_mut(&mut snapshot.pages, seeded.bounty_page.id).unwrap();
    let bounty_page_id = bounty_node.page.id;
    bounty_node.page.bounty_id = Some(bounty_page_id);
    let bounty = bounty_node.bounty.as_mut().unwrap();
    bounty.bounty.id = bounty_page_id;
    for permission in &mut bounty.permissions {
        permission.bounty_id = bounty_page_id;
    }

    let proposal_node = find_node_mut(&mut snapshot.pages, seeded.proposal_page.id).unwrap();
    let proposal_page_id = proposal_node.page.id;
    proposal_node.page.proposal_id = Some(proposal_page_id);
    let proposal = proposal_node.proposal.as_mut().unwrap();
    proposal.proposal.id = proposal_page_id;
    for relations in &mut proposal.evaluations {
        relations.evaluation.proposal_id = proposal_page_id;
    }

    let result = import(&store, "target", snapshot);

    let bounty_page = created(&result, seeded.bounty_page.id);
    assert_eq!(bounty_page.bounty_id, Some(bounty_page.id));
    let bounty = store.find_bounty(bounty_page.id).unwrap().unwrap();
    assert_eq!(bounty.bounty.space_id, target.id);
    assert_eq!(bounty.permissions.len(), 1);

    let proposal_page = created(&result, seeded.proposal_page.id);
    assert_eq!(proposal_page.proposal_id, Some(proposal_page.id));
    let proposal = store.find_proposal(proposal_page.id).unwrap().unwrap();
    assert_eq!(proposal.evaluations.len(), 1);
    assert_eq!(proposal.evaluations[0].rubric_criteria.len(), 1);

    assert_referentially_closed(&store, &result, None);
}

#[test]
fn import_rejects_parent_outside_target_space() {
    let conn = spacetree_core::open_db_in_memory().unwrap();
    let store = SqliteWorkspaceStore::try_new(&conn).unwrap();
    let seeded = seed_space(&store, "acme");
    create_space(&store, "target");

    let mut request = ImportWorkspacePagesRequest::new(
        "target",
        SnapshotSource::Parsed(export(&store, &seeded)),
    );
    request.parent_id = Some(seeded.home.id);
    let err = import_workspace_pages(&store, &request).unwrap_err();
    assert!(matches!(err, TemplateError::NotFound(_)));
}

#[test]
fn deleted_snapshot_nodes_are_skipped_with_their_subtree() {
    let conn = spacetree_core::open_db_in_memory().unwrap();
    let store = SqliteWorkspaceStore::try_new(&conn).unwrap();
    let seeded = seed_space(&store, "acme");
    create_space(&store, "target");

    let mut snapshot = export(&store, &seeded);
    let board_node = snapshot.pages[0]
        .children
        .iter_mut()
        .find(|node| node.page.id == seeded.board.id)
        .unwrap();
    board_node.page.deleted_at = Some(1);

    let result = import(&store, "target", snapshot);
    assert_eq!(result.total_pages, 3);
    assert_eq!(result.total_blocks, 0);
    assert!(!result
        .old_new_record_id_hash_map
        .contains_key(&seeded.card_a.id));
}

#[test]
fn inline_snapshots_are_validated() {
    let conn = spacetree_core::open_db_in_memory().unwrap();
    let store = SqliteWorkspaceStore::try_new(&conn).unwrap();
    create_space(&store, "target");

    let not_object = ImportWorkspacePagesRequest::new("target", SnapshotSource::Inline(json!([])));
    let err = import_workspace_pages(&store, &not_object).unwrap_err();
    assert!(matches!(err, TemplateError::InvalidInput(_)));

    let no_pages =
        ImportWorkspacePagesRequest::new("target", SnapshotSource::Inline(json!({ "roles": [] })));
    let err = import_workspace_pages(&store, &no_pages).unwrap_err();
    assert!(matches!(err, TemplateError::DataNotFound(_)));

    let empty = ImportWorkspacePagesRequest::new(
        "target",
        SnapshotSource::Inline(json!({ "pages": [] })),
    );
    let result = import_workspace_pages(&store, &empty).unwrap();
    assert_eq!(result.total_pages, 0);
    assert!(result.root_page_ids.is_empty());

    let blank =
        ImportWorkspacePagesRequest::new(" ", SnapshotSource::Inline(json!({ "pages": [] })));
    let err = import_workspace_pages(&store, &blank).unwrap_err();
    assert!(matches!(err, TemplateError::InvalidInput(_)));

    let unknown =
        ImportWorkspacePagesRequest::new("nowhere", SnapshotSource::Inline(json!({ "pages": [] })));
    let err = import_workspace_pages(&store, &unknown).unwrap_err();
    assert!(matches!(err, TemplateError::NotFound(_)));
}

#[test]
fn named_snapshot_round_trips_through_export_dir() {
    let conn = spacetree_core::open_db_in_memory().unwrap();
    let store = SqliteWorkspaceStore::try_new(&conn).unwrap();
    let seeded = seed_space(&store, "acme");
    let target = create_space(&store, "target");
    let dir = tempfile::tempdir().unwrap();

    let exported = export_workspace_pages(
        &store,
        "acme",
        &ExportOptions {
            snapshot_name: Some("acme.json".to_string()),
            export_dir: Some(dir.path().to_path_buf()),
        },
    )
    .unwrap();
    assert_eq!(exported.path, Some(dir.path().join("acme.json")));

    let mut request =
        ImportWorkspacePagesRequest::new("target", SnapshotSource::Named("acme.json".to_string()));
    request.export_dir = Some(dir.path().to_path_buf());
    let result = import_workspace_pages(&store, &request).unwrap();
    assert_eq!(result.total_pages, seeded.live_page_count());
    assert_eq!(
        space_pages(&store, target.id).len(),
        seeded.live_page_count()
    );

    request.source = SnapshotSource::Named("missing.json".to_string());
    let err = import_workspace_pages(&store, &request).unwrap_err();
    assert!(matches!(err, TemplateError::NotFound(_)));

    request.source = SnapshotSource::Named("../escape.json".to_string());
    let err = import_workspace_pages(&store, &request).unwrap_err();
    assert!(matches!(err, TemplateError::InvalidInput(_)));
}

#[test]
fn failed_import_writes_nothing() {
    let conn = spacetree_core::open_db_in_memory().unwrap();
    let store = SqliteWorkspaceStore::try_new(&conn).unwrap();
    let seeded = seed_space(&store, "acme");
    let target = create_space(&store, "target");

    let mut snapshot = export(&store, &seeded);
    let proposal_node = snapshot.pages[0]
        .children
        .iter_mut()
        .find(|node| node.page.id == seeded.proposal_page.id)
        .unwrap();
    let duplicate_option = proposal_node.votes[0].options[0].clone();
    proposal_node.votes[0].options.push(duplicate_option);

    let request = ImportWorkspacePagesRequest::new("target", SnapshotSource::Parsed(snapshot));
    let err = import_workspace_pages(&store, &request).unwrap_err();
    assert!(matches!(err, TemplateError::Store(_)));
    assert!(space_pages(&store, target.id).is_empty());
    assert!(store.list_roles(target.id).unwrap().is_empty());
}
