mod common;

use common::{page, seed_space};
use spacetree_core::model::block::BlockType;
use spacetree_core::model::permission::PermissionAssignee;
use spacetree_core::repo::{BlockListQuery, PageListQuery};
use spacetree_core::{
    duplicate_page, DuplicateError, DuplicatePageRequest, PageType, SqliteWorkspaceStore,
    WorkspaceStore, WriteBatch,
};
use uuid::Uuid;

fn request(page_id: Uuid, user_id: Uuid) -> DuplicatePageRequest {
    DuplicatePageRequest {
        page_id,
        user_id,
        parent_id: None,
    }
}

#[test]
fn duplicating_board_clones_views_cards_and_card_order() {
    let conn = spacetree_core::open_db_in_memory().unwrap();
    let store = SqliteWorkspaceStore::try_new(&conn).unwrap();
    let seeded = seed_space(&store, "acme");
    let user = Uuid::new_v4();

    let copy = duplicate_page(&store, &request(seeded.board.id, user)).unwrap();

    assert_ne!(copy.id, seeded.board.id);
    assert_eq!(copy.title, "Roadmap (copy)");
    assert_eq!(copy.parent_id, Some(seeded.home.id));
    assert_eq!(copy.board_id, Some(copy.id));
    assert_eq!(copy.created_by, user);
    assert_ne!(copy.path, seeded.board.path);

    let blocks = store
        .list_blocks(&BlockListQuery::BoardSubgraph(copy.id))
        .unwrap();
    let board = blocks
        .iter()
        .find(|block| block.kind == BlockType::Board)
        .unwrap();
    let views: Vec<_> = blocks
        .iter()
        .filter(|block| block.kind == BlockType::View)
        .collect();
    let cards: Vec<_> = blocks
        .iter()
        .filter(|block| block.kind == BlockType::Card)
        .collect();
    assert_eq!(board.id, copy.id);
    assert_eq!(views.len(), 1);
    assert_eq!(cards.len(), 2);
    assert_ne!(views[0].id, seeded.view_id);
    assert_eq!(board.view_ids(), vec![views[0].id]);
    for block in views.iter().chain(cards.iter()) {
        assert_eq!(block.root_id, copy.id);
        assert_eq!(block.parent_id, Some(copy.id));
    }

    let card_order = views[0].card_order();
    assert_eq!(card_order.len(), 2);
    assert!(!card_order.contains(&seeded.card_a.id));
    assert!(!card_order.contains(&seeded.card_b.id));

    let card_pages = store
        .list_pages(&PageListQuery::Ids(card_order.clone()))
        .unwrap();
    assert_eq!(card_pages.len(), 2);
    for card_page in &card_pages {
        assert_eq!(card_page.parent_id, Some(copy.id));
        assert_eq!(card_page.card_id, Some(card_page.id));
        assert_eq!(card_page.space_id, seeded.space.id);
    }

    let source_view = store
        .list_blocks(&BlockListQuery::Ids(vec![seeded.view_id]))
        .unwrap();
    assert_eq!(
        source_view[0].card_order(),
        vec![seeded.card_a.id, seeded.card_b.id]
    );
}

#[test]
fn duplicate_inherits_grants_from_new_parent() {
    let conn = spacetree_core::open_db_in_memory().unwrap();
    let store = SqliteWorkspaceStore::try_new(&conn).unwrap();
    let seeded = seed_space(&store, "acme");

    let copy = duplicate_page(&store, &request(seeded.proposal_page.id, Uuid::new_v4())).unwrap();

    let grants = store.list_page_permissions(&[copy.id]).unwrap();
    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0].source_permission_id, Some(seeded.home_grant.id));
    assert_eq!(grants[0].assignee, PermissionAssignee::Space(seeded.space.id));
    assert_eq!(copy.proposal_id, None);
}

#[test]
fn duplicating_root_page_creates_space_wide_grant() {
    let conn = spacetree_core::open_db_in_memory().unwrap();
    let store = SqliteWorkspaceStore::try_new(&conn).unwrap();
    let seeded = seed_space(&store, "acme");

    let copy = duplicate_page(&store, &request(seeded.home.id, Uuid::new_v4())).unwrap();

    assert_eq!(copy.parent_id, None);
    let grants = store.list_page_permissions(&[copy.id]).unwrap();
    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0].source_permission_id, None);
    assert_eq!(grants[0].assignee, PermissionAssignee::Space(seeded.space.id));
}

#[test]
fn duplicating_card_clones_its_card_block() {
    let conn = spacetree_core::open_db_in_memory().unwrap();
    let store = SqliteWorkspaceStore::try_new(&conn).unwrap();
    let seeded = seed_space(&store, "acme");

    let copy = duplicate_page(&store, &request(seeded.card_a.id, Uuid::new_v4())).unwrap();

    assert_eq!(copy.card_id, Some(copy.id));
    let card = store
        .list_blocks(&BlockListQuery::Ids(vec![copy.id]))
        .unwrap();
    assert_eq!(card.len(), 1);
    assert_eq!(card[0].kind, BlockType::Card);
    assert_eq!(card[0].root_id, seeded.board.id);
    assert_eq!(card[0].parent_id, Some(seeded.board.id));
}

#[test]
fn duplicate_under_explicit_parent() {
    let conn = spacetree_core::open_db_in_memory().unwrap();
    let store = SqliteWorkspaceStore::try_new(&conn).unwrap();
    let seeded = seed_space(&store, "acme");

    let mut target = request(seeded.bounty_page.id, Uuid::new_v4());
    target.parent_id = Some(seeded.board.id);
    let copy = duplicate_page(&store, &target).unwrap();
    assert_eq!(copy.parent_id, Some(seeded.board.id));
    assert_eq!(copy.bounty_id, None);
}

#[test]
fn duplicate_rejects_missing_sources_and_foreign_parents() {
    let conn = spacetree_core::open_db_in_memory().unwrap();
    let store = SqliteWorkspaceStore::try_new(&conn).unwrap();
    let seeded = seed_space(&store, "acme");
    let other = seed_space(&store, "other");

    let err = duplicate_page(&store, &request(seeded.trashed.id, Uuid::new_v4())).unwrap_err();
    assert!(matches!(err, DuplicateError::PageNotFound(id) if id == seeded.trashed.id));

    let mut foreign = request(seeded.home.id, Uuid::new_v4());
    foreign.parent_id = Some(other.home.id);
    let err = duplicate_page(&store, &foreign).unwrap_err();
    assert!(matches!(err, DuplicateError::ParentNotFound(id) if id == other.home.id));
}

#[test]
fn duplicate_under_deleted_parent_becomes_root() {
    let conn = spacetree_core::open_db_in_memory().unwrap();
    let store = SqliteWorkspaceStore::try_new(&conn).unwrap();
    let seeded = seed_space(&store, "acme");

    let mut orphan = page(&seeded.space, Some(&seeded.trashed), PageType::Page, "Orphan");
    orphan.order_index = 0;
    let mut batch = WriteBatch::new();
    batch.pages.push(orphan.clone());
    store.commit(&batch).unwrap();

    let copy = duplicate_page(&store, &request(orphan.id, Uuid::new_v4())).unwrap();
    assert_eq!(copy.parent_id, None);
}

#[test]
fn duplicating_board_leaves_cards_of_deleted_pages_behind() {
    let conn = spacetree_core::open_db_in_memory().unwrap();
    let store = SqliteWorkspaceStore::try_new(&conn).unwrap();
    let seeded = seed_space(&store, "acme");
    conn.execute(
        "UPDATE pages SET deleted_at = 1 WHERE id = ?1",
        [seeded.card_b.id.to_string()],
    )
    .unwrap();

    let copy = duplicate_page(&store, &request(seeded.board.id, Uuid::new_v4())).unwrap();

    let blocks = store
        .list_blocks(&BlockListQuery::BoardSubgraph(copy.id))
        .unwrap();
    let cards: Vec<_> = blocks
        .iter()
        .filter(|block| block.kind == BlockType::Card)
        .collect();
    assert_eq!(cards.len(), 1);
    let view = blocks
        .iter()
        .find(|block| block.kind == BlockType::View)
        .unwrap();
    assert_eq!(view.card_order(), vec![cards[0].id]);

    let card_pages = store
        .list_pages(&PageListQuery::Ids(vec![cards[0].id]))
        .unwrap();
    assert_eq!(card_pages.len(), 1);
    assert_eq!(card_pages[0].title, "Card A");
}
