#![allow(dead_code)]

use serde_json::json;
use spacetree_core::model::block::{BlockType, ContainerBlock};
use spacetree_core::model::bounty::{Bounty, BountyPermission, BountyPermissionLevel};
use spacetree_core::model::page::{PageNode, PageType};
use spacetree_core::model::permission::{PagePermission, PermissionAssignee, PermissionLevel};
use spacetree_core::model::proposal::{
    EvaluationType, Proposal, ProposalAssignee, ProposalEvaluation, ProposalReviewer,
    ProposalRubricCriteria,
};
use spacetree_core::model::space::{Role, Space};
use spacetree_core::model::vote::{Vote, VoteOption};
use spacetree_core::{SqliteWorkspaceStore, WorkspaceStore, WriteBatch};
use uuid::Uuid;

/// Ids of a seeded workspace:
///
/// ```text
/// home (page)
/// ├── board (board) -- view, card_a, card_b
/// │   ├── card_a (card)
/// │   └── card_b (card)
/// ├── proposal (proposal) -- evaluation with vote, role reviewer
/// ├── bounty (bounty)
/// └── trashed (page, deleted)
/// ```
pub struct SeededSpace {
    pub space: Space,
    pub role: Role,
    pub home: PageNode,
    pub board: PageNode,
    pub view_id: Uuid,
    pub card_a: PageNode,
    pub card_b: PageNode,
    pub proposal_page: PageNode,
    pub proposal_id: Uuid,
    pub vote_id: Uuid,
    pub bounty_page: PageNode,
    pub bounty_id: Uuid,
    pub trashed: PageNode,
    pub home_grant: PagePermission,
}

impl SeededSpace {
    pub fn live_page_count(&self) -> usize {
        6
    }
}

pub fn create_space(store: &SqliteWorkspaceStore<'_>, domain: &str) -> Space {
    let space = Space::new(domain, domain.to_uppercase(), Uuid::new_v4());
    store.create_space(&space).unwrap();
    space
}

pub fn page(space: &Space, parent: Option<&PageNode>, kind: PageType, title: &str) -> PageNode {
    PageNode::new(
        space.id,
        parent.map(|parent| parent.id),
        kind,
        title,
        space.created_by,
    )
}

pub fn seed_space(store: &SqliteWorkspaceStore<'_>, domain: &str) -> SeededSpace {
    let space = create_space(store, domain);
    let owner = space.created_by;
    let mut batch = WriteBatch::new();

    let role = Role {
        id: Uuid::new_v4(),
        space_id: space.id,
        name: "Reviewers".to_string(),
        created_by: owner,
        created_at: 0,
    };
    batch.roles.push(role.clone());

    let mut home = page(&space, None, PageType::Page, "Home");
    home.order_index = 0;

    let mut board = page(&space, Some(&home), PageType::Board, "Roadmap");
    board.order_index = 0;
    board.board_id = Some(board.id);

    let mut card_a = page(&space, Some(&board), PageType::Card, "Card A");
    card_a.order_index = 0;
    card_a.card_id = Some(card_a.id);
    let mut card_b = page(&space, Some(&board), PageType::Card, "Card B");
    card_b.order_index = 1;
    card_b.card_id = Some(card_b.id);

    let view_id = Uuid::new_v4();
    let mut board_block =
        ContainerBlock::new(board.id, space.id, BlockType::Board, board.id, None, owner);
    board_block.set_view_ids(&[view_id]);
    let mut view = ContainerBlock::new(
        view_id,
        space.id,
        BlockType::View,
        board.id,
        Some(board.id),
        owner,
    );
    view.title = "Table".to_string();
    view.set_card_order(&[card_a.id, card_b.id]);
    let card_blocks = [&card_a, &card_b].map(|card| {
        let mut block = ContainerBlock::new(
            card.id,
            space.id,
            BlockType::Card,
            board.id,
            Some(board.id),
            owner,
        );
        block.fields = json!({ "properties": { "status": "open" } });
        block
    });
    batch.blocks.push(board_block);
    batch.blocks.push(view);
    batch.blocks.extend(card_blocks);

    let mut proposal_page = page(&space, Some(&home), PageType::Proposal, "Budget");
    proposal_page.order_index = 1;
    let proposal_id = Uuid::new_v4();
    proposal_page.proposal_id = Some(proposal_id);
    let evaluation_id = Uuid::new_v4();
    let vote_id = Uuid::new_v4();
    batch.proposals.push(Proposal {
        id: proposal_id,
        space_id: space.id,
        created_by: owner,
        status: "draft".to_string(),
        workflow_id: Some(Uuid::new_v4()),
        fields: json!({}),
        created_at: 0,
    });
    batch.evaluations.push(ProposalEvaluation {
        id: evaluation_id,
        proposal_id,
        index: 0,
        title: "Community vote".to_string(),
        kind: EvaluationType::Vote,
        vote_id: Some(vote_id),
        required_reviews: 1,
        result: None,
        completed_at: None,
    });
    batch.reviewers.push(ProposalReviewer {
        id: Uuid::new_v4(),
        proposal_id,
        evaluation_id,
        assignee: ProposalAssignee::Role(role.id),
    });
    batch.reviewers.push(ProposalReviewer {
        id: Uuid::new_v4(),
        proposal_id,
        evaluation_id,
        assignee: ProposalAssignee::User(owner),
    });
    batch.rubric_criteria.push(ProposalRubricCriteria {
        id: Uuid::new_v4(),
        proposal_id,
        evaluation_id,
        index: 0,
        title: "Impact".to_string(),
        description: None,
        parameters: json!({ "min": 0, "max": 5 }),
    });
    batch.votes.push(Vote {
        id: vote_id,
        space_id: space.id,
        page_id: proposal_page.id,
        title: "Approve budget".to_string(),
        description: None,
        status: "in_progress".to_string(),
        threshold: 50,
        vote_type: "approval".to_string(),
        deadline: None,
        created_by: owner,
        created_at: 0,
    });
    batch.vote_options.extend(["Yes", "No"].iter().enumerate().map(|(index, name)| {
        VoteOption {
            vote_id,
            name: name.to_string(),
            index: index as i64,
        }
    }));

    let mut bounty_page = page(&space, Some(&home), PageType::Bounty, "Fix docs");
    bounty_page.order_index = 2;
    let bounty_id = Uuid::new_v4();
    bounty_page.bounty_id = Some(bounty_id);
    batch.bounties.push(Bounty {
        id: bounty_id,
        space_id: space.id,
        created_by: owner,
        status: "open".to_string(),
        reward_amount: Some(10.0),
        reward_token: Some("USDC".to_string()),
        chain_id: Some(1),
        max_submissions: None,
        approve_submitters: false,
        fields: json!({}),
        created_at: 0,
    });
    batch.bounty_permissions.push(BountyPermission {
        id: Uuid::new_v4(),
        bounty_id,
        permission_level: BountyPermissionLevel::Submitter,
        assignee: PermissionAssignee::Space(space.id),
    });

    let mut trashed = page(&space, Some(&home), PageType::Page, "Old notes");
    trashed.deleted_at = Some(1);

    let home_grant = PagePermission::direct(
        home.id,
        PermissionLevel::FullAccess,
        PermissionAssignee::Space(space.id),
    );
    batch.page_permissions.push(home_grant.clone());
    for child in [&board, &card_a, &card_b, &proposal_page, &bounty_page, &trashed] {
        batch.page_permissions.push(home_grant.inherited_by(child.id));
    }
    batch.page_permissions.push(PagePermission::direct(
        proposal_page.id,
        PermissionLevel::Editor,
        PermissionAssignee::Role(role.id),
    ));

    batch.pages.extend([
        home.clone(),
        board.clone(),
        card_a.clone(),
        card_b.clone(),
        proposal_page.clone(),
        bounty_page.clone(),
        trashed.clone(),
    ]);
    store.commit(&batch).unwrap();

    SeededSpace {
        space,
        role,
        home,
        board,
        view_id,
        card_a,
        card_b,
        proposal_page,
        proposal_id,
        vote_id,
        bounty_page,
        bounty_id,
        trashed,
        home_grant,
    }
}
