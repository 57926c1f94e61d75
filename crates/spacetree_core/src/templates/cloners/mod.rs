//! Per-kind cloners selected by payload tag.
//!
//! Each cloner copies one specialized payload of a snapshot page into the
//! run's `WriteBatch`, rewriting embedded foreign keys through the shared
//! `CloneContext`.

use super::context::CloneContext;
use super::snapshot::ExportedPage;
use crate::model::block::ContainerBlock;
use crate::model::bounty::BountyWithPermissions;
use crate::model::page::PageNode;
use crate::model::proposal::ProposalWithEvaluations;
use crate::model::vote::VoteWithOptions;
use crate::model::PageId;

pub mod board;
pub mod bounty;
pub mod page;
pub mod permission;
pub mod proposal;
pub mod vote;

/// Specialized payload carried by one snapshot page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Payload<'a> {
    Board {
        board: Option<&'a ContainerBlock>,
        views: &'a [ContainerBlock],
    },
    Card(&'a ContainerBlock),
    Bounty(&'a BountyWithPermissions),
    Proposal(&'a ProposalWithEvaluations),
    Votes(&'a [VoteWithOptions]),
}

/// Lists the payloads of `node` in clone order.
pub fn payloads(node: &ExportedPage) -> Vec<Payload<'_>> {
    let mut found = Vec::new();
    if let Some(blocks) = &node.blocks {
        if node.page.kind.is_board_like() {
            found.push(Payload::Board {
                board: blocks.board.as_ref(),
                views: &blocks.views,
            });
        } else if node.page.kind.is_card() {
            if let Some(card) = &blocks.card {
                found.push(Payload::Card(card));
            }
        }
    }
    if let Some(bounty) = &node.bounty {
        found.push(Payload::Bounty(bounty));
    }
    if let Some(proposal) = &node.proposal {
        found.push(Payload::Proposal(proposal));
    }
    if !node.votes.is_empty() {
        found.push(Payload::Votes(&node.votes));
    }
    found
}

/// Clones every payload of `node` and links them from the new `page` row.
pub fn clone_payloads(
    ctx: &mut CloneContext,
    node: &ExportedPage,
    page: &mut PageNode,
    new_parent_id: Option<PageId>,
) {
    for payload in payloads(node) {
        match payload {
            Payload::Board {
                board: source_board,
                views,
            } => board::clone_board(ctx, source_board, views, page),
            Payload::Card(card) => board::clone_card(ctx, card, page, new_parent_id),
            Payload::Bounty(source) => bounty::clone_bounty(ctx, source, page),
            Payload::Proposal(source) => proposal::clone_proposal(ctx, source, page),
            Payload::Votes(votes) => vote::clone_votes(ctx, votes, page.id),
        }
    }
}
