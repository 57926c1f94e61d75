//! Board/view/card cloner.
//!
//! The new board block takes the new page id; a new card block takes the
//! new card page id. `cardOrder`, `viewIds` and `linkedSourceId` are
//! rewritten after the traversal, once every id of the run is known.

use crate::model::block::ContainerBlock;
use crate::model::page::PageNode;
use crate::model::PageId;
use crate::service::block_relink::{clone_block, BlockCloneScope};
use crate::templates::context::{CloneContext, PayloadKind};

pub fn clone_board(
    ctx: &mut CloneContext,
    board: Option<&ContainerBlock>,
    views: &[ContainerBlock],
    page: &mut PageNode,
) {
    let new_board_id = page.id;
    if let Some(board) = board {
        ctx.alias(board.id, new_board_id);
        let scope = scope_for(ctx, board);
        ctx.batch
            .blocks
            .push(clone_block(board, new_board_id, new_board_id, &scope));
        page.board_id = Some(new_board_id);
    }
    for view in views {
        if !ctx.mark_payload_processed(PayloadKind::View, view.id) {
            continue;
        }
        let new_view_id = ctx.new_id_for(view.id);
        let scope = scope_for(ctx, view);
        ctx.batch
            .blocks
            .push(clone_block(view, new_view_id, new_board_id, &scope));
    }
}

pub fn clone_card(
    ctx: &mut CloneContext,
    card: &ContainerBlock,
    page: &mut PageNode,
    new_parent_id: Option<PageId>,
) {
    let new_card_id = page.id;
    ctx.alias(card.id, new_card_id);
    let new_board_id = ctx
        .mapped(card.root_id)
        .or(new_parent_id)
        .unwrap_or(new_card_id);
    let scope = scope_for(ctx, card);
    ctx.batch
        .blocks
        .push(clone_block(card, new_card_id, new_board_id, &scope));
    page.card_id = Some(new_card_id);
}

fn scope_for(ctx: &CloneContext, block: &ContainerBlock) -> BlockCloneScope {
    BlockCloneScope {
        space_id: ctx.target_space().id,
        created_by: ctx.owner_for(block.created_by),
        now: ctx.now(),
    }
}
