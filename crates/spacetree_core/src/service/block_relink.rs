//! Board/view/card cloning rules shared by duplication and import.
//!
//! # Invariants
//! - A cloned block's `root_id` is the new board id, never a source id.
//! - Views and cards are parented to the new board block.
//! - References are rewritten through the id map; card ids without a cloned
//!   counterpart are dropped from `cardOrder`, view ids likewise from `viewIds`.

use crate::model::block::{BlockType, ContainerBlock};
use crate::model::{BlockId, SpaceId, UserId};
use std::collections::HashMap;
use uuid::Uuid;

/// Ownership and timestamps applied to every cloned block.
#[derive(Debug, Clone, Copy)]
pub struct BlockCloneScope {
    pub space_id: SpaceId,
    pub created_by: UserId,
    pub now: i64,
}

/// Copies `source` under `new_id` inside the board `new_board_id`.
///
/// Field references are left untouched; call [`relink_block_references`]
/// once every id of the run is known.
pub fn clone_block(
    source: &ContainerBlock,
    new_id: BlockId,
    new_board_id: BlockId,
    scope: &BlockCloneScope,
) -> ContainerBlock {
    let parent_id = match source.kind {
        BlockType::Board => None,
        BlockType::View | BlockType::Card => Some(new_board_id),
    };
    ContainerBlock {
        id: new_id,
        space_id: scope.space_id,
        root_id: new_board_id,
        parent_id,
        kind: source.kind,
        title: source.title.clone(),
        fields: source.fields.clone(),
        schema: source.schema,
        created_by: scope.created_by,
        created_at: scope.now,
        updated_at: scope.now,
        deleted_at: None,
    }
}

/// Rewrites id references held in `block.fields`.
pub fn relink_block_references(block: &mut ContainerBlock, ids: &HashMap<Uuid, Uuid>) {
    match block.kind {
        BlockType::Board => {
            let view_ids = map_known(&block.view_ids(), ids);
            if block.fields.get("viewIds").is_some() {
                block.set_view_ids(&view_ids);
            }
        }
        BlockType::View => {
            if block.fields.get("cardOrder").is_some() {
                let card_order = map_known(&block.card_order(), ids);
                block.set_card_order(&card_order);
            }
            if let Some(new_source) = block
                .linked_source_id()
                .and_then(|source_id| ids.get(&source_id).copied())
            {
                block.set_linked_source_id(new_source);
            }
        }
        BlockType::Card => {}
    }
}

fn map_known(source_ids: &[Uuid], ids: &HashMap<Uuid, Uuid>) -> Vec<Uuid> {
    source_ids
        .iter()
        .filter_map(|source_id| ids.get(source_id).copied())
        .collect()
}
