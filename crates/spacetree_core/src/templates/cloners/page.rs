//! Page row cloner.

use crate::model::page::PageNode;
use crate::model::PageId;
use crate::templates::context::CloneContext;

/// New page row for `source` under `new_parent_id`.
///
/// Specialized links (`board_id`, `card_id`, `bounty_id`, `proposal_id`) are
/// cleared here and set by the payload cloners.
pub fn clone_page_row(
    ctx: &mut CloneContext,
    source: &PageNode,
    new_id: PageId,
    new_parent_id: Option<PageId>,
    is_entry: bool,
) -> PageNode {
    let path = ctx.assign_path(&source.path);
    let title = if is_entry && ctx.options().update_title {
        format!("{} (copy)", source.title)
    } else {
        source.title.clone()
    };
    PageNode {
        id: new_id,
        space_id: ctx.target_space().id,
        parent_id: new_parent_id,
        title,
        path,
        board_id: None,
        card_id: None,
        bounty_id: None,
        proposal_id: None,
        created_by: ctx.owner_for(source.created_by),
        created_at: ctx.now(),
        updated_at: ctx.now(),
        deleted_at: None,
        ..source.clone()
    }
}
