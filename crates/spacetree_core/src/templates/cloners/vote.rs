//! Vote cloner.

use crate::model::vote::{Vote, VoteOption, VoteWithOptions};
use crate::model::PageId;
use crate::templates::context::{CloneContext, PayloadKind};

pub fn clone_votes(ctx: &mut CloneContext, votes: &[VoteWithOptions], new_page_id: PageId) {
    for source in votes {
        if !ctx.mark_payload_processed(PayloadKind::Vote, source.vote.id) {
            continue;
        }
        let new_vote_id = ctx.new_id_for(source.vote.id);
        ctx.batch.votes.push(Vote {
            id: new_vote_id,
            space_id: ctx.target_space().id,
            page_id: new_page_id,
            created_by: ctx.owner_for(source.vote.created_by),
            created_at: ctx.now(),
            ..source.vote.clone()
        });
        ctx.batch
            .vote_options
            .extend(source.options.iter().map(|option| VoteOption {
                vote_id: new_vote_id,
                ..option.clone()
            }));
    }
}
