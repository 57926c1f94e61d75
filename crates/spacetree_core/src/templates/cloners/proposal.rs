//! Proposal cloner: evaluations, reviewers, rubric criteria and evaluation
//! permissions.
//!
//! `evaluation.vote_id` is copied verbatim here and remapped (or cleared)
//! after the traversal.

use crate::model::page::PageNode;
use crate::model::proposal::{
    Proposal, ProposalEvaluation, ProposalEvaluationPermission, ProposalReviewer,
    ProposalRubricCriteria, ProposalWithEvaluations,
};
use crate::templates::context::{CloneContext, PayloadKind};

pub fn clone_proposal(
    ctx: &mut CloneContext,
    source: &ProposalWithEvaluations,
    page: &mut PageNode,
) {
    if !ctx.mark_payload_processed(PayloadKind::Proposal, source.proposal.id) {
        page.proposal_id = ctx.mapped(source.proposal.id);
        return;
    }

    let new_proposal_id = ctx.new_id_for(source.proposal.id);
    ctx.batch.proposals.push(Proposal {
        id: new_proposal_id,
        space_id: ctx.target_space().id,
        created_by: ctx.owner_for(source.proposal.created_by),
        workflow_id: ctx.map_workflow(source.proposal.workflow_id),
        created_at: ctx.now(),
        ..source.proposal.clone()
    });

    for relations in &source.evaluations {
        let evaluation = &relations.evaluation;
        let new_evaluation_id = ctx.new_id_for(evaluation.id);
        ctx.batch.evaluations.push(ProposalEvaluation {
            id: new_evaluation_id,
            proposal_id: new_proposal_id,
            ..evaluation.clone()
        });

        for reviewer in &relations.reviewers {
            let Some(assignee) = ctx.map_proposal_assignee(&reviewer.assignee) else {
                continue;
            };
            let new_reviewer = ProposalReviewer {
                id: ctx.new_id_for(reviewer.id),
                proposal_id: new_proposal_id,
                evaluation_id: new_evaluation_id,
                assignee,
            };
            ctx.batch.reviewers.push(new_reviewer);
        }

        for permission in &relations.permissions {
            let Some(assignee) = ctx.map_proposal_assignee(&permission.assignee) else {
                continue;
            };
            let new_permission = ProposalEvaluationPermission {
                id: ctx.new_id_for(permission.id),
                evaluation_id: new_evaluation_id,
                operation: permission.operation.clone(),
                assignee,
            };
            ctx.batch.evaluation_permissions.push(new_permission);
        }

        for criteria in &relations.rubric_criteria {
            let new_criteria = ProposalRubricCriteria {
                id: ctx.new_id_for(criteria.id),
                proposal_id: new_proposal_id,
                evaluation_id: new_evaluation_id,
                ..criteria.clone()
            };
            ctx.batch.rubric_criteria.push(new_criteria);
        }
    }

    page.proposal_id = Some(new_proposal_id);
}
