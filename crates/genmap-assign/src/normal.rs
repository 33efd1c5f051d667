//! Greedy assignment: commit the best feasible part at every gate

use crate::candidates::CandidateStream;
use crate::context::{MappingContext, PartialAssignment};
use crate::failure::{AssignmentFailure, FailureReason};
use tracing::debug;

pub(crate) fn run(ctx: &MappingContext<'_>) -> Result<PartialAssignment, AssignmentFailure> {
    let mut partial = ctx.base();

    for (depth, site) in ctx.gates.iter().enumerate() {
        if let Some(bound) = ctx.limits.interrupted() {
            return Err(ctx.fail(site.node, FailureReason::SearchExhausted { bound }));
        }

        let mut stream = CandidateStream::open(ctx, &partial, depth);
        let Some(candidate) = stream.next(ctx, &partial)? else {
            debug!(
                "{}: no feasible candidate after {} commitments",
                ctx.circuit.node_name(site.node),
                depth
            );
            return Err(ctx.fail(site.node, FailureReason::NoFeasibleCandidate));
        };

        debug!(
            "{}: committed {} (mismatch {:.4})",
            ctx.circuit.node_name(site.node),
            ctx.catalog[candidate.part].name,
            candidate.mismatch
        );
        partial = partial.extend(site.node, &candidate);
    }

    Ok(partial)
}
