//! Ranked candidate streams
//!
//! A stream yields the feasible parts for one gate in ascending mismatch
//! order. It pulls neighbours from the catalog index in batches of doubling
//! size, excluding parts it has already yielded and, without reuse, parts
//! the partial assignment already binds.

use crate::context::{Candidate, MappingContext, PartialAssignment};
use crate::failure::AssignmentFailure;
use genmap_catalog::{FeatureVector, InputWindow, PartId};
use std::collections::{HashSet, VecDeque};
use tracing::trace;

pub(crate) struct CandidateStream {
    depth: usize,
    window: InputWindow,
    query: FeatureVector,
    batch: usize,
    buffer: VecDeque<(PartId, f64)>,
    yielded: HashSet<PartId>,
    exhausted: bool,
    feasible: usize,
}

impl CandidateStream {
    /// Stream for the gate at `depth` of the search order
    pub fn open(ctx: &MappingContext<'_>, partial: &PartialAssignment, depth: usize) -> Self {
        let site = &ctx.gates[depth];
        let window = ctx.window(partial, site);
        let target = ctx.policy.target(site.function, window);
        Self {
            depth,
            window,
            query: ctx.catalog.project(&target),
            batch: 1,
            buffer: VecDeque::new(),
            yielded: HashSet::new(),
            // Overlapping input levels rule out every part
            exhausted: !window.is_separable(),
            feasible: 0,
        }
    }

    /// Feasible candidates yielded so far
    pub fn feasible(&self) -> usize {
        self.feasible
    }

    pub fn next(
        &mut self,
        ctx: &MappingContext<'_>,
        partial: &PartialAssignment,
    ) -> Result<Option<Candidate>, AssignmentFailure> {
        let site = &ctx.gates[self.depth];
        loop {
            let Some((id, distance)) = self.buffer.pop_front() else {
                if self.exhausted {
                    return Ok(None);
                }
                self.refill(ctx, partial)?;
                continue;
            };
            match ctx.check(partial, site, self.window, id, distance) {
                Ok(candidate) => {
                    self.feasible += 1;
                    return Ok(Some(candidate));
                }
                Err(rejection) => trace!(
                    "{}: rejected {} ({:.4}): {}",
                    ctx.circuit.node_name(site.node),
                    ctx.catalog[id].name,
                    distance,
                    rejection
                ),
            }
        }
    }

    fn refill(
        &mut self,
        ctx: &MappingContext<'_>,
        partial: &PartialAssignment,
    ) -> Result<(), AssignmentFailure> {
        let site = &ctx.gates[self.depth];
        let mut excluded = self.yielded.clone();
        if !ctx.allow_reuse {
            excluded.extend(partial.parts());
        }

        let hits = ctx
            .catalog
            .excluding(site.function, &self.query, self.batch, &excluded)
            .map_err(|e| ctx.catalog_failure(site.node, e))?;

        if hits.len() < self.batch {
            self.exhausted = true;
        }
        for hit in hits {
            self.yielded.insert(hit.id);
            self.buffer.push_back((hit.id, hit.distance));
        }
        let partition = ctx.catalog.partition_len(site.function).max(1);
        self.batch = (self.batch * 2).min(partition);
        Ok(())
    }
}
