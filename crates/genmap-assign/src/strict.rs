//! Branch-and-bound assignment
//!
//! Depth-first search over the gate order with an explicit frame stack.
//! Each frame owns the partial assignment it extends and the ranked
//! candidate stream for its gate; backtracking pops the frame. The running
//! score is the bottleneck (largest mismatch so far), and a branch is cut as
//! soon as it cannot beat the incumbent.
//!
//! With `parallel_branches`, the feasible candidates of the first gate are
//! explored on rayon workers. Under a frame budget each branch gets a fixed
//! slice of it and prunes on its own incumbent only, so a budgeted run ends
//! the same way on every schedule. Without a budget the workers share the
//! best bottleneck found so far.

use crate::candidates::CandidateStream;
use crate::context::{MappingContext, PartialAssignment};
use crate::failure::{AssignmentFailure, FailureReason, SearchBound};
use genmap_logic::NodeId;
use rayon::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

struct Frame {
    depth: usize,
    partial: PartialAssignment,
    stream: CandidateStream,
}

impl Frame {
    fn open(ctx: &MappingContext<'_>, partial: PartialAssignment, depth: usize) -> Self {
        let stream = CandidateStream::open(ctx, &partial, depth);
        Self {
            depth,
            partial,
            stream,
        }
    }
}

/// Frames opened by one search, against an optional cap
struct FrameCounter {
    used: AtomicU64,
    cap: Option<u64>,
}

impl FrameCounter {
    fn new(used: u64, cap: Option<u64>) -> Self {
        Self {
            used: AtomicU64::new(used),
            cap,
        }
    }

    /// Count one more frame; false once the count passes the cap
    fn take(&self) -> bool {
        let used = self.used.fetch_add(1, Ordering::Relaxed) + 1;
        self.cap.map_or(true, |cap| used <= cap)
    }

    fn used(&self) -> u64 {
        self.used.load(Ordering::Relaxed)
    }
}

/// Best bottleneck across workers, stored as f64 bits. Non-negative floats
/// order the same as their bit patterns.
struct SharedBound(AtomicU64);

impl SharedBound {
    fn new() -> Self {
        Self(AtomicU64::new(f64::INFINITY.to_bits()))
    }

    fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    fn offer(&self, bottleneck: f64) {
        self.0.fetch_min(bottleneck.to_bits(), Ordering::Relaxed);
    }
}

#[derive(Default)]
struct Outcome {
    best: Option<PartialAssignment>,
    /// Bound that stopped the search, with the gate being expanded
    bound: Option<(SearchBound, NodeId)>,
    /// Deepest gate that had no feasible candidate
    deepest: Option<(usize, NodeId)>,
}

impl Outcome {
    fn stopped(mut self, bound: SearchBound, node: NodeId) -> Self {
        self.bound = Some((bound, node));
        self
    }
}

pub(crate) fn run(ctx: &MappingContext<'_>) -> Result<PartialAssignment, AssignmentFailure> {
    let base = ctx.base();
    let Some(first) = ctx.gates.first() else {
        return Ok(base);
    };

    // The root frame counts against the budget
    let (outcome, used) = if ctx.config.parallel_branches {
        explore_branches(ctx, base)?
    } else {
        let frames = FrameCounter::new(1, ctx.limits.max_nodes);
        let outcome = explore(ctx, base, 0, &frames, None)?;
        (outcome, frames.used())
    };
    debug!("{}: strict search used {} frames", ctx.circuit.name(), used);

    if let Some((bound, node)) = outcome.bound {
        if let Some(best) = &outcome.best {
            info!(
                "{}: {} hit with an incumbent of bottleneck {:.4}; optimality not proven",
                ctx.circuit.name(),
                bound,
                best.bottleneck()
            );
        }
        return Err(ctx.fail(node, FailureReason::SearchExhausted { bound }));
    }

    match (outcome.best, outcome.deepest) {
        (Some(best), _) => Ok(best),
        (None, Some((_, node))) => Err(ctx.fail(node, FailureReason::NoFeasibleCandidate)),
        (None, None) => Err(ctx.fail(first.node, FailureReason::NoFeasibleCandidate)),
    }
}

fn explore(
    ctx: &MappingContext<'_>,
    start: PartialAssignment,
    start_depth: usize,
    frames: &FrameCounter,
    shared: Option<&SharedBound>,
) -> Result<Outcome, AssignmentFailure> {
    let mut outcome = Outcome::default();
    let mut stack = vec![Frame::open(ctx, start, start_depth)];

    while let Some(frame) = stack.last_mut() {
        let site = &ctx.gates[frame.depth];
        if let Some(bound) = ctx.limits.interrupted() {
            return Ok(outcome.stopped(bound, site.node));
        }

        let Some(candidate) = frame.stream.next(ctx, &frame.partial)? else {
            if frame.stream.feasible() == 0
                && outcome.deepest.map_or(true, |(d, _)| frame.depth > d)
            {
                outcome.deepest = Some((frame.depth, site.node));
            }
            debug!("{}: backtrack", ctx.circuit.node_name(site.node));
            stack.pop();
            continue;
        };

        // Candidates arrive in ascending mismatch, so once one cannot win
        // nothing later in this frame can either
        let running = frame.partial.bottleneck().max(candidate.mismatch);
        let incumbent = outcome
            .best
            .as_ref()
            .map_or(f64::INFINITY, PartialAssignment::bottleneck);
        let global = shared.map_or(f64::INFINITY, SharedBound::get);
        if running >= incumbent || running > global {
            stack.pop();
            continue;
        }

        let child = frame.partial.extend(site.node, &candidate);
        let depth = frame.depth + 1;
        if depth == ctx.gates.len() {
            debug!(
                "{}: new incumbent with bottleneck {:.4}",
                ctx.circuit.name(),
                running
            );
            if let Some(shared) = shared {
                shared.offer(running);
            }
            outcome.best = Some(child);
            continue;
        }

        if !frames.take() {
            return Ok(outcome.stopped(SearchBound::NodeBudget, ctx.gates[depth].node));
        }
        stack.push(Frame::open(ctx, child, depth));
    }

    Ok(outcome)
}

/// Split what the root frame leaves of `max` into `n` slices, the
/// remainder going to the first branches
fn budget_slices(max: u64, n: usize) -> Vec<u64> {
    let remaining = max.saturating_sub(1);
    let n = n as u64;
    (0..n)
        .map(|i| remaining / n + u64::from(i < remaining % n))
        .collect()
}

fn explore_branches(
    ctx: &MappingContext<'_>,
    base: PartialAssignment,
) -> Result<(Outcome, u64), AssignmentFailure> {
    let root = &ctx.gates[0];
    let mut stream = CandidateStream::open(ctx, &base, 0);
    let mut branches = Vec::new();
    while let Some(candidate) = stream.next(ctx, &base)? {
        branches.push(candidate);
    }
    if branches.is_empty() {
        let outcome = Outcome {
            deepest: Some((0, root.node)),
            ..Default::default()
        };
        return Ok((outcome, 1));
    }
    debug!(
        "{}: exploring {} branches in parallel",
        ctx.circuit.name(),
        branches.len()
    );

    // A shared bound makes each branch's frame count depend on timing, so it
    // is only used when no budget applies
    let counters: Vec<FrameCounter> = match ctx.limits.max_nodes {
        Some(max) => budget_slices(max, branches.len())
            .into_iter()
            .map(|slice| FrameCounter::new(0, Some(slice)))
            .collect(),
        None => branches.iter().map(|_| FrameCounter::new(0, None)).collect(),
    };
    let shared = ctx.limits.max_nodes.is_none().then(SharedBound::new);

    let results: Vec<Result<Outcome, AssignmentFailure>> = branches
        .par_iter()
        .zip(&counters)
        .map(|(candidate, frames)| {
            let child = base.extend(root.node, candidate);
            if ctx.gates.len() == 1 {
                if let Some(shared) = &shared {
                    shared.offer(child.bottleneck());
                }
                return Ok(Outcome {
                    best: Some(child),
                    ..Default::default()
                });
            }
            if !frames.take() {
                return Ok(Outcome::default().stopped(SearchBound::NodeBudget, ctx.gates[1].node));
            }
            explore(ctx, child, 1, frames, shared.as_ref())
        })
        .collect();

    // Merge in branch order so ties resolve as the serial search would
    let mut merged = Outcome::default();
    for result in results {
        let outcome = result?;
        if let Some(best) = outcome.best {
            let better = merged
                .best
                .as_ref()
                .map_or(true, |b| best.bottleneck() < b.bottleneck());
            if better {
                merged.best = Some(best);
            }
        }
        if merged.bound.is_none() {
            merged.bound = outcome.bound;
        }
        if let Some((depth, node)) = outcome.deepest {
            if merged.deepest.map_or(true, |(d, _)| depth > d) {
                merged.deepest = Some((depth, node));
            }
        }
    }
    let used = 1 + counters.iter().map(FrameCounter::used).sum::<u64>();
    Ok((merged, used))
}
