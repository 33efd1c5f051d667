//! Structured assignment failures

use crate::config::AssignMode;
use genmap_catalog::GateFunction;
use genmap_logic::NodeId;
use serde::Serialize;
use std::fmt;

/// Which search bound stopped a search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchBound {
    NodeBudget,
    Deadline,
    Cancelled,
}

impl fmt::Display for SearchBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchBound::NodeBudget => write!(f, "search-node budget"),
            SearchBound::Deadline => write!(f, "deadline"),
            SearchBound::Cancelled => write!(f, "cancellation"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum FailureReason {
    /// The circuit could not be processed at all
    MalformedCircuit { detail: String },
    /// No part satisfies the constraints given the earlier commitments
    NoFeasibleCandidate,
    /// A bound fired before the search finished
    SearchExhausted { bound: SearchBound },
    /// The catalog has no part implementing a required function
    EmptyCatalogPartition { function: GateFunction },
}

/// A circuit node named in a failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedNode {
    pub id: NodeId,
    /// The signal the node drives
    pub signal: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentFailure {
    /// None for circuit-level problems
    pub node: Option<FailedNode>,
    pub mode: AssignMode,
    pub reason: FailureReason,
}

impl AssignmentFailure {
    /// True when the circuit itself was unusable
    pub fn is_malformed(&self) -> bool {
        matches!(self.reason, FailureReason::MalformedCircuit { .. })
    }
}

impl fmt::Display for AssignmentFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} assignment failed", self.mode)?;
        if let Some(node) = &self.node {
            write!(f, " at node {} ('{}')", node.id, node.signal)?;
        }
        match &self.reason {
            FailureReason::MalformedCircuit { detail } => write!(f, ": malformed circuit: {}", detail),
            FailureReason::NoFeasibleCandidate => write!(f, ": no feasible candidate"),
            FailureReason::SearchExhausted { bound } => {
                write!(f, ": search exhausted by {}", bound)
            }
            FailureReason::EmptyCatalogPartition { function } => {
                write!(f, ": catalog has no {} parts", function)
            }
        }
    }
}

impl std::error::Error for AssignmentFailure {}
