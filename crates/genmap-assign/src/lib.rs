//! Technology mapping of logic circuits onto genetic gate catalogs
//!
//! The assigner binds every node of a [`LogicCircuit`](genmap_logic::LogicCircuit)
//! to a part from a [`GateCatalog`](genmap_catalog::GateCatalog) such that
//! each part implements its node's function, wired molecules match, parts on
//! a wire do not share an orthogonality group and every part switches inside
//! the window its producers leave it. Among feasible parts, the one closest
//! to the target curve of its position is preferred.
//!
//! Two modes share these rules:
//! - [`AssignMode::Normal`]: one greedy pass, no backtracking
//! - [`AssignMode::Strict`]: branch and bound minimizing the bottleneck
//!   (worst single-gate mismatch), within a frame budget and optional
//!   deadline

pub mod assigner;
mod candidates;
pub mod cancel;
pub mod config;
mod context;
pub mod failure;
pub mod genetic;
mod normal;
mod strict;
pub mod target;

pub use assigner::{assign, Assigner};
pub use cancel::CancelToken;
pub use config::{AssignMode, AssignerConfig, ConfigError, CrosstalkScope, IdealGate};
pub use context::gate_function;
pub use failure::{AssignmentFailure, FailedNode, FailureReason, SearchBound};
pub use genetic::{
    Binding, BoundPart, GeneticCircuit, NodeAssignment, OutputReport, TruthRow, TruthTable, Wire,
    MAX_TRUTH_TABLE_INPUTS,
};
pub use target::TargetPolicy;
