//! Logic circuit intermediate representation
//!
//! A logic circuit is an acyclic graph of boolean operators over named
//! signals. This crate provides the arena representation, a validating
//! builder, a JSON description format and topological ordering.

pub mod builder;
pub mod circuit;
pub mod description;
pub mod error;
pub mod op;

pub use builder::LogicCircuitBuilder;
pub use circuit::{LogicCircuit, LogicNode, NodeId, Signal, SignalId, TopologicalOrder};
pub use description::{from_json_str, from_path, CircuitDescription, GateDecl, InputDecl, OutputDecl};
pub use error::{CircuitError, LoadError, Result};
pub use op::LogicOp;
