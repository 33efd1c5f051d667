//! Logic Circuit IR
//!
//! Nodes and signals live in two arenas addressed by [`NodeId`] and
//! [`SignalId`]. Every node drives exactly one signal; a signal records its
//! single producer and every consumer. Circuits are built and validated by
//! [`LogicCircuitBuilder`](crate::LogicCircuitBuilder) and never change after.

use crate::error::{CircuitError, Result};
use crate::op::LogicOp;
use indexmap::IndexMap;
use petgraph::algo::toposort;
use petgraph::graph::DiGraph;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Handles
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignalId(pub u32);

impl SignalId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

// ============================================================================
// Nodes and signals
// ============================================================================

/// A named wire
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signal {
    pub name: String,
    pub producer: NodeId,
    pub consumers: Vec<NodeId>,
}

/// One boolean operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogicNode {
    pub id: NodeId,
    pub op: LogicOp,
    pub inputs: Vec<SignalId>,
    pub output: SignalId,
    /// Name of the sensor that drives an INPUT node
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// A node ordering in which every node follows all of its producers.
/// Iterating does not consume it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologicalOrder {
    nodes: Vec<NodeId>,
}

impl TopologicalOrder {
    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, NodeId>> {
        self.nodes.iter().copied()
    }

    pub fn as_slice(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl<'a> IntoIterator for &'a TopologicalOrder {
    type Item = NodeId;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, NodeId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
// Circuit
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogicCircuit {
    name: String,
    nodes: Vec<LogicNode>,
    signals: Vec<Signal>,
    #[serde(skip)]
    by_name: IndexMap<String, SignalId>,
    inputs: Vec<NodeId>,
    outputs: Vec<NodeId>,
}

impl LogicCircuit {
    /// Assemble arenas produced by the builder. Does not validate.
    pub(crate) fn from_parts(name: String, nodes: Vec<LogicNode>, signals: Vec<Signal>) -> Self {
        let by_name = signals
            .iter()
            .enumerate()
            .map(|(i, s)| (s.name.clone(), SignalId(i as u32)))
            .collect();
        let inputs = nodes
            .iter()
            .filter(|n| n.op == LogicOp::Input)
            .map(|n| n.id)
            .collect();
        let outputs = nodes
            .iter()
            .filter(|n| n.op == LogicOp::Output)
            .map(|n| n.id)
            .collect();
        Self {
            name,
            nodes,
            signals,
            by_name,
            inputs,
            outputs,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nodes(&self) -> &[LogicNode] {
        &self.nodes
    }

    /// Panics if `id` does not belong to this circuit
    pub fn node(&self, id: NodeId) -> &LogicNode {
        &self.nodes[id.index()]
    }

    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    /// Panics if `id` does not belong to this circuit
    pub fn signal(&self, id: SignalId) -> &Signal {
        &self.signals[id.index()]
    }

    pub fn signal_by_name(&self, name: &str) -> Option<SignalId> {
        self.by_name.get(name).copied()
    }

    /// Name of the signal a node drives
    pub fn node_name(&self, id: NodeId) -> &str {
        &self.signal(self.node(id).output).name
    }

    /// INPUT nodes in declaration order
    pub fn inputs(&self) -> &[NodeId] {
        &self.inputs
    }

    /// OUTPUT nodes in declaration order
    pub fn outputs(&self) -> &[NodeId] {
        &self.outputs
    }

    /// Number of nodes that transform their inputs
    pub fn gate_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.op.is_gate()).count()
    }

    /// Nodes producing the inputs of `id`, in input order
    pub fn producers(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(id)
            .inputs
            .iter()
            .map(move |s| self.signal(*s).producer)
    }

    /// Nodes reading the output of `id`
    pub fn consumers(&self, id: NodeId) -> &[NodeId] {
        &self.signal(self.node(id).output).consumers
    }

    /// Order the nodes so every node follows its producers
    pub fn topological_order(&self) -> Result<TopologicalOrder> {
        let mut graph = DiGraph::<NodeId, ()>::with_capacity(self.nodes.len(), self.signals.len());
        let handles: Vec<_> = self.nodes.iter().map(|n| graph.add_node(n.id)).collect();

        for node in &self.nodes {
            for input in &node.inputs {
                let producer = self.signal(*input).producer;
                graph.add_edge(handles[producer.index()], handles[node.id.index()], ());
            }
        }

        match toposort(&graph, None) {
            Ok(order) => Ok(TopologicalOrder {
                nodes: order.into_iter().map(|n| graph[n]).collect(),
            }),
            Err(cycle) => {
                let node = graph[cycle.node_id()];
                Err(CircuitError::Cyclic(self.node_name(node).to_string()))
            }
        }
    }

    /// Boolean output values (in output order) for one input assignment (in
    /// input order). `None` if the number of values does not match the
    /// number of inputs.
    pub fn evaluate(&self, inputs: &[bool]) -> Option<Vec<bool>> {
        if inputs.len() != self.inputs.len() {
            return None;
        }
        let order = self.topological_order().ok()?;

        let mut values = vec![false; self.signals.len()];
        for (node, value) in self.inputs.iter().zip(inputs) {
            values[self.node(*node).output.index()] = *value;
        }
        let mut args = Vec::with_capacity(2);
        for id in &order {
            let node = self.node(id);
            args.clear();
            args.extend(node.inputs.iter().map(|s| values[s.index()]));
            if let Some(value) = node.op.eval(&args) {
                values[node.output.index()] = value;
            }
        }

        Some(
            self.outputs
                .iter()
                .map(|id| values[self.node(*id).output.index()])
                .collect(),
        )
    }
}
