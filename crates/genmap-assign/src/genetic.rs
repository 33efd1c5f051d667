//! Genetic Circuit
//!
//! The finalized result of an assignment: every logic node bound to a
//! sensor, a catalog part or an output, the molecule-typed wiring, and the
//! per-node and circuit-level scores. Values of this type are never
//! modified after the assigner returns them.

use crate::config::AssignMode;
use genmap_catalog::{GateFunction, Molecule, PartId, ResponseFunction, SignalRange};
use genmap_logic::{LogicOp, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Truth tables are enumerated exhaustively up to this many inputs
pub const MAX_TRUTH_TABLE_INPUTS: usize = 16;

// ============================================================================
// Bindings
// ============================================================================

/// Catalog part bound to a gate node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundPart {
    pub id: PartId,
    pub name: String,
    pub function: GateFunction,
    pub group: String,
    pub inputs: Vec<Molecule>,
    pub response: ResponseFunction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Binding {
    /// Circuit input driven by a catalog sensor
    Sensor { name: String },
    /// Circuit input at the configured reference levels
    Reference,
    /// Gate bound to a catalog part
    Part(BoundPart),
    /// Circuit output, passes its producer through
    Output,
}

impl Binding {
    pub fn part(&self) -> Option<&BoundPart> {
        match self {
            Binding::Part(part) => Some(part),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeAssignment {
    pub node: NodeId,
    /// Signal the node drives
    pub signal: String,
    pub op: LogicOp,
    pub binding: Binding,
    /// Distance between the bound part and its target (0 for sensors and
    /// outputs)
    pub mismatch: f64,
    /// Molecule carried by the node's output
    pub molecule: Molecule,
    /// Worst-case output levels
    pub range: SignalRange,
    pub producers: Vec<NodeId>,
}

/// A molecule-typed edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wire {
    pub signal: String,
    pub producer: NodeId,
    pub consumer: NodeId,
    pub molecule: Molecule,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputReport {
    pub name: String,
    pub node: NodeId,
    pub low: f64,
    pub high: f64,
    pub on_off_ratio: f64,
}

// ============================================================================
// Genetic circuit
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneticCircuit {
    name: String,
    catalog: String,
    mode: AssignMode,
    bottleneck: f64,
    /// Circuit inputs in declaration order
    inputs: Vec<NodeId>,
    /// All nodes in topological order
    nodes: Vec<NodeAssignment>,
    wires: Vec<Wire>,
    outputs: Vec<OutputReport>,
}

impl GeneticCircuit {
    pub(crate) fn new(
        name: String,
        catalog: String,
        mode: AssignMode,
        inputs: Vec<NodeId>,
        nodes: Vec<NodeAssignment>,
        wires: Vec<Wire>,
        outputs: Vec<OutputReport>,
    ) -> Self {
        let bottleneck = nodes.iter().map(|n| n.mismatch).fold(0.0, f64::max);
        Self {
            name,
            catalog,
            mode,
            bottleneck,
            inputs,
            nodes,
            wires,
            outputs,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the catalog the parts come from
    pub fn catalog(&self) -> &str {
        &self.catalog
    }

    pub fn mode(&self) -> AssignMode {
        self.mode
    }

    /// Worst per-node mismatch
    pub fn bottleneck(&self) -> f64 {
        self.bottleneck
    }

    pub fn nodes(&self) -> &[NodeAssignment] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeAssignment> {
        self.nodes.iter().find(|n| n.node == id)
    }

    /// Assignment of the node driving `signal`
    pub fn by_signal(&self, signal: &str) -> Option<&NodeAssignment> {
        self.nodes.iter().find(|n| n.signal == signal)
    }

    /// Gate nodes with their parts
    pub fn parts(&self) -> impl Iterator<Item = (&NodeAssignment, &BoundPart)> {
        self.nodes
            .iter()
            .filter_map(|n| n.binding.part().map(|p| (n, p)))
    }

    pub fn wires(&self) -> &[Wire] {
        &self.wires
    }

    pub fn outputs(&self) -> &[OutputReport] {
        &self.outputs
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Steady-state output levels for every input combination.
    /// `None` above [`MAX_TRUTH_TABLE_INPUTS`] inputs.
    pub fn truth_table(&self) -> Option<TruthTable> {
        if self.inputs.len() > MAX_TRUTH_TABLE_INPUTS {
            return None;
        }
        let position: HashMap<NodeId, usize> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.node, i))
            .collect();

        let input_slots: Vec<usize> = self
            .inputs
            .iter()
            .filter_map(|id| position.get(id).copied())
            .collect();
        let output_slots: Vec<usize> = self
            .outputs
            .iter()
            .filter_map(|o| position.get(&o.node).copied())
            .collect();

        let mut rows = Vec::with_capacity(1 << input_slots.len());
        let mut levels = vec![0.0; self.nodes.len()];
        let mut logic = vec![false; self.nodes.len()];

        for combo in 0..(1usize << input_slots.len()) {
            let values: Vec<bool> = (0..input_slots.len())
                .map(|i| combo & (1 << i) != 0)
                .collect();
            for (slot, value) in input_slots.iter().zip(&values) {
                logic[*slot] = *value;
                levels[*slot] = self.nodes[*slot].range.level(*value);
            }

            for (i, node) in self.nodes.iter().enumerate() {
                let ins: Vec<usize> = node
                    .producers
                    .iter()
                    .filter_map(|p| position.get(p).copied())
                    .collect();
                match &node.binding {
                    Binding::Sensor { .. } | Binding::Reference => {}
                    Binding::Part(part) => {
                        let x: Vec<f64> = ins.iter().map(|j| levels[*j]).collect();
                        let b: Vec<bool> = ins.iter().map(|j| logic[*j]).collect();
                        levels[i] = part.response.steady_state(part.function.combine(&x));
                        logic[i] = part.function.eval(&b);
                    }
                    Binding::Output => {
                        if let Some(&j) = ins.first() {
                            levels[i] = levels[j];
                            logic[i] = logic[j];
                        }
                    }
                }
            }

            rows.push(TruthRow {
                inputs: values,
                levels: output_slots.iter().map(|s| levels[*s]).collect(),
                expected: output_slots.iter().map(|s| logic[*s]).collect(),
            });
        }

        Some(TruthTable {
            inputs: input_slots
                .iter()
                .map(|s| self.nodes[*s].signal.clone())
                .collect(),
            outputs: self.outputs.iter().map(|o| o.name.clone()).collect(),
            rows,
        })
    }
}

// ============================================================================
// Truth tables
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruthRow {
    pub inputs: Vec<bool>,
    /// Steady-state level of each output
    pub levels: Vec<f64>,
    /// Boolean value of each output
    pub expected: Vec<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruthTable {
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub rows: Vec<TruthRow>,
}

impl TruthTable {
    /// Weakest logical-1 level over strongest logical-0 level of one
    /// output. `None` when the output is constant.
    pub fn on_off_score(&self, output: usize) -> Option<f64> {
        let mut on = f64::INFINITY;
        let mut off = f64::NEG_INFINITY;
        for row in &self.rows {
            let level = *row.levels.get(output)?;
            if row.expected[output] {
                on = on.min(level);
            } else {
                off = off.max(level);
            }
        }
        (on.is_finite() && off.is_finite()).then(|| on / off)
    }

    /// True when every non-constant output reads high above all of its low
    /// levels
    pub fn separates(&self) -> bool {
        (0..self.outputs.len()).all(|i| self.on_off_score(i).map_or(true, |s| s > 1.0))
    }
}
