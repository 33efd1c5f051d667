//! Circuit construction and validation

use crate::circuit::{LogicCircuit, LogicNode, NodeId, Signal, SignalId};
use crate::error::{CircuitError, Result};
use crate::op::LogicOp;
use indexmap::IndexMap;

#[derive(Debug, Clone)]
struct PendingNode {
    op: LogicOp,
    output: String,
    inputs: Vec<String>,
    source: Option<String>,
    /// Added through `add_gate`
    gate: bool,
}

/// Collects nodes by signal name. Signals may be referenced before the node
/// producing them is added; everything is resolved in [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct LogicCircuitBuilder {
    name: String,
    pending: Vec<PendingNode>,
}

impl LogicCircuitBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pending: Vec::new(),
        }
    }

    /// Declare a circuit input
    pub fn add_input(&mut self, name: impl Into<String>) -> &mut Self {
        self.push(LogicOp::Input, name.into(), Vec::new(), None)
    }

    /// Declare a circuit input driven by a named sensor
    pub fn add_input_from(&mut self, name: impl Into<String>, sensor: impl Into<String>) -> &mut Self {
        self.push(LogicOp::Input, name.into(), Vec::new(), Some(sensor.into()))
    }

    /// Add a node driving `output` from `inputs`
    pub fn add_gate(&mut self, op: LogicOp, output: impl Into<String>, inputs: &[&str]) -> &mut Self {
        let inputs = inputs.iter().map(|s| s.to_string()).collect();
        self.pending.push(PendingNode {
            op,
            output: output.into(),
            inputs,
            source: None,
            gate: true,
        });
        self
    }

    /// Expose signal `from` as circuit output `name`
    pub fn add_output(&mut self, name: impl Into<String>, from: impl Into<String>) -> &mut Self {
        self.push(LogicOp::Output, name.into(), vec![from.into()], None)
    }

    fn push(
        &mut self,
        op: LogicOp,
        output: String,
        inputs: Vec<String>,
        source: Option<String>,
    ) -> &mut Self {
        self.pending.push(PendingNode {
            op,
            output,
            inputs,
            source,
            gate: false,
        });
        self
    }

    /// Resolve signal names and validate the circuit
    pub fn build(&self) -> Result<LogicCircuit> {
        let mut signal_ids: IndexMap<&str, SignalId> = IndexMap::new();
        let mut signals = Vec::with_capacity(self.pending.len());

        for (i, pending) in self.pending.iter().enumerate() {
            if pending.gate && !pending.op.is_gate() {
                return Err(CircuitError::NotAGate {
                    signal: pending.output.clone(),
                    op: pending.op,
                });
            }
            let expected = pending.op.arity();
            if pending.inputs.len() != expected {
                return Err(CircuitError::ArityMismatch {
                    signal: pending.output.clone(),
                    op: pending.op,
                    expected,
                    found: pending.inputs.len(),
                });
            }
            let id = SignalId(i as u32);
            if signal_ids.insert(pending.output.as_str(), id).is_some() {
                return Err(CircuitError::DuplicateSignal(pending.output.clone()));
            }
            signals.push(Signal {
                name: pending.output.clone(),
                producer: NodeId(i as u32),
                consumers: Vec::new(),
            });
        }

        let mut nodes = Vec::with_capacity(self.pending.len());
        for (i, pending) in self.pending.iter().enumerate() {
            let id = NodeId(i as u32);
            let mut inputs = Vec::with_capacity(pending.inputs.len());
            for name in &pending.inputs {
                let signal = *signal_ids.get(name.as_str()).ok_or_else(|| {
                    CircuitError::UndeclaredSignal {
                        signal: name.clone(),
                        consumer: pending.output.clone(),
                    }
                })?;
                let producer = &self.pending[signal.index()];
                if producer.op == LogicOp::Output {
                    return Err(CircuitError::OutputConsumed(producer.output.clone()));
                }
                signals[signal.index()].consumers.push(id);
                inputs.push(signal);
            }
            nodes.push(LogicNode {
                id,
                op: pending.op,
                inputs,
                output: SignalId(i as u32),
                source: pending.source.clone(),
            });
        }

        if !nodes.iter().any(|n| n.op == LogicOp::Output) {
            return Err(CircuitError::NoOutputs);
        }

        let circuit = LogicCircuit::from_parts(self.name.clone(), nodes, signals);
        circuit.topological_order()?;
        Ok(circuit)
    }
}
