//! Serialized circuit descriptions
//!
//! The JSON form handed over by a front-end:
//!
//! ```json
//! {
//!   "name": "not_chain",
//!   "inputs": [{ "name": "a", "sensor": "pTac" }],
//!   "gates": [{ "op": "not", "output": "b", "inputs": ["a"] }],
//!   "outputs": [{ "name": "y", "from": "b" }]
//! }
//! ```

use crate::builder::LogicCircuitBuilder;
use crate::circuit::LogicCircuit;
use crate::error::LoadError;
use crate::op::LogicOp;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputDecl {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateDecl {
    pub op: LogicOp,
    pub output: String,
    pub inputs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputDecl {
    pub name: String,
    pub from: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitDescription {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<InputDecl>,
    #[serde(default)]
    pub gates: Vec<GateDecl>,
    #[serde(default)]
    pub outputs: Vec<OutputDecl>,
}

impl CircuitDescription {
    /// Describe an existing circuit
    pub fn from_circuit(circuit: &LogicCircuit) -> Self {
        let mut inputs = Vec::new();
        let mut gates = Vec::new();
        let mut outputs = Vec::new();

        for node in circuit.nodes() {
            let name = circuit.node_name(node.id).to_string();
            let mut operands = node.inputs.iter().map(|s| circuit.signal(*s).name.clone());
            match node.op {
                LogicOp::Input => inputs.push(InputDecl {
                    name,
                    sensor: node.source.clone(),
                }),
                LogicOp::Output => outputs.push(OutputDecl {
                    name,
                    from: operands.next().unwrap_or_default(),
                }),
                op => gates.push(GateDecl {
                    op,
                    output: name,
                    inputs: operands.collect(),
                }),
            }
        }

        Self {
            name: circuit.name().to_string(),
            inputs,
            gates,
            outputs,
        }
    }

    /// Validate and build the circuit
    pub fn build(&self) -> Result<LogicCircuit, LoadError> {
        let mut builder = LogicCircuitBuilder::new(self.name.clone());
        for input in &self.inputs {
            match &input.sensor {
                Some(sensor) => builder.add_input_from(input.name.clone(), sensor.clone()),
                None => builder.add_input(input.name.clone()),
            };
        }
        for gate in &self.gates {
            let inputs: Vec<&str> = gate.inputs.iter().map(String::as_str).collect();
            builder.add_gate(gate.op, gate.output.clone(), &inputs);
        }
        for output in &self.outputs {
            builder.add_output(output.name.clone(), output.from.clone());
        }
        Ok(builder.build()?)
    }
}

impl LogicCircuit {
    pub fn describe(&self) -> CircuitDescription {
        CircuitDescription::from_circuit(self)
    }
}

/// Parse and build a circuit from JSON
pub fn from_json_str(s: &str) -> Result<LogicCircuit, LoadError> {
    let description: CircuitDescription =
        serde_json::from_str(s).map_err(|e| LoadError::Parse(e.to_string()))?;
    description.build()
}

/// Load a circuit description file
pub fn from_path(path: impl AsRef<Path>) -> Result<LogicCircuit, LoadError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .map_err(|e| LoadError::Io(format!("{}: {}", path.display(), e)))?;
    from_json_str(&contents)
}
