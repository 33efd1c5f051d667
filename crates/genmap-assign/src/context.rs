//! Per-call mapping state shared by both search modes
//!
//! A [`MappingContext`] resolves circuit inputs, fixes the gate order and
//! holds the read-only references every search step needs. Search progress
//! lives in [`PartialAssignment`] values, which are cloned on commit, so
//! undoing a commitment is dropping a value.

use crate::cancel::SearchLimits;
use crate::config::{AssignMode, AssignerConfig, CrosstalkScope};
use crate::failure::{AssignmentFailure, FailedNode, FailureReason};
use crate::genetic::{Binding, BoundPart, GeneticCircuit, NodeAssignment, OutputReport, Wire};
use crate::target::TargetPolicy;
use genmap_catalog::{
    input_window, CatalogError, GateCatalog, GateFunction, InputWindow, Molecule, PartId,
    SignalRange,
};
use genmap_logic::{LogicCircuit, LogicOp, NodeId, TopologicalOrder};
use indexmap::IndexMap;
use std::fmt;
use tracing::debug;

/// Catalog function implementing a logic operator
pub fn gate_function(op: LogicOp) -> Option<GateFunction> {
    match op {
        LogicOp::Not => Some(GateFunction::Not),
        LogicOp::And => Some(GateFunction::And),
        LogicOp::Or => Some(GateFunction::Or),
        LogicOp::Nand => Some(GateFunction::Nand),
        LogicOp::Nor => Some(GateFunction::Nor),
        LogicOp::Xor => Some(GateFunction::Xor),
        LogicOp::Xnor => Some(GateFunction::Xnor),
        LogicOp::Input | LogicOp::Output => None,
    }
}

// ============================================================================
// Search state
// ============================================================================

/// What drives a circuit input
#[derive(Debug, Clone)]
pub(crate) struct InputSource {
    pub node: NodeId,
    /// Catalog sensor name, None for the reference source
    pub sensor: Option<String>,
    pub molecule: Molecule,
    pub range: SignalRange,
    pub group: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Origin {
    Input(usize),
    Part(PartId),
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct NodeState {
    pub origin: Origin,
    pub range: SignalRange,
    pub mismatch: f64,
}

/// A feasible binding for one gate
#[derive(Debug, Clone, Copy)]
pub(crate) struct Candidate {
    pub part: PartId,
    pub mismatch: f64,
    pub range: SignalRange,
}

/// Bindings committed so far, indexed by node
#[derive(Debug, Clone)]
pub(crate) struct PartialAssignment {
    states: Vec<Option<NodeState>>,
    bottleneck: f64,
}

impl PartialAssignment {
    pub fn bottleneck(&self) -> f64 {
        self.bottleneck
    }

    pub fn state(&self, node: NodeId) -> Option<&NodeState> {
        self.states.get(node.index()).and_then(Option::as_ref)
    }

    /// Copy of this assignment with `candidate` committed at `node`
    pub fn extend(&self, node: NodeId, candidate: &Candidate) -> Self {
        let mut next = self.clone();
        next.states[node.index()] = Some(NodeState {
            origin: Origin::Part(candidate.part),
            range: candidate.range,
            mismatch: candidate.mismatch,
        });
        next.bottleneck = next.bottleneck.max(candidate.mismatch);
        next
    }

    /// Parts bound so far
    pub fn parts(&self) -> impl Iterator<Item = PartId> + '_ {
        self.states.iter().flatten().filter_map(|s| match s.origin {
            Origin::Part(id) => Some(id),
            Origin::Input(_) => None,
        })
    }
}

/// One gate node to bind, in search order
#[derive(Debug, Clone)]
pub(crate) struct GateSite {
    pub node: NodeId,
    pub function: GateFunction,
    pub producers: Vec<NodeId>,
}

/// Why a candidate was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rejection {
    Molecule,
    Range,
    OnOffRatio,
    Crosstalk,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Rejection::Molecule => "input molecules do not match",
            Rejection::Range => "threshold outside input window",
            Rejection::OnOffRatio => "on/off ratio too small",
            Rejection::Crosstalk => "shares an orthogonality group",
        };
        f.write_str(text)
    }
}

// ============================================================================
// Context
// ============================================================================

pub(crate) struct MappingContext<'a> {
    pub circuit: &'a LogicCircuit,
    pub catalog: &'a GateCatalog,
    pub config: &'a AssignerConfig,
    pub policy: &'a dyn TargetPolicy,
    pub limits: SearchLimits,
    pub mode: AssignMode,
    pub allow_reuse: bool,
    pub order: TopologicalOrder,
    pub gates: Vec<GateSite>,
    inputs: Vec<InputSource>,
}

impl<'a> MappingContext<'a> {
    /// Order the circuit, resolve its inputs and check partition capacity
    pub fn prepare(
        circuit: &'a LogicCircuit,
        catalog: &'a GateCatalog,
        config: &'a AssignerConfig,
        policy: &'a dyn TargetPolicy,
        limits: SearchLimits,
    ) -> Result<Self, AssignmentFailure> {
        let mode = config.mode;
        let order = circuit.topological_order().map_err(|e| AssignmentFailure {
            node: None,
            mode,
            reason: FailureReason::MalformedCircuit {
                detail: e.to_string(),
            },
        })?;

        let mut ctx = Self {
            circuit,
            catalog,
            config,
            policy,
            limits,
            mode,
            allow_reuse: config.allow_reuse.unwrap_or(catalog.allow_reuse()),
            order,
            gates: Vec::new(),
            inputs: Vec::new(),
        };

        for id in &ctx.order {
            let node = circuit.node(id);
            match node.op {
                LogicOp::Input => {
                    let source = ctx.resolve_input(id)?;
                    ctx.inputs.push(source);
                }
                LogicOp::Output => {}
                op => {
                    if let Some(function) = gate_function(op) {
                        ctx.gates.push(GateSite {
                            node: id,
                            function,
                            producers: circuit.producers(id).collect(),
                        });
                    }
                }
            }
        }

        ctx.check_capacity()?;
        Ok(ctx)
    }

    fn resolve_input(&self, id: NodeId) -> Result<InputSource, AssignmentFailure> {
        let node = self.circuit.node(id);
        let name = self.circuit.node_name(id);

        let sensor = match &node.source {
            Some(hint) => Some(self.catalog.sensor(hint).ok_or_else(|| {
                self.fail(
                    id,
                    FailureReason::MalformedCircuit {
                        detail: format!("input '{}' names unknown sensor '{}'", name, hint),
                    },
                )
            })?),
            None => self.catalog.sensor(name),
        };

        Ok(match sensor {
            Some(sensor) => InputSource {
                node: id,
                sensor: Some(sensor.name.clone()),
                molecule: sensor.output.clone(),
                range: sensor.range(),
                group: sensor.group.clone(),
            },
            None => InputSource {
                node: id,
                sensor: None,
                molecule: self
                    .config
                    .reference_molecule
                    .clone()
                    .unwrap_or_else(|| Molecule::new(name)),
                range: self.config.reference,
                group: None,
            },
        })
    }

    /// Fail early when a partition is empty, or too small for the gates that
    /// need it while parts may not be reused
    fn check_capacity(&self) -> Result<(), AssignmentFailure> {
        let mut demand: IndexMap<GateFunction, usize> = IndexMap::new();
        for site in &self.gates {
            let available = self.catalog.partition_len(site.function);
            if available == 0 {
                return Err(self.fail(
                    site.node,
                    FailureReason::EmptyCatalogPartition {
                        function: site.function,
                    },
                ));
            }
            let needed = demand.entry(site.function).or_insert(0);
            *needed += 1;
            if !self.allow_reuse && *needed > available {
                debug!(
                    "{} needs more than {} {} parts",
                    self.circuit.name(),
                    available,
                    site.function
                );
                return Err(self.fail(site.node, FailureReason::NoFeasibleCandidate));
            }
        }
        Ok(())
    }

    pub fn fail(&self, node: NodeId, reason: FailureReason) -> AssignmentFailure {
        AssignmentFailure {
            node: Some(FailedNode {
                id: node,
                signal: self.circuit.node_name(node).to_string(),
            }),
            mode: self.mode,
            reason,
        }
    }

    pub fn catalog_failure(&self, node: NodeId, error: CatalogError) -> AssignmentFailure {
        let reason = match error {
            CatalogError::EmptyPartition(function) => {
                FailureReason::EmptyCatalogPartition { function }
            }
            other => FailureReason::MalformedCircuit {
                detail: other.to_string(),
            },
        };
        self.fail(node, reason)
    }

    /// Assignment with every circuit input bound
    pub fn base(&self) -> PartialAssignment {
        let mut states = vec![None; self.circuit.nodes().len()];
        for (i, input) in self.inputs.iter().enumerate() {
            states[input.node.index()] = Some(NodeState {
                origin: Origin::Input(i),
                range: input.range,
                mismatch: 0.0,
            });
        }
        PartialAssignment {
            states,
            bottleneck: 0.0,
        }
    }

    fn molecule(&self, origin: Origin) -> &Molecule {
        match origin {
            Origin::Input(i) => &self.inputs[i].molecule,
            Origin::Part(id) => &self.catalog[id].output,
        }
    }

    fn conflicts(&self, origin: Origin, part: PartId, group: &str) -> bool {
        match origin {
            Origin::Input(i) => self.inputs[i].group.as_deref() == Some(group),
            // The same part on both ends of a wire is reuse, not crosstalk
            Origin::Part(id) => id != part && self.catalog[id].group == group,
        }
    }

    /// Input window a gate sees from its bound producers
    pub fn window(&self, partial: &PartialAssignment, site: &GateSite) -> InputWindow {
        let ranges: Vec<SignalRange> = site
            .producers
            .iter()
            .filter_map(|p| partial.state(*p).map(|s| s.range))
            .collect();
        input_window(site.function, &ranges)
    }

    /// Apply every feasibility rule to one ranked neighbour
    pub fn check(
        &self,
        partial: &PartialAssignment,
        site: &GateSite,
        window: InputWindow,
        id: PartId,
        distance: f64,
    ) -> Result<Candidate, Rejection> {
        let part = &self.catalog[id];

        let producers: Vec<&NodeState> =
            site.producers.iter().filter_map(|p| partial.state(*p)).collect();
        let molecules: Vec<&Molecule> = producers.iter().map(|s| self.molecule(s.origin)).collect();
        if !part.accepts(&molecules) {
            return Err(Rejection::Molecule);
        }

        let range = part
            .response
            .compose(window, self.config.noise_margin)
            .ok_or(Rejection::Range)?;
        if range.on_off_ratio() <= self.config.min_on_off_ratio {
            return Err(Rejection::OnOffRatio);
        }

        let crosstalk = match self.config.crosstalk {
            CrosstalkScope::Adjacent => producers
                .iter()
                .any(|s| self.conflicts(s.origin, id, &part.group)),
            CrosstalkScope::Circuit => partial
                .states
                .iter()
                .flatten()
                .any(|s| self.conflicts(s.origin, id, &part.group)),
        };
        if crosstalk {
            return Err(Rejection::Crosstalk);
        }

        Ok(Candidate {
            part: id,
            mismatch: distance,
            range,
        })
    }

    /// Freeze a complete assignment
    pub fn finalize(&self, partial: &PartialAssignment) -> GeneticCircuit {
        let circuit = self.circuit;
        let mut nodes = Vec::with_capacity(circuit.nodes().len());
        let mut wires = Vec::new();
        let mut outputs = Vec::new();
        // Output nodes take their producer's molecule and range
        let mut carried: Vec<Option<(Molecule, SignalRange)>> = vec![None; circuit.nodes().len()];

        for id in &self.order {
            let node = circuit.node(id);
            let producers: Vec<NodeId> = circuit.producers(id).collect();

            for producer in &producers {
                if let Some((molecule, _)) = &carried[producer.index()] {
                    wires.push(Wire {
                        signal: circuit.node_name(*producer).to_string(),
                        producer: *producer,
                        consumer: id,
                        molecule: molecule.clone(),
                    });
                }
            }

            let (binding, molecule, range, mismatch) = match (node.op, partial.state(id)) {
                (LogicOp::Output, _) => {
                    let Some((molecule, range)) =
                        producers.first().and_then(|p| carried[p.index()].clone())
                    else {
                        continue;
                    };
                    outputs.push(OutputReport {
                        name: circuit.node_name(id).to_string(),
                        node: id,
                        low: range.low,
                        high: range.high,
                        on_off_ratio: range.on_off_ratio(),
                    });
                    (Binding::Output, molecule, range, 0.0)
                }
                (_, Some(state)) => {
                    let binding = match state.origin {
                        Origin::Input(i) => match &self.inputs[i].sensor {
                            Some(name) => Binding::Sensor { name: name.clone() },
                            None => Binding::Reference,
                        },
                        Origin::Part(pid) => {
                            let part = &self.catalog[pid];
                            Binding::Part(BoundPart {
                                id: pid,
                                name: part.name.clone(),
                                function: part.function,
                                group: part.group.clone(),
                                inputs: part.inputs.clone(),
                                response: part.response,
                            })
                        }
                    };
                    (
                        binding,
                        self.molecule(state.origin).clone(),
                        state.range,
                        state.mismatch,
                    )
                }
                (_, None) => continue,
            };

            carried[id.index()] = Some((molecule.clone(), range));
            nodes.push(NodeAssignment {
                node: id,
                signal: circuit.node_name(id).to_string(),
                op: node.op,
                binding,
                mismatch,
                molecule,
                range,
                producers,
            });
        }

        GeneticCircuit::new(
            circuit.name().to_string(),
            self.catalog.name().to_string(),
            self.mode,
            circuit.inputs().to_vec(),
            nodes,
            wires,
            outputs,
        )
    }
}
