#![allow(dead_code)]

use genmap_assign::IdealGate;
use genmap_catalog::{GateCatalog, GateFunction, GenePart, HillParams, Sensor};
use genmap_logic::{LogicCircuit, LogicCircuitBuilder, LogicOp};

/// Ideal gate whose threshold and steepness the fixture parts match
pub fn ideal() -> IdealGate {
    IdealGate {
        low: 0.01,
        high: 10.0,
        steepness: 2.0,
    }
}

pub fn not_part(name: &str, input: &str, output: &str, ymax: f64) -> GenePart {
    GenePart::new(
        name,
        GateFunction::Not,
        HillParams::new(0.01, ymax, 0.316, 2.0),
        vec![input.into()],
        output,
    )
}

/// Two NOT positions where the locally best first part forces a poor second
/// part. A and B read the sensor; C reads A's molecule, D reads B's.
pub fn trap_catalog() -> GateCatalog {
    trap_builder().build().unwrap()
}

pub fn trap_builder() -> genmap_catalog::GateCatalogBuilder {
    GateCatalog::builder("trap")
        .sensor(Sensor::new("x", "M0", 0.01, 10.0))
        .part(not_part("A", "M0", "M1", 10.0))
        .part(not_part("B", "M0", "M2", 1.0))
        .part(not_part("C", "M1", "M3", 0.1))
        .part(not_part("D", "M2", "M3", 10.0))
}

/// x -> g1 -> g2 -> y
pub fn not_chain() -> LogicCircuit {
    let mut b = LogicCircuitBuilder::new("not_chain");
    b.add_input("x")
        .add_gate(LogicOp::Not, "g1", &["x"])
        .add_gate(LogicOp::Not, "g2", &["g1"])
        .add_output("y", "g2");
    b.build().unwrap()
}

/// NOR of two sensors followed by an inverter
pub fn nor_not() -> LogicCircuit {
    let mut b = LogicCircuitBuilder::new("nor_not");
    b.add_input_from("a", "pTac")
        .add_input_from("b", "pTet")
        .add_gate(LogicOp::Nor, "n", &["a", "b"])
        .add_gate(LogicOp::Not, "m", &["n"])
        .add_output("y", "m");
    b.build().unwrap()
}

/// A small multi-level circuit over the repressor family
pub fn repressor_mix() -> LogicCircuit {
    let mut b = LogicCircuitBuilder::new("mix");
    b.add_input_from("a", "pTac")
        .add_input_from("b", "pTet")
        .add_input_from("c", "pBAD")
        .add_gate(LogicOp::Nor, "n1", &["a", "b"])
        .add_gate(LogicOp::Not, "i1", &["c"])
        .add_gate(LogicOp::Nor, "n2", &["n1", "i1"])
        .add_gate(LogicOp::Not, "i2", &["n2"])
        .add_output("y", "i2")
        .add_output("z", "n1");
    b.build().unwrap()
}

pub fn part_at<'g>(genetic: &'g genmap_assign::GeneticCircuit, signal: &str) -> &'g str {
    genetic
        .by_signal(signal)
        .and_then(|n| n.binding.part())
        .map(|p| p.name.as_str())
        .unwrap()
}
