//! Every gate function on the extended catalog, cross-molecule parts and
//! repeatable failures

mod common;

use common::*;
use genmap_assign::{
    assign, AssignMode, Assigner, AssignerConfig, AssignmentFailure, FailureReason,
    GeneticCircuit, SearchBound,
};
use genmap_catalog::{builtin_catalog, GateCatalog, GateFunction, Molecule, Sensor};
use genmap_logic::{LogicCircuit, LogicCircuitBuilder, LogicOp};

const MODES: [AssignMode; 2] = [AssignMode::Normal, AssignMode::Strict];

/// pTac and pTet into one gate
fn two_input(op: LogicOp) -> LogicCircuit {
    let mut b = LogicCircuitBuilder::new(op.as_str().to_lowercase());
    b.add_input_from("a", "pTac")
        .add_input_from("b", "pTet")
        .add_gate(op, "g", &["a", "b"])
        .add_output("y", "g");
    b.build().unwrap()
}

fn check_truth_table(circuit: &LogicCircuit, genetic: &GeneticCircuit, function: GateFunction) {
    let table = genetic.truth_table().unwrap();
    assert_eq!(table.inputs, vec!["a", "b"]);
    assert_eq!(table.outputs, vec!["y"]);
    assert_eq!(table.rows.len(), 4);
    for row in &table.rows {
        assert_eq!(row.expected, vec![function.eval(&row.inputs)]);
        assert_eq!(circuit.evaluate(&row.inputs).unwrap(), row.expected);
    }
    assert!(table.separates(), "{} does not separate", function);
}

#[test]
fn test_two_input_functions_on_extended_catalog() {
    let catalog = builtin_catalog("extended").unwrap();
    let cases = [
        (LogicOp::And, GateFunction::And, "T2_InvF"),
        (LogicOp::Or, GateFunction::Or, "T3_ExsC"),
        (LogicOp::Nand, GateFunction::Nand, "T4_LmrA"),
        (LogicOp::Nor, GateFunction::Nor, "N2_SrpR"),
        (LogicOp::Xor, GateFunction::Xor, "T5_CinR"),
        (LogicOp::Xnor, GateFunction::Xnor, "T6_NahR"),
    ];

    for (op, function, expected) in cases {
        let circuit = two_input(op);
        for mode in MODES {
            let genetic = assign(&circuit, &catalog, mode).unwrap();
            let node = genetic.by_signal("g").unwrap();
            let part = node.binding.part().unwrap();
            assert_eq!(part.function, function);
            assert_eq!(part.name, expected, "{} in {} mode", function, mode);
            assert_eq!(node.molecule, Molecule::new("RPU"));
            check_truth_table(&circuit, &genetic, function);
        }
    }
}

#[test]
fn test_and_ranks_both_members() {
    // T2_InvF edges out T1_SicA, and each stays feasible once the other is
    // taken
    let catalog = builtin_catalog("extended").unwrap();
    let mut b = LogicCircuitBuilder::new("and_pair");
    b.add_input_from("a", "pTac")
        .add_input_from("b", "pTet")
        .add_gate(LogicOp::And, "g1", &["a", "b"])
        .add_gate(LogicOp::And, "g2", &["a", "b"])
        .add_output("y1", "g1")
        .add_output("y2", "g2");
    let circuit = b.build().unwrap();

    for mode in MODES {
        let genetic = assign(&circuit, &catalog, mode).unwrap();
        let mut names = vec![part_at(&genetic, "g1"), part_at(&genetic, "g2")];
        names.sort_unstable();
        assert_eq!(names, vec!["T1_SicA", "T2_InvF"]);
    }
}

#[test]
fn test_quorum_sensor_needs_ahl_reading_parts() {
    let catalog = builtin_catalog("extended").unwrap();
    let ahl = Molecule::new("AHL");
    let rpu = Molecule::new("RPU");

    let mut b = LogicCircuitBuilder::new("lux_not");
    b.add_input_from("s", "pLux")
        .add_gate(LogicOp::Not, "g", &["s"])
        .add_output("y", "g");
    let inverter = b.build().unwrap();

    let mut b = LogicCircuitBuilder::new("lux_nor");
    b.add_input_from("s", "pLux")
        .add_input_from("a", "pTac")
        .add_gate(LogicOp::Nor, "g", &["s", "a"])
        .add_output("y", "g");
    let mixed = b.build().unwrap();

    for mode in MODES {
        let genetic = assign(&inverter, &catalog, mode).unwrap();
        assert_eq!(part_at(&genetic, "g"), "Q1_LasR");
        assert_eq!(genetic.by_signal("s").unwrap().molecule, ahl);
        assert_eq!(genetic.by_signal("g").unwrap().molecule, rpu);
        let wire = &genetic.wires()[0];
        assert_eq!((wire.signal.as_str(), &wire.molecule), ("s", &ahl));

        let genetic = assign(&mixed, &catalog, mode).unwrap();
        assert_eq!(part_at(&genetic, "g"), "Q3_RpaR");
        assert_eq!(genetic.by_signal("g").unwrap().molecule, rpu);
        let mut wired: Vec<&str> = genetic.wires().iter().map(|w| w.molecule.as_str()).collect();
        wired.sort_unstable();
        assert_eq!(wired, vec!["AHL", "RPU", "RPU"]);
        assert!(genetic.truth_table().unwrap().separates());
    }
}

#[test]
fn test_quorum_sensor_is_unreadable_by_repressors() {
    let catalog = builtin_catalog("repressors").unwrap();
    let mut b = LogicCircuitBuilder::new("lux_not");
    b.add_input("pLux")
        .add_gate(LogicOp::Not, "g", &["pLux"])
        .add_output("y", "g");
    let circuit = b.build().unwrap();

    // Unbound inputs carry their own name as molecule
    let failure = assign(&circuit, &catalog, AssignMode::Strict).unwrap_err();
    assert_eq!(failure.reason, FailureReason::NoFeasibleCandidate);
    assert_eq!(failure.node.unwrap().signal, "g");
}

fn grouped_sensor_catalog(group: Option<&str>) -> GateCatalog {
    let sensor = Sensor::new("x", "M", 0.01, 10.0);
    let sensor = match group {
        Some(group) => sensor.with_group(group),
        None => sensor,
    };
    GateCatalog::builder("grouped")
        .sensor(sensor)
        .part(not_part("P1_PhlF", "M", "M", 10.0))
        .part(not_part("S1_SrpR", "M", "M", 3.0))
        .build()
        .unwrap()
}

#[test]
fn test_sensor_group_rules_out_closest_part() {
    let mut b = LogicCircuitBuilder::new("inv");
    b.add_input("x").add_gate(LogicOp::Not, "g", &["x"]).add_output("y", "g");
    let circuit = b.build().unwrap();

    for mode in MODES {
        let config = AssignerConfig::for_mode(mode).with_ideal(ideal());
        let open = grouped_sensor_catalog(None);
        let genetic = Assigner::new(&open, config.clone()).unwrap().assign(&circuit).unwrap();
        assert_eq!(part_at(&genetic, "g"), "P1_PhlF");
        assert!(genetic.bottleneck() < 1e-3);

        let grouped = grouped_sensor_catalog(Some("PhlF"));
        let genetic = Assigner::new(&grouped, config).unwrap().assign(&circuit).unwrap();
        assert_eq!(part_at(&genetic, "g"), "S1_SrpR");
        assert!(genetic.bottleneck() > 0.5);
    }
}

fn assert_repeats(runs: impl Fn() -> Result<GeneticCircuit, AssignmentFailure>) -> AssignmentFailure {
    let first = runs().unwrap_err();
    for _ in 0..5 {
        assert_eq!(runs().unwrap_err(), first);
    }
    first
}

#[test]
fn test_failures_are_repeatable() {
    let repressors = builtin_catalog("repressors").unwrap();
    let mut config = AssignerConfig::strict_with_budget(1);
    for parallel in [false, true] {
        config = config.with_parallel_branches(parallel);
        let assigner = Assigner::new(&repressors, config.clone()).unwrap();
        let failure = assert_repeats(|| assigner.assign(&nor_not()));
        assert_eq!(
            failure.reason,
            FailureReason::SearchExhausted {
                bound: SearchBound::NodeBudget
            }
        );
    }

    // M3 has no reader in the trap catalog
    let mut b = LogicCircuitBuilder::new("long_chain");
    b.add_input("x")
        .add_gate(LogicOp::Not, "g1", &["x"])
        .add_gate(LogicOp::Not, "g2", &["g1"])
        .add_gate(LogicOp::Not, "g3", &["g2"])
        .add_output("y", "g3");
    let chain = b.build().unwrap();
    let trap = trap_catalog();
    for mode in MODES {
        let assigner =
            Assigner::new(&trap, AssignerConfig::for_mode(mode).with_ideal(ideal()))
                .unwrap();
        let failure = assert_repeats(|| assigner.assign(&chain));
        assert_eq!(failure.reason, FailureReason::NoFeasibleCandidate);
        assert_eq!(failure.node.unwrap().signal, "g3");
    }

    for mode in MODES {
        let failure = assert_repeats(|| assign(&two_input(LogicOp::Xor), &repressors, mode));
        assert_eq!(
            failure.reason,
            FailureReason::EmptyCatalogPartition {
                function: GateFunction::Xor
            }
        );
    }
}
