//! Circuit IR tests over a multi-level circuit

use genmap_logic::{from_json_str, CircuitError, LogicCircuitBuilder, LogicOp, NodeId};

/// Equality of two 2-bit words built from NOR/NOT/XNOR/AND
const EQ2: &str = r#"{
    "name": "eq2",
    "inputs": [{ "name": "a0" }, { "name": "a1" }, { "name": "b0" }, { "name": "b1" }],
    "gates": [
        { "op": "xnor", "output": "e0", "inputs": ["a0", "b0"] },
        { "op": "xnor", "output": "e1", "inputs": ["a1", "b1"] },
        { "op": "and", "output": "eq", "inputs": ["e0", "e1"] },
        { "op": "not", "output": "ne", "inputs": ["eq"] }
    ],
    "outputs": [{ "name": "equal", "from": "eq" }, { "name": "differ", "from": "ne" }]
}"#;

#[test]
fn test_truth_table_of_multi_level_circuit() {
    let circuit = from_json_str(EQ2).unwrap();
    for bits in 0u32..16 {
        let inputs: Vec<bool> = (0..4).map(|i| bits & (1 << i) != 0).collect();
        let a = (inputs[0], inputs[1]);
        let b = (inputs[2], inputs[3]);
        let outputs = circuit.evaluate(&inputs).unwrap();
        assert_eq!(outputs, vec![a == b, a != b], "inputs {bits:04b}");
    }
}

#[test]
fn test_order_respects_every_edge() {
    let circuit = from_json_str(EQ2).unwrap();
    let order = circuit.topological_order().unwrap();
    let mut seen = vec![false; circuit.nodes().len()];
    for _ in 0..2 {
        seen.iter_mut().for_each(|s| *s = false);
        for id in &order {
            for producer in circuit.producers(id) {
                assert!(seen[producer.index()]);
            }
            seen[id.index()] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }
}

#[test]
fn test_first_error_is_reported() {
    let mut b = LogicCircuitBuilder::new("bad");
    b.add_input("a")
        .add_gate(LogicOp::And, "x", &["a", "missing"])
        .add_gate(LogicOp::Not, "x", &["a"]);
    // Duplicates are found while declaring signals, before inputs resolve
    assert_eq!(b.build().unwrap_err(), CircuitError::DuplicateSignal("x".into()));
}

#[test]
fn test_json_round_trip_through_description() {
    let circuit = from_json_str(EQ2).unwrap();
    let json = serde_json::to_string(&circuit.describe()).unwrap();
    let rebuilt = from_json_str(&json).unwrap();
    assert_eq!(rebuilt, circuit);
    assert_eq!(rebuilt.node(NodeId(0)).op, LogicOp::Input);
}
