//! Built-in Catalogs
//!
//! Pre-defined catalogs for trying the mapper without a part library:
//! - `repressors` - NOT/NOR repressor gates on a shared RPU channel with
//!   three inducible sensors (default)
//! - `extended` - `repressors` plus AND/OR/NAND/XOR/XNOR gates and a second,
//!   quorum-signal molecule family
//!
//! Response parameters follow published characterizations of the repressor
//! families, in relative promoter units.

use crate::catalog::{GateCatalog, GateCatalogBuilder};
use crate::error::{CatalogError, Result};
use crate::function::GateFunction;
use crate::part::{GenePart, Molecule, Sensor};
use crate::response::HillParams;

/// Molecule carried by promoter-activity outputs
pub const RPU: &str = "RPU";

/// Molecule of the quorum family in the `extended` catalog
pub const AHL: &str = "AHL";

/// Get a built-in catalog by name
pub fn builtin_catalog(name: &str) -> Result<GateCatalog> {
    match name {
        "repressors" | "default" => builtin_repressors(),
        "extended" => builtin_extended(),
        _ => Err(CatalogError::UnknownBuiltin(name.to_string())),
    }
}

/// List all available built-in catalog names
pub fn list_builtin_catalogs() -> Vec<&'static str> {
    vec!["repressors", "extended"]
}

/// (family, ymin, ymax, K, n)
const REPRESSORS: [(&str, f64, f64, f64, f64); 8] = [
    ("PhlF", 0.02, 6.8, 0.13, 3.9),
    ("SrpR", 0.007, 5.9, 0.19, 2.9),
    ("BM3R1", 0.01, 3.8, 0.24, 2.9),
    ("HlyIIR", 0.07, 2.5, 0.19, 2.6),
    ("AmtR", 0.06, 3.8, 0.07, 1.6),
    ("BetI", 0.07, 3.8, 0.41, 2.4),
    ("QacR", 0.01, 5.0, 0.39, 1.6),
    ("IcaRA", 0.08, 2.2, 0.10, 1.4),
];

fn rpu_part(name: String, function: GateFunction, params: HillParams) -> GenePart {
    let inputs = vec![Molecule::new(RPU); function.arity()];
    GenePart::new(name, function, params, inputs, RPU)
}

fn repressor_builder(name: &str) -> GateCatalogBuilder {
    let mut builder = GateCatalog::builder(name)
        .sensor(Sensor::new("pTac", RPU, 0.0034, 2.8))
        .sensor(Sensor::new("pTet", RPU, 0.0013, 4.4))
        .sensor(Sensor::new("pBAD", RPU, 0.0082, 2.5));

    // === NOT gates ===
    for (i, (family, ymin, ymax, k, n)) in REPRESSORS.iter().enumerate() {
        builder = builder.part(rpu_part(
            format!("P{}_{}", i + 1, family),
            GateFunction::Not,
            HillParams::new(*ymin, *ymax, *k, *n),
        ));
    }

    // === NOR gates (tandem promoters, slightly leakier) ===
    for (i, (family, ymin, ymax, k, n)) in REPRESSORS.iter().enumerate() {
        builder = builder.part(rpu_part(
            format!("N{}_{}", i + 1, family),
            GateFunction::Nor,
            HillParams::new(ymin * 1.5, ymax * 0.9, *k, *n),
        ));
    }

    builder
}

/// NOT/NOR repressor library
pub fn builtin_repressors() -> Result<GateCatalog> {
    repressor_builder("repressors").build()
}

/// Repressor library plus activating gates and the quorum family
pub fn builtin_extended() -> Result<GateCatalog> {
    let activating = [
        ("T1_SicA", GateFunction::And, HillParams::new(0.02, 4.0, 0.5, 2.0)),
        ("T2_InvF", GateFunction::And, HillParams::new(0.03, 3.1, 0.3, 1.8)),
        ("T3_ExsC", GateFunction::Or, HillParams::new(0.02, 3.5, 0.4, 2.2)),
        ("T4_LmrA", GateFunction::Nand, HillParams::new(0.05, 3.2, 0.3, 2.4)),
        ("T5_CinR", GateFunction::Xor, HillParams::new(0.04, 2.8, 2.1, 3.0)),
        ("T6_NahR", GateFunction::Xnor, HillParams::new(0.05, 2.6, 2.1, 3.0)),
    ];

    let mut builder = repressor_builder("extended").sensor(Sensor::new("pLux", AHL, 0.005, 3.0));
    for (name, function, params) in activating {
        builder = builder.part(rpu_part(name.to_string(), function, params));
    }

    // === Quorum family: converts between AHL and RPU ===
    builder = builder
        .part(GenePart::new(
            "Q1_LasR",
            GateFunction::Not,
            HillParams::new(0.01, 4.5, 0.2, 2.5),
            vec![Molecule::new(AHL)],
            RPU,
        ))
        .part(GenePart::new(
            "Q2_RhlR",
            GateFunction::Not,
            HillParams::new(0.01, 3.0, 0.25, 2.2),
            vec![Molecule::new(RPU)],
            AHL,
        ))
        .part(GenePart::new(
            "Q3_RpaR",
            GateFunction::Nor,
            HillParams::new(0.02, 3.6, 0.2, 2.0),
            vec![Molecule::new(AHL), Molecule::new(RPU)],
            RPU,
        ));

    builder.build()
}
