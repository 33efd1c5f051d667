//! Boolean functions implemented by catalog parts

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction in which a part's output responds to its combined input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    /// Output falls as the input rises (repressor-promoter pairs)
    Repressing,
    /// Output rises with the input
    Activating,
}

/// The boolean function a genetic part physically implements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateFunction {
    Not,
    And,
    Or,
    Nand,
    Nor,
    Xor,
    Xnor,
}

impl GateFunction {
    /// All functions in declaration order
    pub const ALL: [GateFunction; 7] = [
        GateFunction::Not,
        GateFunction::And,
        GateFunction::Or,
        GateFunction::Nand,
        GateFunction::Nor,
        GateFunction::Xor,
        GateFunction::Xnor,
    ];

    /// Number of inputs
    pub fn arity(self) -> usize {
        match self {
            GateFunction::Not => 1,
            GateFunction::And
            | GateFunction::Or
            | GateFunction::Nand
            | GateFunction::Nor
            | GateFunction::Xor
            | GateFunction::Xnor => 2,
        }
    }

    /// Response direction of parts implementing this function
    pub fn polarity(self) -> Polarity {
        match self {
            GateFunction::Not | GateFunction::Nor | GateFunction::Nand | GateFunction::Xnor => {
                Polarity::Repressing
            }
            GateFunction::And | GateFunction::Or | GateFunction::Xor => Polarity::Activating,
        }
    }

    /// Boolean value for one input assignment
    ///
    /// Missing inputs read as `false`.
    pub fn eval(self, inputs: &[bool]) -> bool {
        let a = inputs.first().copied().unwrap_or(false);
        let b = inputs.get(1).copied().unwrap_or(false);
        match self {
            GateFunction::Not => !a,
            GateFunction::And => a && b,
            GateFunction::Or => a || b,
            GateFunction::Nand => !(a && b),
            GateFunction::Nor => !(a || b),
            GateFunction::Xor => a ^ b,
            GateFunction::Xnor => !(a ^ b),
        }
    }

    /// Combine input concentrations into the single input the response sees
    ///
    /// NOR/OR sum tandem promoters, AND/NAND are limited by the weaker input,
    /// XOR/XNOR respond to the imbalance between the two inputs.
    pub fn combine(self, levels: &[f64]) -> f64 {
        let a = levels.first().copied().unwrap_or(0.0);
        let b = levels.get(1).copied().unwrap_or(0.0);
        match self {
            GateFunction::Not => a,
            GateFunction::Or | GateFunction::Nor => a + b,
            GateFunction::And | GateFunction::Nand => a.min(b),
            GateFunction::Xor | GateFunction::Xnor => (a - b).abs(),
        }
    }

    /// Lowercase name, as used in catalog files
    pub fn as_str(self) -> &'static str {
        match self {
            GateFunction::Not => "not",
            GateFunction::And => "and",
            GateFunction::Or => "or",
            GateFunction::Nand => "nand",
            GateFunction::Nor => "nor",
            GateFunction::Xor => "xor",
            GateFunction::Xnor => "xnor",
        }
    }
}

impl fmt::Display for GateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truth_tables() {
        let rows = [[false, false], [false, true], [true, false], [true, true]];
        let nor: Vec<bool> = rows.iter().map(|r| GateFunction::Nor.eval(r)).collect();
        assert_eq!(nor, vec![true, false, false, false]);
        let xor: Vec<bool> = rows.iter().map(|r| GateFunction::Xor.eval(r)).collect();
        assert_eq!(xor, vec![false, true, true, false]);
        assert!(GateFunction::Not.eval(&[false]));
    }

    #[test]
    fn test_polarity_matches_logic() {
        // A repressing function outputs false when its combined input is high
        for function in GateFunction::ALL {
            let arity = function.arity();
            let all_high = vec![true; arity];
            let levels = vec![1.0; arity];
            let x_high = function.combine(&levels) > 0.0;
            let expect = match function.polarity() {
                Polarity::Repressing => !x_high,
                Polarity::Activating => x_high,
            };
            if !matches!(function, GateFunction::Xor | GateFunction::Xnor) {
                assert_eq!(function.eval(&all_high), expect, "{function}");
            }
        }
    }

    #[test]
    fn test_combine() {
        assert_eq!(GateFunction::Nor.combine(&[0.5, 0.25]), 0.75);
        assert_eq!(GateFunction::And.combine(&[0.5, 0.25]), 0.25);
        assert_eq!(GateFunction::Xnor.combine(&[0.5, 0.25]), 0.25);
        assert_eq!(GateFunction::Not.combine(&[0.5]), 0.5);
    }
}
