//! Gene parts and sensors

use crate::function::GateFunction;
use crate::response::{HillParams, ResponseFunction, SignalRange};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a signalling molecule (protein or inducer-driven promoter
/// activity). Two parts connect only when molecules compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Molecule(pub String);

impl Molecule {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Molecule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Molecule {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Molecule {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Orthogonality group implied by a part name: the suffix after the first
/// `_` (`P1_PhlF` -> `PhlF`), or the whole name when there is none.
pub fn group_from_name(name: &str) -> String {
    match name.split_once('_') {
        Some((_, suffix)) if !suffix.is_empty() => suffix.to_string(),
        _ => name.to_string(),
    }
}

/// Catalog entry: one physical gate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenePart {
    pub name: String,
    pub function: GateFunction,
    pub response: ResponseFunction,
    /// Input molecules, one per function input
    pub inputs: Vec<Molecule>,
    pub output: Molecule,
    pub group: String,
}

impl GenePart {
    /// Create a part. Polarity follows the function, the group follows the
    /// name.
    pub fn new(
        name: impl Into<String>,
        function: GateFunction,
        params: HillParams,
        inputs: Vec<Molecule>,
        output: impl Into<Molecule>,
    ) -> Self {
        let name = name.into();
        Self {
            group: group_from_name(&name),
            response: ResponseFunction::new(params, function.polarity()),
            name,
            function,
            inputs,
            output: output.into(),
        }
    }

    /// Builder: override the orthogonality group
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    /// Does this part accept exactly these molecules (in any order)?
    pub fn accepts(&self, molecules: &[&Molecule]) -> bool {
        if molecules.len() != self.inputs.len() {
            return false;
        }
        let mut wanted: Vec<&Molecule> = self.inputs.iter().collect();
        let mut given: Vec<&Molecule> = molecules.to_vec();
        wanted.sort();
        given.sort();
        wanted == given
    }
}

/// A circuit-input source with fixed off/on output levels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sensor {
    pub name: String,
    pub output: Molecule,
    /// Output level when uninduced
    pub low: f64,
    /// Output level when induced
    pub high: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl Sensor {
    pub fn new(name: impl Into<String>, output: impl Into<Molecule>, low: f64, high: f64) -> Self {
        Self {
            name: name.into(),
            output: output.into(),
            low,
            high,
            group: None,
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn range(&self) -> SignalRange {
        SignalRange::new(self.low, self.high)
    }
}
