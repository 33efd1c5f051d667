//! Assigner configuration
//!
//! Settings can be built in code from the presets or read from the
//! `[assigner]` table of a `genmap.toml` project file:
//!
//! ```toml
//! [assigner]
//! mode = "strict"
//! max_search_nodes = 50000
//! crosstalk = "circuit"
//!
//! [assigner.ideal]
//! low = 0.01
//! high = 10.0
//! steepness = 3.0
//! ```

use genmap_catalog::{Molecule, SignalRange};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Search policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignMode {
    /// Greedy single pass, no backtracking
    #[default]
    Normal,
    /// Backtracking branch-and-bound on the bottleneck mismatch
    Strict,
}

impl fmt::Display for AssignMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignMode::Normal => write!(f, "normal"),
            AssignMode::Strict => write!(f, "strict"),
        }
    }
}

/// Which bound parts an orthogonality group may not be shared with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrosstalkScope {
    /// Parts connected by a wire
    #[default]
    Adjacent,
    /// Every part in the circuit
    Circuit,
}

/// Ideal gate the default target policy aims for
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IdealGate {
    /// Ideal logical-0 output level
    pub low: f64,
    /// Ideal logical-1 output level
    pub high: f64,
    /// Ideal Hill coefficient
    pub steepness: f64,
}

impl Default for IdealGate {
    fn default() -> Self {
        Self {
            low: 0.01,
            high: 10.0,
            steepness: 3.0,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid assigner config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssignerConfig {
    pub mode: AssignMode,
    /// Strict mode frame budget (None = unbounded)
    pub max_search_nodes: Option<u64>,
    /// Wall-clock limit for one assignment
    pub deadline_ms: Option<u64>,
    /// Override the catalog's reuse setting
    pub allow_reuse: Option<bool>,
    pub crosstalk: CrosstalkScope,
    /// Required headroom (factor) between a part's threshold and its input
    /// window edges
    pub noise_margin: f64,
    /// Minimum on/off ratio of every realized gate output
    pub min_on_off_ratio: f64,
    /// Levels of circuit inputs that no sensor drives
    pub reference: SignalRange,
    /// Molecule of circuit inputs that no sensor drives (default: the input
    /// signal name)
    pub reference_molecule: Option<Molecule>,
    pub ideal: IdealGate,
    /// Explore the first gate's candidates on worker threads
    pub parallel_branches: bool,
}

impl Default for AssignerConfig {
    fn default() -> Self {
        Self {
            mode: AssignMode::Normal,
            max_search_nodes: Some(100_000),
            deadline_ms: None,
            allow_reuse: None,
            crosstalk: CrosstalkScope::Adjacent,
            noise_margin: 1.0,
            min_on_off_ratio: 1.0,
            reference: SignalRange::default(),
            reference_molecule: None,
            ideal: IdealGate::default(),
            parallel_branches: false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ProjectFile {
    #[serde(default)]
    assigner: AssignerConfig,
}

impl AssignerConfig {
    /// Greedy assignment
    pub fn normal() -> Self {
        Self::default()
    }

    /// Optimal assignment with the default frame budget
    pub fn strict() -> Self {
        Self {
            mode: AssignMode::Strict,
            ..Default::default()
        }
    }

    /// Optimal assignment with a specific frame budget
    pub fn strict_with_budget(max_search_nodes: u64) -> Self {
        Self {
            mode: AssignMode::Strict,
            max_search_nodes: Some(max_search_nodes),
            ..Default::default()
        }
    }

    pub fn for_mode(mode: AssignMode) -> Self {
        match mode {
            AssignMode::Normal => Self::normal(),
            AssignMode::Strict => Self::strict(),
        }
    }

    pub fn with_mode(mut self, mode: AssignMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_deadline_ms(mut self, ms: u64) -> Self {
        self.deadline_ms = Some(ms);
        self
    }

    pub fn with_allow_reuse(mut self, allow: bool) -> Self {
        self.allow_reuse = Some(allow);
        self
    }

    pub fn with_crosstalk(mut self, scope: CrosstalkScope) -> Self {
        self.crosstalk = scope;
        self
    }

    pub fn with_ideal(mut self, ideal: IdealGate) -> Self {
        self.ideal = ideal;
        self
    }

    pub fn with_parallel_branches(mut self, parallel: bool) -> Self {
        self.parallel_branches = parallel;
        self
    }

    /// Check numeric settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));
        if !(self.noise_margin >= 1.0 && self.noise_margin.is_finite()) {
            return invalid(format!("noise_margin must be >= 1, got {}", self.noise_margin));
        }
        if !(self.min_on_off_ratio >= 1.0 && self.min_on_off_ratio.is_finite()) {
            return invalid(format!(
                "min_on_off_ratio must be >= 1, got {}",
                self.min_on_off_ratio
            ));
        }
        let levels = [
            ("reference.low", self.reference.low),
            ("reference.high", self.reference.high),
            ("ideal.low", self.ideal.low),
            ("ideal.high", self.ideal.high),
            ("ideal.steepness", self.ideal.steepness),
        ];
        for (name, value) in levels {
            if !(value > 0.0 && value.is_finite()) {
                return invalid(format!("{} must be positive, got {}", name, value));
            }
        }
        if self.reference.high <= self.reference.low {
            return invalid("reference.high must exceed reference.low".to_string());
        }
        if self.ideal.high <= self.ideal.low {
            return invalid("ideal.high must exceed ideal.low".to_string());
        }
        Ok(())
    }

    /// Read the `[assigner]` table of a project file
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let file: ProjectFile = toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        file.assigner.validate()?;
        Ok(file.assigner)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }
}
