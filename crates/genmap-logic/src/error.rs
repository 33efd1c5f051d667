//! Error types for circuit construction and loading

use crate::op::LogicOp;
use thiserror::Error;

/// Result type for circuit construction
pub type Result<T> = std::result::Result<T, CircuitError>;

/// Structural problems that make a circuit malformed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CircuitError {
    /// Two nodes drive the same signal name
    #[error("Signal '{0}' is declared more than once")]
    DuplicateSignal(String),

    /// A gate declaration names INPUT or OUTPUT
    #[error("'{signal}' is declared as a gate but {op} is not a gate operator")]
    NotAGate { signal: String, op: LogicOp },

    /// Operator and input count disagree
    #[error("{op} node driving '{signal}' takes {expected} input(s), got {found}")]
    ArityMismatch {
        signal: String,
        op: LogicOp,
        expected: usize,
        found: usize,
    },

    /// A node reads a signal nothing produces
    #[error("Node driving '{consumer}' reads undeclared signal '{signal}'")]
    UndeclaredSignal { signal: String, consumer: String },

    /// A circuit output is read by another node
    #[error("Circuit output '{0}' is consumed by another node")]
    OutputConsumed(String),

    /// The circuit declares no outputs
    #[error("Circuit has no outputs")]
    NoOutputs,

    /// The node graph contains a cycle through this signal
    #[error("Circuit is cyclic through signal '{0}'")]
    Cyclic(String),
}

/// Errors loading a circuit description
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Failed to parse circuit: {0}")]
    Parse(String),

    #[error(transparent)]
    Circuit(#[from] CircuitError),
}
