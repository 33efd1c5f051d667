//! Error types for catalog construction, loading and queries

use crate::function::GateFunction;
use thiserror::Error;

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors that can occur while building, loading or querying a catalog
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    /// I/O error reading a catalog file
    #[error("I/O error: {0}")]
    Io(String),

    /// TOML or JSON parsing error
    #[error("Failed to parse catalog: {0}")]
    Parse(String),

    /// Two parts share a name
    #[error("Duplicate part name: {0}")]
    DuplicatePart(String),

    /// Two sensors share a name
    #[error("Duplicate sensor name: {0}")]
    DuplicateSensor(String),

    /// A part declares the wrong number of input molecules for its function
    #[error("Part '{part}' implements {function} which takes {expected} input(s), but declares {found}")]
    InputArity {
        part: String,
        function: GateFunction,
        expected: usize,
        found: usize,
    },

    /// Response parameters outside their numeric domain
    #[error("Invalid response parameters for '{part}': {reason}")]
    InvalidResponse { part: String, reason: String },

    /// Sensor levels outside their numeric domain
    #[error("Invalid levels for sensor '{sensor}': {reason}")]
    InvalidSensor { sensor: String, reason: String },

    /// Feature weights must be finite and positive
    #[error("Invalid feature weights: {0}")]
    InvalidWeights(String),

    /// No part implements the requested function
    #[error("Catalog has no parts implementing {0}")]
    EmptyPartition(GateFunction),

    /// Unknown built-in catalog name
    #[error("Unknown built-in catalog '{0}'")]
    UnknownBuiltin(String),
}
