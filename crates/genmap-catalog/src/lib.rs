//! Gate catalog for genetic technology mapping
//!
//! This crate models the analog behaviour of genetic gates and indexes a
//! library of them for similarity search:
//! - [`response`]: Hill-type response functions and signal windows
//! - [`feature`]: the weighted feature space all distances are computed in
//! - [`kd_tree`]: k-nearest-neighbour index over feature vectors
//! - [`catalog`]: parts partitioned by function, one index per partition
//! - [`loader`] and [`builtin`]: catalog files and bundled catalogs

pub mod builtin;
pub mod catalog;
pub mod error;
pub mod feature;
pub mod function;
pub mod kd_tree;
pub mod loader;
pub mod part;
pub mod response;

pub use builtin::{builtin_catalog, list_builtin_catalogs};
pub use catalog::{GateCatalog, GateCatalogBuilder, Neighbor, PartId};
pub use error::{CatalogError, Result};
pub use feature::{euclidean, FeatureSpace, FeatureVector, ResponseTarget, FEATURE_DIM};
pub use function::{GateFunction, Polarity};
pub use loader::{from_json_str, from_path, from_toml_str, CatalogFile};
pub use part::{group_from_name, GenePart, Molecule, Sensor};
pub use response::{input_window, HillParams, InputWindow, ResponseFunction, SignalRange};
