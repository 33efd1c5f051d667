//! Catalog files
//!
//! Catalogs can be loaded from TOML or JSON. Both formats share one layout:
//!
//! ```toml
//! [catalog]
//! name = "repressors"
//! allow_reuse = false
//!
//! [[sensors]]
//! name = "pTac"
//! output = "RPU"
//! low = 0.0034
//! high = 2.8
//!
//! [[parts]]
//! name = "P1_PhlF"
//! function = "not"
//! inputs = ["RPU"]
//! output = "RPU"
//!
//! [parts.response]
//! ymin = 0.02
//! ymax = 6.8
//! K = 0.13
//! n = 3.9
//! ```

use crate::catalog::GateCatalog;
use crate::error::{CatalogError, Result};
use crate::feature::{FeatureSpace, FEATURE_DIM};
use crate::function::GateFunction;
use crate::part::{GenePart, Molecule, Sensor};
use crate::response::HillParams;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// `[catalog]` header table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogHeader {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub allow_reuse: bool,
    /// Feature-space axis weights
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<[f64; FEATURE_DIM]>,
}

/// One `[[parts]]` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartEntry {
    pub name: String,
    pub function: GateFunction,
    pub inputs: Vec<Molecule>,
    pub output: Molecule,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub response: HillParams,
}

impl PartEntry {
    fn into_part(self) -> GenePart {
        let part = GenePart::new(self.name, self.function, self.response, self.inputs, self.output);
        match self.group {
            Some(group) => part.with_group(group),
            None => part,
        }
    }
}

/// On-disk catalog layout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub catalog: CatalogHeader,
    #[serde(default)]
    pub sensors: Vec<Sensor>,
    #[serde(default)]
    pub parts: Vec<PartEntry>,
}

impl CatalogFile {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| CatalogError::Parse(e.to_string()))
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| CatalogError::Parse(e.to_string()))
    }

    /// Validate and index. `fallback_name` is used when the header names none.
    pub fn into_catalog(self, fallback_name: &str) -> Result<GateCatalog> {
        let name = self
            .catalog
            .name
            .unwrap_or_else(|| fallback_name.to_string());
        let space = match self.catalog.weights {
            Some(weights) => FeatureSpace::new(weights)?,
            None => FeatureSpace::default(),
        };
        GateCatalog::builder(name)
            .allow_reuse(self.catalog.allow_reuse)
            .feature_space(space)
            .sensors(self.sensors)
            .parts(self.parts.into_iter().map(PartEntry::into_part))
            .build()
    }
}

/// Parse a TOML catalog
pub fn from_toml_str(s: &str) -> Result<GateCatalog> {
    CatalogFile::from_toml_str(s)?.into_catalog("catalog")
}

/// Parse a JSON catalog
pub fn from_json_str(s: &str) -> Result<GateCatalog> {
    CatalogFile::from_json_str(s)?.into_catalog("catalog")
}

/// Load a catalog file. `.json` files are read as JSON, everything else as
/// TOML. The file stem names the catalog unless the header does.
pub fn from_path(path: impl AsRef<Path>) -> Result<GateCatalog> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .map_err(|e| CatalogError::Io(format!("{}: {}", path.display(), e)))?;
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("catalog");

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let file = if is_json {
        CatalogFile::from_json_str(&contents)?
    } else {
        CatalogFile::from_toml_str(&contents)?
    };

    let catalog = file.into_catalog(stem)?;
    info!(
        "loaded catalog '{}' from {} ({} parts)",
        catalog.name(),
        path.display(),
        catalog.len()
    );
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = r#"
        [catalog]
        name = "small"

        [[sensors]]
        name = "pTac"
        output = "RPU"
        low = 0.0034
        high = 2.8

        [[parts]]
        name = "P1_PhlF"
        function = "not"
        inputs = ["RPU"]
        output = "RPU"

        [parts.response]
        ymin = 0.02
        ymax = 6.8
        K = 0.13
        n = 3.9

        [[parts]]
        name = "A1_AmtR"
        function = "nor"
        inputs = ["RPU", "RPU"]
        output = "RPU"
        group = "amtr-family"

        [parts.response]
        ymin = 0.06
        ymax = 3.8
        k = 0.07
        n = 1.6
        decay = 0.5
    "#;

    #[test]
    fn test_toml_catalog() {
        let catalog = from_toml_str(SMALL).unwrap();
        assert_eq!(catalog.name(), "small");
        assert_eq!(catalog.len(), 2);
        assert!(!catalog.allow_reuse());

        let (_, phlf) = catalog.part_by_name("P1_PhlF").unwrap();
        assert_eq!(phlf.group, "PhlF");
        assert_eq!(phlf.response.params.k, 0.13);
        assert_eq!(phlf.response.params.decay, 1.0);

        let (_, amtr) = catalog.part_by_name("A1_AmtR").unwrap();
        assert_eq!(amtr.group, "amtr-family");
        assert_eq!(amtr.response.params.decay, 0.5);
        assert_eq!(catalog.partition_len(GateFunction::Nor), 1);
        assert_eq!(catalog.sensor("pTac").map(|s| s.low), Some(0.0034));
    }

    #[test]
    fn test_json_catalog() {
        let json = r#"{
            "catalog": { "name": "j", "allow_reuse": true, "weights": [1, 1, 2, 0.5] },
            "parts": [{
                "name": "inv",
                "function": "not",
                "inputs": ["a"],
                "output": "b",
                "response": { "ymin": 0.01, "ymax": 2.0, "K": 0.2, "n": 2.0 }
            }]
        }"#;
        let catalog = from_json_str(json).unwrap();
        assert!(catalog.allow_reuse());
        assert_eq!(catalog.feature_space().weights, [1.0, 1.0, 2.0, 0.5]);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            from_toml_str("[[parts]]\nname = 3"),
            Err(CatalogError::Parse(_))
        ));
        assert!(matches!(
            from_json_str("{ not json"),
            Err(CatalogError::Parse(_))
        ));
        let unknown_function = r#"
            [[parts]]
            name = "x"
            function = "mux"
            inputs = ["a"]
            output = "b"
            [parts.response]
            ymin = 0.1
            ymax = 1.0
            k = 0.1
            n = 1.0
        "#;
        assert!(matches!(
            from_toml_str(unknown_function),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn test_from_path_uses_stem_and_extension() {
        let dir = tempfile::tempdir().unwrap();

        let toml_path = dir.path().join("lab.toml");
        std::fs::write(&toml_path, SMALL.replace("name = \"small\"\n", "")).unwrap();
        let catalog = from_path(&toml_path).unwrap();
        assert_eq!(catalog.name(), "lab");

        let json_path = dir.path().join("other.JSON");
        std::fs::write(&json_path, r#"{ "parts": [] }"#).unwrap();
        let catalog = from_path(&json_path).unwrap();
        assert!(catalog.is_empty());

        assert!(matches!(
            from_path(dir.path().join("missing.toml")),
            Err(CatalogError::Io(_))
        ));
    }
}
