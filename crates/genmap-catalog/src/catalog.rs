//! Gate Catalog
//!
//! The full set of gene parts, partitioned by implemented function, each
//! partition indexed by a k-d tree over feature vectors. A catalog is
//! immutable once built and can be shared by reference across threads.

use crate::error::{CatalogError, Result};
use crate::feature::{FeatureSpace, FeatureVector, ResponseTarget};
use crate::function::GateFunction;
use crate::kd_tree::KdTree;
use crate::part::{GenePart, Sensor};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

// ============================================================================
// Identifiers and query results
// ============================================================================

/// Insertion index of a part in its catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartId(pub usize);

impl PartId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for PartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A part returned by a similarity query
#[derive(Debug, Clone, Copy)]
pub struct Neighbor<'a> {
    pub id: PartId,
    pub part: &'a GenePart,
    pub distance: f64,
}

#[derive(Debug, Clone)]
struct Partition {
    members: Vec<PartId>,
    tree: KdTree,
}

// ============================================================================
// Catalog
// ============================================================================

#[derive(Debug, Clone)]
pub struct GateCatalog {
    name: String,
    parts: Vec<GenePart>,
    features: Vec<FeatureVector>,
    by_name: IndexMap<String, PartId>,
    sensors: IndexMap<String, Sensor>,
    partitions: IndexMap<GateFunction, Partition>,
    space: FeatureSpace,
    allow_reuse: bool,
}

impl GateCatalog {
    pub fn builder(name: impl Into<String>) -> GateCatalogBuilder {
        GateCatalogBuilder::new(name)
    }

    /// Build an unnamed catalog from parts only
    pub fn build(parts: Vec<GenePart>) -> Result<Self> {
        Self::builder("catalog").parts(parts).build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of parts
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Whether one part may be bound to several circuit nodes
    pub fn allow_reuse(&self) -> bool {
        self.allow_reuse
    }

    pub fn feature_space(&self) -> &FeatureSpace {
        &self.space
    }

    pub fn part(&self, id: PartId) -> Option<&GenePart> {
        self.parts.get(id.0)
    }

    pub fn part_by_name(&self, name: &str) -> Option<(PartId, &GenePart)> {
        let id = *self.by_name.get(name)?;
        Some((id, &self.parts[id.0]))
    }

    /// Parts in insertion order
    pub fn parts(&self) -> impl Iterator<Item = (PartId, &GenePart)> {
        self.parts.iter().enumerate().map(|(i, p)| (PartId(i), p))
    }

    /// Stored feature vector of a part
    pub fn feature(&self, id: PartId) -> Option<&FeatureVector> {
        self.features.get(id.0)
    }

    pub fn sensor(&self, name: &str) -> Option<&Sensor> {
        self.sensors.get(name)
    }

    pub fn sensors(&self) -> impl Iterator<Item = &Sensor> {
        self.sensors.values()
    }

    /// Parts implementing `function`, in insertion order
    pub fn partition(&self, function: GateFunction) -> &[PartId] {
        self.partitions
            .get(&function)
            .map(|p| p.members.as_slice())
            .unwrap_or(&[])
    }

    pub fn partition_len(&self, function: GateFunction) -> usize {
        self.partition(function).len()
    }

    /// Project a target into this catalog's feature space
    pub fn project(&self, target: &ResponseTarget) -> FeatureVector {
        self.space.project(target)
    }

    /// The `k` parts implementing `function` closest to `target`, ascending
    /// by `(distance, PartId)`
    pub fn nearest(
        &self,
        function: GateFunction,
        target: &FeatureVector,
        k: usize,
    ) -> Result<Vec<Neighbor<'_>>> {
        self.nearest_where(function, target, k, |_| true)
    }

    /// Same as [`nearest`](Self::nearest), skipping parts in `excluded`
    pub fn excluding(
        &self,
        function: GateFunction,
        target: &FeatureVector,
        k: usize,
        excluded: &HashSet<PartId>,
    ) -> Result<Vec<Neighbor<'_>>> {
        self.nearest_where(function, target, k, |id| !excluded.contains(&id))
    }

    /// Same as [`nearest`](Self::nearest), restricted to parts `accept`
    /// returns true for
    pub fn nearest_where<F>(
        &self,
        function: GateFunction,
        target: &FeatureVector,
        k: usize,
        accept: F,
    ) -> Result<Vec<Neighbor<'_>>>
    where
        F: Fn(PartId) -> bool,
    {
        let partition = self
            .partitions
            .get(&function)
            .filter(|p| !p.members.is_empty())
            .ok_or(CatalogError::EmptyPartition(function))?;

        let k = k.min(partition.members.len());
        let hits = partition
            .tree
            .nearest_filtered(target, k, |item| accept(PartId(item)));

        Ok(hits
            .into_iter()
            .map(|hit| Neighbor {
                id: PartId(hit.item),
                part: &self.parts[hit.item],
                distance: hit.distance,
            })
            .collect())
    }
}

impl std::ops::Index<PartId> for GateCatalog {
    type Output = GenePart;

    /// Panics if `id` does not belong to this catalog
    fn index(&self, id: PartId) -> &GenePart {
        &self.parts[id.0]
    }
}

// ============================================================================
// Builder
// ============================================================================

pub struct GateCatalogBuilder {
    name: String,
    parts: Vec<GenePart>,
    sensors: Vec<Sensor>,
    space: FeatureSpace,
    allow_reuse: bool,
}

impl GateCatalogBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parts: Vec::new(),
            sensors: Vec::new(),
            space: FeatureSpace::default(),
            allow_reuse: false,
        }
    }

    pub fn part(mut self, part: GenePart) -> Self {
        self.parts.push(part);
        self
    }

    pub fn parts(mut self, parts: impl IntoIterator<Item = GenePart>) -> Self {
        self.parts.extend(parts);
        self
    }

    pub fn sensor(mut self, sensor: Sensor) -> Self {
        self.sensors.push(sensor);
        self
    }

    pub fn sensors(mut self, sensors: impl IntoIterator<Item = Sensor>) -> Self {
        self.sensors.extend(sensors);
        self
    }

    pub fn allow_reuse(mut self, allow: bool) -> Self {
        self.allow_reuse = allow;
        self
    }

    pub fn feature_space(mut self, space: FeatureSpace) -> Self {
        self.space = space;
        self
    }

    /// Validate all entries and index them
    pub fn build(self) -> Result<GateCatalog> {
        FeatureSpace::new(self.space.weights)?;

        let mut by_name = IndexMap::new();
        for (i, part) in self.parts.iter().enumerate() {
            validate_part(part)?;
            if by_name.insert(part.name.clone(), PartId(i)).is_some() {
                return Err(CatalogError::DuplicatePart(part.name.clone()));
            }
        }

        let mut sensors = IndexMap::new();
        for sensor in self.sensors {
            validate_sensor(&sensor)?;
            if sensors.contains_key(&sensor.name) {
                return Err(CatalogError::DuplicateSensor(sensor.name));
            }
            sensors.insert(sensor.name.clone(), sensor);
        }

        let features: Vec<FeatureVector> = self
            .parts
            .iter()
            .map(|p| self.space.feature_vector(&p.response))
            .collect();

        let mut grouped: IndexMap<GateFunction, Vec<PartId>> = IndexMap::new();
        for (i, part) in self.parts.iter().enumerate() {
            grouped.entry(part.function).or_default().push(PartId(i));
        }
        grouped.sort_keys();

        let partitions = grouped
            .into_iter()
            .map(|(function, members)| {
                let points = members.iter().map(|id| (features[id.0], id.0)).collect();
                let tree = KdTree::build(points);
                (function, Partition { members, tree })
            })
            .collect::<IndexMap<_, _>>();

        debug!(
            "built catalog '{}': {} parts in {} partitions, {} sensors",
            self.name,
            self.parts.len(),
            partitions.len(),
            sensors.len()
        );

        Ok(GateCatalog {
            name: self.name,
            parts: self.parts,
            features,
            by_name,
            sensors,
            partitions,
            space: self.space,
            allow_reuse: self.allow_reuse,
        })
    }
}

fn validate_part(part: &GenePart) -> Result<()> {
    let expected = part.function.arity();
    if part.inputs.len() != expected {
        return Err(CatalogError::InputArity {
            part: part.name.clone(),
            function: part.function,
            expected,
            found: part.inputs.len(),
        });
    }
    if let Some(reason) = part.response.params.check() {
        return Err(CatalogError::InvalidResponse {
            part: part.name.clone(),
            reason,
        });
    }
    if part.response.polarity != part.function.polarity() {
        return Err(CatalogError::InvalidResponse {
            part: part.name.clone(),
            reason: format!(
                "{} requires a {:?} response",
                part.function,
                part.function.polarity()
            ),
        });
    }
    Ok(())
}

fn validate_sensor(sensor: &Sensor) -> Result<()> {
    let reason = if !sensor.low.is_finite() || !sensor.high.is_finite() {
        Some("levels must be finite".to_string())
    } else if sensor.low <= 0.0 {
        Some(format!("low level must be positive, got {}", sensor.low))
    } else if sensor.high <= sensor.low {
        Some(format!(
            "high level ({}) must exceed low level ({})",
            sensor.high, sensor.low
        ))
    } else {
        None
    };
    match reason {
        Some(reason) => Err(CatalogError::InvalidSensor {
            sensor: sensor.name.clone(),
            reason,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::{HillParams, ResponseFunction};

    fn not_part(name: &str, ymax: f64) -> GenePart {
        GenePart::new(
            name,
            GateFunction::Not,
            HillParams::new(0.01, ymax, 0.3, 2.0),
            vec!["in".into()],
            "out",
        )
    }

    fn target() -> ResponseTarget {
        ResponseTarget {
            low: 0.01,
            high: 10.0,
            threshold: 0.3,
            steepness: 2.0,
        }
    }

    #[test]
    fn test_nearest_orders_by_distance() {
        let catalog = GateCatalog::build(vec![
            not_part("far", 0.5),
            not_part("close", 8.0),
            not_part("exact", 10.0),
        ])
        .unwrap();
        let query = catalog.project(&target());
        let hits = catalog.nearest(GateFunction::Not, &query, 3).unwrap();
        let names: Vec<&str> = hits.iter().map(|n| n.part.name.as_str()).collect();
        assert_eq!(names, vec!["exact", "close", "far"]);
        assert_eq!(hits[0].distance, 0.0);
        assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[test]
    fn test_ties_break_by_insertion_order() {
        let catalog = GateCatalog::build(vec![
            not_part("first", 5.0),
            not_part("second", 5.0),
            not_part("third", 5.0),
        ])
        .unwrap();
        let query = catalog.project(&target());
        let ids: Vec<PartId> = catalog
            .nearest(GateFunction::Not, &query, 2)
            .unwrap()
            .iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(ids, vec![PartId(0), PartId(1)]);
    }

    #[test]
    fn test_excluding_skips_parts() {
        let catalog =
            GateCatalog::build(vec![not_part("a", 10.0), not_part("b", 8.0), not_part("c", 1.0)])
                .unwrap();
        let query = catalog.project(&target());
        let excluded: HashSet<PartId> = [PartId(0)].into_iter().collect();
        let hits = catalog
            .excluding(GateFunction::Not, &query, 5, &excluded)
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].part.name, "b");
    }

    #[test]
    fn test_k_degrades_to_partition() {
        let catalog = GateCatalog::build(vec![not_part("a", 10.0)]).unwrap();
        let query = catalog.project(&target());
        assert_eq!(catalog.nearest(GateFunction::Not, &query, 50).unwrap().len(), 1);
    }

    #[test]
    fn test_empty_partition_is_lazy() {
        let catalog = GateCatalog::build(vec![not_part("a", 10.0)]).unwrap();
        let query = catalog.project(&target());
        assert_eq!(
            catalog.nearest(GateFunction::Nor, &query, 1).unwrap_err(),
            CatalogError::EmptyPartition(GateFunction::Nor)
        );
        assert_eq!(catalog.partition_len(GateFunction::Nor), 0);
    }

    #[test]
    fn test_distance_matches_feature_space() {
        let catalog = GateCatalog::build(vec![not_part("a", 4.0)]).unwrap();
        let t = target();
        let hit = catalog
            .nearest(GateFunction::Not, &catalog.project(&t), 1)
            .unwrap()[0];
        let direct = catalog.feature_space().distance(&hit.part.response, &t);
        assert_eq!(hit.distance.to_bits(), direct.to_bits());
    }

    #[test]
    fn test_build_errors() {
        let dup = GateCatalog::build(vec![not_part("a", 1.0), not_part("a", 2.0)]);
        assert_eq!(dup.unwrap_err(), CatalogError::DuplicatePart("a".into()));

        let mut bad_arity = not_part("x", 1.0);
        bad_arity.inputs.push("extra".into());
        assert!(matches!(
            GateCatalog::build(vec![bad_arity]),
            Err(CatalogError::InputArity { expected: 1, found: 2, .. })
        ));

        let mut bad_params = not_part("y", 1.0);
        bad_params.response.params.k = -1.0;
        assert!(matches!(
            GateCatalog::build(vec![bad_params]),
            Err(CatalogError::InvalidResponse { .. })
        ));

        let mut wrong_polarity = not_part("z", 1.0);
        wrong_polarity.response = ResponseFunction::activator(0.01, 1.0, 0.3, 2.0);
        assert!(matches!(
            GateCatalog::build(vec![wrong_polarity]),
            Err(CatalogError::InvalidResponse { .. })
        ));

        let sensors = GateCatalog::builder("s")
            .sensor(Sensor::new("pTac", "in", 0.01, 2.0))
            .sensor(Sensor::new("pTac", "in", 0.01, 2.0))
            .build();
        assert_eq!(
            sensors.unwrap_err(),
            CatalogError::DuplicateSensor("pTac".into())
        );

        let inverted = GateCatalog::builder("s")
            .sensor(Sensor::new("pBad", "in", 2.0, 0.5))
            .build();
        assert!(matches!(inverted, Err(CatalogError::InvalidSensor { .. })));
    }

    #[test]
    fn test_lookup() {
        let catalog = GateCatalog::builder("lib")
            .allow_reuse(true)
            .part(not_part("a", 1.0))
            .part(not_part("b", 2.0))
            .sensor(Sensor::new("pTet", "in", 0.001, 4.4))
            .build()
            .unwrap();
        assert_eq!(catalog.name(), "lib");
        assert!(catalog.allow_reuse());
        assert_eq!(catalog.part_by_name("b").map(|(id, _)| id), Some(PartId(1)));
        assert_eq!(catalog.partition(GateFunction::Not), &[PartId(0), PartId(1)]);
        assert_eq!(catalog.sensor("pTet").map(|s| s.high), Some(4.4));
        assert!(catalog.feature(PartId(1)).is_some());
        assert!(catalog.part(PartId(7)).is_none());
        assert_eq!(catalog[PartId(0)].name, "a");
    }
}
