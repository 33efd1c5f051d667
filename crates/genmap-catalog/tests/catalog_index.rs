//! Catalog index tests against the bundled catalogs

use genmap_catalog::{
    builtin_catalog, euclidean, from_path, CatalogFile, GateFunction, PartId, ResponseTarget,
};
use std::collections::HashSet;

fn targets() -> Vec<ResponseTarget> {
    let mut out = Vec::new();
    for &low in &[0.001, 0.01, 0.1] {
        for &high in &[1.0, 3.0, 10.0] {
            for &threshold in &[0.05, 0.2, 1.0] {
                out.push(ResponseTarget {
                    low,
                    high,
                    threshold,
                    steepness: 2.5,
                });
            }
        }
    }
    out
}

#[test]
fn test_index_agrees_with_full_scan() {
    let catalog = builtin_catalog("extended").unwrap();

    for function in GateFunction::ALL {
        let members = catalog.partition(function);
        for target in targets() {
            let query = catalog.project(&target);

            let mut scan: Vec<(f64, PartId)> = members
                .iter()
                .map(|&id| (euclidean(&query, catalog.feature(id).unwrap()), id))
                .collect();
            scan.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

            let hits = catalog.nearest(function, &query, members.len()).unwrap();
            let got: Vec<(f64, PartId)> = hits.iter().map(|n| (n.distance, n.id)).collect();
            assert_eq!(got, scan, "{function}");
        }
    }
}

#[test]
fn test_excluding_walks_the_partition() {
    let catalog = builtin_catalog("repressors").unwrap();
    let query = catalog.project(&ResponseTarget {
        low: 0.01,
        high: 5.0,
        threshold: 0.2,
        steepness: 3.0,
    });

    let mut excluded = HashSet::new();
    let mut order = Vec::new();
    loop {
        let next = catalog
            .excluding(GateFunction::Not, &query, 1, &excluded)
            .unwrap();
        let Some(best) = next.first() else {
            break;
        };
        order.push(best.id);
        excluded.insert(best.id);
    }

    let full: Vec<PartId> = catalog
        .nearest(GateFunction::Not, &query, usize::MAX)
        .unwrap()
        .iter()
        .map(|n| n.id)
        .collect();
    assert_eq!(order, full);
}

#[test]
fn test_catalog_file_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lab.json");

    let mut file = CatalogFile::default();
    file.catalog.allow_reuse = true;
    let repressors = builtin_catalog("repressors").unwrap();
    file.sensors = repressors.sensors().cloned().collect();
    std::fs::write(&path, serde_json::to_string_pretty(&file).unwrap()).unwrap();

    let loaded = from_path(&path).unwrap();
    assert_eq!(loaded.name(), "lab");
    assert!(loaded.allow_reuse());
    assert_eq!(loaded.sensors().count(), 3);
}
