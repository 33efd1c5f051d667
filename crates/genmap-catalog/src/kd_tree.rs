//! k-d tree over feature vectors
//!
//! Nodes live in a flat arena. Each node splits on `depth % FEATURE_DIM` at
//! the median of its subtree, with ties on the split coordinate ordered by
//! item index so the tree shape is a pure function of its input.

use crate::feature::{euclidean, FeatureVector, FEATURE_DIM};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug, Clone)]
struct KdNode {
    point: FeatureVector,
    item: usize,
    axis: usize,
    left: Option<usize>,
    right: Option<usize>,
}

/// One query result: item index and its distance from the query point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KdHit {
    pub item: usize,
    pub distance: f64,
}

impl Eq for KdHit {}

impl Ord for KdHit {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then(self.item.cmp(&other.item))
    }
}

impl PartialOrd for KdHit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, Default)]
pub struct KdTree {
    nodes: Vec<KdNode>,
    root: Option<usize>,
}

impl KdTree {
    /// Build a tree from `(point, item)` pairs
    pub fn build(points: Vec<(FeatureVector, usize)>) -> Self {
        let mut points = points;
        let mut tree = Self {
            nodes: Vec::with_capacity(points.len()),
            root: None,
        };
        tree.root = tree.build_subtree(&mut points, 0);
        tree
    }

    fn build_subtree(&mut self, points: &mut [(FeatureVector, usize)], depth: usize) -> Option<usize> {
        if points.is_empty() {
            return None;
        }
        let axis = depth % FEATURE_DIM;
        points.sort_by(|a, b| a.0[axis].total_cmp(&b.0[axis]).then(a.1.cmp(&b.1)));
        let mid = points.len() / 2;
        let (point, item) = points[mid];

        let index = self.nodes.len();
        self.nodes.push(KdNode {
            point,
            item,
            axis,
            left: None,
            right: None,
        });

        let (lower, rest) = points.split_at_mut(mid);
        let left = self.build_subtree(lower, depth + 1);
        let right = self.build_subtree(&mut rest[1..], depth + 1);
        self.nodes[index].left = left;
        self.nodes[index].right = right;
        Some(index)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The `k` items closest to `query` that pass `accept`, ascending by
    /// `(distance, item)`
    pub fn nearest_filtered<F>(&self, query: &FeatureVector, k: usize, accept: F) -> Vec<KdHit>
    where
        F: Fn(usize) -> bool,
    {
        if k == 0 {
            return Vec::new();
        }
        let mut heap = BinaryHeap::with_capacity(k.min(self.len()) + 1);
        if let Some(root) = self.root {
            self.search(root, query, k, &accept, &mut heap);
        }
        heap.into_sorted_vec()
    }

    /// The `k` items closest to `query`
    pub fn nearest(&self, query: &FeatureVector, k: usize) -> Vec<KdHit> {
        self.nearest_filtered(query, k, |_| true)
    }

    fn search<F>(
        &self,
        index: usize,
        query: &FeatureVector,
        k: usize,
        accept: &F,
        heap: &mut BinaryHeap<KdHit>,
    ) where
        F: Fn(usize) -> bool,
    {
        let node = &self.nodes[index];

        if accept(node.item) {
            let hit = KdHit {
                item: node.item,
                distance: euclidean(query, &node.point),
            };
            if heap.len() < k {
                heap.push(hit);
            } else if heap.peek().is_some_and(|worst| hit < *worst) {
                heap.pop();
                heap.push(hit);
            }
        }

        let delta = query[node.axis] - node.point[node.axis];
        let (near, far) = if delta < 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };

        if let Some(near) = near {
            self.search(near, query, k, accept, heap);
        }
        if let Some(far) = far {
            let worst = if heap.len() < k {
                f64::INFINITY
            } else {
                heap.peek().map_or(f64::INFINITY, |w| w.distance)
            };
            // Equal gaps are still visited so index ties resolve correctly
            if delta.abs() <= worst {
                self.search(far, query, k, accept, heap);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic pseudo-random points
    fn points(count: usize, seed: u64) -> Vec<(FeatureVector, usize)> {
        let mut state = seed;
        let mut next = move || {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            // Coarse grid so coordinate and distance ties actually occur
            ((state >> 33) % 9) as f64 - 4.0
        };
        (0..count)
            .map(|i| ([next(), next(), next(), next()], i))
            .collect()
    }

    fn brute_force(
        points: &[(FeatureVector, usize)],
        query: &FeatureVector,
        k: usize,
        accept: impl Fn(usize) -> bool,
    ) -> Vec<KdHit> {
        let mut hits: Vec<KdHit> = points
            .iter()
            .filter(|(_, item)| accept(*item))
            .map(|(p, item)| KdHit {
                item: *item,
                distance: euclidean(query, p),
            })
            .collect();
        hits.sort();
        hits.truncate(k);
        hits
    }

    #[test]
    fn test_empty_tree() {
        let tree = KdTree::build(Vec::new());
        assert!(tree.is_empty());
        assert!(tree.nearest(&[0.0; FEATURE_DIM], 3).is_empty());
    }

    #[test]
    fn test_matches_brute_force() {
        let pts = points(200, 7);
        let tree = KdTree::build(pts.clone());
        assert_eq!(tree.len(), 200);

        for (query, _) in points(25, 99) {
            for k in [1, 3, 10, 250] {
                assert_eq!(tree.nearest(&query, k), brute_force(&pts, &query, k, |_| true));
            }
        }
    }

    #[test]
    fn test_filtered_matches_brute_force() {
        let pts = points(150, 3);
        let tree = KdTree::build(pts.clone());
        let accept = |item: usize| item % 3 != 0;

        for (query, _) in points(20, 11) {
            assert_eq!(
                tree.nearest_filtered(&query, 5, accept),
                brute_force(&pts, &query, 5, accept)
            );
        }
    }

    #[test]
    fn test_ties_break_by_item() {
        let p = [1.0, 1.0, 1.0, 1.0];
        let pts = vec![(p, 4), (p, 2), (p, 9), (p, 0)];
        let tree = KdTree::build(pts);
        let hits = tree.nearest(&[0.0; FEATURE_DIM], 3);
        let items: Vec<usize> = hits.iter().map(|h| h.item).collect();
        assert_eq!(items, vec![0, 2, 4]);
    }

    #[test]
    fn test_k_larger_than_tree() {
        let pts = points(5, 1);
        let tree = KdTree::build(pts);
        assert_eq!(tree.nearest(&[0.0; FEATURE_DIM], 100).len(), 5);
    }
}
