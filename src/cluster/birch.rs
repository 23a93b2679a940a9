// BIRCH: incremental clustering over a clustering-feature (CF) tree.
//
// Each subcluster keeps (n, linear sum, squared sum). A point is absorbed by
// the nearest leaf subcluster when the merged radius
//
//     sqrt(SS / n - |LS / n|^2)
//
// stays within `threshold`; otherwise it starts a new subcluster. A node that
// grows past `branching_factor` subclusters is split in two around its
// farthest pair of centroids, and splits propagate up to the root.
//
// There is no global clustering step: every leaf subcluster is a cluster.
// Points are labelled by their nearest leaf centroid and labels are renumbered
// 0.. in order of first appearance.

use indexmap::IndexMap;

use super::traits::Clustering;
use crate::error::{Error, Result};

/// Default maximum number of subclusters per node.
pub const DEFAULT_BRANCHING_FACTOR: usize = 50;

/// BIRCH configured with a merge threshold and branching factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Birch {
    threshold: f64,
    branching_factor: usize,
}

impl Birch {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            branching_factor: DEFAULT_BRANCHING_FACTOR,
        }
    }

    pub fn with_branching_factor(mut self, branching_factor: usize) -> Self {
        self.branching_factor = branching_factor;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn branching_factor(&self) -> usize {
        self.branching_factor
    }

    fn validate(&self, data: &[Vec<f32>]) -> Result<usize> {
        if !(self.threshold > 0.0 && self.threshold.is_finite()) {
            return Err(Error::invalid_parameter(
                "threshold",
                format!("must be a positive number, got {}", self.threshold),
            ));
        }
        if self.branching_factor < 2 {
            return Err(Error::invalid_parameter("branching_factor", "must be at least 2"));
        }
        let first = data
            .first()
            .ok_or_else(|| Error::invalid_parameter("data", "need at least one vector"))?;
        let dim = first.len();
        if let Some(bad) = data.iter().find(|v| v.len() != dim) {
            return Err(Error::DimensionMismatch {
                expected: dim,
                found: bad.len(),
            });
        }
        Ok(dim)
    }

    /// Build the CF tree over `data`.
    fn build_tree(&self, data: &[Vec<f32>]) -> CfNode {
        let mut root = CfNode::leaf();
        for point in data {
            let sub = Subcluster::from_point(point);
            if root.insert(&sub, self.threshold, self.branching_factor) {
                let old = std::mem::replace(&mut root, CfNode::leaf());
                let (left, right) = old.split();
                root = CfNode {
                    is_leaf: false,
                    subclusters: vec![left, right],
                };
            }
        }
        root
    }
}

impl Clustering for Birch {
    fn fit_predict(&self, data: &[Vec<f32>]) -> Result<Vec<usize>> {
        self.validate(data)?;
        let tree = self.build_tree(data);

        let mut centroids = Vec::new();
        tree.leaf_centroids(&mut centroids);

        let nearest: Vec<usize> = data
            .iter()
            .map(|point| {
                let point: Vec<f64> = point.iter().map(|&x| f64::from(x)).collect();
                nearest_index(&centroids, &point).unwrap_or(0)
            })
            .collect();
        Ok(relabel(&nearest))
    }
}

/// Clustering feature of a group of points, plus the child node it summarizes
/// when it sits in an internal node.
#[derive(Debug, Clone)]
struct Subcluster {
    n_samples: usize,
    linear_sum: Vec<f64>,
    squared_sum: f64,
    centroid: Vec<f64>,
    child: Option<Box<CfNode>>,
}

impl Subcluster {
    fn from_point(point: &[f32]) -> Self {
        let linear_sum: Vec<f64> = point.iter().map(|&x| f64::from(x)).collect();
        let squared_sum = dot(&linear_sum, &linear_sum);
        Self {
            n_samples: 1,
            centroid: linear_sum.clone(),
            linear_sum,
            squared_sum,
            child: None,
        }
    }

    /// Summary of every subcluster in `node`, owning `node` as its child.
    fn from_node(node: CfNode) -> Self {
        let dim = node.subclusters.first().map_or(0, |s| s.linear_sum.len());
        let mut sub = Self {
            n_samples: 0,
            linear_sum: vec![0.0; dim],
            squared_sum: 0.0,
            centroid: vec![0.0; dim],
            child: None,
        };
        for s in &node.subclusters {
            sub.absorb(s);
        }
        sub.child = Some(Box::new(node));
        sub
    }

    fn absorb(&mut self, other: &Subcluster) {
        self.n_samples += other.n_samples;
        for (acc, x) in self.linear_sum.iter_mut().zip(&other.linear_sum) {
            *acc += x;
        }
        self.squared_sum += other.squared_sum;
        let n = self.n_samples as f64;
        self.centroid = self.linear_sum.iter().map(|x| x / n).collect();
    }

    /// Absorb `other` if the merged radius stays within `threshold`.
    fn merge_if_close(&mut self, other: &Subcluster, threshold: f64) -> bool {
        let n = (self.n_samples + other.n_samples) as f64;
        let centroid: Vec<f64> = self
            .linear_sum
            .iter()
            .zip(&other.linear_sum)
            .map(|(a, b)| (a + b) / n)
            .collect();
        let sq_radius = (self.squared_sum + other.squared_sum) / n - dot(&centroid, &centroid);
        if sq_radius <= threshold * threshold {
            self.absorb(other);
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Clone)]
struct CfNode {
    is_leaf: bool,
    subclusters: Vec<Subcluster>,
}

impl CfNode {
    fn leaf() -> Self {
        Self {
            is_leaf: true,
            subclusters: Vec::new(),
        }
    }

    /// Insert a point subcluster. Returns true when this node has overflowed
    /// and must be split by its parent.
    fn insert(&mut self, sub: &Subcluster, threshold: f64, branching_factor: usize) -> bool {
        let centroids: Vec<&[f64]> = self.subclusters.iter().map(|s| s.centroid.as_slice()).collect();
        let Some(closest) = nearest_index(&centroids, &sub.centroid) else {
            self.subclusters.push(sub.clone());
            return false;
        };

        let target = &mut self.subclusters[closest];
        if let Some(child) = target.child.as_deref_mut() {
            if !child.insert(sub, threshold, branching_factor) {
                target.absorb(sub);
                return false;
            }
            if let Some(child) = target.child.take() {
                let (left, right) = child.split();
                self.subclusters[closest] = left;
                self.subclusters.push(right);
            }
            return self.subclusters.len() > branching_factor;
        }

        if target.merge_if_close(sub, threshold) {
            return false;
        }
        self.subclusters.push(sub.clone());
        self.subclusters.len() > branching_factor
    }

    /// Split into two nodes around the farthest pair of subcluster centroids.
    fn split(self) -> (Subcluster, Subcluster) {
        let is_leaf = self.is_leaf;
        let (a, b) = farthest_pair(&self.subclusters);
        let anchor_a = self.subclusters[a].centroid.clone();
        let anchor_b = self.subclusters[b].centroid.clone();

        let mut left = CfNode {
            is_leaf,
            subclusters: Vec::new(),
        };
        let mut right = left.clone();
        for (idx, sub) in self.subclusters.into_iter().enumerate() {
            let to_left = idx == a
                || squared_distance(&sub.centroid, &anchor_a) < squared_distance(&sub.centroid, &anchor_b);
            if to_left {
                left.subclusters.push(sub);
            } else {
                right.subclusters.push(sub);
            }
        }
        (Subcluster::from_node(left), Subcluster::from_node(right))
    }

    fn leaf_centroids<'a>(&'a self, out: &mut Vec<&'a [f64]>) {
        for sub in &self.subclusters {
            match &sub.child {
                Some(child) => child.leaf_centroids(out),
                None => out.push(&sub.centroid),
            }
        }
    }
}

/// First farthest pair in row-major order (a == b when all centroids coincide).
fn farthest_pair(subclusters: &[Subcluster]) -> (usize, usize) {
    let mut best = (0, 0);
    let mut best_dist = 0.0;
    for (i, si) in subclusters.iter().enumerate() {
        for (j, sj) in subclusters.iter().enumerate() {
            let d = squared_distance(&si.centroid, &sj.centroid);
            if d > best_dist {
                best_dist = d;
                best = (i, j);
            }
        }
    }
    best
}

/// Index of the nearest centroid (first on ties).
fn nearest_index<C: AsRef<[f64]>>(centroids: &[C], point: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, c) in centroids.iter().enumerate() {
        let d = squared_distance(c.as_ref(), point);
        match best {
            Some((_, bd)) if d >= bd => {}
            _ => best = Some((i, d)),
        }
    }
    best.map(|(i, _)| i)
}

/// Renumber labels 0.. in order of first appearance.
fn relabel(raw: &[usize]) -> Vec<usize> {
    let mut ids: IndexMap<usize, usize> = IndexMap::new();
    raw.iter()
        .map(|&r| {
            let next = ids.len();
            *ids.entry(r).or_insert(next)
        })
        .collect()
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_point_is_one_cluster() {
        let labels = Birch::new(0.5).fit_predict(&[vec![1.0, 2.0, 3.0]]).unwrap();
        assert_eq!(labels, vec![0]);
    }

    #[test]
    fn test_separates_distant_groups() {
        let data = vec![
            vec![0.0, 0.0],
            vec![0.1, 0.0],
            vec![10.0, 10.0],
            vec![0.0, 0.1],
            vec![10.1, 10.0],
        ];
        let labels = Birch::new(0.5).fit_predict(&data).unwrap();
        assert_eq!(labels, vec![0, 0, 1, 0, 1]);
    }

    #[test]
    fn test_threshold_controls_granularity() {
        let data: Vec<Vec<f32>> = (0..10).map(|i| vec![i as f32, 0.0]).collect();
        let fine = Birch::new(0.1).fit_predict(&data).unwrap();
        let coarse = Birch::new(100.0).fit_predict(&data).unwrap();
        assert_eq!(fine.iter().max(), Some(&9));
        assert!(coarse.iter().all(|&l| l == 0));
    }

    #[test]
    fn test_splits_keep_every_point_labelled() {
        let data: Vec<Vec<f32>> = (0..40).map(|i| vec![(i * 7 % 40) as f32, (i % 3) as f32]).collect();
        let labels = Birch::new(0.01).with_branching_factor(3).fit_predict(&data).unwrap();
        assert_eq!(labels.len(), 40);
        // Tiny threshold: every distinct point is its own leaf subcluster.
        let distinct = labels.iter().collect::<std::collections::HashSet<_>>().len();
        assert_eq!(distinct, 40);
    }

    #[test]
    fn test_validation() {
        let data = vec![vec![0.0, 0.0]];
        assert!(matches!(
            Birch::new(0.0).fit_predict(&data),
            Err(Error::InvalidParameter { name: "threshold", .. })
        ));
        assert!(matches!(
            Birch::new(0.5).with_branching_factor(1).fit_predict(&data),
            Err(Error::InvalidParameter { name: "branching_factor", .. })
        ));
        assert!(matches!(
            Birch::new(0.5).fit_predict(&[]),
            Err(Error::InvalidParameter { name: "data", .. })
        ));
        assert!(matches!(
            Birch::new(0.5).fit_predict(&[vec![0.0], vec![0.0, 1.0]]),
            Err(Error::DimensionMismatch { expected: 1, found: 2 })
        ));
    }

    #[test]
    fn test_relabel_first_appearance() {
        assert_eq!(relabel(&[4, 4, 1, 7, 1]), vec![0, 0, 1, 2, 1]);
    }
}
