// Cluster engine: run BIRCH at one or many thresholds and score each run.
//
// A sweep never drops a threshold. Runs that collapse into one cluster (or
// into one cluster per point) can't be scored; they are reported with a
// skipped score instead of aborting the sweep. Invalid parameters still fail
// immediately, before any clustering runs.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use tracing::{info, warn};

use super::birch::Birch;
use super::silhouette::silhouette_score;
use super::traits::Clustering;
use crate::error::{Error, Result};

/// Separation score of one clustering run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Score {
    Scored { silhouette: f64 },
    Skipped { reason: String },
}

impl Score {
    pub fn value(&self) -> Option<f64> {
        match self {
            Score::Scored { silhouette } => Some(*silhouette),
            Score::Skipped { .. } => None,
        }
    }
}

/// Outcome of clustering the vectors at one threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterResult {
    pub threshold: f64,
    /// Cluster id per input vector, numbered 0.. in order of first appearance
    pub assignment: Vec<usize>,
    pub cluster_count: usize,
    pub score: Score,
    #[serde(skip)]
    pub vectors: Vec<Vec<f32>>,
}

/// Cluster `vectors` once, returning the assignment and number of clusters.
pub fn cluster_once(
    vectors: &[Vec<f32>],
    threshold: f64,
    branching_factor: usize,
) -> Result<(Vec<usize>, usize)> {
    let assignment = Birch::new(threshold)
        .with_branching_factor(branching_factor)
        .fit_predict(vectors)?;
    let cluster_count = assignment.iter().max().map_or(0, |&m| m + 1);
    Ok((assignment, cluster_count))
}

/// Mean silhouette coefficient of an assignment.
pub fn score_once(vectors: &[Vec<f32>], assignment: &[usize]) -> Result<f64> {
    silhouette_score(vectors, assignment)
}

/// Cluster and score at every threshold, in the order given.
pub fn sweep(
    vectors: &[Vec<f32>],
    thresholds: &[f64],
    branching_factor: usize,
) -> Result<Vec<ClusterResult>> {
    if let Some(bad) = thresholds.iter().find(|t| !(**t > 0.0 && t.is_finite())) {
        return Err(Error::invalid_parameter(
            "threshold",
            format!("must be a positive number, got {bad}"),
        ));
    }

    thresholds
        .iter()
        .map(|&threshold| {
            let (assignment, cluster_count) = cluster_once(vectors, threshold, branching_factor)?;
            let score = match score_once(vectors, &assignment) {
                Ok(silhouette) => {
                    info!(threshold, clusters = cluster_count, silhouette, "Scored threshold");
                    Score::Scored { silhouette }
                }
                Err(e @ Error::InsufficientClusters { .. }) => {
                    warn!(threshold, clusters = cluster_count, "Skipped scoring: {e}");
                    Score::Skipped {
                        reason: e.to_string(),
                    }
                }
                Err(e) => return Err(e),
            };
            Ok(ClusterResult {
                threshold,
                assignment,
                cluster_count,
                score,
                vectors: vectors.to_vec(),
            })
        })
        .collect()
}

/// The highest-scoring result. Ties keep the earliest; skipped results never win.
pub fn best(results: &[ClusterResult]) -> Option<&ClusterResult> {
    let mut best: Option<(&ClusterResult, f64)> = None;
    for result in results {
        let Some(score) = result.score.value() else {
            continue;
        };
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((result, score)),
        }
    }
    best.map(|(result, _)| result)
}

/// Which labels fall into each cluster, in cluster-id order.
///
/// `labels[i]` belongs to the vector at position `i` of the clustering input.
pub fn materialize_clusters<S: AsRef<str>>(
    result: &ClusterResult,
    labels: &[S],
) -> Result<Vec<(usize, IndexSet<String>)>> {
    if labels.len() != result.assignment.len() {
        return Err(Error::DimensionMismatch {
            expected: result.assignment.len(),
            found: labels.len(),
        });
    }

    let mut clusters: IndexMap<usize, IndexSet<String>> = IndexMap::new();
    for (&cluster, label) in result.assignment.iter().zip(labels) {
        clusters
            .entry(cluster)
            .or_default()
            .insert(label.as_ref().to_string());
    }
    clusters.sort_keys();
    Ok(clusters.into_iter().collect())
}
