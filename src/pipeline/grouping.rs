// URL grouping: cluster once at a fixed threshold and report URLs per cluster.
//
// Labels are `<source>:<url>`. Membership is paired by position: the i-th
// example's label belongs to the i-th inferred vector, so documents with
// identical vectors still keep their own URLs.

use tracing::debug;

use super::evaluate::infer_vectors;
use crate::cluster;
use crate::embedding::EmbeddingModel;
use crate::error::Result;
use crate::features::TrainingExample;

/// The URL part of a case label: everything after the first `:`.
/// A label without a colon is returned whole.
pub fn label_url(label: &str) -> &str {
    label.split_once(':').map_or(label, |(_, url)| url)
}

/// Group the examples' URLs by BIRCH cluster, in cluster-id order.
pub fn group_urls(
    model: &EmbeddingModel,
    examples: &[TrainingExample],
    branching_factor: usize,
    threshold: f64,
) -> Result<Vec<Vec<String>>> {
    let vectors = infer_vectors(model, examples);
    let (assignment, cluster_count) = cluster::cluster_once(&vectors, threshold, branching_factor)?;
    debug!(?assignment, "Clustered for URL grouping");

    let mut clusters = vec![Vec::new(); cluster_count];
    for (&cluster, example) in assignment.iter().zip(examples) {
        clusters[cluster].push(label_url(example.label()).to_string());
    }
    Ok(clusters)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_url_splits_on_first_colon() {
        assert_eq!(label_url("udn:https://udn.com/news/1"), "https://udn.com/news/1");
        assert_eq!(label_url("plain-id"), "plain-id");
        assert_eq!(label_url("src:"), "");
    }
}
