// Mean silhouette coefficient over euclidean distances.
//
//   s(i) = (b(i) - a(i)) / max(a(i), b(i))
//
// a(i) is the mean distance to the other members of i's cluster, b(i) the
// smallest mean distance to the members of any other cluster. Points alone in
// their cluster score 0.

use indexmap::IndexMap;
use rayon::prelude::*;

use crate::error::{Error, Result};

/// Mean silhouette coefficient of `labels` over `data`, in [-1, 1].
///
/// Needs at least two clusters and fewer clusters than points; anything else
/// fails with `InsufficientClusters`.
pub fn silhouette_score(data: &[Vec<f32>], labels: &[usize]) -> Result<f64> {
    if data.len() != labels.len() {
        return Err(Error::DimensionMismatch {
            expected: data.len(),
            found: labels.len(),
        });
    }

    let n = labels.len();
    let mut dense: IndexMap<usize, usize> = IndexMap::new();
    let mut sizes = Vec::new();
    let compact: Vec<usize> = labels
        .iter()
        .map(|&label| {
            let next = dense.len();
            let index = *dense.entry(label).or_insert(next);
            if index == sizes.len() {
                sizes.push(0);
            }
            sizes[index] += 1;
            index
        })
        .collect();

    let found = sizes.len();
    if found < 2 || found >= n {
        return Err(Error::InsufficientClusters { found, samples: n });
    }

    let total: f64 = (0..n)
        .into_par_iter()
        .map(|i| coefficient(i, data, &compact, &sizes))
        .sum();
    Ok(total / n as f64)
}

fn coefficient(point: usize, data: &[Vec<f32>], labels: &[usize], sizes: &[usize]) -> f64 {
    let own = labels[point];
    if sizes[own] <= 1 {
        return 0.0;
    }

    let mut sums = vec![0.0f64; sizes.len()];
    for (j, other) in data.iter().enumerate() {
        if j != point {
            sums[labels[j]] += euclidean(&data[point], other);
        }
    }

    let a = sums[own] / (sizes[own] - 1) as f64;
    let b = sums
        .iter()
        .zip(sizes)
        .enumerate()
        .filter(|&(label, (_, &size))| label != own && size > 0)
        .map(|(_, (sum, &size))| sum / size as f64)
        .fold(f64::INFINITY, f64::min);

    let max_ab = a.max(b);
    if max_ab < f64::EPSILON {
        0.0
    } else {
        (b - a) / max_ab
    }
}

fn euclidean(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| {
            let d = f64::from(x) - f64::from(y);
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfectly_separated() {
        let data = vec![vec![0.0], vec![0.0], vec![5.0], vec![5.0]];
        let score = silhouette_score(&data, &[0, 0, 1, 1]).unwrap();
        assert!((score - 1.0).abs() < 1e-12, "score = {score}");
    }

    #[test]
    fn test_swapped_labels_score_negative() {
        let data = vec![vec![0.0], vec![0.1], vec![5.0], vec![5.1]];
        let score = silhouette_score(&data, &[0, 1, 0, 1]).unwrap();
        assert!(score < 0.0, "score = {score}");
    }

    #[test]
    fn test_singletons_contribute_zero() {
        let data = vec![vec![0.0], vec![0.0], vec![9.0]];
        // Two identical points score 1, the lone point 0.
        let score = silhouette_score(&data, &[0, 0, 1]).unwrap();
        assert!((score - 2.0 / 3.0).abs() < 1e-12, "score = {score}");
    }

    #[test]
    fn test_degenerate_assignments() {
        let data = vec![vec![0.0], vec![1.0], vec![2.0]];
        assert!(matches!(
            silhouette_score(&data, &[0, 0, 0]),
            Err(Error::InsufficientClusters { found: 1, samples: 3 })
        ));
        assert!(matches!(
            silhouette_score(&data, &[0, 1, 2]),
            Err(Error::InsufficientClusters { found: 3, samples: 3 })
        ));
        assert!(matches!(
            silhouette_score(&[], &[]),
            Err(Error::InsufficientClusters { found: 0, samples: 0 })
        ));
        assert!(matches!(
            silhouette_score(&data, &[0, 1]),
            Err(Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_non_contiguous_labels() {
        let data = vec![vec![0.0], vec![0.0], vec![5.0], vec![5.0]];
        let score = silhouette_score(&data, &[3, 3, 7, 7]).unwrap();
        assert!((score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_sparse_huge_labels() {
        let data = vec![vec![0.0], vec![0.0], vec![5.0], vec![5.0]];
        let labels = [usize::MAX, usize::MAX, 1_000_000_000, 1_000_000_000];
        let score = silhouette_score(&data, &labels).unwrap();
        assert!((score - 1.0).abs() < 1e-12);
        assert!(matches!(
            silhouette_score(&data, &[usize::MAX; 4]),
            Err(Error::InsufficientClusters { found: 1, samples: 4 })
        ));
    }
}
