// The cluster runner: HDBSCAN over a feature matrix, behind the cache.
//
// Per model key the state machine is trivial: uncomputed until the first
// run, computed forever after. This component never invalidates an entry —
// a cache hit is returned verbatim even if the matrix changed upstream.
// That stale-cache hazard is inherited from the analysis this pipeline
// reproduces; we surface it with a warning instead of silently honoring it.

use std::collections::HashMap;

use anyhow::Result;
use hdbscan::{Hdbscan, HdbscanHyperParams, NnAlgorithm};
use tracing::{info, warn};

use super::{ClusterAssignment, NOISE_CLUSTER};
use crate::cache::AssignmentCache;
use crate::error::DegenerateInputError;
use crate::vectorize::DocumentNgramMatrix;

pub const DEFAULT_MIN_CLUSTER_SIZE: usize = 5;

/// Runs density-based clustering and persists per-document assignments.
pub struct ClusterRunner<'a> {
    cache: &'a dyn AssignmentCache,
    min_cluster_size: usize,
}

impl<'a> ClusterRunner<'a> {
    pub fn new(cache: &'a dyn AssignmentCache) -> Self {
        Self::with_min_cluster_size(cache, DEFAULT_MIN_CLUSTER_SIZE)
    }

    pub fn with_min_cluster_size(cache: &'a dyn AssignmentCache, min_cluster_size: usize) -> Self {
        Self {
            cache,
            min_cluster_size,
        }
    }

    /// Cluster the matrix under `model`, or return the cached result.
    ///
    /// Output has one row per input document, in input order. Zero-column
    /// input fails with [`DegenerateInputError`] before clustering is ever
    /// invoked.
    pub fn run(
        &self,
        matrix: &DocumentNgramMatrix,
        model: &str,
    ) -> Result<Vec<ClusterAssignment>> {
        if self.cache.exists(model) {
            warn!(
                model,
                "returning cached assignments — current inputs are not rechecked; \
                 rename the model key to force a recompute"
            );
            return self.cache.read(model);
        }

        if matrix.n_rows() == 0 {
            return Err(DegenerateInputError::new("matrix has no documents").into());
        }
        if matrix.n_cols() == 0 {
            return Err(DegenerateInputError::new(
                "matrix has no gram columns (every gram was filtered out)",
            )
            .into());
        }

        let data = matrix.to_dense();
        // Brute-force neighbor search: n-gram space is far too
        // high-dimensional for a kd-tree to help, and samples are small.
        let params = HdbscanHyperParams::builder()
            .min_cluster_size(self.min_cluster_size)
            .min_samples(self.min_cluster_size)
            .nn_algorithm(NnAlgorithm::BruteForce)
            .build();
        let labels = Hdbscan::new(&data, params)
            .cluster()
            .map_err(|e| anyhow::anyhow!("hdbscan failed: {e:?}"))?;

        let rows = shape_assignments(matrix.docids(), &data, &labels);
        self.cache.write(model, &rows)?;

        let clusters = rows
            .iter()
            .filter(|r| !r.is_noise())
            .map(|r| r.cluster)
            .collect::<std::collections::HashSet<_>>()
            .len();
        let noise = rows.iter().filter(|r| r.is_noise()).count();
        info!(model, documents = rows.len(), clusters, noise, "Clustering complete");
        Ok(rows)
    }
}

/// Turn raw labels into the persisted assignment shape.
///
/// HDBSCAN's hard labels are augmented with two soft quantities:
/// - `membership_prob`: 1.0 at the assigned cluster's centroid, falling
///   linearly to 0.0 at the cluster's farthest member; noise points get 0.
/// - `outlier_score`: Euclidean distance to the nearest cluster centroid,
///   whichever cluster that is; 0.0 when no clusters exist at all.
fn shape_assignments(
    docids: &[String],
    data: &[Vec<f64>],
    labels: &[i32],
) -> Vec<ClusterAssignment> {
    let centroids = centroids_by_label(data, labels);
    let max_radius = max_radius_by_label(data, labels, &centroids);

    docids
        .iter()
        .zip(data.iter().zip(labels))
        .map(|(docid, (point, &label))| {
            let outlier_score = centroids
                .values()
                .map(|c| euclidean(point, c))
                .fold(f64::INFINITY, f64::min);
            let outlier_score = if outlier_score.is_finite() {
                outlier_score
            } else {
                0.0
            };

            let membership_prob = if label == NOISE_CLUSTER {
                0.0
            } else {
                let dist = euclidean(point, &centroids[&label]);
                let radius = max_radius[&label];
                if radius > 0.0 {
                    1.0 - dist / radius
                } else {
                    // Every member sits on the centroid (e.g. exact
                    // duplicate form letters).
                    1.0
                }
            };

            ClusterAssignment {
                docid: docid.clone(),
                cluster: label,
                membership_prob,
                outlier_score,
            }
        })
        .collect()
}

fn centroids_by_label(data: &[Vec<f64>], labels: &[i32]) -> HashMap<i32, Vec<f64>> {
    let dims = data.first().map(Vec::len).unwrap_or(0);
    let mut sums: HashMap<i32, (Vec<f64>, usize)> = HashMap::new();
    for (point, &label) in data.iter().zip(labels) {
        if label == NOISE_CLUSTER {
            continue;
        }
        let entry = sums.entry(label).or_insert_with(|| (vec![0.0; dims], 0));
        for (acc, v) in entry.0.iter_mut().zip(point) {
            *acc += v;
        }
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(label, (sum, count))| {
            let centroid = sum.into_iter().map(|v| v / count as f64).collect();
            (label, centroid)
        })
        .collect()
}

fn max_radius_by_label(
    data: &[Vec<f64>],
    labels: &[i32],
    centroids: &HashMap<i32, Vec<f64>>,
) -> HashMap<i32, f64> {
    let mut radius: HashMap<i32, f64> = centroids.keys().map(|&l| (l, 0.0)).collect();
    for (point, &label) in data.iter().zip(labels) {
        if label == NOISE_CLUSTER {
            continue;
        }
        let dist = euclidean(point, &centroids[&label]);
        let entry = radius.entry(label).or_insert(0.0);
        if dist > *entry {
            *entry = dist;
        }
    }
    radius
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn euclidean_basics() {
        assert_eq!(euclidean(&[0.0, 0.0], &[3.0, 4.0]), 5.0);
        assert_eq!(euclidean(&[1.0], &[1.0]), 0.0);
    }

    #[test]
    fn shape_gives_noise_zero_membership() {
        let docids: Vec<String> = vec!["a".into(), "b".into(), "c".into()];
        let data = vec![vec![0.0, 0.0], vec![0.2, 0.0], vec![9.0, 9.0]];
        let labels = vec![0, 0, NOISE_CLUSTER];
        let rows = shape_assignments(&docids, &data, &labels);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].membership_prob, 0.0);
        assert!(rows[2].outlier_score > rows[0].outlier_score);
        for row in &rows[..2] {
            assert!((0.0..=1.0).contains(&row.membership_prob));
        }
    }

    #[test]
    fn identical_members_get_full_membership() {
        let docids: Vec<String> = vec!["a".into(), "b".into()];
        let data = vec![vec![1.0, 2.0], vec![1.0, 2.0]];
        let labels = vec![0, 0];
        let rows = shape_assignments(&docids, &data, &labels);
        assert_eq!(rows[0].membership_prob, 1.0);
        assert_eq!(rows[1].membership_prob, 1.0);
        assert_eq!(rows[0].outlier_score, 0.0);
    }

    #[test]
    fn all_noise_means_zero_outlier_scores() {
        let docids: Vec<String> = vec!["a".into(), "b".into()];
        let data = vec![vec![0.0], vec![5.0]];
        let labels = vec![NOISE_CLUSTER, NOISE_CLUSTER];
        let rows = shape_assignments(&docids, &data, &labels);
        for row in &rows {
            assert_eq!(row.outlier_score, 0.0);
            assert_eq!(row.membership_prob, 0.0);
        }
    }
}
