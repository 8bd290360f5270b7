// Clustering — density-based assignment of documents to comment campaigns.
//
// Dense regions of the n-gram feature space are form-letter campaigns;
// sparse points are (probably) organic comments. HDBSCAN gives us exactly
// that shape: clusters of varying density plus explicit noise.

pub mod runner;

use serde::{Deserialize, Serialize};

use crate::vectorize::Measure;

/// The noise sentinel. This crate standardizes on the `hdbscan` crate's
/// convention: cluster `-1` means "not in any cluster". Real cluster ids are
/// non-negative and are only meaningful within a single model key.
pub const NOISE_CLUSTER: i32 = -1;

/// One document's clustering outcome. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterAssignment {
    pub docid: String,
    /// Cluster id, or [`NOISE_CLUSTER`] for noise points.
    pub cluster: i32,
    /// Soft membership in the assigned cluster, in [0, 1]. Noise gets 0.
    pub membership_prob: f64,
    /// Distance to the nearest cluster centroid, ≥ 0. The persisted column
    /// keeps the export's historical plural header.
    #[serde(rename = "outlier_scores")]
    pub outlier_score: f64,
}

impl ClusterAssignment {
    pub fn is_noise(&self) -> bool {
        self.cluster == NOISE_CLUSTER
    }
}

/// Derive the cache key for one vectorization recipe, e.g. `word_2_tfidf`.
///
/// The key encodes representation, n-gram order, and measure — but not the
/// threshold or sample identity, which is exactly why the stale-cache hazard
/// exists (see the runner). Callers that vary anything else must fold it
/// into `repr`.
pub fn model_key(repr: &str, order: usize, measure: Measure) -> String {
    format!("{repr}_{order}_{measure}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_key_encodes_the_recipe() {
        assert_eq!(model_key("word", 2, Measure::TfIdf), "word_2_tfidf");
        assert_eq!(model_key("pos", 3, Measure::Tf), "pos_3_tf");
    }

    #[test]
    fn noise_predicate() {
        let a = ClusterAssignment {
            docid: "d".into(),
            cluster: NOISE_CLUSTER,
            membership_prob: 0.0,
            outlier_score: 1.0,
        };
        assert!(a.is_noise());
    }
}
