// Evaluation against the human astroturf labeling.
//
// The prediction rule is the one the original analysis used: landing in any
// real cluster predicts astroturf (dense regions are form-letter
// campaigns), noise predicts organic. Everything here is straight counting
// — the interesting judgment calls live in the vectorization parameters.

use std::collections::{BTreeMap, HashMap};

use anyhow::Result;

use crate::cluster::ClusterAssignment;
use crate::corpus::Document;

/// 2×2 confusion matrix for the astroturf prediction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionMatrix {
    pub true_pos: usize,
    pub false_pos: usize,
    pub false_neg: usize,
    pub true_neg: usize,
}

impl ConfusionMatrix {
    pub fn total(&self) -> usize {
        self.true_pos + self.false_pos + self.false_neg + self.true_neg
    }

    /// Of everything predicted astroturf, how much was? 0.0 when nothing
    /// was predicted positive (never NaN).
    pub fn precision(&self) -> f64 {
        ratio(self.true_pos, self.true_pos + self.false_pos)
    }

    /// Of the actual astroturf, how much did we catch?
    pub fn recall(&self) -> f64 {
        ratio(self.true_pos, self.true_pos + self.false_neg)
    }

    /// Harmonic mean of precision and recall.
    pub fn f1(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }
}

fn ratio(num: usize, denom: usize) -> f64 {
    if denom == 0 {
        0.0
    } else {
        num as f64 / denom as f64
    }
}

/// Per-cluster composition, for qualitative review of what each dense
/// region actually contains.
#[derive(Debug, Clone)]
pub struct ClusterComposition {
    pub cluster: i32,
    pub size: usize,
    /// Members carrying a ground-truth label.
    pub labeled: usize,
    /// Labeled members judged astroturf by the human pass.
    pub astroturf: usize,
    pub mean_membership: f64,
}

impl ClusterComposition {
    /// Astroturf fraction among labeled members; 0.0 when none are labeled.
    pub fn astroturf_fraction(&self) -> f64 {
        ratio(self.astroturf, self.labeled)
    }
}

/// The full evaluation for one model key.
#[derive(Debug, Clone)]
pub struct EvalReport {
    pub model: String,
    pub confusion: ConfusionMatrix,
    /// Sorted by size descending, noise last.
    pub compositions: Vec<ClusterComposition>,
    /// Documents skipped because they carry no ground-truth label.
    pub unlabeled: usize,
}

/// Compare cluster assignments against the ground-truth labels.
///
/// Unlabeled documents are excluded from the confusion matrix but still
/// counted in cluster compositions. An assignment whose docid has no
/// matching document is an error — it means the cache entry and the sample
/// have drifted apart.
pub fn evaluate(
    model: &str,
    assignments: &[ClusterAssignment],
    docs: &[Document],
) -> Result<EvalReport> {
    let truth: HashMap<&str, Option<bool>> = docs
        .iter()
        .map(|d| (d.docid.as_str(), d.is_astroturf))
        .collect();

    let mut confusion = ConfusionMatrix::default();
    let mut unlabeled = 0;
    let mut by_cluster: BTreeMap<i32, Vec<&ClusterAssignment>> = BTreeMap::new();

    for assignment in assignments {
        let label = truth.get(assignment.docid.as_str()).ok_or_else(|| {
            anyhow::anyhow!(
                "assignment for unknown docid '{}' — cached clusters do not match this sample",
                assignment.docid
            )
        })?;
        by_cluster.entry(assignment.cluster).or_default().push(assignment);

        let predicted = !assignment.is_noise();
        match label {
            Some(true) if predicted => confusion.true_pos += 1,
            Some(true) => confusion.false_neg += 1,
            Some(false) if predicted => confusion.false_pos += 1,
            Some(false) => confusion.true_neg += 1,
            None => unlabeled += 1,
        }
    }

    let mut compositions: Vec<ClusterComposition> = by_cluster
        .into_iter()
        .map(|(cluster, members)| {
            let labeled = members
                .iter()
                .filter(|a| truth[a.docid.as_str()].is_some())
                .count();
            let astroturf = members
                .iter()
                .filter(|a| truth[a.docid.as_str()] == Some(true))
                .count();
            let mean_membership = if members.is_empty() {
                0.0
            } else {
                members.iter().map(|a| a.membership_prob).sum::<f64>() / members.len() as f64
            };
            ClusterComposition {
                cluster,
                size: members.len(),
                labeled,
                astroturf,
                mean_membership,
            }
        })
        .collect();
    // Size descending, noise last regardless of its size.
    compositions.sort_by_key(|c| (c.cluster == crate::cluster::NOISE_CLUSTER, usize::MAX - c.size));

    Ok(EvalReport {
        model: model.to_string(),
        confusion,
        compositions,
        unlabeled,
    })
}
