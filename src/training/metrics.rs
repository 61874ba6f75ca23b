/// Held-out evaluation metrics.

use serde::{Deserialize, Serialize};

/// Decision threshold for the accuracy / precision / recall summary.
pub const DECISION_THRESHOLD: f64 = 0.5;

/// ROC AUC via the rank-sum (Mann–Whitney U) statistic, averaging ranks of
/// tied scores. Defined as 0.5 when `labels` holds a single class.
pub fn roc_auc(labels: &[usize], scores: &[f64]) -> f64 {
    let positives = labels.iter().filter(|&&l| l == 1).count();
    let negatives = labels.len() - positives;
    if positives == 0 || negatives == 0 {
        return 0.5;
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut ranks = vec![0.0; scores.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        // 1-based ranks i+1..=j+1 share their average
        let rank = (i + j + 2) as f64 / 2.0;
        for &k in &order[i..=j] {
            ranks[k] = rank;
        }
        i = j + 1;
    }

    let positive_rank_sum: f64 = labels
        .iter()
        .zip(&ranks)
        .filter(|(l, _)| **l == 1)
        .map(|(_, r)| r)
        .sum();
    let p = positives as f64;
    let u = positive_rank_sum - p * (p + 1.0) / 2.0;
    u / (p * negatives as f64)
}

/// Threshold metrics on a held-out partition.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassificationSummary {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
}

impl ClassificationSummary {
    /// Precision or recall with an empty denominator is 0.
    pub fn compute(labels: &[usize], scores: &[f64]) -> Self {
        let (mut tp, mut fp, mut tn, mut fns) = (0usize, 0usize, 0usize, 0usize);
        for (&label, &score) in labels.iter().zip(scores) {
            match (score >= DECISION_THRESHOLD, label == 1) {
                (true, true) => tp += 1,
                (true, false) => fp += 1,
                (false, false) => tn += 1,
                (false, true) => fns += 1,
            }
        }
        let ratio = |a: usize, b: usize| if b == 0 { 0.0 } else { a as f64 / b as f64 };
        Self {
            accuracy: ratio(tp + tn, labels.len()),
            precision: ratio(tp, tp + fp),
            recall: ratio(tp, tp + fns),
        }
    }
}
