//! Precision-recall curve over continuous scores.
//!
//! The curve has one point per distinct score. The layout matches
//! scikit-learn's `precision_recall_curve`: thresholds ascend, and `precision`
//! and `recall` carry one extra trailing point `(1.0, 0.0)` that has no
//! threshold.

use burn::tensor::{backend::Backend, Tensor};
use serde::{Deserialize, Serialize};

use crate::{
    error::{EvalError, EvalResult},
    metrics::utils::{ensure_same_dims, to_host_vec},
};

/// Precision and recall at every distinct score threshold.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PrecisionRecallCurve {
    pub precision: Vec<f64>,
    pub recall: Vec<f64>,
    pub thresholds: Vec<f64>,
}

impl PrecisionRecallCurve {
    /// Computes the curve from flat labels and un-thresholded scores.
    pub fn from_tensors<B: Backend>(y_true: Tensor<B, 1>, scores: Tensor<B, 1>) -> EvalResult<Self> {
        ensure_same_dims("prediction scores", &y_true, &scores)?;
        Self::compute(&to_host_vec(y_true)?, &to_host_vec(scores)?)
    }

    /// Computes the curve from host slices. Labels equal to 1 are positive.
    pub fn compute(y_true: &[f32], scores: &[f32]) -> EvalResult<Self> {
        if y_true.len() != scores.len() {
            return Err(EvalError::shape(
                "prediction scores",
                format!("[{}]", y_true.len()),
                format!("[{}]", scores.len()),
            ));
        }
        if scores.is_empty() {
            return Err(EvalError::EmptyTestSet);
        }

        let mut order: Vec<usize> = (0..scores.len()).collect();
        order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

        // Cumulative counts at the last index of each run of equal scores.
        let mut true_positives = Vec::new();
        let mut false_positives = Vec::new();
        let mut thresholds = Vec::new();
        let mut tp = 0.0;
        for (rank, &idx) in order.iter().enumerate() {
            if y_true[idx] == 1.0 {
                tp += 1.0;
            }
            let run_ends = order
                .get(rank + 1)
                .map_or(true, |&next| scores[next] != scores[idx]);
            if run_ends {
                true_positives.push(tp);
                false_positives.push((rank + 1) as f64 - tp);
                thresholds.push(f64::from(scores[idx]));
            }
        }

        let total_positives = tp;
        let mut precision: Vec<f64> = true_positives
            .iter()
            .zip(&false_positives)
            .map(|(&tp, &fp)| if tp + fp > 0.0 { tp / (tp + fp) } else { 0.0 })
            .collect();
        let mut recall: Vec<f64> = if total_positives == 0.0 {
            tracing::warn!("no positive labels in the test set, recall is set to 1 everywhere");
            vec![1.0; true_positives.len()]
        } else {
            true_positives.iter().map(|&tp| tp / total_positives).collect()
        };

        precision.reverse();
        recall.reverse();
        thresholds.reverse();
        precision.push(1.0);
        recall.push(0.0);

        Ok(Self {
            precision,
            recall,
            thresholds,
        })
    }

    pub fn len(&self) -> usize {
        self.precision.len()
    }

    pub fn is_empty(&self) -> bool {
        self.precision.is_empty()
    }

    /// `(recall, precision)` pairs in curve order, ready for plotting.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.recall.iter().copied().zip(self.precision.iter().copied())
    }
}
