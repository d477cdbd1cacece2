//! Accuracy, precision and recall over flattened 0/1 pixels.
//!
//! The positive class is 1. A score whose denominator is zero is reported as
//! 0.0, which is what scikit-learn returns by default in that case.

use burn::tensor::{backend::Backend, ElementConversion, Int, Tensor};
use serde::{Deserialize, Serialize};

use crate::{
    error::{EvalError, EvalResult},
    metrics::utils::ensure_same_dims,
};

/// Confusion counts and the scores derived from them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationScores {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub true_positives: u64,
    pub false_positives: u64,
    pub true_negatives: u64,
    pub false_negatives: u64,
}

impl ClassificationScores {
    /// Computes all scores from flat label and prediction bitmaps.
    ///
    /// # Errors
    ///
    /// Fails when the tensors differ in length, are empty, or contain values
    /// other than 0 and 1.
    pub fn from_flat<B: Backend>(y_true: Tensor<B, 1>, y_pred: Tensor<B, 1>) -> EvalResult<Self> {
        ensure_same_dims("prediction bitmap", &y_true, &y_pred)?;
        let [total] = y_true.dims();
        if total == 0 {
            return Err(EvalError::EmptyTestSet);
        }
        ensure_binary("labels", &y_true)?;
        ensure_binary("predictions", &y_pred)?;

        let actual = y_true.equal_elem(1.0).int();
        let predicted = y_pred.equal_elem(1.0).int();

        let tp = count(actual.clone() * predicted.clone());
        let predicted_positives = count(predicted);
        let actual_positives = count(actual);

        let fp = predicted_positives - tp;
        let fn_ = actual_positives - tp;
        let tn = total as u64 - tp - fp - fn_;

        Ok(Self {
            accuracy: ratio(tp + tn, total as u64),
            precision: ratio(tp, tp + fp),
            recall: ratio(tp, tp + fn_),
            true_positives: tp,
            false_positives: fp,
            true_negatives: tn,
            false_negatives: fn_,
        })
    }
}

/// Fraction of pixels whose prediction matches the label.
pub fn accuracy<B: Backend>(y_true: Tensor<B, 1>, y_pred: Tensor<B, 1>) -> EvalResult<f64> {
    ClassificationScores::from_flat(y_true, y_pred).map(|scores| scores.accuracy)
}

/// Fraction of predicted positives that are labelled positive.
pub fn precision<B: Backend>(y_true: Tensor<B, 1>, y_pred: Tensor<B, 1>) -> EvalResult<f64> {
    ClassificationScores::from_flat(y_true, y_pred).map(|scores| scores.precision)
}

/// Fraction of labelled positives that are predicted positive.
pub fn recall<B: Backend>(y_true: Tensor<B, 1>, y_pred: Tensor<B, 1>) -> EvalResult<f64> {
    ClassificationScores::from_flat(y_true, y_pred).map(|scores| scores.recall)
}

/// Sums a 0/1 mask. Integer accumulation stays exact past the 2^24 limit of
/// an f32 sum.
fn count<B: Backend>(mask: Tensor<B, 1, Int>) -> u64 {
    mask.sum().into_scalar().elem::<i64>() as u64
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn ensure_binary<B: Backend>(what: &'static str, values: &Tensor<B, 1>) -> EvalResult<()> {
    let [total] = values.dims();
    let binary = values.clone().equal_elem(0.0).int() + values.clone().equal_elem(1.0).int();
    let non_binary = total as u64 - count(binary);
    if non_binary == 0 {
        Ok(())
    } else {
        Err(EvalError::NonBinaryValues {
            what,
            count: non_binary as usize,
        })
    }
}
