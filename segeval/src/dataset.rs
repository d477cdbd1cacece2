//! Test-set types and the conversion into model-ready matrix form.
//!
//! Features and labels are paired by their position in the two sequences.
//! Nothing joins them by identifier, so callers must keep both in the same order.

use std::path::{Path, PathBuf};

use burn::tensor::{backend::Backend, Tensor};
use serde::{Deserialize, Serialize};

use crate::error::{EvalError, EvalResult};

/// Pixel offset of a patch inside its source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PatchPosition {
    /// Column offset of the patch's top-left pixel.
    pub x: u32,
    /// Row offset of the patch's top-left pixel.
    pub y: u32,
}

impl PatchPosition {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Ground truth for one test sample.
#[derive(Debug, Clone)]
pub struct LabelPatch<B: Backend> {
    /// Binary mask with shape `[patch, patch, 1]`.
    pub patch: Tensor<B, 3>,
    /// Where the patch was cut from the source image.
    pub position: PatchPosition,
    /// Image the patch was cut from.
    pub source: PathBuf,
}

impl<B: Backend> LabelPatch<B> {
    pub fn new(patch: Tensor<B, 3>, position: PatchPosition, source: impl Into<PathBuf>) -> Self {
        Self {
            patch,
            position,
            source: source.into(),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }
}

/// Builds the `(X, y_true)` pair a model is evaluated on.
///
/// `X` has shape `[samples, patch, patch, channels]` and `y_true` has shape
/// `[samples, patch, patch, 1]`, both in the order of the inputs.
pub trait MatrixForm<B: Backend> {
    fn matrix_form(
        &self,
        features: &[Tensor<B, 3>],
        labels: &[LabelPatch<B>],
        patch_size: usize,
    ) -> EvalResult<(Tensor<B, 4>, Tensor<B, 4>)>;
}

/// Stacks feature and label patches along a new leading sample axis.
#[derive(Debug, Clone, Copy, Default)]
pub struct StackedMatrixForm;

impl<B: Backend> MatrixForm<B> for StackedMatrixForm {
    fn matrix_form(
        &self,
        features: &[Tensor<B, 3>],
        labels: &[LabelPatch<B>],
        patch_size: usize,
    ) -> EvalResult<(Tensor<B, 4>, Tensor<B, 4>)> {
        if labels.is_empty() {
            return Err(EvalError::EmptyTestSet);
        }
        if features.len() != labels.len() {
            return Err(EvalError::LengthMismatch {
                features: features.len(),
                labels: labels.len(),
            });
        }

        let channels = features[0].dims()[2];
        for feature in features {
            let dims = feature.dims();
            if dims != [patch_size, patch_size, channels] {
                return Err(EvalError::shape(
                    "feature patch",
                    format!("{:?}", [patch_size, patch_size, channels]),
                    format!("{dims:?}"),
                ));
            }
        }
        for label in labels {
            let dims = label.patch.dims();
            if dims != [patch_size, patch_size, 1] {
                return Err(EvalError::shape(
                    "label patch",
                    format!("{:?}", [patch_size, patch_size, 1]),
                    format!("{dims:?}"),
                ));
            }
        }

        let x = Tensor::stack(features.to_vec(), 0);
        let y_true = Tensor::stack(labels.iter().map(|label| label.patch.clone()).collect(), 0);

        Ok((x, y_true))
    }
}
