use burn::tensor::{backend::Backend, Tensor};

/// A trained binary segmentation model.
///
/// `predict` maps a `[samples, patch, patch, channels]` batch to per-pixel
/// probabilities of the positive class, shaped `[samples, patch, patch, 1]`.
pub trait SegmentationModel<B: Backend> {
    fn predict(&self, x: Tensor<B, 4>) -> Tensor<B, 4>;
}

impl<B, F> SegmentationModel<B> for F
where
    B: Backend,
    F: Fn(Tensor<B, 4>) -> Tensor<B, 4>,
{
    fn predict(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        self(x)
    }
}
