use burn::tensor::{backend::Backend, Tensor};

/// Turns probabilities into a 0/1 bitmap.
///
/// Values at or above `threshold` become 1, everything else becomes 0. The
/// boundary belongs to the positive class.
pub fn binarize<B: Backend, const D: usize>(
    probabilities: Tensor<B, D>,
    threshold: f32,
) -> Tensor<B, D> {
    probabilities.greater_equal_elem(threshold).float()
}

/// Flattens a `[samples, patch, patch, channels]` tensor into one pixel axis.
///
/// Row-major order is kept, so flattening predictions and labels the same way
/// keeps every pixel paired with its label.
pub fn flatten_pixels<B: Backend>(tensor: Tensor<B, 4>) -> Tensor<B, 1> {
    tensor.flatten(0, 3)
}
