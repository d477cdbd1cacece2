use burn::tensor::{backend::Backend, Tensor};

/// Marks pixels predicted positive whose ground truth is negative.
///
/// Both inputs are 0/1 arrays of the same shape. The result is 1 exactly where
/// `predictions == 1` and `labels == 0`.
pub fn false_positives<B: Backend, const D: usize>(
    predictions: Tensor<B, D>,
    labels: Tensor<B, D>,
) -> Tensor<B, D> {
    let predicted_positive = predictions.equal_elem(1.0).float();
    let actual_negative = labels.equal_elem(0.0).float();
    predicted_positive * actual_negative
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::to_host_vec;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_truth_table() {
        let device = Default::default();
        let predictions = Tensor::<TestBackend, 1>::from_floats([0.0, 0.0, 1.0, 1.0], &device);
        let labels = Tensor::<TestBackend, 1>::from_floats([0.0, 1.0, 0.0, 1.0], &device);

        let mask = to_host_vec(false_positives(predictions, labels)).unwrap();

        assert_eq!(mask, vec![0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_two_by_two_scenario() {
        let device = Default::default();
        let predictions = Tensor::<TestBackend, 2>::from_floats([[1.0, 0.0], [0.0, 1.0]], &device);
        let labels = Tensor::<TestBackend, 2>::from_floats([[1.0, 0.0], [1.0, 0.0]], &device);

        let mask = false_positives(predictions, labels);

        assert_eq!(mask.dims(), [2, 2]);
        assert_eq!(to_host_vec(mask).unwrap(), vec![0.0, 0.0, 0.0, 1.0]);
    }
}
