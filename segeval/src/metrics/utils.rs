//! Helpers shared by the metric implementations.

use burn::tensor::{backend::Backend, Tensor};

use crate::error::{EvalError, EvalResult};

/// Copies a tensor's elements to the host in row-major order.
pub fn to_host_vec<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> EvalResult<Vec<f32>> {
    tensor
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|err| EvalError::TensorData {
            reason: format!("{err:?}"),
        })
}

/// Returns an error unless both tensors have identical dimensions.
pub(crate) fn ensure_same_dims<B: Backend, const D: usize>(
    what: &'static str,
    left: &Tensor<B, D>,
    right: &Tensor<B, D>,
) -> EvalResult<()> {
    let (left, right) = (left.dims(), right.dims());
    if left == right {
        Ok(())
    } else {
        Err(EvalError::shape(what, format!("{left:?}"), format!("{right:?}")))
    }
}
