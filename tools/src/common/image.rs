//! Mask image loading.

use std::path::Path;

use anyhow::{bail, Context, Result};
use burn::tensor::{backend::Backend, Tensor, TensorData};
use image::GenericImageView;

/// Loads a grayscale image as a `[height, width, 1]` tensor in `[0, 1]`.
///
/// Colour images are converted to luminance first. When `patch_size` is given
/// the image must be exactly that square size.
pub fn load_mask<B: Backend, P: AsRef<Path>>(
    path: P,
    patch_size: Option<usize>,
    device: &B::Device,
) -> Result<Tensor<B, 3>> {
    let path = path.as_ref();
    let img = image::open(path)
        .with_context(|| format!("Failed to open image at {}", path.display()))?;
    let (width, height) = img.dimensions();

    if let Some(size) = patch_size {
        if (width as usize, height as usize) != (size, size) {
            bail!(
                "{} is {width}x{height}, expected a {size}x{size} patch",
                path.display()
            );
        }
    }

    let buf = img.to_luma32f().into_raw();
    let data = TensorData::new(buf, [height as usize, width as usize, 1]).convert::<B::FloatElem>();
    Ok(Tensor::from_data(data, device))
}

/// Loads a label mask and maps it to 0/1: pixels at or above half intensity
/// are positive.
pub fn load_binary_mask<B: Backend, P: AsRef<Path>>(
    path: P,
    patch_size: Option<usize>,
    device: &B::Device,
) -> Result<Tensor<B, 3>> {
    let mask = load_mask::<B, _>(path, patch_size, device)?;
    Ok(mask.greater_equal_elem(0.5).float())
}
