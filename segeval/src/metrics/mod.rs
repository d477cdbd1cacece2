//! Pixel-wise classification metrics for binary segmentation.
//!
//! Everything here works on whole tensors. Scores are computed over the
//! flattened pixels of all patches, so a patch that is only partly right still
//! contributes its correct pixels.

pub mod classification;
pub mod false_positives;
pub mod pr_curve;
pub mod threshold;
pub mod utils;

pub use classification::{accuracy, precision, recall, ClassificationScores};
pub use false_positives::false_positives;
pub use pr_curve::PrecisionRecallCurve;
pub use threshold::{binarize, flatten_pixels};
pub use utils::to_host_vec;
