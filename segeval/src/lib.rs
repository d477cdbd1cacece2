//! Pixel-wise evaluation of binary segmentation models.
//!
//! `segeval` runs a trained model over a labelled set of square patches,
//! thresholds its probabilities, and reports accuracy, precision and recall
//! over every pixel. It also writes a precision-recall curve (pickle and PNG)
//! and hands per-patch predictions and false positives to a visualiser that
//! draws them back onto the source imagery.
//!
//! The model, the conversion of raw patches into model input, and the
//! visualiser are traits, so the pipeline works with any Burn backend and
//! any rendering target.

mod config;
mod dataset;
mod error;
mod evaluate;
pub mod metrics;
mod model;
pub mod report;
mod visualise;

#[cfg(test)]
mod tests;

pub use config::{EvaluationConfig, OutputFormat, DEFAULT_THRESHOLD};
pub use dataset::{LabelPatch, MatrixForm, PatchPosition, StackedMatrixForm};
pub use error::{EvalError, EvalResult};
pub use evaluate::{evaluate_model, Evaluation};
pub use metrics::{ClassificationScores, PrecisionRecallCurve};
pub use model::SegmentationModel;
pub use report::ReportPaths;
pub use visualise::{
    regroup, visualise_predictions, OverlayVisualiser, PatchResult, ResultVisualiser,
};
