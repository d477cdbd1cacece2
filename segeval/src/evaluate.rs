//! The evaluation pipeline.

use std::path::{Path, PathBuf};

use burn::tensor::{backend::Backend, Tensor};

use crate::{
    config::EvaluationConfig,
    dataset::{LabelPatch, MatrixForm},
    error::{EvalError, EvalResult},
    metrics::{binarize, false_positives, flatten_pixels, ClassificationScores, PrecisionRecallCurve},
    model::SegmentationModel,
    report::{self, ReportPaths, METRICS_FILE},
    visualise::{visualise_predictions, ResultVisualiser},
};

/// Everything one evaluation run produced.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub scores: ClassificationScores,
    pub curve: PrecisionRecallCurve,
    pub report: ReportPaths,
    /// `None` when `write_metrics_json` is off.
    pub metrics_json: Option<PathBuf>,
    /// Number of patch results handed to the visualiser.
    pub visualised: usize,
}

/// Evaluates `model` on a labelled test set.
///
/// Features and labels are paired by position. The model's probabilities are
/// thresholded at `config.threshold` (inclusive) to get a bitmap. False
/// positives are derived from the bitmap and drawn by `visualiser`. Accuracy,
/// precision and recall are computed pixel-wise and printed to stdout. The
/// precision-recall curve is computed from the raw probabilities and written
/// to `out_path`.
///
/// # Errors
///
/// Fails on an empty test set, on any shape disagreement between features,
/// labels and model output, and on any failure writing the pickle, metrics or
/// visualisation files. A failed plot is not an error.
pub fn evaluate_model<B, M, F, V>(
    model: &M,
    matrix_form: &F,
    visualiser: &V,
    features: &[Tensor<B, 3>],
    labels: &[LabelPatch<B>],
    config: &EvaluationConfig,
    out_path: &Path,
) -> EvalResult<Evaluation>
where
    B: Backend,
    M: SegmentationModel<B> + ?Sized,
    F: MatrixForm<B> + ?Sized,
    V: ResultVisualiser<B> + ?Sized,
{
    println!("{}", "_".repeat(100));
    println!("Start evaluating model.");

    let (x, y_true) = matrix_form.matrix_form(features, labels, config.patch_size)?;
    tracing::info!(samples = labels.len(), patch_size = config.patch_size, "running inference");
    let y_predicted = model.predict(x);
    if y_predicted.dims() != y_true.dims() {
        return Err(EvalError::shape(
            "model output",
            format!("{:?}", y_true.dims()),
            format!("{:?}", y_predicted.dims()),
        ));
    }

    let predicted_bitmap = binarize(y_predicted.clone(), config.threshold);
    let false_positives = false_positives(predicted_bitmap.clone(), y_true.clone());
    let visualised = visualise_predictions(
        predicted_bitmap.clone(),
        labels,
        false_positives,
        config.patch_size,
        out_path,
        config.out_format,
        visualiser,
    )?;

    // Pixel-wise: a patch counts as many samples as it has pixels.
    let y_true = flatten_pixels(y_true);
    let y_predicted = flatten_pixels(y_predicted);
    let predicted_bitmap = flatten_pixels(predicted_bitmap);

    let scores = ClassificationScores::from_flat(y_true.clone(), predicted_bitmap)?;
    println!("Accuracy on test set: {}", scores.accuracy);
    println!("Precision on test set: {}", scores.precision);
    println!("Recall on test set: {}", scores.recall);

    let (curve, report) = report::precision_recall_curve(y_true, y_predicted, out_path)?;

    let metrics_json = if config.write_metrics_json {
        let path = out_path.join(METRICS_FILE);
        report::write_metrics_json(&scores, &path)?;
        Some(path)
    } else {
        None
    };

    Ok(Evaluation {
        scores,
        curve,
        report,
        metrics_json,
        visualised,
    })
}
