//! Persisted evaluation artifacts.
//!
//! The precision-recall pickle is the record downstream analysis reads, so any
//! failure writing it is fatal. The PNG plot is best-effort: rendering errors
//! are logged and dropped.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use burn::tensor::{backend::Backend, Tensor};
use plotters::prelude::*;
use serde_pickle::SerOptions;

use crate::{
    error::{EvalError, EvalResult},
    metrics::{ClassificationScores, PrecisionRecallCurve},
};

/// File name of the pickled curve. The spelling is kept as-is because
/// existing analysis scripts load this exact name.
pub const PR_PICKLE_FILE: &str = "precison_recall.pickle";
/// File name of the rendered curve.
pub const PR_PLOT_FILE: &str = "precision_recall.png";
/// File name of the JSON score summary.
pub const METRICS_FILE: &str = "metrics.json";

const PLOT_SIZE: (u32, u32) = (640, 480);

/// Where the reporter put its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub pickle: PathBuf,
    /// `None` when plotting failed.
    pub plot: Option<PathBuf>,
}

/// Computes the curve from continuous scores, pickles it and plots it.
///
/// `y_scores` must be the model's raw probabilities, not the thresholded
/// bitmap.
///
/// # Errors
///
/// Returns an error if the curve cannot be computed or the pickle cannot be
/// written. Plot failures never produce an error.
pub fn precision_recall_curve<B: Backend>(
    y_true: Tensor<B, 1>,
    y_scores: Tensor<B, 1>,
    out_path: &Path,
) -> EvalResult<(PrecisionRecallCurve, ReportPaths)> {
    tracing::info!("calculating precision-recall curve");
    let curve = PrecisionRecallCurve::from_tensors(y_true, y_scores)?;

    let pickle = out_path.join(PR_PICKLE_FILE);
    write_pickle(&curve, &pickle)?;

    let plot_path = out_path.join(PR_PLOT_FILE);
    let plot = match plot_curve(&curve, &plot_path) {
        Ok(()) => Some(plot_path),
        Err(err) => {
            tracing::debug!(error = %err, "skipping precision-recall plot");
            None
        }
    };

    Ok((curve, ReportPaths { pickle, plot }))
}

/// Pickles the curve as a dict with `precision`, `recall` and `thresholds`.
pub fn write_pickle(curve: &PrecisionRecallCurve, path: &Path) -> EvalResult<()> {
    let file = File::create(path).map_err(|err| EvalError::io(path, err))?;
    let mut writer = BufWriter::new(file);
    serde_pickle::to_writer(&mut writer, curve, SerOptions::new())?;
    writer.flush().map_err(|err| EvalError::io(path, err))
}

/// Writes the scores as pretty-printed JSON.
pub fn write_metrics_json(scores: &ClassificationScores, path: &Path) -> EvalResult<()> {
    let file = File::create(path).map_err(|err| EvalError::io(path, err))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, scores)?;
    writer.flush().map_err(|err| EvalError::io(path, err))
}

/// Renders recall on x in `[0, 1]` against precision on y in `[0, 1.05]`.
pub fn plot_curve(
    curve: &PrecisionRecallCurve,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(path, PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut builder = ChartBuilder::on(&root);
    builder.margin(20);
    #[cfg(feature = "plot-labels")]
    builder.x_label_area_size(40).y_label_area_size(50);
    let mut chart = builder.build_cartesian_2d(0.0f64..1.0f64, 0.0f64..1.05f64)?;

    #[cfg(feature = "plot-labels")]
    chart
        .configure_mesh()
        .x_desc("Recall")
        .y_desc("Precision")
        .draw()?;

    chart.plotting_area().draw(&Rectangle::new(
        [(0.0, 0.0), (1.0, 1.05)],
        BLACK.stroke_width(1),
    ))?;
    chart.draw_series(LineSeries::new(curve.points(), RED.stroke_width(2)))?;

    root.present()?;
    Ok(())
}
