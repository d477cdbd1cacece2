//! Configuration for the `evaluate` binary.

use std::path::PathBuf;

use segeval::{EvaluationConfig, OutputFormat, DEFAULT_THRESHOLD};
use serde::{Deserialize, Serialize};

/// Settings for one `evaluate` run, loadable from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateConfig {
    /// Edge length of the square patches.
    pub patch_size: usize,
    /// Probability cutoff for positive pixels.
    pub threshold: f32,
    /// Format of the visualisation files.
    pub out_format: OutputFormat,
    /// Directory for all outputs.
    pub output_path: PathBuf,
    /// Whether to write `metrics.json`.
    pub write_metrics_json: bool,
}

impl Default for EvaluateConfig {
    fn default() -> Self {
        Self {
            patch_size: 256,
            threshold: DEFAULT_THRESHOLD,
            out_format: OutputFormat::default(),
            output_path: PathBuf::from("outputs"),
            write_metrics_json: true,
        }
    }
}

impl EvaluateConfig {
    /// The library-side configuration for this run.
    pub fn evaluation(&self) -> EvaluationConfig {
        EvaluationConfig::new(self.patch_size)
            .with_threshold(self.threshold)
            .with_out_format(self.out_format)
            .with_write_metrics_json(self.write_metrics_json)
    }
}
